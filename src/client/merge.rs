//! Joining a retrieval snapshot with enrichment metadata.

use std::collections::HashMap;

use crate::models::{ContentMetadata, DetailedRetrieval, RetrievalContent};

/// Pair every retrieval with its metadata.
///
/// When any metadata entry carries a content id, pairing is by id: a
/// retrieval without a matching entry gets no image, and a later duplicate id
/// wins. Otherwise pairing is by position. The result always has the same
/// length and order as `retrievals`, so applying the same metadata twice gives
/// the same entries.
pub fn merge_metadata(
    retrievals: &[RetrievalContent],
    metadatas: &[ContentMetadata],
) -> Vec<DetailedRetrieval> {
    let keyed = metadatas.iter().any(|m| m.id().is_some());

    if keyed {
        let by_id: HashMap<&str, &ContentMetadata> = metadatas
            .iter()
            .filter_map(|m| m.id().map(|id| (id, m)))
            .collect();

        retrievals
            .iter()
            .map(|retrieval| {
                let meta = retrieval.id().and_then(|id| by_id.get(id).copied());
                detailed(retrieval, meta)
            })
            .collect()
    } else {
        retrievals
            .iter()
            .enumerate()
            .map(|(i, retrieval)| detailed(retrieval, metadatas.get(i)))
            .collect()
    }
}

fn detailed(retrieval: &RetrievalContent, meta: Option<&ContentMetadata>) -> DetailedRetrieval {
    let page_img = meta
        .and_then(|m| m.page_img.clone())
        .filter(|img| !img.is_empty());

    DetailedRetrieval {
        content_text: retrieval.content_text.clone(),
        page_img,
        original: retrieval.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<RetrievalContent> {
        vec![
            RetrievalContent::new("c1", "one"),
            RetrievalContent::new("c2", "two"),
            RetrievalContent::new("c3", "three"),
        ]
    }

    #[test]
    fn test_positional_merge_pairs_by_index() {
        let metadatas = vec![
            ContentMetadata::positional(Some("img1".to_string())),
            ContentMetadata::positional(Some("img2".to_string())),
            ContentMetadata::positional(Some("img3".to_string())),
        ];

        let merged = merge_metadata(&snapshot(), &metadatas);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].page_img.as_deref(), Some("img1"));
        assert_eq!(merged[1].page_img.as_deref(), Some("img2"));
        assert_eq!(merged[2].page_img.as_deref(), Some("img3"));
        assert_eq!(merged[1].content_text, "two");
        assert_eq!(merged[2].original.id(), Some("c3"));
    }

    #[test]
    fn test_positional_merge_with_fewer_metadatas() {
        let metadatas = vec![ContentMetadata::positional(Some("img1".to_string()))];
        let merged = merge_metadata(&snapshot(), &metadatas);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].page_img.as_deref(), Some("img1"));
        assert!(merged[1].page_img.is_none());
        assert!(merged[2].page_img.is_none());
    }

    #[test]
    fn test_keyed_merge_ignores_metadata_order() {
        let forward = vec![
            ContentMetadata::with_id("c1", Some("a".to_string())),
            ContentMetadata::with_id("c2", Some("b".to_string())),
            ContentMetadata::with_id("c3", Some("c".to_string())),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            merge_metadata(&snapshot(), &forward),
            merge_metadata(&snapshot(), &reversed)
        );
        assert_eq!(
            merge_metadata(&snapshot(), &reversed)[0].page_img.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_keyed_merge_missing_id_gets_no_image() {
        let metadatas = vec![ContentMetadata::with_id("c2", Some("b".to_string()))];
        let merged = merge_metadata(&snapshot(), &metadatas);
        assert!(merged[0].page_img.is_none());
        assert_eq!(merged[1].page_img.as_deref(), Some("b"));
        assert!(merged[2].page_img.is_none());
    }

    #[test]
    fn test_empty_image_is_dropped() {
        let metadatas = vec![ContentMetadata::with_id("c1", Some(String::new()))];
        let merged = merge_metadata(&snapshot(), &metadatas);
        assert!(merged[0].page_img.is_none());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let metadatas = vec![ContentMetadata::with_id("c1", Some("a".to_string()))];
        let once = merge_metadata(&snapshot(), &metadatas);
        let twice = merge_metadata(&snapshot(), &metadatas);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_snapshot() {
        let metadatas = vec![ContentMetadata::positional(Some("x".to_string()))];
        assert!(merge_metadata(&[], &metadatas).is_empty());
    }
}
