//! Chunk-boundary-agnostic frame splitting.

/// Incrementally slices a byte stream into blank-line terminated frames.
///
/// CRLF and lone CR are normalized to LF before matching, including a CRLF
/// pair whose halves arrive in different chunks. Frames are decoded as UTF-8
/// only once complete, so a multi-byte sequence split across chunks is never
/// mangled. Output does not depend on how the input was chunked.
///
/// Use a fresh splitter per stream.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: Vec<u8>,
    /// Previous chunk ended in CR; a leading LF in the next chunk belongs to it
    pending_cr: bool,
    /// Prefix of `buffer` already searched for a separator
    scanned: usize,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every frame it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.reserve(chunk.len());
        for &byte in chunk {
            match byte {
                b'\r' => {
                    self.buffer.push(b'\n');
                    self.pending_cr = true;
                }
                b'\n' if self.pending_cr => {
                    self.pending_cr = false;
                }
                other => {
                    self.buffer.push(other);
                    self.pending_cr = false;
                }
            }
        }
        self.drain_frames()
    }

    /// Bytes held back waiting for a frame separator.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut start = 0;
        // A trailing LF from the last scan may pair with the first new byte.
        let mut from = self.scanned.saturating_sub(1);
        while let Some(pos) = find_separator(&self.buffer[from..]) {
            let end = from + pos;
            frames.push(String::from_utf8_lossy(&self.buffer[start..end]).into_owned());
            start = end + 2;
            from = start;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
        self.scanned = self.buffer.len();
        frames
    }
}

fn find_separator(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).position(|w| w == b"\n\n")
}
