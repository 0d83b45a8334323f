//! Append-only message list with stable slots.

use super::message::Message;

/// Stable handle to one entry of a [`MessageList`].
///
/// Captured once when the entry is appended and reused for every later
/// update, so concurrent updates never have to search the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered conversation.
///
/// Entries are only ever appended; the single open assistant entry is
/// mutated in place through its [`Slot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its slot.
    pub fn push(&mut self, message: Message) -> Slot {
        self.messages.push(message);
        Slot(self.messages.len() - 1)
    }

    pub fn get(&self, slot: Slot) -> Option<&Message> {
        self.messages.get(slot.0)
    }

    /// Assistant entry at `slot`, if the slot holds one.
    pub fn assistant_mut(&mut self, slot: Slot) -> Option<&mut Message> {
        self.messages.get_mut(slot.0).filter(|m| m.is_assistant())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
