//! Timed overlay messages and the registry that owns them.

use crate::color::Color;

/// Message slot. Every category except `Typeless` holds at most one entry;
/// posting to an occupied slot overwrites it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Typeless,
    Fps,
    ShaderCache,
    Netplay,
}

/// How long a message stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDuration {
    Millis(u32),
    /// Exempt from time-based expiry.
    Forever,
}

impl MessageDuration {
    pub const SHORT: MessageDuration = MessageDuration::Millis(2_000);
    pub const NORMAL: MessageDuration = MessageDuration::Millis(5_000);
    pub const VERY_LONG: MessageDuration = MessageDuration::Millis(10_000);

    /// Expiry of a message posted at `now_ms`.
    pub fn expiry_from(self, now_ms: u64) -> Expiry {
        match self {
            MessageDuration::Millis(ms) => Expiry::At(now_ms.saturating_add(u64::from(ms))),
            MessageDuration::Forever => Expiry::Never,
        }
    }
}

/// Point at which a message is swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    At(u64),
    Never,
}

impl Expiry {
    /// True once `now_ms` has moved strictly past the expiry timestamp.
    pub fn has_passed(self, now_ms: u64) -> bool {
        match self {
            Expiry::At(at) => at < now_ms,
            Expiry::Never => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub kind: MessageType,
    pub expiry: Expiry,
    pub color: Color,
}

/// Ordered message list. Iteration order is stacking order on screen:
/// first entry on the top line.
#[derive(Debug, Default)]
pub struct MessageRegistry {
    messages: Vec<Message>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a message at `now_ms`.
    ///
    /// A categorized message replaces the text, expiry and color of the
    /// existing entry of that category, keeping its position. `Typeless`
    /// messages always append.
    pub fn add_or_replace(
        &mut self,
        text: impl Into<String>,
        kind: MessageType,
        duration: MessageDuration,
        color: Color,
        now_ms: u64,
    ) {
        let text = text.into();
        let expiry = duration.expiry_from(now_ms);

        if kind != MessageType::Typeless {
            if let Some(existing) = self.messages.iter_mut().find(|m| m.kind == kind) {
                existing.text = text;
                existing.expiry = expiry;
                existing.color = color;
                return;
            }
        }

        self.messages.push(Message {
            text,
            kind,
            expiry,
            color,
        });
    }

    /// Drop every message whose expiry lies strictly before `now_ms`.
    /// Returns how many were removed.
    pub fn sweep_expired(&mut self, now_ms: u64) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| !m.expiry.has_passed(now_ms));
        let removed = before - self.messages.len();
        if removed > 0 {
            log::trace!("Swept {} expired overlay message(s)", removed);
        }
        removed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn get(&self, kind: MessageType) -> Option<&Message> {
        self.messages.iter().find(|m| m.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageRegistry {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorized_message_replaces_in_place() {
        let mut reg = MessageRegistry::new();
        reg.add_or_replace("A", MessageType::Fps, MessageDuration::Millis(1_000), Color::RED, 100);
        reg.add_or_replace("B", MessageType::Fps, MessageDuration::Millis(2_000), Color::GREEN, 100);

        assert_eq!(reg.len(), 1);
        let fps = reg.get(MessageType::Fps).unwrap();
        assert_eq!(fps.text, "B");
        assert_eq!(fps.expiry, Expiry::At(2_100));
        assert_eq!(fps.color, Color::GREEN);
    }

    #[test]
    fn replacement_keeps_original_position() {
        let mut reg = MessageRegistry::new();
        reg.add_or_replace("perf", MessageType::Fps, MessageDuration::Forever, Color::BLUE, 0);
        reg.add_or_replace("hello", MessageType::Typeless, MessageDuration::NORMAL, Color::WHITE, 0);
        reg.add_or_replace("perf 2", MessageType::Fps, MessageDuration::Forever, Color::BLUE, 10);

        let texts: Vec<_> = reg.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["perf 2", "hello"]);
    }

    #[test]
    fn typeless_messages_never_dedupe() {
        let mut reg = MessageRegistry::new();
        reg.add_or_replace("one", MessageType::Typeless, MessageDuration::SHORT, Color::WHITE, 0);
        reg.add_or_replace("one", MessageType::Typeless, MessageDuration::SHORT, Color::WHITE, 0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn sweep_removes_strictly_past_entries() {
        let mut reg = MessageRegistry::new();
        reg.add_or_replace("old", MessageType::Typeless, MessageDuration::Millis(0), Color::WHITE, 999);
        reg.add_or_replace("edge", MessageType::Typeless, MessageDuration::Millis(0), Color::WHITE, 1_000);
        reg.add_or_replace("forever", MessageType::Fps, MessageDuration::Forever, Color::BLUE, 0);

        assert_eq!(reg.sweep_expired(1_000), 1);
        let texts: Vec<_> = reg.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["edge", "forever"]);
    }

    #[test]
    fn forever_survives_any_elapsed_time() {
        let mut reg = MessageRegistry::new();
        reg.add_or_replace("pinned", MessageType::Fps, MessageDuration::Forever, Color::BLUE, 0);
        reg.sweep_expired(u64::MAX);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn longest_timed_duration_still_expires() {
        assert_eq!(MessageDuration::Forever.expiry_from(u64::MAX), Expiry::Never);
        let longest = MessageDuration::Millis(u32::MAX).expiry_from(0);
        assert_eq!(longest, Expiry::At(u64::from(u32::MAX)));
        assert!(longest.has_passed(u64::from(u32::MAX) + 1));
    }

    #[test]
    fn sweep_does_not_skip_adjacent_expired_entries() {
        let mut reg = MessageRegistry::new();
        for i in 0..4 {
            reg.add_or_replace(format!("{i}"), MessageType::Typeless, MessageDuration::Millis(10), Color::WHITE, 0);
        }
        reg.add_or_replace("keep", MessageType::Typeless, MessageDuration::VERY_LONG, Color::WHITE, 0);
        assert_eq!(reg.sweep_expired(11), 4);
        assert_eq!(reg.iter().next().unwrap().text, "keep");
    }
}
