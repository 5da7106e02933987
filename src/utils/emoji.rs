//! Per-chat emoji rotation for reactions.

use std::collections::HashSet;

use dashmap::DashMap;
use rand::seq::IteratorRandom;

/// Emojis Telegram accepts as a standard (non-premium) message reaction.
pub const ALLOWED_REACTIONS: &[&str] = &[
    "👍", "👎", "❤", "🔥", "🥰", "👏", "😁", "🤔", "🤯", "😱", "🤬", "😢", "🎉", "🤩", "🤮",
    "💩", "🙏", "👌", "🕊", "🤡", "🥱", "🥴", "😍", "🐳", "❤‍🔥", "🌚", "🌭", "💯", "🤣", "⚡",
    "🍌", "🏆", "💔", "🤨", "😐", "🍓", "🍾", "💋", "🖕", "😈", "😴", "😭", "🤓", "👻", "👨‍💻",
    "👀", "🎃", "🙈", "😇", "😨", "🤝", "✍", "🤗", "🫡", "🎅", "🎄", "☃", "💅", "🤪", "🗿",
    "🆒", "💘", "🙉", "🦄", "😘", "💊", "🙊", "😎", "👾", "🤷‍♂", "🤷", "🤷‍♀", "😡",
];

/// Picks reaction emojis so a chat sees every candidate once before any
/// repeats. Rotation state is memory only.
#[derive(Debug)]
pub struct EmojiPicker {
    candidates: Vec<&'static str>,
    used: DashMap<i64, HashSet<usize>>,
}

impl EmojiPicker {
    /// Candidates are the preferred emojis that Telegram allows, in the
    /// preferred order. If none qualify the whole allow-list is used.
    pub fn new<S: AsRef<str>>(preferred: &[S]) -> Self {
        let mut candidates: Vec<&'static str> = Vec::new();
        for emoji in preferred {
            let emoji = emoji.as_ref().trim_end_matches('\u{fe0f}');
            if let Some(allowed) = ALLOWED_REACTIONS.iter().find(|a| **a == emoji)
                && !candidates.contains(allowed)
            {
                candidates.push(*allowed);
            }
        }

        if candidates.is_empty() {
            candidates = ALLOWED_REACTIONS.to_vec();
        }

        Self {
            candidates,
            used: DashMap::new(),
        }
    }

    pub fn candidates(&self) -> &[&'static str] {
        &self.candidates
    }

    /// Next emoji for a chat, uniformly among those not used this cycle.
    pub fn next(&self, chat_id: i64) -> &'static str {
        let mut used = self.used.entry(chat_id).or_default();
        if used.len() >= self.candidates.len() {
            used.clear();
        }

        let mut rng = rand::thread_rng();
        let index = (0..self.candidates.len())
            .filter(|i| !used.contains(i))
            .choose(&mut rng)
            .unwrap_or(0);

        used.insert(index);
        self.candidates[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_are_preferred_intersected_with_allowed() {
        let picker = EmojiPicker::new(&["🔥", "not-an-emoji", "👍", "🔥", "❤️"]);
        assert_eq!(picker.candidates(), &["🔥", "👍", "❤"]);
    }

    #[test]
    fn empty_intersection_falls_back_to_allow_list() {
        let picker = EmojiPicker::new(&["x", "y"]);
        assert_eq!(picker.candidates(), ALLOWED_REACTIONS);

        let none: [&str; 0] = [];
        assert_eq!(EmojiPicker::new(&none).candidates().len(), ALLOWED_REACTIONS.len());
    }

    #[test]
    fn full_cycle_has_no_repeats() {
        let picker = EmojiPicker::new(&["👍", "🔥", "🎉", "💯", "😎"]);
        let n = picker.candidates().len();

        for _ in 0..20 {
            let cycle: HashSet<&str> = (0..n).map(|_| picker.next(42)).collect();
            assert_eq!(cycle.len(), n);
        }
    }

    #[test]
    fn picks_stay_within_candidates_across_resets() {
        let picker = EmojiPicker::new(&["👍", "🔥", "🎉"]);
        for _ in 0..50 {
            assert!(picker.candidates().contains(&picker.next(7)));
        }
    }

    #[test]
    fn chats_rotate_independently() {
        let picker = EmojiPicker::new(&["👍", "🔥"]);
        let first = picker.next(1);
        let _ = picker.next(2);
        let _ = picker.next(2);
        let second = picker.next(1);
        assert_ne!(first, second);
    }
}
