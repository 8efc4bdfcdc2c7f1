use chatmeter_types::{ChatMessage, Turn};

/// Ordered, append-only conversation history, oldest first.
///
/// Turns are never edited or removed individually; [`Transcript::clear`]
/// drops everything at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Role/content pairs in transcript order, as replayed upstream.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmeter_types::Role;

    #[test]
    fn messages_follow_turn_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("first"));
        transcript.push(Turn::error("failed"));
        transcript.push(Turn::user("second"));

        let messages = transcript.to_messages();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[2].content, "second");
    }

    #[test]
    fn clear_empties_everything() {
        let mut transcript = Transcript::from(vec![Turn::user("a"), Turn::user("b")]);
        assert_eq!(transcript.len(), 2);
        transcript.clear();
        assert!(transcript.is_empty());
        assert!(transcript.last().is_none());
    }
}
