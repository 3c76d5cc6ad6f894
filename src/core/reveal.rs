//! # Answer Reveal
//!
//! Answers arrive in one piece. They are disclosed one character per timer
//! tick into a specific message, so the message always holds a prefix of the
//! answer.
//!
//! Only one reveal is live at a time. Starting another one flushes the old one
//! and gives the new one a fresh [`RevealId`]; ticks for any other id are
//! dropped by the reducer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    id: RevealId,
    message_index: usize,
    answer: String,
    /// Byte offset of the first unrevealed character.
    pos: usize,
    revealed: usize,
    total: usize,
}

impl Reveal {
    pub fn new(id: RevealId, message_index: usize, answer: String) -> Self {
        let total = answer.chars().count();
        Self {
            id,
            message_index,
            answer,
            pos: 0,
            revealed: 0,
            total,
        }
    }

    pub fn id(&self) -> RevealId {
        self.id
    }

    pub fn message_index(&self) -> usize {
        self.message_index
    }

    /// Number of ticks needed to show the whole answer.
    pub fn total_chars(&self) -> usize {
        self.total
    }

    pub fn revealed_chars(&self) -> usize {
        self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.pos >= self.answer.len()
    }

    /// Advances by one character and returns it, or `None` once finished.
    pub fn advance(&mut self) -> Option<&str> {
        let ch = self.answer[self.pos..].chars().next()?;
        let start = self.pos;
        self.pos += ch.len_utf8();
        self.revealed += 1;
        Some(&self.answer[start..self.pos])
    }

    /// Finishes immediately, returning everything not yet revealed.
    pub fn flush(&mut self) -> &str {
        let start = self.pos;
        self.pos = self.answer.len();
        self.revealed = self.total;
        &self.answer[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal(answer: &str) -> Reveal {
        Reveal::new(RevealId(1), 0, answer.to_string())
    }

    #[test]
    fn every_tick_is_a_prefix() {
        let answer = "x = 2";
        let mut r = reveal(answer);
        let mut shown = String::new();
        for k in 0..=answer.len() {
            assert_eq!(shown, answer[..k]);
            if let Some(ch) = r.advance() {
                shown.push_str(ch);
            }
        }
        assert!(r.is_finished());
        assert_eq!(shown, answer);
    }

    #[test]
    fn ticks_after_finish_are_inert() {
        let mut r = reveal("ab");
        r.advance();
        r.advance();
        assert_eq!(r.advance(), None);
        assert_eq!(r.revealed_chars(), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut r = reveal("π≈3");
        assert_eq!(r.total_chars(), 3);
        assert_eq!(r.advance(), Some("π"));
        assert_eq!(r.advance(), Some("≈"));
        assert_eq!(r.advance(), Some("3"));
        assert!(r.is_finished());
    }

    #[test]
    fn flush_returns_the_rest() {
        let mut r = reveal("hello");
        r.advance();
        r.advance();
        assert_eq!(r.flush(), "llo");
        assert!(r.is_finished());
        assert_eq!(r.revealed_chars(), 5);
        assert_eq!(r.flush(), "");
    }

    #[test]
    fn empty_answer_is_already_finished() {
        let mut r = reveal("");
        assert!(r.is_finished());
        assert_eq!(r.advance(), None);
    }
}
