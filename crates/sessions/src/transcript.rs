//! Append-only call transcript.
//!
//! Turns arrive from the voice transport in spoken order and are never
//! reordered or mutated afterwards; the sequence *is* the call record.
//! Rendering produces the role-labeled text the analysis prompts consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn. The trainee plays the caller reporting the
/// emergency; the simulated agent plays the dispatch operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Operator,
    Caller,
}

impl Speaker {
    /// Label used in the rendered transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Operator => "Operator",
            Speaker::Caller => "Zgłaszający",
        }
    }
}

/// One spoken utterance. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub text: String,
    pub speaker: Speaker,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn now(text: impl Into<String>, speaker: Speaker) -> Self {
        Self {
            text: text.into(),
            speaker,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered log of conversation turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }

    /// Append one turn. The sole mutator; callers serialize access through
    /// the session lock, so rapid back-to-back appends keep arrival order.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the role-labeled transcript text. Stable: the same turns
    /// always produce the same string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str(turn.speaker.label());
            out.push_str(": ");
            out.push_str(&turn.text);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_preserves_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.append(ConversationTurn::now("Numer alarmowy, słucham?", Speaker::Operator));
        transcript.append(ConversationTurn::now("Wypadek na Głównej!", Speaker::Caller));
        transcript.append(ConversationTurn::now("Czy ktoś jest ranny?", Speaker::Operator));

        let rendered = transcript.render();
        assert_eq!(
            rendered,
            "Operator: Numer alarmowy, słucham?\n\
             Zgłaszający: Wypadek na Głównej!\n\
             Operator: Czy ktoś jest ranny?\n"
        );
    }

    #[test]
    fn render_is_stable_and_drops_nothing() {
        let mut transcript = Transcript::new();
        for i in 0..50 {
            transcript.append(ConversationTurn::now(format!("tura {i}"), Speaker::Caller));
        }
        assert_eq!(transcript.len(), 50);
        let first = transcript.render();
        assert_eq!(first, transcript.render());
        assert_eq!(first.lines().count(), 50);
        assert!(first.contains("tura 0"));
        assert!(first.contains("tura 49"));
    }

    #[test]
    fn empty_transcript_renders_empty() {
        assert_eq!(Transcript::new().render(), "");
    }
}
