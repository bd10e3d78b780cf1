//! The persisted conversation shape.
//!
//! This is the stable storage-boundary format: camelCase keys, the report
//! kept as a JSON-encoded *string*, `endTime` explicitly null while the
//! call is live, and messages tagged with `isUser` (true = the trainee
//! playing the caller). Records written by older builds must keep loading,
//! so changes here are additive only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cs_domain::report::IncidentReport;

use crate::session::ConversationSession;
use crate::transcript::{ConversationTurn, Speaker, Transcript};

/// One stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// One stored conversation, serialized whole on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// JSON-encoded [`IncidentReport`], not a nested object.
    #[serde(default)]
    pub report: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

impl ConversationRecord {
    /// Decode the embedded report string. Unparseable report JSON means
    /// "no structured report available", never a hard failure.
    pub fn parsed_report(&self) -> IncidentReport {
        if self.report.trim().is_empty() {
            return IncidentReport::default();
        }
        match IncidentReport::from_json_str(&self.report) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "stored report is unparseable, treating as absent"
                );
                IncidentReport::default()
            }
        }
    }
}

impl From<&ConversationSession> for ConversationRecord {
    fn from(session: &ConversationSession) -> Self {
        Self {
            id: session.id().to_owned(),
            scenario: session.scenario().to_owned(),
            title: session.title().to_owned(),
            summary: session.summary().to_owned(),
            report: if session.report().is_empty() {
                String::new()
            } else {
                session.report().to_json_string()
            },
            start_time: session.started_at(),
            end_time: session.ended_at(),
            messages: session
                .turns()
                .iter()
                .map(|turn| StoredMessage {
                    text: turn.text.clone(),
                    is_user: turn.speaker == Speaker::Caller,
                    timestamp: turn.timestamp,
                })
                .collect(),
        }
    }
}

impl From<ConversationRecord> for ConversationSession {
    fn from(record: ConversationRecord) -> Self {
        let report = record.parsed_report();
        let turns = record
            .messages
            .iter()
            .map(|msg| ConversationTurn {
                text: msg.text.clone(),
                speaker: if msg.is_user {
                    Speaker::Caller
                } else {
                    Speaker::Operator
                },
                timestamp: msg.timestamp,
            })
            .collect();

        ConversationSession::from_parts(
            record.id,
            record.scenario,
            Transcript::from_turns(turns),
            record.title,
            record.summary,
            report,
            record.start_time,
            record.end_time,
        )
    }
}
