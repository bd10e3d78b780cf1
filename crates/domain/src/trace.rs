use serde::Serialize;

/// Structured trace events emitted across all callsim crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
    },
    SessionActivated {
        session_id: String,
    },
    TurnAppended {
        session_id: String,
        speaker: String,
        chars: usize,
    },
    ExtractionRequested {
        session_id: String,
        incremental: bool,
    },
    ExtractionDiscarded {
        session_id: String,
        reason: String,
    },
    ReportMerged {
        session_id: String,
        fields_adopted: usize,
    },
    FinalAnalysisStarted {
        session_id: String,
        turns: usize,
        duration_s: i64,
    },
    FinalAnalysisCompleted {
        session_id: String,
        title_ok: bool,
        summary_ok: bool,
        report_ok: bool,
    },
    SessionSaved {
        session_id: String,
        retried: bool,
    },
    SessionDeleted {
        session_id: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cs_event");
    }
}
