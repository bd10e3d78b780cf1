//! The conversation session aggregate and its lifecycle.

use chrono::{DateTime, Utc};

use cs_domain::error::{Error, Result};
use cs_domain::report::IncidentReport;
use cs_domain::trace::TraceEvent;

use crate::transcript::{ConversationTurn, Speaker, Transcript};

/// One-way lifecycle of a training call.
///
/// `Preparing`: scenario assigned, waiting for the transport to connect.
/// `Active`: live call, turns are being appended.
/// `Analyzing`: call ended, final analysis in flight, no more turns.
/// `Complete`: terminal; artifacts hold their best-known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Preparing,
    Active,
    Analyzing,
    Complete,
}

/// One complete or in-progress training call and its derived artifacts.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    scenario: String,
    transcript: Transcript,
    title: String,
    summary: String,
    report: IncidentReport,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    phase: SessionPhase,
}

impl ConversationSession {
    /// Create a fresh session in `Preparing` with the given scenario text.
    /// The scenario is opaque here and immutable for the session's lifetime.
    pub fn new(scenario: impl Into<String>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        TraceEvent::SessionCreated {
            session_id: id.clone(),
        }
        .emit();

        Self {
            id,
            scenario: scenario.into(),
            transcript: Transcript::new(),
            title: String::new(),
            summary: String::new(),
            report: IncidentReport::default(),
            started_at: Utc::now(),
            ended_at: None,
            phase: SessionPhase::Preparing,
        }
    }

    /// Rebuild a session from its stored parts (see [`crate::record`]).
    /// A record with an end time loads as `Complete`; one persisted mid-call
    /// loads as `Active` and is treated read-only by callers.
    pub(crate) fn from_parts(
        id: String,
        scenario: String,
        transcript: Transcript,
        title: String,
        summary: String,
        report: IncidentReport,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Self {
        let phase = if ended_at.is_some() {
            SessionPhase::Complete
        } else {
            SessionPhase::Active
        };
        Self {
            id,
            scenario,
            transcript,
            title,
            summary,
            report,
            started_at,
            ended_at,
            phase,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn report(&self) -> &IncidentReport {
        &self.report
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        self.transcript.turns()
    }

    /// Role-labeled transcript text for the analysis prompts.
    pub fn transcript_text(&self) -> String {
        self.transcript.render()
    }

    /// Seconds from call start to call end, or to now while still live.
    pub fn duration_seconds(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// The transport connected: `Preparing → Active`. Already being active
    /// is tolerated; later phases are not, the call is over.
    pub fn activate(&mut self) -> Result<()> {
        match self.phase {
            SessionPhase::Preparing => {
                self.phase = SessionPhase::Active;
                TraceEvent::SessionActivated {
                    session_id: self.id.clone(),
                }
                .emit();
                Ok(())
            }
            SessionPhase::Active => Ok(()),
            phase => Err(Error::Other(format!(
                "session {} cannot activate from {phase:?}",
                self.id
            ))),
        }
    }

    /// Append one spoken turn. Only a live call accepts turns.
    pub fn add_turn(&mut self, text: impl Into<String>, speaker: Speaker) -> Result<()> {
        if self.phase != SessionPhase::Active {
            return Err(Error::Other(format!(
                "session {} is {:?}, turn rejected",
                self.id, self.phase
            )));
        }

        let turn = ConversationTurn::now(text, speaker);
        TraceEvent::TurnAppended {
            session_id: self.id.clone(),
            speaker: turn.speaker.label().to_owned(),
            chars: turn.text.chars().count(),
        }
        .emit();
        self.transcript.append(turn);
        Ok(())
    }

    /// The call ended: `Active → Analyzing`, stamping `ended_at` exactly
    /// once. Returns `true` only for the call that won the transition;
    /// this is the in-flight guard that makes a second `end()` a no-op.
    pub fn begin_analysis(&mut self) -> bool {
        if self.phase != SessionPhase::Active {
            return false;
        }
        self.phase = SessionPhase::Analyzing;
        // Never earlier than the session start.
        self.ended_at = Some(Utc::now().max(self.started_at));
        true
    }

    /// Final analysis settled: `Analyzing → Complete`. Idempotent.
    pub fn complete(&mut self) {
        if self.phase == SessionPhase::Analyzing {
            self.phase = SessionPhase::Complete;
        }
    }

    // ── Derived artifacts ─────────────────────────────────────────────

    /// Titles are holistic, not incremental facts: last write wins.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Summaries are holistic too: last write wins.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    /// Fold a proposed report into the current one through the merge rules
    /// and return how many fields were newly filled or extended. Confirmed
    /// fields never regress, so applying stale or repeated extraction
    /// results is harmless.
    pub fn merge_report(&mut self, proposed: &IncidentReport) -> usize {
        let adopted = self.report.fields_adopted_from(proposed);
        self.report = self.report.merge(proposed);
        if adopted > 0 {
            TraceEvent::ReportMerged {
                session_id: self.id.clone(),
                fields_adopted: adopted,
            }
            .emit();
        }
        adopted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_session() -> ConversationSession {
        let mut session = ConversationSession::new("scenariusz testowy");
        session.activate().unwrap();
        session
    }

    #[test]
    fn fresh_session_is_preparing_with_empty_artifacts() {
        let session = ConversationSession::new("pożar domu");
        assert_eq!(session.phase(), SessionPhase::Preparing);
        assert!(session.title().is_empty());
        assert!(session.summary().is_empty());
        assert!(session.report().is_empty());
        assert!(session.ended_at().is_none());
    }

    #[test]
    fn turns_only_accepted_while_active() {
        let mut session = ConversationSession::new("s");
        assert!(session.add_turn("halo", Speaker::Caller).is_err());

        session.activate().unwrap();
        session.add_turn("halo", Speaker::Caller).unwrap();
        assert_eq!(session.turns().len(), 1);

        assert!(session.begin_analysis());
        assert!(session.add_turn("za późno", Speaker::Caller).is_err());
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn begin_analysis_wins_only_once() {
        let mut session = active_session();
        assert!(session.begin_analysis());
        let ended = session.ended_at().unwrap();

        // Second end() is a no-op: phase and timestamp unchanged.
        assert!(!session.begin_analysis());
        assert_eq!(session.phase(), SessionPhase::Analyzing);
        assert_eq!(session.ended_at().unwrap(), ended);
    }

    #[test]
    fn ended_at_is_never_before_started_at() {
        let mut session = active_session();
        session.begin_analysis();
        assert!(session.ended_at().unwrap() >= session.started_at());
    }

    #[test]
    fn complete_is_idempotent_and_terminal() {
        let mut session = active_session();
        session.begin_analysis();
        session.complete();
        assert_eq!(session.phase(), SessionPhase::Complete);
        session.complete();
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert!(session.activate().is_err());
    }

    #[test]
    fn merge_report_counts_adopted_fields() {
        let mut session = active_session();
        let proposed = IncidentReport {
            place: Some("ulica Główna".into()),
            importance: Some(4),
            ..Default::default()
        };
        assert_eq!(session.merge_report(&proposed), 2);
        // Re-applying the same proposal changes nothing.
        assert_eq!(session.merge_report(&proposed), 0);
    }

    #[test]
    fn duration_uses_end_time_once_ended() {
        let mut session = active_session();
        session.begin_analysis();
        let d1 = session.duration_seconds();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(session.duration_seconds(), d1);
    }
}
