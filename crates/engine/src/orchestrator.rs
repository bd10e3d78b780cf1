//! Analysis orchestration.
//!
//! Two trigger paths feed the completion capability:
//!
//! - **Incremental extraction** after caller turns while the call is live.
//!   At most one extraction is in flight per session; turns arriving
//!   mid-flight coalesce into a single follow-up pass instead of racing
//!   the merge step.
//! - **Final analysis** exactly once per session, at call end: title,
//!   narrative summary, and final report run concurrently, each failure
//!   tolerated independently.
//!
//! No code path here may stop the session from being persisted in its
//! best-known state. Session locks are never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use cs_domain::error::Result;
use cs_domain::report::IncidentReport;
use cs_domain::trace::TraceEvent;
use cs_providers::CompletionClient;
use cs_sessions::{ConversationRecord, SessionPhase, SessionStore};

use crate::controller::SessionHandle;
use crate::prompts;

/// Per-session backpressure state for incremental extraction.
#[derive(Default)]
struct IncrementalGuard {
    running: bool,
    pending: bool,
}

/// Issues completion calls and reconciles their results into the session.
pub struct AnalysisOrchestrator {
    client: Arc<dyn CompletionClient>,
    store: Arc<SessionStore>,
    incremental: Mutex<HashMap<String, IncrementalGuard>>,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, store: Arc<SessionStore>) -> Self {
        Self {
            client,
            store,
            incremental: Mutex::new(HashMap::new()),
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Incremental extraction
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Schedule a best-effort incremental extraction for this session.
    ///
    /// Non-blocking: the work runs on a spawned task. If an extraction is
    /// already in flight for the session, a follow-up is noted instead of
    /// firing a second concurrent call; any number of triggers during one
    /// flight collapse into a single follow-up pass over the then-current
    /// transcript.
    pub fn schedule_incremental(self: &Arc<Self>, handle: &SessionHandle) {
        let session_id = handle.lock().id().to_owned();

        {
            let mut guards = self.incremental.lock();
            let guard = guards.entry(session_id.clone()).or_default();
            if guard.running {
                guard.pending = true;
                return;
            }
            guard.running = true;
        }

        let this = Arc::clone(self);
        let handle = Arc::clone(handle);
        tokio::spawn(async move {
            loop {
                this.run_extraction_once(&handle, &session_id).await;

                let mut guards = this.incremental.lock();
                let guard = guards.entry(session_id.clone()).or_default();
                if guard.pending {
                    guard.pending = false;
                    // Another caller turn arrived mid-flight: go again.
                } else {
                    guard.running = false;
                    break;
                }
            }
        });
    }

    /// One extraction pass: render, call, merge, persist. All failures are
    /// recoverable ("no new information") and only logged.
    async fn run_extraction_once(&self, handle: &SessionHandle, session_id: &str) {
        let (transcript, current, phase) = {
            let session = handle.lock();
            (
                session.transcript_text(),
                session.report().clone(),
                session.phase(),
            )
        };

        // The call may have ended while this trigger was queued; the final
        // analysis owns extraction from here on.
        if phase != SessionPhase::Active {
            return;
        }

        TraceEvent::ExtractionRequested {
            session_id: session_id.to_owned(),
            incremental: true,
        }
        .emit();

        let content = match self
            .client
            .complete(prompts::report_request(&transcript, &current))
            .await
        {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "incremental extraction call failed");
                return;
            }
        };

        let proposed = match IncidentReport::from_json_str(&content) {
            Ok(proposed) => proposed,
            Err(e) => {
                TraceEvent::ExtractionDiscarded {
                    session_id: session_id.to_owned(),
                    reason: e.to_string(),
                }
                .emit();
                return;
            }
        };

        let record = {
            let mut session = handle.lock();
            session.merge_report(&proposed);
            ConversationRecord::from(&*session)
        };

        // Incremental persistence is best-effort; the final save surfaces
        // storage errors to the caller of end().
        if let Err(e) = self.store.save(record) {
            tracing::warn!(session_id, error = %e, "incremental save failed");
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Final analysis
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Run the end-of-call analysis and move the session to `Complete`.
    ///
    /// Idempotent: only the caller that wins the `Active → Analyzing`
    /// transition does any work; later calls return immediately. The three
    /// completion calls run concurrently and fail independently; a failed
    /// call leaves its field at the last known value. The session is
    /// persisted afterwards in every case; only a storage failure is
    /// surfaced.
    pub async fn finalize(&self, handle: &SessionHandle) -> Result<()> {
        let (won, session_id, transcript, scenario, duration, current, turns) = {
            let mut session = handle.lock();
            (
                session.begin_analysis(),
                session.id().to_owned(),
                session.transcript_text(),
                session.scenario().to_owned(),
                session.duration_seconds(),
                session.report().clone(),
                session.turns().len(),
            )
        };

        if !won {
            return Ok(());
        }

        TraceEvent::FinalAnalysisStarted {
            session_id: session_id.clone(),
            turns,
            duration_s: duration,
        }
        .emit();

        let (title_res, summary_res, report_res) = tokio::join!(
            self.client.complete(prompts::title_request(&transcript)),
            self.client
                .complete(prompts::analysis_request(duration, &scenario, &transcript)),
            self.client
                .complete(prompts::report_request(&transcript, &current)),
        );

        let title_ok = title_res.is_ok();
        let summary_ok = summary_res.is_ok();
        let mut report_ok = false;

        let record = {
            let mut session = handle.lock();

            match title_res {
                Ok(title) if !title.trim().is_empty() => session.set_title(title.trim()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "title call failed")
                }
            }

            match summary_res {
                Ok(summary) if !summary.trim().is_empty() => session.set_summary(summary.trim()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "summary call failed")
                }
            }

            match report_res {
                Ok(content) => match IncidentReport::from_json_str(&content) {
                    Ok(proposed) => {
                        session.merge_report(&proposed);
                        report_ok = true;
                    }
                    Err(e) => {
                        TraceEvent::ExtractionDiscarded {
                            session_id: session_id.clone(),
                            reason: e.to_string(),
                        }
                        .emit();
                    }
                },
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "report call failed")
                }
            }

            session.complete();
            ConversationRecord::from(&*session)
        };

        TraceEvent::FinalAnalysisCompleted {
            session_id: session_id.clone(),
            title_ok,
            summary_ok,
            report_ok,
        }
        .emit();

        // The session is gone from the incremental map from here on.
        self.incremental.lock().remove(&session_id);

        self.store.save(record)
    }
}
