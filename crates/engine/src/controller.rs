//! The top-level call controller.
//!
//! Owns at most one active [`ConversationSession`] at a time and passes it
//! explicitly to the orchestrator and the store; there is no ambient
//! "current session" global. The transport layer drives it: scenario
//! chosen is `begin`, call connected is `connected`, each spoken turn is
//! `observe_turn`, call over (or dropped) is `end_call`.

use std::sync::Arc;

use parking_lot::Mutex;

use cs_domain::config::{AnalysisConfig, Config};
use cs_domain::error::Result;
use cs_providers::{ChatProxyClient, CompletionClient};
use cs_sessions::{ConversationRecord, ConversationSession, SessionStore, Speaker};

use crate::orchestrator::AnalysisOrchestrator;

/// Shared handle to one session. Mutations are serialized by the lock,
/// which is only ever held for synchronous sections.
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Coordinates the active call, the analysis pipeline, and persistence.
pub struct CallController {
    store: Arc<SessionStore>,
    orchestrator: Arc<AnalysisOrchestrator>,
    analysis: AnalysisConfig,
    current: Mutex<Option<SessionHandle>>,
}

impl CallController {
    /// Wire a controller from explicit collaborators. Tests inject a mock
    /// completion client here.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<SessionStore>,
        analysis: AnalysisConfig,
    ) -> Self {
        let orchestrator = Arc::new(AnalysisOrchestrator::new(client, Arc::clone(&store)));
        Self {
            store,
            orchestrator,
            analysis,
            current: Mutex::new(None),
        }
    }

    /// Build the production wiring from config: chat-proxy client plus the
    /// JSON-file store under the configured state path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(ChatProxyClient::from_config(&config.llm)?);
        let store = Arc::new(SessionStore::new(&config.storage.state_path)?);
        Ok(Self::new(client, store, config.analysis.clone()))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Start a new training call with the given scenario text and make it
    /// the active session. The fresh record is persisted immediately.
    pub fn begin(&self, scenario: &str) -> Result<SessionHandle> {
        let handle: SessionHandle = Arc::new(Mutex::new(ConversationSession::new(scenario)));
        self.persist(&handle)?;
        *self.current.lock() = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// The voice transport connected: the call is live.
    pub fn connected(&self) -> Result<()> {
        let Some(handle) = self.active() else {
            return Ok(());
        };
        handle.lock().activate()?;
        self.persist(&handle)
    }

    /// One spoken turn arrived from the transport.
    ///
    /// Appends and persists; for caller turns while incremental extraction
    /// is enabled it also schedules a best-effort report extraction.
    pub fn observe_turn(&self, text: &str, speaker: Speaker) -> Result<()> {
        let Some(handle) = self.active() else {
            return Ok(());
        };

        handle.lock().add_turn(text, speaker)?;
        self.persist(&handle)?;

        if speaker == Speaker::Caller && self.analysis.incremental {
            self.orchestrator.schedule_incremental(&handle);
        }
        Ok(())
    }

    /// The call ended (operator hung up or the transport dropped).
    ///
    /// Runs the final analysis and completes the session. Idempotent: a
    /// second call while analysis is in flight, or after completion, is a
    /// no-op. Analysis failures are absorbed; only a storage failure on
    /// the final save is returned.
    pub async fn end_call(&self) -> Result<()> {
        let Some(handle) = self.active() else {
            return Ok(());
        };
        self.orchestrator.finalize(&handle).await
    }

    // ── Access ────────────────────────────────────────────────────────

    /// The active session, if a call is in progress or just finished.
    pub fn active(&self) -> Option<SessionHandle> {
        self.current.lock().clone()
    }

    /// Reconstruct a stored session for review. Records persisted mid-call
    /// come back `Active` and must be treated read-only.
    pub fn open(&self, id: &str) -> Option<ConversationSession> {
        self.store.get(id).map(ConversationSession::from)
    }

    /// All stored records, newest call first.
    pub fn sessions(&self) -> Vec<ConversationRecord> {
        let mut records = self.store.list();
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        records
    }

    /// Delete a stored record. Absent ids are a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    // ── Private helpers ───────────────────────────────────────────────

    fn persist(&self, handle: &SessionHandle) -> Result<()> {
        let record = ConversationRecord::from(&*handle.lock());
        self.store.save(record)
    }
}
