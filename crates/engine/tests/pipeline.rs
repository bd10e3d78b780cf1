//! Integration tests for the analysis pipeline: full session lifecycle
//! against a deterministic in-test completion client, no network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use cs_domain::config::AnalysisConfig;
use cs_domain::error::{Error, Result};
use cs_engine::CallController;
use cs_providers::{CompletionClient, CompletionRequest};
use cs_sessions::{SessionPhase, SessionStore, Speaker};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock completion client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scripted responses per call kind. Requests are routed by shape: JSON
/// mode = report extraction, otherwise the title prompt is recognized by
/// its wording and everything else is the summary call.
#[derive(Default)]
struct MockClient {
    titles: Mutex<VecDeque<std::result::Result<String, String>>>,
    summaries: Mutex<VecDeque<std::result::Result<String, String>>>,
    reports: Mutex<VecDeque<std::result::Result<String, String>>>,
    title_calls: AtomicUsize,
    summary_calls: AtomicUsize,
    report_calls: AtomicUsize,
    /// When set, report calls block on this gate after being counted.
    report_gate: Option<Arc<Semaphore>>,
}

impl MockClient {
    fn pop(
        queue: &Mutex<VecDeque<std::result::Result<String, String>>>,
        fallback: &str,
    ) -> Result<String> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(Error::Http(message)),
            None => Ok(fallback.to_owned()),
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        if req.json_mode {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.report_gate {
                gate.acquire().await.unwrap().forget();
            }
            Self::pop(&self.reports, "{}")
        } else if req.messages[0].content.contains("opisowe tytuły") {
            self.title_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.titles, "Tytuł Testowy")
        } else {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.summaries, "Ocena rozmowy.")
        }
    }

    fn provider_id(&self) -> &str {
        "mock"
    }
}

fn controller_with(
    client: Arc<MockClient>,
    incremental: bool,
) -> (CallController, Arc<SessionStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(dir.path()).unwrap());
    let controller = CallController::new(
        client,
        Arc::clone(&store),
        AnalysisConfig { incremental },
    );
    (controller, store, dir)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within timeout");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Final analysis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn failed_title_call_still_completes_the_session() {
    let client = Arc::new(MockClient {
        titles: Mutex::new(VecDeque::from([Err("connection reset".to_owned())])),
        summaries: Mutex::new(VecDeque::from([Ok("## Ocena\nDobra rozmowa.".to_owned())])),
        reports: Mutex::new(VecDeque::from([Ok(
            r#"{"reason":"wypadek","place":"ulica Główna","important_level":4}"#.to_owned(),
        )])),
        ..Default::default()
    });
    let (controller, store, _dir) = controller_with(Arc::clone(&client), false);

    let handle = controller.begin("Zgłoś wypadek samochodowy.").unwrap();
    controller.connected().unwrap();
    controller.observe_turn("Słucham?", Speaker::Operator).unwrap();
    controller
        .observe_turn("Wypadek na Głównej!", Speaker::Caller)
        .unwrap();

    // end() must not surface the analysis failure.
    controller.end_call().await.unwrap();

    let session = handle.lock().clone();
    assert_eq!(session.phase(), SessionPhase::Complete);
    assert_eq!(session.title(), "");
    assert_eq!(session.summary(), "## Ocena\nDobra rozmowa.");
    assert_eq!(session.report().place.as_deref(), Some("ulica Główna"));
    assert_eq!(session.report().importance, Some(4));

    // The saved record reflects the same best-known state.
    let record = store.get(session.id()).unwrap();
    assert_eq!(record.title, "");
    assert!(!record.summary.is_empty());
    assert!(record.end_time.is_some());
}

#[tokio::test]
async fn end_call_is_idempotent() {
    let client = Arc::new(MockClient::default());
    let (controller, _store, _dir) = controller_with(Arc::clone(&client), false);

    let handle = controller.begin("Zgłoś pożar domu.").unwrap();
    controller.connected().unwrap();
    controller.observe_turn("Pali się!", Speaker::Caller).unwrap();

    controller.end_call().await.unwrap();
    let ended_at = handle.lock().ended_at().unwrap();
    let title = handle.lock().title().to_owned();

    controller.end_call().await.unwrap();

    // Second end(): no new analysis calls, no changed artifacts.
    assert_eq!(client.title_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.summary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.report_calls.load(Ordering::SeqCst), 1);
    assert_eq!(handle.lock().ended_at().unwrap(), ended_at);
    assert_eq!(handle.lock().title(), title);
}

#[tokio::test]
async fn malformed_report_response_is_no_update() {
    let client = Arc::new(MockClient {
        reports: Mutex::new(VecDeque::from([Ok(
            "Przepraszam, nie mogę wygenerować raportu.".to_owned(),
        )])),
        ..Default::default()
    });
    let (controller, _store, _dir) = controller_with(client, false);

    let handle = controller.begin("Zgłoś napad.").unwrap();
    controller.connected().unwrap();
    controller.observe_turn("Napad na sklep!", Speaker::Caller).unwrap();
    controller.end_call().await.unwrap();

    let session = handle.lock().clone();
    assert_eq!(session.phase(), SessionPhase::Complete);
    assert!(session.report().is_empty());
}

#[tokio::test]
async fn turns_after_end_are_rejected() {
    let client = Arc::new(MockClient::default());
    let (controller, _store, _dir) = controller_with(client, false);

    controller.begin("Zgłoś wyciek gazu.").unwrap();
    controller.connected().unwrap();
    controller.observe_turn("Czuć gaz!", Speaker::Caller).unwrap();
    controller.end_call().await.unwrap();

    assert!(controller
        .observe_turn("jeszcze jedno", Speaker::Caller)
        .is_err());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Incremental extraction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(flavor = "multi_thread")]
async fn incremental_extraction_never_regresses_confirmed_fields() {
    let client = Arc::new(MockClient {
        reports: Mutex::new(VecDeque::from([
            Ok(r#"{"place":"ulica Główna"}"#.to_owned()),
            Ok(r#"{"victims":"brak poszkodowanych","place":""}"#.to_owned()),
        ])),
        ..Default::default()
    });
    let (controller, _store, _dir) = controller_with(Arc::clone(&client), true);

    let handle = controller.begin("Zgłoś wypadek samochodowy.").unwrap();
    controller.connected().unwrap();

    controller
        .observe_turn("wypadek na Głównej", Speaker::Caller)
        .unwrap();
    wait_until(|| handle.lock().report().place.is_some()).await;
    assert_eq!(handle.lock().report().place.as_deref(), Some("ulica Główna"));
    assert!(handle.lock().report().victims.is_none());

    controller
        .observe_turn("nikt nie jest ranny", Speaker::Caller)
        .unwrap();
    wait_until(|| handle.lock().report().victims.is_some()).await;

    // The empty place in the second extraction must not erase the first.
    let report = handle.lock().report().clone();
    assert_eq!(report.place.as_deref(), Some("ulica Główna"));
    assert_eq!(report.victims.as_deref(), Some("brak poszkodowanych"));
}

#[tokio::test(flavor = "multi_thread")]
async fn turns_during_inflight_extraction_coalesce() {
    let gate = Arc::new(Semaphore::new(0));
    let client = Arc::new(MockClient {
        report_gate: Some(Arc::clone(&gate)),
        ..Default::default()
    });
    let (controller, _store, _dir) = controller_with(Arc::clone(&client), true);

    controller.begin("Zgłoś powódź.").unwrap();
    controller.connected().unwrap();

    // Three rapid caller turns: the first starts an extraction that blocks
    // on the gate, the other two must coalesce into one follow-up.
    controller.observe_turn("woda w domu", Speaker::Caller).unwrap();
    wait_until(|| client.report_calls.load(Ordering::SeqCst) == 1).await;
    controller.observe_turn("ulica zalana", Speaker::Caller).unwrap();
    controller.observe_turn("nie mogę wyjść", Speaker::Caller).unwrap();

    assert_eq!(client.report_calls.load(Ordering::SeqCst), 1);

    gate.add_permits(10);
    wait_until(|| client.report_calls.load(Ordering::SeqCst) == 2).await;

    // Settle: no third call appears.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.report_calls.load(Ordering::SeqCst), 2);
}
