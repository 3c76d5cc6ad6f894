//! Background work started by the event loop.
//!
//! Each function spawns a tokio task that reports back through the `Action`
//! channel. The loop stays the only thing that touches `App`.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::backend::{AnalyzeRequest, Attachment, TutorBackend};
use crate::core::action::Action;
use crate::core::reveal::RevealId;

fn send(tx: &mpsc::Sender<Action>, action: Action) -> bool {
    let ok = tx.send(action).is_ok();
    if !ok {
        warn!("Failed to send action: receiver dropped");
    }
    ok
}

pub fn spawn_analyze(
    backend: Arc<dyn TutorBackend>,
    request: AnalyzeRequest,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!(
        "Spawning analyze request to {} ({})",
        backend.name(),
        request.endpoint()
    );
    let kind = request.kind();
    tokio::spawn(async move {
        let action = match backend.analyze(request).await {
            Ok(()) => Action::AnalyzeSucceeded(kind),
            Err(e) => Action::AnalyzeFailed(e.to_string()),
        };
        send(&tx, action);
    })
    .abort_handle()
}

pub fn spawn_answer(
    backend: Arc<dyn TutorBackend>,
    query: String,
    attachment: Option<Attachment>,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!(
        "Spawning answer request to {} (query {} bytes, attachment: {})",
        backend.name(),
        query.len(),
        attachment.is_some()
    );
    tokio::spawn(async move {
        let started = std::time::Instant::now();
        let action = match backend.generate_answer(query, attachment).await {
            Ok(body) => {
                let text = body.into_text();
                debug!(
                    "Answer received in {}ms ({} chars)",
                    started.elapsed().as_millis(),
                    text.chars().count()
                );
                Action::AnswerReceived(text)
            }
            Err(e) => Action::AnswerFailed(e.to_string()),
        };
        send(&tx, action);
    })
    .abort_handle()
}

/// Emit `ticks` `RevealTick(id)` actions, one per `interval`, the first one
/// an interval after the call.
pub fn spawn_reveal_timer(
    id: RevealId,
    ticks: usize,
    interval: Duration,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    let interval = interval.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + interval, interval);
        // A stalled loop should not receive a burst of ticks.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for _ in 0..ticks {
            timer.tick().await;
            if !send(&tx, Action::RevealTick(id)) {
                return;
            }
        }
        debug!("Reveal {:?} timer finished after {} ticks", id, ticks);
    })
    .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SourceKind;
    use crate::test_support::ScriptedBackend;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn analyze_success_reports_kind() {
        let backend = Arc::new(ScriptedBackend::default());
        let (tx, rx) = mpsc::channel();
        spawn_analyze(
            backend.clone(),
            AnalyzeRequest::Youtube {
                url: "https://www.youtube.com/watch?v=abc123".to_string(),
            },
            tx,
        );

        match rx.recv_timeout(WAIT).unwrap() {
            Action::AnalyzeSucceeded(kind) => assert_eq!(kind, SourceKind::Video),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.analyzed.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn analyze_failure_reports_error() {
        let (tx, rx) = mpsc::channel();
        spawn_analyze(
            Arc::new(ScriptedBackend::failing()),
            AnalyzeRequest::Pdf(Attachment::new("a.pdf", "application/pdf", vec![1])),
            tx,
        );
        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            Action::AnalyzeFailed(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn answer_is_decoded_to_text() {
        let backend = Arc::new(ScriptedBackend::answering(r#"{"answer":"x = 2"}"#));
        let (tx, rx) = mpsc::channel();
        spawn_answer(backend.clone(), "solve 2x = 4".to_string(), None, tx);

        match rx.recv_timeout(WAIT).unwrap() {
            Action::AnswerReceived(text) => assert_eq!(text, "x = 2"),
            other => panic!("unexpected {other:?}"),
        }
        let questions = backend.questions.lock().unwrap();
        assert_eq!(questions[0].0, "solve 2x = 4");
        assert!(questions[0].1.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn answer_failure_reports_error() {
        let (tx, rx) = mpsc::channel();
        spawn_answer(Arc::new(ScriptedBackend::failing()), "q".to_string(), None, tx);
        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            Action::AnswerFailed(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reveal_timer_emits_exact_tick_count() {
        let (tx, rx) = mpsc::channel();
        spawn_reveal_timer(RevealId(7), 3, Duration::from_millis(5), tx);

        for _ in 0..3 {
            match rx.recv_timeout(WAIT).unwrap() {
                Action::RevealTick(id) => assert_eq!(id, RevealId(7)),
                other => panic!("unexpected {other:?}"),
            }
        }
        // Sender is dropped when the task ends.
        assert!(rx.recv_timeout(WAIT).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn aborted_reveal_timer_stops() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_reveal_timer(RevealId(1), 1000, Duration::from_millis(50), tx);
        handle.abort();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
