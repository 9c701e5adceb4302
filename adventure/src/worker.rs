//! Async AI worker that owns the adventure session.
//!
//! The UI never awaits the model. It sends [`WorkerRequest`]s over a bounded
//! channel and drains [`WorkerResponse`]s each frame. A turn produces two
//! responses: `StoryReady` once the text phase lands, then `SceneReady` once
//! the image phase finishes.

use std::collections::VecDeque;

use adventure_core::{AdventureSession, ImageSize, Scene, StoryResponse, TurnAction};
use tokio::sync::mpsc;

/// Request sent from the UI to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerRequest {
    /// Play the opening turn.
    Start,
    /// Play a turn with free-form action text.
    PlayerAction(String),
    /// Play a turn with the text of a suggested choice.
    Choice(String),
    /// Change the resolution used for the next image request.
    SetImageSize(ImageSize),
    /// Stop the worker.
    Shutdown,
}

/// Response sent from the worker to the UI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    /// Text phase finished and was merged into the session.
    StoryReady {
        story: StoryResponse,
        /// The player's action, `None` for the opening turn.
        action: Option<String>,
        turn: u32,
    },
    /// Image phase finished (possibly with a placeholder).
    SceneReady(Scene),
    /// Text phase failed; the session is unchanged.
    StoryFailed(String),
}

/// Spawn the worker on the current tokio runtime.
pub fn spawn_worker(
    session: AdventureSession,
) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, request_rx) = mpsc::channel(8);
    let (response_tx, response_rx) = mpsc::channel(64);

    tokio::spawn(worker_loop(session, request_rx, response_tx));

    (request_tx, response_rx)
}

async fn worker_loop(
    mut session: AdventureSession,
    mut request_rx: mpsc::Receiver<WorkerRequest>,
    response_tx: mpsc::Sender<WorkerResponse>,
) {
    // Requests that arrived mid-turn and have to wait for it to finish
    let mut deferred: VecDeque<WorkerRequest> = VecDeque::new();

    loop {
        let request = match deferred.pop_front() {
            Some(request) => Some(request),
            None => request_rx.recv().await,
        };

        let action = match request {
            Some(WorkerRequest::Start) => TurnAction::Start,
            Some(WorkerRequest::PlayerAction(input)) => TurnAction::Custom(input),
            Some(WorkerRequest::Choice(text)) => TurnAction::Choice(text),
            Some(WorkerRequest::SetImageSize(size)) => {
                session.set_image_size(size);
                continue;
            }
            Some(WorkerRequest::Shutdown) | None => break,
        };

        let keep_going = play_turn(
            &mut session,
            action,
            &mut request_rx,
            &mut deferred,
            &response_tx,
        )
        .await;
        if !keep_going {
            break;
        }
    }

    tracing::debug!("worker stopped");
}

/// Run both phases of a turn. Returns `false` if a shutdown arrived.
async fn play_turn(
    session: &mut AdventureSession,
    action: TurnAction,
    request_rx: &mut mpsc::Receiver<WorkerRequest>,
    deferred: &mut VecDeque<WorkerRequest>,
    response_tx: &mpsc::Sender<WorkerResponse>,
) -> bool {
    let echoed = match &action {
        TurnAction::Start => None,
        TurnAction::Choice(text) | TurnAction::Custom(text) => Some(text.trim().to_string()),
    };

    let story = match session.take_turn(action).await {
        Ok(story) => story,
        Err(e) => {
            let _ = response_tx
                .send(WorkerResponse::StoryFailed(e.to_string()))
                .await;
            return true;
        }
    };

    let _ = response_tx
        .send(WorkerResponse::StoryReady {
            story: story.clone(),
            action: echoed,
            turn: session.state().turn,
        })
        .await;

    // Size changes made while the text was generating apply to this image
    let mut shutdown = false;
    while let Ok(request) = request_rx.try_recv() {
        match request {
            WorkerRequest::SetImageSize(size) => session.set_image_size(size),
            WorkerRequest::Shutdown => shutdown = true,
            other => deferred.push_back(other),
        }
    }
    if shutdown {
        return false;
    }

    let scene = session.paint_scene(&story.image_prompt).await.clone();
    let _ = response_tx.send(WorkerResponse::SceneReady(scene)).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::testing::MockCall;
    use adventure_core::{MockStory, MockStoryteller, SessionConfig};

    fn spawn_mock(mock: &MockStoryteller) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
        let session =
            AdventureSession::with_storyteller(Box::new(mock.clone()), SessionConfig::new());
        spawn_worker(session)
    }

    #[tokio::test]
    async fn test_story_arrives_before_scene() {
        let mock = MockStoryteller::with_stories(vec![MockStory::narrative("A dark forest.")]);
        let (tx, mut rx) = spawn_mock(&mock);

        tx.send(WorkerRequest::Start).await.unwrap();

        match rx.recv().await.unwrap() {
            WorkerResponse::StoryReady { story, action, turn } => {
                assert_eq!(story.narrative, "A dark forest.");
                assert_eq!(action, None);
                assert_eq!(turn, 1);
            }
            other => panic!("expected StoryReady, got {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), WorkerResponse::SceneReady(_)));

        tx.send(WorkerRequest::Shutdown).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_story_skips_scene() {
        let mock = MockStoryteller::new();
        mock.queue_story_failure("bad json");
        let (tx, mut rx) = spawn_mock(&mock);

        tx.send(WorkerRequest::PlayerAction("Run".to_string()))
            .await
            .unwrap();
        assert!(matches!(rx.recv().await.unwrap(), WorkerResponse::StoryFailed(_)));

        // Worker keeps serving after a failure
        tx.send(WorkerRequest::PlayerAction("Run again".to_string()))
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            WorkerResponse::StoryReady { action, .. } => {
                assert_eq!(action.as_deref(), Some("Run again"));
            }
            other => panic!("expected StoryReady, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_size_change_applies_to_next_image() {
        let mock = MockStoryteller::new();
        let (tx, mut rx) = spawn_mock(&mock);

        tx.send(WorkerRequest::SetImageSize(ImageSize::FourK))
            .await
            .unwrap();
        tx.send(WorkerRequest::Start).await.unwrap();

        let _story = rx.recv().await.unwrap();
        match rx.recv().await.unwrap() {
            WorkerResponse::SceneReady(scene) => assert_eq!(scene.size, ImageSize::FourK),
            other => panic!("expected SceneReady, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_requests_during_text_phase() {
        let mock = MockStoryteller::new();
        let (tx, mut rx) = spawn_mock(&mock);

        // Queued before the worker runs, so they land mid-turn
        tx.send(WorkerRequest::Start).await.unwrap();
        tx.send(WorkerRequest::SetImageSize(ImageSize::FourK))
            .await
            .unwrap();
        tx.send(WorkerRequest::Choice("Go forward".to_string()))
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            WorkerResponse::StoryReady { action, turn, .. } => {
                assert_eq!(action, None);
                assert_eq!(turn, 1);
            }
            other => panic!("expected StoryReady, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            WorkerResponse::SceneReady(scene) => assert_eq!(scene.size, ImageSize::FourK),
            other => panic!("expected SceneReady, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            WorkerResponse::StoryReady { action, turn, .. } => {
                assert_eq!(action.as_deref(), Some("Go forward"));
                assert_eq!(turn, 2);
            }
            other => panic!("expected StoryReady, got {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), WorkerResponse::SceneReady(_)));

        let calls = mock.calls();
        assert!(matches!(calls[1], MockCall::Image { size: ImageSize::FourK, .. }));
        let MockCall::Story { action, .. } = &calls[2] else {
            panic!("expected a story call");
        };
        assert_eq!(action, "Go forward");
    }
}
