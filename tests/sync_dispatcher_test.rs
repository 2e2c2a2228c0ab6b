//! Tests for the background reorder push and its persisted-state machine

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use catreorder::application::{PersistState, SyncDispatcher};
use catreorder::domain::{CategoryId, CategoryNode, Forest, ReorderRequest};
use catreorder::infrastructure::{CategoryStore, InfraError, InfraResult};
use catreorder::util::testing;

/// Records pushes; optionally fails or delays them by the first item's id.
#[derive(Default)]
struct RecordingStore {
    pushed: Mutex<Vec<ReorderRequest>>,
    fail_status: Option<u16>,
    delays: HashMap<CategoryId, Duration>,
}

#[async_trait]
impl CategoryStore for RecordingStore {
    async fn list(&self) -> InfraResult<Vec<CategoryNode>> {
        Ok(Vec::new())
    }

    async fn reorder(&self, request: &ReorderRequest) -> InfraResult<()> {
        let first = request.items.first().map(|i| i.id);
        if let Some(delay) = first.and_then(|id| self.delays.get(&id)) {
            tokio::time::sleep(*delay).await;
        }
        self.pushed.lock().unwrap().push(request.clone());
        match self.fail_status {
            Some(status) => Err(InfraError::Remote {
                status,
                message: "Server Error".into(),
            }),
            None => Ok(()),
        }
    }
}

fn forest(first: CategoryId, second: CategoryId) -> Forest {
    testing::init_test_setup();
    Forest::from_nodes(&[
        CategoryNode::new(first, "first").with_order(1),
        CategoryNode::new(second, "second").with_order(2),
    ])
    .unwrap()
}

#[tokio::test]
async fn given_push_when_settled_then_persisted_and_payload_recorded() {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = SyncDispatcher::new(store.clone());
    assert_eq!(dispatcher.state(), PersistState::Idle);

    let handle = dispatcher.push(&forest(1, 2));

    assert_eq!(handle.generation(), 1);
    assert_eq!(dispatcher.state(), PersistState::InFlight { generation: 1 });
    assert_eq!(
        handle.wait().await,
        PersistState::Persisted { generation: 1 }
    );
    assert_eq!(dispatcher.state(), PersistState::Persisted { generation: 1 });

    let pushed = store.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    assert_eq!(
        pushed[0].items.iter().map(|i| (i.id, i.order)).collect::<Vec<_>>(),
        vec![(1, 1), (2, 2)]
    );
}

#[tokio::test]
async fn given_failing_store_when_pushing_then_failed_state_without_retry() {
    let store = Arc::new(RecordingStore {
        fail_status: Some(500),
        ..Default::default()
    });
    let dispatcher = SyncDispatcher::new(store.clone());

    let state = dispatcher.push(&forest(1, 2)).wait().await;

    match &state {
        PersistState::Failed {
            generation,
            message,
        } => {
            assert_eq!(*generation, 1);
            assert!(message.contains("Server Error"), "message: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(dispatcher.state(), state);
    assert_eq!(store.pushed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn given_older_push_settling_last_when_observing_then_newer_state_kept() {
    let store = Arc::new(RecordingStore {
        delays: HashMap::from([(1, Duration::from_millis(100))]),
        ..Default::default()
    });
    let dispatcher = SyncDispatcher::new(store.clone());

    let slow = dispatcher.push(&forest(1, 2));
    let fast = dispatcher.push(&forest(2, 1));

    assert_eq!(fast.wait().await, PersistState::Persisted { generation: 2 });
    assert_eq!(slow.wait().await, PersistState::Persisted { generation: 1 });
    assert_eq!(dispatcher.state(), PersistState::Persisted { generation: 2 });
    assert_eq!(store.pushed.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn given_subscriber_when_push_settles_then_transition_observed() {
    let dispatcher = SyncDispatcher::new(Arc::new(RecordingStore::default()));
    let mut rx = dispatcher.subscribe();

    let _detached = dispatcher.push(&forest(1, 2));

    assert_eq!(*rx.borrow_and_update(), PersistState::InFlight { generation: 1 });
    let settled = rx.wait_for(PersistState::is_settled).await.unwrap().clone();
    assert_eq!(settled, PersistState::Persisted { generation: 1 });
}

#[test]
fn given_no_async_runtime_when_pushing_then_failed_without_sending() {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = SyncDispatcher::new(store.clone());

    let handle = dispatcher.push(&forest(1, 2));

    assert!(handle.is_finished());
    match dispatcher.state() {
        PersistState::Failed { generation, message } => {
            assert_eq!(generation, 1);
            assert!(message.contains("no async runtime"), "message: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(store.pushed.lock().unwrap().is_empty());
}
