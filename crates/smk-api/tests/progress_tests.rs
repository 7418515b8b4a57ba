use std::sync::Arc;

use smk_api::{Outcome, progress::DomainProgressService};
use smk_db::{MemoryStore, memory::FailPoint};
use smk_srs::MasteryTally;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::common::{SHORT_WAIT, TestApp, seed, slow};

#[tokio::test]
async fn test_progress_classifies_every_concept() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let notebook_id = seed::notebook(&app.store, None).await;
    let concepts = seed::concepts(&app.store, notebook_id, 5).await;

    // Dominated by repetitions, dominated by ease, learning, learning by short interval
    seed::learning_state(&app.store, user_id, concepts[0], 2, 3.0, 2.5).await;
    seed::learning_state(&app.store, user_id, concepts[1], 1, 1.0, 2.7).await;
    seed::learning_state(&app.store, user_id, concepts[2], 1, 1.0, 2.5).await;
    seed::learning_state(&app.store, user_id, concepts[3], 0, 0.5, 2.5).await;

    let outcome = app
        .state
        .progress
        .compute(notebook_id, Some(user_id), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        Outcome::Computed(MasteryTally {
            total: 5,
            dominated: 2,
            learning: 2,
            not_started: 1,
        })
    );
}

#[tokio::test]
async fn test_progress_without_user_is_all_not_started() {
    let app = TestApp::new();
    let notebook_id = seed::notebook(&app.store, None).await;
    let concepts = seed::concepts(&app.store, notebook_id, 3).await;
    seed::learning_state(&app.store, Uuid::new_v4(), concepts[0], 5, 20.0, 2.5).await;

    let outcome = app
        .state
        .progress
        .compute(notebook_id, None, &CancellationToken::new())
        .await;

    assert_eq!(outcome, Outcome::Computed(MasteryTally::all_not_started(3)));
}

#[tokio::test]
async fn test_progress_of_empty_notebook() {
    let app = TestApp::new();
    let notebook_id = seed::notebook(&app.store, None).await;

    let outcome = app
        .state
        .progress
        .compute(notebook_id, Some(Uuid::new_v4()), &CancellationToken::new())
        .await;

    assert_eq!(outcome, Outcome::Computed(MasteryTally::default()));
}

#[tokio::test]
async fn test_progress_sums_to_total_across_batches() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let notebook_id = seed::notebook(&app.store, None).await;
    // More concepts than one batch
    let concepts = seed::concepts(&app.store, notebook_id, 27).await;
    for (i, concept_id) in concepts.iter().enumerate() {
        if i % 3 == 0 {
            seed::learning_state(&app.store, user_id, *concept_id, (i % 4) as i32, i as f64 / 4.0, 2.5)
                .await;
        }
    }

    let tally = app
        .state
        .progress
        .compute(notebook_id, Some(user_id), &CancellationToken::new())
        .await
        .into_value()
        .unwrap();

    assert_eq!(tally.total, 27);
    assert_eq!(tally.dominated + tally.learning + tally.not_started, tally.total);
}

#[tokio::test]
async fn test_failed_learning_state_reads_degrade_to_not_started() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    let notebook_id = seed::notebook(&app.store, None).await;
    let concepts = seed::concepts(&app.store, notebook_id, 3).await;
    for concept_id in &concepts {
        seed::learning_state(&app.store, user_id, *concept_id, 3, 10.0, 2.5).await;
    }
    app.store.fail(FailPoint::LearningState(concepts[1])).await;

    let outcome = app
        .state
        .progress
        .compute(notebook_id, Some(user_id), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        Outcome::Partial {
            value: MasteryTally {
                total: 3,
                dominated: 2,
                learning: 0,
                not_started: 1,
            },
            failures: 1,
        }
    );
}

#[tokio::test]
async fn test_failed_concept_list_defaults_to_zero() {
    let app = TestApp::new();
    let notebook_id = seed::notebook(&app.store, None).await;
    seed::concepts(&app.store, notebook_id, 4).await;
    app.store.fail(FailPoint::Concepts(notebook_id)).await;

    let outcome = app
        .state
        .progress
        .compute(notebook_id, Some(Uuid::new_v4()), &CancellationToken::new())
        .await;

    assert!(matches!(outcome, Outcome::Defaulted { .. }));
    assert_eq!(outcome.into_value(), Some(MasteryTally::default()));
}

#[tokio::test]
async fn test_cancelled_token_returns_cancelled() {
    let app = TestApp::new();
    let notebook_id = seed::notebook(&app.store, None).await;
    seed::concepts(&app.store, notebook_id, 2).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = app
        .state
        .progress
        .compute(notebook_id, Some(Uuid::new_v4()), &cancel)
        .await;
    assert!(outcome.is_cancelled());
}

#[tokio::test]
async fn test_cancellation_cuts_a_stalled_computation_short() {
    let inner = MemoryStore::new();
    let notebook_id = seed::notebook(&inner, None).await;
    seed::concepts(&inner, notebook_id, 4).await;
    let store = Arc::new(slow::SlowStore {
        inner,
        delay: slow::LONG,
    });
    let service = DomainProgressService::new(store, 10);

    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            service
                .compute(notebook_id, Some(Uuid::new_v4()), &cancel)
                .await
        })
    };

    tokio::time::sleep(SHORT_WAIT).await;
    cancel.cancel();

    let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("computation was not cut short")
        .unwrap();
    assert!(outcome.is_cancelled());
}
