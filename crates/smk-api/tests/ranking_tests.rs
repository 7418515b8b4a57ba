use std::time::Duration;

use smk_api::{EngineSettings, Outcome, ranking::UNKNOWN_STUDENT_NAME};
use smk_db::memory::FailPoint;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::common::{TestApp, now, seed};

struct Classroom {
    materia_id: Uuid,
    teacher_id: Uuid,
    notebook_id: Uuid,
}

async fn classroom(app: &TestApp) -> Classroom {
    let teacher_id = Uuid::new_v4();
    let materia_id = seed::materia(&app.store, Some(teacher_id)).await;
    let notebook_id = seed::notebook(&app.store, Some(materia_id)).await;

    Classroom {
        materia_id,
        teacher_id,
        notebook_id,
    }
}

/// Enrolled student with a profile and `points` game points.
async fn student(app: &TestApp, room: &Classroom, name: &str, points: i64) -> Uuid {
    let user_id = seed::profile(&app.store, name).await;
    seed::enroll(&app.store, user_id, room.materia_id, room.teacher_id).await;
    if points > 0 {
        seed::game(&app.store, user_id, room.notebook_id, points, now()).await;
    }
    user_id
}

#[tokio::test]
async fn test_ranking_orders_by_score() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 300).await;
    let beto = student(&app, &room, "Beto", 900).await;
    let carla = student(&app, &room, "Carla", 300).await;

    let outcome = app
        .state
        .ranking
        .materia_ranking(room.materia_id, carla, None, &CancellationToken::new())
        .await;

    let Outcome::Computed(entries) = outcome else {
        panic!("expected a computed ranking, got {outcome:?}");
    };
    let order: Vec<_> = entries.iter().map(|e| (e.position, e.user_id, e.score)).collect();
    assert_eq!(order, [(1, beto, 900), (2, ana, 300), (3, carla, 300)]);
    assert_eq!(
        entries.iter().filter(|e| e.is_current_user).count(),
        1
    );
    assert!(entries[2].is_current_user);
}

#[tokio::test]
async fn test_unenrolled_user_is_included_once() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    student(&app, &room, "Ana", 100).await;
    let outsider = seed::profile(&app.store, "Zoe").await;

    let entries = app
        .state
        .ranking
        .materia_ranking(room.materia_id, outsider, None, &CancellationToken::new())
        .await
        .into_value()
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries.iter().filter(|e| e.user_id == outsider).count(), 1);
    assert_eq!(entries.iter().find(|e| e.is_current_user).unwrap().name, "Zoe");
}

#[tokio::test]
async fn test_inactive_and_duplicate_enrollments() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    // Second active enrollment of the same student
    seed::enroll(&app.store, ana, room.materia_id, room.teacher_id).await;
    let dropped = seed::profile(&app.store, "Dropped").await;
    app.store
        .insert_enrollment(smk_db::models::Enrollment {
            student_id: dropped,
            materia_id: room.materia_id,
            teacher_id: room.teacher_id,
            status: "inactive".to_string(),
        })
        .await;

    let entries = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &CancellationToken::new())
        .await
        .into_value()
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, ana);
}

#[tokio::test]
async fn test_missing_profile_uses_placeholder_name() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let anonymous = Uuid::new_v4();
    seed::enroll(&app.store, anonymous, room.materia_id, room.teacher_id).await;

    let entries = app
        .state
        .ranking
        .materia_ranking(room.materia_id, anonymous, None, &CancellationToken::new())
        .await
        .into_value()
        .unwrap();

    assert_eq!(entries[0].name, UNKNOWN_STUDENT_NAME);
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    student(&app, &room, "Beto", 200).await;
    let cancel = CancellationToken::new();

    let first = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;
    // Newer points are not visible until the snapshot expires
    seed::game(&app.store, ana, room.notebook_id, 500, now()).await;
    let second = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;

    assert_eq!(app.store.enrollment_scans(), 1);
    assert_eq!(first, second);

    app.state.ranking.invalidate_materia(room.materia_id).await;
    let third = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await
        .into_value()
        .unwrap();

    assert_eq!(app.store.enrollment_scans(), 2);
    assert_eq!(third[0].user_id, ana);
    assert_eq!(third[0].score, 600);
}

#[tokio::test]
async fn test_expired_snapshot_is_recomputed() {
    let app = TestApp::with_settings(EngineSettings {
        ranking_cache_ttl: Duration::ZERO,
        ..EngineSettings::default()
    });
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    let cancel = CancellationToken::new();

    for _ in 0..3 {
        app.state
            .ranking
            .materia_ranking(room.materia_id, ana, None, &cancel)
            .await;
    }

    assert_eq!(app.store.enrollment_scans(), 3);
}

#[tokio::test]
async fn test_cache_is_keyed_by_teacher() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    let other_teacher = Uuid::new_v4();
    let cancel = CancellationToken::new();

    app.state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;
    let entries = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, Some(other_teacher), &cancel)
        .await
        .into_value()
        .unwrap();

    assert_eq!(app.store.enrollment_scans(), 2);
    // Nobody is enrolled under the other teacher, only the caller remains
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_degraded_ranking_is_not_cached() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    let beto = student(&app, &room, "Beto", 200).await;
    app.store.fail(FailPoint::Profile(beto)).await;
    let cancel = CancellationToken::new();

    let outcome = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;
    assert!(matches!(outcome, Outcome::Partial { failures: 1, .. }));
    assert!(app.state.ranking.cache().is_empty().await);

    app.store.recover(FailPoint::Profile(beto)).await;
    let outcome = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;
    assert!(matches!(outcome, Outcome::Computed(_)));
    assert_eq!(app.state.ranking.cache().len().await, 1);
}

#[tokio::test]
async fn test_top_five_keeps_current_user() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    for (i, name) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
        student(&app, &room, name, 1000 - 100 * i as i64).await;
    }
    let me = student(&app, &room, "Me", 10).await;

    let top = app
        .state
        .ranking
        .top_ranking(room.materia_id, me, None, 5, &CancellationToken::new())
        .await
        .into_value()
        .unwrap();

    assert_eq!(top.len(), 5);
    assert_eq!(
        top.iter().map(|e| e.position).collect::<Vec<_>>(),
        [1, 2, 3, 4, 7]
    );
    assert_eq!(top[4].user_id, me);
    assert!(top[4].is_current_user);
}

#[tokio::test]
async fn test_materia_without_teacher_ranks_only_caller() {
    let app = TestApp::new();
    let materia_id = seed::materia(&app.store, None).await;
    let me = seed::profile(&app.store, "Solo").await;

    let outcome = app
        .state
        .ranking
        .materia_ranking(materia_id, me, None, &CancellationToken::new())
        .await;

    assert!(matches!(outcome, Outcome::Defaulted { .. }));
    let entries = outcome.into_value().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, me);
    assert_eq!(entries[0].position, 1);
}

#[tokio::test]
async fn test_failed_enrollment_scan_ranks_only_caller() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    student(&app, &room, "Beto", 200).await;
    app.store.fail(FailPoint::Enrollments(room.materia_id)).await;

    let outcome = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &CancellationToken::new())
        .await;

    assert!(matches!(outcome, Outcome::Defaulted { .. }));
    let entries = outcome.into_value().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].score, 100);
}

#[tokio::test]
async fn test_cancelled_ranking_writes_nothing() {
    let app = TestApp::new();
    let room = classroom(&app).await;
    let ana = student(&app, &room, "Ana", 100).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = app
        .state
        .ranking
        .materia_ranking(room.materia_id, ana, None, &cancel)
        .await;

    assert!(outcome.is_cancelled());
    assert!(app.state.ranking.cache().is_empty().await);
}
