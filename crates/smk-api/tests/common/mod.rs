#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use serde::Deserialize;
use smk_api::{
    ApiState, AuthConfig, EngineSettings,
    auth::jwt::Claims,
    clock::{Clock, FixedClock},
    router,
};
use smk_db::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

/// Wednesday 2025-03-12, 15:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 15, 0, 0).unwrap()
}

/// In-memory store, manual clock and the state built on them
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub state: ApiState<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(now(), FixedOffset::east_opt(0).unwrap()));
        let state = ApiState::new(
            Arc::clone(&store),
            Arc::clone(&clock) as Arc<dyn Clock>,
            settings,
            AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
        );

        Self {
            store,
            clock,
            state,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(router::router().with_state(self.state.clone()))
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Bearer token for `user_id`, valid for a day
pub fn token(user_id: Uuid) -> String {
    let issued = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued.timestamp() as usize,
        exp: (issued + chrono::Duration::hours(24)).timestamp() as usize,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to generate test JWT token")
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            body,
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn get_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build authenticated request");

        self.request(request).await
    }

    pub async fn post_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build authenticated request");

        self.request(request).await
    }

    pub async fn post_json_with_auth<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        token: &str,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(json_body))
            .expect("Failed to build authenticated request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}

/// Builders for seeding a [`MemoryStore`]
pub mod seed {
    use chrono::{DateTime, NaiveDate, Utc};
    use smk_db::{
        MemoryStore, ProgressStore,
        models::{
            Concept, Enrollment, GameSession, LearningState, Materia, Notebook, StreakRecord,
            StudySession, UserProfile,
        },
    };
    use uuid::Uuid;

    pub async fn materia(store: &MemoryStore, teacher_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        store
            .insert_materia(Materia {
                id,
                name: "Biología".to_string(),
                teacher_id,
            })
            .await;
        id
    }

    pub async fn notebook(store: &MemoryStore, materia_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        store
            .insert_notebook(Notebook {
                id,
                title: "La célula".to_string(),
                materia_id,
            })
            .await;
        id
    }

    pub async fn concepts(store: &MemoryStore, notebook_id: Uuid, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let id = Uuid::new_v4();
            store
                .insert_concept(Concept {
                    id,
                    notebook_id,
                    term: format!("term {i}"),
                    definition: format!("definition {i}"),
                })
                .await;
            ids.push(id);
        }
        ids
    }

    pub async fn learning_state(
        store: &MemoryStore,
        user_id: Uuid,
        concept_id: Uuid,
        repetitions: i32,
        interval: f64,
        ease_factor: f64,
    ) {
        store
            .upsert_learning_state(&LearningState {
                user_id,
                concept_id,
                repetitions,
                interval,
                ease_factor,
                last_module: None,
            })
            .await
            .unwrap();
    }

    pub async fn profile(store: &MemoryStore, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        store
            .insert_profile(UserProfile {
                id,
                username: name.to_lowercase(),
                display_name: Some(name.to_string()),
            })
            .await;
        id
    }

    pub async fn enroll(store: &MemoryStore, student_id: Uuid, materia_id: Uuid, teacher_id: Uuid) {
        store
            .insert_enrollment(Enrollment {
                student_id,
                materia_id,
                teacher_id,
                status: "active".to_string(),
            })
            .await;
    }

    pub fn session(
        user_id: Uuid,
        notebook_id: Uuid,
        mode: &str,
        started_at: DateTime<Utc>,
    ) -> StudySession {
        StudySession {
            id: Uuid::new_v4(),
            user_id,
            notebook_id,
            mode: mode.to_string(),
            started_at,
            duration_seconds: 600,
            intensity: None,
            session_score: None,
            final_session_score: None,
            validated: true,
        }
    }

    pub async fn smart_session(
        store: &MemoryStore,
        user_id: Uuid,
        notebook_id: Uuid,
        intensity: &str,
        started_at: DateTime<Utc>,
    ) {
        let mut session = session(user_id, notebook_id, "smart", started_at);
        session.intensity = Some(intensity.to_string());
        store.insert_session(session).await;
    }

    pub async fn game(
        store: &MemoryStore,
        user_id: Uuid,
        notebook_id: Uuid,
        points: i64,
        played_at: DateTime<Utc>,
    ) {
        store
            .insert_game_session(GameSession {
                id: Uuid::new_v4(),
                user_id,
                notebook_id,
                game: "memory".to_string(),
                points,
                duration_seconds: 120,
                completed: true,
                played_at,
            })
            .await;
    }

    pub async fn streak(store: &MemoryStore, user_id: Uuid, current: i32, last: NaiveDate) {
        store
            .set_streak(StreakRecord {
                user_id,
                current_streak: current,
                last_study_date: Some(last),
                study_history: vec![last],
            })
            .await;
    }
}

/// Wraps a [`MemoryStore`] and stalls every learning-state read.
pub mod slow {
    use std::{future::Future, time::Duration};

    use smk_db::{
        MemoryStore, ProgressStore, StoreError,
        models::{
            ActivitySource, ActivityWindow, Concept, GamePoints, LearningState, Materia, Notebook,
            QuizResultInsert, QuizStats, SessionQuery, StreakRecord, StudySession, UserProfile,
        },
    };
    use uuid::Uuid;

    pub struct SlowStore {
        pub inner: MemoryStore,
        pub delay: Duration,
    }

    impl ProgressStore for SlowStore {
        fn list_concepts(
            &self,
            notebook_id: Uuid,
        ) -> impl Future<Output = Result<Vec<Concept>, StoreError>> + Send {
            self.inner.list_concepts(notebook_id)
        }

        async fn get_learning_state(
            &self,
            user_id: Uuid,
            concept_id: Uuid,
        ) -> Result<Option<LearningState>, StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_learning_state(user_id, concept_id).await
        }

        fn upsert_learning_state(
            &self,
            state: &LearningState,
        ) -> impl Future<Output = Result<(), StoreError>> + Send {
            self.inner.upsert_learning_state(state)
        }

        fn list_sessions(
            &self,
            query: &SessionQuery,
        ) -> impl Future<Output = Result<Vec<StudySession>, StoreError>> + Send {
            self.inner.list_sessions(query)
        }

        fn get_quiz_stats(
            &self,
            user_id: Uuid,
            notebook_id: Uuid,
        ) -> impl Future<Output = Result<Option<QuizStats>, StoreError>> + Send {
            self.inner.get_quiz_stats(user_id, notebook_id)
        }

        fn record_quiz_result(
            &self,
            result: &QuizResultInsert,
        ) -> impl Future<Output = Result<QuizStats, StoreError>> + Send {
            self.inner.record_quiz_result(result)
        }

        fn get_game_points(
            &self,
            user_id: Uuid,
            notebook_id: Uuid,
        ) -> impl Future<Output = Result<GamePoints, StoreError>> + Send {
            self.inner.get_game_points(user_id, notebook_id)
        }

        fn get_streak(
            &self,
            user_id: Uuid,
        ) -> impl Future<Output = Result<Option<StreakRecord>, StoreError>> + Send {
            self.inner.get_streak(user_id)
        }

        fn upsert_streak(
            &self,
            record: &StreakRecord,
        ) -> impl Future<Output = Result<(), StoreError>> + Send {
            self.inner.upsert_streak(record)
        }

        fn has_activity(
            &self,
            user_id: Uuid,
            source: ActivitySource,
            window: ActivityWindow,
        ) -> impl Future<Output = Result<bool, StoreError>> + Send {
            self.inner.has_activity(user_id, source, window)
        }

        fn get_notebook(
            &self,
            notebook_id: Uuid,
        ) -> impl Future<Output = Result<Option<Notebook>, StoreError>> + Send {
            self.inner.get_notebook(notebook_id)
        }

        fn list_materia_notebooks(
            &self,
            materia_id: Uuid,
        ) -> impl Future<Output = Result<Vec<Notebook>, StoreError>> + Send {
            self.inner.list_materia_notebooks(materia_id)
        }

        fn get_materia(
            &self,
            materia_id: Uuid,
        ) -> impl Future<Output = Result<Option<Materia>, StoreError>> + Send {
            self.inner.get_materia(materia_id)
        }

        fn list_active_students(
            &self,
            materia_id: Uuid,
            teacher_id: Uuid,
        ) -> impl Future<Output = Result<Vec<Uuid>, StoreError>> + Send {
            self.inner.list_active_students(materia_id, teacher_id)
        }

        fn get_profile(
            &self,
            user_id: Uuid,
        ) -> impl Future<Output = Result<Option<UserProfile>, StoreError>> + Send {
            self.inner.get_profile(user_id)
        }
    }

    pub const LONG: Duration = Duration::from_secs(30);
}

pub const SHORT_WAIT: Duration = Duration::from_millis(50);
