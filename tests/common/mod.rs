//! Shared fixtures for the integration tests
//!
//! Database tests start their own PostgreSQL container and talk to a fake
//! contest platform and an in-memory mailer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use tower::ServiceExt;

use cftrack::{
    codeforces::{CodeforcesError, ContestPlatform, Problem, RatingChange, Submission, UserInfo},
    config::{
        CodeforcesConfig, Config, DatabaseConfig, MailConfig, MailTransport, ServerConfig,
        SettingsDefaults, SyncConfig, SyncOptions,
    },
    create_router,
    mailer::{MailError, Mailer, OutgoingMail},
    scheduler::SyncScheduler,
    services::SyncRunner,
    state::AppState,
};

/// Start a throwaway PostgreSQL and apply migrations
pub async fn start_postgres() -> (ContainerAsync<Postgres>, PgPool) {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");

    cftrack::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    (container, pool)
}

/// Seconds since the epoch, `days` days before now
pub fn days_ago(days: i64) -> i64 {
    (Utc::now() - ChronoDuration::days(days)).timestamp()
}

/// In-memory stand-in for the Codeforces API
#[derive(Default)]
pub struct FakePlatform {
    users: HashMap<String, FakeUser>,
    latency: Duration,
}

#[derive(Clone, Default)]
pub struct FakeUser {
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub rank: Option<String>,
    pub contests: Vec<RatingChange>,
    pub submissions: Vec<Submission>,
}

impl FakePlatform {
    pub fn with_user(mut self, handle: &str, user: FakeUser) -> Self {
        self.users.insert(handle.to_string(), user);
        self
    }

    /// Delay every `user.info` answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn user(&self, handle: &str) -> Result<&FakeUser, CodeforcesError> {
        self.users
            .get(handle)
            .ok_or_else(|| CodeforcesError::HandleNotFound(handle.to_string()))
    }
}

#[async_trait]
impl ContestPlatform for FakePlatform {
    async fn user_info(&self, handle: &str) -> Result<UserInfo, CodeforcesError> {
        tokio::time::sleep(self.latency).await;
        let user = self.user(handle)?;
        Ok(UserInfo {
            handle: handle.to_string(),
            rating: user.rating,
            max_rating: user.max_rating,
            rank: user.rank.clone(),
            max_rank: None,
        })
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, CodeforcesError> {
        Ok(self.user(handle)?.contests.clone())
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>, CodeforcesError> {
        Ok(self.user(handle)?.submissions.clone())
    }

    async fn contest_problem_count(&self, _contest_id: i64) -> Result<usize, CodeforcesError> {
        Ok(0)
    }
}

pub fn rated_contest(contest_id: i64, days: i64, old_rating: i32, new_rating: i32) -> RatingChange {
    RatingChange {
        contest_id,
        contest_name: format!("Codeforces Round {}", contest_id),
        rank: 1000,
        rating_update_time_seconds: days_ago(days),
        old_rating,
        new_rating,
    }
}

pub fn submission(
    id: i64,
    contest_id: i64,
    index: &str,
    rating: Option<i32>,
    verdict: &str,
    days: i64,
) -> Submission {
    Submission {
        id,
        contest_id: Some(contest_id),
        creation_time_seconds: days_ago(days),
        problem: Problem {
            contest_id: Some(contest_id),
            index: index.to_string(),
            name: format!("Problem {}{}", contest_id, index),
            rating,
            tags: vec![],
        },
        verdict: Some(verdict.to_string()),
    }
}

/// Mailer that keeps every message it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub fn settings_defaults() -> SettingsDefaults {
    SettingsDefaults {
        sync_schedule: "0 2 * * *".to_string(),
        inactivity_threshold_days: 7,
    }
}

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "warn".to_string(),
            json_logs: false,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
        },
        codeforces: CodeforcesConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
        },
        sync: SyncConfig {
            default_schedule: "0 2 * * *".to_string(),
            default_inactivity_threshold_days: 7,
            request_delay_ms: 0,
            student_delay_ms: 0,
            count_unsolved: false,
            inline_timeout_secs: 5,
        },
        mail: MailConfig {
            transport: MailTransport::Log,
            relay: None,
            username: None,
            password: None,
            from_address: "noreply@localhost".to_string(),
            from_name: "Test".to_string(),
        },
    }
}

/// Everything a test needs to drive the HTTP API
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

/// Sync options without courtesy delays
pub fn sync_options() -> SyncOptions {
    SyncOptions {
        request_delay: Duration::ZERO,
        student_delay: Duration::ZERO,
        count_unsolved: false,
        freshness: ChronoDuration::hours(6),
        inline_timeout: Duration::from_secs(5),
    }
}

pub async fn test_app(pool: PgPool, platform: FakePlatform) -> TestApp {
    test_app_with(pool, platform, sync_options()).await
}

pub async fn test_app_with(pool: PgPool, platform: FakePlatform, options: SyncOptions) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());

    let runner = SyncRunner::new(
        pool.clone(),
        Arc::new(platform),
        mailer.clone(),
        options,
        settings_defaults(),
    );

    let scheduler = Arc::new(SyncScheduler::new(runner.clone()).await.unwrap());
    scheduler.reschedule("0 2 * * *").await.unwrap();

    let state = AppState::new(pool, test_config(), runner, scheduler);
    let router = create_router(state.clone());

    TestApp {
        router,
        state,
        mailer,
    }
}

impl TestApp {
    /// Send a request and decode the JSON body
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Send a raw body with the given content type
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub async fn create_student(&self, name: &str, email: &str, handle: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/students",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "phone_number": "555-0100",
                    "codeforces_handle": handle,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body
    }
}
