//! Common test utilities for integration tests
//!
//! - Database setup (skipped when `DATABASE_URL` is not set)
//! - Per-context users and upload directory
//! - Multipart request builders and response helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::path::PathBuf;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, UploadConfig, DEFAULT_MAX_FILE_BYTES};
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::models::user::User;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "taskboard-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub upload_dir: PathBuf,
    pub users: Vec<User>,

    /// Unique token to embed in titles so searches only rank this test's tasks first
    pub token: String,
}

impl TestContext {
    /// Creates a context with three fresh users, or None without a database
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        };

        let db = PgPool::connect(&url).await.expect("connect to test database");
        run_migrations(&db).await.expect("run migrations");

        let token = format!("tok{}", Uuid::new_v4().simple());
        let mut users = Vec::new();
        for n in 0..3 {
            let user = User::create(&db, &format!("{token}-user{n}"))
                .await
                .expect("create test user");
            users.push(user);
        }

        let upload_dir = std::env::temp_dir().join(&token);
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            uploads: UploadConfig {
                dir: upload_dir.clone(),
                max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self {
            db,
            app,
            upload_dir,
            users,
            token,
        })
    }

    pub fn user_id(&self, n: usize) -> i32 {
        self.users[n].id
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("router call")
    }

    /// Sends a request and decodes the JSON body
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send_json(request).await
    }

    /// Form fields of a valid task owned by user 0 and shared with it
    pub fn task_fields(&self, title: &str, description: &str) -> Vec<(String, String)> {
        vec![
            ("title".to_string(), title.to_string()),
            ("description".to_string(), description.to_string()),
            ("completion_status".to_string(), "false".to_string()),
            ("due_date".to_string(), "2030-01-01".to_string()),
            ("is_public".to_string(), "true".to_string()),
            ("created_by".to_string(), self.user_id(0).to_string()),
            ("sharedWith".to_string(), format!("[{}]", self.user_id(0))),
        ]
    }

    /// Creates a task and returns its ID
    pub async fn create_task(&self, fields: &[(String, String)], file: Option<&TestFile>) -> i32 {
        let (status, body) = self
            .send_json(multipart_request("POST", "/tasks", None, fields, file))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_i64().expect("task id") as i32
    }

    /// Ranked search restricted to this context's token
    pub async fn search(&self, extra: &str) -> Vec<Value> {
        let (status, body) = self
            .get(&format!("/tasks/search?keyword={}&limit=50{}", self.token, extra))
            .await;
        assert_eq!(status, StatusCode::OK, "search failed: {body}");
        body["tasks"]
            .as_array()
            .expect("tasks array")
            .iter()
            .filter(|task| {
                task["title"].as_str().unwrap_or_default().contains(&self.token)
                    || task["description"].as_str().unwrap_or_default().contains(&self.token)
            })
            .cloned()
            .collect()
    }

    /// Removes this context's users, their tasks and stored blobs
    pub async fn cleanup(&self) {
        let ids: Vec<i32> = self.users.iter().map(|user| user.id).collect();

        sqlx::query("DELETE FROM tasks WHERE created_by = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await
            .expect("delete test tasks");
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await
            .expect("delete test users");

        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}

/// File part of a multipart request
pub struct TestFile {
    pub name: &'static str,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl TestFile {
    pub fn pdf() -> Self {
        Self {
            name: "plan.pdf",
            content_type: "application/pdf",
            data: b"%PDF-1.4 test".to_vec(),
        }
    }

    pub fn png() -> Self {
        Self {
            name: "chart.png",
            content_type: "image/png",
            data: vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3],
        }
    }
}

/// Builds a multipart/form-data request
pub fn multipart_request(
    method: &str,
    uri: &str,
    user_id: Option<i32>,
    fields: &[(String, String)],
    file: Option<&TestFile>,
) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"taskFile\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.to_string());
    }

    builder.body(Body::from(body)).unwrap()
}

/// Replaces or appends a form field
pub fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    let value = value.into();
    match fields.iter_mut().find(|(field, _)| field == name) {
        Some(entry) => entry.1 = value,
        None => fields.push((name.to_string(), value)),
    }
}
