#![allow(dead_code)]

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::HashingCost;
use auth::JwtHandler;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use task_service::domain::identity::service::IdentityResolver;
use task_service::domain::task::errors::TaskError;
use task_service::domain::task::models::DayWindow;
use task_service::domain::task::models::NewTask;
use task_service::domain::task::models::Task;
use task_service::domain::task::models::TaskChanges;
use task_service::domain::task::models::TaskId;
use task_service::domain::task::ports::TaskRepository;
use task_service::domain::task::service::TaskService;
use task_service::domain::user::errors::UserError;
use task_service::domain::user::models::NewUser;
use task_service::domain::user::models::User;
use task_service::domain::user::models::UserId;
use task_service::domain::user::models::Username;
use task_service::domain::user::ports::UserRepository;
use task_service::domain::user::service::AccountService;
use task_service::inbound::http::router::create_router;
use task_service::inbound::http::router::AppState;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub users: Arc<InMemoryUserRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

/// Registered account with a fresh session token
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let tasks = Arc::new(InMemoryTaskRepository::default());

        // Cheap Argon2 parameters keep the suite fast
        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET)
                .with_hashing_cost(HashingCost {
                    memory_kib: 8,
                    iterations: 1,
                    parallelism: 1,
                })
                .expect("Failed to configure password hashing"),
        );

        let state = AppState {
            account_service: Arc::new(AccountService::new(
                Arc::clone(&users),
                Arc::clone(&authenticator),
            )),
            task_service: Arc::new(TaskService::new(Arc::clone(&tasks))),
            identity_resolver: Arc::new(IdentityResolver::new(
                Arc::clone(&authenticator),
                Arc::clone(&users),
            )),
        };

        let router = create_router(state, &[]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            users,
            tasks,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an account and return the raw response
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> reqwest::Response {
        self.post("/register")
            .json(&json!({
                "username": username,
                "password": password,
                "email": email,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the raw response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register `username` with a default password and log in
    pub async fn register_and_login(&self, username: &str) -> TestUser {
        let email = format!("{}@x.com", username);
        let response = self.register(username, "secret1", &email).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = self
            .login(username, "secret1")
            .await
            .json()
            .await
            .expect("Failed to parse response");

        TestUser {
            id: body["data"]["user"]["id"].as_i64().expect("Missing user id"),
            token: body["data"]["token"]
                .as_str()
                .expect("Missing token")
                .to_string(),
        }
    }

    /// Create a task and return its id
    pub async fn create_task(&self, token: &str, description: &str) -> i64 {
        let body: serde_json::Value = self
            .post_authenticated("/tasks", token)
            .json(&json!({ "description": description }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        body["data"]["id"].as_i64().expect("Missing task id")
    }

    /// Sign a token for `user_id` that was issued at `issued_at`
    pub fn token_issued_at(
        &self,
        user_id: i64,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> String {
        self.jwt_handler
            .encode(&Claims::for_user(user_id, issued_at, ttl))
            .expect("Failed to sign token")
    }
}

/// Test database helper
///
/// Each instance is a fresh, migrated database on the server named by
/// `DATABASE_URL`.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    server_url: String,
}

impl TestDb {
    /// Create a new test database with a unique name.
    ///
    /// Returns `None` when `DATABASE_URL` is not set so the Postgres suite
    /// can be skipped on machines without a server.
    pub async fn new() -> Option<Self> {
        let Ok(server_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres repository test");
            return None;
        };

        let db_name = format!(
            "test_task_service_{}_{}_{}",
            std::process::id(),
            TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst),
            Utc::now().timestamp_micros()
        );

        let mut conn = PgConnection::connect(&server_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = server_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            server_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let server_url = self.server_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&server_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}

/// User storage with the same uniqueness rules as the `users` table
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<(i64, Vec<User>)>,
}

impl InMemoryUserRepository {
    pub fn remove(&self, id: i64) {
        let mut state = self.state.lock().unwrap();
        state.1.retain(|user| user.id.as_i64() != id);
    }

    pub fn password_hash(&self, username: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .1
            .iter()
            .find(|user| user.username.as_str() == username)
            .map(|user| user.password_hash.as_str().to_string())
    }

    pub fn count_by_username(&self, username: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .1
            .iter()
            .filter(|user| user.username.as_str() == username)
            .count()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.lock().unwrap();

        if state
            .1
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(UserError::AlreadyExists);
        }

        state.0 += 1;
        let created = User {
            id: UserId(state.0),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        state.1.push(created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let state = self.state.lock().unwrap();
        Ok(state.1.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let state = self.state.lock().unwrap();
        Ok(state.1.iter().find(|u| u.username == *username).cloned())
    }
}

/// Task storage that matches on `(id, owner)` like the SQL queries
#[derive(Default)]
pub struct InMemoryTaskRepository {
    state: Mutex<(i64, Vec<Task>)>,
}

impl InMemoryTaskRepository {
    pub fn get(&self, id: i64) -> Option<Task> {
        let state = self.state.lock().unwrap();
        state.1.iter().find(|t| t.id.as_i64() == id).cloned()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, TaskError> {
        let mut state = self.state.lock().unwrap();

        state.0 += 1;
        let created = Task {
            id: TaskId(state.0),
            owner: task.owner,
            description: task.description,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.created_at,
        };
        state.1.push(created.clone());

        Ok(created)
    }

    async fn find_by_owner_and_date(
        &self,
        owner: &UserId,
        window: &DayWindow,
    ) -> Result<Vec<Task>, TaskError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .1
            .iter()
            .filter(|t| t.owner == *owner && window.contains(&t.created_at))
            .cloned()
            .collect())
    }

    async fn find_by_id_and_owner(
        &self,
        id: &TaskId,
        owner: &UserId,
    ) -> Result<Option<Task>, TaskError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .1
            .iter()
            .find(|t| t.id == *id && t.owner == *owner)
            .cloned())
    }

    async fn update(
        &self,
        id: &TaskId,
        owner: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskError> {
        let mut state = self.state.lock().unwrap();

        let Some(task) = state
            .1
            .iter_mut()
            .find(|t| t.id == *id && t.owner == *owner)
        else {
            return Ok(None);
        };

        if let Some(description) = &changes.description {
            task.description = description.clone();
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        task.updated_at = updated_at;

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: &TaskId, owner: &UserId) -> Result<bool, TaskError> {
        let mut state = self.state.lock().unwrap();
        let before = state.1.len();
        state.1.retain(|t| !(t.id == *id && t.owner == *owner));
        Ok(state.1.len() < before)
    }
}
