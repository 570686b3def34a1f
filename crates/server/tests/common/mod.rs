//! # Common Test Utilities
//!
//! Shared test infrastructure: an in-memory database with the full schema
//! applied, application state with a scratch content store, and fixture
//! builders for users, teams and projects.

use std::sync::Once;

use base64::Engine;
use entity::sea_orm_active_enums::UserRole;
use migration::{Migrator, MigratorTrait as _};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use server::{auth::jwt::JwtConfig, middleware::auth::Principal, storage::ContentStore, AppState};

/// Initialize test logging (run once per test session)
static INIT: Once = Once::new();

/// Initialize test environment including structured logging
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// A fully wired application state over an isolated in-memory database.
///
/// The content store lives in a scratch directory that is removed when the
/// value drops.
pub struct TestApp {
    pub state: AppState,
    _storage:  tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application.
    ///
    /// Connects to `sqlite::memory:` (or `DATABASE_URL` when set) and runs
    /// all migrations. A single pooled connection keeps every query on the
    /// same in-memory database.
    pub async fn new() -> Self {
        init_test_env();

        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
        let mut options = ConnectOptions::new(url);
        options.max_connections(1);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let storage_dir = tempfile::tempdir().expect("Failed to create scratch storage dir");

        let state = AppState {
            db,
            jwt_config: test_jwt_config(),
            storage: ContentStore::new(storage_dir.path()),
        };

        Self {
            state,
            _storage: storage_dir,
        }
    }
}

/// JWT configuration with a fixed test secret.
pub fn test_jwt_config() -> JwtConfig {
    let secret = "integration-test-secret-at-least-32-bytes";
    JwtConfig {
        secret:             base64::engine::general_purpose::STANDARD.encode(secret),
        expiration_seconds: 3600,
        issuer:             "capstone-identity".to_string(),
    }
}

/// Insert a user and return its model.
pub async fn create_user(state: &AppState, email: &str, name: &str, role: UserRole) -> entity::users::Model {
    entity::users::ActiveModel {
        email: Set(email.to_string()),
        full_name: Set(name.to_string()),
        role: Set(role),
        department: Set(Some("CS".to_string())),
        year: Set(Some("4".to_string())),
        skills: Set(None),
        interests: Set(None),
        availability: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .expect("Failed to insert user")
}

/// Insert a student.
pub async fn create_student(state: &AppState, email: &str, name: &str) -> entity::users::Model {
    create_user(state, email, name, UserRole::Student).await
}

/// Insert a professor.
pub async fn create_professor(state: &AppState, email: &str, name: &str) -> entity::users::Model {
    create_user(state, email, name, UserRole::Professor).await
}

/// Build a principal acting as the given user.
pub fn principal_for(user: &entity::users::Model) -> Principal {
    Principal {
        id:   user.id,
        role: user.role.clone(),
    }
}

/// A date `days` from today, formatted YYYY-MM-DD.
pub fn date_from_today(days: i64) -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(days)).to_string()
}
