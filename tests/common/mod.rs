//! Helpers for integration tests.
#![allow(dead_code)]

use vapeshop_api::db::{DbPool, establish_connection_pool, run_migrations};
use vapeshop_api::domain::auth::{AuthenticatedUser, Role};

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

pub fn user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("{}-1", role.as_str()),
        email: None,
        name: None,
        role,
        branch: None,
        exp: 0,
    }
}

pub fn moderator(branch: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        branch: Some(branch.to_string()),
        ..user(Role::Moderator)
    }
}
