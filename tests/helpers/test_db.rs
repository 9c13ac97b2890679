use oxilock::{Database, DatabaseLockStore};
use uuid::Uuid;

pub struct TestDb {
    db: Database,
    path: std::path::PathBuf,
}

impl TestDb {
    pub fn db(&self) -> Database {
        self.db.clone()
    }

    pub fn store(&self) -> DatabaseLockStore {
        DatabaseLockStore::new(self.db.clone())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-wal"));
        let _ = std::fs::remove_file(self.path.with_extension("db-shm"));
    }
}

pub async fn setup_test_db() -> TestDb {
    // File-based SQLite, unique per test for parallel execution
    let path = std::env::temp_dir().join(format!("oxilock_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    DatabaseLockStore::new(db.clone())
        .ensure_schema()
        .await
        .expect("Failed to create distributed_locks table");

    TestDb { db, path }
}
