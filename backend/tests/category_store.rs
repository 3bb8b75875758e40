//! Store-level tests for the category repository against a real SQLite
//! file, covering behavior the HTTP round-trips cannot reach.

use std::sync::Arc;

use tempfile::TempDir;

use backend::domain::ports::CategoryRepository;
use backend::outbound::persistence::{
    DbPool, DieselCategoryRepository, PoolConfig, run_migrations,
};

struct TestStore {
    pool: DbPool,
    _dir: TempDir,
}

fn prepare_store(max_size: u32) -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("roster.db");
    let pool = PoolConfig::new(path.to_string_lossy())
        .with_max_size(max_size)
        .build()
        .expect("pool builds");
    run_migrations(&pool).expect("migrations apply");
    TestStore { pool, _dir: dir }
}

#[actix_web::test]
async fn find_or_create_is_idempotent_by_name() {
    let store = prepare_store(2);
    let repo = DieselCategoryRepository::new(store.pool.clone());

    let first = repo.find_or_create("Logistics").await.expect("create succeeds");
    let second = repo.find_or_create("Logistics").await.expect("lookup succeeds");
    assert_eq!(first.id, second.id);

    let names: Vec<String> = repo
        .list()
        .await
        .expect("list succeeds")
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Logistics".to_owned()]);
}

// Overlapping writers must queue on the store's writer lock; the losers of
// the insert race resolve to the winner's row rather than erroring.
#[actix_web::test]
async fn concurrent_find_or_create_converges_on_one_row() {
    let store = prepare_store(8);
    let repo = Arc::new(DieselCategoryRepository::new(store.pool.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.find_or_create("Hydroponics").await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let category = handle
            .await
            .expect("task completes")
            .expect("find-or-create succeeds under contention");
        assert_eq!(category.name, "Hydroponics");
        ids.push(category.id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let rows = repo.list().await.expect("list succeeds");
    assert_eq!(rows.len(), 1);
}
