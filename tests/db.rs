use std::sync::atomic::{AtomicU32, Ordering};

use chrono::NaiveDate;
use journal::{
    data_formats::{EntryRequest, RegisterRequest},
    db_helpers::{
        create_entry_in_db, delete_entry_in_db, get_entry_by_slug_in_db, get_entry_tags_in_db,
        insert_user, update_entry_in_db,
    },
    errors::RequestError,
    models::{Tag, User},
};
use sqlx::{Sqlite, SqlitePool};

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn scratch_pool() -> SqlitePool {
    let path = std::env::temp_dir().join(format!(
        "journal-db-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = SqlitePool::connect(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn scratch_user(pool: &SqlitePool, username: &str) -> User {
    insert_user(
        pool,
        &RegisterRequest {
            email: format!("{username}@example.com"),
            password: "not-a-real-hash".to_string(),
            username: username.to_string(),
        },
    )
    .await
    .unwrap()
}

fn entry_request(title: &str, tags: Option<&str>) -> EntryRequest {
    EntryRequest {
        title: title.to_string(),
        date: Some(NaiveDate::from_ymd_opt(2019, 5, 10).unwrap()),
        time_spent: 2,
        learned: "How lifetimes desugar".to_string(),
        resources: "The reference".to_string(),
        tags: tags.map(|tags| tags.to_string()),
    }
}

#[tokio::test]
async fn duplicate_title_fails_and_first_entry_survives() {
    let pool = scratch_pool().await;
    let user = scratch_user(&pool, "ayman").await;

    create_entry_in_db(&pool, user.id, entry_request("Hello World", None))
        .await
        .unwrap();

    // "Hello, World!" normalizes to the same slug.
    let error = create_entry_in_db(&pool, user.id, entry_request("Hello, World!", None))
        .await
        .unwrap_err();
    match error.duplicate_or("Entry with the same title already exists") {
        RequestError::Duplicate(message) => {
            assert_eq!(message, "Entry with the same title already exists")
        }
        other => panic!("expected duplicate error, got {other:?}"),
    }

    let entry = get_entry_by_slug_in_db(&pool, "hello-world")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.title, "Hello World");
}

#[tokio::test]
async fn create_collapses_raw_tag_input() {
    let pool = scratch_pool().await;
    let user = scratch_user(&pool, "dupes").await;

    let entry = create_entry_in_db(
        &pool,
        user.id,
        entry_request("Tag Soup", Some("rust##rust#async#")),
    )
    .await
    .unwrap();

    let tags = get_entry_tags_in_db(&pool, entry.id).await.unwrap();
    assert_eq!(tags, vec!["rust", "async"]);
}

#[tokio::test]
async fn update_applies_minimal_tag_delta() {
    let pool = scratch_pool().await;
    let user = scratch_user(&pool, "editor").await;

    let entry = create_entry_in_db(
        &pool,
        user.id,
        entry_request("Web Frameworks", Some("flask#python")),
    )
    .await
    .unwrap();

    let python_row = sqlx::query_as::<Sqlite, Tag>(
        "SELECT id, name, entry_id FROM tags WHERE entry_id = $1 AND name = 'python'",
    )
    .bind(entry.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let updated = update_entry_in_db(
        &pool,
        entry.id,
        entry_request("Web Frameworks", Some("python#go#go")),
    )
    .await
    .unwrap();
    assert_eq!(updated.slug, entry.slug);

    let tags = get_entry_tags_in_db(&pool, entry.id).await.unwrap();
    assert_eq!(tags, vec!["python", "go"]);

    // The shared tag kept its row rather than being deleted and recreated.
    let python_row_after = sqlx::query_as::<Sqlite, Tag>(
        "SELECT id, name, entry_id FROM tags WHERE entry_id = $1 AND name = 'python'",
    )
    .bind(entry.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(python_row_after.id, python_row.id);
}

#[tokio::test]
async fn update_slug_conflict_rolls_everything_back() {
    let pool = scratch_pool().await;
    let user = scratch_user(&pool, "conflict").await;

    create_entry_in_db(&pool, user.id, entry_request("First Post", None))
        .await
        .unwrap();
    let second = create_entry_in_db(
        &pool,
        user.id,
        entry_request("Second Post", Some("keepme")),
    )
    .await
    .unwrap();

    let error = update_entry_in_db(
        &pool,
        second.id,
        entry_request("First Post", Some("replacement")),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        error.duplicate_or("Entry with the same title already exists"),
        RequestError::Duplicate(_)
    ));

    let unchanged = get_entry_by_slug_in_db(&pool, "second-post")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.title, "Second Post");
    let tags = get_entry_tags_in_db(&pool, second.id).await.unwrap();
    assert_eq!(tags, vec!["keepme"]);
}

#[tokio::test]
async fn delete_cascades_to_tags() {
    let pool = scratch_pool().await;
    let user = scratch_user(&pool, "deleter").await;

    let entry = create_entry_in_db(
        &pool,
        user.id,
        entry_request("Short Lived", Some("one#two")),
    )
    .await
    .unwrap();

    delete_entry_in_db(&pool, entry.id).await.unwrap();

    assert!(get_entry_by_slug_in_db(&pool, "short-lived")
        .await
        .unwrap()
        .is_none());
    let orphan_count =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM tags WHERE entry_id = $1")
            .bind(entry.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphan_count, 0);
}
