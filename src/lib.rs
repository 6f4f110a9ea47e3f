pub mod authentication;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
pub mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::{routing::*, Extension, Router};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

pub async fn run_app(app: Router, address: SocketAddr, db: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(db)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(&db_url)
            .await
            .context("Failed to create database")?;
    } else {
        tracing::debug!("Database already exists");
    }
    let pool = SqlitePool::connect(&db_url).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/users", post(register_user))
        .route("/users/login", post(login_user))
        .route("/user", get(get_current_user))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/by-tag/:tag", get(list_entries_by_tag))
        .route(
            "/entries/:slug",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/tags", get(list_tags))
        .fallback(not_found)
}

/// Derives the URL identifier for an entry from its title. Lowercase, every
/// run of non-alphanumeric characters collapsed into a single hyphen, no
/// leading or trailing hyphen. Idempotent, so re-slugging an unchanged title
/// on edit yields the same identifier.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for character in title.chars() {
        if character.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(character.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Splits the raw `#`-delimited tags field from the entry form into labels,
/// dropping blanks and collapsing duplicates while keeping first-seen order.
pub fn split_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split('#'))
}

/// Computes the minimal tag delta for an entry edit: `(to_delete, to_add)`.
/// Both inputs are normalized first, so raw form splits with blanks or
/// repeats are fine. Labels present on both sides appear in neither output,
/// which keeps their stored rows (and creation timestamps) untouched.
pub fn reconcile_tags(old_tags: &[String], new_tags: &[String]) -> (Vec<String>, Vec<String>) {
    let old_tags = normalize_tags(old_tags.iter().map(String::as_str));
    let new_tags = normalize_tags(new_tags.iter().map(String::as_str));
    let to_delete = old_tags
        .iter()
        .filter(|tag| !new_tags.contains(tag))
        .cloned()
        .collect();
    let to_add = new_tags
        .iter()
        .filter(|tag| !old_tags.contains(tag))
        .cloned()
        .collect();
    (to_delete, to_add)
}

fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim_matches('#');
        if !tag.is_empty() && !seen.iter().any(|kept| kept == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("C++ & Go: Intro!"), "c-go-intro");
    }

    #[test]
    fn slugify_strips_leading_and_trailing_separators() {
        assert_eq!(slugify("  --Hello, World!--  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_output_stays_in_url_alphabet() {
        for title in ["Crab? Crab!", "über Späti", "a_b_c", "100% Rust"] {
            let slug = slugify(title);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected character in slug {slug:?}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    #[test]
    fn slugify_is_idempotent() {
        for title in ["C++ & Go: Intro!", "already-normalized", "Week 3 Review"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn split_tags_drops_blanks_and_duplicates() {
        assert_eq!(split_tags("rust##rust#async#"), vec!["rust", "async"]);
        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(split_tags("###"), Vec::<String>::new());
    }

    #[test]
    fn reconcile_computes_minimal_delta() {
        let old_tags = vec![
            "flask".to_string(),
            "python".to_string(),
            String::new(),
            String::new(),
        ];
        let new_tags = vec!["python#".to_string(), "go".to_string(), "go".to_string()];
        let (to_delete, to_add) = reconcile_tags(&old_tags, &new_tags);
        assert_eq!(to_delete, vec!["flask"]);
        assert_eq!(to_add, vec!["go"]);
    }

    #[test]
    fn reconcile_with_empty_sides() {
        let tags = vec!["rust".to_string(), "sqlite".to_string()];
        let (to_delete, to_add) = reconcile_tags(&[], &tags);
        assert!(to_delete.is_empty());
        assert_eq!(to_add, tags);

        let (to_delete, to_add) = reconcile_tags(&tags, &[]);
        assert_eq!(to_delete, tags);
        assert!(to_add.is_empty());
    }

    #[test]
    fn reconcile_identical_sets_is_a_no_op() {
        let tags = vec!["rust".to_string(), "axum".to_string()];
        let (to_delete, to_add) = reconcile_tags(&tags, &tags);
        assert!(to_delete.is_empty());
        assert!(to_add.is_empty());
    }

    #[test]
    fn reconcile_outputs_are_disjoint_and_complete() {
        let old_tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let new_tags = vec!["b".to_string(), "d".to_string()];
        let (to_delete, to_add) = reconcile_tags(&old_tags, &new_tags);
        assert!(to_delete.iter().all(|tag| !to_add.contains(tag)));
        let mut result: Vec<String> = old_tags
            .iter()
            .filter(|tag| !to_delete.contains(tag))
            .cloned()
            .collect();
        result.extend(to_add);
        assert_eq!(result, new_tags);
    }
}
