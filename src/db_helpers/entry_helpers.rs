use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::EntryRequest;
use crate::errors::RequestError;
use crate::models::Entry;
use crate::{reconcile_tags, slugify, split_tags};

const ENTRY_QUERY: &str = r#"
        SELECT entries.id        AS "id",
               title             AS "title",
               slug              AS "slug",
               date              AS "date",
               time_spent        AS "time_spent",
               learned           AS "learned",
               resources         AS "resources",
               user_id           AS "user_id",
               users.username    AS "author_username",
               (SELECT Group_concat(tags.name, ',')
                FROM   tags
                WHERE  tags.entry_id = entries.id) AS "tag_list"
        FROM   entries
            JOIN users
                ON entries.user_id = users.id
"#;

pub async fn list_entries_in_db(pool: &SqlitePool) -> Result<Vec<Entry>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{ENTRY_QUERY} ORDER BY date DESC, entries.id DESC");
    let entries = sqlx::query_as::<Sqlite, Entry>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(entries)
}

pub async fn list_entries_by_tag_in_db(
    pool: &SqlitePool,
    tag: &str,
) -> Result<Vec<Entry>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{ENTRY_QUERY} WHERE entries.id IN (SELECT entry_id FROM tags WHERE name = $1) \
         ORDER BY entries.id"
    );
    let entries = sqlx::query_as::<Sqlite, Entry>(&query)
        .bind(tag)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(entries)
}

pub async fn get_entry_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Entry>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{ENTRY_QUERY} WHERE slug = $1");
    let result = sqlx::query_as::<Sqlite, Entry>(&query)
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Persists a new entry and its tag rows in one transaction: either the
/// entry and every tag commit together, or nothing is written. A slug
/// collision surfaces as a database error for the caller to translate.
pub async fn create_entry_in_db(
    pool: &SqlitePool,
    user_id: i64,
    EntryRequest {
        title,
        date,
        time_spent,
        learned,
        resources,
        tags,
    }: EntryRequest,
) -> Result<Entry, RequestError> {
    let mut tx = pool.begin().await?;

    let slug = slugify(&title);
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let entry_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO entries (title, slug, date, time_spent, learned, resources, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&title)
    .bind(&slug)
    .bind(date)
    .bind(time_spent)
    .bind(&learned)
    .bind(&resources)
    .bind(user_id)
    .fetch_one(&mut tx)
    .await?;

    for tag in split_tags(tags.as_deref().unwrap_or_default()) {
        sqlx::query(
            r#"
            INSERT INTO tags (name, entry_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(&tag)
        .bind(entry_id)
        .execute(&mut tx)
        .await?;
    }
    tx.commit().await?;

    get_entry_by_slug_in_db(pool, &slug)
        .await?
        .ok_or(RequestError::ServerError)
}

/// Rewrites the entry's fields (slug recomputed from the submitted title)
/// and reconciles its tag set against the submitted one, deleting and
/// inserting only the difference so unchanged tag rows keep their identity.
/// Runs in one transaction; a slug collision rolls everything back.
pub async fn update_entry_in_db(
    pool: &SqlitePool,
    entry_id: i64,
    EntryRequest {
        title,
        date,
        time_spent,
        learned,
        resources,
        tags,
    }: EntryRequest,
) -> Result<Entry, RequestError> {
    let mut tx = pool.begin().await?;

    let slug = slugify(&title);
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    sqlx::query(
        r#"
        UPDATE entries
        SET title = $1, slug = $2, date = $3, time_spent = $4, learned = $5, resources = $6
        WHERE id = $7
        "#,
    )
    .bind(&title)
    .bind(&slug)
    .bind(date)
    .bind(time_spent)
    .bind(&learned)
    .bind(&resources)
    .bind(entry_id)
    .execute(&mut tx)
    .await?;

    let old_tags = sqlx::query_scalar::<Sqlite, String>(
        r#"
        SELECT name FROM tags WHERE entry_id = $1 ORDER BY id
        "#,
    )
    .bind(entry_id)
    .fetch_all(&mut tx)
    .await?;

    let new_tags = tags.as_deref().map(split_tags).unwrap_or_default();
    let (to_delete, to_add) = reconcile_tags(&old_tags, &new_tags);

    for tag in &to_delete {
        sqlx::query(
            r#"
            DELETE FROM tags WHERE entry_id = $1 AND name = $2
            "#,
        )
        .bind(entry_id)
        .bind(tag)
        .execute(&mut tx)
        .await?;
    }
    for tag in &to_add {
        sqlx::query(
            r#"
            INSERT INTO tags (name, entry_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(tag)
        .bind(entry_id)
        .execute(&mut tx)
        .await?;
    }
    tx.commit().await?;

    get_entry_by_slug_in_db(pool, &slug)
        .await?
        .ok_or(RequestError::ServerError)
}

/// Removes the entry row; the schema's `ON DELETE CASCADE` takes its tags
/// with it in the same transaction.
pub async fn delete_entry_in_db(pool: &SqlitePool, entry_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        DELETE FROM entries WHERE id = $1
        "#,
    )
    .bind(entry_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}
