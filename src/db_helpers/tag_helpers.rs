use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;

/// Distinct labels across all entries, for the tag filter index.
pub async fn list_tags_in_db(pool: &SqlitePool) -> Result<Vec<String>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_scalar::<Sqlite, String>(
        r#"
        SELECT DISTINCT name FROM tags ORDER BY name
        "#,
    )
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_entry_tags_in_db(
    pool: &SqlitePool,
    entry_id: i64,
) -> Result<Vec<String>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_scalar::<Sqlite, String>(
        r#"
        SELECT name FROM tags WHERE entry_id = $1 ORDER BY id
        "#,
    )
    .bind(entry_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}
