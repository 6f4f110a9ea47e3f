use sqlx::{Sqlite, SqlitePool};

use crate::models::User;

mod entry_helpers;
mod tag_helpers;
mod user_helpers;

pub use entry_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

// ----------------- Helper Functions -----------------

const USER_QUERY: &str = r#"
        SELECT id, username, email, password, created_at FROM users
"#;

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let query = format!("{USER_QUERY} WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let query = format!("{USER_QUERY} WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}
