use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub time_spent: i64,
    pub learned: String,
    pub resources: String,
    pub user_id: i64,
    pub author_username: String,
    /// Comma-joined tag labels aggregated by the entry queries; `None` when
    /// the entry has no tags.
    pub tag_list: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub entry_id: i64,
}
