use serde::{Deserialize, Serialize};

use crate::models::{Entry, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct EntryResponse {
    pub title: String,
    pub slug: String,
    pub date: String,
    #[serde(rename = "timeSpent")]
    pub time_spent: i64,
    pub learned: String,
    pub resources: String,
    pub tags: Vec<String>,
    pub author: String,
}

impl UserResponse {
    pub fn new(
        User {
            username, email, ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            username,
            email,
            token,
        }
    }
}

impl EntryResponse {
    pub fn new(
        Entry {
            title,
            slug,
            date,
            time_spent,
            learned,
            resources,
            author_username,
            tag_list,
            ..
        }: Entry,
    ) -> Self {
        let tags = tag_list
            .filter(|list| !list.is_empty())
            .map(|list| list.split(',').map(|tag| tag.to_string()).collect())
            .unwrap_or_default();
        EntryResponse {
            title,
            slug,
            date: date.to_string(),
            time_spent,
            learned,
            resources,
            tags,
            author: author_username,
        }
    }
}
