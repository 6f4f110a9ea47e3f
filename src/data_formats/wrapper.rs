use serde::{Deserialize, Serialize};

use super::response::EntryResponse;

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EntryWrapper<T> {
    pub entry: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleEntriesWrapper {
    pub entries: Vec<EntryResponse>,
    #[serde(rename = "entriesCount")]
    pub entry_count: usize,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TagsWrapper {
    pub tags: Vec<String>,
}

/// Success notices that the original app surfaced as flash messages.
#[derive(Debug, Deserialize, Serialize)]
pub struct MessageWrapper {
    pub message: String,
}
