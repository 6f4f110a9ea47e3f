use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut messages = Vec::new();
        if self.username.is_empty()
            || !self
                .username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            messages.push(
                "Username should be one word, letters, numbers and underscores only".to_string(),
            );
        }
        if !self.email.contains('@') {
            messages.push("Please enter a valid email address".to_string());
        }
        if self.password.len() < 6 {
            messages.push("Password should be at least 6 characters long".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(RequestError::Validation(messages))
        }
    }
}

// ----------------- Entry Request -----------------

/// Payload for both entry creation and edit. The fields arrive already
/// type-checked; `tags` is the raw `#`-delimited string from the form.
#[derive(Deserialize, Serialize, Debug)]
pub struct EntryRequest {
    pub title: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub time_spent: i64,
    pub learned: String,
    pub resources: String,
    #[serde(default)]
    pub tags: Option<String>,
}

impl EntryRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut messages = Vec::new();
        if self.title.trim().is_empty() {
            messages.push("Title is required".to_string());
        }
        if self.time_spent < 1 {
            messages.push(
                "Time spent should be a whole (non-zero) positive number of hours".to_string(),
            );
        }
        if self.learned.trim().is_empty() {
            messages.push("Please enter the things you've learned".to_string());
        }
        if self.resources.trim().is_empty() {
            messages.push("Please enter the resources you've used".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(RequestError::Validation(messages))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_entry() -> EntryRequest {
        EntryRequest {
            title: "Ownership and Borrowing".to_string(),
            date: None,
            time_spent: 3,
            learned: "Lifetimes are regions, not scopes".to_string(),
            resources: "The Rustonomicon".to_string(),
            tags: Some("rust#memory".to_string()),
        }
    }

    #[test]
    fn valid_entry_passes() {
        assert!(valid_entry().validate().is_ok());
    }

    #[test]
    fn zero_or_negative_time_spent_is_rejected() {
        for time_spent in [0, -4] {
            let request = EntryRequest {
                time_spent,
                ..valid_entry()
            };
            match request.validate() {
                Err(RequestError::Validation(messages)) => {
                    assert_eq!(messages.len(), 1);
                    assert!(messages[0].contains("Time spent"));
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_required_fields_are_all_reported() {
        let request = EntryRequest {
            title: "  ".to_string(),
            learned: String::new(),
            resources: String::new(),
            ..valid_entry()
        };
        match request.validate() {
            Err(RequestError::Validation(messages)) => assert_eq!(messages.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_bad_username_and_short_password() {
        let request = RegisterRequest {
            email: "crab@example.com".to_string(),
            password: "short".to_string(),
            username: "not a word".to_string(),
        };
        match request.validate() {
            Err(RequestError::Validation(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
