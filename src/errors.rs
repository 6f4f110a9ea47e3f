use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Request-level outcomes that are not a success. Every storage-layer fault
/// ends up here and is translated into a user-facing response at the request
/// boundary; nothing in this enum aborts the process.
#[derive(Debug)]
pub enum RequestError {
    NotFound,
    NotAuthorized(&'static str),
    /// A non-owner tried to mutate an entry. This is an expected condition,
    /// answered with a redirect to the entry's read-only view and a notice.
    NotOwner {
        slug: String,
        notice: &'static str,
    },
    Validation(Vec<String>),
    Duplicate(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJsonWrapper {
    errors: RequestErrorJson,
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }

    pub fn with_messages(messages: Vec<String>) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson { body: messages },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl RequestError {
    /// Rewrites a unique-constraint failure into a domain-worded duplicate
    /// error; any other error passes through unchanged. The call site that
    /// knows whether it was inserting a user or an entry picks the wording.
    pub fn duplicate_or(self, message: &'static str) -> RequestError {
        if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &self {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::Duplicate(message);
            }
        }
        self
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(RequestErrorJsonWrapper::new("Not Found")),
            )
                .into_response(),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::NotOwner { slug, notice } => (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, format!("/entries/{slug}"))],
                Json(RequestErrorJsonWrapper::new(notice)),
            )
                .into_response(),
            RequestError::Validation(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RequestErrorJsonWrapper::with_messages(messages)),
            )
                .into_response(),
            RequestError::Duplicate(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RequestErrorJsonWrapper::new("Internal Server Error")),
            )
                .into_response(),
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RequestErrorJsonWrapper::new("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}
