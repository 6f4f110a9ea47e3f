use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    data_formats::{
        EntryRequest, EntryResponse, EntryWrapper, LoginRequest, MessageWrapper,
        MultipleEntriesWrapper, RegisterRequest, TagsWrapper, UserResponse, UserWrapper,
    },
    db_helpers::{
        create_entry_in_db, delete_entry_in_db, get_entry_by_slug_in_db, get_user_by_email,
        get_user_by_id, insert_user, list_entries_by_tag_in_db, list_entries_in_db,
        list_tags_in_db, update_entry_in_db,
    },
    errors::RequestError,
    models::Entry,
};

type UserJson = UserWrapper<UserResponse>;
type EntryJson = EntryWrapper<EntryResponse>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn require_user(maybe_user: Option<AuthUser>) -> Result<AuthUser, RequestError> {
    maybe_user.ok_or(RequestError::NotAuthorized("Need to be authorized"))
}

/// Only the entry owner may edit or delete it. A mismatch is an expected
/// user-facing condition answered with a redirect to the read-only view,
/// never an error page.
fn ensure_owner(user: &AuthUser, entry: &Entry, notice: &'static str) -> Result<(), RequestError> {
    if user.id != entry.user_id {
        return Err(RequestError::NotOwner {
            slug: entry.slug.clone(),
            notice,
        });
    }
    Ok(())
}

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user: mut request }): Json<UserWrapper<RegisterRequest>>,
) -> Result<Json<UserJson>, RequestError> {
    request.validate()?;
    request.password = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError)?;

    let user = insert_user(&pool, &request)
        .await
        .map_err(|e| e.duplicate_or("User already exists"))?;

    let token = get_jwt_token(user.id, &user.username).map_err(|_| RequestError::ServerError)?;
    Ok(Json(UserWrapper {
        user: UserResponse::new(user, token),
    }))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> Result<Json<UserJson>, RequestError> {
    // The same message for an unknown email and a wrong password, so the
    // response does not reveal which accounts exist.
    const BAD_CREDENTIALS: &str = "Your email or password doesn't match";

    let user = get_user_by_email(&pool, &request.email)
        .await?
        .ok_or(RequestError::NotAuthorized(BAD_CREDENTIALS))?;

    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !is_password_correct {
        return Err(RequestError::NotAuthorized(BAD_CREDENTIALS));
    }

    let token = get_jwt_token(user.id, &user.username).map_err(|_| RequestError::ServerError)?;
    Ok(Json(UserWrapper {
        user: UserResponse::new(user, token),
    }))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    MaybeUser(maybe_user): MaybeUser,
) -> Result<Json<UserJson>, RequestError> {
    let AuthUser { id, token, .. } = require_user(maybe_user)?;
    let user = get_user_by_id(&pool, id).await?.ok_or(RequestError::NotFound)?;
    Ok(Json(UserWrapper {
        user: UserResponse::new(user, token),
    }))
}

// ----------------- Entry Handlers -----------------
pub async fn list_entries(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<MultipleEntriesWrapper>, RequestError> {
    let entries = list_entries_in_db(&pool).await?;
    Ok(Json(wrap_entries(entries)))
}

pub async fn list_entries_by_tag(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(tag): Path<String>,
) -> Result<Json<MultipleEntriesWrapper>, RequestError> {
    let entries = list_entries_by_tag_in_db(&pool, &tag).await?;
    Ok(Json(wrap_entries(entries)))
}

pub async fn get_entry(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(slug): Path<String>,
) -> Result<Json<EntryJson>, RequestError> {
    let entry = get_entry_by_slug_in_db(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound)?;
    Ok(Json(EntryWrapper {
        entry: EntryResponse::new(entry),
    }))
}

pub async fn create_entry(
    Extension(pool): Extension<Arc<SqlitePool>>,
    MaybeUser(maybe_user): MaybeUser,
    Json(EntryWrapper { entry: request }): Json<EntryWrapper<EntryRequest>>,
) -> Result<Json<EntryJson>, RequestError> {
    let user = require_user(maybe_user)?;
    request.validate()?;

    let entry = create_entry_in_db(&pool, user.id, request)
        .await
        .map_err(|e| e.duplicate_or("Entry with the same title already exists"))?;
    Ok(Json(EntryWrapper {
        entry: EntryResponse::new(entry),
    }))
}

pub async fn update_entry(
    Extension(pool): Extension<Arc<SqlitePool>>,
    MaybeUser(maybe_user): MaybeUser,
    Path(slug): Path<String>,
    Json(EntryWrapper { entry: request }): Json<EntryWrapper<EntryRequest>>,
) -> Result<Json<EntryJson>, RequestError> {
    let user = require_user(maybe_user)?;
    let entry = get_entry_by_slug_in_db(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound)?;
    ensure_owner(&user, &entry, "Only the entry owner can edit it")?;
    request.validate()?;

    let entry = update_entry_in_db(&pool, entry.id, request)
        .await
        .map_err(|e| e.duplicate_or("Entry with the same title already exists"))?;
    Ok(Json(EntryWrapper {
        entry: EntryResponse::new(entry),
    }))
}

pub async fn delete_entry(
    Extension(pool): Extension<Arc<SqlitePool>>,
    MaybeUser(maybe_user): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageWrapper>, RequestError> {
    let user = require_user(maybe_user)?;
    let entry = get_entry_by_slug_in_db(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound)?;
    ensure_owner(&user, &entry, "Only the entry owner can delete it")?;

    delete_entry_in_db(&pool, entry.id).await?;
    Ok(Json(MessageWrapper {
        message: "Entry has been successfully deleted".to_string(),
    }))
}

// ----------------- Tag Handlers -----------------
pub async fn list_tags(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Json<TagsWrapper>, RequestError> {
    let tags = list_tags_in_db(&pool).await?;
    Ok(Json(TagsWrapper { tags }))
}

fn wrap_entries(entries: Vec<Entry>) -> MultipleEntriesWrapper {
    let entries: Vec<EntryResponse> = entries.into_iter().map(EntryResponse::new).collect();
    MultipleEntriesWrapper {
        entry_count: entries.len(),
        entries,
    }
}
