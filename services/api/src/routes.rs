//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, is_fk_violation},
    middleware::{AuthUser, auth_middleware, bearer_token},
    models::{
        LoginRequest, RegisterRequest,
        wardrobe::{
            AddTagRequest, AssetResponse, ClothingFilterRequest, CreateClothingRequest,
            CreateOutfitRequest, OutfitResponse,
        },
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/secret/", post(secret))
        .route("/clothing/", post(create_clothing))
        .route("/clothing/filter/", post(filter_clothing))
        .route("/clothing/:id/", delete(delete_clothing))
        .route("/outfit/", post(create_outfit))
        .route("/outfit/:id/", delete(delete_outfit))
        .route("/tag/:outfit_id/", post(add_tag))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/session/", post(renew_session))
        .merge(protected_routes)
        .with_state(state)
}

/// Unwrap a required request field or fail with a 400
fn require(field: Option<String>, name: &str) -> Result<String, ApiError> {
    field.ok_or_else(|| ApiError::Validation(format!("Missing {}", name)))
}

/// A caller-supplied username, when present, must name the session owner
fn ensure_username_matches(auth: &AuthUser, username: Option<&str>) -> Result<(), ApiError> {
    match username {
        Some(name) if name != auth.username => Err(ApiError::Validation(
            "Username does not match the authenticated session".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "fitcheck-api"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = require(payload.username, "username")?;
    let password = require(payload.password, "password")?;

    let session = state.session_service.register(&username, &password).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = require(payload.username, "username")?;
    let password = require(payload.password, "password")?;

    let session = state.session_service.login(&username, &password).await?;

    Ok(Json(session))
}

/// Invalidate the session named by the bearer token
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)?;
    state.session_service.logout(&token).await?;

    Ok(Json(json!({"message": "Logged out successfully"})))
}

/// Mint a fresh token triple from the bearer update token
pub async fn renew_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)?;
    let session = state.session_service.renew(&token).await?;

    Ok(Json(session))
}

/// Protected route proving the session checks out
pub async fn secret(Extension(auth): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "message": format!("You have access to the secret message, {}", auth.username)
    }))
}

/// Upload a clothing image and create the clothing item
pub async fn create_clothing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateClothingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_username_matches(&auth, payload.username.as_deref())?;
    let classification = require(payload.classification, "classification")?;
    let image_data = require(payload.image_data, "image_data")?;

    let asset = state.asset_ingestor.ingest(&image_data).await?;

    // Deliberately not transactional with the upload: a failure here leaves
    // the asset row and object in place (documented behavior).
    state
        .clothing_repository
        .create(auth.id, asset.id, &classification)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create clothing: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(AssetResponse::from(&asset))))
}

/// List the session owner's clothing, optionally by classification
pub async fn filter_clothing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ClothingFilterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_username_matches(&auth, payload.username.as_deref())?;

    let items = state
        .clothing_repository
        .filter(auth.id, payload.classification.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to filter clothing: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(items))
}

/// Delete a clothing item owned by the session user
pub async fn delete_clothing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let clothing = state
        .clothing_repository
        .delete(id, auth.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete clothing: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Clothing not found".to_string()))?;

    Ok(Json(clothing))
}

/// Create an outfit from up to four clothing references
pub async fn create_outfit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateOutfitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_username_matches(&auth, payload.username.as_deref())?;

    let outfit = state
        .outfit_repository
        .create(
            auth.id,
            payload.headwear_id,
            payload.top_id,
            payload.bottom_id,
            payload.shoes_id,
        )
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                ApiError::Validation("Unknown clothing id".to_string())
            } else {
                tracing::error!("Failed to create outfit: {}", e);
                ApiError::InternalServerError
            }
        })?;

    Ok((StatusCode::CREATED, Json(OutfitResponse::new(outfit, vec![]))))
}

/// Delete an outfit owned by the session user, returning it with the tags
/// it carried
pub async fn delete_outfit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = state.outfit_repository.tags_for(id).await.map_err(|e| {
        tracing::error!("Failed to fetch outfit tags: {}", e);
        ApiError::InternalServerError
    })?;

    let outfit = state
        .outfit_repository
        .delete(id, auth.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete outfit: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Outfit not found".to_string()))?;

    Ok(Json(OutfitResponse::new(outfit, tags)))
}

/// Attach a tag (lookup-or-create by label) to an outfit
pub async fn add_tag(
    State(state): State<AppState>,
    Path(outfit_id): Path<Uuid>,
    Json(payload): Json<AddTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let label = require(payload.label, "label")?;

    state
        .outfit_repository
        .find(outfit_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up outfit: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Outfit not found".to_string()))?;

    let tag = state
        .tag_repository
        .find_or_create(&label)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert tag: {}", e);
            ApiError::InternalServerError
        })?;

    state
        .tag_repository
        .attach(outfit_id, tag.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to attach tag: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(tag))
}
