//! User profile and administration endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{UpdateProfile, UpdateRole, UserProfile, UserQuery},
    scheduling::UserId,
};

use super::AuthenticatedUser;

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 404, description = "No profile document for this account")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .services
        .users
        .me(&UserId::from(claims.sub.clone()))
        .await?;
    Ok(Json(profile))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile)
    )
)]
pub async fn update_my_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .services
        .users
        .update_profile(&UserId::from(claims.sub.clone()), request)
        .await?;
    Ok(Json(profile))
}

/// List user profiles (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "User profiles", body = Vec<UserProfile>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    claims.require_admin()?;

    let users = state.services.users.list(&query).await?;
    Ok(Json(users))
}

/// Get one user profile (admin)
#[utoipa::path(
    get,
    path = "/users/{uid}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("uid" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(uid): Path<String>,
) -> AppResult<Json<UserProfile>> {
    claims.require_admin()?;

    let user = state.services.users.get_by_id(&UserId::from(uid)).await?;
    Ok(Json(user))
}

/// Change a user's role (admin)
#[utoipa::path(
    put,
    path = "/users/{uid}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("uid" = String, Path, description = "User ID")
    ),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(uid): Path<String>,
    Json(request): Json<UpdateRole>,
) -> AppResult<Json<UserProfile>> {
    claims.require_admin()?;

    let user = state
        .services
        .users
        .set_role(&UserId::from(uid), request.role)
        .await?;
    Ok(Json(user))
}
