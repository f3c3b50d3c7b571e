use crate::models::event::Event;
use crate::models::user::User;
use crate::services::auth::AuthService;
use actix_web::{
    dev::Payload, error::ErrorUnauthorized, http, web, Error, FromRequest, HttpRequest,
    HttpResponse,
};
use log::{error, warn};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Extracts the caller's identity from the `Authorization: Bearer` header.
///
/// Only the token signature and expiry are checked here; role and ownership
/// checks hit the database so they always see the current role.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>> + 'static>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
                Some(header) => header,
                None => {
                    warn!("Request to {} without authorization header", req.path());
                    return Err(ErrorUnauthorized("Authorization header required"));
                }
            };

            let auth_str = match auth_header.to_str() {
                Ok(value) => value,
                Err(_) => return Err(ErrorUnauthorized("Invalid authorization header format")),
            };

            if !auth_str.starts_with("Bearer ") {
                return Err(ErrorUnauthorized("Bearer token required"));
            }

            let token = &auth_str[7..];
            if token.trim().is_empty() {
                return Err(ErrorUnauthorized("Token cannot be empty"));
            }

            let pool = match req.app_data::<web::Data<PgPool>>() {
                Some(pool) => pool,
                None => {
                    error!("Database pool not found in app data");
                    return Err(ErrorUnauthorized("Internal server error"));
                }
            };

            let auth = AuthService::new(pool.get_ref().clone());
            match auth.verify_token(token) {
                Ok(user_id) => Ok(AuthenticatedUser { id: user_id }),
                Err(e) => {
                    warn!("Token verification failed: {}", e);
                    Err(ErrorUnauthorized("Invalid or expired token"))
                }
            }
        })
    }
}

// find_by_id filters out soft-deleted rows, so a hit here is an active user
async fn load_active_user(pool: &PgPool, user_id: Uuid) -> Result<User, HttpResponse> {
    match User::find_by_id(pool, user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            warn!("Authenticated user {} no longer exists", user_id);
            Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Authentication required"
            })))
        }
        Err(e) => {
            error!("Database error loading user {}: {}", user_id, e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

pub async fn require_user(pool: &PgPool, user_id: Uuid) -> Result<User, HttpResponse> {
    load_active_user(pool, user_id).await
}

pub async fn require_admin_user(pool: &PgPool, user_id: Uuid) -> Result<User, HttpResponse> {
    let user = load_active_user(pool, user_id).await?;

    if user.role != "admin" {
        warn!("Non-admin user {} attempted admin access", user_id);
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Admin access required"
        })));
    }

    Ok(user)
}

pub async fn require_organizer_user(pool: &PgPool, user_id: Uuid) -> Result<User, HttpResponse> {
    let user = load_active_user(pool, user_id).await?;

    if user.role != "organizer" {
        warn!("User {} attempted organizer-only access", user_id);
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Organizer access required"
        })));
    }

    Ok(user)
}

pub async fn require_standard_user(pool: &PgPool, user_id: Uuid) -> Result<User, HttpResponse> {
    let user = load_active_user(pool, user_id).await?;

    if user.role != "user" {
        warn!("User {} attempted standard-user-only access", user_id);
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only standard users can perform this action"
        })));
    }

    Ok(user)
}

pub async fn check_event_ownership(
    pool: &PgPool,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Event, HttpResponse> {
    let _user = load_active_user(pool, user_id).await?;

    let event = match Event::find_by_id(pool, event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(serde_json::json!({
                "error": "Event not found"
            })));
        }
        Err(e) => {
            error!("Database error fetching event {}: {}", event_id, e);
            return Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })));
        }
    };

    if event.organizer_id != user_id {
        warn!(
            "User {} attempted to access event {} they don't own",
            user_id, event_id
        );
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You don't have permission to access this event"
        })));
    }

    Ok(event)
}
