use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{CreateUserRequest, LoginRequest};
use crate::services::auth::AuthService;
use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn register(
    pool: web::Data<PgPool>,
    user_data: web::Json<CreateUserRequest>,
) -> impl Responder {
    let auth = AuthService::new(pool.get_ref().clone());

    match auth.register(user_data.into_inner()).await {
        Ok((user, token)) => HttpResponse::Created().json(serde_json::json!({
            "message": "User registered successfully",
            "user": user,
            "token": token
        })),
        Err(e) => {
            error!("Registration failed: {}", e);

            let message = if e.to_string().contains("Email already registered") {
                "Email already registered"
            } else if e.to_string().contains("Password must be at least") {
                "Password must be at least 8 characters long."
            } else if e.to_string().contains("cannot be self-registered") {
                "Admin accounts cannot be self-registered."
            } else {
                "Registration failed. Please check your information and try again."
            };

            HttpResponse::BadRequest().json(ErrorResponse {
                error: message.to_string(),
            })
        }
    }
}

pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> impl Responder {
    let auth = AuthService::new(pool.get_ref().clone());

    match auth.login(login_data.into_inner()).await {
        Ok((user, token)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Login successful",
            "user": user,
            "token": token
        })),
        Err(e) => {
            error!("Login failed: {}", e);

            HttpResponse::Unauthorized().json(ErrorResponse {
                error: "Invalid email or password.".to_string(),
            })
        }
    }
}

// auth is token-based, so logout is client-side; this exists so the
// frontend has an endpoint to call
pub async fn logout() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Logout successful"
    }))
}

pub async fn verify(pool: web::Data<PgPool>, auth_user: AuthenticatedUser) -> impl Responder {
    let user = match crate::middleware::auth::require_user(&pool, auth_user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    HttpResponse::Ok().json(serde_json::json!({ "user": user }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/verify", web::get().to(verify)),
    );
}
