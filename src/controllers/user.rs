use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{AdminUpdateUserRequest, UpdateProfileRequest, User};
use crate::services::auth::AuthService;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn get_profile(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    let caller = match crate::middleware::auth::require_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    HttpResponse::Ok().json(caller)
}

pub async fn update_profile(
    pool: web::Data<PgPool>,
    update: web::Json<UpdateProfileRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(response) = crate::middleware::auth::require_user(&pool, user.id).await {
        return response;
    }

    let auth = AuthService::new(pool.get_ref().clone());

    match auth.update_profile(user.id, update.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => {
            error!("Failed to update profile for {}: {}", user.id, e);

            let message = e.to_string();
            if message.contains("Email already registered")
                || message.contains("Password must be at least")
            {
                HttpResponse::BadRequest().json(ErrorResponse { error: message })
            } else {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to update profile. Please try again.".to_string(),
                })
            }
        }
    }
}

// ADMIN USER MANAGEMENT

pub async fn get_all_users(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    if let Err(response) = crate::middleware::auth::require_admin_user(&pool, user.id).await {
        return response;
    }

    match User::find_all(&pool).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => {
            error!("Failed to fetch users: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch users. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_user_by_id(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> impl Responder {
    if let Err(response) = crate::middleware::auth::require_admin_user(&pool, user.id).await {
        return response;
    }

    match User::find_by_id(&pool, *user_id).await {
        Ok(Some(found)) => HttpResponse::Ok().json(found),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
        }),
        Err(e) => {
            error!("Failed to fetch user {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch user. Please try again.".to_string(),
            })
        }
    }
}

pub async fn update_user_by_id(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    update: web::Json<AdminUpdateUserRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    let admin = match crate::middleware::auth::require_admin_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let AdminUpdateUserRequest { name, email, role } = update.into_inner();

    if let Some(role) = &role {
        if !matches!(role.as_str(), "user" | "organizer" | "admin") {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid role value".to_string(),
            });
        }
    }

    // same path as self-service profile updates, so emails get lowercased
    // and checked against existing accounts
    let auth = AuthService::new(pool.get_ref().clone());
    let updated = match auth
        .update_profile(
            *user_id,
            UpdateProfileRequest {
                name,
                email,
                password: None,
            },
        )
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            error!("Failed to update user {}: {}", user_id, e);

            let message = e.to_string();
            if message.contains("User not found") {
                return HttpResponse::NotFound().json(ErrorResponse { error: message });
            }
            if message.contains("Email already registered") {
                return HttpResponse::BadRequest().json(ErrorResponse { error: message });
            }
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to update user. Please try again.".to_string(),
            });
        }
    };

    if let Some(role) = &role {
        match User::update_role(&pool, updated.id, role).await {
            Ok(Some(with_role)) => {
                info!("Role of user {} set to {} by admin {}", with_role.id, role, admin.id);
                return HttpResponse::Ok().json(with_role);
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(ErrorResponse {
                    error: "User not found".to_string(),
                })
            }
            Err(e) => {
                error!("Failed to update role of {}: {}", user_id, e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to update user. Please try again.".to_string(),
                });
            }
        }
    }

    HttpResponse::Ok().json(updated)
}

pub async fn delete_user_by_id(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> impl Responder {
    let admin = match crate::middleware::auth::require_admin_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let target = match User::find_by_id(&pool, *user_id).await {
        Ok(Some(target)) => target,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "User not found".to_string(),
            })
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch user. Please try again.".to_string(),
            });
        }
    };

    match target.delete_account(&pool).await {
        Ok(_) => {
            info!("User {} deleted by admin {}", target.id, admin.id);
            HttpResponse::Ok().json(serde_json::json!({
                "message": "User deleted successfully"
            }))
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to delete user. Please try again.".to_string(),
            })
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("", web::get().to(get_all_users))
            .route("/{user_id}", web::get().to(get_user_by_id))
            .route("/{user_id}", web::put().to(update_user_by_id))
            .route("/{user_id}", web::delete().to(delete_user_by_id)),
    );
}
