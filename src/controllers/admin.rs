use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::models::event::{Event, STATUS_APPROVED, STATUS_DECLINED};
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: String,
}

/// The approval queue: every event regardless of status.
pub async fn get_all_events(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    if let Err(response) = crate::middleware::auth::require_admin_user(&pool, user.id).await {
        return response;
    }

    match Event::find_all(&pool).await {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            error!("Failed to fetch events for admin: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch events. Please try again.".to_string(),
            })
        }
    }
}

pub async fn update_event_status(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
    status_data: web::Json<UpdateEventStatusRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    let admin = match crate::middleware::auth::require_admin_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let status = status_data.into_inner().status;
    if status != STATUS_APPROVED && status != STATUS_DECLINED {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid status value".to_string(),
        });
    }

    match Event::update_status(&pool, *event_id, &status).await {
        Ok(Some(event)) => {
            info!("Event {} set to {} by admin {}", event.id, status, admin.id);
            HttpResponse::Ok().json(event)
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Event not found".to_string(),
        }),
        Err(e) => {
            error!("Failed to update status of event {}: {}", event_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to update event status. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_all_bookings(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    if let Err(response) = crate::middleware::auth::require_admin_user(&pool, user.id).await {
        return response;
    }

    match Booking::find_all(&pool).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            error!("Failed to fetch bookings for admin: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch bookings. Please try again.".to_string(),
            })
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/events", web::get().to(get_all_events))
            .route("/events/{event_id}/status", web::put().to(update_event_status))
            .route("/bookings", web::get().to(get_all_bookings)),
    );
}
