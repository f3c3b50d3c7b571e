use crate::middleware::auth::AuthenticatedUser;
use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// PUBLIC ENDPOINTS

pub async fn get_all_events(pool: web::Data<PgPool>) -> impl Responder {
    match Event::find_approved(&pool).await {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            error!("Failed to fetch events: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch events. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_event(pool: web::Data<PgPool>, event_id: web::Path<Uuid>) -> impl Responder {
    match Event::find_by_id(&pool, *event_id).await {
        Ok(Some(event)) => HttpResponse::Ok().json(event),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Event not found".to_string(),
        }),
        Err(e) => {
            error!("Failed to fetch event: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch event. Please try again.".to_string(),
            })
        }
    }
}

// ORGANIZER ENDPOINTS

pub async fn create_event(
    pool: web::Data<PgPool>,
    event_data: web::Json<CreateEventRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    let organizer =
        match crate::middleware::auth::require_organizer_user(&pool, user.id).await {
            Ok(user) => user,
            Err(response) => return response,
        };

    match Event::create(&pool, organizer.id, event_data.into_inner()).await {
        Ok(event) => {
            info!("Event created: {} by organizer {}", event.id, organizer.id);
            HttpResponse::Created().json(event)
        }
        Err(e) => {
            error!("Failed to create event for {}: {}", organizer.id, e);

            let message = e.to_string();
            if message.contains("must be in the future")
                || message.contains("must not be negative")
                || message.contains("at least 1")
            {
                HttpResponse::BadRequest().json(ErrorResponse { error: message })
            } else {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to create event. Please try again.".to_string(),
                })
            }
        }
    }
}

pub async fn update_event(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
    event_data: web::Json<UpdateEventRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    let event =
        match crate::middleware::auth::check_event_ownership(&pool, user.id, *event_id).await {
            Ok(event) => event,
            Err(response) => return response,
        };

    match event.update(&pool, event_data.into_inner()).await {
        Ok(updated) => {
            info!("Event updated: {} by user {}", updated.id, user.id);
            HttpResponse::Ok().json(updated)
        }
        Err(e) => {
            error!("Failed to update event {}: {}", event.id, e);

            let message = e.to_string();
            if message.contains("must be in the future")
                || message.contains("must not be negative")
                || message.contains("at least 1")
            {
                HttpResponse::BadRequest().json(ErrorResponse { error: message })
            } else {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to update event. Please try again.".to_string(),
                })
            }
        }
    }
}

pub async fn delete_event(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> impl Responder {
    // admins can remove any event, organizers only their own
    let caller = match crate::middleware::auth::require_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if caller.role != "admin" {
        if let Err(response) =
            crate::middleware::auth::check_event_ownership(&pool, user.id, *event_id).await
        {
            return response;
        }
    }

    match Event::delete(&pool, *event_id).await {
        Ok(true) => {
            info!("Event deleted: {} by user {}", event_id, user.id);
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Event deleted successfully"
            }))
        }
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Event not found".to_string(),
        }),
        Err(e) => {
            error!("Failed to delete event {}: {}", event_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to delete event. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_my_events(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    let organizer =
        match crate::middleware::auth::require_organizer_user(&pool, user.id).await {
            Ok(user) => user,
            Err(response) => return response,
        };

    match Event::find_by_organizer(&pool, organizer.id).await {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            error!("Failed to fetch events for organizer {}: {}", organizer.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch events. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_event_analytics(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> impl Responder {
    let organizer =
        match crate::middleware::auth::require_organizer_user(&pool, user.id).await {
            Ok(user) => user,
            Err(response) => return response,
        };

    match Event::analytics_for_organizer(&pool, organizer.id).await {
        Ok(analytics) => HttpResponse::Ok().json(analytics),
        Err(e) => {
            error!("Failed to fetch analytics for {}: {}", organizer.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch analytics. Please try again.".to_string(),
            })
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(get_all_events))
            .route("", web::post().to(create_event))
            .route("/mine", web::get().to(get_my_events))
            .route("/analytics", web::get().to(get_event_analytics))
            .route("/{event_id}", web::get().to(get_event))
            .route("/{event_id}", web::put().to(update_event))
            .route("/{event_id}", web::delete().to(delete_event)),
    );
}
