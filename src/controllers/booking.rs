use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{Booking, CreateBookingRequest};
use crate::services::booking::{BookingError, BookingService};
use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn booking_error_response(e: BookingError) -> HttpResponse {
    match e {
        BookingError::EventNotFound | BookingError::BookingNotFound => {
            HttpResponse::NotFound().json(ErrorResponse {
                error: e.to_string(),
            })
        }
        BookingError::NotOwner => HttpResponse::Forbidden().json(ErrorResponse {
            error: e.to_string(),
        }),
        BookingError::EventNotBookable
        | BookingError::InvalidQuantity
        | BookingError::NotEnoughTickets
        | BookingError::AlreadyCanceled => HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }),
        BookingError::Database(e) => {
            error!("Booking database error: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Something went wrong. Please try again.".to_string(),
            })
        }
    }
}

pub async fn create_booking(
    pool: web::Data<PgPool>,
    booking_data: web::Json<CreateBookingRequest>,
    user: AuthenticatedUser,
) -> impl Responder {
    let caller = match crate::middleware::auth::require_standard_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let service = BookingService::new(pool.get_ref().clone());

    match service
        .create_booking(caller.id, booking_data.into_inner())
        .await
    {
        Ok(booking) => HttpResponse::Created().json(serde_json::json!({
            "message": "Booking created successfully",
            "booking": booking
        })),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_my_bookings(pool: web::Data<PgPool>, user: AuthenticatedUser) -> impl Responder {
    let caller = match crate::middleware::auth::require_standard_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match Booking::find_by_user(&pool, caller.id).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            error!("Failed to fetch bookings for user {}: {}", caller.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch bookings. Please try again.".to_string(),
            })
        }
    }
}

pub async fn get_booking(
    pool: web::Data<PgPool>,
    booking_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> impl Responder {
    let caller = match crate::middleware::auth::require_standard_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match Booking::find_by_id(&pool, *booking_id).await {
        // a foreign booking id reads as not-found rather than leaking its existence
        Ok(Some(booking)) if booking.user_id == caller.id => HttpResponse::Ok().json(booking),
        Ok(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Booking not found".to_string(),
        }),
        Err(e) => {
            error!("Failed to fetch booking {}: {}", booking_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch booking. Please try again.".to_string(),
            })
        }
    }
}

pub async fn cancel_booking(
    pool: web::Data<PgPool>,
    booking_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> impl Responder {
    let caller = match crate::middleware::auth::require_standard_user(&pool, user.id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let service = BookingService::new(pool.get_ref().clone());

    match service.cancel_booking(caller.id, *booking_id).await {
        Ok(booking) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Booking canceled successfully",
            "booking": booking
        })),
        Err(e) => booking_error_response(e),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(get_my_bookings))
            .route("/{booking_id}", web::get().to(get_booking))
            .route("/{booking_id}", web::delete().to(cancel_booking)),
    );
}
