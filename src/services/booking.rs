//! Booking creation and cancellation.
//!
//! The booking row and the event's `remaining_tickets` always move together:
//! both writes happen inside one transaction with the event row locked, so a
//! concurrent burst of bookings cannot oversell an event.

use crate::models::booking::{Booking, CreateBookingRequest, STATUS_CANCELED, STATUS_CONFIRMED};
use crate::models::event::{Event, STATUS_APPROVED};
use bigdecimal::BigDecimal;
use chrono::Utc;
use log::info;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Event is not open for booking")]
    EventNotBookable,
    #[error("Invalid quantity. It must be a positive integer")]
    InvalidQuantity,
    #[error("Not enough tickets available")]
    NotEnoughTickets,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Not authorized to access this booking")]
    NotOwner,
    #[error("Booking is already canceled")]
    AlreadyCanceled,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_booking(
        &self,
        user_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if request.quantity < 1 {
            return Err(BookingError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        // lock the event row so remaining_tickets cannot change underneath us
        let event =
            sqlx::query_as::<_, Event>(r#"SELECT * FROM events WHERE id = $1 FOR UPDATE"#)
                .bind(request.event_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(BookingError::EventNotFound)?;

        if event.status != STATUS_APPROVED {
            return Err(BookingError::EventNotBookable);
        }

        if request.quantity > event.remaining_tickets {
            return Err(BookingError::NotEnoughTickets);
        }

        let total_price = &event.ticket_price * &BigDecimal::from(request.quantity);
        let now = Utc::now();

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, user_id, event_id, quantity, total_price, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event.id)
        .bind(request.quantity)
        .bind(total_price)
        .bind(STATUS_CONFIRMED)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE events
            SET remaining_tickets = remaining_tickets - $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(request.quantity)
        .bind(now)
        .bind(event.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Booking {} created: {} tickets for event {} by user {}",
            booking.id, booking.quantity, booking.event_id, user_id
        );

        Ok(booking)
    }

    pub async fn cancel_booking(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking =
            sqlx::query_as::<_, Booking>(r#"SELECT * FROM bookings WHERE id = $1 FOR UPDATE"#)
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(BookingError::BookingNotFound)?;

        if booking.user_id != user_id {
            return Err(BookingError::NotOwner);
        }

        if booking.status == STATUS_CANCELED {
            return Err(BookingError::AlreadyCanceled);
        }

        let now = Utc::now();

        let canceled = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(STATUS_CANCELED)
        .bind(now)
        .bind(booking.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE events
            SET remaining_tickets = remaining_tickets + $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(booking.quantity)
        .bind(now)
        .bind(booking.event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Booking {} canceled, {} tickets returned to event {}",
            canceled.id, canceled.quantity, canceled.event_id
        );

        Ok(canceled)
    }
}
