use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELED: &str = "canceled";

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub total_price: BigDecimal,
    pub status: String, // "confirmed", "canceled"
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: Uuid,
    pub quantity: i32,
}

/// Booking joined with the event it reserves, for user-facing listings.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BookingWithEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub total_price: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub event_location: String,
}

/// Booking joined with both sides, for the admin overview.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AdminBookingView {
    pub id: Uuid,
    pub quantity: i32,
    pub total_price: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
}

impl Booking {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let booking = sqlx::query_as::<_, Booking>(r#"SELECT * FROM bookings WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(booking)
    }

    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<BookingWithEvent>> {
        let bookings = sqlx::query_as::<_, BookingWithEvent>(
            r#"
            SELECT b.id, b.event_id, b.quantity, b.total_price, b.status, b.created_at,
                   e.title AS event_title, e.date AS event_date, e.location AS event_location
            FROM bookings b
            JOIN events e ON e.id = b.event_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<AdminBookingView>> {
        let bookings = sqlx::query_as::<_, AdminBookingView>(
            r#"
            SELECT b.id, b.quantity, b.total_price, b.status, b.created_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email,
                   e.id AS event_id, e.title AS event_title, e.date AS event_date
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            JOIN events e ON e.id = b.event_id
            ORDER BY b.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }
}
