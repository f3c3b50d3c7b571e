use anyhow::{anyhow, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgArguments, Arguments, PgPool};
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_DECLINED: &str = "declined";

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub image_urls: serde_json::Value,
    pub ticket_price: BigDecimal,
    pub total_tickets: i32,
    pub remaining_tickets: i32,
    pub status: String, // "pending", "approved", "declined"
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub image_urls: Option<Vec<String>>,
    pub ticket_price: BigDecimal,
    pub total_tickets: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub ticket_price: Option<BigDecimal>,
    pub total_tickets: Option<i32>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct EventAnalyticsRow {
    pub event_id: Uuid,
    pub title: String,
    pub status: String,
    pub total_tickets: i32,
    pub tickets_sold: i32,
}

#[derive(Debug, Serialize)]
pub struct EventAnalytics {
    pub event_id: Uuid,
    pub title: String,
    pub status: String,
    pub total_tickets: i32,
    pub tickets_sold: i32,
    pub percentage_booked: f64,
}

impl Event {
    pub async fn create(
        pool: &PgPool,
        organizer_id: Uuid,
        event: CreateEventRequest,
    ) -> Result<Self> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        Self::validate_details(&event.date, &event.ticket_price, event.total_tickets)?;

        let image_urls = serde_json::to_value(event.image_urls.unwrap_or_default())?;

        // new events start pending until an admin approves them,
        // with the full inventory still available
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, organizer_id, title, description, date, location, category,
                image_urls, ticket_price, total_tickets, remaining_tickets,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(organizer_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.date)
        .bind(event.location)
        .bind(event.category)
        .bind(image_urls)
        .bind(event.ticket_price)
        .bind(event.total_tickets)
        .bind(STATUS_PENDING)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>(r#"SELECT * FROM events WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(event)
    }

    pub async fn find_approved(pool: &PgPool) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, Event>(
            r#"SELECT * FROM events WHERE status = 'approved' ORDER BY date ASC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let events =
            sqlx::query_as::<_, Event>(r#"SELECT * FROM events ORDER BY created_at DESC"#)
                .fetch_all(pool)
                .await?;

        Ok(events)
    }

    pub async fn find_by_organizer(pool: &PgPool, organizer_id: Uuid) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, Event>(
            r#"SELECT * FROM events WHERE organizer_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(organizer_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    pub async fn update(&self, pool: &PgPool, update: UpdateEventRequest) -> Result<Self> {
        let now = Utc::now();

        if let Some(date) = update.date {
            if date <= now {
                return Err(anyhow!("Event date must be in the future"));
            }
        }

        if let Some(price) = &update.ticket_price {
            if *price < BigDecimal::from(0) {
                return Err(anyhow!("Ticket price must not be negative"));
            }
        }

        let mut query = String::from("UPDATE events SET updated_at = $1");
        let mut args = PgArguments::default();
        let _ = args.add(now);
        let mut param_index = 2;

        if let Some(title) = &update.title {
            query.push_str(&format!(", title = ${}", param_index));
            let _ = args.add(title);
            param_index += 1;
        }

        if let Some(description) = &update.description {
            query.push_str(&format!(", description = ${}", param_index));
            let _ = args.add(description);
            param_index += 1;
        }

        if let Some(date) = &update.date {
            query.push_str(&format!(", date = ${}", param_index));
            let _ = args.add(date);
            param_index += 1;
        }

        if let Some(location) = &update.location {
            query.push_str(&format!(", location = ${}", param_index));
            let _ = args.add(location);
            param_index += 1;
        }

        if let Some(category) = &update.category {
            query.push_str(&format!(", category = ${}", param_index));
            let _ = args.add(category);
            param_index += 1;
        }

        if let Some(image_urls) = &update.image_urls {
            query.push_str(&format!(", image_urls = ${}", param_index));
            let _ = args.add(serde_json::to_value(image_urls)?);
            param_index += 1;
        }

        if let Some(price) = &update.ticket_price {
            query.push_str(&format!(", ticket_price = ${}", param_index));
            let _ = args.add(price);
            param_index += 1;
        }

        if let Some(total_tickets) = update.total_tickets {
            if total_tickets < 1 {
                return Err(anyhow!("Total tickets must be at least 1"));
            }

            // the unsold count moves by the same delta, computed in SQL from
            // the row's current values so a booking that commits after this
            // struct was loaded keeps its decrement
            query.push_str(&format!(
                ", total_tickets = ${i}, remaining_tickets = LEAST(${i}, GREATEST(0, remaining_tickets + (${i} - total_tickets)))",
                i = param_index
            ));
            let _ = args.add(total_tickets);
            param_index += 1;
        }

        query.push_str(&format!(" WHERE id = ${} RETURNING *", param_index));
        let _ = args.add(self.id);

        let event = sqlx::query_as_with::<_, Event, _>(&query, args)
            .fetch_one(pool)
            .await?;

        Ok(event)
    }

    pub async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET status = $1, updated_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM events WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn analytics_for_organizer(
        pool: &PgPool,
        organizer_id: Uuid,
    ) -> Result<Vec<EventAnalytics>> {
        let rows = sqlx::query_as::<_, EventAnalyticsRow>(
            r#"
            SELECT id AS event_id, title, status, total_tickets,
                   total_tickets - remaining_tickets AS tickets_sold
            FROM events
            WHERE organizer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(organizer_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let percentage =
                    (row.tickets_sold as f64 / row.total_tickets as f64 * 100.0 * 100.0).round()
                        / 100.0;
                EventAnalytics {
                    event_id: row.event_id,
                    title: row.title,
                    status: row.status,
                    total_tickets: row.total_tickets,
                    tickets_sold: row.tickets_sold,
                    percentage_booked: percentage,
                }
            })
            .collect())
    }

    fn validate_details(
        date: &DateTime<Utc>,
        ticket_price: &BigDecimal,
        total_tickets: i32,
    ) -> Result<()> {
        if *date <= Utc::now() {
            return Err(anyhow!("Event date must be in the future"));
        }

        if *ticket_price < BigDecimal::from(0) {
            return Err(anyhow!("Ticket price must not be negative"));
        }

        if total_tickets < 1 {
            return Err(anyhow!("Total tickets must be at least 1"));
        }

        Ok(())
    }
}
