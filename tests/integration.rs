use actix_web::{test, web, App};
use serde_json::json;
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

use ticketline::models::booking::CreateBookingRequest;
use ticketline::models::event::{Event, UpdateEventRequest};
use ticketline::models::user::LoginRequest;
use ticketline::services::{AuthService, BookingService};

// Integration tests need a real Postgres instance. They are skipped when
// neither TEST_DATABASE_URL nor DATABASE_URL is set so the rest of the
// suite can run anywhere.
async fn setup_test_db() -> Option<PgPool> {
    dotenv::from_filename(".env.test").ok();
    dotenv::dotenv().ok();

    if env::var("JWT_SECRET").is_err() {
        env::set_var("JWT_SECRET", "integration-test-secret-0123456789abcdef");
    }

    let database_url = match env::var("TEST_DATABASE_URL").or_else(|_| env::var("DATABASE_URL")) {
        Ok(url) => url,
        Err(_) => {
            println!("Skipping integration test - TEST_DATABASE_URL not set");
            return None;
        }
    };

    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

fn unique_id() -> String {
    let uuid_str = format!("{}", Uuid::new_v4().simple());
    format!("{}_{}", std::process::id(), &uuid_str[..8])
}

async fn create_test_user(pool: &PgPool, role: &str) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let suffix = unique_id();
    let email = format!("{}{}@example.com", role, suffix);
    let name = format!("{} {}", role, suffix);

    // cost factor 4 keeps the test suite fast
    let password_hash = bcrypt::hash("password123", 4).unwrap();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'active', NOW(), NOW())
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(&email)
    .bind(password_hash)
    .bind(role)
    .execute(pool)
    .await
    .expect("Failed to create test user");

    (user_id, email)
}

async fn get_auth_token(pool: &PgPool, email: &str) -> String {
    let auth = AuthService::new(pool.clone());
    let (_, token) = auth
        .login(LoginRequest {
            email: email.to_string(),
            password: "password123".to_string(),
        })
        .await
        .expect("Failed to login test user");

    token
}

async fn seed_event(
    pool: &PgPool,
    organizer_id: Uuid,
    status: &str,
    total_tickets: i32,
    remaining_tickets: i32,
) -> Uuid {
    let event_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO events (id, organizer_id, title, description, date, location, category,
                            image_urls, ticket_price, total_tickets, remaining_tickets,
                            status, created_at, updated_at)
        VALUES ($1, $2, $3, 'An event for testing', NOW() + INTERVAL '30 days',
                'Test Venue', 'music', '[]'::jsonb, 10.00, $4, $5, $6, NOW(), NOW())
        "#,
    )
    .bind(event_id)
    .bind(organizer_id)
    .bind(format!("Test Event {}", unique_id()))
    .bind(total_tickets)
    .bind(remaining_tickets)
    .bind(status)
    .execute(pool)
    .await
    .expect("Failed to seed event");

    event_id
}

async fn remaining_tickets(pool: &PgPool, event_id: Uuid) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT remaining_tickets FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("Event should exist")
}

#[actix_web::test]
async fn test_registration_and_login() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let email = format!("reg{}@example.com", unique_id());

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": "Reg Tester",
            "email": email,
            "password": "password123",
            "role": "organizer"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201, "registration should succeed");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["token"].as_str().is_some(), "registration returns a token");
    assert_eq!(body["user"]["role"], "organizer");
    assert!(
        body["user"]["password_hash"].is_null(),
        "password hash must never be serialized"
    );

    // same email again is rejected
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": "Reg Tester",
            "email": email,
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200, "login should succeed");

    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/auth/verify")
        .insert_header(("authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200, "token should verify");
}

#[actix_web::test]
async fn test_admin_role_cannot_be_self_registered() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": "Wannabe Admin",
            "email": format!("admin{}@example.com", unique_id()),
            "password": "password123",
            "role": "admin"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_event_approval_flow() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (_organizer_id, organizer_email) = create_test_user(&pool, "organizer").await;
    let (_admin_id, admin_email) = create_test_user(&pool, "admin").await;

    let organizer_token = get_auth_token(&pool, &organizer_email).await;
    let admin_token = get_auth_token(&pool, &admin_email).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/events")
        .insert_header(("authorization", format!("Bearer {}", organizer_token)))
        .set_json(json!({
            "title": format!("Approval Flow {}", unique_id()),
            "description": "A concert that needs approval",
            "date": "2030-06-01T19:00:00Z",
            "location": "Main Hall",
            "category": "music",
            "ticket_price": "25.00",
            "total_tickets": 100
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201, "event creation should succeed");

    let event: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(event["status"], "pending");
    assert_eq!(event["remaining_tickets"], 100);
    let event_id = event["id"].as_str().unwrap().to_string();

    // pending events are not publicly listed
    let req = test::TestRequest::get().uri("/events").to_request();
    let resp = test::call_service(&app, req).await;
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert!(
        !listed
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == event_id.as_str()),
        "pending event must not appear in the public listing"
    );

    // a bogus status is rejected
    let req = test::TestRequest::put()
        .uri(&format!("/admin/events/{}/status", event_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "status": "sideways" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/admin/events/{}/status", event_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200, "admin approval should succeed");

    let req = test::TestRequest::get().uri("/events").to_request();
    let resp = test::call_service(&app, req).await;
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert!(
        listed
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == event_id.as_str()),
        "approved event must appear in the public listing"
    );
}

#[actix_web::test]
async fn test_role_gates() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (_user_id, user_email) = create_test_user(&pool, "user").await;
    let user_token = get_auth_token(&pool, &user_email).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    // standard users cannot post events
    let req = test::TestRequest::post()
        .uri("/events")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({
            "title": "Not Allowed",
            "description": "Standard users cannot post events",
            "date": "2030-06-01T19:00:00Z",
            "location": "Nowhere",
            "category": "other",
            "ticket_price": "0",
            "total_tickets": 10
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // nor see the admin surfaces
    let req = test::TestRequest::get()
        .uri("/admin/events")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // unauthenticated booking attempts are rejected outright
    let req = test::TestRequest::post()
        .uri("/bookings")
        .set_json(json!({ "event_id": Uuid::new_v4(), "quantity": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_booking_lifecycle() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, _) = create_test_user(&pool, "organizer").await;
    let (_user_id, user_email) = create_test_user(&pool, "user").await;
    let user_token = get_auth_token(&pool, &user_email).await;

    let event_id = seed_event(&pool, organizer_id, "approved", 50, 50).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({ "event_id": event_id, "quantity": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201, "booking should succeed");

    let body: serde_json::Value = test::read_body_json(resp).await;
    let booking = &body["booking"];
    assert_eq!(booking["quantity"], 3);
    assert_eq!(booking["status"], "confirmed");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // inventory moved with the booking
    assert_eq!(remaining_tickets(&pool, event_id).await, 47);

    // 3 tickets at 10.00 each
    let total: f64 = booking["total_price"].as_str().map_or_else(
        || booking["total_price"].as_f64().unwrap(),
        |s| s.parse().unwrap(),
    );
    assert!((total - 30.0).abs() < f64::EPSILON);

    let req = test::TestRequest::get()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let bookings: serde_json::Value = test::read_body_json(resp).await;
    assert!(bookings
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == booking_id.as_str()));

    // cancel restores the inventory
    let req = test::TestRequest::delete()
        .uri(&format!("/bookings/{}", booking_id))
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200, "cancellation should succeed");
    assert_eq!(remaining_tickets(&pool, event_id).await, 50);

    // a second cancel is refused and does not restore tickets twice
    let req = test::TestRequest::delete()
        .uri(&format!("/bookings/{}", booking_id))
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(remaining_tickets(&pool, event_id).await, 50);
}

#[actix_web::test]
async fn test_booking_rejections() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, _) = create_test_user(&pool, "organizer").await;
    let (_user_id, user_email) = create_test_user(&pool, "user").await;
    let user_token = get_auth_token(&pool, &user_email).await;

    let scarce_event = seed_event(&pool, organizer_id, "approved", 10, 2).await;
    let pending_event = seed_event(&pool, organizer_id, "pending", 10, 10).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    // more tickets than remain
    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({ "event_id": scarce_event, "quantity": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(remaining_tickets(&pool, scarce_event).await, 2);

    // zero quantity
    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({ "event_id": scarce_event, "quantity": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // unapproved event
    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({ "event_id": pending_event, "quantity": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // unknown event
    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", user_token)))
        .set_json(json!({ "event_id": Uuid::new_v4(), "quantity": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_booking_privacy() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, _) = create_test_user(&pool, "organizer").await;
    let (_alice_id, alice_email) = create_test_user(&pool, "user").await;
    let (_bob_id, bob_email) = create_test_user(&pool, "user").await;
    let alice_token = get_auth_token(&pool, &alice_email).await;
    let bob_token = get_auth_token(&pool, &bob_email).await;

    let event_id = seed_event(&pool, organizer_id, "approved", 20, 20).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .insert_header(("authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "event_id": event_id, "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // another user's booking reads as not found
    let req = test::TestRequest::get()
        .uri(&format!("/bookings/{}", booking_id))
        .insert_header(("authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // and cannot be canceled by them either
    let req = test::TestRequest::delete()
        .uri(&format!("/bookings/{}", booking_id))
        .insert_header(("authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    assert_eq!(remaining_tickets(&pool, event_id).await, 18);
}

#[actix_web::test]
async fn test_organizer_analytics() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, organizer_email) = create_test_user(&pool, "organizer").await;
    let organizer_token = get_auth_token(&pool, &organizer_email).await;

    // 25 of 100 sold
    let event_id = seed_event(&pool, organizer_id, "approved", 100, 75).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/events/analytics")
        .insert_header(("authorization", format!("Bearer {}", organizer_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let analytics: serde_json::Value = test::read_body_json(resp).await;
    let row = analytics
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["event_id"] == event_id.to_string())
        .expect("seeded event should appear in analytics");

    assert_eq!(row["tickets_sold"], 25);
    assert_eq!(row["percentage_booked"], 25.0);
}

#[actix_web::test]
async fn test_event_update_moves_inventory_with_total() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, organizer_email) = create_test_user(&pool, "organizer").await;
    let organizer_token = get_auth_token(&pool, &organizer_email).await;

    // 3 of 50 already sold
    let event_id = seed_event(&pool, organizer_id, "approved", 50, 47).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    // growing the inventory moves the unsold count by the same delta
    let req = test::TestRequest::put()
        .uri(&format!("/events/{}", event_id))
        .insert_header(("authorization", format!("Bearer {}", organizer_token)))
        .set_json(json!({ "title": "Bigger Venue", "total_tickets": 60 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200, "event update should succeed");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Bigger Venue");
    assert_eq!(body["total_tickets"], 60);
    assert_eq!(body["remaining_tickets"], 57);
    assert_eq!(
        body["location"], "Test Venue",
        "untouched fields survive a partial update"
    );

    // shrinking below the sold count floors remaining at zero, capped at total
    let req = test::TestRequest::put()
        .uri(&format!("/events/{}", event_id))
        .insert_header(("authorization", format!("Bearer {}", organizer_token)))
        .set_json(json!({ "total_tickets": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_tickets"], 5);
    assert_eq!(body["remaining_tickets"], 2);

    // a past date is still rejected on update
    let req = test::TestRequest::put()
        .uri(&format!("/events/{}", event_id))
        .insert_header(("authorization", format!("Bearer {}", organizer_token)))
        .set_json(json!({ "date": "2000-01-01T00:00:00Z" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_event_update_keeps_booking_sales_made_after_load() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, _) = create_test_user(&pool, "organizer").await;
    let (user_id, _) = create_test_user(&pool, "user").await;

    let event_id = seed_event(&pool, organizer_id, "approved", 50, 50).await;

    // the organizer's edit starts from a snapshot taken before the sale
    let snapshot = Event::find_by_id(&pool, event_id)
        .await
        .unwrap()
        .expect("seeded event should exist");

    let bookings = BookingService::new(pool.clone());
    bookings
        .create_booking(
            user_id,
            CreateBookingRequest {
                event_id,
                quantity: 5,
            },
        )
        .await
        .expect("booking should succeed");
    assert_eq!(remaining_tickets(&pool, event_id).await, 45);

    let updated = snapshot
        .update(
            &pool,
            UpdateEventRequest {
                title: None,
                description: None,
                date: None,
                location: None,
                category: None,
                image_urls: None,
                ticket_price: None,
                total_tickets: Some(60),
            },
        )
        .await
        .expect("update should succeed");

    // 5 sold tickets stay sold: 45 remaining plus the 10 added seats
    assert_eq!(updated.total_tickets, 60);
    assert_eq!(updated.remaining_tickets, 55);
}

#[actix_web::test]
async fn test_concurrent_bookings_cannot_oversell() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (organizer_id, _) = create_test_user(&pool, "organizer").await;
    let (alice_id, _) = create_test_user(&pool, "user").await;
    let (bob_id, _) = create_test_user(&pool, "user").await;

    // one ticket left, two buyers racing
    let event_id = seed_event(&pool, organizer_id, "approved", 10, 1).await;

    let bookings = BookingService::new(pool.clone());
    let (alice_result, bob_result) = tokio::join!(
        bookings.create_booking(
            alice_id,
            CreateBookingRequest {
                event_id,
                quantity: 1,
            },
        ),
        bookings.create_booking(
            bob_id,
            CreateBookingRequest {
                event_id,
                quantity: 1,
            },
        ),
    );

    let successes = [alice_result.is_ok(), bob_result.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1, "exactly one buyer gets the last ticket");
    assert_eq!(remaining_tickets(&pool, event_id).await, 0);
}

#[actix_web::test]
async fn test_admin_user_management() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (_admin_id, admin_email) = create_test_user(&pool, "admin").await;
    let (target_id, target_email) = create_test_user(&pool, "user").await;
    let admin_token = get_auth_token(&pool, &admin_email).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    // promote to organizer
    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", target_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "role": "organizer" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "organizer");

    // soft delete
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", target_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // deleted users cannot log in anymore
    let auth = AuthService::new(pool.clone());
    let login = auth
        .login(LoginRequest {
            email: target_email,
            password: "password123".to_string(),
        })
        .await;
    assert!(login.is_err());

    // and are gone from the admin listing
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let users: serde_json::Value = test::read_body_json(resp).await;
    assert!(!users
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["id"] == target_id.to_string()));
}

#[actix_web::test]
async fn test_admin_email_update_is_normalized_and_checked() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (_admin_id, admin_email) = create_test_user(&pool, "admin").await;
    let (_alice_id, alice_email) = create_test_user(&pool, "user").await;
    let (bob_id, _) = create_test_user(&pool, "user").await;
    let admin_token = get_auth_token(&pool, &admin_email).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    // a taken email is refused even when the casing differs
    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", bob_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "email": alice_email.to_uppercase() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400, "duplicate email must be a client error");

    // a fresh mixed-case email is stored lowercased
    let fresh = format!("Admin.Set.{}@Example.COM", unique_id());
    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", bob_id))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "email": fresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], fresh.to_lowercase());

    // unknown users are a 404, not a server error
    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", Uuid::new_v4()))
        .insert_header(("authorization", format!("Bearer {}", admin_token)))
        .set_json(json!({ "name": "Nobody" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_event_ownership_enforced() {
    let Some(pool) = setup_test_db().await else {
        return;
    };

    let (owner_id, _) = create_test_user(&pool, "organizer").await;
    let (_other_id, other_email) = create_test_user(&pool, "organizer").await;
    let other_token = get_auth_token(&pool, &other_email).await;

    let event_id = seed_event(&pool, owner_id, "approved", 10, 10).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(ticketline::configure_routes),
    )
    .await;

    let req = test::TestRequest::put()
        .uri(&format!("/events/{}", event_id))
        .insert_header(("authorization", format!("Bearer {}", other_token)))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403, "only the owner may edit an event");

    let req = test::TestRequest::delete()
        .uri(&format!("/events/{}", event_id))
        .insert_header(("authorization", format!("Bearer {}", other_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403, "only the owner or an admin may delete");
}
