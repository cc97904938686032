use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use quad_api::app;
use quad_api::middleware::auth::Claims;
use quad_api::state::{AppState, AuthSettings};
use quad_core::identity::{Role, User};
use quad_events::{Bazar, Event, EventKind, EventStore, Trip, Workshop};
use quad_store::app_config::BusinessRules;
use quad_store::memory::{
    MemoryEventStore, MemoryFavouriteStore, MemoryUserStore, MemoryVendorRequestStore,
    RecordingMailer,
};
use quad_vendor::{
    PaymentStatus, RequestLifecycle, RequestStatus, VendorRequest, VendorRequestStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";

struct TestApp {
    router: Router,
    events: Arc<MemoryEventStore>,
    requests: Arc<MemoryVendorRequestStore>,
    mailer: Arc<RecordingMailer>,
}

fn student() -> User {
    User {
        id: Uuid::from_u128(1),
        name: "Salma".to_string(),
        email: "salma@student.example".to_string(),
        role: Role::Student,
    }
}

fn vendor() -> User {
    User {
        id: Uuid::from_u128(2),
        name: "Koshary Corner".to_string(),
        email: "vendor@market.example".to_string(),
        role: Role::Vendor,
    }
}

fn office() -> User {
    User {
        id: Uuid::from_u128(3),
        name: "Events Office".to_string(),
        email: "office@uni.example".to_string(),
        role: Role::EventsOffice,
    }
}

fn test_app() -> TestApp {
    let events = Arc::new(MemoryEventStore::default());
    let favourites = Arc::new(MemoryFavouriteStore::default());
    let requests = Arc::new(MemoryVendorRequestStore::default());
    let users = Arc::new(MemoryUserStore::with_users(vec![
        student(),
        vendor(),
        office(),
    ]));
    let mailer = Arc::new(RecordingMailer::default());

    let lifecycle = Arc::new(RequestLifecycle::new(
        requests.clone(),
        events.clone(),
        users.clone(),
        mailer.clone(),
        7,
    ));

    let state = AppState {
        events: events.clone(),
        favourites,
        vendor_requests: requests.clone(),
        users,
        mailer: mailer.clone(),
        lifecycle,
        auth: AuthSettings {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
        business_rules: BusinessRules {
            payment_window_days: 7,
            reminder_window_hours: 24,
            auto_cancel_interval_seconds: 3600,
            reminder_interval_seconds: 3600,
        },
    };

    TestApp {
        router: app(state),
        events,
        requests,
        mailer,
    }
}

fn token(user: &User) -> String {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: 2_000_000_000,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&User>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn trip(name: &str) -> Trip {
    Trip {
        id: Uuid::new_v4(),
        name: name.to_string(),
        destination: None,
        description: None,
        start_date: None,
        start_time: None,
        end_date: None,
        end_time: None,
        registration_deadline: None,
        capacity: 20,
        price: 250.0,
        attendees: Vec::new(),
        registered: Vec::new(),
        ratings: Vec::new(),
        user_comments: Vec::new(),
        archive: false,
    }
}

fn workshop(name: &str) -> Workshop {
    Workshop {
        id: Uuid::new_v4(),
        name: name.to_string(),
        faculty: None,
        professors: Vec::new(),
        description: None,
        start_date: None,
        start_time: None,
        end_date: None,
        end_time: None,
        registration_deadline: None,
        duration: None,
        capacity: 40,
        price: 0.0,
        attendees: Vec::new(),
        registered: Vec::new(),
        ratings: Vec::new(),
        user_comments: Vec::new(),
        archive: false,
    }
}

fn bazar(name: &str) -> Bazar {
    let start = chrono::Utc::now() + chrono::Duration::days(10);
    Bazar {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        start_date: Some(start.date_naive()),
        start_time: Some(start.time()),
        end_date: None,
        end_time: None,
        registration_deadline: None,
        capacity: 500,
        price: 0.0,
        vendor_participation: 0,
        booths: Vec::new(),
        attendees: Vec::new(),
        registered: Vec::new(),
        ratings: Vec::new(),
        user_comments: Vec::new(),
        archive: false,
    }
}

async fn bazar_participation(events: &MemoryEventStore, id: Uuid) -> i64 {
    match events.get(EventKind::Bazar, id).await.unwrap().unwrap() {
        Event::Bazar(b) => b.vendor_participation,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let test = test_app();
    let (status, body) = send(&test.router, "GET", "/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn students_cannot_create_events() {
    let test = test_app();
    let (status, body) = send(
        &test.router,
        "POST",
        "/v1/events",
        Some(&student()),
        Some(json!({ "type": "trip", "tripname": "Sokhna", "capacity": 10, "price": 400.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn listing_filters_by_kind_and_normalizes() {
    let test = test_app();
    test.events
        .insert(&Event::Trip(trip("Fayoum")))
        .await
        .unwrap();
    test.events
        .insert(&Event::Workshop(workshop("Welding 101")))
        .await
        .unwrap();

    let (status, body) = send(
        &test.router,
        "GET",
        "/v1/events?type=trip",
        Some(&student()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["type"], "trip");
    assert_eq!(list[0]["name"], "Fayoum");

    let (status, body) = send(
        &test.router,
        "GET",
        "/v1/events?type=hackathon",
        Some(&student()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn favourites_preserve_order_and_tolerate_deleted_targets() {
    let test = test_app();
    let t1 = trip("Fayoum");
    let w1 = workshop("Welding 101");
    let t1_id = t1.id;
    let w1_id = w1.id;
    let deleted_trip = Uuid::new_v4();
    test.events.insert(&Event::Trip(t1)).await.unwrap();
    test.events.insert(&Event::Workshop(w1)).await.unwrap();

    let user = student();
    let uri = format!("/v1/favourites/{}", user.id);
    for (item_type, item_id) in [
        ("trip", t1_id),
        ("workshop", w1_id),
        ("trip", deleted_trip),
    ] {
        let (status, _) = send(
            &test.router,
            "POST",
            &uri,
            Some(&user),
            Some(json!({ "itemType": item_type, "itemId": item_id })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = send(&test.router, "GET", &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["itemType"], "trip");
    assert_eq!(list[0]["item"]["name"], "Fayoum");
    assert_eq!(list[1]["itemType"], "workshop");
    assert_eq!(list[1]["item"]["type"], "workshop");
    assert_eq!(list[2]["itemType"], "trip");
    assert!(list[2]["item"].is_null());
}

#[tokio::test]
async fn other_students_favourites_are_off_limits() {
    let test = test_app();
    let uri = format!("/v1/favourites/{}", vendor().id);
    let (status, _) = send(&test.router, "GET", &uri, Some(&student()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registration_and_duplicate_conflict() {
    let test = test_app();
    let t = trip("Fayoum");
    let uri = format!("/v1/events/trip/{}/register", t.id);
    test.events.insert(&Event::Trip(t)).await.unwrap();

    let (status, body) = send(&test.router, "POST", &uri, Some(&student()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "trip");

    let (status, body) = send(&test.router, "POST", &uri, Some(&student()), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_REGISTERED");
}

#[tokio::test]
async fn vendor_request_validation_reports_the_field() {
    let test = test_app();
    let (status, body) = send(
        &test.router,
        "POST",
        "/v1/vendor-requests",
        Some(&vendor()),
        Some(json!({ "people": [], "boothSize": "small" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
    assert!(body["message"].as_str().unwrap().starts_with("people:"));
}

#[tokio::test]
async fn bazar_booth_lifecycle_end_to_end() {
    let test = test_app();
    let b = bazar("Spring bazar");
    let bazar_id = b.id;
    test.events.insert(&Event::Bazar(b)).await.unwrap();

    // Vendor applies.
    let (status, body) = send(
        &test.router,
        "POST",
        "/v1/vendor-requests",
        Some(&vendor()),
        Some(json!({
            "people": ["Aya", "Omar"],
            "boothSize": "medium",
            "isBazarBooth": true,
            "bazarId": bazar_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["_id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "Pending");

    // Events office approves: booth created, counter up, payment clock set.
    let (status, body) = send(
        &test.router,
        "POST",
        &format!("/v1/vendor-requests/{request_id}/accept"),
        Some(&office()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Approved");
    assert_eq!(body["paymentStatus"], "unpaid");
    assert!(!body["paymentDueAt"].is_null());
    assert!(!body["boothId"].is_null());
    assert_eq!(bazar_participation(&test.events, bazar_id).await, 1);

    // Vendor cancels before the bazar starts.
    let (status, body) = send(
        &test.router,
        "POST",
        &format!("/v1/vendor-requests/{request_id}/cancel"),
        Some(&vendor()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");
    assert_eq!(body["paymentStatus"], "cancelled");
    assert!(!body["cancelledAt"].is_null());
    assert_eq!(bazar_participation(&test.events, bazar_id).await, 0);

    // Exactly one cancellation mail reached the vendor.
    let cancellations = test
        .mailer
        .sent()
        .await
        .into_iter()
        .filter(|mail| {
            mail.to == vendor().email && mail.subject.contains("cancelled")
        })
        .count();
    assert_eq!(cancellations, 1);
}

#[tokio::test]
async fn cancelling_a_pending_request_leaves_the_bazar_counter_unchanged() {
    let test = test_app();
    let mut b = bazar("Autumn bazar");
    b.vendor_participation = 2;
    let bazar_id = b.id;
    test.events.insert(&Event::Bazar(b)).await.unwrap();

    // Vendor applies but the events office never approves.
    let (status, body) = send(
        &test.router,
        "POST",
        "/v1/vendor-requests",
        Some(&vendor()),
        Some(json!({
            "people": ["Aya"],
            "boothSize": "small",
            "isBazarBooth": true,
            "bazarId": bazar_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["_id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "Pending");

    let (status, body) = send(
        &test.router,
        "POST",
        &format!("/v1/vendor-requests/{request_id}/cancel"),
        Some(&vendor()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");
    // The other approved vendors keep their count.
    assert_eq!(bazar_participation(&test.events, bazar_id).await, 2);
}

#[tokio::test]
async fn cancelling_a_paid_request_returns_the_typed_code() {
    let test = test_app();
    let mut request = VendorRequest::new(
        vendor().id,
        vec!["Aya".to_string()],
        quad_events::BoothSize::Small,
        false,
        None,
        Some(2),
        None,
    );
    request.status = RequestStatus::Approved;
    request.payment_status = PaymentStatus::Paid;
    test.requests.insert(&request).await.unwrap();

    let (status, body) = send(
        &test.router,
        "POST",
        &format!("/v1/vendor-requests/{}/cancel", request.id),
        Some(&vendor()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PAID");
}

#[tokio::test]
async fn another_vendors_request_cannot_be_cancelled() {
    let test = test_app();
    let request = VendorRequest::new(
        Uuid::from_u128(99),
        vec!["Someone".to_string()],
        quad_events::BoothSize::Small,
        false,
        None,
        None,
        None,
    );
    test.requests.insert(&request).await.unwrap();

    let (status, body) = send(
        &test.router,
        "POST",
        &format!("/v1/vendor-requests/{}/cancel", request.id),
        Some(&vendor()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}
