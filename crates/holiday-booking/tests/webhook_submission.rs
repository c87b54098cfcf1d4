use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use holiday_booking::config::BookingConfig;
use holiday_booking::workflows::availability::AvailabilitySnapshot;
use holiday_booking::workflows::booking::{
    BookingDraft, Calendar, LightOption, SubmissionCoordinator, SubmissionFailure,
    SubmissionOutcome, WebhookGateway,
};
use serde_json::Value;
use url::Url;

type Received = Arc<Mutex<Vec<Value>>>;

async fn record(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().expect("received mutex poisoned").push(body);
    StatusCode::OK
}

async fn refuse() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn spawn_webhook() -> (Url, Received) {
    let received = Received::default();
    let router = Router::new()
        .route("/hook", post(record))
        .route("/closed", post(refuse))
        .with_state(received.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind webhook listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("webhook server");
    });
    let base = Url::parse(&format!("http://{addr}/")).expect("valid base url");
    (base, received)
}

fn draft() -> BookingDraft {
    BookingDraft {
        name: "Marisol Reyes".to_string(),
        address: "880 Cedar Hollow Rd".to_string(),
        phone: "555-0199".to_string(),
        email: "marisol@example.com".to_string(),
        date: "2025-12-02".to_string(),
        light_option: Some(LightOption::Alternating),
        tip_color: "red".to_string(),
        agree_terms: true,
    }
}

fn calendar() -> Calendar {
    Calendar::build(
        BookingConfig::defaults().expect("default booking config").season,
        &AvailabilitySnapshot::default(),
    )
}

fn coordinator(url: Url) -> SubmissionCoordinator {
    let gateway = WebhookGateway::new(reqwest::Client::new(), url);
    SubmissionCoordinator::new(Arc::new(gateway), "$200")
}

#[tokio::test]
async fn webhook_receives_one_json_booking() {
    let (base, received) = spawn_webhook().await;
    let coordinator = coordinator(base.join("hook").expect("hook url"));

    let attempt = coordinator.submit(&draft(), &calendar()).await;

    assert!(matches!(attempt.outcome, SubmissionOutcome::Booked(_)));
    let december_second = NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date");
    assert!(attempt.calendar.is_date_booked(december_second));

    let bodies = received.lock().expect("received mutex poisoned").clone();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["name"], "Marisol Reyes");
    assert_eq!(body["date"], "12/02/2025");
    assert_eq!(body["lightOption"], "alternating");
    assert_eq!(body["tipColor"], "red");
    assert_eq!(body["onWaitlist"], false);
    assert_eq!(body["action"], "book");
    assert_eq!(body["depositAmount"], "$200");
    assert!(body["timestamp"]
        .as_str()
        .expect("timestamp string")
        .ends_with('Z'));
}

#[tokio::test]
async fn non_success_status_is_a_rejection() {
    let (base, received) = spawn_webhook().await;
    let coordinator = coordinator(base.join("closed").expect("closed url"));
    let calendar = calendar();

    let attempt = coordinator.submit(&draft(), &calendar).await;

    assert_eq!(
        attempt.outcome.failure(),
        Some(&SubmissionFailure::Rejected { status: 503 })
    );
    assert_eq!(attempt.calendar, calendar);
    assert!(received.lock().expect("received mutex poisoned").is_empty());
}

#[tokio::test]
async fn unreachable_webhook_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    let coordinator =
        coordinator(Url::parse(&format!("http://{addr}/hook")).expect("valid url"));

    let attempt = coordinator.submit(&draft(), &calendar()).await;

    assert!(matches!(
        attempt.outcome.failure(),
        Some(SubmissionFailure::Transport(_))
    ));
}
