//! API integration tests
//!
//! These run against a live server (and its document store) started
//! separately. Tokens are minted with the development JWT secret.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use quadrangle_server::models::user::UserClaims;
use quadrangle_server::scheduling::Role;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEV_SECRET: &str = "change-this-secret-in-production";

fn token_for(sub: &str, role: Role) -> String {
    let now = Utc::now();
    let claims = UserClaims {
        sub: sub.to_string(),
        role,
        name: None,
        email: None,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    claims.create_token(DEV_SECRET).expect("Failed to mint token")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_bookings_require_authentication() {
    let client = Client::new();

    let response = client
        .get(format!("{}/bookings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_resources() {
    let client = Client::new();
    let token = token_for("student-1", Role::Student);

    let response = client
        .get(format!("{}/resources", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_students_cannot_create_resources() {
    let client = Client::new();
    let token = token_for("student-1", Role::Student);

    let response = client
        .post(format!("{}/resources", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Lecture Hall B",
            "type": "room",
            "location": "Main Building",
            "capacity": 120
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_booking_and_approval_flow() {
    let client = Client::new();
    let admin_token = token_for("registrar", Role::Admin);
    let student_token = token_for("student-1", Role::Student);

    // Admin creates a bookable resource.
    let response = client
        .post(format!("{}/resources", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "name": "Minibus",
            "type": "vehicle",
            "location": "Car Park 2",
            "capacity": 8
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let resource: Value = response.json().await.expect("Failed to parse resource");

    // Student books it for tomorrow morning.
    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::hours(2);
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "resource_id": resource["id"],
            "start_time": start.to_rfc3339(),
            "end_time": end.to_rfc3339(),
            "purpose": "field trip"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let group: Value = response.json().await.expect("Failed to parse group");
    assert_eq!(group["occurrences"].as_array().map(Vec::len), Some(1));
    let occurrence_id = group["occurrences"][0]["id"]
        .as_str()
        .expect("No occurrence id")
        .to_string();

    // Student cannot approve their own booking.
    let response = client
        .post(format!(
            "{}/bookings/occurrences/{}/approve",
            BASE_URL, occurrence_id
        ))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Admin approves it.
    let response = client
        .post(format!(
            "{}/bookings/occurrences/{}/approve",
            BASE_URL, occurrence_id
        ))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let change: Value = response.json().await.expect("Failed to parse change");
    assert_eq!(change["new_status"], "approved");

    // An overlapping submission is now refused.
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "resource_id": resource["id"],
            "start_time": (start + Duration::hours(1)).to_rfc3339(),
            "end_time": (end + Duration::hours(1)).to_rfc3339(),
            "purpose": "second trip"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_availability_probe() {
    let client = Client::new();
    let token = token_for("student-1", Role::Student);

    let start = Utc::now() + Duration::days(30);
    let end = start + Duration::hours(1);
    let response = client
        .get(format!("{}/resources/nonexistent/availability", BASE_URL))
        .query(&[("start", start.to_rfc3339()), ("end", end.to_rfc3339())])
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_stats() {
    let client = Client::new();
    let token = token_for("registrar", Role::Admin);

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["resources"]["total"].is_number());
    assert!(body["bookings"]["active"].is_number());
    assert!(body["bookings"]["utilization_rate"].is_number());
}
