//! Common test utilities for integration tests.
//!
//! The router is built over an [`InMemoryLogStore`], so these tests need no
//! database.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use campaign_logs_api::{app::create_app, config::Config};
use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use domain::models::LogEntry;
use domain::services::{InMemoryLogStore, LogStore};
use fake::Fake;
use std::sync::Arc;

/// Test configuration using the in-memory backend.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

/// Create a test app over an empty store.
pub fn create_test_app() -> Router {
    create_app(test_config(), Arc::new(InMemoryLogStore::new()))
}

/// Create a test app over `store`, keeping a handle to inspect it.
pub fn create_test_app_with_store(store: Arc<InMemoryLogStore>) -> Router {
    let store: Arc<dyn LogStore> = store;
    create_app(test_config(), store)
}

/// Create a test app whose store fails every operation.
pub fn create_unavailable_app() -> Router {
    create_app(test_config(), Arc::new(InMemoryLogStore::unavailable()))
}

/// Today's date as the service sees it.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_ago(days: i64) -> String {
    (today() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

/// A campaign number unlikely to collide with other tests.
pub fn unique_campaign() -> String {
    let n: u32 = (1000..99999).fake();
    format!("C-{}", n)
}

/// A stored entry at 09:00 UTC on an arbitrary day.
pub fn stored_entry(id: i64, location: &str, campaign: &str, log_date: &str) -> LogEntry {
    LogEntry {
        id,
        location: location.to_string(),
        campaign_number: campaign.to_string(),
        log_date: log_date.to_string(),
        terminal_success: 10,
        abnormal: false,
        errors: String::new(),
        timestamp: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
    }
}

/// Form fields for a normal submission dated today.
pub fn submission(locations: &[&str], campaign: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = locations
        .iter()
        .map(|l| ("locations".to_string(), l.to_string()))
        .collect();
    fields.extend([
        ("campaign_number".to_string(), campaign.to_string()),
        ("terminal_success".to_string(), "12".to_string()),
        ("log_date".to_string(), today().format("%Y-%m-%d").to_string()),
        ("status_normal".to_string(), "on".to_string()),
        ("errors".to_string(), String::new()),
    ]);
    fields
}

/// Form fields for an edit.
pub fn edit(location: &str, campaign: &str, log_date: &str) -> Vec<(String, String)> {
    vec![
        ("location".to_string(), location.to_string()),
        ("campaign_number".to_string(), campaign.to_string()),
        ("terminal_success".to_string(), "40".to_string()),
        ("log_date".to_string(), log_date.to_string()),
        ("status_abnormal".to_string(), "on".to_string()),
        ("errors".to_string(), "Card reader offline".to_string()),
    ]
}

/// Percent-encodes form fields.
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Create a form-encoded request.
pub fn form_request(method: Method, uri: &str, fields: &[(String, String)]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
