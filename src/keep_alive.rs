//! Tiny http server for the hosting platform's health checks.
//!
//! Free hosting tiers put services to sleep after a while without traffic,
//! so when a public url is configured the bot also requests it periodically.

use crate::{settings::KeepAliveSettings, task::Task};
use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

const PING_TIMEOUT: Duration = Duration::from_secs(10);
const ENDPOINTS: [&str; 4] = ["/", "/health", "/ping", "/info"];

pub fn router(settings: Arc<KeepAliveSettings>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/info", get(info))
        .with_state(settings)
}

/// Binds the health server and serves it in the background.
pub async fn serve(settings: Arc<KeepAliveSettings>) -> Result<Task> {
    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind health server to {}", settings.bind))?;
    log::info!("Health server listening on {}", settings.bind);

    let app = router(settings);
    Ok(Task::spawn("health server", async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Health server failed: {:?}", e);
        }
    }))
}

/// Requests the public url every `ping_interval_secs`. `None` without an url.
pub fn start_self_ping(settings: &KeepAliveSettings) -> Result<Option<Task>> {
    let Some(url) = settings.external_url.clone() else {
        log::info!("No external url configured, self ping disabled.");
        return Ok(None);
    };

    let client = reqwest::Client::builder()
        .timeout(PING_TIMEOUT)
        .build()
        .context("Failed to build http client")?;
    let period = Duration::from_secs(settings.ping_interval_secs.max(1));
    log::info!("Pinging {} every {}s", url, period.as_secs());

    Ok(Some(Task::spawn("self ping", async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    log::info!("Successfully pinged {}", url)
                }
                Ok(response) => log::warn!("Ping returned status {}", response.status()),
                Err(e) => log::error!("Failed to ping {}: {}", url, e),
            }
        }
    })))
}

async fn home(State(settings): State<Arc<KeepAliveSettings>>) -> Json<Value> {
    let keep_alive = match settings.external_url {
        Some(_) => "active",
        None => "inactive",
    };

    Json(json!({
        "status": "online",
        "service": "Discord Bot",
        "host": settings.host,
        "keep_alive": keep_alive,
        "ping_url": settings.external_url,
    }))
}

async fn health() -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();

    Json(json!({
        "status": "healthy",
        "timestamp": timestamp,
    }))
}

async fn ping() -> &'static str {
    "pong"
}

fn format_interval(secs: u64) -> String {
    match secs {
        1 => "1 second".to_string(),
        secs if secs < 60 || secs % 60 != 0 => format!("{} seconds", secs),
        60 => "1 minute".to_string(),
        secs => format!("{} minutes", secs / 60),
    }
}

async fn info(State(settings): State<Arc<KeepAliveSettings>>) -> Json<Value> {
    let sleep_prevention = match settings.external_url {
        Some(_) => "Active",
        None => "Inactive",
    };

    Json(json!({
        "platform": settings.host,
        "tier": settings.tier,
        "sleep_prevention": sleep_prevention,
        "ping_interval": format_interval(settings.ping_interval_secs),
        "endpoints": ENDPOINTS,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Arc<KeepAliveSettings> {
        Arc::new(KeepAliveSettings {
            bind: "127.0.0.1:0".to_string(),
            external_url: Some("https://example.onrender.com".to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn home_reports_online() {
        let Json(body) = home(State(settings())).await;

        assert_eq!(body["status"], "online");
        assert_eq!(body["keep_alive"], "active");
        assert_eq!(body["ping_url"], "https://example.onrender.com");
    }

    #[tokio::test]
    async fn info_lists_endpoints_and_interval() {
        let Json(body) = info(State(settings())).await;

        assert_eq!(body["ping_interval"], "8 minutes");
        assert_eq!(body["tier"], "Free");
        assert_eq!(body["endpoints"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn short_intervals_are_not_rounded_to_zero() {
        assert_eq!(format_interval(30), "30 seconds");
        assert_eq!(format_interval(90), "90 seconds");
        assert_eq!(format_interval(60), "1 minute");
        assert_eq!(format_interval(480), "8 minutes");
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let Json(body) = health().await;

        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].as_f64().unwrap() > 0.0);
        assert_eq!(ping().await, "pong");
    }

    #[test]
    fn self_ping_needs_an_url() {
        let settings = KeepAliveSettings::default();

        assert!(start_self_ping(&settings).unwrap().is_none());
    }
}
