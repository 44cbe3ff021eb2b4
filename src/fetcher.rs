use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::info;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::snapshot::RateSnapshot;
use crate::store::RateStore;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("provider returned status {status}")]
    Status { status: u16, body: Value },
    #[error("provider reported failure")]
    Failure(Value),
}

impl FetchError {
    /// The JSON body served to the client on a 500, shaped like the
    /// provider-facing errors of the source system.
    pub fn payload(&self) -> Value {
        match self {
            FetchError::Unreachable(e) => json!({
                "error": "Service API failed.",
                "message": e.to_string(),
            }),
            FetchError::Status { status, body } => json!({
                "error": format!("Service API failed. {status}"),
                "data": body,
            }),
            FetchError::Failure(payload) => json!({
                "error": "Service API failed.",
                "message": payload,
            }),
        }
    }
}

/// Shape of the provider's historical-rates response.
#[derive(Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    base: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
    error: Option<Value>,
}

/// Pulls historical rates from the upstream provider and writes them through
/// the store.
pub struct RateFetcher {
    client: Client,
    base_url: String,
    access_key: String,
    store: Arc<dyn RateStore>,
}

impl RateFetcher {
    pub fn new(
        client: Client,
        base_url: String,
        access_key: String,
        store: Arc<dyn RateStore>,
    ) -> Self {
        Self {
            client,
            base_url,
            access_key,
            store,
        }
    }

    pub async fn fetch(&self, date: &str) -> Result<RateSnapshot, FetchError> {
        let url = format!("{}/{date}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.access_key.as_str())])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        let snapshot = parse_provider_body(status, &body, Utc::now().timestamp_millis())?;
        self.store.put(date, snapshot.clone());
        info!("Updated currency rates for {date}");

        Ok(snapshot)
    }
}

fn parse_provider_body(
    status: u16,
    body: &str,
    updated_at: i64,
) -> Result<RateSnapshot, FetchError> {
    let value: Value =
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));

    if !(200..300).contains(&status) {
        return Err(FetchError::Status {
            status,
            body: value,
        });
    }

    match serde_json::from_value::<ProviderResponse>(value.clone()) {
        Ok(response) if response.success => Ok(RateSnapshot {
            timestamp: response.timestamp,
            updated_at,
            base: response.base,
            rates: response.rates,
        }),
        Ok(response) => Err(FetchError::Failure(
            response.error.unwrap_or(value),
        )),
        Err(_) => Err(FetchError::Failure(value)),
    }
}
