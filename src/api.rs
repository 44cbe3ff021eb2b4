use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, web};
use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::convert::{self, ConvertError};
use crate::fetcher::{FetchError, RateFetcher};
use crate::store::RateStore;

pub struct AppState {
    pub store: Arc<dyn RateStore>,
    pub fetcher: RateFetcher,
}

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex"));
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w{3}$").expect("Invalid regex"));
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]{0,2}$").expect("Invalid regex"));

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    UnknownCurrency(#[from] ConvertError),
    #[error(transparent)]
    Provider(#[from] FetchError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UnknownCurrency(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Provider(e) => HttpResponse::InternalServerError().json(e.payload()),
            other => HttpResponse::BadRequest().json(ErrorBody {
                code: "400",
                message: other.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct ConvertData {
    base: String,
    symbol: String,
    rate: String,
    amount: String,
}

#[derive(Serialize)]
struct ConvertBody {
    code: u16,
    data: ConvertData,
}

pub async fn index() -> impl Responder {
    "Currency Rate Converter. See README for details."
}

/// GET /api/v1/convert?date=YYYY-MM-DD&base=XXX&symbol=XXX&amount=D.DD
pub async fn convert(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let params: HashMap<String, String> = query
        .into_inner()
        .into_iter()
        .map(|(key, value)| (key, value.to_uppercase()))
        .collect();

    let missing: Vec<&str> = ["date", "symbol", "amount"]
        .into_iter()
        .filter(|key| !params.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "Missing `{}` in query.",
            missing.join("`, `")
        )));
    }

    let date = &params["date"];
    let symbol = &params["symbol"];
    let base = params
        .get("base")
        .cloned()
        .unwrap_or_else(|| "EUR".to_string());

    if !DATE_RE.is_match(date) {
        return Err(ApiError::Validation(
            "Invalid date format. Must be YYYY-MM-DD".to_string(),
        ));
    }
    if !CODE_RE.is_match(&base) {
        return Err(ApiError::Validation(
            "Invalid base format. Must be ISO 4217".to_string(),
        ));
    }
    if !CODE_RE.is_match(symbol) {
        return Err(ApiError::Validation(
            "Invalid symbol format. Must be ISO 4217".to_string(),
        ));
    }
    if !AMOUNT_RE.is_match(&params["amount"]) {
        return Err(ApiError::Validation(
            "Invalid amount format. Must be 2-place decimal".to_string(),
        ));
    }
    let amount: f64 = params["amount"].parse().map_err(|_| {
        ApiError::Validation("Invalid amount format. Must be 2-place decimal".to_string())
    })?;

    let snapshot = match state.store.get(date) {
        Some(snapshot) => {
            info!("Found rates from cache for {date}");
            snapshot
        }
        None => {
            info!("Rate not found from cache for {date}");
            state.fetcher.fetch(date).await?
        }
    };

    let conversion = convert::convert(&snapshot.rates, &base, symbol, amount)?;
    debug!(
        "{symbol} {} / {base} {} = {}",
        snapshot.rates[symbol.as_str()],
        snapshot.rates[base.as_str()],
        conversion.rate
    );

    Ok(HttpResponse::Ok().json(ConvertBody {
        code: 200,
        data: ConvertData {
            base,
            symbol: symbol.clone(),
            rate: format!("{:.6}", conversion.rate),
            amount: format!("{:.6}", conversion.amount),
        },
    }))
}
