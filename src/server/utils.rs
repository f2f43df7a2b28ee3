//! Stateless helpers behind `/utils/{method}`
//!
//! The method comes from the path, or from `?method=` on bare `/utils`.

use axum::Json;
use axum::extract::Path;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::core::error::{ApiError, ApiResult, RequestError};
use crate::core::extractors::Params;
use crate::core::object::{new_id, now_millis};
use crate::core::params::QueryMap;

fn symbols() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap())
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Render `millis` with a strftime pattern, RFC 3339 when none is given
pub fn format_date(millis: i64, pattern: Option<&str>) -> ApiResult<String> {
    let date: DateTime<Utc> = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid date: {}", millis)))?;
    let Some(pattern) = pattern else {
        return Ok(date.to_rfc3339());
    };
    let mut out = String::new();
    write!(out, "{}", date.format(pattern))
        .map_err(|_| ApiError::bad_request(format!("Invalid date format: {}", pattern)))?;
    Ok(out)
}

/// Fill `{0}`, `{1}`, ... with the given fields; unmatched placeholders stay
pub fn format_message(message: &str, fields: &[String]) -> String {
    fields
        .iter()
        .enumerate()
        .fold(message.to_string(), |acc, (i, field)| {
            acc.replace(&format!("{{{}}}", i), field)
        })
}

pub fn no_spaces(text: &str, replacement: &str) -> String {
    whitespace().replace_all(text.trim(), replacement).into_owned()
}

/// Strip everything but letters, digits and single spaces
pub fn no_symbols(text: &str) -> String {
    let stripped = symbols().replace_all(text, "");
    whitespace()
        .replace_all(stripped.trim(), " ")
        .into_owned()
}

/// Rough human reading of a duration in milliseconds
pub fn time_ago(delta_millis: i64) -> String {
    const UNITS: [(u64, &str); 6] = [
        (365 * 24 * 3600, "year"),
        (30 * 24 * 3600, "month"),
        (24 * 3600, "day"),
        (3600, "hour"),
        (60, "minute"),
        (1, "second"),
    ];

    let seconds = delta_millis.unsigned_abs() / 1000;
    if seconds == 0 {
        return "moments".to_string();
    }
    UNITS
        .iter()
        .find(|(size, _)| seconds >= *size)
        .map(|(size, unit)| {
            let n = seconds / size;
            if n == 1 {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", n, unit)
            }
        })
        .unwrap_or_else(|| "moments".to_string())
}

/// Run one utility method
pub fn call(method: &str, params: &QueryMap) -> ApiResult<Value> {
    let text = |key: &str| params.first(key).unwrap_or_default().to_string();

    let value = match method.trim().to_ascii_lowercase().as_str() {
        "newid" => json!(new_id()),
        "timestamp" => json!(now_millis()),
        "formatdate" => {
            let millis = params.parse_or("date", now_millis());
            json!(format_date(millis, params.non_blank("format"))?)
        }
        "formatmessage" => {
            let fields = params.all("fields").unwrap_or_default();
            json!(format_message(&text("message"), fields))
        }
        "nospaces" => json!(no_spaces(&text("string"), &text("replacement"))),
        "nosymbols" => json!(no_symbols(&text("string"))),
        "timeago" => json!(time_ago(params.parse_or("delta", 0))),
        _ => {
            let method = Some(method.to_string()).filter(|m| !m.trim().is_empty());
            return Err(RequestError::UnknownMethod { method }.into());
        }
    };
    Ok(value)
}

/// `GET /utils/{method}`
pub async fn utils_method(
    Path(method): Path<String>,
    Params(params): Params,
) -> ApiResult<Json<Value>> {
    Ok(Json(call(&method, &params)?))
}

/// `GET /utils?method=..`
pub async fn utils_query(Params(params): Params) -> ApiResult<Json<Value>> {
    let method = params.first("method").unwrap_or_default().to_string();
    Ok(Json(call(&method, &params)?))
}
