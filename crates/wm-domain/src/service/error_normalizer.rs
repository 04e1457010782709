//! Turns failed responses into [`ApiError`]s
//!
//! Backend errors come in FastAPI shapes: `{"detail": "..."}`,
//! `{"detail": {"message": "..."}}`, `{"error": "..."}`, or a validation
//! array `{"detail": [{"loc": ["body", "name"], "msg": "..."}]}`.

use serde_json::Value;
use wm_types::{ApiError, FieldErrors, HttpResponse, TransportError};

/// Forced message for 409 responses
pub const DUPLICATE_MESSAGE: &str = "Duplicate value";

/// Normalize a non-2xx response
pub fn normalize_response(response: &HttpResponse) -> ApiError {
    let data: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    normalize(response.status, &data)
}

/// Normalize a failure where no response was received
pub fn normalize_transport(err: &TransportError) -> ApiError {
    ApiError::transport(err)
}

/// Normalize a status plus decoded body
pub fn normalize(status: u16, data: &Value) -> ApiError {
    let generic = if status == 0 {
        None
    } else {
        Some(format!("Request failed with status code {status}"))
    };
    let message = server_message(data)
        .or(generic)
        .unwrap_or_else(|| "Request failed".to_string());

    match status {
        422 => {
            let fields = validation_fields(data);
            ApiError::new(message, status).with_fields(fields)
        }
        409 => {
            let mut err = ApiError::new(DUPLICATE_MESSAGE, status);
            if let Some(fields) = guess_duplicate_field(&message) {
                err = err.with_fields(fields);
            }
            err
        }
        _ => ApiError::new(message, status),
    }
}

/// First message in priority order: `detail.message`, `detail`, `error`
fn server_message(data: &Value) -> Option<String> {
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let detail = data.get("detail");
    non_empty(detail.and_then(|d| d.get("message")))
        .or_else(|| non_empty(detail))
        .or_else(|| non_empty(data.get("error")))
}

/// Field map from a 422 body.
///
/// The first `loc` segment names the request part (`body`, `query`) and is
/// dropped; the rest is joined with dots.
pub fn validation_fields(data: &Value) -> FieldErrors {
    let mut out = FieldErrors::new();
    match data.get("detail") {
        Some(Value::Array(items)) => {
            for item in items {
                let loc = item
                    .get("loc")
                    .and_then(Value::as_array)
                    .map(|segments| {
                        segments
                            .iter()
                            .skip(1)
                            .map(|s| match s {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".")
                    })
                    .filter(|loc| !loc.is_empty())
                    .unwrap_or_else(|| "non_field".to_string());
                let msg = ["msg", "message"]
                    .iter()
                    .find_map(|k| item.get(k).and_then(Value::as_str))
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Invalid value");
                out.insert(loc, msg.to_string());
            }
        }
        Some(Value::Object(detail)) => {
            if let Some(Value::Object(fields)) = detail.get("fields") {
                for (name, msg) in fields {
                    let msg = match msg {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out.insert(name.clone(), msg);
                }
            }
        }
        _ => {}
    }
    out
}

/// Best guess at which unique field a 409 collided on.
///
/// Substring matching on free text; approximate by nature. A later `driver`
/// or `name` match overrides a registration match.
pub fn guess_duplicate_field(message: &str) -> Option<FieldErrors> {
    let text = message.to_lowercase();
    let mut guess = None;
    if text.contains("reg") || text.contains("vehicle") {
        guess = Some(("reg_no", "Registration already exists"));
    }
    if text.contains("driver") || text.contains("name") {
        guess = Some(("name", "Driver with this name already exists"));
    }
    guess.map(|(field, msg)| {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), msg.to_string());
        fields
    })
}
