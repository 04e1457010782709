//! Waste transfer note link detection

use serde_json::Value;
use url::Url;
use wm_types::WtnReady;

/// Only responses from this endpoint carry a freshly generated note
pub const WTN_SOURCE_PATH: &str = "/driver/collect-full";

/// `wtn_pdf_url` when present, else the first top-level string that looks
/// like a WTN PDF path
pub fn find_wtn_url(payload: &Value) -> Option<String> {
    let obj = payload.as_object()?;
    if let Some(url) = obj
        .get("wtn_pdf_url")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return Some(url.to_string());
    }
    obj.values()
        .filter_map(Value::as_str)
        .find(|s| s.contains("/wtn/") && s.ends_with(".pdf"))
        .map(str::to_string)
}

/// Resolve `path` against the origin of `request_url`.
///
/// Falls back to `path` unchanged when either side does not parse.
pub fn absolute_url(path: &str, request_url: &str) -> String {
    let joined = Url::parse(request_url).ok().and_then(|base| {
        let origin = Url::parse(&base.origin().ascii_serialization()).ok()?;
        origin.join(path).ok()
    });
    match joined {
        Some(url) => url.to_string(),
        None => path.to_string(),
    }
}

/// Inspect a response body from `request_url` for a generated note.
///
/// Only `wtn_pdf_url` counts here; other PDF-looking strings are left to
/// [`find_wtn_url`] for display.
pub fn detect_wtn(request_url: &str, payload: &Value) -> Option<WtnReady> {
    if !request_url.contains(WTN_SOURCE_PATH) {
        return None;
    }
    let path = payload
        .get("wtn_pdf_url")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?;
    let id = payload.get("wtn_id").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    Some(WtnReady {
        url: absolute_url(path, request_url),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_prefers_explicit_field() {
        let body = json!({"other": "/wtn/a.pdf", "wtn_pdf_url": "/wtn/b.pdf"});
        assert_eq!(find_wtn_url(&body).as_deref(), Some("/wtn/b.pdf"));
    }

    #[test]
    fn test_find_scans_string_values() {
        let body = json!({"ok": true, "doc": "/wtn/123.pdf", "n": 1});
        assert_eq!(find_wtn_url(&body).as_deref(), Some("/wtn/123.pdf"));
        assert_eq!(find_wtn_url(&json!({"doc": "/wtn/123.html"})), None);
        assert_eq!(find_wtn_url(&json!(["/wtn/1.pdf"])), None);
    }

    #[test]
    fn test_absolute_url_uses_origin() {
        assert_eq!(
            absolute_url("/wtn/9.pdf", "http://api.local:8000/v1/driver/collect-full"),
            "http://api.local:8000/wtn/9.pdf"
        );
        assert_eq!(
            absolute_url("https://cdn.example/wtn/9.pdf", "http://api.local/driver/collect-full"),
            "https://cdn.example/wtn/9.pdf"
        );
        assert_eq!(absolute_url("/wtn/9.pdf", "not a url"), "/wtn/9.pdf");
    }

    #[test]
    fn test_detect_only_for_collect_full() {
        let body = json!({"wtn_pdf_url": "/wtn/7.pdf", "wtn_id": "7"});
        let ready = detect_wtn("http://h/driver/collect-full", &body).unwrap();
        assert_eq!(ready.url, "http://h/wtn/7.pdf");
        assert_eq!(ready.id.as_deref(), Some("7"));
        assert!(detect_wtn("http://h/driver/return-empty", &body).is_none());
        assert!(detect_wtn("http://h/driver/collect-full", &json!({"ok": true})).is_none());
    }
}
