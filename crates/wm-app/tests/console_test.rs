//! Console workflows against a scripted backend

mod common;

use std::sync::Arc;

use common::{console, console_with, seeded_store, toast_messages, ScriptedTransport, BASE};
use serde_json::json;
use wm_app::{DemoInputs, NO_DRIVER_MESSAGE};
use wm_types::{
    BinAssignmentForm, Error, HttpMethod, NewContractor, NewVehicle, OwnedSkipIn, ResolveError,
    SkipCreateIn,
};

const META: &str = r#"{"skip":{"colors":{"green":{"label":"Recycling"},"black":{"label":"General"}},
    "sizes":{"sizes_m3":[6,8,12]}}}"#;

#[test]
fn test_duplicate_vehicle_selects_existing() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            HttpMethod::Post,
            "/admin/vehicles",
            409,
            r#"{"detail":"registration TEST-001 already exists"}"#,
        )
        .on(
            HttpMethod::Get,
            "/admin/vehicles",
            200,
            r#"[{"id":"v-0","reg_no":"AB-123"},{"id":"v-1","reg_no":"test-001","make":"Volvo"}]"#,
        );
    let mut console = console(transport.clone());

    let vehicle = console
        .create_vehicle(NewVehicle::registered("TEST-001"))
        .unwrap();
    assert_eq!(vehicle.id, "v-1");
    assert_eq!(console.selected_vehicle().map(|v| v.id.as_str()), Some("v-1"));
    assert_eq!(console.vehicles().len(), 2);
    assert!(toast_messages(&console).contains(&"Vehicle already exists".to_string()));

    let entry = console.results().latest().unwrap();
    assert_eq!(entry.title, "Create vehicle (ERR)");
    assert_eq!(entry.payload["code"], 409);
    assert_eq!(entry.payload["error"], "Duplicate value");
    assert!(entry.payload["fields"].get("reg_no").is_some());

    assert_eq!(
        transport.calls(),
        vec!["POST /admin/vehicles", "GET /admin/vehicles"]
    );
}

#[test]
fn test_new_vehicle_refetches_and_selects() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Post, "/admin/vehicles", 201, r#"{"id":"v-9","reg_no":"NEW-1"}"#)
        .on(HttpMethod::Get, "/admin/vehicles", 200, r#"[{"id":"v-9","reg_no":"NEW-1"}]"#);
    let mut console = console(transport.clone());

    let vehicle = console.create_vehicle(NewVehicle::registered(" NEW-1 ")).unwrap();
    assert_eq!(vehicle.id, "v-9");
    assert_eq!(console.selected_vehicle().map(|v| v.id.as_str()), Some("v-9"));
    assert!(toast_messages(&console).contains(&"Create vehicle ✓".to_string()));

    let sent = &transport.requests()[0];
    assert_eq!(sent.header_value("X-API-Key"), Some("adm-key"));
    assert_eq!(sent.body.as_deref(), Some(r#"{"reg_no":"NEW-1"}"#));
}

#[test]
fn test_duplicate_driver_selects_existing() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Post, "/admin/drivers", 409, r#"{"detail":"driver name taken"}"#)
        .on(
            HttpMethod::Get,
            "/admin/drivers",
            200,
            r#"[{"id":"d-1","full_name":"Alex Smith","name":"alex"}]"#,
        );
    let mut console = console(transport);
    let driver = console
        .create_driver(wm_types::NewDriver::named("Alex"))
        .unwrap();
    assert_eq!(driver.id, "d-1");
    assert!(toast_messages(&console).contains(&"Driver already exists".to_string()));
}

#[test]
fn test_create_skip_builds_label_links() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Get, "/meta/config", 200, META)
        .on(
            HttpMethod::Post,
            "/skips/_seed",
            201,
            r#"{"id":"sk-42","qr_code":"QR-NEW-001"}"#,
        );
    let mut console = console(transport.clone());

    let created = console
        .create_skip(SkipCreateIn {
            qr: "QR-NEW-001".to_string(),
            color: "green".to_string(),
            size: "8".to_string(),
            notes: None,
        })
        .unwrap();

    assert_eq!(created.id, "sk-42");
    assert_eq!(created.qr_code, "QR-NEW-001");
    assert_eq!(created.labels.pdf, format!("{BASE}/skips/sk-42/labels.pdf"));
    assert_eq!(
        created.labels.pngs,
        (1..=3)
            .map(|i| format!("{BASE}/skips/sk-42/labels/{i}.png"))
            .collect::<Vec<_>>()
    );

    let seed = transport
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("/skips/_seed"))
        .unwrap();
    assert_eq!(seed.header_value("X-API-Key"), Some("adm-key"));
    let body: serde_json::Value = serde_json::from_str(seed.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"qr": "QR-NEW-001", "color": "green", "size": "8"}));
}

#[test]
fn test_owned_skip_uses_server_labels() {
    let transport = ScriptedTransport::new();
    transport.on(
        HttpMethod::Post,
        "/skips",
        201,
        r#"{"id":"sk-9","qr_code":"SK-1A2B3C4D","owner_org_id":"org-1",
            "labels_pdf_url":"/skips/sk-9/labels.pdf",
            "label_png_urls":["/skips/sk-9/labels/1.png","/skips/sk-9/labels/2.png","/skips/sk-9/labels/3.png"]}"#,
    );
    let mut console = console(transport.clone());

    let created = console
        .create_owned_skip(OwnedSkipIn {
            owner_org_id: " org-1 ".to_string(),
            zone_id: Some("z-1".to_string()),
            assigned_commodity_id: Some(" ".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(created.id, "sk-9");
    assert_eq!(created.qr_code, "SK-1A2B3C4D");
    assert_eq!(created.owner_org_id.as_deref(), Some("org-1"));
    assert_eq!(created.labels.pdf, format!("{BASE}/skips/sk-9/labels.pdf"));
    assert_eq!(created.labels.pngs.len(), 3);
    assert_eq!(created.labels.pngs[2], format!("{BASE}/skips/sk-9/labels/3.png"));

    assert_eq!(transport.calls(), vec!["POST /skips"]);
    let request = &transport.requests()[0];
    assert_eq!(request.header_value("X-API-Key"), Some("adm-key"));
    let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"owner_org_id": "org-1", "qr_code": null, "assigned_commodity_id": null, "zone_id": "z-1"})
    );
}

#[test]
fn test_owned_skip_requires_owner() {
    let transport = ScriptedTransport::new();
    let mut console = console(transport.clone());
    let err = console.create_owned_skip(OwnedSkipIn::default()).unwrap_err();
    assert!(err.fields().unwrap().contains_key("owner_org_id"));
    assert!(transport.calls().is_empty());
}

#[test]
fn test_owned_skip_conflict_is_logged() {
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Post, "/skips", 409, r#"{"detail":"qr_code already exists"}"#);
    let mut console = console(transport);
    let err = console
        .create_owned_skip(OwnedSkipIn {
            owner_org_id: "org-1".to_string(),
            qr_code: Some("SK-TAKEN".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.code(), 409);
    let newest = console.results().latest().unwrap();
    assert_eq!(newest.title, "Create labels (ERR)");
}

#[test]
fn test_create_skip_falls_back_once() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Get, "/meta/config", 200, META)
        .on(HttpMethod::Post, "/skips/_seed", 405, r#"{"detail":"Method Not Allowed"}"#)
        .on(
            HttpMethod::Post,
            "/driver/dev/ensure-skip",
            200,
            r#"{"skip_id":"sk-7","qr_code":"QR-NEW-002"}"#,
        );
    let mut console = console(transport.clone());

    let created = console
        .create_skip(SkipCreateIn {
            qr: "QR-NEW-002".to_string(),
            color: "black".to_string(),
            size: "12".to_string(),
            notes: Some("gate code 42".to_string()),
        })
        .unwrap();
    assert_eq!(created.id, "sk-7");

    assert_eq!(transport.count("POST /skips/_seed"), 1);
    assert_eq!(transport.count("POST /driver/dev/ensure-skip"), 1);
    let fallback = transport.requests().pop().unwrap();
    assert_eq!(fallback.header_value("X-API-Key"), Some("adm-key"));
}

#[test]
fn test_create_skip_fallback_error_surfaces() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Get, "/meta/config", 200, META)
        .on(HttpMethod::Post, "/skips/_seed", 404, r#"{"detail":"Not Found"}"#)
        .on(
            HttpMethod::Post,
            "/driver/dev/ensure-skip",
            500,
            r#"{"error":"database down"}"#,
        );
    let mut console = console(transport.clone());
    let err = console
        .create_skip(SkipCreateIn {
            qr: "Q1".to_string(),
            color: "green".to_string(),
            size: "6".to_string(),
            notes: None,
        })
        .unwrap_err();
    assert_eq!(err.code(), 500);
    assert_eq!(err.to_string(), "database down");
    assert_eq!(console.results().latest().unwrap().title, "Create skip (ERR)");
}

#[test]
fn test_invalid_skip_form_sends_nothing() {
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Get, "/meta/config", 200, META);
    let mut console = console(transport.clone());

    let err = console
        .create_skip(SkipCreateIn {
            qr: "  ".to_string(),
            color: "purple".to_string(),
            size: "8".to_string(),
            notes: None,
        })
        .unwrap_err();
    let fields = err.fields().unwrap();
    assert!(fields.contains_key("qr"));
    assert!(fields.contains_key("color"));
    assert!(!fields.contains_key("size"));
    assert_eq!(transport.count("POST"), 0);
}

#[test]
fn test_meta_falls_back_to_defaults() {
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Get, "/meta/config", 500, "{}");
    let mut console = console(transport.clone());
    let meta = console.meta().clone();
    assert!(meta.has_color("green"));
    assert!(meta.has_size("12"));
    console.meta();
    assert_eq!(transport.count("GET /meta/config"), 1);
}

#[test]
fn test_uuid_driver_ref_skips_lookup() {
    let id = "3f2b8c9e-1a4d-4c7e-9b0a-123456789abc";
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Get, "/driver/schedule", 200, r#"[{"id":"t1"}]"#);
    let mut console = console_with(seeded_store(Some(id)), transport.clone());

    let tasks = console.my_tasks().unwrap();
    assert_eq!(tasks, json!([{"id": "t1"}]));
    assert_eq!(
        transport.calls(),
        vec![format!("GET /driver/schedule?driver_id={id}")]
    );
    assert_eq!(
        transport.requests()[0].header_value("X-API-Key"),
        Some("drv-key")
    );
}

#[test]
fn test_driver_name_is_resolved_then_scheduled() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            HttpMethod::Get,
            "/admin/drivers",
            200,
            r#"[{"id":"d-1","full_name":"Alex Smith"},{"id":"d-2","name":"Sam"}]"#,
        )
        .once(HttpMethod::Get, "/driver/schedule", 422, r#"{"detail":[{"loc":["query","driver_id"],"msg":"unknown parameter"}]}"#)
        .on(HttpMethod::Get, "/driver/schedule", 200, r#"{"driver":{"id":"d-2"},"items":[]}"#);
    let mut console = console_with(seeded_store(Some("sam")), transport.clone());

    console.my_tasks().unwrap();
    assert_eq!(
        transport.calls(),
        vec![
            "GET /admin/drivers",
            "GET /driver/schedule?driver_id=d-2",
            "GET /driver/schedule?driver=d-2",
        ]
    );
    assert_eq!(console.drivers().len(), 2);
}

#[test]
fn test_task_done_refetches_schedule() {
    let id = "3f2b8c9e-1a4d-4c7e-9b0a-123456789abc";
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Patch, "/driver/schedule/t1/done", 200, r#"{"ok":true}"#)
        .on(HttpMethod::Get, "/driver/schedule", 200, r#"[{"id":"t1","status":"DONE"}]"#);
    let mut console = console_with(seeded_store(Some(id)), transport.clone());

    let schedule = console.mark_task_done("t1").unwrap();
    assert_eq!(schedule, json!([{"id": "t1", "status": "DONE"}]));
    assert_eq!(
        transport.calls(),
        vec![
            "PATCH /driver/schedule/t1/done".to_string(),
            format!("GET /driver/schedule?driver_id={id}"),
        ]
    );
}

#[test]
fn test_task_done_needs_driver() {
    let transport = ScriptedTransport::new();
    let mut console = console(transport.clone());
    let err = console.mark_task_done("t1").unwrap_err();
    assert_eq!(err.to_string(), NO_DRIVER_MESSAGE);
    assert!(transport.calls().is_empty());
}

#[test]
fn test_unknown_driver_names_input() {
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Get, "/admin/drivers", 200, r#"[{"id":"d-1","name":"Alex"}]"#);
    let mut console = console_with(seeded_store(Some("Nobody Here")), transport.clone());

    let err = console.my_tasks().unwrap_err();
    assert!(matches!(
        &err,
        Error::Resolve(ResolveError::NotFound { input, .. }) if input == "Nobody Here"
    ));
    assert!(err.to_string().contains("Nobody Here"));
    assert_eq!(transport.count("GET /admin/drivers"), 1);
    assert_eq!(transport.count("GET /driver/schedule"), 0);
}

#[test]
fn test_missing_driver_ref() {
    let transport = ScriptedTransport::new();
    let mut console = console(transport.clone());
    let err = console.my_tasks().unwrap_err();
    assert_eq!(err.to_string(), NO_DRIVER_MESSAGE);
    assert!(transport.calls().is_empty());
}

#[test]
fn test_preload_isolates_failures() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Get, "/admin/drivers", 500, r#"{"detail":"boom"}"#)
        .on(HttpMethod::Get, "/admin/vehicles", 200, r#"[{"id":"v-1","reg_no":"R1"}]"#);
    let mut console = console(transport);

    let summary = console.preload_admin_lists();
    assert_eq!(summary.drivers, 0);
    assert_eq!(summary.vehicles, 1);
    assert_eq!(summary.errors, vec!["drivers: boom".to_string()]);
    let toasts = console.toaster().snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title.as_deref(), Some("Load drivers"));
}

#[test]
fn test_contractor_preload_fails_quietly() {
    let transport = ScriptedTransport::new();
    transport.on(HttpMethod::Get, "/admin/contractors", 403, r#"{"detail":"Forbidden"}"#);
    let mut console = console(transport);
    assert!(console.load_contractors().is_empty());
    assert!(console.toaster().snapshot().is_empty());
}

#[test]
fn test_assign_bin_resolves_contractor() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            HttpMethod::Get,
            "/admin/contractors",
            200,
            r#"[{"id":"c-1","org_name":"Acme Waste Ltd"}]"#,
        )
        .on(
            HttpMethod::Post,
            "/admin/bin-assignments/assign",
            200,
            r#"{"skip_id":"sk-1","contractor_id":"c-1","assignment_id":7}"#,
        );
    let mut console = console(transport.clone());

    let receipt = console
        .assign_bin(BinAssignmentForm {
            skip_qr: "QR1".to_string(),
            contractor: "acme".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(receipt.assignment_id, "7");
    assert!(transport
        .calls()
        .contains(&"POST /admin/bin-assignments/assign?skip_qr=QR1&contractor_id=c-1".to_string()));
    let assign = transport
        .requests()
        .into_iter()
        .find(|r| r.url.contains("/assign?"))
        .unwrap();
    assert_eq!(assign.body.as_deref(), Some("{}"));
}

#[test]
fn test_assignment_requires_contractor() {
    let transport = ScriptedTransport::new();
    let mut console = console(transport.clone());
    let err = console
        .assign_bin(BinAssignmentForm {
            skip_qr: "QR1".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.fields().unwrap().contains_key("contractor_id"));
    assert!(transport.calls().is_empty());
}

#[test]
fn test_contractor_validation() {
    let transport = ScriptedTransport::new();
    let mut console = console(transport.clone());
    let err = console
        .create_contractor(NewContractor {
            org_name: "Acme".to_string(),
            email: Some("acme.example".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(
        err.fields().unwrap().get("email").map(String::as_str),
        Some("Invalid email")
    );
    assert!(transport.calls().is_empty());
}

#[test]
fn test_lifecycle_demo_stops_at_first_error() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Post, "/driver/dev/ensure-skip", 200, r#"{"ok":true}"#)
        .on(HttpMethod::Get, "/driver/scan", 200, r#"{"qr":"QR123"}"#)
        .on(HttpMethod::Post, "/driver/deliver-empty", 500, r#"{"detail":"zone closed"}"#);
    let mut console = console(transport.clone());

    let err = console.run_lifecycle_demo(&DemoInputs::default()).unwrap_err();
    assert_eq!(err.to_string(), "zone closed");
    let titles: Vec<String> = console.results().entries().map(|e| e.title.clone()).collect();
    assert_eq!(
        titles,
        vec!["driver/deliver-empty (ERR)", "driver/scan", "DEV ensure-skip"]
    );
    assert_eq!(transport.count("POST /driver/relocate-empty"), 0);
}

#[test]
fn test_lifecycle_demo_announces_wtn() {
    let transport = ScriptedTransport::new();
    transport
        .once(HttpMethod::Post, "/driver/dev/ensure-skip", 422, r#"{"detail":[]}"#)
        .on(HttpMethod::Get, "/driver/dev/ensure-skip", 200, r#"{"ok":true}"#)
        .once(HttpMethod::Get, "/driver/scan", 400, r#"{"detail":"use q"}"#)
        .on(HttpMethod::Get, "/driver/scan", 200, r#"{"qr":"QR123"}"#)
        .on(HttpMethod::Post, "/driver/deliver-empty", 200, "{}")
        .on(HttpMethod::Post, "/driver/relocate-empty", 200, "{}")
        .on(
            HttpMethod::Post,
            "/driver/collect-full",
            200,
            r#"{"ok":true,"wtn_id":"w-1","wtn_pdf_url":"/wtn/w-1.pdf"}"#,
        )
        .on(HttpMethod::Post, "/driver/return-empty", 200, "{}");
    let mut console = console(transport.clone());
    console.set_wtn_auto_open(false).unwrap();

    let steps = console.run_lifecycle_demo(&DemoInputs::default()).unwrap();
    assert_eq!(steps.len(), 6);
    assert!(transport.calls().contains(&"GET /driver/dev/ensure-skip?qr=QR123".to_string()));
    assert!(transport.calls().contains(&"GET /driver/scan?q=QR123".to_string()));

    let ready = console.wtn().last().unwrap();
    assert_eq!(ready.url, format!("{BASE}/wtn/w-1.pdf"));
    assert!(console
        .toaster()
        .snapshot()
        .iter()
        .any(|t| t.title.as_deref() == Some("WTN ready")));

    let collect = transport
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("/driver/collect-full"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(collect.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["destination_name"], "ECO MRF");
    assert_eq!(body["gross_kg"], 2500.0);
    assert_eq!(body["weight_source"], "WEIGHBRIDGE");
}

#[test]
fn test_optional_debug_endpoints() {
    let transport = ScriptedTransport::new();
    transport
        .on(HttpMethod::Get, "/__debug/routes", 200, r#"["/a","/b"]"#)
        .on(HttpMethod::Get, "/__debug/wtns", 403, r#"{"detail":"Admin key required"}"#);
    let console = console(transport.clone());
    let client = console.client();

    assert!(client.routes().unwrap().is_some());
    assert!(client.mounts().unwrap().is_none());
    assert!(client.versions().unwrap().is_none());
    let err = client.latest_wtns(5).unwrap_err();
    assert!(matches!(err, Error::Api(ref e) if e.is_auth()));
    assert_eq!(
        transport.requests()[0].header_value("X-API-Key"),
        Some("adm-key")
    );
}

#[test]
fn test_transport_failure_has_code_zero() {
    struct Down;
    impl wm_domain::repository::HttpTransport for Down {
        fn send(
            &self,
            _: &wm_types::HttpRequest,
        ) -> Result<wm_types::HttpResponse, wm_types::TransportError> {
            Err(wm_types::TransportError::Connection("connection refused".to_string()))
        }
    }
    let mut console = wm_app::Console::with_config_store(
        wm_app::ConfigStore::with_default_base(seeded_store(None), None),
        Arc::new(Down),
        wm_domain::service::Toaster::manual(),
    );
    let err = console.run("ping", |c| c.health()).unwrap_err();
    assert_eq!(err.code(), 0);
    assert_eq!(err.to_string(), "Network error: connection refused");
    assert_eq!(console.results().latest().unwrap().title, "ping (ERR)");
}
