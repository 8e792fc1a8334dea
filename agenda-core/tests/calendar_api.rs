use std::time::Duration;

use agenda_core::session::{MemoryStorage, SessionStore, User};
use agenda_core::source::{HttpEventSource, HttpJustificanteSource};
use agenda_core::{AgendaError, ApiClient, CalendarAggregator, ItemId, ItemKind, SourceKind};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type HttpAggregator =
    CalendarAggregator<HttpEventSource, HttpJustificanteSource, MemoryStorage>;

fn aggregator(server: &MockServer, session: SessionStore<MemoryStorage>) -> HttpAggregator {
    let api = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    CalendarAggregator::new(
        HttpEventSource::new(api.clone()),
        HttpJustificanteSource::new(api),
        session,
    )
}

fn session(roles: serde_json::Value) -> SessionStore<MemoryStorage> {
    let store = SessionStore::new(MemoryStorage::new());
    let user: User = serde_json::from_value(json!({ "id": 7, "roles": roles })).unwrap();
    store.login("tok", Some(&user)).unwrap();
    store
}

async fn mount_events(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Reunión",
            "start_date": "2024-03-01T09:00:00",
            "end_date": "2024-03-01T10:00:00",
            "description": null
        }])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn employee_sees_events_then_justificantes() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7,
            "dia_justificar": "2024-03-02",
            "estatus": "aprobado"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let items = aggregator(&server, session(json!(["empleado"]))).load().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId::Number(1));
    assert_eq!(items[0].kind, ItemKind::Event);

    let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    assert_eq!(items[1].id, ItemId::Text("justificante_7".to_string()));
    assert_eq!(items[1].start, day.and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(items[1].end, day.and_hms_opt(23, 59, 59).unwrap());
    assert_eq!(items[1].status().map(|s| s.as_str()), Some("aprobado"));
    assert_eq!(items[1].description.as_deref(), Some("Estatus: aprobado"));
}

#[tokio::test]
async fn non_employee_never_requests_justificantes() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7,
            "dia_justificar": "2024-03-02",
            "estatus": "aprobado"
        }])))
        .expect(0)
        .mount(&server)
        .await;

    let items = aggregator(&server, session(json!(["admin"]))).load().await;

    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|i| !i.is_justificante()));
}

#[tokio::test]
async fn expired_token_falls_back_to_events() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&server)
        .await;

    let report = aggregator(&server, session(json!(["empleado"])))
        .load_report()
        .await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].id, ItemId::Number(1));
    assert!(report.session_expired());
}

#[tokio::test]
async fn broken_events_endpoint_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let report = aggregator(&server, SessionStore::new(MemoryStorage::new()))
        .load_report()
        .await;

    assert!(report.items.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].source, SourceKind::Events);
    assert!(matches!(report.diagnostics[0].error, AgendaError::Decode(_)));
}

#[tokio::test]
async fn malformed_justificante_does_not_sink_the_batch() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "dia_justificar": "2024-03-02", "estatus": null },
            { "id": 8, "dia_justificar": null, "estatus": "aprobado" },
            { "id": { "nested": true }, "dia_justificar": "2024-03-04" }
        ])))
        .mount(&server)
        .await;

    let report = aggregator(&server, session(json!(["empleado"])))
        .load_report()
        .await;

    let ids: Vec<String> = report.items.iter().map(|i| i.id.to_string()).collect();
    assert_eq!(ids, vec!["1", "justificante_7"]);
    assert!(report.is_complete());
}

#[tokio::test]
async fn server_error_on_justificantes_keeps_events() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = aggregator(&server, session(json!(["empleado"])))
        .load_report()
        .await;

    assert_eq!(report.items.len(), 1);
    assert!(!report.session_expired());
    assert!(matches!(
        report.diagnostics[0].error,
        AgendaError::HttpStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn unreachable_api_yields_empty_calendar() {
    // Port 9 (discard) is closed on test machines
    let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
    let aggregator = CalendarAggregator::new(
        HttpEventSource::new(api.clone()),
        HttpJustificanteSource::new(api),
        session(json!(["empleado"])),
    );

    let report = aggregator.load_report().await;

    assert!(report.items.is_empty());
    assert!(
        report
            .diagnostics
            .iter()
            .all(|d| matches!(d.error, AgendaError::Network(_)))
    );
}

#[tokio::test]
async fn submitting_a_justificante_posts_multipart_and_reloads() {
    let server = MockServer::start().await;
    mount_events(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/justificantes"))
        .and(header("authorization", "Bearer tok"))
        .and(body_string_contains("name=\"dia_justificar\""))
        .and(body_string_contains("2024-03-02"))
        .and(body_string_contains("pendiente"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/empleados/7/justificantes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "dia_justificar": "2024-03-02",
            "estatus": "pendiente",
            "documento": "justificantes/9.pdf"
        }])))
        .mount(&server)
        .await;

    let items = aggregator(&server, session(json!(["empleado"])))
        .submit_justificante(NaiveDate::from_ymd_opt(2024, 3, 2), None)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1].description.as_deref(),
        Some("Estatus: pendiente - Con documento")
    );
}
