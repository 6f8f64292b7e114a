//! API integration tests
#![cfg(feature = "server")]

use anyhow::Result;
use axum_test::TestServer;
use landscape::app_context::AppContext;
use landscape::database::{establish_connection, get_database_url, setup_database};
use landscape::server::app::create_app;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// The temp file must outlive the server, the pool reopens it.
async fn setup_test_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let path = temp_file.path().display().to_string();
    let db = establish_connection(&get_database_url(Some(&path))).await?;
    setup_database(&db).await?;

    let app = create_app(AppContext::new(db), None)?;
    let server = TestServer::new(app)?;
    Ok((server, temp_file))
}

fn system_body(code: &str) -> Value {
    json!({
        "name": format!("System {}", code),
        "code": code,
        "description": "Handles invoices",
        "status": "production",
        "owner": {
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "department": "Finance"
        },
        "technical_spec": {
            "technology_stack": ["Rust"]
        }
    })
}

async fn create_system(server: &TestServer, code: &str) -> String {
    let response = server.post("/api/v1/systems").json(&system_body(code)).await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()["id"]
        .as_str()
        .expect("created system has an id")
        .to_string()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_system_crud() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let id = create_system(&server, "FIN-1").await;

    let response = server.get(&format!("/api/v1/systems/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["code"], "FIN-1");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["system_type"], "internal");
    assert_eq!(body["dataflows"], json!([]));

    let mut update = system_body("FIN-1");
    update["name"] = json!("Finance Ledger");
    let response = server
        .put(&format!("/api/v1/systems/{}", id))
        .json(&update)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["name"], "Finance Ledger");

    let response = server.post(&format!("/api/v1/systems/{}/deprecate", id)).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "deprecated");

    let response = server.delete(&format!("/api/v1/systems/{}", id)).await;
    assert_eq!(response.status_code(), 204);

    let response = server.get(&format!("/api/v1/systems/{}", id)).await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_system_validation_errors() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let mut body = system_body("FIN-1");
    body["owner"]["email"] = json!("not-an-email");
    body["status"] = json!("retired");
    let response = server.post("/api/v1/systems").json(&body).await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["fields"]["owner.email"].is_string());
    assert!(body["fields"]["status"].is_string());

    let response = server
        .post("/api/v1/systems")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    assert_eq!(response.status_code(), 400);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_code_conflict() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    create_system(&server, "FIN-1").await;
    let response = server
        .post("/api/v1/systems")
        .json(&system_body("FIN-1"))
        .await;
    assert_eq!(response.status_code(), 409);

    let body: Value = response.json();
    assert_eq!(body["code"], "CONFLICT");
    assert!(body["fields"]["code"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_malformed_id_is_not_found() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let response = server.get("/api/v1/systems/not-a-uuid").await;
    assert_eq!(response.status_code(), 404);

    let response = server.delete("/api/v1/dataflows/123").await;
    assert_eq!(response.status_code(), 404);

    Ok(())
}

#[tokio::test]
async fn test_list_pagination_and_search() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    for i in 0..5 {
        create_system(&server, &format!("PROD-{}", i)).await;
    }

    let response = server
        .get("/api/v1/systems")
        .add_query_param("status", "production")
        .add_query_param("page", 3)
        .add_query_param("page_size", 2)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["systems"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["pagination"]["total_count"], 5);
    assert_eq!(body["pagination"]["total_pages"], 3);

    let response = server
        .get("/api/v1/systems")
        .add_query_param("page", 0)
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .get("/api/v1/systems")
        .add_query_param("status", "unknown")
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server.get("/api/v1/search").add_query_param("q", "prod-4").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["pagination"]["total_count"], 1);
    assert_eq!(body["systems"][0]["code"], "PROD-4");

    Ok(())
}

#[tokio::test]
async fn test_dataflow_endpoints() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let a = create_system(&server, "SYS-A").await;
    let b = create_system(&server, "SYS-B").await;
    let c = create_system(&server, "SYS-C").await;

    let response = server
        .post("/api/v1/dataflows")
        .json(&json!({
            "source_system_id": a,
            "target_system_id": b,
            "data_objects": ["Invoice"],
            "integration_technology": "REST API"
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let flow: Value = response.json();
    assert_eq!(flow["frequency"], "real-time");

    let response = server
        .post("/api/v1/dataflows")
        .json(&json!({
            "source_system_id": a,
            "target_system_id": a,
            "data_objects": ["Invoice"],
            "integration_technology": "REST API"
        }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/api/v1/dataflows")
        .json(&json!({
            "source_system_id": a,
            "target_system_id": "6f1c2b0e-0000-4000-8000-000000000000",
            "data_objects": ["Invoice"],
            "integration_technology": "REST API"
        }))
        .await;
    assert_eq!(response.status_code(), 409);

    let response = server
        .get("/api/v1/dataflows")
        .add_query_param("system_id", &c)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!([]));

    let response = server
        .get("/api/v1/dataflows")
        .add_query_param("system_id", &b)
        .await;
    assert_eq!(response.json::<Value>().as_array().map(Vec::len), Some(1));

    // endpoints of a flow cannot be deleted
    let response = server.delete(&format!("/api/v1/systems/{}", a)).await;
    assert_eq!(response.status_code(), 409);

    let flow_id = flow["id"].as_str().unwrap_or_default();
    let response = server.delete(&format!("/api/v1/dataflows/{}", flow_id)).await;
    assert_eq!(response.status_code(), 204);
    let response = server.get(&format!("/api/v1/dataflows/{}", flow_id)).await;
    assert_eq!(response.status_code(), 404);

    Ok(())
}

#[tokio::test]
async fn test_statistics_and_diagram() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let a = create_system(&server, "SYS-A").await;
    let b = create_system(&server, "SYS-B").await;
    create_system(&server, "SYS-C").await;
    server
        .post("/api/v1/dataflows")
        .json(&json!({
            "source_system_id": a,
            "target_system_id": b,
            "data_objects": ["Invoice"],
            "integration_technology": "REST API"
        }))
        .await;

    let response = server.get("/api/v1/statistics").await;
    assert_eq!(response.status_code(), 200);
    let stats: Value = response.json();
    assert_eq!(stats["total_systems"], 3);
    assert_eq!(stats["production_systems"], 3);
    assert_eq!(stats["top_technologies"][0]["technology"], "Rust");

    let response = server.get("/api/v1/diagram/dataflow").await;
    assert_eq!(response.status_code(), 200);
    let diagram: Value = response.json();
    assert_eq!(diagram["metadata"]["connected_systems"], 2);
    assert_eq!(diagram["metadata"]["isolated_systems"], 1);
    assert_eq!(diagram["nodes"][0]["type"], "system");
    assert_eq!(diagram["edges"][0]["source"], json!(a));

    Ok(())
}

#[tokio::test]
async fn test_excel_export() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    create_system(&server, "SYS-A").await;

    let response = server.get("/api/v1/export/excel").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-type"),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str()?;
    assert!(disposition.starts_with("attachment; filename=\"information_systems_export_"));

    let bytes = response.as_bytes();
    assert_eq!(&bytes[..2], b"PK");

    Ok(())
}
