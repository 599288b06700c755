use crate::helpers::spawn_app;

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn health_check_reports_ok_and_the_crate_version() {
    let app = spawn_app().await;

    // Performs HTTP requests against our application
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn the_root_endpoint_describes_the_api() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert_eq!(body["name"], "Tokyo Travel Guide API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
