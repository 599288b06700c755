use crate::helpers::spawn_app;

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn the_static_suggestion_list_is_served_without_any_provider_call() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/suggestions", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    let suggestions = body["suggestions"].as_array().unwrap();

    assert_eq!(suggestions.len(), 10);
    assert!(suggestions.contains(&serde_json::json!("מה כדאי לאכול בטוקיו?")));
}
