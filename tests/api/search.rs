use serde_json::json;

use crate::helpers::{
    matching_embedding, partially_matching_embedding, spawn_app, unrelated_embedding,
};

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn search_returns_the_items_above_the_threshold_in_descending_similarity() {
    let app = spawn_app().await;
    // The weaker match is seeded first so the result order below can only
    // come from the similarity ranking.
    app.seed_content_item(
        "Afuri Ramen",
        "אפורי ראמן",
        "restaurants",
        &partially_matching_embedding(),
    )
    .await;
    app.seed_content_item(
        "Ichiran Ramen",
        "איצ'ירן ראמן",
        "restaurants",
        &matching_embedding(),
    )
    .await;
    app.seed_content_item(
        "Meiji Shrine",
        "מקדש מייג'י",
        "attractions",
        &unrelated_embedding(),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/search", &app.address))
        .json(&json!({ "query": "איפה לאכול ראמן?" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert_eq!(body["total"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Ichiran Ramen");
    assert_eq!(results[1]["title"], "Afuri Ramen");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn the_category_filter_narrows_the_results() {
    let app = spawn_app().await;
    app.seed_content_item(
        "Ichiran Ramen",
        "איצ'ירן ראמן",
        "restaurants",
        &matching_embedding(),
    )
    .await;
    app.seed_content_item(
        "Park Hyatt Tokyo",
        "פארק האיאט טוקיו",
        "hotels",
        &matching_embedding(),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/search", &app.address))
        .json(&json!({ "query": "המלצות לערב בטוקיו", "category": "hotels" }))
        .send()
        .await
        .expect("Failed to execute request");

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");

    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["title"], "Park Hyatt Tokyo");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn a_blank_query_is_rejected_with_a_400() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/search", &app.address))
        .json(&json!({ "query": "\n  " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert!(body["error"].as_str().is_some());
}
