use serde_json::json;
use uuid::Uuid;

use crate::helpers::{
    matching_embedding, partially_matching_embedding, spawn_app, unrelated_embedding, STUB_ANSWER,
    STUB_SUGGESTIONS,
};

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn a_hebrew_question_without_a_session_gets_an_answer_with_sources() {
    // Arranges
    let app = spawn_app().await;
    app.seed_content_item(
        "Tokyo Tower",
        "מגדל טוקיו",
        "attractions",
        &matching_embedding(),
    )
    .await;

    // Acts
    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "מה כדאי לראות בטוקיו?" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts the API response
    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert_eq!(body["answer"], STUB_ANSWER);
    assert_eq!(body["sources"].as_array().unwrap().len(), 1);
    assert_eq!(body["sources"][0]["title_hebrew"], "מגדל טוקיו");
    assert!(body["sources"][0]["similarity"].as_f64().unwrap() > 0.99);
    assert_eq!(
        body["suggested_questions"],
        json!(STUB_SUGGESTIONS.to_vec())
    );

    // Asserts the conversation has been persisted: one user and one assistant turn
    let session_id = Uuid::parse_str(body["session_id"].as_str().unwrap())
        .expect("The response carries no valid session id");
    assert_eq!(app.stored_turn_count(session_id).await, 2);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn the_returned_session_id_is_reused_by_the_next_request() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let first: serde_json::Value = client
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "מה כדאי לאכול בטוקיו?" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse the body");
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let second: serde_json::Value = client
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "ומה לגבי מלונות?", "session_id": session_id }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse the body");

    assert_eq!(second["session_id"].as_str().unwrap(), session_id);

    // Both exchanges accumulate on the same row
    let session_id = Uuid::parse_str(&session_id).unwrap();
    assert_eq!(app.stored_turn_count(session_id).await, 4);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn a_blank_question_is_rejected_with_a_400() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    assert!(body["error"].as_str().is_some());

    // No session row for a rejected question
    let session_count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM chat_sessions"#)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count sessions");
    assert_eq!(session_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn only_content_above_the_similarity_threshold_is_cited() {
    let app = spawn_app().await;
    app.seed_content_item(
        "Tokyo Tower",
        "מגדל טוקיו",
        "attractions",
        &matching_embedding(),
    )
    .await;
    app.seed_content_item(
        "Narita Express",
        "רכבת נאריטה אקספרס",
        "transportation",
        &unrelated_embedding(),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "איך מגיעים למגדל טוקיו?" }))
        .send()
        .await
        .expect("Failed to execute request");

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    let sources = body["sources"].as_array().unwrap();

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["title"], "Tokyo Tower");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Postgres with pgvector (see scripts/init_db.sh)"]
async fn sources_are_cited_most_similar_first() {
    let app = spawn_app().await;
    // Seeds the weaker match first: the citation order below can only come
    // from the similarity ranking, not from insertion order.
    app.seed_content_item(
        "Senso-ji Temple",
        "מקדש סנסוג'י",
        "attractions",
        &partially_matching_embedding(),
    )
    .await;
    app.seed_content_item(
        "Tokyo Tower",
        "מגדל טוקיו",
        "attractions",
        &matching_embedding(),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", &app.address))
        .json(&json!({ "question": "מה כדאי לראות בטוקיו?" }))
        .send()
        .await
        .expect("Failed to execute request");

    let body: serde_json::Value = response.json().await.expect("Failed to parse the body");
    let sources = body["sources"].as_array().unwrap();

    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["title"], "Tokyo Tower");
    assert_eq!(sources[1]["title"], "Senso-ji Temple");
    assert!(
        sources[0]["similarity"].as_f64().unwrap() > sources[1]["similarity"].as_f64().unwrap()
    );
}
