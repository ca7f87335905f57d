//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use catat_core::{Interpreter, MockBackend, ModelClient};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn app_with_mock(mock: MockBackend) -> Router {
    let interpreter = Interpreter::embedded_only(ModelClient::Mock(mock));
    create_router(Some(interpreter), ServerConfig::default())
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let app = app_with_mock(MockBackend::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "OK");
}

// ========== Financial text ==========

#[tokio::test]
async fn test_process_expense_keuangan() {
    let mock = MockBackend::with_reply(
        "```json\n{\"category\": \"Food & Beverage\", \"transaction_type\": \"Expense\", \"amount\": \"15rb\", \"date\": \"2020-01-01\", \"description\": \"kopi\"}\n```",
    );
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "beli kopi 15rb"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Food & Beverage");
    assert_eq!(json["transaction_type"], "Expense");
    assert_eq!(json["amount"], 15000.0);
    assert_eq!(json["date"], "2020-01-01");
    assert_eq!(json["description"], "kopi");
}

#[tokio::test]
async fn test_empty_text_rejected_before_model_call() {
    let mock = MockBackend::new();
    let app = app_with_mock(mock.clone());

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "   "}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // The gateway was never invoked
    assert!(mock.seen_prompts().is_empty());
}

#[tokio::test]
async fn test_model_rejection_is_bad_request() {
    let mock = MockBackend::with_reply("Error: the text is not a transaction");
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "the text is not a transaction");
}

#[tokio::test]
async fn test_unparseable_reply_is_server_error() {
    let mock = MockBackend::with_reply("I'm sorry, I can't help with that.");
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "beli kopi"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("extraction"));
}

#[tokio::test]
async fn test_unknown_category_falls_back() {
    let mock = MockBackend::with_reply(
        r#"{"category": "Jajan", "transaction_type": "Expense", "amount": 5000, "description": "snack"}"#,
    );
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "jajan 5000"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Other");
}

#[tokio::test]
async fn test_unconfigured_backend_is_server_error() {
    let app = create_router(None, ServerConfig::default());

    let response = app
        .oneshot(post_json(
            "/process_expense_keuangan",
            serde_json::json!({"text": "beli kopi 15rb"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_unconfigured_backend_health_still_ok() {
    let app = create_router(None, ServerConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ========== Financial receipt image ==========

#[tokio::test]
async fn test_process_image_expense_keuangan() {
    let reply = serde_json::json!({
        "transactions": [
            {"category": "Food & Beverage", "transaction_type": "Expense", "amount": 12000, "description": "nasi goreng"},
            {"category": "Transportation", "transaction_type": "Expense", "amount": 8000, "description": "parkir"}
        ]
    });
    let mock = MockBackend::with_reply(reply.to_string());
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_image_expense_keuangan",
            serde_json::json!({"image": "QUJD", "caption": "makan siang"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["description"], "nasi goreng");
    assert!(json.get("note").is_none());
}

#[tokio::test]
async fn test_image_rejection_is_empty_success_with_note() {
    let mock = MockBackend::with_reply("Error: this image is not a receipt");
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_image_expense_keuangan",
            serde_json::json!({"image": "QUJD", "caption": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["transactions"].as_array().unwrap().len(), 0);
    assert_eq!(json["note"], "this image is not a receipt");
}

#[tokio::test]
async fn test_image_empty_envelope_is_success() {
    let mock = MockBackend::with_reply(r#"{"transactions": []}"#);
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_image_expense_keuangan",
            serde_json::json!({"image": "QUJD"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["transactions"].as_array().unwrap().len(), 0);
}

// ========== Metal ==========

#[tokio::test]
async fn test_process_expense_metal() {
    let mock = MockBackend::with_reply(
        "brand: Antam\nweight_grams: 5\namount: 5000000\nquantity: 1\nsavings_goal: Emergency Fund\ndate: 2020-01-11",
    );
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_expense",
            serde_json::json!({"text": "Antam 5g 5000k 1 Dana Darurat"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["brand"], "Antam");
    assert_eq!(json["weight_grams"], 5.0);
    assert_eq!(json["amount"], 5000000.0);
    assert_eq!(json["quantity"], 1);
    assert_eq!(json["savings_goal"], "Emergency Fund");
    assert_eq!(json["date"], "2020-01-11");
}

#[tokio::test]
async fn test_process_image_expense_metal() {
    let reply = serde_json::json!({
        "transactions": [
            {"brand": "UBS", "weight_grams": 10, "amount": 10000000, "quantity": 1, "savings_goal": "Home"}
        ]
    });
    let mock = MockBackend::with_reply(reply.to_string());
    let app = app_with_mock(mock);

    let response = app
        .oneshot(post_json(
            "/process_image_expense",
            serde_json::json!({"image": "QUJD", "caption": "untuk rumah"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["brand"], "UBS");
}

// ========== Voice ==========

#[tokio::test]
async fn test_process_voice_expense_keuangan() {
    let mock = MockBackend::with_reply("You spent 15000 on coffee today.");
    let app = app_with_mock(mock);

    // "ZmFrZSBtcDM=" is base64 for "fake mp3"
    let response = app
        .oneshot(post_json(
            "/process_voice_expense_keuangan",
            serde_json::json!({"file_base64": "ZmFrZSBtcDM="}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["summary"], "You spent 15000 on coffee today.");
}

#[tokio::test]
async fn test_voice_invalid_base64_is_bad_request() {
    let mock = MockBackend::new();
    let app = app_with_mock(mock.clone());

    let response = app
        .oneshot(post_json(
            "/process_voice_expense_keuangan",
            serde_json::json!({"file_base64": "!!! not base64 !!!"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(mock.seen_prompts().is_empty());
}
