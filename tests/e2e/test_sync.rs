use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

const DIARY: &str = "친구와 약속이 취소돼서 하루 종일 외롭고 서운했다.";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_classification_synchronously(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/classifysuggest", &json!({ "text": DIARY }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["ok"], json!(true));
    for category in ["situation", "feeling", "thought", "behavior"] {
        assert!(!body["result"][category]["sentences"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_seven_sentences_when_one_audio_fails(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/practice", &json!({ "text": format!("[mute] {}", DIARY) }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["ok"], json!(true));

    let sentences = body["sentences"].as_array().unwrap();
    assert_eq!(sentences.len(), 7);
    assert_eq!(sentences.iter().filter(|s| !s["audio"].is_null()).count(), 6);
    assert!(sentences[3]["audio"].is_null());
    assert!(sentences[3]["text"].as_str().unwrap().contains("[mute]"));
    assert_eq!(sentences[0]["audio"]["mimeType"], "audio/mpeg");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_audio_when_not_requested(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/practice", &json!({ "text": DIARY, "withAudio": false }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let sentences = response.body.as_ref().unwrap()["sentences"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(sentences.len(), 7);
    assert!(sentences.iter().all(|s| s["audio"].is_null()));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_collaborator_failure_to_bad_gateway(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/classifysuggest", &json!({ "text": format!("[fail] {}", DIARY) }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    response
        .assert_error_code("collaborator_error")
        .assert_error_message("model overloaded");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_time_out_waiting_for_stuck_job(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/practice", &json!({ "text": format!("[hang] {}", DIARY) }))
        .await
        .unwrap();

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    response.assert_error_code("timeout");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_sync_requests(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/practice", &json!({ "text": "  " }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_code("invalid_input");

    let response = ctx
        .client
        .post("/classifysuggest", &json!({ "text": "가".repeat(5001) }))
        .await
        .unwrap();
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}
