use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use test_context::test_context;

const DIARY: &str = "오늘 회의에서 발표를 했는데 질문에 제대로 답하지 못해서 창피했다.";

fn job_id(body: &Option<Value>) -> String {
    body.as_ref()
        .and_then(|b| b.get("jobId"))
        .and_then(|v| v.as_str())
        .expect("Missing jobId")
        .to_string()
}

fn assert_category(result: &Value, name: &str) {
    let sentences = result[name]["sentences"]
        .as_array()
        .unwrap_or_else(|| panic!("category '{}' missing in {}", name, result));
    assert!(
        !sentences.is_empty() && sentences.len() <= 3,
        "category '{}' has {} sentences",
        name,
        sentences.len()
    );
    for sentence in sentences {
        let text = sentence.as_str().unwrap();
        assert!(!text.trim().is_empty());
        assert!(text.chars().count() <= 200);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_run_classify_job_from_running_to_done(ctx: &TestContext) {
    let started = Instant::now();
    let response = ctx
        .client
        .post(
            "/jobs",
            &json!({ "workType": "classify", "payload": { "text": format!("[slow] {}", DIARY) } }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(300));
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["reused"], json!(false));
    let id = job_id(&response.body);

    // Generator takes 300ms, so the first poll sees the job running
    let path = format!("/jobs/{}", id);
    let response = ctx.client.get(&path).await.unwrap();
    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.body.as_ref().unwrap()["status"], "running");

    let response = ctx.wait_for_job(&path).await;
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "done");
    assert!(body.get("error").is_none());

    let result = &body["result"];
    for category in ["situation", "feeling", "thought", "behavior"] {
        assert_category(result, category);
    }
    // Numbering is stripped and long lists are capped
    assert_eq!(result["situation"]["sentences"][0], "회의에서 발표를 했다.");
    assert_eq!(result["thought"]["sentences"].as_array().unwrap().len(), 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text_without_creating_job(ctx: &TestContext) {
    for payload in [json!({ "text": "" }), json!({ "text": "   " }), json!({})] {
        let response = ctx
            .client
            .post("/jobs", &json!({ "workType": "classify", "payload": payload }))
            .await
            .unwrap();

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_error_code("invalid_input");
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ctx.generator.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_text(ctx: &TestContext) {
    let text = "가".repeat(5001);
    let response = ctx
        .client
        .post("/jobs", &json!({ "workType": "classify", "payload": { "text": text } }))
        .await
        .unwrap();

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_error_code("payload_too_large");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_work_type(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/jobs", &json!({ "workType": "summarize", "payload": { "text": DIARY } }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_code("invalid_input");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_json_error_for_malformed_body(ctx: &TestContext) {
    let response = ctx.client.post_raw("/jobs", "{not json").await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_code("invalid_input");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reuse_job_for_duplicate_dedupe_key(ctx: &TestContext) {
    let request = json!({
        "workType": "classify",
        "payload": { "text": format!("[slow] {}", DIARY) },
        "dedupeKey": { "userId": "u1", "diaryId": "d9" }
    });

    let first = ctx.client.post("/jobs", &request).await.unwrap();
    let second = ctx.client.post("/jobs", &request).await.unwrap();

    first.assert_status(StatusCode::OK);
    second.assert_status(StatusCode::OK);
    assert_eq!(job_id(&first.body), job_id(&second.body));
    assert_eq!(first.body.as_ref().unwrap()["reused"], json!(false));
    assert_eq!(second.body.as_ref().unwrap()["reused"], json!(true));

    ctx.wait_for_job(&format!("/jobs/{}", job_id(&first.body)))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.generator.calls(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_reuse_job_when_text_changes(ctx: &TestContext) {
    let key = json!({ "userId": "u1", "diaryId": "d9" });

    let first = ctx
        .client
        .post(
            "/jobs",
            &json!({ "workType": "classify", "payload": { "text": DIARY }, "dedupeKey": key }),
        )
        .await
        .unwrap();
    let second = ctx
        .client
        .post(
            "/jobs",
            &json!({ "workType": "classify", "payload": { "text": "수정한 일기" }, "dedupeKey": key }),
        )
        .await
        .unwrap();

    assert_ne!(job_id(&first.body), job_id(&second.body));
    assert_eq!(second.body.as_ref().unwrap()["reused"], json!(false));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_job(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/jobs/6f1c2a34-5d7e-4b8f-9a0b-1c2d3e4f5a6b")
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_code("job_not_found");

    let response = ctx.client.get("/jobs/not-a-job").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_code("job_not_found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_same_payload_when_polling_finished_job(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/jobs", &json!({ "workType": "classify", "payload": { "text": DIARY } }))
        .await
        .unwrap();
    let path = format!("/jobs/{}", job_id(&response.body));

    let first = ctx.wait_for_job(&path).await;
    for _ in 0..3 {
        let again = ctx.client.get(&path).await.unwrap();
        again.assert_status(StatusCode::OK);
        assert_eq!(again.body, first.body);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_collaborator_failure_as_error_status(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/jobs",
            &json!({ "workType": "classify", "payload": { "text": format!("[fail] {}", DIARY) } }),
        )
        .await
        .unwrap();
    let path = format!("/jobs/{}", job_id(&response.body));

    let response = ctx.wait_for_job(&path).await;
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("server_overloaded"));
    assert!(body.get("result").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_run_practice_job_with_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/jobs",
            &json!({
                "workType": "practice",
                "payload": { "text": DIARY, "context": { "thought": ["나는 준비가 부족하다."] } }
            }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let response = ctx
        .wait_for_job(&format!("/jobs/{}", job_id(&response.body)))
        .await;
    let result = &response.body.as_ref().unwrap()["result"];
    let sentences = result["sentences"].as_array().unwrap();

    assert_eq!(result["ok"], json!(true));
    assert_eq!(sentences.len(), 7);
    assert!(sentences
        .iter()
        .all(|s| s["audio"]["mimeType"] == "audio/mpeg"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_support_legacy_classifyjob_endpoints(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/classifyjob/start", &json!({ "text": DIARY }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let id = job_id(&response.body);

    let response = ctx
        .wait_for_job(&format!("/classifyjob/result?jobId={}", id))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "done");
    assert_category(&body["result"], "feeling");

    let response = ctx.client.get("/classifyjob/result").await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_code("invalid_input");

    let response = ctx
        .client
        .post("/classifyjob/start", &json!({ "text": "" }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}
