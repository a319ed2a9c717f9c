//! Router tests for assessment-service.

mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app, spawn_server};
use serde_json::json;

fn java_set() -> serde_json::Value {
    json!({
        "set_name": "Java",
        "questions": [{
            "question_text": "What is the JVM?",
            "answers": [{ "value": "v1", "suggestion": "s1" }]
        }]
    })
}

#[tokio::test]
async fn create_and_list_assessments() {
    let app = spawn_app();

    let created = app
        .request(Method::POST, "/assessments", Some(java_set()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let created = created.json();
    assert_eq!(created["set_name"], "Java");
    assert_eq!(created["questions"][0]["answers"][0]["value"], "v1");

    let list = app.get("/assessments").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_set_name_answers_set_already_exists() {
    let app = spawn_app();
    app.request(Method::POST, "/assessments", Some(java_set()))
        .await;

    let response = app
        .request(Method::POST, "/assessments", Some(java_set()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "set already exists");
}

#[tokio::test]
async fn empty_set_name_is_rejected() {
    let app = spawn_app();
    let response = app
        .request(Method::POST, "/assessments", Some(json!({ "set_name": "" })))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_set_lookups_answer_with_messages() {
    let app = spawn_app();

    let by_name = app.get("/assessments/name/Go/questions").await;
    assert_eq!(by_name.status, StatusCode::OK);
    assert_eq!(by_name.text(), "set name is invalid");

    let by_id = app.get("/assessments/77/questions").await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.text(), "set id is invalid");
}

#[tokio::test]
async fn questions_by_name_route_is_not_shadowed_by_id_route() {
    let app = spawn_app();
    app.request(Method::POST, "/assessments", Some(java_set()))
        .await;

    let response = app.get("/assessments/name/Java/questions").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()[0]["question_text"],
        "What is the JVM?"
    );
}

#[tokio::test]
async fn update_question_error_messages() {
    let app = spawn_app();
    let answers = json!([{ "value": "v", "suggestion": "s" }]);

    let response = app
        .request(Method::PUT, "/assessments/9/questions/1", Some(answers.clone()))
        .await;
    assert_eq!(response.text(), "Set name is invalid");

    let set_id = app
        .request(Method::POST, "/assessments", Some(java_set()))
        .await
        .json()["set_id"]
        .as_i64()
        .unwrap();
    let response = app
        .request(
            Method::PUT,
            &format!("/assessments/{}/questions/999", set_id),
            Some(answers),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Question id is invalid");
}

#[tokio::test]
async fn update_question_rejects_bad_bodies_as_json_errors() {
    let app = spawn_app();
    let set_id = app
        .request(Method::POST, "/assessments", Some(java_set()))
        .await
        .json()["set_id"]
        .as_i64()
        .unwrap();
    let uri = format!("/assessments/{}/questions/1", set_id);

    let malformed = app.request_raw(Method::PUT, &uri, "{not json").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(malformed.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Json parse error"));

    let blank = app
        .request(Method::PUT, &uri, Some(json!([{ "value": "" }])))
        .await;
    assert_eq!(blank.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(blank.json()["error"].is_string());

    assert_eq!(app.store.question_saves(), 0);
}

#[tokio::test]
async fn delete_question_removes_it_everywhere() {
    let app = spawn_app();
    let created = app
        .request(Method::POST, "/assessments", Some(java_set()))
        .await
        .json();
    let set_id = created["set_id"].as_i64().unwrap();
    let question_id = created["questions"][0]["question_id"].as_i64().unwrap();

    let missing = app
        .request(
            Method::DELETE,
            &format!("/assessments/{}/questions/999", set_id),
            None,
        )
        .await;
    assert_eq!(missing.text(), "question is not found");

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/assessments/{}/questions/{}", set_id, question_id),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({ "message": "Question deleted successfully" }));

    let fetched = app.get(&format!("/questions/{}", question_id)).await;
    assert_eq!(fetched.json(), serde_json::Value::Null);

    let remaining = app.get(&format!("/assessments/{}/questions", set_id)).await;
    assert_eq!(remaining.json(), json!([]));
    assert_eq!(app.store.question_deletes(), 1);
}

#[tokio::test]
async fn fetch_unknown_question_is_null() {
    let app = spawn_app();
    let response = app.get("/questions/4242").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "null");
}

#[tokio::test]
async fn updated_answers_replace_old_ones() {
    let app = spawn_app();

    let set_id = app
        .request(
            Method::POST,
            "/assessments",
            Some(json!({ "set_name": "Java", "questions": [] })),
        )
        .await
        .json()["set_id"]
        .as_i64()
        .unwrap();

    let question = app
        .request(
            Method::POST,
            &format!("/assessments/{}/questions", set_id),
            Some(json!({
                "question_text": "What is a class?",
                "answers": [{ "value": "v1", "suggestion": "s1" }]
            })),
        )
        .await;
    assert_eq!(question.status, StatusCode::CREATED);
    let question_id = question.json()["question_id"].as_i64().unwrap();

    let updated = app
        .request(
            Method::PUT,
            &format!("/assessments/{}/questions/{}", set_id, question_id),
            Some(json!([{ "value": "v2", "suggestion": "s2" }])),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.text(), "Question updated successfully");

    let fetched = app.get(&format!("/questions/{}", question_id)).await.json();
    assert_eq!(
        fetched["answers"],
        json!([{ "value": "v2", "suggestion": "s2" }])
    );
    assert_eq!(app.store.question_saves(), 1);
    assert_eq!(app.store.assessment_saves(), 1);
}

#[tokio::test]
async fn health_probes_report_memory_store() {
    let app = spawn_app();
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["store"], "memory");

    assert_eq!(app.get("/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn served_application_answers_over_http() {
    let address = spawn_server().await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("{}/health", address))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let created: serde_json::Value = client
        .post(format!("{}/assessments", address))
        .json(&java_set())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let set_id = created["set_id"].as_i64().unwrap();

    let questions: serde_json::Value = client
        .get(format!("{}/assessments/{}/questions", address, set_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions[0]["question_text"], "What is the JVM?");
}
