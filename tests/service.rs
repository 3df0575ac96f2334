use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use kana_reader::curriculum::Curriculum;
use kana_reader::persistence::MemoryStore;
use kana_reader::pronunciation::UnsupportedPronouncer;
use kana_reader::routes::build_router;
use kana_reader::routes::ws::reply_for;
use kana_reader::state::AppState;

fn app_state() -> Arc<AppState> {
  Arc::new(AppState::with_parts(
    Arc::new(Curriculum::default()),
    Box::new(MemoryStore::new()),
    Box::new(UnsupportedPronouncer),
  ))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let req = Request::builder().method(method).uri(uri).header("content-type", "application/json");
  let req = match body {
    Some(v) => req.body(Body::from(v.to_string())).unwrap(),
    None => req.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn answer_for(item: &Value) -> String {
  match item["type"].as_str() {
    Some("sentence") => item["originalText"].as_str().unwrap().to_string(),
    _ => item["acceptedAnswers"][0].as_str().unwrap().to_string(),
  }
}

#[tokio::test]
async fn health() {
  let app = build_router(app_state());
  let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn play_one_level_over_http() {
  let app = build_router(app_state());
  let (_, progress) = call(&app, Method::GET, "/api/v1/progress", None).await;
  let total = progress["currentLevelProgress"]["total"].as_u64().unwrap();
  assert_eq!(progress["currentLevelProgress"]["levelName"], "ア");
  assert_eq!(progress["levelSetProgress"]["setName"], "Katakana");

  for _ in 0..total {
    let (status, item) = call(&app, Method::GET, "/api/v1/content", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(item["id"].as_str().unwrap().starts_with("katakana-"));
    let (_, result) = call(&app, Method::POST, "/api/v1/answer", Some(json!({ "answer": answer_for(&item) }))).await;
    assert_eq!(result["isCorrect"], true);
    call(&app, Method::POST, "/api/v1/advance", None).await;
  }

  let (_, progress) = call(&app, Method::GET, "/api/v1/progress", None).await;
  assert_eq!(progress["levelSetProgress"]["completed"], 1);
  assert_eq!(progress["overallProgress"]["completed"], 1);
  assert_eq!(progress["currentLevelProgress"]["levelName"], "イ");
}

#[tokio::test]
async fn answer_without_content_is_incorrect() {
  let app = build_router(app_state());
  let (status, result) = call(&app, Method::POST, "/api/v1/answer", Some(json!({ "answer": "a" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(result["isCorrect"], false);
}

#[tokio::test]
async fn jump_reset_and_level_sets() {
  let app = build_router(app_state());
  let (status, progress) = call(&app, Method::POST, "/api/v1/jump", Some(json!({ "levelSetId": "hiragana", "characterIndex": 2 }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(progress["levelSetProgress"]["setName"], "Hiragana");
  assert_eq!(progress["currentLevelProgress"]["levelName"], "う");

  let (_, sets) = call(&app, Method::GET, "/api/v1/level_sets", None).await;
  assert_eq!(sets[0]["id"], "katakana");
  assert_eq!(sets[0]["complete"], true);
  assert_eq!(sets[1]["complete"], false);
  assert_eq!(sets[1]["characterCount"], 15);

  let (status, body) = call(&app, Method::POST, "/api/v1/jump", Some(json!({ "levelSetId": "nope", "characterIndex": 0 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].as_str().unwrap().contains("nope"));

  let (status, body) = call(&app, Method::POST, "/api/v1/jump", Some(json!({ "levelSetId": "hiragana", "characterIndex": 15 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].as_str().unwrap().contains("15"));
  let (_, progress) = call(&app, Method::GET, "/api/v1/progress", None).await;
  assert_eq!(progress["currentLevelProgress"]["levelName"], "う", "a rejected jump leaves the level alone");

  let (_, progress) = call(&app, Method::POST, "/api/v1/reset", None).await;
  assert_eq!(progress["levelSetProgress"]["setName"], "Katakana");
  assert_eq!(progress["overallProgress"]["completed"], 0);
}

#[tokio::test]
async fn parse_uses_unlocked_characters() {
  let app = build_router(app_state());
  let (_, slots) = call(&app, Method::POST, "/api/v1/parse", Some(json!({ "displayText": "I hアve ア cイt" }))).await;
  let slots = slots.as_array().unwrap();
  assert_eq!(slots.len(), 2, "イ is not unlocked yet");
  assert_eq!(slots[0]["expected"], "a");
  assert_eq!(slots[0]["startIndex"], 3);
  assert_eq!(slots[1]["characterId"], "ka_a");
}

#[tokio::test]
async fn skip_stays_within_the_level() {
  let app = build_router(app_state());
  let (_, progress) = call(&app, Method::GET, "/api/v1/progress", None).await;
  let total = progress["currentLevelProgress"]["total"].as_u64().unwrap();
  let mut last = Value::Null;
  for _ in 0..total + 2 {
    last = call(&app, Method::POST, "/api/v1/skip", None).await.1;
  }
  assert_eq!(last["currentLevelProgress"]["completed"], total - 1);
  assert_eq!(last["levelSetProgress"]["completed"], 0);
}

#[tokio::test]
async fn state_menu_and_transitions() {
  let app = build_router(app_state());
  let (_, state) = call(&app, Method::GET, "/api/v1/state", None).await;
  assert_eq!(state["showLevelSetTransition"], true);
  assert_eq!(state["menuOpen"], false);
  let (_, state) = call(&app, Method::POST, "/api/v1/menu", None).await;
  assert_eq!(state["menuOpen"], true);
  let (_, state) = call(&app, Method::POST, "/api/v1/dismiss", None).await;
  assert_eq!(state["showLevelSetTransition"], false);
  assert_eq!(state["showLevelTransition"], false);
}

#[tokio::test]
async fn websocket_messages() {
  let state = app_state();
  let reply: Value = serde_json::from_str(&reply_for(r#"{"type":"ping"}"#, &state).await).unwrap();
  assert_eq!(reply["type"], "pong");

  let reply: Value = serde_json::from_str(&reply_for(r#"{"type":"get_content"}"#, &state).await).unwrap();
  assert_eq!(reply["type"], "content");
  let item = reply["item"].clone();

  let msg = json!({ "type": "submit_answer", "answer": answer_for(&item) }).to_string();
  let reply: Value = serde_json::from_str(&reply_for(&msg, &state).await).unwrap();
  assert_eq!(reply["type"], "answer_result");
  assert_eq!(reply["isCorrect"], true);

  let reply: Value = serde_json::from_str(&reply_for(r#"{"type":"jump_to_level","levelSetId":"x","characterIndex":0}"#, &state).await).unwrap();
  assert_eq!(reply["type"], "error");

  let huge = json!({ "type": "jump_to_level", "levelSetId": "katakana", "characterIndex": u64::MAX }).to_string();
  for msg in [r#"{"type":"jump_to_level","levelSetId":"katakana","characterIndex":15}"#.to_string(), huge] {
    let reply: Value = serde_json::from_str(&reply_for(&msg, &state).await).unwrap();
    assert_eq!(reply["type"], "error", "{msg}");
  }
  let reply: Value = serde_json::from_str(&reply_for(r#"{"type":"get_progress"}"#, &state).await).unwrap();
  assert_eq!(reply["progress"]["currentLevelProgress"]["levelName"], "ア");

  let reply: Value = serde_json::from_str(&reply_for(r#"{"type":"get_level_sets"}"#, &state).await).unwrap();
  assert_eq!(reply["type"], "level_sets");
  assert_eq!(reply["levelSets"].as_array().unwrap().len(), 4);

  let reply: Value = serde_json::from_str(&reply_for("not json", &state).await).unwrap();
  assert_eq!(reply["type"], "error");
}
