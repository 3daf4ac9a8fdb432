//! HTTP endpoint tests, driven through the router with `tower::oneshot`.
//!
//! Submission tests stub the encoder and recognizer with shell scripts
//! and are unix-only; everything else runs anywhere.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use parla_api::{build_router, AppState};
use parla_common::db::init_database;
use parla_common::Config;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

struct TestApp {
    #[allow(dead_code)]
    dir: TempDir,
    pool: SqlitePool,
    config: Config,
    app: Router,
}

async fn spawn_app() -> TestApp {
    spawn_with_config(|_, _| {}).await
}

/// Build an app over a fresh database in a temp dir. The tweak closure
/// gets the temp dir path so it can place stub tools inside it.
async fn spawn_with_config(tweak: impl FnOnce(&Path, &mut Config)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = Config {
        root_folder: dir.path().join("data"),
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        encoder_path: "/nonexistent/encoder".to_string(),
        recognizer_path: "/nonexistent/recognizer".to_string(),
        transcode_timeout_secs: 10,
        recognize_timeout_secs: 10,
    };
    tweak(dir.path(), &mut config);
    config.ensure_directories().unwrap();

    let pool = init_database(&config.database_path()).await.unwrap();
    let app = build_router(AppState::new(pool.clone(), &config));
    TestApp {
        dir,
        pool,
        config,
        app,
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn seed_quiz(pool: &SqlitePool, kind: &str, text: &str, level: &str) -> i64 {
    sqlx::query("INSERT INTO quizzes (kind, text, level) VALUES (?, ?, ?)")
        .bind(kind)
        .bind(text)
        .bind(level)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

async fn seed_attempt(pool: &SqlitePool, quiz_id: i64, outcome: &str, created_at: &str) {
    sqlx::query(
        "INSERT INTO attempts (user_id, quiz_id, outcome, created_at) VALUES (1, ?, ?, ?)",
    )
    .bind(quiz_id)
    .bind(outcome)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
}

async fn register_user(app: &Router, name: &str, email: &str, password: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            json!({"name": name, "email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let test = spawn_app().await;

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "parla-api");
}

#[tokio::test]
async fn register_returns_profile_without_credentials() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            json!({"name": "Ada", "email": "ada@example.com", "password": "hunter2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["id"].as_i64().unwrap() > 1);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_blank_fields() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            json!({"name": "  ", "email": "ada@example.com", "password": "hunter2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let test = spawn_app().await;
    register_user(&test.app, "Ada", "ada@example.com", "hunter2").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            json!({"name": "Other", "email": "ada@example.com", "password": "different"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response_json(response).await["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn login_roundtrip() {
    let test = spawn_app().await;
    let id = register_user(&test.app, "Ada", "ada@example.com", "hunter2").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"email": "ada@example.com", "password": "hunter2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["id"].as_i64().unwrap(), id);
    assert_eq!(body["name"], "Ada");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let test = spawn_app().await;
    register_user(&test.app, "Ada", "ada@example.com", "hunter2").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"email": "ada@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_email_is_unauthorized() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"email": "nobody@example.com", "password": "whatever"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_account_cannot_log_in() {
    let test = spawn_app().await;

    // Seeded user 1 has an empty password hash.
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            json!({"email": "anonymous@localhost", "password": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_lookup_and_rename() {
    let test = spawn_app().await;
    let id = register_user(&test.app, "Ada", "ada@example.com", "hunter2").await;

    let response = test
        .app
        .clone()
        .oneshot(get(&format!("/api/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["name"], "Ada");

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/users/{}/name", id),
            json!({"name": "Ada Lovelace"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["name"], "Ada Lovelace");
}

#[tokio::test]
async fn missing_user_profile_is_404() {
    let test = spawn_app().await;

    let response = test.app.clone().oneshot(get("/api/users/4242")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/users/4242/name",
            json!({"name": "Ghost"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn articles_list_get_and_search() {
    let test = spawn_app().await;
    sqlx::query("INSERT INTO articles (title, content) VALUES ('Der Artikel', 'Inhalt eins')")
        .execute(&test.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO articles (title, content) VALUES ('Zweiter', 'Inhalt zwei')")
        .execute(&test.pool)
        .await
        .unwrap();

    let response = test.app.clone().oneshot(get("/api/articles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Der Artikel");
    // Listings carry no article body
    assert!(list[0].get("content").is_none());

    let response = test.app.clone().oneshot(get("/api/articles/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["content"], "Inhalt eins");

    let response = test.app.clone().oneshot(get("/api/articles/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test
        .app
        .clone()
        .oneshot(get("/api/articles/search/Der%20Artikel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = test
        .app
        .clone()
        .oneshot(get("/api/articles/search/Unbekannt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quiz_list_reports_answered_flags() {
    let test = spawn_app().await;
    let first = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;
    let second = seed_quiz(&test.pool, "pronunciation", "gute nacht", "A1").await;
    seed_attempt(&test.pool, first, "Perfect", "2026-08-01 10:00:00").await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/quizzes/pronunciation/level/A1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"].as_i64().unwrap(), first);
    assert_eq!(list[0]["is_answered"], true);
    assert_eq!(list[1]["id"].as_i64().unwrap(), second);
    assert_eq!(list[1]["is_answered"], false);
}

#[tokio::test]
async fn unknown_quiz_kind_is_bad_request() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/quizzes/listening/level/A1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn single_quiz_lookup() {
    let test = spawn_app().await;
    let id = seed_quiz(&test.pool, "spelling", "schmetterling", "B1").await;

    let response = test
        .app
        .clone()
        .oneshot(get(&format!("/api/quizzes/spelling/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["text"], "schmetterling");
    assert_eq!(body["is_answered"], false);

    let response = test
        .app
        .clone()
        .oneshot(get("/api/quizzes/spelling/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn random_phrases_are_capped_and_open_only() {
    let test = spawn_app().await;
    for i in 0..7 {
        seed_quiz(&test.pool, "spelling", &format!("wort {}", i), "B1").await;
    }
    let closed = seed_quiz(&test.pool, "spelling", "geschlossen", "B1").await;
    sqlx::query("UPDATE quizzes SET is_open = 0 WHERE id = ?")
        .bind(closed)
        .execute(&test.pool)
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(get("/api/quizzes/spelling/random/B1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 5);
    for phrase in list {
        assert_ne!(phrase["id"].as_i64().unwrap(), closed);
        assert_eq!(phrase["level"], "B1");
    }
}

#[tokio::test]
async fn history_lists_attempts_newest_first() {
    let test = spawn_app().await;
    let first = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;
    let second = seed_quiz(&test.pool, "pronunciation", "gute nacht", "A2").await;
    seed_attempt(&test.pool, first, "Perfect", "2026-08-01 10:00:00").await;
    seed_attempt(&test.pool, second, "Not Bad", "2026-08-02 10:00:00").await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/1/history/pronunciation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["quiz_id"].as_i64().unwrap(), second);
    assert_eq!(list[0]["outcome"], "Not Bad");
    assert_eq!(list[0]["text"], "gute nacht");
    assert_eq!(list[1]["quiz_id"].as_i64().unwrap(), first);
    assert_eq!(list[1]["outcome"], "Perfect");
}

#[tokio::test]
async fn history_is_scoped_to_the_requested_kind() {
    let test = spawn_app().await;
    let spoken = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;
    let spelled = seed_quiz(&test.pool, "spelling", "schmetterling", "B1").await;
    seed_attempt(&test.pool, spoken, "Perfect", "2026-08-01 10:00:00").await;
    seed_attempt(&test.pool, spelled, "Perfect", "2026-08-01 11:00:00").await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/1/history/spelling"))
        .await
        .unwrap();
    let body = response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["quiz_id"].as_i64().unwrap(), spelled);
}

#[tokio::test]
async fn history_of_unknown_user_is_empty() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/4242/history/pronunciation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stats_aggregate_outcomes_and_languages() {
    let test = spawn_app().await;
    let german = seed_quiz(&test.pool, "pronunciation", "guten morgen", "de").await;
    let french = seed_quiz(&test.pool, "pronunciation", "bonjour", "fr").await;
    seed_attempt(&test.pool, german, "Perfect", "2026-08-01 10:00:00").await;
    seed_attempt(&test.pool, german, "Perfect", "2026-08-01 11:00:00").await;
    seed_attempt(&test.pool, french, "Not Bad", "2026-08-01 12:00:00").await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/1/stats/pronunciation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total_attempts"], 3);
    assert_eq!(body["perfect_count"], 2);
    assert_eq!(body["perfect_percentage"], json!(66.7));
    assert_eq!(body["not_bad_count"], 1);
    assert_eq!(body["not_bad_percentage"], json!(33.3));

    let languages = body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 2);
    assert_eq!(languages[0]["language"], "de");
    assert_eq!(languages[0]["attempt_count"], 2);
    assert_eq!(languages[1]["language"], "fr");
    assert_eq!(languages[1]["attempt_count"], 1);
}

#[tokio::test]
async fn stats_for_a_fresh_user_are_all_zero() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/4242/stats/pronunciation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total_attempts"], 0);
    assert_eq!(body["perfect_percentage"], json!(0.0));
    assert_eq!(body["languages"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Submission endpoint
// ---------------------------------------------------------------------------

fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

fn submission_request(uri: &str, parts: &[(&str, Option<&str>, Vec<u8>)]) -> Request<Body> {
    let boundary = "----parla-test-boundary";
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(multipart_body(boundary, parts)))
        .unwrap()
}

/// A half-second of mono 16-bit audio.
fn wav_fixture() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..22050i32 {
            writer.write_sample((i % 64) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[tokio::test]
async fn submission_without_file_is_bad_request() {
    let test = spawn_app().await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("language", None, b"de".to_vec())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["message"], "No audio file in request");
}

#[tokio::test]
async fn submission_for_missing_quiz_is_404_and_writes_nothing() {
    let test = spawn_app().await;

    let request = submission_request(
        "/api/quizzes/pronunciation/999/submissions",
        &[("file", Some("clip.wav"), wav_fixture())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let scratch: Vec<_> = std::fs::read_dir(test.config.scratch_dir())
        .unwrap()
        .collect();
    assert!(scratch.is_empty());
}

#[tokio::test]
async fn empty_file_part_counts_as_missing_audio() {
    let test = spawn_app().await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("file", Some("clip.wav"), Vec::new())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submission_with_bad_user_id_is_rejected() {
    let test = spawn_app().await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[
            ("file", Some("clip.wav"), wav_fixture()),
            ("user_id", None, b"not-a-number".to_vec()),
        ],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[cfg(unix)]
fn stub_tool(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

#[cfg(unix)]
const STUB_COPY_ENCODER: &str = r#"#!/bin/sh
in=""
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then in="$a"; fi
  prev="$a"
  out="$a"
done
cp "$in" "$out"
"#;

#[cfg(unix)]
async fn spawn_with_stub_tools(recognizer_body: &str, recognize_timeout_secs: u64) -> TestApp {
    spawn_with_config(|dir, config| {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        config.encoder_path = stub_tool(&bin, "encoder.sh", STUB_COPY_ENCODER);
        config.recognizer_path = stub_tool(&bin, "recognizer.sh", recognizer_body);
        config.recognize_timeout_secs = recognize_timeout_secs;
    })
    .await
}

#[cfg(unix)]
#[tokio::test]
async fn successful_submission_reports_the_grade() {
    let recognizer = r#"#!/bin/sh
printf '{"status": "Perfect", "score": 97.0, "recognized_text": "guten morgen", "expected_text": "guten morgen", "error": null}'
"#;
    let test = spawn_with_stub_tools(recognizer, 10).await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("file", Some("clip.wav"), wav_fixture())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["outcome"], "Perfect");
    assert_eq!(body["text"], "guten morgen");
    assert_eq!(body["recognized_text"], "guten morgen");
    assert_eq!(body["is_answered"], true);

    let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attempts")
        .fetch_one(&test.pool)
        .await
        .unwrap();
    assert_eq!(attempts, 1);
}

#[cfg(unix)]
#[tokio::test]
async fn near_miss_submission_reports_not_bad() {
    let recognizer = r#"#!/bin/sh
printf '{"status": "Close", "score": 81.5, "recognized_text": "guten morgn", "expected_text": "guten morgen", "error": null}'
"#;
    let test = spawn_with_stub_tools(recognizer, 10).await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("file", Some("clip.wav"), wav_fixture())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["outcome"], "Not Bad");
    assert_eq!(body["recognized_text"], "guten morgn");
}

#[cfg(unix)]
#[tokio::test]
async fn encoder_failure_is_an_internal_error() {
    let test = spawn_with_config(|dir, config| {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        config.encoder_path = stub_tool(&bin, "encoder.sh", "#!/bin/sh\nexit 1\n");
    })
    .await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("file", Some("clip.wav"), wav_fixture())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"]["message"], "audio encoder failed");

    let scratch: Vec<_> = std::fs::read_dir(test.config.scratch_dir())
        .unwrap()
        .collect();
    assert!(scratch.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn hung_recognizer_is_a_gateway_timeout() {
    let test = spawn_with_stub_tools("#!/bin/sh\nsleep 5\n", 1).await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[("file", Some("clip.wav"), wav_fixture())],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "TIMEOUT");

    let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attempts")
        .fetch_one(&test.pool)
        .await
        .unwrap();
    assert_eq!(attempts, 0);
    let scratch: Vec<_> = std::fs::read_dir(test.config.scratch_dir())
        .unwrap()
        .collect();
    assert!(scratch.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn submission_user_id_field_attributes_the_attempt() {
    let recognizer = r#"#!/bin/sh
printf '{"status": "Perfect", "recognized_text": "guten morgen"}'
"#;
    let test = spawn_with_stub_tools(recognizer, 10).await;
    let id = seed_quiz(&test.pool, "pronunciation", "guten morgen", "A1").await;
    let user = register_user(&test.app, "Ada", "ada@example.com", "hunter2").await;

    let request = submission_request(
        &format!("/api/quizzes/pronunciation/{}/submissions", id),
        &[
            ("file", Some("clip.wav"), wav_fixture()),
            ("user_id", None, user.to_string().into_bytes()),
        ],
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let attributed: i64 = sqlx::query_scalar("SELECT user_id FROM attempts")
        .fetch_one(&test.pool)
        .await
        .unwrap();
    assert_eq!(attributed, user);
}
