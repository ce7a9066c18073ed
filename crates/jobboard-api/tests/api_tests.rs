//! API integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobboard_api::{create_router, ApiConfig, AppState};
use jobboard_auth::{SigningSecret, TokenCodec};
use jobboard_models::{Role, VerifiedIdentity};

const SECRET: &str = "integration-test-secret-0123456789";

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: SigningSecret::new(SECRET),
        ..Default::default()
    }
}

fn test_app() -> (Router, AppState) {
    let state = AppState::new(test_config());
    (create_router(state.clone(), None), state)
}

fn token_for(state: &AppState, id: i64, role: Role) -> String {
    state
        .codec
        .issue_identity(&VerifiedIdentity::new(id, role))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn job_body(title: &str) -> Value {
    json!({
        "title": title,
        "company": "State University",
        "location": "Austin, TX",
        "description": "Research assistant position",
        "job_type": "internship",
    })
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
    assert!(headers.get("X-Request-ID").is_some());
}

#[tokio::test]
async fn test_signup_then_me() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Grace",
                "email": "Grace@Example.com",
                "password": "hopper-1906",
                "role": "student",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.split('.').count(), 3);

    let (status, me) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Grace");
    assert_eq!(me["role"], "student");

    // Duplicate email
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Impostor",
                "email": "grace@example.com",
                "password": "another-pass",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    // Login
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "grace@example.com", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "GRACE@example.com", "password": "hopper-1906" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "student");
}

#[tokio::test]
async fn test_signup_rejects_admin_role_and_bad_input() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "password": "password123",
                "role": "admin",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "name": "X", "email": "nope", "password": "short" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_admin_token_reaches_admin_route() {
    let (app, state) = test_app();
    let token = token_for(&state, 1, Role::Admin);

    let (status, body) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn test_student_token_forbidden_on_admin_route() {
    let (app, state) = test_app();
    let token = token_for(&state, 2, Role::Student);

    let (status, body) = send(&app, get("/api/admin/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn test_missing_header_rejected() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/admin/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "missing_credential");

    let (status, body) = send(&app, get("/api/applications", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "missing_credential");
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let (app, _) = test_app();

    let request = Request::builder()
        .uri("/api/admin/users")
        .header("Authorization", "Basic abc123")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "missing_credential");
}

#[tokio::test]
async fn test_invalid_tokens_rejected() {
    let (app, _) = test_app();

    let foreign = TokenCodec::new(SigningSecret::new("some-other-deployment-secret"))
        .issue_identity(&VerifiedIdentity::new(1, Role::Admin))
        .unwrap();
    let expired = TokenCodec::new(SigningSecret::new(SECRET))
        .issue(&VerifiedIdentity::new(1, Role::Admin), Duration::ZERO)
        .unwrap();

    for token in ["garbage", "a.b.c", foreign.as_str(), expired.as_str()] {
        let (status, body) = send(&app, get("/api/admin/stats", Some(token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "token {:?}", token);
        assert_eq!(body["code"], "invalid_credential");

        let (status, _) = send(&app, get("/api/auth/me", Some(token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_missing_secret_fails_closed() {
    let state = AppState::new(ApiConfig::default());
    let app = create_router(state, None);

    let token = TokenCodec::new(SigningSecret::new(SECRET))
        .issue_identity(&VerifiedIdentity::new(1, Role::Admin))
        .unwrap();
    let (status, _) = send(&app, get("/api/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Nobody",
                "email": "nobody@example.com",
                "password": "password123",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_job_application_flow() {
    let (app, state) = test_app();
    let college = token_for(&state, 10, Role::College);
    let other_college = token_for(&state, 11, Role::College);
    let student = token_for(&state, 20, Role::Student);

    // Only colleges post jobs
    let (status, _) = send(&app, json_request("POST", "/api/jobs", None, job_body("RA"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        json_request("POST", "/api/jobs", Some(&student), job_body("RA")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, job) = send(
        &app,
        json_request("POST", "/api/jobs", Some(&college), job_body("Research Assistant")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let job_id = job["id"].as_i64().unwrap();
    assert_eq!(job["posted_by"], 10);

    // Public listing and filtering
    let (status, list) = send(&app, get("/api/jobs?q=research&job_type=internship", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    let (_, list) = send(&app, get("/api/jobs?location=seattle", None)).await;
    assert_eq!(list["total"], 0);

    // Apply once
    let apply_uri = format!("/api/jobs/{}/apply", job_id);
    let (status, application) = send(
        &app,
        json_request("POST", &apply_uri, Some(&student), json!({ "cover_letter": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "pending");

    let (status, _) = send(
        &app,
        json_request("POST", &apply_uri, Some(&student), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_request("POST", &apply_uri, Some(&college), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Students see their own application state
    let (_, detail) = send(&app, get(&format!("/api/jobs/{}", job_id), Some(&student))).await;
    assert_eq!(detail["has_applied"], true);
    let (_, detail) = send(&app, get(&format!("/api/jobs/{}", job_id), None)).await;
    assert!(detail.get("has_applied").is_none());

    let (status, mine) = send(&app, get("/api/applications", Some(&student))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Only the posting college reviews
    let applications_uri = format!("/api/jobs/{}/applications", job_id);
    let (status, _) = send(&app, get(&applications_uri, Some(&other_college))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, received) = send(&app, get(&applications_uri, Some(&college))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(received[0]["student_id"], 20);

    let status_uri = format!("/api/applications/{}/status", application["id"]);
    let (status, updated) = send(
        &app,
        json_request("PATCH", &status_uri, Some(&college), json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "accepted");

    // Deletion by owner only
    let job_uri = format!("/api/jobs/{}", job_id);
    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(&job_uri)
            .header("Authorization", format!("Bearer {}", other_college))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(&job_uri)
            .header("Authorization", format!("Bearer {}", college))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&job_uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resume_builder() {
    let (app, state) = test_app();
    let student = token_for(&state, 30, Role::Student);
    let user = token_for(&state, 31, Role::User);

    let (status, _) = send(&app, get("/api/resume", Some(&student))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, resume) = send(
        &app,
        json_request(
            "PUT",
            "/api/resume",
            Some(&student),
            json!({
                "headline": "Aspiring systems engineer",
                "skills": ["Rust", "rust", "Linux"],
                "education": [{ "institution": "State University", "degree": "BSc CS" }],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resume["skills"], json!(["Rust", "Linux"]));

    let (status, fetched) = send(&app, get("/api/resume", Some(&student))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["headline"], "Aspiring systems engineer");

    let (status, _) = send(&app, get("/api/resume", Some(&user))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_user_management() {
    let (app, state) = test_app();
    let admin = token_for(&state, 999, Role::Admin);

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Tech College",
                "email": "jobs@tech.edu",
                "password": "college-pass",
                "role": "college",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let college_id = created["user"]["id"].as_i64().unwrap();

    let (status, users) = send(&app, get("/api/admin/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users["total"], 1);
    assert_eq!(users["users"][0]["role"], "college");

    let delete = |id: i64| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/users/{}", id))
            .header("Authorization", format!("Bearer {}", admin))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, delete(999)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, delete(college_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, delete(college_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seed_admin_can_log_in() {
    let mut config = test_config();
    config.bootstrap_admin = Some(jobboard_api::config::AdminBootstrap {
        email: "root@jobboard.test".to_string(),
        password: "bootstrap-pass".to_string(),
    });
    let state = AppState::new(config);
    state.seed_admin().await.unwrap();
    // Idempotent
    state.seed_admin().await.unwrap();
    let app = create_router(state, None);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "root@jobboard.test", "password": "bootstrap-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");

    let token = body["token"].as_str().unwrap();
    let (status, stats) = send(&app, get("/api/admin/stats", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users_by_role"]["admin"], 1);
}

fn login_from(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json");
    if let Some(forwarded_for) = forwarded_for {
        builder = builder.header("X-Forwarded-For", forwarded_for);
    }
    let mut request = builder
        .body(Body::from(
            json!({ "email": "ghost@example.com", "password": "whatever1" }).to_string(),
        ))
        .unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_login_rate_limited_per_peer() {
    let config = ApiConfig {
        login_rate_limit_rps: 1,
        ..test_config()
    };
    let app = create_router(AppState::new(config), None);

    let (status, _) = send(&app, login_from("203.0.113.5:40000", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(login_from("203.0.113.5:40001", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get("Retry-After").unwrap(), "1");

    // A different client has its own budget
    let (status, _) = send(&app, login_from("203.0.113.6:40000", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotating_forwarded_header_does_not_reset_budget() {
    let config = ApiConfig {
        login_rate_limit_rps: 1,
        ..test_config()
    };
    let app = create_router(AppState::new(config), None);

    let mut statuses = Vec::new();
    for i in 0..5 {
        let forwarded = format!("198.51.100.{}", i);
        let (status, _) = send(&app, login_from("203.0.113.5:40000", Some(&forwarded))).await;
        statuses.push(status);
    }

    assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
    assert!(statuses[1..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_forwarded_clients_separated_behind_trusted_proxy() {
    let config = ApiConfig {
        login_rate_limit_rps: 1,
        trusted_proxies: vec!["10.0.0.1".parse().unwrap()],
        ..test_config()
    };
    let app = create_router(AppState::new(config), None);

    let (status, _) = send(&app, login_from("10.0.0.1:5000", Some("198.51.100.1"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, login_from("10.0.0.1:5000", Some("198.51.100.2"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, login_from("10.0.0.1:5000", Some("198.51.100.1"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_role_checked_before_body_is_parsed() {
    let (app, state) = test_app();
    let student = token_for(&state, 40, Role::Student);
    let college = token_for(&state, 41, Role::College);
    let user = token_for(&state, 42, Role::User);

    let bad_job = json!({ "title": 1 });

    let (status, body) = send(&app, json_request("POST", "/api/jobs", Some(&student), bad_job.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, json_request("POST", "/api/jobs", Some(&college), bad_job)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/resume", Some(&user), json!({ "skills": "rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/applications/1/status",
            Some(&student),
            json!({ "status": "hired" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let (app, state) = test_app();
    let student = token_for(&state, 50, Role::Student);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(&app, get("/api/jobs?job_type=astronaut", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    // Applying without a body is fine; a broken body is not
    let college = token_for(&state, 51, Role::College);
    let (_, job) = send(&app, json_request("POST", "/api/jobs", Some(&college), job_body("TA"))).await;
    let apply_uri = format!("/api/jobs/{}/apply", job["id"]);

    let request = Request::builder()
        .method("POST")
        .uri(&apply_uri)
        .header("Authorization", format!("Bearer {}", student))
        .header("Content-Type", "application/json")
        .body(Body::from("[1, 2"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let request = Request::builder()
        .method("POST")
        .uri(&apply_uri)
        .header("Authorization", format!("Bearer {}", student))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_internal_error_detail_hidden_in_production() {
    let signup = || {
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "name": "Nobody",
                "email": "nobody@example.com",
                "password": "password123",
            }),
        )
    };

    // No signing secret, so token issuance fails after the account is created
    let production = ApiConfig {
        environment: "PRODUCTION".to_string(),
        ..Default::default()
    };
    let app = create_router(AppState::new(production), None);
    let (status, body) = send(&app, signup()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "An internal error occurred");
    assert_eq!(body["code"], "internal_error");

    let app = create_router(AppState::new(ApiConfig::default()), None);
    let (status, body) = send(&app, signup()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Token issuance unavailable"));
}
