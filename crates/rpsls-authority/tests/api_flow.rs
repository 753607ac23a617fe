//! HTTP-level tests for the authority service.
//!
//! Requests are driven through the router in-process; no sockets are opened.

use alloy_primitives::Address;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rpsls_authority::{create_router, AppState, CALLER_HEADER};
use rpsls_core::{Commitment, ManualClock, Move, ProtocolConfig, Secret};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    clock: ManualClock,
}

impl TestApp {
    fn new() -> Self {
        let clock = ManualClock::new(1_700_000_000);
        let state = AppState::with_clock(ProtocolConfig::default(), Arc::new(clock.clone()));
        Self {
            router: create_router(state),
            clock,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        caller: Option<Address>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn fund(&self, account: Address, amount: u64) {
        let (status, _) = self
            .send(
                "POST",
                &format!("/account/{}/deposit", account),
                None,
                Some(json!({ "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn balance(&self, account: Address) -> u64 {
        let (status, body) = self
            .send("GET", &format!("/account/{}", account), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["balance"].as_u64().unwrap()
    }

    async fn create(&self, p1: Address, p2: Address, mv: Move, secret: &Secret, stake: u64) -> String {
        let commitment = Commitment::new(mv, secret);
        let (status, body) = self
            .send(
                "POST",
                "/game/create",
                Some(p1),
                Some(json!({ "commitment": commitment, "opponent": p2, "value": stake })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["game_id"].as_str().unwrap().to_string()
    }
}

fn p1() -> Address {
    Address::with_last_byte(0xa1)
}

fn p2() -> Address {
    Address::with_last_byte(0xb2)
}

#[tokio::test]
async fn test_happy_path_over_http() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;
    app.fund(p2(), 10).await;

    let secret = Secret::random();
    let game_id = app.create(p1(), p2(), Move::Rock, &secret, 1).await;
    assert_eq!(app.balance(p1()).await, 9);

    let (status, body) = app
        .send(
            "POST",
            &format!("/game/{}/join", game_id),
            Some(p2()),
            Some(json!({ "move": 3, "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "joined");

    let (_, view) = app.send("GET", &format!("/game/{}", game_id), None, None).await;
    assert_eq!(view["phase"], "joined");
    assert_eq!(view["player2_move"], 3);
    assert_eq!(view["stake"], 1);
    assert_eq!(view["timeout_window_secs"], 300);

    let (status, settlement) = app
        .send(
            "POST",
            &format!("/game/{}/reveal", game_id),
            Some(p1()),
            Some(json!({ "move": 1, "secret": secret })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settlement["phase"], "resolved");
    assert_eq!(settlement["result"], "AWins");
    assert_eq!(settlement["transfers"][0]["amount"], 2);

    assert_eq!(app.balance(p1()).await, 11);
    assert_eq!(app.balance(p2()).await, 9);
}

#[tokio::test]
async fn test_mismatched_reveal_maps_to_bad_request() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;
    app.fund(p2(), 10).await;

    let secret = Secret::random();
    let game_id = app.create(p1(), p2(), Move::Rock, &secret, 1).await;
    app.send(
        "POST",
        &format!("/game/{}/join", game_id),
        Some(p2()),
        Some(json!({ "move": 3, "value": 1 })),
    )
    .await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/game/{}/reveal", game_id),
            Some(p1()),
            Some(json!({ "move": 2, "secret": secret })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "commitment_mismatch");

    let (_, view) = app.send("GET", &format!("/game/{}", game_id), None, None).await;
    assert_eq!(view["phase"], "joined");
    assert_eq!(app.balance(p1()).await, 9);
}

#[tokio::test]
async fn test_timeout_routes() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;
    app.fund(p2(), 10).await;

    let game_id = app.create(p1(), p2(), Move::Paper, &Secret::random(), 2).await;
    app.send(
        "POST",
        &format!("/game/{}/join", game_id),
        Some(p2()),
        Some(json!({ "move": 5, "value": 2 })),
    )
    .await;

    let (status, body) = app
        .send("POST", &format!("/game/{}/player2-timeout", game_id), Some(p2()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "timeout_not_reached");

    app.clock.advance(300);
    let (_, timeout) = app
        .send("GET", &format!("/game/{}/timeout", game_id), None, None)
        .await;
    assert_eq!(timeout["expired"], true);
    assert_eq!(timeout["claimable"], "player2");

    let (status, body) = app
        .send("POST", &format!("/game/{}/player1-timeout", game_id), Some(p1()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    let (status, settlement) = app
        .send("POST", &format!("/game/{}/player2-timeout", game_id), Some(p2()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settlement["phase"], "timed_out");
    assert_eq!(app.balance(p2()).await, 12);

    let (status, _) = app
        .send("POST", &format!("/game/{}/player2-timeout", game_id), Some(p2()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.balance(p2()).await, 12);
}

#[tokio::test]
async fn test_rejections() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;

    let commitment = Commitment::new(Move::Rock, &Secret::random());
    let (status, body) = app
        .send(
            "POST",
            "/game/create",
            None,
            Some(json!({ "commitment": commitment, "opponent": p2(), "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_caller");

    let (status, body) = app
        .send(
            "POST",
            "/game/create",
            Some(p1()),
            Some(json!({ "commitment": commitment, "opponent": p1(), "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "self_play");

    let game_id = app.create(p1(), p2(), Move::Rock, &Secret::random(), 1).await;
    let (status, body) = app
        .send(
            "POST",
            &format!("/game/{}/join", game_id),
            Some(Address::with_last_byte(0xcc)),
            Some(json!({ "move": 1, "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_participant");

    let (status, body) = app
        .send(
            "POST",
            &format!("/game/{}/join", game_id),
            Some(p2()),
            Some(json!({ "move": 0, "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_move");

    let (status, body) = app
        .send(
            "GET",
            &format!("/game/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "game_not_found");
}

#[tokio::test]
async fn test_open_games_and_config() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;
    app.create(p1(), p2(), Move::Spock, &Secret::random(), 1).await;

    let (_, open) = app.send("GET", "/games/open", None, None).await;
    assert_eq!(open["games"].as_array().unwrap().len(), 1);

    let (_, config) = app.send("GET", "/config", None, None).await;
    assert_eq!(config["timeout_window_secs"], 300);
    assert_eq!(config["open_join"], false);

    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_malformed_requests_get_error_bodies() {
    let app = TestApp::new();
    app.fund(p1(), 10).await;

    let request = Request::builder()
        .method("POST")
        .uri("/game/create")
        .header(CALLER_HEADER, p1().to_string())
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
    assert_eq!(app.balance(p1()).await, 10);

    let (status, body) = app
        .send(
            "POST",
            "/game/create",
            Some(p1()),
            Some(json!({ "opponent": p2(), "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = app.send("GET", "/game/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = app
        .send(
            "POST",
            "/game/not-a-uuid/join",
            Some(p2()),
            Some(json!({ "move": 1, "value": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = app.send("GET", "/games?player=0xnothex", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_deposit_overflow_is_rejected() {
    let app = TestApp::new();
    app.fund(p1(), u64::MAX).await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/account/{}/deposit", p1()),
            None,
            Some(json!({ "amount": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "balance_overflow");
    assert_eq!(app.balance(p1()).await, u64::MAX);
}

#[tokio::test]
async fn test_games_filtered_by_player() {
    let app = TestApp::new();
    let stranger = Address::with_last_byte(0xcc);
    app.fund(p1(), 10).await;
    app.fund(p2(), 10).await;
    app.fund(stranger, 10).await;

    let secret = Secret::random();
    let mine = app.create(p1(), p2(), Move::Rock, &secret, 1).await;
    app.create(stranger, p2(), Move::Paper, &Secret::random(), 1).await;

    let (status, all) = app.send("GET", "/games", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["games"].as_array().unwrap().len(), 2);

    let (_, own) = app
        .send("GET", &format!("/games?player={}", p1()), None, None)
        .await;
    let own = own["games"].as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["game_id"], mine.as_str());

    // Not listed for the named opponent until they join.
    let (_, theirs) = app
        .send("GET", &format!("/games?player={}", p2()), None, None)
        .await;
    assert!(theirs["games"].as_array().unwrap().is_empty());

    app.send(
        "POST",
        &format!("/game/{}/join", mine),
        Some(p2()),
        Some(json!({ "move": 3, "value": 1 })),
    )
    .await;
    let (_, theirs) = app
        .send("GET", &format!("/games?player={}", p2()), None, None)
        .await;
    assert_eq!(theirs["games"].as_array().unwrap().len(), 1);
}
