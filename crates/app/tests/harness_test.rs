//! Harness behaviour against a live HTTP server
//!
//! Exercises the scenario runner through the reqwest adapter: status and
//! body checks, auth modes, captures, network failures and timeouts.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use httpmock::prelude::HttpMockRequest;
use pretty_assertions::assert_eq;
use serde_json::json;

use vouch::logging;
use vouch_application::ScenarioRunner;
use vouch_domain::auth::BasicAuth;
use vouch_domain::config::HarnessConfig;
use vouch_domain::request::RequestSpec;
use vouch_domain::scenario::{Scenario, Step};
use vouch_domain::testing::{
    Assertion, AssertionStatus, OutcomeStatus, StatusExpectation, StepError,
};
use vouch_infrastructure::ReqwestHttpClient;

const ADMIN: &str = "Basic YWRtaW46cGFzc3dvcmQ=";

fn runner_for(base_uri: String, timeout_ms: u64) -> ScenarioRunner<ReqwestHttpClient> {
    let config = HarnessConfig {
        base_uri,
        timeout_ms,
        ..HarnessConfig::default()
    };
    ScenarioRunner::from_config(Arc::new(ReqwestHttpClient::from_config(&config).unwrap()), &config)
}

fn create_book() -> Scenario {
    Scenario::new("create book").with_step(
        Step::new(
            RequestSpec::post("/books")
                .with_body(r#"{"name":"Clean Code","author":"Santideva","price":45.99}"#)
                .with_auth(BasicAuth::preemptive("admin", "password")),
        )
        .expect_status(StatusExpectation::exact(201))
        .with_assertion(Assertion::not_null("id").unwrap())
        .with_assertion(Assertion::equals("name", "Clean Code").unwrap())
        .with_assertion(Assertion::equals("price", 45.99).unwrap()),
    )
}

fn has_header(req: &HttpMockRequest, name: &str) -> bool {
    req.headers
        .iter()
        .flatten()
        .any(|(key, _)| key.eq_ignore_ascii_case(name))
}

fn without_authorization(req: &HttpMockRequest) -> bool {
    !has_header(req, "authorization")
}

fn without_content_type(req: &HttpMockRequest) -> bool {
    !has_header(req, "content-type")
}

fn closed_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::test]
async fn test_create_book_passes() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/books").header("authorization", ADMIN);
            then.status(201).json_body(json!({
                "id": 7, "name": "Clean Code", "author": "Santideva", "price": 45.99
            }));
        })
        .await;

    let outcome = runner_for(server.base_url(), 5_000).run(&create_book()).await;

    mock.assert_async().await;
    assert_eq!(outcome.status, OutcomeStatus::Passed);
    assert_eq!(outcome.assertion_count(), 3);
}

#[tokio::test]
async fn test_auth_rejection_fails_on_status() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/books");
            then.status(401);
        })
        .await;

    let outcome = runner_for(server.base_url(), 5_000).run(&create_book()).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    let check = outcome.steps[0].status_check.as_ref().unwrap();
    assert_eq!(check.actual, 401);
    assert_eq!(
        check.failure_message().as_deref(),
        Some("Expected status = 201, got 401")
    );
    // The status failure is reported on its own; body checks are skipped.
    assert_eq!(outcome.assertion_count(), 3);
    assert_eq!(outcome.failed_assertions().count(), 0);
}

#[tokio::test]
async fn test_not_found_evaluates_no_body_assertions() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/books/9999");
            then.status(404).body("Not Found");
        })
        .await;
    let scenario = Scenario::new("invalid book id").with_step(
        Step::new(
            RequestSpec::get("/books/9999").with_auth(BasicAuth::preemptive("admin", "password")),
        )
        .expect_status(StatusExpectation::exact(404)),
    );

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert_eq!(outcome.status, OutcomeStatus::Passed);
    assert_eq!(outcome.steps[0].evaluated_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_fails_assertions_not_scenario_run() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/books/2");
            then.status(200).body("<html>oops</html>");
        })
        .await;
    let scenario = Scenario::new("get book").with_step(
        Step::new(RequestSpec::get("/books/2"))
            .with_assertion(Assertion::equals("id", 2).unwrap())
            .with_assertion(Assertion::not_null("name").unwrap()),
    );

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_assertions().count(), 2);
}

#[tokio::test]
async fn test_challenge_response_sends_twice() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    let bare = server
        .mock_async(|when, then| {
            when.method(GET).path("/books").matches(without_authorization);
            then.status(401).header("WWW-Authenticate", "Basic realm=\"books\"");
        })
        .await;
    let authed = server
        .mock_async(|when, then| {
            when.method(GET).path("/books").header("authorization", ADMIN);
            then.status(200).json_body(json!([{"id": 1}, {"id": 2}]));
        })
        .await;
    let scenario = Scenario::new("list books").with_step(
        Step::new(RequestSpec::get("/books").with_auth(BasicAuth::challenge("admin", "password")))
            .expect_status(StatusExpectation::exact(200))
            .with_assertion(Assertion::has_size_at_least("$", 2).unwrap()),
    );

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert!(outcome.passed(), "{outcome:#?}");
    bare.assert_async().await;
    authed.assert_async().await;
}

#[tokio::test]
async fn test_preemptive_sends_once() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    let bare = server
        .mock_async(|when, then| {
            when.method(GET).path("/books").matches(without_authorization);
            then.status(401);
        })
        .await;
    let authed = server
        .mock_async(|when, then| {
            when.method(GET).path("/books").header("authorization", ADMIN);
            then.status(200).json_body(json!([]));
        })
        .await;
    let scenario = Scenario::new("list books").with_step(Step::new(
        RequestSpec::get("/books").with_auth(BasicAuth::preemptive("admin", "password")),
    ));

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert!(outcome.passed());
    assert_eq!(bare.hits_async().await, 0);
    authed.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_captured_id_flows_into_next_step() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/books");
            then.status(201).json_body(json!({"id": 31, "name": "Clean Code"}));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/books/31");
            then.status(200).json_body(json!({"id": 31, "name": "Clean Code"}));
        })
        .await;
    let scenario = Scenario::new("create then read")
        .with_step(
            Step::new(RequestSpec::post("/books").with_body(r#"{"name":"Clean Code"}"#))
                .expect_status(StatusExpectation::exact(201))
                .capture("book_id", "id")
                .unwrap(),
        )
        .with_step(
            Step::new(RequestSpec::get("/books/{{book_id}}"))
                .with_assertion(Assertion::equals("name", "Clean Code").unwrap()),
        );

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert!(outcome.passed(), "{outcome:#?}");
    read.assert_async().await;
}

#[tokio::test]
async fn test_network_error_aborts_only_that_scenario() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/books");
            then.status(200).json_body(json!([]));
        })
        .await;
    let dead = format!("http://127.0.0.1:{}/books", closed_port());
    let scenarios = vec![
        Scenario::new("unreachable")
            .with_step(
                Step::new(RequestSpec::get(dead))
                    .with_assertion(Assertion::not_null("[0].id").unwrap()),
            )
            .with_step(Step::new(RequestSpec::get("/books"))),
        Scenario::new("reachable").with_step(Step::new(RequestSpec::get("/books"))),
    ];

    let outcomes = runner_for(server.base_url(), 2_000).run_all(scenarios).await;

    assert_eq!(outcomes[0].status, OutcomeStatus::NetworkFailure);
    assert!(matches!(outcomes[0].steps[0].errors[0], StepError::Network { .. }));
    assert_eq!(outcomes[0].steps[0].assertions[0].status, AssertionStatus::Skipped);
    assert!(outcomes[0].steps[1].status_check.is_none());
    assert_eq!(outcomes[1].status, OutcomeStatus::Passed);
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/books");
            then.status(200)
                .delay(std::time::Duration::from_millis(1_500))
                .json_body(json!([]));
        })
        .await;
    let scenario = Scenario::new("slow").with_step(Step::new(
        RequestSpec::get("/books").with_timeout_ms(200),
    ));

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert_eq!(outcome.status, OutcomeStatus::NetworkFailure);
    let StepError::Network { message } = &outcome.steps[0].errors[0] else {
        panic!("expected a network error");
    };
    assert!(message.contains("timed out after 200 ms"), "{message}");
}

#[tokio::test]
async fn test_default_content_type_only_with_body() {
    logging::init_test_tracing();
    let server = MockServer::start_async().await;
    let with_body = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/books")
                .header("content-type", "application/json");
            then.status(201).json_body(json!({"id": 1}));
        })
        .await;
    let without_body = server
        .mock_async(|when, then| {
            when.method(GET).path("/books").matches(without_content_type);
            then.status(200).json_body(json!([]));
        })
        .await;
    let scenario = Scenario::new("content type")
        .with_step(
            Step::new(RequestSpec::post("/books").with_body(r#"{"name":"x"}"#))
                .expect_status(StatusExpectation::exact(201)),
        )
        .with_step(Step::new(RequestSpec::get("/books")));

    let outcome = runner_for(server.base_url(), 5_000).run(&scenario).await;

    assert!(outcome.passed(), "{outcome:#?}");
    with_body.assert_async().await;
    without_body.assert_async().await;
}
