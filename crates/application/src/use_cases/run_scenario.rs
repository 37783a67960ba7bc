//! Run scenario use case.
//!
//! Drives each scenario through `Idle -> Sending -> AwaitingAssertions ->
//! Reported`, one step at a time. A transport error moves the scenario to
//! `NetworkFailure` and records its remaining steps as not sent.

use std::slice;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use vouch_domain::config::{BodyPolicy, HarnessConfig};
use vouch_domain::request::RequestSpec;
use vouch_domain::response::ResponseSpec;
use vouch_domain::scenario::{Capture, Scenario, Step};
use vouch_domain::state::ScenarioState;
use vouch_domain::testing::{ScenarioOutcome, StatusCheck, StepError, StepOutcome};
use vouch_domain::DomainResult;

use crate::auth::AuthInjector;
use crate::matcher::BodyMatcher;
use crate::ports::HttpClient;
use crate::variable_resolver::VariableResolver;

/// Runs scenarios against an [`HttpClient`].
pub struct ScenarioRunner<C: HttpClient + 'static> {
    client: Arc<C>,
    injector: AuthInjector,
    matcher: BodyMatcher,
    body_policy: BodyPolicy,
    parallelism: usize,
}

impl<C: HttpClient + 'static> Clone for ScenarioRunner<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            injector: self.injector,
            matcher: self.matcher,
            body_policy: self.body_policy,
            parallelism: self.parallelism,
        }
    }
}

impl<C: HttpClient + 'static> ScenarioRunner<C> {
    /// Creates a sequential runner with the default body policy.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            injector: AuthInjector::new(),
            matcher: BodyMatcher::new(),
            body_policy: BodyPolicy::default(),
            parallelism: 1,
        }
    }

    /// Creates a runner using the policy and parallelism from `config`.
    #[must_use]
    pub fn from_config(client: Arc<C>, config: &HarnessConfig) -> Self {
        Self::new(client)
            .with_body_policy(config.body_policy)
            .with_parallelism(config.parallelism)
    }

    /// Sets what happens to body assertions when the status check fails.
    #[must_use]
    pub const fn with_body_policy(mut self, body_policy: BodyPolicy) -> Self {
        self.body_policy = body_policy;
        self
    }

    /// Sets how many scenarios may run at once; values below 1 become 1.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Configured parallelism.
    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Runs one scenario to completion.
    ///
    /// Never fails: every problem is recorded in the returned outcome.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioOutcome {
        let started = Instant::now();
        info!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            "running scenario"
        );

        let steps = match self.run_steps(scenario).await {
            Ok(steps) => steps,
            Err(e) => {
                warn!(scenario = %scenario.name, error = %e, "scenario aborted");
                vec![internal_failure(&scenario.name, e.to_string())]
            }
        };

        let outcome = ScenarioOutcome::from_steps(&scenario.name, steps, millis(started.elapsed()));
        info!(
            scenario = %outcome.scenario,
            status = ?outcome.status,
            assertions = outcome.assertion_count(),
            failed = outcome.failed_assertions().count(),
            duration_ms = outcome.duration_ms,
            "scenario finished"
        );
        outcome
    }

    /// Runs every scenario; outcomes come back in registration order.
    ///
    /// With parallelism above 1 scenarios run as tokio tasks bounded by a
    /// semaphore. Each scenario still runs its own steps in order.
    pub async fn run_all(&self, scenarios: Vec<Scenario>) -> Vec<ScenarioOutcome> {
        if self.parallelism <= 1 || scenarios.len() <= 1 {
            let mut outcomes = Vec::with_capacity(scenarios.len());
            for scenario in &scenarios {
                outcomes.push(self.run(scenario).await);
            }
            return outcomes;
        }

        debug!(
            scenarios = scenarios.len(),
            parallelism = self.parallelism,
            "running scenarios in parallel"
        );
        let names: Vec<String> = scenarios.iter().map(|s| s.name.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks = JoinSet::new();

        for (index, scenario) in scenarios.into_iter().enumerate() {
            let runner = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, runner.run(&scenario).await)
            });
        }

        let mut slots: Vec<Option<ScenarioOutcome>> = names.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Err(e) => warn!(error = %e, "scenario task failed"),
            }
        }

        slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    let step =
                        internal_failure(&name, "scenario task did not complete".to_string());
                    ScenarioOutcome::from_steps(name, vec![step], 0)
                })
            })
            .collect()
    }

    async fn run_steps(&self, scenario: &Scenario) -> DomainResult<Vec<StepOutcome>> {
        let mut state = ScenarioState::Idle;
        let mut variables = VariableResolver::new();
        let mut outcomes = Vec::with_capacity(scenario.steps.len());
        let mut steps = scenario.steps.iter();

        while let Some(step) = steps.next() {
            let request = match materialize(&step.request, &variables) {
                Ok(request) => request,
                Err(names) => {
                    warn!(
                        scenario = %scenario.name,
                        unresolved = ?names,
                        "step references uncaptured variables"
                    );
                    let mut outcome = StepOutcome::not_sent(
                        step.request.request_line(),
                        self.matcher
                            .skip_all(&step.assertions, "step was not sent: unresolved variables"),
                    );
                    outcome.errors.push(StepError::UnresolvedVariables { names });
                    outcomes.push(outcome);
                    self.skip_remaining(steps, &mut outcomes);
                    state.transition(ScenarioState::Reported)?;
                    return Ok(outcomes);
                }
            };

            state = state.transition(ScenarioState::Sending)?;
            debug!(scenario = %scenario.name, request = %request.request_line(), "sending");
            let sent = Instant::now();

            match self.injector.send(self.client.as_ref(), request.clone()).await {
                Ok(response) => {
                    state = state.transition(ScenarioState::AwaitingAssertions)?;
                    let outcome = self.check_step(step, &request, &response, &mut variables);
                    debug!(
                        scenario = %scenario.name,
                        request = %outcome.request,
                        status = response.status(),
                        passed = outcome.passed(),
                        "step finished"
                    );
                    outcomes.push(outcome);
                }
                Err(e) => {
                    state.transition(ScenarioState::NetworkFailure)?;
                    warn!(
                        scenario = %scenario.name,
                        request = %request.request_line(),
                        error = %e,
                        "network error, aborting scenario"
                    );
                    let mut outcome = StepOutcome::not_sent(
                        request.request_line(),
                        self.matcher.skip_all(&step.assertions, "no response received"),
                    );
                    outcome.errors.push(StepError::Network {
                        message: e.to_string(),
                    });
                    outcome.duration_ms = millis(sent.elapsed());
                    outcomes.push(outcome);
                    self.skip_remaining(steps, &mut outcomes);
                    return Ok(outcomes);
                }
            }
        }

        state.transition(ScenarioState::Reported)?;
        Ok(outcomes)
    }

    fn check_step(
        &self,
        step: &Step,
        request: &RequestSpec,
        response: &ResponseSpec,
        variables: &mut VariableResolver,
    ) -> StepOutcome {
        let status_check = StatusCheck::evaluate(&step.expected_status, response.status());

        let assertions = if status_check.passed || self.body_policy == BodyPolicy::AlwaysEvaluate {
            self.matcher.evaluate(response, &step.assertions)
        } else {
            let reason = status_check.failure_message().unwrap_or_default();
            self.matcher.skip_all(&step.assertions, &reason)
        };

        let mut outcome = StepOutcome::not_sent(request.request_line(), assertions);
        outcome.duration_ms = millis(response.duration());

        if status_check.passed {
            for capture in &step.captures {
                match capture_value(response, capture) {
                    Ok(value) => {
                        variables.set(&capture.name, value.clone());
                        outcome.captured.insert(capture.name.clone(), value);
                    }
                    Err(reason) => outcome.errors.push(StepError::CaptureFailed {
                        name: capture.name.clone(),
                        reason,
                    }),
                }
            }
        }

        outcome.status_check = Some(status_check);
        outcome
    }

    fn skip_remaining(&self, steps: slice::Iter<'_, Step>, outcomes: &mut Vec<StepOutcome>) {
        for step in steps {
            outcomes.push(StepOutcome::not_sent(
                step.request.request_line(),
                self.matcher
                    .skip_all(&step.assertions, "scenario aborted by an earlier step"),
            ));
        }
    }
}

/// Substitutes captured values into the request path and body.
///
/// Body values are JSON-escaped when they land inside a string literal.
fn materialize(
    request: &RequestSpec,
    variables: &VariableResolver,
) -> Result<RequestSpec, Vec<String>> {
    let path = variables.resolve(request.path());
    let body = request.body().map(|body| variables.resolve_json(body));

    let mut unresolved = path.unresolved;
    if let Some(body) = &body {
        for name in &body.unresolved {
            if !unresolved.contains(name) {
                unresolved.push(name.clone());
            }
        }
    }
    if !unresolved.is_empty() {
        return Err(unresolved);
    }

    let mut resolved = request.clone().with_path(path.resolved);
    if let Some(body) = body {
        resolved = resolved.with_body(body.resolved);
    }
    Ok(resolved)
}

/// Strings are captured raw; everything else as compact JSON.
fn capture_value(response: &ResponseSpec, capture: &Capture) -> Result<String, String> {
    let body = response.json().map_err(|e| e.to_string())?;
    match capture.path.resolve(body) {
        Ok(Value::String(text)) => Ok(text.clone()),
        Ok(Value::Null) => Err(format!("'{}' is null", capture.path)),
        Ok(value) => Ok(value.to_string()),
        Err(unresolved) => Err(unresolved.to_string()),
    }
}

fn internal_failure(scenario: &str, message: String) -> StepOutcome {
    let mut outcome = StepOutcome::not_sent(scenario, Vec::new());
    outcome.errors.push(StepError::Internal { message });
    outcome
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use vouch_domain::auth::BasicAuth;
    use vouch_domain::testing::{Assertion, AssertionStatus, OutcomeStatus, StatusExpectation};

    use crate::ports::{NetworkError, ResponseFuture};

    /// Serves canned responses by request line and records what it saw.
    #[derive(Default)]
    struct ScriptedClient {
        routes: HashMap<String, (u16, String)>,
        seen: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedClient {
        fn route(mut self, line: &str, status: u16, body: &str) -> Self {
            self.routes
                .insert(line.to_string(), (status, body.to_string()));
            self
        }
    }

    impl HttpClient for ScriptedClient {
        fn execute<'a>(&'a self, request: &'a RequestSpec) -> ResponseFuture<'a> {
            let line = request.request_line();
            self.seen
                .lock()
                .unwrap()
                .push((line.clone(), request.body().map(str::to_string)));
            let route = self.routes.get(&line).cloned();
            Box::pin(async move {
                match route {
                    Some((status, body)) => Ok(ResponseSpec::new(
                        status,
                        HashMap::new(),
                        body.into_bytes(),
                        Duration::from_millis(1),
                    )),
                    None => Err(NetworkError::ConnectionRefused {
                        host: "localhost".to_string(),
                        port: 8085,
                    }),
                }
            })
        }
    }

    fn runner(client: ScriptedClient) -> ScenarioRunner<ScriptedClient> {
        ScenarioRunner::new(Arc::new(client))
    }

    fn create_scenario() -> Scenario {
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

    #[tokio::test]
    async fn test_passing_scenario() {
        let client = ScriptedClient::default().route(
            "POST /books",
            201,
            r#"{"id":11,"name":"Clean Code","author":"Santideva","price":45.99}"#,
        );

        let outcome = runner(client).run(&create_scenario()).await;

        assert_eq!(outcome.status, OutcomeStatus::Passed);
        assert_eq!(outcome.assertion_count(), 3);
    }

    #[tokio::test]
    async fn test_collects_all_failures() {
        let client = ScriptedClient::default().route(
            "POST /books",
            201,
            r#"{"id":null,"name":"Dirty Code","price":45.99}"#,
        );

        let outcome = runner(client).run(&create_scenario()).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.assertion_count(), 3);
        assert_eq!(outcome.failed_assertions().count(), 2);
    }

    #[tokio::test]
    async fn test_status_mismatch_skips_body_assertions() {
        let client = ScriptedClient::default().route("POST /books", 401, "");

        let outcome = runner(client).run(&create_scenario()).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        let step = &outcome.steps[0];
        assert!(!step.status_check.as_ref().unwrap().passed);
        assert_eq!(step.assertions.len(), 3);
        assert_eq!(step.evaluated_count(), 0);
        assert!(step
            .assertions
            .iter()
            .all(|r| r.status == AssertionStatus::Skipped));
    }

    #[tokio::test]
    async fn test_always_evaluate_policy_runs_assertions() {
        let client = ScriptedClient::default().route("POST /books", 401, "");

        let outcome = runner(client)
            .with_body_policy(BodyPolicy::AlwaysEvaluate)
            .run(&create_scenario())
            .await;

        let step = &outcome.steps[0];
        assert_eq!(step.evaluated_count(), 3);
        assert_eq!(outcome.failed_assertions().count(), 3);
    }

    #[tokio::test]
    async fn test_not_found_with_no_body_assertions() {
        let client = ScriptedClient::default().route("GET /books/9999", 404, "");
        let scenario = Scenario::new("invalid id").with_step(
            Step::new(RequestSpec::get("/books/9999")).expect_status(StatusExpectation::exact(404)),
        );

        let outcome = runner(client).run(&scenario).await;

        assert_eq!(outcome.status, OutcomeStatus::Passed);
        assert_eq!(outcome.steps[0].evaluated_count(), 0);
    }

    #[tokio::test]
    async fn test_network_error_aborts_scenario() {
        let client = ScriptedClient::default();
        let scenario = Scenario::new("delete then check")
            .with_step(Step::new(RequestSpec::delete("/books/1")))
            .with_step(
                Step::new(RequestSpec::get("/books/1"))
                    .expect_status(StatusExpectation::exact(404))
                    .with_assertion(Assertion::not_null("id").unwrap()),
            );
        let client = Arc::new(client);

        let outcome = ScenarioRunner::new(Arc::clone(&client)).run(&scenario).await;

        assert_eq!(outcome.status, OutcomeStatus::NetworkFailure);
        assert_eq!(outcome.steps.len(), 2);
        assert!(matches!(outcome.steps[0].errors[0], StepError::Network { .. }));
        assert_eq!(outcome.steps[1].assertions[0].status, AssertionStatus::Skipped);
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_capture_feeds_later_step() {
        let client = ScriptedClient::default()
            .route("POST /books", 201, r#"{"id":42,"name":"Clean Code"}"#)
            .route("GET /books/42", 200, r#"{"id":42,"name":"Clean Code"}"#);
        let scenario = Scenario::new("create then read")
            .with_step(
                Step::new(RequestSpec::post("/books").with_body(r#"{"name":"Clean Code"}"#))
                    .expect_status(StatusExpectation::exact(201))
                    .capture("book_id", "id")
                    .unwrap(),
            )
            .with_step(
                Step::new(RequestSpec::get("/books/{{book_id}}"))
                    .with_assertion(Assertion::equals("id", 42).unwrap()),
            );

        let outcome = runner(client).run(&scenario).await;

        assert_eq!(outcome.status, OutcomeStatus::Passed);
        assert_eq!(outcome.steps[0].captured.get("book_id").map(String::as_str), Some("42"));
        assert_eq!(outcome.steps[1].request, "GET /books/42");
    }

    #[tokio::test]
    async fn test_captured_quotes_keep_body_valid_json() {
        let client = ScriptedClient::default()
            .route("GET /books/5", 200, r#"{"id":5,"name":"Clean \"Code\""}"#)
            .route("PUT /books/5", 200, r#"{"id":5}"#);
        let scenario = Scenario::new("copy name")
            .with_step(Step::new(RequestSpec::get("/books/5")).capture("name", "name").unwrap())
            .with_step(Step::new(
                RequestSpec::put("/books/5").with_body(r#"{"id":5,"name":"{{name}} 2nd"}"#),
            ));
        let client = Arc::new(client);

        let outcome = ScenarioRunner::new(Arc::clone(&client)).run(&scenario).await;

        assert_eq!(outcome.status, OutcomeStatus::Passed);
        let seen = client.seen.lock().unwrap();
        let body = seen[1].1.as_deref().unwrap();
        let sent: Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["name"], "Clean \"Code\" 2nd");
    }

    #[tokio::test]
    async fn test_unresolved_variable_fails_without_sending() {
        let client = Arc::new(ScriptedClient::default());
        let scenario = Scenario::new("read missing")
            .with_step(Step::new(RequestSpec::get("/books/{{book_id}}")));

        let outcome = ScenarioRunner::new(Arc::clone(&client)).run(&scenario).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(
            outcome.steps[0].errors,
            vec![StepError::UnresolvedVariables {
                names: vec!["book_id".to_string()]
            }]
        );
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_all_keeps_registration_order() {
        let client = ScriptedClient::default()
            .route("GET /books/1", 200, r#"{"id":1}"#)
            .route("GET /books/2", 200, r#"{"id":2}"#)
            .route("GET /books/3", 404, "");
        let scenarios: Vec<Scenario> = (1..=3)
            .map(|id| {
                Scenario::new(format!("book {id}"))
                    .with_step(Step::new(RequestSpec::get(format!("/books/{id}"))))
            })
            .collect();

        let outcomes = runner(client).with_parallelism(3).run_all(scenarios).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.scenario.as_str()).collect();
        assert_eq!(names, vec!["book 1", "book 2", "book 3"]);
        assert!(outcomes[0].passed());
        assert!(outcomes[1].passed());
        assert_eq!(outcomes[2].status, OutcomeStatus::Failed);
    }

    #[tokio::test]
    async fn test_empty_scenario_passes() {
        let outcome = runner(ScriptedClient::default())
            .run(&Scenario::new("empty"))
            .await;
        assert!(outcome.passed());
    }

    #[test]
    fn test_parallelism_floor() {
        assert_eq!(runner(ScriptedClient::default()).with_parallelism(0).parallelism(), 1);
    }
}
