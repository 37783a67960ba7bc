//! Contract scenarios for the books REST API.
//!
//! Covers listing, creating, reading, updating and deleting books, plus the
//! authentication, authorization and validation failures the service is
//! expected to report.

use tracing::debug;
use vouch_application::{ApplicationError, ApplicationResult, Suite};
use vouch_domain::auth::{AuthMode, BasicAuth, Credentials};
use vouch_domain::request::RequestSpec;
use vouch_domain::scenario::{Scenario, Step};
use vouch_domain::testing::{Assertion, StatusExpectation};
use vouch_domain::DomainResult;

/// Body sent by the create scenario.
pub const CREATE_BODY: &str = r#"{"name":"Clean Code","author":"Santideva","price":45.99}"#;
/// Body sent by the update scenario.
pub const UPDATE_BODY: &str =
    r#"{"id":1,"name":"A to the Bodhisattva Way of Life","author":"Santideva","price":15.41}"#;
/// Body missing the required `name` field.
pub const MISSING_FIELDS_BODY: &str = r#"{"author":"Incomplete Author"}"#;
/// Body with a string where a number belongs.
pub const INVALID_TYPE_BODY: &str = r#"{"price":"forty-five"}"#;
/// Body a non-admin tries to create.
pub const USER_POST_BODY: &str = r#"{"name":"Unauthorized Book","price":10}"#;

/// Credentials and tunable expectations for [`BooksSuite`].
#[derive(Debug, Clone)]
pub struct BooksSettings {
    /// Read-only account.
    pub user: Credentials,
    /// Account allowed to write.
    pub admin: Credentials,
    /// Account the service must reject.
    pub invalid: Credentials,
    /// How credentials are delivered.
    pub auth_mode: AuthMode,
    /// Status the service answers a delete with.
    pub delete_status: StatusExpectation,
    /// Status a non-admin create is rejected with.
    pub forbidden_status: StatusExpectation,
}

impl Default for BooksSettings {
    fn default() -> Self {
        Self {
            user: Credentials::new("user", "password"),
            admin: Credentials::new("admin", "password"),
            invalid: Credentials::new("invalid", "wrongpass"),
            auth_mode: AuthMode::Preemptive,
            // The reference service answers 500 to a successful delete.
            delete_status: StatusExpectation::one_of(&[200, 500]),
            forbidden_status: StatusExpectation::one_of(&[401, 403]),
        }
    }
}

/// The books API contract suite.
#[derive(Debug, Clone, Default)]
pub struct BooksSuite {
    settings: BooksSettings,
}

impl BooksSuite {
    /// Creates the suite with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the suite with custom settings.
    #[must_use]
    pub const fn with_settings(settings: BooksSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &BooksSettings {
        &self.settings
    }

    fn as_user(&self, request: RequestSpec) -> RequestSpec {
        self.authed(request, &self.settings.user)
    }

    fn as_admin(&self, request: RequestSpec) -> RequestSpec {
        self.authed(request, &self.settings.admin)
    }

    fn authed(&self, request: RequestSpec, credentials: &Credentials) -> RequestSpec {
        request.with_auth(BasicAuth {
            credentials: credentials.clone(),
            mode: self.settings.auth_mode,
        })
    }

    /// `GET /books` returns at least two fully populated books.
    ///
    /// # Errors
    ///
    /// Returns an error if an assertion path is invalid.
    pub fn list_books(&self) -> DomainResult<Scenario> {
        Ok(Scenario::new("list books").with_step(
            Step::new(self.as_user(RequestSpec::get("/books")))
                .expect_status(StatusExpectation::exact(200))
                .with_assertion(Assertion::has_size_at_least("$", 2)?)
                .with_assertion(Assertion::not_null("[0].id")?)
                .with_assertion(Assertion::not_null("[0].name")?)
                .with_assertion(Assertion::not_null("[0].author")?)
                .with_assertion(Assertion::not_null("[0].price")?),
        ))
    }

    /// An admin can create a book.
    ///
    /// # Errors
    ///
    /// Returns an error if an assertion path is invalid.
    pub fn create_book(&self) -> DomainResult<Scenario> {
        Ok(Scenario::new("create book").with_step(
            Step::new(self.as_admin(RequestSpec::post("/books").with_body(CREATE_BODY)))
                .expect_status(StatusExpectation::exact(201))
                .with_assertion(Assertion::not_null("id")?)
                .with_assertion(Assertion::equals("name", "Clean Code")?)
                .with_assertion(Assertion::equals("price", 45.99)?),
        ))
    }

    /// `GET /books/2` returns the seeded book.
    ///
    /// # Errors
    ///
    /// Returns an error if an assertion path is invalid.
    pub fn get_book_by_id(&self) -> DomainResult<Scenario> {
        Ok(Scenario::new("get book by id").with_step(
            Step::new(self.as_user(RequestSpec::get("/books/2")))
                .expect_status(StatusExpectation::exact(200))
                .with_assertion(Assertion::equals("id", 2)?)
                .with_assertion(Assertion::contains(
                    "name",
                    "The Life-Changing Magic of Tidying Up",
                )?)
                .with_assertion(Assertion::equals("author", "Marie Kondo")?),
        ))
    }

    /// An admin can replace a book.
    ///
    /// # Errors
    ///
    /// Returns an error if an assertion path is invalid.
    pub fn update_book(&self) -> DomainResult<Scenario> {
        Ok(Scenario::new("update book").with_step(
            Step::new(self.as_admin(RequestSpec::put("/books/1").with_body(UPDATE_BODY)))
                .expect_status(StatusExpectation::exact(200))
                .with_assertion(Assertion::equals(
                    "name",
                    "A to the Bodhisattva Way of Life",
                )?),
        ))
    }

    /// A deleted book is gone afterwards.
    #[must_use]
    pub fn delete_book(&self) -> Scenario {
        Scenario::new("delete book")
            .with_step(
                Step::new(self.as_admin(RequestSpec::delete("/books/1")))
                    .expect_status(self.settings.delete_status.clone()),
            )
            .with_step(
                Step::new(self.as_admin(RequestSpec::get("/books/1")))
                    .expect_status(StatusExpectation::exact(404)),
            )
    }

    /// Unknown credentials are rejected.
    #[must_use]
    pub fn unauthorized_access(&self) -> Scenario {
        let request = self.authed(RequestSpec::get("/books"), &self.settings.invalid);
        Scenario::new("unauthorized access")
            .with_step(Step::new(request).expect_status(StatusExpectation::exact(401)))
    }

    /// A read-only user cannot create books.
    #[must_use]
    pub fn user_role_restrictions(&self) -> Scenario {
        Scenario::new("user role restrictions").with_step(
            Step::new(self.as_user(RequestSpec::post("/books").with_body(USER_POST_BODY)))
                .expect_status(self.settings.forbidden_status.clone()),
        )
    }

    /// An unknown id is a 404.
    #[must_use]
    pub fn invalid_book_id(&self) -> Scenario {
        Scenario::new("invalid book id").with_step(
            Step::new(self.as_admin(RequestSpec::get("/books/9999")))
                .expect_status(StatusExpectation::exact(404)),
        )
    }

    /// Creating a book without a name is a 400.
    #[must_use]
    pub fn missing_required_fields(&self) -> Scenario {
        Scenario::new("missing required fields").with_step(
            Step::new(self.as_admin(RequestSpec::post("/books").with_body(MISSING_FIELDS_BODY)))
                .expect_status(StatusExpectation::exact(400)),
        )
    }

    /// A non-numeric price is a 400.
    #[must_use]
    pub fn invalid_data_type(&self) -> Scenario {
        Scenario::new("invalid data type").with_step(
            Step::new(self.as_admin(RequestSpec::put("/books/1").with_body(INVALID_TYPE_BODY)))
                .expect_status(StatusExpectation::exact(400)),
        )
    }
}

impl Suite for BooksSuite {
    fn name(&self) -> &str {
        "books"
    }

    /// Checks the accounts before any request is sent.
    ///
    /// The rejected account must differ from both real ones, and the read-only
    /// account from the admin, or the auth scenarios prove nothing.
    fn setup(&self) -> ApplicationResult<()> {
        let settings = &self.settings;
        if settings.invalid == settings.user || settings.invalid == settings.admin {
            return Err(ApplicationError::Setup("invalid account matches a valid one".to_string()));
        }
        if settings.user == settings.admin {
            return Err(ApplicationError::Setup("user and admin accounts are the same".to_string()));
        }
        debug!(auth_mode = ?settings.auth_mode, "books suite ready");
        Ok(())
    }

    fn scenarios(&self) -> ApplicationResult<Vec<Scenario>> {
        Ok(vec![
            self.list_books()?,
            self.create_book()?,
            self.get_book_by_id()?,
            self.update_book()?,
            self.delete_book(),
            self.unauthorized_access(),
            self.user_role_restrictions(),
            self.invalid_book_id(),
            self.missing_required_fields(),
            self.invalid_data_type(),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vouch_domain::auth::AUTHORIZATION;

    #[test]
    fn test_ten_scenarios_in_order() {
        let names: Vec<String> = BooksSuite::new()
            .scenarios()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "list books",
                "create book",
                "get book by id",
                "update book",
                "delete book",
                "unauthorized access",
                "user role restrictions",
                "invalid book id",
                "missing required fields",
                "invalid data type",
            ]
        );
    }

    #[test]
    fn test_every_request_carries_credentials() {
        for scenario in BooksSuite::new().scenarios().unwrap() {
            for step in &scenario.steps {
                assert!(step.request.auth().is_some(), "{}", scenario.name);
                // Attached by the injector at send time.
                assert!(step.request.headers().get(AUTHORIZATION).is_none());
            }
        }
    }

    #[test]
    fn test_declared_assertions() {
        let suite = BooksSuite::new();
        assert_eq!(suite.list_books().unwrap().declared_assertions(), 5);
        assert_eq!(suite.create_book().unwrap().declared_assertions(), 3);
        assert_eq!(suite.get_book_by_id().unwrap().declared_assertions(), 3);
        assert_eq!(suite.invalid_book_id().declared_assertions(), 0);
    }

    #[test]
    fn test_setup_accepts_defaults() {
        assert!(BooksSuite::new().setup().is_ok());
    }

    #[test]
    fn test_setup_rejects_unusable_accounts() {
        let admin_is_user = BooksSuite::with_settings(BooksSettings {
            admin: Credentials::new("user", "password"),
            ..BooksSettings::default()
        });
        assert!(matches!(admin_is_user.setup(), Err(ApplicationError::Setup(_))));

        let invalid_is_user = BooksSuite::with_settings(BooksSettings {
            invalid: Credentials::new("user", "password"),
            ..BooksSettings::default()
        });
        assert!(matches!(invalid_is_user.setup(), Err(ApplicationError::Setup(_))));
    }

    #[test]
    fn test_delete_status_is_configurable() {
        let suite = BooksSuite::with_settings(BooksSettings {
            delete_status: StatusExpectation::exact(204),
            ..BooksSettings::default()
        });
        let scenario = suite.delete_book();
        assert_eq!(scenario.steps[0].expected_status, StatusExpectation::exact(204));
        assert_eq!(scenario.steps[1].expected_status, StatusExpectation::exact(404));
    }
}
