//! Async HTTP client for the hosted backend.
//!
//! The backend exposes an auth service, Postgres-style REST tables, an
//! object store for avatars, and a server-side account-deletion
//! function, all under one base URL. [`ApiClient`] speaks to all four
//! and implements [`RecordStore`] for the table access.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Mutex;
use url::Url;

use crate::error::{PlataError, Result};
use crate::models::{
    Category, CategoryId, NewCategory, NewTransaction, Session, Transaction, TransactionId,
    TransactionPatch, UserId,
};
use crate::store::RecordStore;
use crate::validation::{
    validate_display_name, validate_email, validate_password,
};

/// REST table prefix.
const REST_PATH: &str = "/rest/v1";

/// Auth service prefix.
const AUTH_PATH: &str = "/auth/v1";

/// Object storage prefix.
const STORAGE_PATH: &str = "/storage/v1";

/// Server-side functions prefix.
const FUNCTIONS_PATH: &str = "/functions/v1";

/// Transactions table name.
const TRANSACTIONS_TABLE: &str = "transactions";

/// Custom categories table name.
const CATEGORIES_TABLE: &str = "custom_categories";

/// Avatar bucket name.
const AVATAR_BUCKET: &str = "avatars";

/// Builder for constructing an [`ApiClient`].
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    /// Backend project base URL.
    base_url: Option<String>,
    /// Public API key sent with every request.
    api_key: Option<String>,
}

impl ApiClientBuilder {
    /// Sets the backend base URL (e.g. the project URL, or a mock
    /// server address in tests).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the public API key.
    #[inline]
    #[must_use]
    pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::State`] if the base URL or API key is
    /// missing, or [`PlataError::Http`] if the HTTP client fails to
    /// build.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| PlataError::State("base URL is required".to_owned()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| PlataError::State("API key is required".to_owned()))?;
        let http = reqwest::Client::builder().build()?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            session: Mutex::new(None),
        })
    }
}

/// Async client for the hosted backend.
///
/// Use [`ApiClient::builder()`] to construct an instance, then
/// [`ApiClient::sign_in`] to obtain a session. The session token is
/// held on the client and presented as the bearer on every subsequent
/// call.
#[derive(Debug)]
pub struct ApiClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// Backend base URL, no trailing slash.
    base_url: String,
    /// Public API key.
    api_key: String,
    /// Current session, if signed in.
    session: Mutex<Option<Session>>,
}

/// Auth token response body.
#[derive(Debug, serde::Deserialize)]
struct AuthResponse {
    /// Bearer token for subsequent calls.
    access_token: SecretString,
    /// The authenticated user.
    user: AuthUser,
}

/// The `user` object inside an auth response.
#[derive(Debug, serde::Deserialize)]
struct AuthUser {
    /// User id.
    id: UserId,
}

/// Response body of the object-sign endpoint.
#[derive(Debug, serde::Deserialize)]
struct SignedUrlResponse {
    /// Relative signed path, including the access token query.
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// A transaction row on its way into the table, with the owner column.
#[derive(Debug, serde::Serialize)]
struct NewTransactionRow<'a> {
    /// Owner column.
    user_id: &'a UserId,
    /// The rest of the row.
    #[serde(flatten)]
    row: &'a NewTransaction,
}

/// A category row on its way into the table, with the owner column.
#[derive(Debug, serde::Serialize)]
struct NewCategoryRow<'a> {
    /// Owner column.
    user_id: &'a UserId,
    /// The rest of the row.
    #[serde(flatten)]
    row: &'a NewCategory,
}

impl ApiClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The session currently held by the client, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::State`] if the session lock is poisoned.
    pub fn session(&self) -> Result<Option<Session>> {
        Ok(self
            .session
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?
            .clone())
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Signs in with email and password, stores the session on the
    /// client, and returns it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed credentials before any
    /// network call, [`PlataError::Api`] on rejection (wrong password,
    /// unconfirmed email), or a transport/decode error.
    #[tracing::instrument(skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        validate_email(email)?;
        validate_password(password)?;
        let url = format!("{}{AUTH_PATH}/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = Self::handle_response(response).await?;
        let session = Session::new(auth.user.id, auth.access_token);
        self.store_session(Some(session.clone()))?;
        tracing::debug!(user = %session.user, "signed in");
        Ok(session)
    }

    /// Registers a new account. Sign-in happens separately, after the
    /// provider's email confirmation if one is configured.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input before any
    /// network call, or [`PlataError::Api`] on rejection (e.g. the
    /// email is already registered).
    #[tracing::instrument(skip_all)]
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<()> {
        validate_email(email)?;
        validate_password(password)?;
        validate_display_name(display_name)?;
        let url = format!("{}{AUTH_PATH}/signup", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "email": email.trim(),
                "password": password,
                "data": { "display_name": display_name.trim() },
            }))
            .send()
            .await?;
        Self::handle_status(response).await
    }

    /// Signs out, revoking the token server-side and dropping the
    /// session from the client.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if not signed in, or an API or
    /// transport error; the local session is kept on failure.
    #[tracing::instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<()> {
        let token = self.bearer()?;
        let url = format!("{}{AUTH_PATH}/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        Self::handle_status(response).await?;
        self.store_session(None)
    }

    /// Requests a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email, or an API or
    /// transport error.
    #[tracing::instrument(skip_all)]
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        validate_email(email)?;
        let url = format!("{}{AUTH_PATH}/recover", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "email": email.trim() }))
            .send()
            .await?;
        Self::handle_status(response).await
    }

    /// Changes the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed password,
    /// [`PlataError::NoSession`] if not signed in, or an API or
    /// transport error.
    #[tracing::instrument(skip_all)]
    pub async fn update_password(&self, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let token = self.bearer()?;
        let url = format!("{}{AUTH_PATH}/user", self.base_url);
        let response = self
            .http
            .put(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await?;
        Self::handle_status(response).await
    }

    // ── Object storage ──────────────────────────────────────────────

    /// Uploads (or replaces) the signed-in user's avatar at the stable
    /// per-user object path.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if not signed in, or an API or
    /// transport error.
    #[tracing::instrument(skip_all)]
    pub async fn upload_avatar(
        &self,
        user: &UserId,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let token = self.bearer()?;
        let url = format!(
            "{}{STORAGE_PATH}/object/{AVATAR_BUCKET}/{user}/avatar.png",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::handle_status(response).await
    }

    /// Returns a time-limited display URL for the user's avatar.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if not signed in, an API error
    /// (e.g. no avatar uploaded yet), or a transport/decode error.
    #[tracing::instrument(skip_all)]
    pub async fn signed_avatar_url(&self, user: &UserId, expires_in_secs: u32) -> Result<Url> {
        let token = self.bearer()?;
        let url = format!(
            "{}{STORAGE_PATH}/object/sign/{AVATAR_BUCKET}/{user}/avatar.png",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
            .send()
            .await?;
        let signed: SignedUrlResponse = Self::handle_response(response).await?;
        let full = format!("{}{STORAGE_PATH}{}", self.base_url, signed.signed_url);
        Url::parse(&full).map_err(|err| PlataError::State(err.to_string()))
    }

    // ── Account deletion ────────────────────────────────────────────

    /// Deletes the signed-in user's account.
    ///
    /// The server-side function fans out across storage, tables,
    /// profile, and finally the auth identity; the client only triggers
    /// it. On success the local session is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if not signed in, or an API or
    /// transport error; the local session is kept on failure.
    #[tracing::instrument(skip_all)]
    pub async fn delete_account(&self) -> Result<()> {
        let token = self.bearer()?;
        let url = format!("{}{FUNCTIONS_PATH}/delete-account", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        Self::handle_status(response).await?;
        self.store_session(None)
    }

    // ── Plumbing ────────────────────────────────────────────────────

    /// Replaces the stored session.
    fn store_session(&self, session: Option<Session>) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?;
        *guard = session;
        Ok(())
    }

    /// Returns the current bearer token as an owned string.
    fn bearer(&self) -> Result<String> {
        let guard = self
            .session
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?;
        guard
            .as_ref()
            .map(|session| session.access_token.expose_secret().to_owned())
            .ok_or(PlataError::NoSession)
    }

    /// Sends an authenticated GET against a REST table and decodes the
    /// row array.
    async fn get_rows<T: serde::de::DeserializeOwned>(&self, query: &str) -> Result<Vec<T>> {
        let token = self.bearer()?;
        let url = format!("{}{REST_PATH}/{query}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Inserts one row and returns the stored representation.
    async fn insert_row<Req: serde::Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        body: &Req,
    ) -> Result<T> {
        let token = self.bearer()?;
        let url = format!("{}{REST_PATH}/{table}", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let mut rows: Vec<T> = Self::handle_response(response).await?;
        if rows.is_empty() {
            return Err(PlataError::State("insert returned no rows".to_owned()));
        }
        Ok(rows.swap_remove(0))
    }

    /// Handles a response where only the status matters.
    async fn handle_status(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            Err(PlataError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Handles a response, checking status and deserializing the body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(PlataError::from)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            Err(PlataError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl RecordStore for ApiClient {
    fn fetch_transactions(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        async move {
            self.get_rows(&format!(
                "{TRANSACTIONS_TABLE}?user_id=eq.{user}&select=*&order=date.desc"
            ))
            .await
        }
    }

    fn insert_transaction(
        &self,
        user: &UserId,
        new: NewTransaction,
    ) -> impl Future<Output = Result<Transaction>> + Send {
        async move {
            self.insert_row(TRANSACTIONS_TABLE, &NewTransactionRow { user_id: user, row: &new })
                .await
        }
    }

    fn update_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> impl Future<Output = Result<Transaction>> + Send {
        async move {
            let token = self.bearer()?;
            let url = format!(
                "{}{REST_PATH}/{TRANSACTIONS_TABLE}?id=eq.{id}&user_id=eq.{user}",
                self.base_url
            );
            let response = self
                .http
                .patch(&url)
                .header("apikey", &self.api_key)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header("Prefer", "return=representation")
                .json(&patch)
                .send()
                .await?;
            let mut rows: Vec<Transaction> = Self::handle_response(response).await?;
            if rows.is_empty() {
                return Err(PlataError::Api {
                    status: 404,
                    message: format!("transaction {id} not found"),
                });
            }
            Ok(rows.swap_remove(0))
        }
    }

    fn delete_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let token = self.bearer()?;
            let url = format!(
                "{}{REST_PATH}/{TRANSACTIONS_TABLE}?id=eq.{id}&user_id=eq.{user}",
                self.base_url
            );
            let response = self
                .http
                .delete(&url)
                .header("apikey", &self.api_key)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .send()
                .await?;
            Self::handle_status(response).await
        }
    }

    fn fetch_categories(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send {
        async move {
            self.get_rows(&format!("{CATEGORIES_TABLE}?user_id=eq.{user}&select=*"))
                .await
        }
    }

    fn insert_category(
        &self,
        user: &UserId,
        new: NewCategory,
    ) -> impl Future<Output = Result<Category>> + Send {
        async move {
            self.insert_row(CATEGORIES_TABLE, &NewCategoryRow { user_id: user, row: &new })
                .await
        }
    }

    fn delete_category(
        &self,
        user: &UserId,
        id: &CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let token = self.bearer()?;
            let url = format!(
                "{}{REST_PATH}/{CATEGORIES_TABLE}?id=eq.{id}&user_id=eq.{user}",
                self.base_url
            );
            let response = self
                .http
                .delete(&url)
                .header("apikey", &self.api_key)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .send()
                .await?;
            Self::handle_status(response).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "test-api-key";

    async fn signed_in_client(server: &MockServer) -> ApiClient {
        let client = ApiClient::builder()
            .base_url(server.uri())
            .api_key(API_KEY)
            .build()
            .unwrap();
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "session-token",
                "user": { "id": "u-1" },
            })))
            .mount(server)
            .await;
        let _session = client.sign_in("ana@example.com", "password1").await.unwrap();
        client
    }

    #[test]
    fn builder_requires_base_url_and_key() {
        assert!(ApiClient::builder().build().is_err());
        assert!(ApiClient::builder().base_url("http://localhost").build().is_err());
        assert!(
            ApiClient::builder()
                .base_url("http://localhost/")
                .api_key(API_KEY)
                .build()
                .is_ok()
        );
    }

    #[tokio::test]
    async fn sign_in_stores_session() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        let session = client.session().unwrap().unwrap();
        assert_eq!(session.user, UserId::from("u-1"));
    }

    #[tokio::test]
    async fn sign_in_rejects_malformed_email_before_any_request() {
        let server = MockServer::start().await;
        let client = ApiClient::builder()
            .base_url(server.uri())
            .api_key(API_KEY)
            .build()
            .unwrap();
        let result = client.sign_in("not-an-email", "password1").await;
        assert!(matches!(result, Err(PlataError::Validation(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_an_api_error() {
        let server = MockServer::start().await;
        let client = ApiClient::builder()
            .base_url(server.uri())
            .api_key(API_KEY)
            .build()
            .unwrap();
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;
        let result = client.sign_in("ana@example.com", "password1").await;
        assert!(matches!(result, Err(PlataError::Api { status: 400, .. })));
        assert!(client.session().unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_transactions_scopes_by_user_and_decodes_rows() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/transactions"))
            .and(query_param("user_id", "eq.u-1"))
            .and(header("apikey", API_KEY))
            .and(header("authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "t-1",
                    "type": "expense",
                    "amount": 450000.0,
                    "description": "Mercado",
                    "category": "Casa",
                    "date": "2025-01-14",
                    "is_pending": false,
                    "linked_income_ids": null,
                },
            ])))
            .mount(&server)
            .await;

        let rows = client.fetch_transactions(&UserId::from("u-1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, TransactionId::from("t-1"));
        assert!(rows[0].linked_income_ids.is_empty());
    }

    #[tokio::test]
    async fn insert_returns_stored_representation() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/transactions"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
                {
                    "id": "t-9",
                    "type": "income",
                    "amount": 1000000.0,
                    "description": "Salario",
                    "category": "Sueldo",
                    "date": "2025-01-15",
                    "is_pending": false,
                    "linked_income_ids": [],
                },
            ])))
            .mount(&server)
            .await;

        let created = client
            .insert_transaction(
                &UserId::from("u-1"),
                NewTransaction {
                    kind: crate::models::TransactionKind::Income,
                    amount: 1_000_000.0,
                    description: "Salario".to_owned(),
                    category: "Sueldo".to_owned(),
                    date: "2025-01-15".parse().unwrap(),
                    is_pending: false,
                    linked_income_ids: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, TransactionId::from("t-9"));
    }

    #[tokio::test]
    async fn update_matching_no_rows_is_not_found() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let result = client
            .update_transaction(
                &UserId::from("u-1"),
                &TransactionId::from("missing"),
                TransactionPatch::new().is_pending(true),
            )
            .await;
        assert!(matches!(result, Err(PlataError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn record_calls_without_session_fail_fast() {
        let server = MockServer::start().await;
        let client = ApiClient::builder()
            .base_url(server.uri())
            .api_key(API_KEY)
            .build()
            .unwrap();
        let result = client.fetch_transactions(&UserId::from("u-1")).await;
        assert!(matches!(result, Err(PlataError::NoSession)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_account_posts_function_and_drops_session() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/delete-account"))
            .and(header("authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        client.delete_account().await.unwrap();
        assert!(client.session().unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_sign_out_keeps_session() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client.sign_out().await;
        assert!(matches!(result, Err(PlataError::Api { status: 500, .. })));
        assert!(client.session().unwrap().is_some());
    }

    #[tokio::test]
    async fn signed_avatar_url_joins_storage_path() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/sign/avatars/u-1/avatar.png"))
            .and(body_json_string(r#"{"expiresIn":3600}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "signedURL": "/object/sign/avatars/u-1/avatar.png?token=abc",
            })))
            .mount(&server)
            .await;

        let url = client
            .signed_avatar_url(&UserId::from("u-1"), 3600)
            .await
            .unwrap();
        assert!(url.path().ends_with("/object/sign/avatars/u-1/avatar.png"));
        assert_eq!(url.query(), Some("token=abc"));
    }

    #[tokio::test]
    async fn upload_avatar_uses_stable_object_path() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/avatars/u-1/avatar.png"))
            .and(header("x-upsert", "true"))
            .and(header("content-type", "image/png"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        client
            .upload_avatar(&UserId::from("u-1"), vec![0x89, 0x50], "image/png")
            .await
            .unwrap();
    }
}
