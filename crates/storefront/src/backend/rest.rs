//! HTTP client for the hosted marketplace backend.
//!
//! # API Reference
//!
//! - Tables: `{root}/rest/v1/{table}` with PostgREST filters (see [`TableQuery`])
//! - Auth: `{root}/auth/v1/{token,signup,logout}` (GoTrue-compatible)
//! - Authentication: `apikey: <anon key>` on every request, plus
//!   `Authorization: Bearer <access token>` once signed in (the anon key
//!   otherwise)
//!
//! No retries and no client-side timeouts; failures surface to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{ACCEPT, CONTENT_RANGE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

use bazaar_core::{CartLineId, Email, ProductId, Role, UserId, WishlistEntryId};

use super::query::{Direction, TableQuery};
use super::{
    AuthGateway, AuthSession, AuthUser, BackendError, CartRepository, IdentityRepository,
    OrderRepository, ProductRepository, WITH_PRODUCT, WishlistRepository, tables,
};
use crate::config::BackendConfig;
use crate::models::{
    CartLineRow, Identity, NewCartLine, NewIdentity, NewWishlistEntry, Order, OrderTotals,
    Product, ProductFilter, WishlistRow,
};
use crate::stores::auth::AuthError;

/// Ask the table API to echo written rows back.
const PREFER_REPRESENTATION: &str = "return=representation";

/// Ask the table API for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Ask the table API for an exact row count in `Content-Range`.
const PREFER_COUNT: &str = "count=exact";

/// Client for the hosted table and auth APIs.
///
/// Holds the current auth session; cloning shares it.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    session: RwLock<Option<AuthSession>>,
}

impl RestBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(config.expose_anon_key())
            .map_err(|e| BackendError::Parse(format!("Invalid API key format: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestBackendInner {
                client,
                base_url: config.url.clone(),
                anon_key: config.anon_key.clone(),
                session: RwLock::new(None),
            }),
        })
    }

    /// Adopt a session obtained elsewhere (e.g. persisted by the caller).
    pub async fn restore_session(&self, session: AuthSession) {
        *self.inner.session.write().await = Some(session);
    }

    /// Bearer token for table requests: the session token, else the anon key.
    async fn bearer(&self) -> String {
        let guard = self.inner.session.read().await;
        bearer_token(guard.as_ref(), &self.inner.anon_key, Utc::now())
    }

    fn auth_url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(&format!("auth/v1/{path}"))?)
    }

    // =========================================================================
    // Table Requests
    // =========================================================================

    /// Execute a read and parse the row array.
    async fn select<T: DeserializeOwned>(&self, query: &TableQuery) -> Result<Vec<T>, BackendError> {
        let url = query.url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a read expected to match at most one row.
    async fn select_optional<T: DeserializeOwned>(
        &self,
        query: &TableQuery,
    ) -> Result<Option<T>, BackendError> {
        let rows: Vec<T> = self.select(query).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored, shaped by `select`.
    async fn insert_one<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &'static str,
        body: &B,
        select: &str,
    ) -> Result<T, BackendError> {
        let url = TableQuery::new(table)
            .select(select)
            .url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.bearer().await)
            .header("Prefer", PREFER_REPRESENTATION)
            .header(ACCEPT, SINGLE_OBJECT)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Patch every row matched by `query`.
    async fn update<B: Serialize + Sync>(
        &self,
        query: &TableQuery,
        body: &B,
    ) -> Result<(), BackendError> {
        let url = query.url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .patch(url)
            .bearer_auth(self.bearer().await)
            .json(body)
            .send()
            .await?;
        expect_success(response).await
    }

    /// Count the rows matched by `query` without downloading them.
    ///
    /// Sends `HEAD` with `Prefer: count=exact` and reads the total from
    /// `Content-Range`.
    async fn count(&self, query: &TableQuery) -> Result<usize, BackendError> {
        let url = query.url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .head(url)
            .bearer_auth(self.bearer().await)
            .header("Prefer", PREFER_COUNT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BackendError::Parse("Missing Content-Range header".to_string()))?;
        content_range_total(range)
            .ok_or_else(|| BackendError::Parse(format!("Invalid Content-Range: {range}")))
    }

    /// Delete every row matched by `query`.
    async fn delete(&self, query: &TableQuery) -> Result<(), BackendError> {
        let url = query.url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        expect_success(response).await
    }

    // =========================================================================
    // Auth Requests
    // =========================================================================

    async fn auth_post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.inner.client.post(url).json(body).send().await.map_err(BackendError::from)?;

        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuthError::Backend(BackendError::Parse(format!("Failed to parse auth response: {e}"))));
        }

        Err(parse_auth_error(response).await)
    }

    async fn store_session(&self, token: TokenResponse) -> AuthSession {
        let session = token.into_session(Utc::now());
        *self.inner.session.write().await = Some(session.clone());
        session
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| BackendError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Discard a successful body, or turn a failure into an error.
async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
    if response.status().is_success() {
        return Ok(());
    }

    Err(parse_error(response).await)
}

/// Error body returned by the table API.
#[derive(Debug, Default, Deserialize)]
struct TableErrorBody {
    message: Option<String>,
    details: Option<String>,
}

/// Parse error response from the table API.
async fn parse_error(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();

    if status == 429 {
        return BackendError::RateLimited(retry_after(&response));
    }

    if status == 401 || status == 403 {
        return BackendError::Unauthorized;
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<TableErrorBody>(&body)
        .ok()
        .and_then(|parsed| match (parsed.message, parsed.details) {
            (Some(message), Some(details)) => Some(format!("{message} ({details})")),
            (message, details) => message.or(details),
        })
        .unwrap_or(body);

    if status == 404 {
        return BackendError::NotFound(message);
    }

    BackendError::Api { status, message }
}

/// Total from a `Content-Range` value such as `0-24/3573` or `*/0`.
fn content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// The session token while it is live, else the anon key.
fn bearer_token(session: Option<&AuthSession>, anon_key: &SecretString, now: DateTime<Utc>) -> String {
    match session {
        Some(session) if !session.is_expired(now) => session.access_token.expose_secret().to_string(),
        _ => anon_key.expose_secret().to_string(),
    }
}

fn retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}

// =============================================================================
// Auth Payloads
// =============================================================================

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUserPayload {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl From<AuthUserPayload> for AuthUser {
    fn from(user: AuthUserPayload) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUserPayload,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        AuthSession {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Sign-up answers with a session when email confirmation is off, and with
/// the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUserPayload),
}

/// Error body returned by the auth API (both legacy and current shapes).
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl AuthErrorBody {
    fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }

    fn text(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
    }
}

async fn parse_auth_error(response: reqwest::Response) -> AuthError {
    let status = response.status().as_u16();

    if status == 429 {
        return AuthError::Backend(BackendError::RateLimited(retry_after(&response)));
    }

    let raw = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<AuthErrorBody>(&raw).unwrap_or_default();
    classify_auth_error(status, &body, &raw)
}

fn classify_auth_error(status: u16, body: &AuthErrorBody, raw: &str) -> AuthError {
    match body.code() {
        Some("invalid_credentials" | "invalid_grant") => return AuthError::InvalidCredentials,
        Some("user_already_exists" | "email_exists") => return AuthError::UserAlreadyExists,
        Some("weak_password") => {
            return AuthError::WeakPassword(body.text().unwrap_or("password too weak").to_string());
        }
        _ => {}
    }

    if body
        .text()
        .is_some_and(|text| text.to_lowercase().contains("already registered"))
    {
        return AuthError::UserAlreadyExists;
    }

    if status == 401 || status == 403 {
        return AuthError::Backend(BackendError::Unauthorized);
    }

    AuthError::Backend(BackendError::Api {
        status,
        message: body.text().unwrap_or(raw).to_string(),
    })
}

// =============================================================================
// Trait Implementations
// =============================================================================

#[async_trait]
impl AuthGateway for RestBackend {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let token: TokenResponse = self
            .auth_post(
                url,
                &PasswordCredentials {
                    email: email.as_str(),
                    password: password.expose_secret(),
                },
            )
            .await?;

        let session = self.store_session(token).await;
        debug!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError> {
        let url = self.auth_url("signup")?;

        let response: SignUpResponse = self
            .auth_post(
                url,
                &PasswordCredentials {
                    email: email.as_str(),
                    password: password.expose_secret(),
                },
            )
            .await?;

        let user = match response {
            SignUpResponse::Session(token) => self.store_session(token).await.user,
            SignUpResponse::User(user) => {
                debug!("Sign-up pending email confirmation; no session issued");
                user.into()
            }
        };
        Ok(user)
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, BackendError> {
        let now = Utc::now();
        let mut guard = self.inner.session.write().await;
        if guard.as_ref().is_some_and(|session| session.is_expired(now)) {
            debug!("Dropping expired session");
            *guard = None;
        }
        Ok(guard.clone())
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(session) = self.inner.session.write().await.take() else {
            return Ok(());
        };

        let response = self
            .inner
            .client
            .post(self.auth_url("logout")?)
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await?;
        expect_success(response).await
    }
}

#[derive(Deserialize)]
struct RoleRow {
    role: Role,
}

#[derive(Serialize)]
struct QuantityPatch {
    quantity: u32,
}

#[async_trait]
impl IdentityRepository for RestBackend {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_identity(&self, id: UserId) -> Result<Option<Identity>, BackendError> {
        self.select_optional(&TableQuery::new(tables::USERS).select("*").eq("id", id))
            .await
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn insert_identity(&self, identity: &NewIdentity) -> Result<Identity, BackendError> {
        self.insert_one(tables::USERS, identity, "*").await
    }

    async fn list_roles(&self) -> Result<Vec<Role>, BackendError> {
        let rows: Vec<RoleRow> = self
            .select(&TableQuery::new(tables::USERS).select("role"))
            .await?;
        Ok(rows.into_iter().map(|row| row.role).collect())
    }
}

#[async_trait]
impl CartRepository for RestBackend {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLineRow>, BackendError> {
        self.select(
            &TableQuery::new(tables::CART_ITEMS)
                .select(WITH_PRODUCT)
                .eq("user_id", user_id),
        )
        .await
    }

    #[instrument(skip(self, line), fields(product_id = %line.product_id))]
    async fn insert_line(&self, line: &NewCartLine) -> Result<CartLineRow, BackendError> {
        self.insert_one(tables::CART_ITEMS, line, WITH_PRODUCT).await
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.update(
            &TableQuery::new(tables::CART_ITEMS).eq("id", line_id),
            &QuantityPatch { quantity },
        )
        .await
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn delete_line(&self, line_id: CartLineId) -> Result<(), BackendError> {
        self.delete(&TableQuery::new(tables::CART_ITEMS).eq("id", line_id))
            .await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete_lines_for(&self, user_id: UserId) -> Result<(), BackendError> {
        self.delete(&TableQuery::new(tables::CART_ITEMS).eq("user_id", user_id))
            .await
    }
}

#[async_trait]
impl WishlistRepository for RestBackend {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<WishlistRow>, BackendError> {
        self.select(
            &TableQuery::new(tables::WISHLIST)
                .select(WITH_PRODUCT)
                .eq("user_id", user_id),
        )
        .await
    }

    #[instrument(skip(self, entry), fields(product_id = %entry.product_id))]
    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<WishlistRow, BackendError> {
        self.insert_one(tables::WISHLIST, entry, WITH_PRODUCT).await
    }

    #[instrument(skip(self), fields(entry_id = %entry_id))]
    async fn delete_entry(&self, entry_id: WishlistEntryId) -> Result<(), BackendError> {
        self.delete(&TableQuery::new(tables::WISHLIST).eq("id", entry_id))
            .await
    }
}

#[async_trait]
impl ProductRepository for RestBackend {
    #[instrument(skip(self))]
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, BackendError> {
        self.select(
            &TableQuery::new(tables::PRODUCTS)
                .select("*")
                .filtered(filter),
        )
        .await
    }

    #[instrument(skip(self), fields(seller_id = %seller_id))]
    async fn products_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, BackendError> {
        self.select(
            &TableQuery::new(tables::PRODUCTS)
                .select("*")
                .eq("seller_id", seller_id)
                .order("created_at", Direction::Desc),
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.select_optional(&TableQuery::new(tables::PRODUCTS).select("*").eq("id", id))
            .await
    }

    async fn count_products(&self) -> Result<usize, BackendError> {
        self.count(&TableQuery::new(tables::PRODUCTS).select("id"))
            .await
    }
}

#[async_trait]
impl OrderRepository for RestBackend {
    #[instrument(skip(self), fields(seller_id = %seller_id))]
    async fn recent_orders_for_seller(
        &self,
        seller_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, BackendError> {
        self.select(
            &TableQuery::new(tables::ORDERS)
                .select("*")
                .eq("seller_id", seller_id)
                .order("created_at", Direction::Desc)
                .limit(limit),
        )
        .await
    }

    async fn list_order_totals(&self) -> Result<Vec<OrderTotals>, BackendError> {
        self.select(&TableQuery::new(tables::ORDERS).select("total_amount,commission_amount"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(json: &str) -> AuthErrorBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classify_legacy_invalid_grant() {
        let err = classify_auth_error(
            400,
            &body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "",
        );
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_classify_error_codes() {
        let err = classify_auth_error(
            422,
            &body(r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#),
            "",
        );
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let err = classify_auth_error(
            422,
            &body(r#"{"code":422,"error_code":"weak_password","msg":"Password should be at least 6 characters."}"#),
            "",
        );
        assert!(matches!(err, AuthError::WeakPassword(msg) if msg.contains("6 characters")));
    }

    #[test]
    fn test_classify_already_registered_message_without_code() {
        let err = classify_auth_error(400, &body(r#"{"msg":"User already registered"}"#), "");
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[test]
    fn test_classify_unknown_falls_back_to_api_error() {
        let err = classify_auth_error(500, &AuthErrorBody::default(), "upstream down");
        assert!(matches!(
            err,
            AuthError::Backend(BackendError::Api { status: 500, ref message }) if message == "upstream down"
        ));
    }

    #[test]
    fn test_token_response_expiry_prefers_absolute() {
        let now = Utc::now();
        let token: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "expires_at": 4102444800,
                "user": {"id": "5b0f3b56-2f1c-4d8e-9f57-0c9b7f0d1e2a", "email": "a@b.co"}
            }"#,
        )
        .unwrap();

        let session = token.into_session(now);
        assert_eq!(session.expires_at.unwrap().timestamp(), 4_102_444_800);
        assert_eq!(session.user.email.as_deref(), Some("a@b.co"));
        assert_eq!(session.access_token.expose_secret(), "at");
    }

    #[test]
    fn test_token_response_expiry_from_relative() {
        let now = Utc::now();
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token": "at", "expires_in": 60,
                "user": {"id": "5b0f3b56-2f1c-4d8e-9f57-0c9b7f0d1e2a"}}"#,
        )
        .unwrap();

        let session = token.into_session(now);
        assert_eq!(session.expires_at, Some(now + Duration::seconds(60)));
        assert!(session.refresh_token.is_none());
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let pending: SignUpResponse =
            serde_json::from_str(r#"{"id": "5b0f3b56-2f1c-4d8e-9f57-0c9b7f0d1e2a", "email": "a@b.co"}"#)
                .unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));

        let confirmed: SignUpResponse = serde_json::from_str(
            r#"{"access_token": "at", "user": {"id": "5b0f3b56-2f1c-4d8e-9f57-0c9b7f0d1e2a"}}"#,
        )
        .unwrap();
        assert!(matches!(confirmed, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_new_client_and_auth_url() {
        let config = BackendConfig {
            url: Url::parse("https://abc.backend.co/").unwrap(),
            anon_key: SecretString::from("sb_publishable_4kQ9zT2mV7wX1pL8nR3cY6bH0dJ5fG"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let backend = RestBackend::new(&config).unwrap();
        assert_eq!(
            backend.auth_url("signup").unwrap().as_str(),
            "https://abc.backend.co/auth/v1/signup"
        );
        assert!(!format!("{backend:?}").contains("sb_publishable"));
    }

    #[tokio::test]
    async fn test_current_session_drops_expired() {
        let config = BackendConfig {
            url: Url::parse("https://abc.backend.co/").unwrap(),
            anon_key: SecretString::from("sb_publishable_4kQ9zT2mV7wX1pL8nR3cY6bH0dJ5fG"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let backend = RestBackend::new(&config).unwrap();
        assert!(backend.current_session().await.unwrap().is_none());

        backend
            .restore_session(AuthSession {
                access_token: SecretString::from("expired"),
                refresh_token: None,
                expires_at: Some(Utc::now() - Duration::minutes(5)),
                user: AuthUser {
                    id: UserId::random(),
                    email: None,
                },
            })
            .await;

        assert!(backend.current_session().await.unwrap().is_none());
        assert_eq!(
            backend.bearer().await,
            "sb_publishable_4kQ9zT2mV7wX1pL8nR3cY6bH0dJ5fG"
        );
    }

    fn session_expiring_at(expires_at: DateTime<Utc>) -> AuthSession {
        AuthSession {
            access_token: SecretString::from("user-token"),
            refresh_token: None,
            expires_at: Some(expires_at),
            user: AuthUser {
                id: UserId::random(),
                email: None,
            },
        }
    }

    #[test]
    fn test_bearer_token_falls_back_after_expiry() {
        let anon = SecretString::from("anon");
        let now = Utc::now();

        let live = session_expiring_at(now + Duration::minutes(5));
        assert_eq!(bearer_token(Some(&live), &anon, now), "user-token");

        let stale = session_expiring_at(now - Duration::minutes(5));
        assert_eq!(bearer_token(Some(&stale), &anon, now), "anon");
        assert_eq!(bearer_token(None, &anon, now), "anon");
    }

    #[tokio::test]
    async fn test_table_bearer_ignores_expired_session() {
        let config = BackendConfig {
            url: Url::parse("https://abc.backend.co/").unwrap(),
            anon_key: SecretString::from("sb_publishable_4kQ9zT2mV7wX1pL8nR3cY6bH0dJ5fG"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let backend = RestBackend::new(&config).unwrap();
        backend
            .restore_session(session_expiring_at(Utc::now() - Duration::minutes(1)))
            .await;

        // No current_session() call in between.
        assert_eq!(
            backend.bearer().await,
            "sb_publishable_4kQ9zT2mV7wX1pL8nR3cY6bH0dJ5fG"
        );
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(content_range_total("0-24/3573"), Some(3573));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-9/*"), None);
        assert_eq!(content_range_total("garbage"), None);
    }
}
