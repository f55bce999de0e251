//! Typed HTTP client for the Emerald API.
//!
//! One method per route. Authenticated calls attach the bearer token set
//! with [`ApiClient::set_token`]; the forum data loads accept a
//! [`CancellationToken`] so a superseded view can drop a stale response.

use std::future::Future;
use std::sync::RwLock;

use emerald_core::permissions::ForumPermissions;
use emerald_core::types::{DbId, Timestamp};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub id: DbId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
    pub last_login: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdated {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub order_position: i32,
    #[serde(default)]
    pub thread_count: i64,
    #[serde(default)]
    pub post_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Thread as listed or fetched; `username` is absent on freshly created
/// threads.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: DbId,
    pub category_id: DbId,
    pub user_id: DbId,
    #[serde(default)]
    pub username: Option<String>,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub views: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: DbId,
    pub thread_id: DbId,
    pub user_id: DbId,
    #[serde(default)]
    pub username: Option<String>,
    pub content: String,
    pub is_edited: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadDetail {
    pub thread: Thread,
    pub posts: Vec<Post>,
}

/// Partial thread edit. `None` fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistApplication {
    pub name: String,
    pub discord_id: String,
    pub steam_id: String,
    pub age: String,
    pub rp_experience: String,
    pub motivation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeCheck {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Success {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct Valid {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: DbId,
}

/// Error body produced by the API: `{ "error": ..., "code": ... }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the bearer token sent with authenticated calls.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    // ---- auth ----

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthResponse> {
        let body = serde_json::json!({ "username": username, "email": email, "password": password });
        self.send(self.request(Method::POST, "/auth/register").json(&body))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(self.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    // ---- password reset ----

    pub async fn request_password_reset(&self, email: &str) -> ClientResult<Message> {
        let body = serde_json::json!({ "email": email });
        self.send(self.request(Method::POST, "/password-reset/request").json(&body))
            .await
    }

    pub async fn verify_reset_code(&self, email: &str, code: &str) -> ClientResult<CodeCheck> {
        let body = serde_json::json!({ "email": email, "code": code });
        self.send(self.request(Method::POST, "/password-reset/verify-code").json(&body))
            .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> ClientResult<Message> {
        let body = serde_json::json!({ "email": email, "code": code, "newPassword": new_password });
        self.send(self.request(Method::POST, "/password-reset/reset").json(&body))
            .await
    }

    // ---- forum reads ----

    pub async fn categories(&self, cancel: &CancellationToken) -> ClientResult<Vec<Category>> {
        cancellable(cancel, self.send(self.request(Method::GET, "/forum/categories"))).await
    }

    pub async fn threads(
        &self,
        category_id: DbId,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<Thread>> {
        let path = format!("/forum/categories/{category_id}/threads");
        cancellable(cancel, self.send(self.request(Method::GET, &path))).await
    }

    pub async fn thread(
        &self,
        thread_id: DbId,
        cancel: &CancellationToken,
    ) -> ClientResult<ThreadDetail> {
        let path = format!("/forum/threads/{thread_id}");
        cancellable(cancel, self.send(self.request(Method::GET, &path))).await
    }

    pub async fn posts(&self, thread_id: DbId, cancel: &CancellationToken) -> ClientResult<Vec<Post>> {
        let path = format!("/forum/threads/{thread_id}/posts");
        cancellable(cancel, self.send(self.request(Method::GET, &path))).await
    }

    // ---- forum writes ----

    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
        order: i32,
    ) -> ClientResult<Category> {
        let body = serde_json::json!({ "name": name, "description": description, "order": order });
        self.send(self.authed(Method::POST, "/forum/categories")?.json(&body))
            .await
    }

    pub async fn create_thread(
        &self,
        category_id: DbId,
        title: &str,
        content: &str,
    ) -> ClientResult<Thread> {
        let body =
            serde_json::json!({ "categoryId": category_id, "title": title, "content": content });
        self.send(self.authed(Method::POST, "/forum/threads")?.json(&body))
            .await
    }

    pub async fn update_thread(&self, thread_id: DbId, update: &ThreadUpdate) -> ClientResult<bool> {
        let path = format!("/forum/threads/{thread_id}");
        let ok: Success = self
            .send(self.authed(Method::PATCH, &path)?.json(update))
            .await?;
        Ok(ok.success)
    }

    pub async fn create_post(&self, thread_id: DbId, content: &str) -> ClientResult<Post> {
        let body = serde_json::json!({ "threadId": thread_id, "content": content });
        self.send(self.authed(Method::POST, "/forum/posts")?.json(&body))
            .await
    }

    pub async fn update_post(&self, post_id: DbId, content: &str) -> ClientResult<bool> {
        let path = format!("/forum/posts/{post_id}");
        let body = serde_json::json!({ "content": content });
        let ok: Success = self
            .send(self.authed(Method::PATCH, &path)?.json(&body))
            .await?;
        Ok(ok.success)
    }

    pub async fn permissions(&self, user_id: DbId) -> ClientResult<ForumPermissions> {
        let path = format!("/forum/users/{user_id}/permissions");
        self.send(self.authed(Method::GET, &path)?).await
    }

    // ---- users ----

    pub async fn update_profile(
        &self,
        user_id: DbId,
        update: &ProfileUpdate,
    ) -> ClientResult<ProfileUpdated> {
        let path = format!("/users/{user_id}");
        self.send(self.authed(Method::PUT, &path)?.json(update))
            .await
    }

    pub async fn change_password(
        &self,
        user_id: DbId,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<Message> {
        let path = format!("/users/{user_id}/password");
        let body = serde_json::json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        self.send(self.authed(Method::PUT, &path)?.json(&body))
            .await
    }

    pub async fn validate_password(&self, user_id: DbId, password: &str) -> ClientResult<bool> {
        let path = format!("/users/{user_id}/validate-password");
        let body = serde_json::json!({ "password": password });
        let valid: Valid = self
            .send(self.authed(Method::POST, &path)?.json(&body))
            .await?;
        Ok(valid.valid)
    }

    // ---- whitelist ----

    /// Submit an application, returning its id.
    pub async fn apply_for_whitelist(&self, application: &WhitelistApplication) -> ClientResult<DbId> {
        let created: Created = self
            .send(self.request(Method::POST, "/whitelist/apply").json(application))
            .await?;
        Ok(created.id)
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn a non-2xx response into [`ClientError::Server`], preferring the
/// server's own error message.
async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    tracing::debug!(status = %status, %message, "API request failed");
    Err(ClientError::Server { status, message })
}

/// Race `fut` against `cancel`. Cancellation wins ties so an already
/// cancelled load never applies its response.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = ClientResult<T>>,
) -> ClientResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}
