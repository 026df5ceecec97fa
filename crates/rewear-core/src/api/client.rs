//! API client for communicating with the ReWear REST backend.
//!
//! Every call goes through `ApiClient::send`, which attaches the default
//! JSON headers and the stored bearer token, then decodes the response into
//! a typed value or an `ApiError`. The client has no side effects beyond
//! the network call: it never retries and never touches the session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, ApiResult};
use crate::auth::TokenStore;
use crate::config::Config;
use crate::models::envelope::{ItemEnvelope, RatingEnvelope, TransactionEnvelope, UploadEnvelope};
use crate::models::{
    ImageUpload, Item, ItemFilters, ItemUpdate, LoginRequest, LoginResponse, MessageResponse,
    NewItem, Page, ProfileUpdate, PurchaseRequest, PurchaseResponse, Rating, RatingsPage,
    SignupRequest, SignupResponse, SwapAction, SwapRequest, Transaction, UploadedImage, User,
    MAX_UPLOAD_IMAGES,
};

// ============================================================================
// Constants
// ============================================================================

/// Error text when a failure body carries no usable message
const REQUEST_FALLBACK: &str = "Request failed";

/// Error text when an upload failure body carries no usable message
const UPLOAD_FALLBACK: &str = "Upload failed";

/// How a request is encoded and whether it carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Json,
    /// JSON without credentials, for login and signup
    Anonymous,
    Multipart,
}

#[derive(Debug, Serialize)]
struct StatusFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

/// API client for the ReWear backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client with the HTTP client's default timeouts
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        Self::with_timeout(base_url, tokens, None)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        Self::with_timeout(config.api_base_url(), tokens, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store this client reads credentials from
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Reject ids that would change the shape of the endpoint path.
    fn path_id(id: &str) -> ApiResult<&str> {
        let id = id.trim();
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(ApiError::InvalidRequest(format!("Invalid identifier: {:?}", id)));
        }
        Ok(id)
    }

    /// Default headers for a request, plus the access token attached as
    /// bearer, if any.
    fn default_headers(&self, kind: RequestKind) -> ApiResult<(HeaderMap, Option<String>)> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if kind != RequestKind::Multipart {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if kind == RequestKind::Anonymous {
            return Ok((headers, None));
        }

        let token = self.tokens.access_token().map_err(ApiError::Storage)?;
        let Some(token) = token else {
            return Ok((headers, None));
        };
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ApiError::InvalidRequest("Stored access token is not a valid header value".to_string())
        })?;
        headers.insert(header::AUTHORIZATION, value);
        Ok((headers, Some(token)))
    }

    async fn send<T, F>(
        &self,
        method: Method,
        endpoint: &str,
        kind: RequestKind,
        fallback: &str,
        build: F,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let (headers, sent_token) = self.default_headers(kind)?;
        debug!(%method, endpoint, authorized = sent_token.is_some(), "Sending request");

        let request = build(self.client.request(method, self.url(endpoint)).headers(headers));
        let response = request.send().await?;
        Self::decode(response, sent_token, fallback).await
    }

    /// Turn a response into a typed value.
    ///
    /// A 401 on a request that carried a token means that token's session
    /// is gone, whatever the body says. Everything else must be JSON; failures
    /// (non-2xx or `success: false`) carry a message from the body.
    async fn decode<T: DeserializeOwned>(
        response: Response,
        sent_token: Option<String>,
        fallback: &str,
    ) -> ApiResult<T> {
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "Response received");

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = sent_token {
                warn!("Request rejected with 401, session expired");
                return Err(ApiError::SessionExpired { token });
            }
        }

        let body: Value = serde_json::from_str(&text).map_err(ApiError::InvalidResponse)?;

        let rejected = body.get("success") == Some(&Value::Bool(false));
        if !status.is_success() || rejected {
            let err = ApiError::from_body(status, &body, fallback);
            debug!(status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }

        serde_json::from_value(body).map_err(ApiError::InvalidResponse)
    }

    /// Issue a JSON request against `endpoint` (relative to the base URL).
    ///
    /// `headers` are applied over the defaults, so callers can override
    /// `Content-Type` or `Authorization` for a single call.
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| {
            let req = match body {
                Some(body) => req.json(body),
                None => req,
            };
            req.headers(headers)
        })
        .await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send(Method::GET, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| req)
            .await
    }

    async fn get_with_query<T, Q>(&self, endpoint: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| {
            req.query(query)
        })
        .await
    }

    async fn post<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| {
            req.json(body)
        })
        .await
    }

    async fn put<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| {
            req.json(body)
        })
        .await
    }

    async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send(Method::DELETE, endpoint, RequestKind::Json, REQUEST_FALLBACK, |req| req)
            .await
    }

    // ===== Authentication =====

    /// Exchange credentials for a token pair and user snapshot.
    /// Storing the tokens is the session store's job.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest { email, password };
        self.send(Method::POST, "/auth/login/", RequestKind::Anonymous, REQUEST_FALLBACK, |req| {
            req.json(&body)
        })
        .await
    }

    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupResponse> {
        self.send(Method::POST, "/auth/signup/", RequestKind::Anonymous, REQUEST_FALLBACK, |req| {
            req.json(request)
        })
        .await
    }

    // ===== Users =====

    pub async fn current_user(&self) -> ApiResult<User> {
        self.get("/users/me/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        if update.is_empty() {
            return Err(ApiError::InvalidRequest("Nothing to update".to_string()));
        }
        self.put("/users/me/", update).await
    }

    pub async fn public_profile(&self, user_id: &str) -> ApiResult<User> {
        let user_id = Self::path_id(user_id)?;
        self.get(&format!("/users/{}/", user_id)).await
    }

    pub async fn user_ratings(&self, user_id: &str) -> ApiResult<RatingsPage> {
        let user_id = Self::path_id(user_id)?;
        self.get(&format!("/users/{}/ratings/", user_id)).await
    }

    pub async fn rate_user(
        &self,
        user_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> ApiResult<Rating> {
        let user_id = Self::path_id(user_id)?;
        if !Rating::is_valid_value(rating) {
            return Err(ApiError::InvalidRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        let body = serde_json::json!({ "rating": rating, "comment": comment });
        let envelope: RatingEnvelope = self.post(&format!("/users/{}/rate/", user_id), &body).await?;
        Ok(envelope.rating)
    }

    // ===== Items =====

    /// Browse available items. Results come back in the backend's order.
    pub async fn list_items(&self, filters: &ItemFilters) -> ApiResult<Page<Item>> {
        self.get_with_query("/items/", filters).await
    }

    pub async fn item(&self, item_id: &str) -> ApiResult<Item> {
        let item_id = Self::path_id(item_id)?;
        self.get(&format!("/items/{}/", item_id)).await
    }

    pub async fn create_item(&self, item: &NewItem) -> ApiResult<Item> {
        let envelope: ItemEnvelope = self.post("/items/", item).await?;
        Ok(envelope.item)
    }

    pub async fn update_item(&self, item_id: &str, update: &ItemUpdate) -> ApiResult<Item> {
        let item_id = Self::path_id(item_id)?;
        let envelope: ItemEnvelope = self.put(&format!("/items/{}/", item_id), update).await?;
        Ok(envelope.item)
    }

    pub async fn delete_item(&self, item_id: &str) -> ApiResult<MessageResponse> {
        let item_id = Self::path_id(item_id)?;
        self.delete(&format!("/items/{}/", item_id)).await
    }

    /// Items listed by the current user, optionally filtered by status
    pub async fn my_items(&self, status: Option<&str>) -> ApiResult<Page<Item>> {
        self.get_with_query("/users/me/items/", &StatusFilter { status })
            .await
    }

    pub async fn purchase_item(
        &self,
        item_id: &str,
        purchase: &PurchaseRequest,
    ) -> ApiResult<PurchaseResponse> {
        let item_id = Self::path_id(item_id)?;
        purchase.validate()?;
        self.post(&format!("/items/{}/purchase/", item_id), purchase)
            .await
    }

    // ===== Swaps =====

    pub async fn list_swaps(&self, status: Option<&str>) -> ApiResult<Page<Transaction>> {
        self.get_with_query("/swaps/", &StatusFilter { status }).await
    }

    pub async fn swap(&self, transaction_id: &str) -> ApiResult<Transaction> {
        let transaction_id = Self::path_id(transaction_id)?;
        self.get(&format!("/swaps/{}/", transaction_id)).await
    }

    pub async fn create_swap(&self, request: &SwapRequest) -> ApiResult<Transaction> {
        let envelope: TransactionEnvelope = self.post("/swaps/", request).await?;
        Ok(envelope.transaction)
    }

    pub async fn update_swap(
        &self,
        transaction_id: &str,
        action: SwapAction,
    ) -> ApiResult<MessageResponse> {
        let transaction_id = Self::path_id(transaction_id)?;
        let body = serde_json::json!({ "action": action });
        self.put(&format!("/swaps/{}/", transaction_id), &body).await
    }

    // ===== Uploads =====

    /// Upload images as multipart form data, one `images` part per file.
    pub async fn upload_images(&self, images: Vec<ImageUpload>) -> ApiResult<Vec<UploadedImage>> {
        if images.is_empty() {
            return Err(ApiError::InvalidRequest("No images to upload".to_string()));
        }
        if images.len() > MAX_UPLOAD_IMAGES {
            return Err(ApiError::InvalidRequest(format!(
                "At most {} images can be uploaded at once",
                MAX_UPLOAD_IMAGES
            )));
        }

        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)?;
            form = form.part("images", part);
        }

        let envelope: UploadEnvelope = self
            .send(Method::POST, "/upload/images/", RequestKind::Multipart, UPLOAD_FALLBACK, |req| {
                req.multipart(form)
            })
            .await?;
        Ok(envelope.images)
    }

    // ===== Misc =====

    /// The API root index, returned as raw JSON
    pub async fn api_root(&self) -> ApiResult<Value> {
        self.get("/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, StoredTokens};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_token(server: &MockServer, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(token) => MemoryTokenStore::with_tokens(StoredTokens::new(token, "refresh")),
            None => MemoryTokenStore::new(),
        };
        ApiClient::new(server.uri(), Arc::new(store)).expect("Failed to build client")
    }

    #[test]
    fn test_path_id() {
        assert_eq!(ApiClient::path_id(" abc-123 ").ok(), Some("abc-123"));
        assert!(ApiClient::path_id("").is_err());
        assert!(ApiClient::path_id("a/b").is_err());
        assert!(ApiClient::path_id("a?b=c").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/api/", Arc::new(MemoryTokenStore::new()))
            .expect("Failed to build client");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/items/"), "http://localhost:8000/api/items/");
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_json_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/"))
            .and(header("authorization", "Bearer t1"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "a@b.com", "points_balance": 25
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let user = client.current_user().await.expect("current user");
        assert_eq!(user.points_balance, 25);
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ReWear API"})))
            .mount(&server)
            .await;

        let client = client_with_token(&server, None);
        client.api_root().await.expect("api root");

        let requests = server.received_requests().await.expect("request recording enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_login_never_sends_stale_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .and(body_json(json!({"email": "a@b.com", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": {"access": "t1", "refresh": "t2"},
                "user": {"email": "a@b.com", "points_balance": 0}
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("stale"));
        let response = client.login("a@b.com", "x").await.expect("login");
        assert_eq!(response.token.access, "t1");

        let requests = server.received_requests().await.expect("request recording enabled");
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_list_items_sends_filters_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/"))
            .and(query_param("category", "Shoes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "count": 3,
                "results": [
                    {"item_id": "c", "title": "Sneakers", "points_value": 30},
                    {"item_id": "a", "title": "Boots", "points_value": 60},
                    {"item_id": "b", "title": "Sandals", "points_value": 15}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let filters = ItemFilters {
            category: Some("Shoes".to_string()),
            ..Default::default()
        };
        let page = client.list_items(&filters).await.expect("list items");

        let ids: Vec<&str> = page.results.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(page.count, 3);

        let requests = server.received_requests().await.expect("request recording enabled");
        assert_eq!(requests[0].url.query(), Some("category=Shoes"));
    }

    #[tokio::test]
    async fn test_list_items_without_filters_has_no_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "count": 0, "results": []})))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let page = client.list_items(&ItemFilters::default()).await.expect("list items");
        assert!(page.is_empty());

        let requests = server.received_requests().await.expect("request recording enabled");
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_error_message_priority_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "Failed to create item",
                "errors": {"title": ["This field is required."]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/swaps/missing/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let item = NewItem {
            title: String::new(),
            description: String::new(),
            category: "Tops".to_string(),
            item_type: "casual".to_string(),
            size: "M".to_string(),
            condition: "good".to_string(),
            brand: None,
            color: None,
            points_value: 10,
            tags: None,
            images: vec![],
        };
        let err = client.create_item(&item).await.expect_err("create should fail");
        assert_eq!(err.to_string(), "Failed to create item");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

        let err = client.swap("missing").await.expect_err("swap should fail");
        assert_eq!(err.to_string(), "Not found.");
    }

    #[tokio::test]
    async fn test_field_error_map_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signup/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": {"email": ["user with this email already exists."]}
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, None);
        let request = SignupRequest::new("Jane", "Doe", "jane@example.com", "pw", None);
        let err = client.signup(&request).await.expect_err("signup should fail");
        assert_eq!(
            err.to_string(),
            r#"{"email":["user with this email already exists."]}"#
        );
    }

    #[tokio::test]
    async fn test_401_with_token_is_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Given token not valid for any token type"
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("expired"));
        let err = client.current_user().await.expect_err("should be rejected");
        assert!(err.is_session_expired());
    }

    #[tokio::test]
    async fn test_401_without_token_is_plain_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Authentication credentials were not provided."
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, None);
        let err = client.current_user().await.expect_err("should be rejected");
        assert!(!err.is_session_expired());
        assert_eq!(err.to_string(), "Authentication credentials were not provided.");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/x/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let err = client.item("x").await.expect_err("should fail");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(err.to_string(), "Invalid server response");
    }

    #[tokio::test]
    async fn test_wrong_shape_on_2xx_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/i1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": 1})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/swaps/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1, "results": "none"})))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let err = client.item("i1").await.expect_err("missing item fields");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        let err = client.list_swaps(None).await.expect_err("results is not a list");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let client = ApiClient::new(uri, Arc::new(MemoryTokenStore::new()))
            .expect("Failed to build client");
        let err = client.api_root().await.expect_err("nothing is listening");
        assert!(matches!(err, ApiError::NetworkError(_)));
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_success_false_on_2xx_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/i1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "You can only delete your own items"
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let err = client.delete_item("i1").await.expect_err("should fail");
        assert_eq!(err.to_string(), "You can only delete your own items");
    }

    #[tokio::test]
    async fn test_purchase_and_swap_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items/i1/purchase/"))
            .and(body_json(json!({"mode": "points", "points_used": 40})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Item purchased successfully for 40 points",
                "transaction": {"transaction_id": "t9", "method": "points", "status": "completed", "points_amount": 40}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/swaps/t9/"))
            .and(body_json(json!({"action": "accept"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Swap request accepted"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let purchase = client
            .purchase_item("i1", &PurchaseRequest::points(40))
            .await
            .expect("purchase");
        assert_eq!(purchase.transaction.map(|t| t.points_amount), Some(40));

        let updated = client.update_swap("t9", SwapAction::Accept).await.expect("accept");
        assert_eq!(updated.message_or(""), "Swap request accepted");
    }

    #[tokio::test]
    async fn test_swaps_status_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swaps/"))
            .and(query_param("status", "pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "count": 0, "results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        client.list_swaps(Some("pending")).await.expect("list swaps");
    }

    #[tokio::test]
    async fn test_client_side_validation_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        assert!(matches!(
            client.rate_user("u1", 6, None).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            client.upload_images(vec![]).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            client.purchase_item("i1", &PurchaseRequest::points(0)).await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_is_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/images/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "message": "1 images uploaded successfully",
                "images": [{"filename": "items/abc.png", "url": "https://cdn.example.com/items/abc.png"}]
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let uploaded = client
            .upload_images(vec![ImageUpload::new("shirt.png", vec![0x89, 0x50, 0x4e, 0x47])])
            .await
            .expect("upload");
        assert_eq!(uploaded[0].filename, "items/abc.png");

        let requests = server.received_requests().await.expect("request recording enabled");
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));
        assert_eq!(
            requests[0].headers.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer t1")
        );
    }

    #[tokio::test]
    async fn test_upload_failure_uses_upload_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/images/"))
            .respond_with(ResponseTemplate::new(413).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let err = client
            .upload_images(vec![ImageUpload::new("big.jpg", vec![0; 16])])
            .await
            .expect_err("upload should fail");
        assert_eq!(err.to_string(), "Upload failed");
    }

    #[tokio::test]
    async fn test_request_headers_override_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("authorization", "Bearer override"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, HeaderValue::from_static("Bearer override"));
        let _: Value = client
            .request(Method::GET, "/", None::<&Value>, headers)
            .await
            .expect("request");
    }

    #[tokio::test]
    async fn test_single_object_envelopes_are_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items/"))
            .and(body_json(json!({
                "title": "Linen shirt", "description": "Barely worn", "category": "Tops",
                "type": "Shirt", "size": "L", "condition": "like_new", "points_value": 30
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "message": "Item created successfully",
                "item": {"item_id": "i7", "title": "Linen shirt", "points_value": 30}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users/u2/rate/"))
            .and(body_json(json!({"rating": 5, "comment": "Great swap"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "rating": {"rating_id": "r1", "rating": 5, "comment": "Great swap"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/u2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "u2", "full_name": "Ana Ruiz", "points_balance": 80
            })))
            .mount(&server)
            .await;

        let client = client_with_token(&server, Some("t1"));
        let item = client
            .create_item(&NewItem {
                title: "Linen shirt".into(),
                description: "Barely worn".into(),
                category: "Tops".into(),
                item_type: "Shirt".into(),
                size: "L".into(),
                condition: "like_new".into(),
                brand: None,
                color: None,
                points_value: 30,
                tags: None,
                images: vec![],
            })
            .await
            .expect("create item");
        assert_eq!(item.item_id, "i7");

        let rating = client
            .rate_user("u2", 5, Some("Great swap"))
            .await
            .expect("rate user");
        assert_eq!(rating.rating, 5);

        let profile = client.public_profile("u2").await.expect("public profile");
        assert_eq!(profile.display_name(), "Ana Ruiz");
    }
}
