//! REST API client
//!
//! Thin request dispatch with credential injection: every outgoing
//! request carries exactly one of the bearer-token or API-key headers,
//! chosen by the stored auth method. Every response passes through one
//! handler; a 401 clears the persisted credentials as a side effect
//! (in-memory auth state is untouched) and every other failure maps to
//! a typed error carrying the server message when present. No caching,
//! no retries, no request deduplication.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shared::client::{LoginRequest, LoginResponse};
use shared::models::{
    PaymentStatus, PaymentStatusUpdate, Product, ProductCreate, ProductUpdate, Sale, SaleCancel,
    SaleCreate, SalesStats, StockAdjustment, User, UserCreate, UserPasswordUpdate,
    UserStatusUpdate, UserUpdate,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::storage::CredentialStore;

/// API key header name
const API_KEY_HEADER: &str = "x-api-key";

/// Error payload shape used by the server
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the retail management API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<CredentialStore>,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &ClientConfig, storage: Arc<CredentialStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the credential for the currently stored auth method, if
    /// any. With nothing stored the request goes out unauthenticated
    /// and the server decides.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let stored = self.storage.snapshot();
        match stored.auth_method.as_deref() {
            Some("token") => match stored.token {
                Some(token) => {
                    request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
                }
                None => request,
            },
            Some("api-key") => match stored.api_key {
                Some(key) => request.header(API_KEY_HEADER, key),
                None => request,
            },
            _ => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        self.handle(request.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        self.handle(request.send().await?).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.authorize(self.client.put(self.url(path)).json(body));
        self.handle(request.send().await?).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.authorize(self.client.delete(self.url(path)));
        self.handle_empty(request.send().await?).await
    }

    async fn handle<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        match self.check_status(response).await? {
            Some(ok) => ok.json().await.map_err(Into::into),
            None => Err(ClientError::InvalidResponse("Missing body".to_string())),
        }
    }

    async fn handle_empty(&self, response: reqwest::Response) -> ClientResult<()> {
        self.check_status(response).await?;
        Ok(())
    }

    /// Map non-success statuses to typed errors. A 401 additionally
    /// clears all persisted credential fields, whichever operation
    /// triggered it.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<Option<reqwest::Response>> {
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("Received 401, clearing stored credentials");
                if let Err(e) = self.storage.clear() {
                    tracing::error!(error = %e, "Failed to clear credential storage");
                }
                Err(ClientError::Unauthorized)
            }
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
            _ => Err(ClientError::Server(message)),
        }
    }

    // ========== Auth API ==========

    /// Login with a username-or-email credential
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.post("auth/login", request).await
    }

    /// Revalidate the stored token
    pub async fn verify(&self) -> ClientResult<()> {
        let request = self.authorize(self.client.get(self.url("auth/verify")));
        self.handle_empty(request.send().await?).await
    }

    // ========== Products API ==========

    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.get("products").await
    }

    pub async fn product(&self, id: &str) -> ClientResult<Product> {
        self.get(&format!("products/{id}")).await
    }

    pub async fn create_product(&self, payload: &ProductCreate) -> ClientResult<Product> {
        self.post("products", payload).await
    }

    pub async fn update_product(&self, id: &str, payload: &ProductUpdate) -> ClientResult<Product> {
        self.put(&format!("products/{id}"), payload).await
    }

    pub async fn delete_product(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("products/{id}")).await
    }

    pub async fn adjust_stock(&self, id: &str, payload: &StockAdjustment) -> ClientResult<Product> {
        self.post(&format!("products/{id}/stock"), payload).await
    }

    // ========== Sales API ==========

    pub async fn sales(&self) -> ClientResult<Vec<Sale>> {
        self.get("sales").await
    }

    pub async fn sale(&self, id: &str) -> ClientResult<Sale> {
        self.get(&format!("sales/{id}")).await
    }

    pub async fn create_sale(&self, payload: &SaleCreate) -> ClientResult<Sale> {
        self.post("sales", payload).await
    }

    pub async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> ClientResult<Sale> {
        self.put(
            &format!("sales/{id}/payment-status"),
            &PaymentStatusUpdate { payment_status },
        )
        .await
    }

    /// Issue a cancellation. No client-side guard against terminal
    /// states; the server decides what an already-cancelled sale does.
    pub async fn cancel_sale(&self, id: &str, reason: Option<String>) -> ClientResult<Sale> {
        self.post(&format!("sales/{id}/cancel"), &SaleCancel { reason })
            .await
    }

    pub async fn sales_stats(&self) -> ClientResult<SalesStats> {
        self.get("sales/stats").await
    }

    // ========== Users API ==========

    pub async fn users(&self) -> ClientResult<Vec<User>> {
        self.get("users").await
    }

    pub async fn user(&self, id: &str) -> ClientResult<User> {
        self.get(&format!("users/{id}")).await
    }

    pub async fn create_user(&self, payload: &UserCreate) -> ClientResult<User> {
        self.post("users", payload).await
    }

    pub async fn update_user(&self, id: &str, payload: &UserUpdate) -> ClientResult<User> {
        self.put(&format!("users/{id}"), payload).await
    }

    /// Change a password without resending the rest of the record
    pub async fn change_password(
        &self,
        id: &str,
        payload: &UserPasswordUpdate,
    ) -> ClientResult<User> {
        self.put(&format!("users/{id}"), payload).await
    }

    pub async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("users/{id}")).await
    }

    pub async fn update_user_status(&self, id: &str, is_active: bool) -> ClientResult<User> {
        self.put(&format!("users/{id}/status"), &UserStatusUpdate { is_active })
            .await
    }
}
