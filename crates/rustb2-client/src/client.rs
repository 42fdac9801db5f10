//! Authorized access to the B2 v2 API.
//!
//! [`B2Client`] resolves operation paths against the session's `apiUrl`,
//! attaches the session token, and maps error bodies onto [`B2Error`]. A
//! request rejected with `expired_auth_token` is repeated exactly once after
//! the session manager re-authorizes; a second rejection is returned as is.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rustb2_auth::{Authorizer, DiskStore, InMemoryStore, Session, SessionManager, SessionStore};
use rustb2_core::{B2Config, B2Error, B2Result, Credentials};
use rustb2_model::input::{
    CancelLargeFileInput, FinishLargeFileInput, GetUploadPartUrlInput, GetUploadUrlInput,
    ListBucketsInput, StartLargeFileInput,
};
use rustb2_model::output::{CancelLargeFileOutput, ListBucketsOutput};
use rustb2_model::{
    AccountAuthorization, B2Operation, Bucket, ErrorCode, ErrorResponse, File, UploadPartUrl,
    UploadUrl,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("rustb2/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Large-file API seam
// ---------------------------------------------------------------------------

/// The three calls bracketing a multipart upload.
#[async_trait::async_trait]
pub trait LargeFileApi: Send + Sync {
    /// `b2_start_large_file`.
    async fn start_large_file(&self, input: &StartLargeFileInput) -> B2Result<File>;

    /// `b2_finish_large_file` with one SHA1 per part in part-number order.
    async fn finish_large_file(&self, file_id: &str, part_sha1_array: Vec<String>)
    -> B2Result<File>;

    /// `b2_cancel_large_file`.
    async fn cancel_large_file(&self, file_id: &str) -> B2Result<CancelLargeFileOutput>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the B2 native API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct B2Client {
    http: reqwest::Client,
    sessions: Arc<SessionManager>,
}

impl B2Client {
    /// Create a client from an HTTP client and a session manager.
    #[must_use]
    pub fn new(http: reqwest::Client, sessions: Arc<SessionManager>) -> Self {
        Self { http, sessions }
    }

    /// Build a client, its session store, and its authorizer from configuration.
    pub fn from_config(config: &B2Config) -> B2Result<Self> {
        config.validate()?;

        let http = http_client(config)?;
        let store: Arc<dyn SessionStore> = if config.no_cache {
            Arc::new(InMemoryStore::new())
        } else {
            Arc::new(DiskStore::open(config.cache_path()?)?)
        };
        let authorizer = Arc::new(AccountAuthorizer::new(http.clone(), &config.auth_url));
        let sessions = Arc::new(SessionManager::new(
            config.credentials(),
            authorizer,
            store,
            config.token_ttl(),
        ));
        Ok(Self::new(http, sessions))
    }

    /// The underlying HTTP client.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// A fresh session snapshot.
    pub async fn session(&self) -> B2Result<Arc<Session>> {
        self.sessions.current_session().await
    }

    /// Run `request` with a fresh session, re-authorizing and repeating it
    /// once if the service reports the token as expired.
    pub async fn with_session<T, F, Fut>(&self, request: F) -> B2Result<T>
    where
        F: Fn(Arc<Session>) -> Fut,
        Fut: Future<Output = B2Result<T>>,
    {
        let session = self.session().await?;
        let stale_token = session.authorization_token().to_owned();
        match request(session).await {
            Err(B2Error::ExpiredToken) => {
                warn!("Authorization token expired, re-authorizing once");
                self.sessions.invalidate(&stale_token);
                let session = self.session().await?;
                request(session).await
            }
            other => other,
        }
    }

    /// Call a JSON API operation.
    pub async fn call<I, O>(&self, operation: B2Operation, input: &I) -> B2Result<O>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        self.with_session(|session| async move {
            let url = session.endpoint(operation);
            debug!(%operation, "Calling B2 API");
            let response = self
                .http
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, session.authorization_token())
                .json(input)
                .send()
                .await
                .map_err(B2Error::transport)?;
            decode(response).await
        })
        .await
    }

    /// `b2_list_buckets` filtered by name.
    pub async fn list_buckets(&self, bucket_name: Option<&str>) -> B2Result<Vec<Bucket>> {
        let account_id = self.session().await?.account_id().to_owned();
        let input = ListBucketsInput {
            account_id,
            bucket_id: None,
            bucket_name: bucket_name.map(ToOwned::to_owned),
        };
        let output: ListBucketsOutput = self.call(B2Operation::ListBuckets, &input).await?;
        Ok(output.buckets)
    }

    /// `b2_get_upload_url`: a bucket-scoped upload authorization.
    pub async fn get_upload_url(&self, bucket_id: &str) -> B2Result<UploadUrl> {
        let input = GetUploadUrlInput {
            bucket_id: bucket_id.to_owned(),
        };
        self.call(B2Operation::GetUploadUrl, &input).await
    }

    /// `b2_get_upload_part_url`: a file-scoped upload authorization.
    pub async fn get_upload_part_url(&self, file_id: &str) -> B2Result<UploadPartUrl> {
        let input = GetUploadPartUrlInput {
            file_id: file_id.to_owned(),
        };
        self.call(B2Operation::GetUploadPartUrl, &input).await
    }
}

#[async_trait::async_trait]
impl LargeFileApi for B2Client {
    async fn start_large_file(&self, input: &StartLargeFileInput) -> B2Result<File> {
        self.call(B2Operation::StartLargeFile, input).await
    }

    async fn finish_large_file(
        &self,
        file_id: &str,
        part_sha1_array: Vec<String>,
    ) -> B2Result<File> {
        let input = FinishLargeFileInput {
            file_id: file_id.to_owned(),
            part_sha1_array,
        };
        self.call(B2Operation::FinishLargeFile, &input).await
    }

    async fn cancel_large_file(&self, file_id: &str) -> B2Result<CancelLargeFileOutput> {
        let input = CancelLargeFileInput {
            file_id: file_id.to_owned(),
        };
        self.call(B2Operation::CancelLargeFile, &input).await
    }
}

// ---------------------------------------------------------------------------
// Account authorization
// ---------------------------------------------------------------------------

/// Calls `b2_authorize_account` with HTTP basic auth.
#[derive(Debug, Clone)]
pub struct AccountAuthorizer {
    http: reqwest::Client,
    url: String,
}

impl AccountAuthorizer {
    /// Create an authorizer for the cluster at `auth_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, auth_url: &str) -> Self {
        let url = format!(
            "{}/{}",
            auth_url.trim_end_matches('/'),
            B2Operation::AuthorizeAccount.path()
        );
        Self { http, url }
    }
}

#[async_trait::async_trait]
impl Authorizer for AccountAuthorizer {
    async fn authorize(&self, credentials: &Credentials) -> B2Result<AccountAuthorization> {
        let response = self
            .http
            .get(&self.url)
            .basic_auth(credentials.key_id(), Some(credentials.key_secret()))
            .send()
            .await
            .map_err(B2Error::transport)?;
        decode(response).await
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Build the shared HTTP client with the configured timeouts.
pub fn http_client(config: &B2Config) -> B2Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(B2Error::transport)
}

/// Pass 2xx responses through; turn anything else into a [`B2Error`].
pub async fn check_response(response: reqwest::Response) -> B2Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.map_err(B2Error::transport)?;
    Err(error_from_body(status.as_u16(), &body))
}

/// Check the status and decode a JSON body.
pub async fn decode<O: DeserializeOwned>(response: reqwest::Response) -> B2Result<O> {
    let response = check_response(response).await?;
    let body = response.bytes().await.map_err(B2Error::transport)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Map a non-2xx status and body onto the error taxonomy.
#[must_use]
pub fn error_from_body(status: u16, body: &[u8]) -> B2Error {
    let response = ErrorResponse::from_body(status, body);
    if status == 401 {
        match response.code.as_str() {
            ErrorCode::EXPIRED_AUTH_TOKEN => return B2Error::ExpiredToken,
            ErrorCode::UNAUTHORIZED => return B2Error::Unauthorized,
            _ => {}
        }
    }
    let message = if response.message.is_empty() {
        "empty error body".to_owned()
    } else {
        response.message
    };
    B2Error::Api {
        status,
        code: response.code,
        message,
    }
}
