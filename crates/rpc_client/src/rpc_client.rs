use crate::ledger_client::LedgerClient;
use crate::models::{BlockInfo, RpcRequest, RpcResponse};
use crate::rpc_error::{RpcError, RpcResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use pacer_config::RPC_TIMEOUT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Username and password carried in an endpoint URL's userinfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCredentials {
    pub user: String,
    pub password: String,
}

impl RpcCredentials {
    /// Extracts the credentials of `url`, if it has a username
    pub fn from_url(url: &Url) -> Option<Self> {
        if url.username().is_empty() {
            return None;
        }
        Some(Self {
            user: url.username().to_string(),
            password: url.password().unwrap_or_default().to_string(),
        })
    }

    fn basic_auth_header(&self) -> String {
        let auth = format!("{}:{}", self.user, self.password);
        format!("Basic {}", general_purpose::STANDARD.encode(auth.as_bytes()))
    }
}

/// Parses an `http(s)://[user:pass@]host:port` endpoint and splits off its
/// credentials. The returned URL never carries userinfo.
pub fn parse_endpoint(url: &str) -> RpcResult<(Url, Option<RpcCredentials>)> {
    let invalid = |reason: &str| RpcError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    let credentials = RpcCredentials::from_url(&parsed);
    parsed
        .set_username("")
        .map_err(|_| invalid("cannot strip username"))?;
    parsed
        .set_password(None)
        .map_err(|_| invalid("cannot strip password"))?;

    Ok((parsed, credentials))
}

/// JSON-RPC client for a ledger node
pub struct RpcClient {
    base_address: Url,
    http_client: Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for `url` with the standard call timeout
    pub fn new(url: &str) -> RpcResult<Self> {
        Self::with_timeout(url, RPC_TIMEOUT)
    }

    /// Creates a client for `url`; credentials in the URL become a basic
    /// auth header on every request
    pub fn with_timeout(url: &str, timeout: Duration) -> RpcResult<Self> {
        let (base_address, credentials) = parse_endpoint(url)?;
        let mut builder = Client::builder().timeout(timeout);

        if let Some(credentials) = credentials {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = credentials
                .basic_auth_header()
                .parse()
                .map_err(|_| RpcError::InvalidUrl {
                    url: url.to_string(),
                    reason: "credentials are not a valid header value".to_string(),
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let http_client = builder
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_address,
            http_client,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            base_address: url,
            http_client: client,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// The endpoint requests go to, without credentials
    pub fn endpoint(&self) -> &Url {
        &self.base_address
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> RpcError {
        if err.is_timeout() {
            RpcError::Timeout(self.timeout)
        } else {
            RpcError::Transport(err.to_string())
        }
    }

    /// Sends a request and returns the full response envelope
    pub async fn send(&self, request: &RpcRequest) -> RpcResult<RpcResponse> {
        debug!(method = %request.method, id = request.id, "sending rpc request");

        let response = self
            .http_client
            .post(self.base_address.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Nodes report RPC errors with a non-2xx status and a JSON body, so
        // the body is parsed before the status is considered.
        let status = response.status();
        let content = response.text().await.map_err(|e| self.classify(e))?;

        match serde_json::from_str::<RpcResponse>(&content) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(RpcError::Transport(format!(
                "HTTP status {status} from {}",
                self.base_address
            ))),
            Err(e) => Err(RpcError::invalid_response(&request.method, e.to_string())),
        }
    }

    /// Calls `method` and returns its `result`, turning an error object into
    /// [`RpcError::Server`]
    pub async fn rpc_send(&self, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        let response = self.send(&request).await?;

        if let Some(error) = response.error {
            return Err(RpcError::Server {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| RpcError::invalid_response(method, "no result returned"))
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> RpcResult<T> {
        let result = self.rpc_send(method, params).await?;
        serde_json::from_value(result).map_err(|e| RpcError::invalid_response(method, e.to_string()))
    }

    /// Gets the number of blocks in the best chain
    pub async fn get_block_count(&self) -> RpcResult<u64> {
        self.rpc_call("getblockcount", vec![]).await
    }

    /// Mines `count` blocks to the node wallet
    pub async fn generate(&self, count: u32) -> RpcResult<Vec<String>> {
        self.rpc_call("generate", vec![json!(count)]).await
    }

    /// Mines `count` blocks paying the reward to `address`
    pub async fn generate_to_address(&self, count: u32, address: &str) -> RpcResult<Vec<String>> {
        self.rpc_call("generatetoaddress", vec![json!(count), json!(address)])
            .await
    }

    /// Returns verbose block information
    pub async fn get_block(&self, hash: &str) -> RpcResult<BlockInfo> {
        self.rpc_call("getblock", vec![json!(hash)]).await
    }

    /// Sends `amount` coins to `address` from the node wallet
    pub async fn send_to_address(&self, address: &str, amount: u64) -> RpcResult<String> {
        self.rpc_call("sendtoaddress", vec![json!(address), json!(amount)])
            .await
    }
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn current_height(&self) -> RpcResult<u64> {
        self.get_block_count().await
    }

    async fn produce_blocks(&self, count: u32, target: Option<&str>) -> RpcResult<Vec<String>> {
        match target {
            Some(address) => self.generate_to_address(count, address).await,
            None => self.generate(count).await,
        }
    }

    async fn inspect_block(&self, hash: &str) -> RpcResult<BlockInfo> {
        self.get_block(hash).await
    }

    async fn submit_payment(&self, recipient: &str, amount: u64) -> RpcResult<String> {
        self.send_to_address(recipient, amount).await
    }
}
