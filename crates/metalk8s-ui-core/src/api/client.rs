//! API client for the orchestration API.
//!
//! Every call is authorized by the token argument; the client never reads
//! or writes session storage and never retries.

use reqwest::{header, Client};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::Token;
use crate::config::ApiConfig;
use crate::models::{Node, NodeList};

/// Cluster API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    nodes_url: String,
}

impl ClusterClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            nodes_url: config.nodes_url(),
        })
    }

    /// List every node known to the cluster, in API order.
    ///
    /// `Ok(vec![])` is an empty cluster; any failure is an `Err`.
    pub async fn get_nodes(
        &self,
        token: &Token,
        cancel: &CancellationToken,
    ) -> Result<Vec<Node>, ApiError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.fetch_nodes(token) => result,
        };

        match result {
            Ok(nodes) => {
                debug!(count = nodes.len(), "Retrieved nodes");
                Ok(nodes)
            }
            Err(e) => {
                warn!(url = %self.nodes_url, error = %e, "Error retrieving nodes");
                Err(e)
            }
        }
    }

    async fn fetch_nodes(&self, token: &Token) -> Result<Vec<Node>, ApiError> {
        let authorization = header::HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| ApiError::InvalidToken("token is not a valid header value".to_string()))?;

        let response = self
            .client
            .get(&self.nodes_url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        let list: NodeList = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse node list: {}", e)))?;
        Ok(list.items)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
