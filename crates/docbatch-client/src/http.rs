//! reqwest-backed implementation of [`NetworkClient`].
//!
//! Every bulk call is a JSON `POST` to
//! `{base}/deals/{deal}/documents/bulk/{action}`.

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use docbatch_core::{DealId, DocumentId, TransportError};
use docbatch_ops::{
    ArchiveRequest, ArchiveResponse, BoxFuture, ClientResult, DeleteResponse, MoveRequest,
    MoveResponse, NetworkClient, RestoreResponse,
};

use crate::config::ClientConfig;

/// Longest server error body carried into a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Body of the restore and delete calls.
#[derive(Debug, Serialize)]
struct DocumentIdsBody<'a> {
    document_ids: &'a [DocumentId],
}

/// REST transport for the bulk document endpoints.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    bearer_token: Option<String>,
}

impl HttpClient {
    /// Build a client from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let base = Url::parse(&config.base_url).map_err(|e| TransportError::Other {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(TransportError::Other {
                message: format!("Base URL '{}' cannot have a path", config.base_url),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            http,
            base,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// URL of the bulk `action` endpoint for `deal`.
    pub fn endpoint(&self, deal: &DealId, action: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["deals", deal.as_str(), "documents", "bulk", action]);
        }
        url
    }

    async fn post<B, R>(&self, url: Url, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!(%url, "POST bulk documents");

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| TransportError::decode(e.to_string()))
    }
}

impl NetworkClient for HttpClient {
    fn move_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: MoveRequest,
    ) -> BoxFuture<'a, ClientResult<MoveResponse>> {
        Box::pin(async move { self.post(self.endpoint(deal, "move"), &request).await })
    }

    fn archive_documents<'a>(
        &'a self,
        deal: &'a DealId,
        request: ArchiveRequest,
    ) -> BoxFuture<'a, ClientResult<ArchiveResponse>> {
        Box::pin(async move { self.post(self.endpoint(deal, "archive"), &request).await })
    }

    fn restore_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<RestoreResponse>> {
        Box::pin(async move {
            let body = DocumentIdsBody {
                document_ids: &document_ids,
            };
            self.post(self.endpoint(deal, "restore"), &body).await
        })
    }

    fn delete_documents<'a>(
        &'a self,
        deal: &'a DealId,
        document_ids: Vec<DocumentId>,
    ) -> BoxFuture<'a, ClientResult<DeleteResponse>> {
        Box::pin(async move {
            let body = DocumentIdsBody {
                document_ids: &document_ids,
            };
            self.post(self.endpoint(deal, "delete"), &body).await
        })
    }
}

/// Map a reqwest failure onto the transport taxonomy.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::connection(err.to_string())
    } else if err.is_decode() {
        TransportError::decode(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::status(status.as_u16(), err.to_string())
    } else {
        TransportError::Other {
            message: err.to_string(),
        }
    }
}

/// Build a status error, preferring the server's body over the reason phrase.
fn status_error(status: StatusCode, body: &str) -> TransportError {
    let body = body.trim();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown status").to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY).collect()
    };
    TransportError::status(status.as_u16(), message)
}
