use std::time::Duration;

use docqa_logging::docqa_debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::{ApiError, AskRequest, AskResponse, FailureKind, SummaryResponse, UploadResponse};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Indexing and summarizing a paper can take a while.
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// The four calls the client makes against the document Q&A service.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Uploads a PDF and returns the document id issued for it.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError>;

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;

    async fn summary(&self, doc_id: &str) -> Result<String, ApiError>;

    async fn delete(&self, doc_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// Joins `segments` onto the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let url = self.endpoint(&["upload"])?;
        docqa_debug!("POST {} file={} bytes={}", url, file_name, bytes.len());
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str("application/pdf")
            .map_err(|err| ApiError::new(FailureKind::InvalidFile, err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: UploadResponse = decode_json(check_status(response)?).await?;
        Ok(body.doc_id)
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        let url = self.endpoint(&["ask"])?;
        docqa_debug!(
            "POST {} doc_id={} history_len={}",
            url,
            request.doc_id,
            request.history.len()
        );
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(check_status(response)?).await
    }

    async fn summary(&self, doc_id: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["summary", doc_id])?;
        docqa_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: SummaryResponse = decode_json(check_status(response)?).await?;
        Ok(body.summary)
    }

    async fn delete(&self, doc_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["documents", doc_id])?;
        docqa_debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
