//! Client for the remote image service.
//!
//! Two multipart endpoints: upload registers a source image under its fingerprint and reports
//! its dimensions, transform renders that source at a given size and answers with PNG data.

use super::{Fingerprint, SourceMetadata};
use crate::{appconfig::AppConfig, catalog::ResourceType, VERSION};
use futures::StreamExt as _;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::{fmt, path::Path, path::PathBuf};
use tokio::io::AsyncWriteExt as _;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Transform,
}

impl Operation {
    fn noun(self) -> &'static str {
        match self {
            Operation::Upload => "upload",
            Operation::Transform => "transformation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upload => f.write_str("upload source image"),
            Operation::Transform => f.write_str("generate image"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkUnavailable,
    Transport,
    TemporarilyUnavailable,
    ServiceUnavailable,
    InvalidRequest,
    InvalidResponse,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to set up HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("failed to {0}: requires network connection")]
    NetworkUnavailable(Operation, #[source] reqwest::Error),
    #[error("failed to {0}")]
    Transport(Operation, #[source] reqwest::Error),
    #[error("image server temporarily unavailable ({status}): {message}")]
    TemporarilyUnavailable {
        operation: Operation,
        status: u16,
        message: String,
    },
    #[error("image server unavailable: {message}")]
    ServiceUnavailable { operation: Operation, message: String },
    #[error("invalid {} ({status}): {message}", .operation.noun())]
    InvalidRequest {
        operation: Operation,
        status: u16,
        message: String,
    },
    #[error("error parsing {} response", .0.noun())]
    InvalidResponse(Operation, #[source] serde_json::Error),
    #[error("i/o error on {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Client(_) | Error::Transport(..) => ErrorKind::Transport,
            Error::NetworkUnavailable(..) => ErrorKind::NetworkUnavailable,
            Error::TemporarilyUnavailable { .. } => ErrorKind::TemporarilyUnavailable,
            Error::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Error::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Error::InvalidResponse(..) => ErrorKind::InvalidResponse,
            Error::Io(..) => ErrorKind::Io,
        }
    }

    fn transport(operation: Operation, error: reqwest::Error) -> Error {
        if error.is_connect() {
            Error::NetworkUnavailable(operation, error)
        } else {
            Error::Transport(operation, error)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Error")]
    error: String,
}

/// The server's `{"Error": …}` text, or the raw body if it isn't in that shape.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => String::from_utf8_lossy(body).trim().to_owned(),
    }
}

/// Maps a non-success HTTP status to an error.
fn status_error(operation: Operation, status: u16, body: &[u8]) -> Error {
    let message = error_message(body);
    match status {
        500.. => Error::TemporarilyUnavailable {
            operation,
            status,
            message,
        },
        404 => Error::ServiceUnavailable { operation, message },
        _ => Error::InvalidRequest {
            operation,
            status,
            message,
        },
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Width")]
    width: u32,
    #[serde(rename = "Height")]
    height: u32,
    #[serde(rename = "Vector", default)]
    vector: bool,
}

pub fn parse_upload_response(body: &[u8]) -> Result<SourceMetadata, Error> {
    let response: UploadResponse = serde_json::from_slice(body)
        .map_err(|e| Error::InvalidResponse(Operation::Upload, e))?;
    Ok(SourceMetadata {
        width: response.width,
        height: response.height,
        vector: response.vector,
    })
}

/// Everything the service needs to render one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub fingerprint: Fingerprint,
    pub name: &'static str,
    pub platform: &'static str,
    pub width: u32,
    pub height: u32,
    pub res_type: ResourceType,
}

#[async_trait::async_trait]
pub trait ImageApi: Send + Sync {
    /// Sends a source image to the service and returns what it found out about it.
    async fn upload(
        &self,
        fingerprint: &Fingerprint,
        path: &Path,
        filename: &str,
    ) -> Result<SourceMetadata, Error>;

    /// Renders an image and writes the PNG data to `destination`.
    async fn transform(&self, request: &TransformRequest, destination: &Path) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct HttpImageApi {
    client: reqwest::Client,
    upload_url: String,
    transform_url: String,
}

impl HttpImageApi {
    /// Environment variable naming a forward proxy for all requests.
    pub const PROXY_ENV_VAR: &'static str = "PROXY";

    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let proxy = std::env::var(Self::PROXY_ENV_VAR)
            .ok()
            .filter(|p| !p.is_empty());
        Self::with_proxy(config, proxy.as_deref())
    }

    /// Sends all requests through `proxy`, or directly if there is none.
    pub fn with_proxy(config: &AppConfig, proxy: Option<&str>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("resgen/{}", VERSION));
        builder = match proxy {
            Some(proxy) => {
                tracing::debug!(%proxy, "using proxy");
                builder.proxy(reqwest::Proxy::all(proxy).map_err(Error::Client)?)
            }
            None => builder.no_proxy(),
        };
        Ok(HttpImageApi {
            client: builder.build().map_err(Error::Client)?,
            upload_url: config.upload_url(),
            transform_url: config.transform_url(),
        })
    }

    async fn post(&self, operation: Operation, url: &str, form: Form) -> Result<reqwest::Response, Error> {
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport(operation, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(status_error(operation, status.as_u16(), &body))
    }
}

#[async_trait::async_trait]
impl ImageApi for HttpImageApi {
    async fn upload(
        &self,
        fingerprint: &Fingerprint,
        path: &Path,
        filename: &str,
    ) -> Result<SourceMetadata, Error> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::Io(path.to_owned(), e))?;
        let form = Form::new()
            .text("image_id", fingerprint.to_string())
            .part(
                "src",
                Part::stream(reqwest::Body::from(file)).file_name(filename.to_owned()),
            )
            .text("cli_version", VERSION);
        let response = self.post(Operation::Upload, &self.upload_url, form).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(Operation::Upload, e))?;
        parse_upload_response(&body)
    }

    async fn transform(&self, request: &TransformRequest, destination: &Path) -> Result<(), Error> {
        let form = Form::new()
            .text("image_id", request.fingerprint.to_string())
            .text("name", request.name)
            .text("platform", request.platform)
            .text("width", request.width.to_string())
            .text("height", request.height.to_string())
            .text("res_type", request.res_type.as_str())
            .text("crop", "center")
            .text("encoding", "png")
            .text("cli_version", VERSION);
        let response = self
            .post(Operation::Transform, &self.transform_url, form)
            .await?;

        let io_error = |e| Error::Io(destination.to_owned(), e);
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(io_error)?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| Error::transport(Operation::Transform, e))?;
            file.write_all(&chunk).await.map_err(io_error)?;
        }
        file.flush().await.map_err(io_error)?;
        Ok(())
    }
}
