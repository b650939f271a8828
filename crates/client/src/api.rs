//! HTTP client for the thesis-management REST API.
//!
//! Every request goes through [`ApiClient`], which prefixes the path,
//! attaches the bearer token from the shared session, and maps non-2xx
//! responses to [`ClientError`]. Each call is a single attempt.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{extract_message, ClientError, ClientResult, DEFAULT_API_MESSAGE};
use crate::session::SessionHandle;

/// A downloaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    /// File name announced by `Content-Disposition`, if any.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// A file to be sent in a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: "application/pdf".to_string(),
            bytes,
        }
    }

    /// Read a file from disk; the name is taken from the path.
    pub async fn from_path(path: &std::path::Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archivo.pdf".to_string());
        Ok(Self::pdf(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn into_part(self) -> ClientResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?)
    }
}

/// JSON value sent as a named multipart text part.
pub fn json_part<T: Serialize>(value: &T) -> ClientResult<Part> {
    let json = serde_json::to_string(value)?;
    Ok(Part::text(json).mime_str("application/json")?)
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    prefix: String,
    session: SessionHandle,
    download_dir: PathBuf,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> Self {
        Self::with_client(reqwest::Client::new(), config, session)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig, session: SessionHandle) -> Self {
        let prefix = format!("/{}", config.api_prefix.trim_matches('/'));
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            prefix: if prefix == "/" { String::new() } else { prefix },
            session,
            download_dir: config.download_dir.clone(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Default target for downloaded files.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Absolute URL for `path`. A path already carrying the prefix is not
    /// prefixed twice, and a missing leading slash is added.
    pub fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let already_prefixed = !self.prefix.is_empty()
            && (path == self.prefix || path.starts_with(&format!("{}/", self.prefix)));
        if already_prefixed {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{}{path}", self.base_url, self.prefix)
        }
    }

    // ---- verbs ----

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::GET, path).await).await?;
        Self::parse_response(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        Self::parse_response(self.send(builder).await?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        Self::parse_response(self.send(builder).await?).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, path).await.json(body);
        Self::parse_response(self.send(builder).await?).await
    }

    /// `PATCH` without a request body.
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::PATCH, path).await;
        Self::parse_response(self.send(builder).await?).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, path).await).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ClientResult<T> {
        let builder = self.request(Method::POST, path).await.multipart(form);
        Self::parse_response(self.send(builder).await?).await
    }

    /// Download a binary body.
    pub async fn get_bytes(&self, path: &str) -> ClientResult<Blob> {
        let response = self.send(self.request(Method::GET, path).await).await?;
        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name);
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(Blob {
            bytes,
            file_name,
            content_type,
        })
    }

    // ---- private helpers ----

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<reqwest::Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "API request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "API request failed to send");
            ClientError::Connection(e)
        })?;
        Self::ensure_success(response).await
    }

    /// Return the response unchanged on 2xx; map anything else to an error
    /// carrying the backend's message.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| DEFAULT_API_MESSAGE.to_string());

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%url, message = %message, "Request unauthorized");
            return Err(ClientError::Unauthorized { message });
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a successful JSON body. An empty body reads as `null`, so
    /// `()`, `Option<T>` and `IgnoredAny` accept it.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// File name from a `Content-Disposition` header value.
fn disposition_file_name(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|param| {
        let (key, raw) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}
