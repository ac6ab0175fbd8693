//! Release hosting transport.
//!
//! [`ReleaseSource`] is the narrow interface detection and installation need
//! from the hosting service. [`GitHubClient`] implements it for github.com
//! and GitHub Enterprise.

use crate::error::{Error, Result};
use crate::types::RawRelease;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::future::Future;

pub const GITHUB_API_URL: &str = "https://api.github.com/";
const ENTERPRISE_API_PATH: &str = "api/v3/";
const ENTERPRISE_UPLOAD_PATH: &str = "api/uploads/";
const RELEASES_PER_PAGE: &str = "100";
/// Upper bound on buffer space reserved from a `Content-Length` header.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

#[derive(Debug)]
pub enum SourceError {
    NotFound,
    Status(StatusCode),
    Http(reqwest::Error),
    InvalidUrl(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound => write!(f, "not found (404)"),
            SourceError::Status(status) => write!(f, "unexpected response status {}", status),
            SourceError::Http(e) => write!(f, "{}", e),
            SourceError::InvalidUrl(reason) => write!(f, "invalid request URL: {}", reason),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(e)
    }
}

/// Where releases come from.
pub trait ReleaseSource: Send + Sync {
    /// All releases of `owner/repo`, in the order the service lists them.
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = std::result::Result<Vec<RawRelease>, SourceError>> + Send;

    /// Raw bytes of one release asset.
    fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, SourceError>> + Send;
}

/// GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    upload_url: Url,
    token: Option<String>,
    show_progress: bool,
}

impl GitHubClient {
    pub fn new(token: Option<&str>) -> Result<Self> {
        let base_url = parse_endpoint(GITHUB_API_URL)?;
        let upload_url = parse_endpoint("https://uploads.github.com/")?;
        Self::build(base_url, upload_url, token)
    }

    /// Client for a GitHub Enterprise installation.
    ///
    /// `upload_url` defaults to `base_url`. The `api/v3/` and `api/uploads/`
    /// paths are appended unless already present.
    pub fn enterprise(
        base_url: &str,
        upload_url: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self> {
        let upload_url = upload_url.filter(|u| !u.is_empty()).unwrap_or(base_url);
        let base = with_api_path(parse_endpoint(base_url)?, ENTERPRISE_API_PATH);
        let upload = with_api_path(parse_endpoint(upload_url)?, ENTERPRISE_UPLOAD_PATH);
        Self::build(base, upload, token)
    }

    fn build(base_url: Url, upload_url: Url, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gh-selfupdate/", env!("CARGO_PKG_VERSION"))),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidEndpointUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        let token = token.filter(|t| !t.is_empty()).map(str::to_string);
        if token.is_some() {
            tracing::debug!("Using API token for {}", base_url);
        }
        Ok(Self {
            http,
            base_url,
            upload_url,
            token,
            show_progress: false,
        })
    }

    /// Draw a progress bar while downloading assets.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, url: Url, accept: &'static str) -> reqwest::RequestBuilder {
        let request = self.http.get(url).header(ACCEPT, accept);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, SourceError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::debug!("GitHub API request failed: {} - {}", status, body);
            return Err(SourceError::Status(status));
        }
        Ok(response)
    }
}

impl ReleaseSource for GitHubClient {
    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> std::result::Result<Vec<RawRelease>, SourceError> {
        let mut url = self.endpoint(&format!("repos/{}/{}/releases", owner, repo))?;
        url.query_pairs_mut().append_pair("per_page", RELEASES_PER_PAGE);
        tracing::debug!("Fetching releases from: {}", url);

        let response = self
            .send(self.request(url, "application/vnd.github.v3+json"))
            .await?;
        let releases: Vec<RawRelease> = response.json().await?;
        tracing::debug!("{}/{} has {} release(s)", owner, repo, releases.len());
        Ok(releases)
    }

    async fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> std::result::Result<Vec<u8>, SourceError> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/releases/assets/{}",
            owner, repo, asset_id
        ))?;
        tracing::debug!("Downloading asset from: {}", url);

        let response = self
            .send(self.request(url, "application/octet-stream"))
            .await?;
        let total_size = response.content_length().unwrap_or(0);

        let pb = if self.show_progress {
            ProgressBar::new(total_size)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Downloading asset {}", asset_id));

        let mut bytes = Vec::with_capacity(total_size.min(MAX_PREALLOCATION) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes.extend_from_slice(&chunk);
            pb.set_position(bytes.len() as u64);
        }

        pb.finish_with_message("Download complete");
        Ok(bytes)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidEndpointUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidEndpointUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

fn with_api_path(mut url: Url, api_path: &str) -> Url {
    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    let host = url.host_str().unwrap_or_default();
    if !path.ends_with(&format!("/{}", api_path))
        && !host.starts_with("api.")
        && !host.contains(".api.")
    {
        path.push_str(api_path);
    }
    url.set_path(&path);
    url
}
