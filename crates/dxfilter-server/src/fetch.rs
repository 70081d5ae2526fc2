//! 远程文件获取
//!
//! GitHub 页面链接会被改写为 raw 地址后再下载。

use axum::body::Bytes;
use reqwest::Url;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const GITHUB_HOSTS: [&str; 2] = ["github.com", "www.github.com"];
const GITHUB_RAW_HOST: &str = "raw.githubusercontent.com";

/// 远程获取错误
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Download failed: {0}")]
    Request(String),

    #[error("Remote server returned HTTP {0}")]
    Status(u16),

    #[error("Remote file exceeds {0} bytes")]
    TooLarge(usize),
}

/// 规范化远程地址：只接受 http/https，GitHub 页面链接改写为 raw 地址
pub fn normalize_remote_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::InvalidUrl("URL not specified".to_string()));
    }
    let mut url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    let is_github = url
        .host_str()
        .is_some_and(|host| GITHUB_HOSTS.contains(&host));
    if is_github {
        let path = url.path().replacen("/blob/", "/", 1);
        url.set_host(Some(GITHUB_RAW_HOST))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.set_path(&path);
        debug!(%url, "rewrote GitHub link to raw URL");
    }
    Ok(url)
}

/// 从地址中取文件名
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("remote.dxf")
        .to_string()
}

/// 下载结果
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub name: String,
    pub bytes: Bytes,
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<RemoteFile, FetchError>> + Send + 'a>>;

/// 远程文件来源
///
/// 路由通过该 trait 获取文件，测试中可替换为内存实现。
pub trait RemoteSource: Send + Sync + 'static {
    fn fetch<'a>(&'a self, url: &'a Url) -> FetchFuture<'a>;
}

/// 基于 `reqwest` 的 HTTP 来源
pub struct HttpSource {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpSource {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dxfilter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client, max_bytes })
    }
}

impl RemoteSource for HttpSource {
    fn fetch<'a>(&'a self, url: &'a Url) -> FetchFuture<'a> {
        Box::pin(async move {
            let mut response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FetchError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            if response
                .content_length()
                .is_some_and(|len| len > self.max_bytes as u64)
            {
                return Err(FetchError::TooLarge(self.max_bytes));
            }

            let mut buf: Vec<u8> = Vec::new();
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| FetchError::Request(e.to_string()))?
            {
                if buf.len() + chunk.len() > self.max_bytes {
                    return Err(FetchError::TooLarge(self.max_bytes));
                }
                buf.extend_from_slice(&chunk);
            }
            debug!(%url, size = buf.len(), "remote file downloaded");

            Ok(RemoteFile {
                name: file_name_from_url(url),
                bytes: Bytes::from(buf),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_blob_link_is_rewritten() {
        let url =
            normalize_remote_url("https://github.com/acme/plans/blob/main/floors/level1.dxf").unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/acme/plans/main/floors/level1.dxf"
        );
        assert_eq!(file_name_from_url(&url), "level1.dxf");
    }

    #[test]
    fn raw_and_other_hosts_unchanged() {
        let raw = "https://raw.githubusercontent.com/acme/plans/main/a.dxf";
        assert_eq!(normalize_remote_url(raw).unwrap().as_str(), raw);

        let other = "http://example.com/blob/a.dxf";
        assert_eq!(normalize_remote_url(other).unwrap().as_str(), other);
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(normalize_remote_url("  "), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(normalize_remote_url("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            normalize_remote_url("ftp://example.com/a.dxf"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn file_name_fallback() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(file_name_from_url(&url), "remote.dxf");
    }
}
