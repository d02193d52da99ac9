//! 基于reqwest的默认抓取器
//! 核心特性：
//! 1. 浏览器请求头 + 禁用缓存
//! 2. 有界重定向
//! 3. 分块读取响应体，超出上限截断，避免大页面拖垮内存

use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client};

use super::{FetchedPage, PageFetcher};
use crate::config::FetchOptions;
use crate::error::{ProbeResult, StackProbeError};

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// 按抓取选项构建客户端（重定向策略为客户端级配置）
    pub fn new(options: &FetchOptions) -> ProbeResult<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(options.max_redirects))
            .timeout(options.timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                StackProbeError::DetectorInitError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// 使用外部构建的客户端
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> ProbeResult<FetchedPage> {
        let mut response = self
            .client
            .get(url)
            .timeout(options.timeout)
            .header(header::USER_AGENT, &options.user_agent)
            .header(header::ACCEPT, &options.accept)
            .header(header::ACCEPT_LANGUAGE, &options.accept_language)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| unreachable_error(url, &e))?;

        let final_url = response.url().to_string();
        let status = response.status();
        let headers = response.headers().clone();

        // 分块读取，超出上限后截断并停止读取
        let limit = options.max_body_bytes;
        let mut body = Vec::with_capacity(limit.min(64 * 1024));
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| unreachable_error(url, &e))?
        {
            if body.len() + chunk.len() > limit {
                body.extend_from_slice(&chunk[..limit - body.len()]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        if truncated {
            log::warn!("Response body of {} truncated at {} bytes", final_url, limit);
        }
        log::debug!(
            "Fetched {} | Status: {} | Headers: {} | Body: {}B",
            final_url,
            status,
            headers.len(),
            body.len()
        );

        Ok(FetchedPage {
            url: final_url,
            status,
            headers,
            body,
            truncated,
        })
    }
}

/// 传输层错误统一映射为不可达
fn unreachable_error(url: &str, err: &reqwest::Error) -> StackProbeError {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_redirect() {
        "too many redirects"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };
    log::debug!("Fetch of {} failed: {:?}", url, err);
    StackProbeError::Unreachable(format!("{}: {} ({})", url, reason, err))
}
