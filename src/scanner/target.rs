//! 扫描目标规范化
//! 启发式补全，不做完整校验：其余畸形输入交给抓取层，以不可达形式暴露

use url::Url;

use crate::error::{ProbeResult, StackProbeError};

/// 规范化后的扫描目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub url: String,
    pub is_secure: bool,
}

/// 用户输入 → 可抓取的URL
/// 1. 去除首尾空白，空输入判定为无效
/// 2. 协议相对地址（//host）补全为 https:
/// 3. 无协议时补全 https://
/// 4. 显式的非 http(s) 协议判定为无效
pub fn normalize_url(input: &str) -> ProbeResult<ScanTarget> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StackProbeError::InvalidInput("URL is required".to_string()));
    }

    let url = if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        match explicit_scheme(trimmed) {
            Some((scheme, rest)) => {
                let scheme = scheme.to_ascii_lowercase();
                if scheme != "http" && scheme != "https" {
                    return Err(StackProbeError::InvalidInput(format!(
                        "unsupported scheme `{}`, only http and https can be scanned",
                        scheme
                    )));
                }
                format!("{}://{}", scheme, rest)
            }
            None => format!("https://{}", trimmed),
        }
    };

    // 只拦截缺少主机名的输入，其余解析问题交给抓取层
    if let Err(url::ParseError::EmptyHost) = Url::parse(&url) {
        return Err(StackProbeError::UrlError(url::ParseError::EmptyHost));
    }

    let is_secure = url.starts_with("https://");
    Ok(ScanTarget { url, is_secure })
}

/// 拆分 `scheme://rest`，scheme 需符合 RFC 3986 字符集
fn explicit_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}
