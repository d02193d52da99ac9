//! 全局扫描配置

use std::{path::PathBuf, time::Duration};

use stackprobe_engine::EvalBudget;

/// 浏览器UA（部分站点会拦截非浏览器请求）
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// 签名表来源
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SignatureOrigin {
    /// 内置签名表（编译期 embed）
    #[default]
    Embedded,
    /// 本地JSON签名表（运行时加载）
    LocalFile(PathBuf),
}

/// 单次抓取选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// 整个抓取（含读取响应体）的超时
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// 响应体读取上限，超出部分丢弃
    pub max_body_bytes: usize,
    pub max_redirects: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_body_bytes: 2 * 1024 * 1024,
            max_redirects: 10,
        }
    }
}

/// 完整扫描配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub fetch: FetchOptions,
    /// class属性扫描字节上限（超出部分忽略）
    pub class_scan_limit: usize,
    /// 单次扫描规则执行预算
    pub eval_budget: EvalBudget,
    /// HTML无法解析时是否直接判定扫描失败
    pub strict_markup: bool,
    pub signatures: SignatureOrigin,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            class_scan_limit: 64 * 1024,
            eval_budget: EvalBudget::default(),
            strict_markup: false,
            signatures: SignatureOrigin::Embedded,
        }
    }
}

impl ScanConfig {
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::new()
    }

    /// 本地签名表文件
    pub fn local_file(path: impl Into<PathBuf>) -> Self {
        Self {
            signatures: SignatureOrigin::LocalFile(path.into()),
            ..Self::default()
        }
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = user_agent.into();
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.fetch.accept = accept.into();
        self
    }

    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.fetch.accept_language = accept_language.into();
        self
    }

    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.config.fetch.max_body_bytes = max;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.fetch.max_redirects = max;
        self
    }

    pub fn class_scan_limit(mut self, limit: usize) -> Self {
        self.config.class_scan_limit = limit;
        self
    }

    pub fn eval_budget(mut self, budget: EvalBudget) -> Self {
        self.config.eval_budget = budget;
        self
    }

    pub fn strict_markup(mut self, strict: bool) -> Self {
        self.config.strict_markup = strict;
        self
    }

    pub fn signatures(mut self, origin: SignatureOrigin) -> Self {
        self.config.signatures = origin;
        self
    }

    pub fn build(self) -> ScanConfig {
        self.config
    }
}
