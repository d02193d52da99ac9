//! 扫描编排器
//! 流程：规范化URL → 单次抓取（超时/取消竞争）→ 状态判定 → 检测 → 组装结果
//! 不重试；任何失败都不产出部分结果

use std::future::Future;
use std::time::Instant;

use crate::detector::{Detection, TechDetector};
use crate::error::{ProbeResult, StackProbeError};
use crate::fetch::PageFetcher;

use super::result::ScanResult;
use super::target::{normalize_url, ScanTarget};

/// 一次成功扫描的完整产物
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: ScanTarget,
    /// 跟随重定向后的最终地址
    pub final_url: String,
    /// 响应体超出上限，只检测了前缀
    pub body_truncated: bool,
    pub detection: Detection,
}

impl ScanReport {
    /// 结果是否可能不完整（响应体截断或执行预算耗尽）
    pub fn is_partial(&self) -> bool {
        self.body_truncated || self.detection.budget_exhausted
    }
}

impl From<ScanReport> for ScanResult {
    fn from(report: ScanReport) -> Self {
        ScanResult::success(
            report.target.url,
            report.target.is_secure,
            report.detection.metadata,
            report.detection.technologies,
        )
    }
}

/// 扫描编排器：借用检测器，持有抓取器
#[derive(Debug)]
pub struct Scanner<'d, F: PageFetcher> {
    detector: &'d TechDetector,
    fetcher: F,
}

impl<'d, F: PageFetcher> Scanner<'d, F> {
    pub fn new(detector: &'d TechDetector, fetcher: F) -> Self {
        Self { detector, fetcher }
    }

    pub fn detector(&self) -> &TechDetector {
        self.detector
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 扫描单个URL，失败以结果形式返回
    pub async fn scan(&self, input: &str) -> ScanResult {
        self.scan_with_cancel(input, std::future::pending::<()>()).await
    }

    /// 扫描单个URL；cancel 先完成时放弃抓取，结果为不可达
    pub async fn scan_with_cancel<C>(&self, input: &str, cancel: C) -> ScanResult
    where
        C: Future<Output = ()>,
    {
        let start = Instant::now();

        #[cfg(feature = "tracing")]
        let outcome = {
            use tracing::Instrument;
            self.run(input, cancel)
                .instrument(tracing::info_span!("scan", input = %input))
                .await
        };
        #[cfg(not(feature = "tracing"))]
        let outcome = self.run(input, cancel).await;

        match outcome {
            Ok(report) => {
                if report.is_partial() {
                    log::warn!(
                        "Scan of {} may be incomplete | Body truncated: {} | Budget exhausted: {}",
                        report.target.url,
                        report.body_truncated,
                        report.detection.budget_exhausted
                    );
                }
                log::info!(
                    "Scan of {} completed | Time: {}ms | Technologies: {} | Hits: {} | Markup parsed: {}",
                    report.target.url,
                    start.elapsed().as_millis(),
                    report.detection.technologies.len(),
                    report.detection.hit_count,
                    report.detection.markup_parsed
                );
                report.into()
            }
            Err(e) => {
                log::warn!("Scan of {} failed [{}]: {}", input.trim(), e.kind(), e);
                ScanResult::failure(&e)
            }
        }
    }

    /// 完整扫描流程（错误以 Result 形式返回）
    pub async fn run<C>(&self, input: &str, cancel: C) -> ProbeResult<ScanReport>
    where
        C: Future<Output = ()>,
    {
        let target = normalize_url(input)?;
        let options = &self.detector.config().fetch;

        let fetch = tokio::time::timeout(options.timeout, self.fetcher.fetch(&target.url, options));
        let page = tokio::select! {
            fetched = fetch => match fetched {
                Ok(page) => page?,
                Err(_) => {
                    return Err(StackProbeError::Unreachable(format!(
                        "{}: request timed out after {}ms",
                        target.url,
                        options.timeout.as_millis()
                    )))
                }
            },
            _ = cancel => {
                return Err(StackProbeError::Unreachable(format!(
                    "{}: scan cancelled",
                    target.url
                )))
            }
        };

        if !page.status.is_success() {
            return Err(StackProbeError::FetchError {
                status: page.status.as_u16(),
            });
        }

        let detection = self.detector.detect(&page.headers, &page.body)?;
        Ok(ScanReport {
            target,
            final_url: page.url,
            body_truncated: page.truncated,
            detection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchOptions, ScanConfig};
    use crate::error::ScanErrorKind;
    use crate::fetch::FetchedPage;
    use crate::utils::HeaderConverter;
    use async_trait::async_trait;
    use http::StatusCode;
    use stackprobe_engine::{Category, MatchType, SignalKind, SignatureRule, SignatureTable};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// 内存抓取桩：返回预设响应并记录请求
    struct StaticFetcher {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
        truncated: bool,
        unreachable: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn ok(body: &'static str) -> Self {
            Self {
                status: StatusCode::OK,
                headers: Vec::new(),
                body,
                truncated: false,
                unreachable: false,
                delay: None,
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn status(mut self, status: StatusCode) -> Self {
            self.status = status;
            self
        }

        fn header(mut self, name: &'static str, value: &'static str) -> Self {
            self.headers.push((name, value));
            self
        }

        fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Self::ok("")
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::ok("<html></html>")
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str, _options: &FetchOptions) -> ProbeResult<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.unreachable {
                return Err(StackProbeError::Unreachable(format!(
                    "{}: dns error: failed to lookup address information",
                    url
                )));
            }
            let mut page = FetchedPage::new(
                url,
                self.status,
                HeaderConverter::from_pairs(self.headers.iter().copied()),
                self.body.as_bytes().to_vec(),
            );
            page.truncated = self.truncated;
            Ok(page)
        }
    }

    fn detector(config: ScanConfig) -> TechDetector {
        let table = SignatureTable::from_rules([
            SignatureRule::new("WordPress", Category::Cms, "wordpress", SignalKind::RawBodyLower, MatchType::Contains, "wp-content"),
            SignatureRule::new("Next.js", Category::Framework, "nextdotjs", SignalKind::StructuralMarkers, MatchType::Exists, "").with_key("#__next"),
            SignatureRule::new("Cloudflare", Category::SecurityCdn, "cloudflare", SignalKind::HeaderMap, MatchType::Exists, "").with_key("cf-ray"),
            SignatureRule::new("Extra", Category::Other, "extra", SignalKind::RawBodyLower, MatchType::Contains, "never-present-token"),
        ]);
        TechDetector::with_table(Arc::new(table), config)
    }

    const WP_PAGE: &str = r#"<html><head><title> Blog </title><meta name="description" content="Posts"></head>
        <body><link rel="stylesheet" href="/wp-content/themes/t/style.css"></body></html>"#;

    #[tokio::test]
    async fn bare_domain_is_scanned_over_https() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::ok(WP_PAGE));
        let result = scanner.scan("example.com").await;

        assert!(result.is_success());
        assert_eq!(result.url(), Some("https://example.com"));
        assert_eq!(result.is_secure(), Some(true));
        assert_eq!(scanner.fetcher().calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            scanner.fetcher().requested.lock().unwrap().as_slice(),
            ["https://example.com".to_string()]
        );

        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.title, "Blog");
        assert_eq!(metadata.description, "Posts");

        let tech = result.tech().unwrap();
        assert_eq!(tech.len(), 1);
        assert_eq!(tech[0].name, "WordPress");
        assert_eq!(tech[0].category, Category::Cms);
    }

    #[tokio::test]
    async fn forbidden_status_is_a_fetch_error() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::ok(WP_PAGE).status(StatusCode::FORBIDDEN));
        let result = scanner.scan("https://blocked.example").await;

        assert!(!result.is_success());
        assert!(result.tech().is_none());
        assert_eq!(result.error_kind(), Some(ScanErrorKind::FetchError));
        assert!(result.error().is_some());
    }

    #[tokio::test]
    async fn dns_failure_is_unreachable() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::unreachable());
        let result = scanner.scan("no-such-host.invalid").await;

        assert!(!result.is_success());
        assert!(result.tech().is_none());
        assert_eq!(result.error_kind(), Some(ScanErrorKind::Unreachable));
    }

    #[tokio::test]
    async fn invalid_input_skips_fetch() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::ok(WP_PAGE));
        for input in ["", "ftp://example.com"] {
            let result = scanner.scan(input).await;
            assert_eq!(result.error_kind(), Some(ScanErrorKind::InvalidInput));
        }
        assert_eq!(scanner.fetcher().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plain_http_is_not_secure() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::ok(WP_PAGE));
        let result = scanner.scan("http://example.com").await;
        assert_eq!(result.is_secure(), Some(false));
    }

    #[tokio::test]
    async fn header_and_marker_signals_combine() {
        let d = detector(ScanConfig::default());
        let fetcher = StaticFetcher::ok(r#"<html><body><div id="__next"></div></body></html>"#)
            .header("CF-RAY", "8a1b2c3d");
        let scanner = Scanner::new(&d, fetcher);
        let result = scanner.scan("example.com").await;
        let names: Vec<_> = result.tech().unwrap().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Next.js", "Cloudflare"]);
        assert_eq!(result.metadata().unwrap().title, "No Title Found");
    }

    #[tokio::test]
    async fn interstitial_page_is_a_success_with_literal_metadata() {
        let d = detector(ScanConfig::default());
        let page = "<html><head><title>Just a moment...</title></head><body>Checking your browser</body></html>";
        let scanner = Scanner::new(&d, StaticFetcher::ok(page));
        let result = scanner.scan("example.com").await;
        assert!(result.is_success());
        assert_eq!(result.tech().map(<[_]>::len), Some(0));
        assert_eq!(result.metadata().unwrap().title, "Just a moment...");
    }

    #[tokio::test]
    async fn cancellation_aborts_the_fetch() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::slow(Duration::from_secs(30)));
        let result = scanner
            .scan_with_cancel("example.com", std::future::ready(()))
            .await;
        assert_eq!(result.error_kind(), Some(ScanErrorKind::Unreachable));
        assert!(result.tech().is_none());
    }

    #[tokio::test]
    async fn timeout_is_unreachable() {
        let config = ScanConfig::builder().timeout(Duration::from_millis(50)).build();
        let d = detector(config);
        let scanner = Scanner::new(&d, StaticFetcher::slow(Duration::from_secs(30)));
        let result = scanner.scan("example.com").await;
        assert_eq!(result.error_kind(), Some(ScanErrorKind::Unreachable));
    }

    #[tokio::test]
    async fn truncated_body_marks_the_report_partial() {
        let d = detector(ScanConfig::default());
        let complete = Scanner::new(&d, StaticFetcher::ok(WP_PAGE))
            .run("example.com", std::future::pending::<()>())
            .await
            .unwrap();
        assert!(!complete.is_partial());

        let fetcher = StaticFetcher {
            truncated: true,
            ..StaticFetcher::ok(WP_PAGE)
        };
        let report = Scanner::new(&d, fetcher)
            .run("example.com", std::future::pending::<()>())
            .await
            .unwrap();
        assert!(report.body_truncated);
        assert!(report.is_partial());
        assert_eq!(report.detection.technologies[0].name, "WordPress");
    }

    #[tokio::test]
    async fn repeated_scans_are_identical() {
        let d = detector(ScanConfig::default());
        let scanner = Scanner::new(&d, StaticFetcher::ok(WP_PAGE));
        let first = scanner.scan("example.com").await;
        let second = scanner.scan("example.com").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn adding_an_independent_rule_keeps_existing_results() {
        let base = detector(ScanConfig::default());
        let mut rules: Vec<SignatureRule> = base.table().rules().iter().map(|c| c.rule.clone()).collect();
        rules.push(SignatureRule::new("Contentful", Category::Cms, "contentful", SignalKind::RawBodyLower, MatchType::Contains, "ctfassets"));
        let extended = TechDetector::with_table(Arc::new(SignatureTable::from_rules(rules)), ScanConfig::default());

        let before = Scanner::new(&base, StaticFetcher::ok(WP_PAGE)).scan("example.com").await;
        let after = Scanner::new(&extended, StaticFetcher::ok(WP_PAGE)).scan("example.com").await;
        let names = |r: &ScanResult| -> Vec<String> { r.tech().unwrap().iter().map(|t| t.name.clone()).collect() };
        assert!(names(&before).iter().all(|n| names(&after).contains(n)));
    }
}
