//! 扫描模块：URL → 抓取 → 检测 → ScanResult
pub mod result;
pub mod scanner;
pub mod target;

pub use self::result::ScanResult;
pub use self::scanner::{ScanReport, Scanner};
pub use self::target::{normalize_url, ScanTarget};

#[cfg(feature = "remote-fetch")]
mod remote {
    use once_cell::sync::OnceCell;

    use super::{ScanResult, Scanner};
    use crate::detector::global_detector;
    use crate::error::ProbeResult;
    use crate::fetch::ReqwestFetcher;

    /// 全局抓取器（复用连接池）
    static GLOBAL_FETCHER: OnceCell<ReqwestFetcher> = OnceCell::new();

    fn global_fetcher(detector: &crate::TechDetector) -> ProbeResult<ReqwestFetcher> {
        GLOBAL_FETCHER
            .get_or_try_init(|| ReqwestFetcher::new(&detector.config().fetch))
            .cloned()
    }

    /// 扫描单个URL（全局检测器 + 默认抓取器）
    /// 需在tokio运行时中调用
    pub async fn scan(url: &str) -> ScanResult {
        let detector = match global_detector() {
            Ok(d) => d,
            Err(e) => return ScanResult::failure(&e),
        };
        let fetcher = match global_fetcher(detector) {
            Ok(f) => f,
            Err(e) => return ScanResult::failure(&e),
        };
        Scanner::new(detector, fetcher).scan(url).await
    }
}

#[cfg(feature = "remote-fetch")]
pub use self::remote::scan;
