//! Tech detector core module
//! 技术检测器核心
//! 核心职责：
//! 1. 签名表加载（内置/本地文件）
//! 2. 信号提取 → 规则执行 → 身份归并
//! 3. 提供基础检测/带耗时统计两个版本接口

use std::sync::Arc;
use std::time::Instant;

use http::HeaderMap;
use serde::Serialize;
use stackprobe_engine::{IdentityResolver, RuleEvaluator, SignatureTable, TechnologyRecord};

use crate::analyzer::{PageMetadata, SignalExtractor};
use crate::config::ScanConfig;
use crate::error::{ProbeResult, StackProbeError};
use crate::signatures;

/// 一次检测的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// 去重后的技术列表（首次命中顺序）
    pub technologies: Vec<TechnologyRecord>,
    pub metadata: PageMetadata,
    /// 是否执行了结构化解析
    pub markup_parsed: bool,
    /// 去重前的原始命中数
    pub hit_count: usize,
    /// 是否因执行预算耗尽而提前停止
    pub budget_exhausted: bool,
}

/// 技术检测器核心结构体
/// - table: 编译后的签名表（Arc共享，构建后只读）
/// - extractor: 按签名表预置选择器的信号提取器
#[derive(Debug, Clone)]
pub struct TechDetector {
    table: Arc<SignatureTable>,
    extractor: SignalExtractor,
    config: ScanConfig,
}

impl TechDetector {
    /// 按配置中的签名表来源创建检测器
    pub fn new(config: ScanConfig) -> ProbeResult<Self> {
        let table = signatures::load(&config.signatures)?;
        if table.is_empty() {
            return Err(StackProbeError::DetectorInitError(
                "signature table contains no usable rules".to_string(),
            ));
        }
        Ok(Self::with_table(table, config))
    }

    /// 使用内存中的签名表创建检测器
    pub fn with_table(table: Arc<SignatureTable>, config: ScanConfig) -> Self {
        let extractor = SignalExtractor::new(&table, config.class_scan_limit);
        Self {
            table,
            extractor,
            config,
        }
    }

    /// 使用内置签名表创建检测器
    #[cfg(feature = "embedded-signatures")]
    pub fn with_embedded_signatures(config: ScanConfig) -> ProbeResult<Self> {
        Ok(Self::with_table(signatures::embedded::table()?, config))
    }

    pub fn table(&self) -> &Arc<SignatureTable> {
        &self.table
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 核心检测方法（无耗时统计）
    /// 参数：
    /// - headers: HTTP头信息（HeaderMap）
    /// - body: HTTP响应体（字节数组）
    /// 返回：检测结果 | 严格模式下的解析错误
    pub fn detect(&self, headers: &HeaderMap, body: &[u8]) -> ProbeResult<Detection> {
        // 1. 信号提取（单次构建，后续只读）
        let signals = self.extractor.extract(headers, body);
        if let (true, Some(reason)) = (self.config.strict_markup, &signals.parse_error) {
            return Err(StackProbeError::ParseError(reason.clone()));
        }

        // 2. 规则执行
        let report = RuleEvaluator::new(&self.table)
            .with_budget(self.config.eval_budget)
            .evaluate(&signals.views);

        // 3. 身份归并
        let technologies = IdentityResolver::resolve(&report.hits);

        Ok(Detection {
            technologies,
            metadata: signals.metadata,
            markup_parsed: signals.markup_parsed,
            hit_count: report.hits.len(),
            budget_exhausted: report.budget_exhausted(),
        })
    }

    /// 核心检测方法（带全阶段耗时统计+详细日志）
    pub fn detect_log(&self, headers: &HeaderMap, body: &[u8]) -> ProbeResult<Detection> {
        let total_start = Instant::now();

        // 1. 信号提取 + 耗时统计
        let extract_start = Instant::now();
        let signals = self.extractor.extract(headers, body);
        let extract_cost = extract_start.elapsed();
        log::info!(
            "[Performance] Signal extraction completed | Time: {}ms ({:?}) | Markup parsed: {} | Views: {}",
            extract_cost.as_millis(),
            extract_cost,
            signals.markup_parsed,
            signals.views.summary()
        );
        if let (true, Some(reason)) = (self.config.strict_markup, &signals.parse_error) {
            return Err(StackProbeError::ParseError(reason.clone()));
        }

        // 2. 规则执行 + 耗时统计
        let report = RuleEvaluator::new(&self.table)
            .with_budget(self.config.eval_budget)
            .evaluate(&signals.views);
        log::info!(
            "[Performance] Rule evaluation completed | Time: {}ms ({:?}) | Rules evaluated: {}/{} | Hits: {}",
            report.elapsed.as_millis(),
            report.elapsed,
            report.evaluated,
            self.table.len(),
            report.hits.len()
        );

        // 3. 身份归并 + 耗时统计
        let resolve_start = Instant::now();
        let technologies = IdentityResolver::resolve(&report.hits);
        let resolve_cost = resolve_start.elapsed();
        log::info!(
            "[Performance] Identity resolution completed | Time: {}ms ({:?}) | Technologies: {}",
            resolve_cost.as_millis(),
            resolve_cost,
            technologies.len()
        );

        let total_cost = total_start.elapsed();
        log::info!(
            "[Total] Detection completed | Time: {}ms ({:?})",
            total_cost.as_millis(),
            total_cost
        );

        Ok(Detection {
            technologies,
            metadata: signals.metadata,
            markup_parsed: signals.markup_parsed,
            hit_count: report.hits.len(),
            budget_exhausted: report.budget_exhausted(),
        })
    }
}
