//! 规则执行器
//! 核心职责：
//! 1. 按签名表顺序，对每条规则取其对应的信号视图执行匹配
//! 2. 每次命中产出一条 DetectionHit（不做去重）
//! 3. 单次扫描的执行预算：超时后停止剩余规则并记录日志

use std::time::{Duration, Instant};

use crate::{
    core::{DetectionHit, SignalView, SignalViews},
    table::{CompiledRule, SignatureTable},
    utils::preview::match_snippet,
};

/// 默认单次扫描的规则执行预算
pub const DEFAULT_EVAL_BUDGET: Duration = Duration::from_millis(250);

/// 规则执行预算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalBudget {
    /// None 表示不限时
    pub max_duration: Option<Duration>,
}

impl Default for EvalBudget {
    fn default() -> Self {
        Self {
            max_duration: Some(DEFAULT_EVAL_BUDGET),
        }
    }
}

impl EvalBudget {
    pub fn unlimited() -> Self {
        Self { max_duration: None }
    }

    pub fn limited(max_duration: Duration) -> Self {
        Self {
            max_duration: Some(max_duration),
        }
    }
}

/// 一次执行的结果
#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    /// 原始命中（签名表顺序）
    pub hits: Vec<DetectionHit>,
    /// 实际执行的规则数
    pub evaluated: usize,
    /// 因预算耗尽未执行的规则数
    pub skipped_by_budget: usize,
    pub elapsed: Duration,
}

impl EvalReport {
    pub fn budget_exhausted(&self) -> bool {
        self.skipped_by_budget > 0
    }
}

/// 规则执行器（无状态，借用签名表）
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'t> {
    table: &'t SignatureTable,
    budget: EvalBudget,
}

impl<'t> RuleEvaluator<'t> {
    pub fn new(table: &'t SignatureTable) -> Self {
        Self {
            table,
            budget: EvalBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: EvalBudget) -> Self {
        self.budget = budget;
        self
    }

    /// 执行全部规则
    pub fn evaluate(&self, views: &SignalViews) -> EvalReport {
        let start = Instant::now();
        let rules = self.table.rules();
        let mut report = EvalReport::default();

        for (index, compiled) in rules.iter().enumerate() {
            if let Some(max) = self.budget.max_duration {
                if start.elapsed() > max {
                    report.skipped_by_budget = rules.len() - index;
                    log::warn!(
                        "Evaluation budget of {}ms exhausted, {} of {} rules not evaluated",
                        max.as_millis(),
                        report.skipped_by_budget,
                        rules.len()
                    );
                    break;
                }
            }

            report.evaluated += 1;
            let view = views.view(compiled.rule.signal);
            if view.is_empty() {
                continue;
            }
            if rule_matches(compiled, view) {
                report.hits.push(record_hit(index, compiled, view));
            }
        }

        report.elapsed = start.elapsed();
        report
    }
}

/// 单条规则对单个视图的匹配
#[inline(always)]
fn rule_matches(compiled: &CompiledRule, view: SignalView<'_>) -> bool {
    let matcher = &compiled.matcher;
    match view {
        SignalView::Text(text) => !matcher.is_exists() && matcher.matches(text),
        SignalView::Keyed(map) => {
            let Some(key) = compiled.rule.key.as_deref() else {
                return false;
            };
            match map.get(key) {
                Some(_) if matcher.is_exists() => true,
                Some(value) => matcher.matches(value),
                None => false,
            }
        }
        SignalView::Markers(markers) => compiled
            .rule
            .key
            .as_deref()
            .map_or(false, |selector| markers.contains(selector)),
    }
}

/// 命中处理：标准日志输出 + 生成命中记录
#[inline(always)]
fn record_hit(index: usize, compiled: &CompiledRule, view: SignalView<'_>) -> DetectionHit {
    let rule = &compiled.rule;
    if log::log_enabled!(log::Level::Debug) {
        let context = match view {
            SignalView::Text(text) => compiled
                .matcher
                .locate(text)
                .map(|(s, e)| match_snippet(text, s, e, 24).to_string())
                .unwrap_or_default(),
            SignalView::Keyed(map) => rule
                .key
                .as_deref()
                .and_then(|k| map.get(k))
                .map(|v| match_snippet(v, 0, v.len(), 0).to_string())
                .unwrap_or_default(),
            SignalView::Markers(_) => rule.key.clone().unwrap_or_default(),
        };
        log::debug!(
            "[{}] matched | Tech: {} | Rule #{}: {} | Context: {}",
            rule.signal,
            rule.tech,
            index,
            compiled.matcher.describe(),
            context
        );
    }

    DetectionHit {
        tech: rule.tech.clone(),
        category: rule.category,
        icon: rule.icon.clone(),
        rule_index: index,
        signal: rule.signal,
    }
}
