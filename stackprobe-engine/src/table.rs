//! 签名表：进程内唯一的规则注册中心
//! 核心职责：
//! 1. 接收扁平规则或分组签名（JSON），逐条校验并编译匹配器
//! 2. 单条规则失败只跳过该规则并记录，不影响其余规则
//! 3. 构建完成后只读，可通过Arc在多个扫描间并发共享

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::{
    core::{Category, SignalKind, SignatureRule, TechSignature},
    error::{CoreError, CoreResult},
    matcher::{validate_rule, Matcher, RegexCache},
};

/// 编译后的规则（规则数据 + 匹配器）
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 规则在输入中的下标
    pub source_index: usize,
    pub rule: SignatureRule,
    pub matcher: Matcher,
}

/// 被跳过的规则记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    /// 规则在输入中的下标
    pub index: usize,
    pub tech: String,
    pub reason: String,
}

/// 签名文件格式：分组（推荐）或扁平规则列表
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignatureFile {
    Grouped(Vec<TechSignature>),
    Flat(Vec<SignatureRule>),
}

/// 签名表
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    rules: Vec<CompiledRule>,
    skipped: Vec<SkippedRule>,
    /// 技术名 → (分类, 图标)，以第一条规则为准
    identities: FxHashMap<String, (Category, String)>,
    regex_cache: RegexCache,
    /// 输入规则计数（含被跳过的）
    seen: usize,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从扁平规则列表构建
    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = SignatureRule>,
    {
        let mut table = Self::new();
        for rule in rules {
            table.push(rule);
        }
        log::debug!(
            "Signature table built | Rules: {} | Skipped: {} | Technologies: {}",
            table.rules.len(),
            table.skipped.len(),
            table.identities.len()
        );
        table
    }

    /// 从分组签名构建
    pub fn from_signatures<I>(signatures: I) -> Self
    where
        I: IntoIterator<Item = TechSignature>,
    {
        Self::from_rules(signatures.into_iter().flat_map(TechSignature::into_rules))
    }

    /// 从JSON字符串构建（分组数组或扁平数组）
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let file: SignatureFile = serde_json::from_str(json)
            .map_err(|e| CoreError::TableLoadError(format!("invalid signature JSON: {}", e)))?;
        Ok(Self::from_file(file))
    }

    /// 从JSON字节构建
    pub fn from_json_slice(bytes: &[u8]) -> CoreResult<Self> {
        let file: SignatureFile = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::TableLoadError(format!("invalid signature JSON: {}", e)))?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: SignatureFile) -> Self {
        match file {
            SignatureFile::Grouped(signatures) => Self::from_signatures(signatures),
            SignatureFile::Flat(rules) => Self::from_rules(rules),
        }
    }

    /// 严格模式：存在任何被跳过的规则即报错（构建期校验使用）
    pub fn into_strict(self) -> CoreResult<Self> {
        match self.skipped.first() {
            Some(skipped) => Err(CoreError::InvalidRule {
                index: skipped.index,
                tech: skipped.tech.clone(),
                reason: skipped.reason.clone(),
            }),
            None => Ok(self),
        }
    }

    /// 追加单条规则；失败的规则被记录并跳过，返回是否成功加入
    pub fn push(&mut self, mut rule: SignatureRule) -> bool {
        let index = self.seen;
        self.seen += 1;

        // Header/Meta视图的键为小写；选择器保持原样
        if matches!(rule.signal, SignalKind::HeaderMap | SignalKind::MetaTagValues) {
            if let Some(key) = rule.key.as_mut() {
                *key = key.trim().to_ascii_lowercase();
            }
        }

        if let Err(reason) = validate_rule(&rule) {
            self.skip(index, &rule, reason);
            return false;
        }

        let matcher = match Matcher::compile_with_cache(&rule, &mut self.regex_cache) {
            Ok(m) => m,
            Err(e) => {
                self.skip(index, &rule, e.to_string());
                return false;
            }
        };

        match self.identities.get(&rule.tech) {
            Some((category, icon)) if *category != rule.category || *icon != rule.icon => {
                log::warn!(
                    "Inconsistent identity for [{}]: rule #{} declares ({}, {}), keeping ({}, {})",
                    rule.tech,
                    index,
                    rule.category,
                    rule.icon,
                    category,
                    icon
                );
            }
            Some(_) => {}
            None => {
                self.identities
                    .insert(rule.tech.clone(), (rule.category, rule.icon.clone()));
            }
        }

        self.rules.push(CompiledRule {
            source_index: index,
            rule,
            matcher,
        });
        true
    }

    /// 链式追加规则
    pub fn with_rule(mut self, rule: SignatureRule) -> Self {
        self.push(rule);
        self
    }

    fn skip(&mut self, index: usize, rule: &SignatureRule, reason: String) {
        log::warn!(
            "Skipping signature rule #{} for [{}] ({}): {}",
            index,
            rule.tech,
            rule.describe(),
            reason
        );
        self.skipped.push(SkippedRule {
            index,
            tech: rule.tech.clone(),
            reason,
        });
    }

    /// 按外部校验剔除规则（如选择器语法由HTML解析层校验）
    /// 返回被剔除的数量
    pub fn reject_where<F>(&mut self, mut check: F) -> usize
    where
        F: FnMut(&SignatureRule) -> Option<String>,
    {
        let before = self.rules.len();
        let mut rejected = Vec::new();
        self.rules.retain(|compiled| match check(&compiled.rule) {
            Some(reason) => {
                rejected.push((compiled.source_index, compiled.rule.clone(), reason));
                false
            }
            None => true,
        });
        for (index, rule, reason) in rejected {
            self.skip(index, &rule, reason);
        }
        self.skipped.sort_by_key(|s| s.index);

        // 只保留仍有规则的技术
        let mut identities = FxHashMap::default();
        for compiled in &self.rules {
            identities
                .entry(compiled.rule.tech.clone())
                .or_insert_with(|| (compiled.rule.category, compiled.rule.icon.clone()));
        }
        self.identities = identities;
        before - self.rules.len()
    }

    /// 全部已编译规则（签名表顺序）
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 签名表覆盖的技术数量
    pub fn technology_count(&self) -> usize {
        self.identities.len()
    }

    /// 是否存在读取指定视图的规则
    pub fn uses_signal(&self, kind: SignalKind) -> bool {
        self.rules.iter().any(|c| c.rule.signal == kind)
    }

    /// 结构标记规则引用的全部选择器（去重，保持首次出现顺序）
    /// 提取阶段只探测这些选择器
    pub fn marker_selectors(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.rules
            .iter()
            .filter(|c| c.rule.signal == SignalKind::StructuralMarkers)
            .filter_map(|c| c.rule.key.as_deref())
            .filter(|key| seen.insert(*key))
            .collect()
    }
}
