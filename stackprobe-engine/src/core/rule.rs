use serde::{Deserialize, Serialize};

use super::enums::{Category, MatchType, SignalKind};

/// 单条签名规则（纯数据，运行期不可变）
/// 1. tech/category/icon 为展示元数据，由规则自带，不做计算
/// 2. signal 决定规则读取哪个信号视图
/// 3. key 仅KV型视图使用（Header名/Meta名/结构选择器）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureRule {
    pub tech: String,
    pub category: Category,
    pub icon: String,
    pub signal: SignalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, rename = "type")]
    pub match_type: MatchType,
    #[serde(default)]
    pub pattern: String,
}

impl SignatureRule {
    pub fn new(
        tech: impl Into<String>,
        category: Category,
        icon: impl Into<String>,
        signal: SignalKind,
        match_type: MatchType,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            tech: tech.into(),
            category,
            icon: icon.into(),
            signal,
            key: None,
            match_type,
            pattern: pattern.into(),
        }
    }

    /// 链式设置KV键名
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// 日志用的规则描述
    pub fn describe(&self) -> String {
        match &self.key {
            Some(key) => format!("{}[{}] {:?} {}", self.signal, key, self.match_type, self.pattern),
            None => format!("{} {:?} {}", self.signal, self.match_type, self.pattern),
        }
    }
}

/// 分组格式中的单条证据（不含技术元数据）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceSpec {
    pub signal: SignalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, rename = "type")]
    pub match_type: MatchType,
    #[serde(default)]
    pub pattern: String,
}

/// 签名文件的分组格式：一个技术 + 多条证据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TechSignature {
    pub name: String,
    pub category: Category,
    pub icon: String,
    #[serde(default)]
    pub rules: Vec<EvidenceSpec>,
}

impl TechSignature {
    /// 展开为扁平规则列表，顺序与文件中一致
    pub fn into_rules(self) -> Vec<SignatureRule> {
        let TechSignature {
            name,
            category,
            icon,
            rules,
        } = self;
        rules
            .into_iter()
            .map(|spec| SignatureRule {
                tech: name.clone(),
                category,
                icon: icon.clone(),
                signal: spec.signal,
                key: spec.key,
                match_type: spec.match_type,
                pattern: spec.pattern,
            })
            .collect()
    }
}
