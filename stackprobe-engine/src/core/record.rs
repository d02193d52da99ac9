use serde::{Deserialize, Serialize};

use super::enums::{Category, SignalKind};

/// 图标服务地址模板，按小写slug取图
pub const ICON_URL_TEMPLATE: &str = "https://cdn.simpleicons.org/{slug}";

/// 由slug生成图标地址
#[inline]
pub fn icon_url(slug: &str) -> String {
    ICON_URL_TEMPLATE.replace("{slug}", slug)
}

/// 单次规则命中（去重前的临时记录）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionHit {
    pub tech: String,
    pub category: Category,
    pub icon: String,
    /// 命中规则在签名表中的下标
    pub rule_index: usize,
    pub signal: SignalKind,
}

/// 去重后的技术记录（对外结果）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyRecord {
    pub name: String,
    pub category: Category,
    pub icon: String,
    pub icon_url: String,
}

impl From<&DetectionHit> for TechnologyRecord {
    fn from(hit: &DetectionHit) -> Self {
        Self {
            name: hit.tech.clone(),
            category: hit.category,
            icon: hit.icon.clone(),
            icon_url: icon_url(&hit.icon),
        }
    }
}

impl std::fmt::Display for TechnologyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}
