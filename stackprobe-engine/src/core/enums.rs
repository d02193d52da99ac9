use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 信号视图类型枚举，定义所有支持的检测维度
/// 每种视图在一次扫描中只构建一次，之后只读共享给所有规则
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// 完整响应体（ASCII小写）
    RawBodyLower,
    /// 响应头（名称小写 → 值）
    HeaderMap,
    /// <script src> 拼接
    ScriptSources,
    /// <link href> 拼接
    LinkHrefs,
    /// 内联脚本文本
    InlineScriptText,
    /// 结构标记（选择器命中集合）
    StructuralMarkers,
    /// Meta标签（name → content）
    MetaTagValues,
    /// class属性拼接（有界扫描）
    CssClassTokens,
}

impl SignalKind {
    pub const ALL: [SignalKind; 8] = [
        SignalKind::RawBodyLower,
        SignalKind::HeaderMap,
        SignalKind::ScriptSources,
        SignalKind::LinkHrefs,
        SignalKind::InlineScriptText,
        SignalKind::StructuralMarkers,
        SignalKind::MetaTagValues,
        SignalKind::CssClassTokens,
    ];

    /// KV型视图：规则必须携带key（Header名/Meta名/选择器）
    #[inline(always)]
    pub fn is_keyed(&self) -> bool {
        matches!(
            self,
            SignalKind::HeaderMap | SignalKind::StructuralMarkers | SignalKind::MetaTagValues
        )
    }

    /// 视图内容已经统一转为小写
    #[inline(always)]
    pub fn is_case_folded(&self) -> bool {
        matches!(self, SignalKind::RawBodyLower)
    }

    /// 依赖HTML解析的视图（解析失败时为空）
    #[inline(always)]
    pub fn requires_markup(&self) -> bool {
        !matches!(self, SignalKind::RawBodyLower | SignalKind::HeaderMap)
    }
}

impl Display for SignalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::RawBodyLower => write!(f, "body"),
            SignalKind::HeaderMap => write!(f, "header"),
            SignalKind::ScriptSources => write!(f, "script_src"),
            SignalKind::LinkHrefs => write!(f, "link_href"),
            SignalKind::InlineScriptText => write!(f, "inline_script"),
            SignalKind::StructuralMarkers => write!(f, "marker"),
            SignalKind::MetaTagValues => write!(f, "meta"),
            SignalKind::CssClassTokens => write!(f, "css_class"),
        }
    }
}

/// 匹配类型枚举，标记每条规则的匹配方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// 字面量子串（区分大小写）
    Contains,
    /// 字面量子串（忽略大小写）
    IContains,
    /// 正则（忽略大小写，线性时间）
    Regex,
    /// 存在性检测（仅用于 header/meta/marker）
    Exists,
}

impl Default for MatchType {
    fn default() -> Self {
        MatchType::IContains
    }
}

/// 技术分类，属于规则自带的展示元数据
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Category {
    Framework,
    Library,
    #[serde(rename = "CMS")]
    Cms,
    #[serde(rename = "E-commerce")]
    Ecommerce,
    #[serde(rename = "UI Framework")]
    UiFramework,
    Analytics,
    Hosting,
    #[serde(rename = "Security/CDN")]
    SecurityCdn,
    Payment,
    Authentication,
    Backend,
    #[serde(rename = "Font Service")]
    FontService,
    #[serde(rename = "Static Site Generator")]
    StaticSiteGenerator,
    #[serde(rename = "Site Builder")]
    SiteBuilder,
    Animation,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Framework => "Framework",
            Category::Library => "Library",
            Category::Cms => "CMS",
            Category::Ecommerce => "E-commerce",
            Category::UiFramework => "UI Framework",
            Category::Analytics => "Analytics",
            Category::Hosting => "Hosting",
            Category::SecurityCdn => "Security/CDN",
            Category::Payment => "Payment",
            Category::Authentication => "Authentication",
            Category::Backend => "Backend",
            Category::FontService => "Font Service",
            Category::StaticSiteGenerator => "Static Site Generator",
            Category::SiteBuilder => "Site Builder",
            Category::Animation => "Animation",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
