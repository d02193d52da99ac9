//! 信号提取器
//! 核心职责：
//! 1. Header转换为小写KV视图
//! 2. 响应体截断后转小写，作为原始子串视图（不依赖HTML解析）
//! 3. 通过输入守卫的响应体进入lol_html解析，产出其余结构化视图与元数据
//! 4. 解析失败时降级：结构化视图为空，Header/原始子串视图照常可用

use std::borrow::Cow;

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use stackprobe_engine::{SignalViews, SignatureTable};

use crate::utils::extractor::{ExtractResult, HtmlExtractor, HtmlInputGuard};
use crate::utils::HeaderConverter;

pub const TITLE_PLACEHOLDER: &str = "No Title Found";
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// 页面元数据（缺失时为占位文本，始终存在）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            title: TITLE_PLACEHOLDER.to_string(),
            description: DESCRIPTION_PLACEHOLDER.to_string(),
        }
    }
}

impl PageMetadata {
    pub fn from_parts(title: Option<String>, description: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            title: non_empty(title).unwrap_or_else(|| TITLE_PLACEHOLDER.to_string()),
            description: non_empty(description)
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
        }
    }
}

/// 一次提取的全部产物
#[derive(Debug, Clone)]
pub struct ExtractedSignals {
    pub views: SignalViews,
    pub metadata: PageMetadata,
    /// 结构化解析是否成功执行
    pub markup_parsed: bool,
    /// 解析失败原因（降级时记录）
    pub parse_error: Option<String>,
}

/// 信号提取器（按签名表预置结构标记选择器，可跨扫描复用）
#[derive(Debug, Clone, Default)]
pub struct SignalExtractor {
    html: HtmlExtractor,
}

impl SignalExtractor {
    pub fn new(table: &SignatureTable, class_scan_limit: usize) -> Self {
        Self {
            html: HtmlExtractor::new()
                .with_markers(table.marker_selectors())
                .with_class_scan_limit(class_scan_limit),
        }
    }

    pub fn html_extractor(&self) -> &HtmlExtractor {
        &self.html
    }

    /// 提取全部信号视图；本身不会失败
    pub fn extract(&self, headers: &HeaderMap, body: &[u8]) -> ExtractedSignals {
        let header_map = HeaderConverter::to_joined_map(headers);
        let html = HtmlInputGuard::truncate(String::from_utf8_lossy(body));

        let (markup, parse_error) = if HtmlInputGuard::worth_parsing(&html) {
            match self.html.extract(&html) {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    log::warn!("Markup parsing failed, continuing with header/body signals only: {}", e);
                    (None, Some(e.to_string()))
                }
            }
        } else {
            log::debug!("Body too short for markup parsing ({}B)", html.len());
            (None, None)
        };

        let builder = SignalViews::builder().body(&html).headers(header_map);
        let markup_parsed = markup.is_some();
        let (views, metadata) = match markup {
            Some(result) => Self::with_markup(builder, result),
            None => (builder.build(), PageMetadata::default()),
        };

        ExtractedSignals {
            views,
            metadata,
            markup_parsed,
            parse_error,
        }
    }

    fn with_markup(
        builder: stackprobe_engine::SignalViewsBuilder,
        result: ExtractResult,
    ) -> (SignalViews, PageMetadata) {
        let ExtractResult {
            script_src_combined,
            link_href_combined,
            inline_script_text,
            title,
            description,
            meta_tags,
            css_classes,
            markers,
            ..
        } = result;

        let views = builder
            .script_sources(script_src_combined)
            .link_hrefs(link_href_combined)
            .inline_scripts(inline_script_text)
            .meta(meta_tags)
            .css_classes(css_classes)
            .markers(markers)
            .build();
        (views, PageMetadata::from_parts(title, description))
    }
}

/// 便捷函数：无签名表上下文时的元数据提取
pub fn extract_metadata(body: &[u8]) -> PageMetadata {
    let html: Cow<'_, str> = String::from_utf8_lossy(body);
    match HtmlInputGuard::guard(html) {
        Some(html) => HtmlExtractor::new()
            .extract(&html)
            .map(|r| PageMetadata::from_parts(r.title, r.description))
            .unwrap_or_default(),
        None => PageMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackprobe_engine::{Category, MatchType, SignalKind, SignalView, SignatureRule};

    fn table() -> SignatureTable {
        SignatureTable::from_rules([SignatureRule::new(
            "Next.js",
            Category::Framework,
            "nextdotjs",
            SignalKind::StructuralMarkers,
            MatchType::Exists,
            "",
        )
        .with_key("#__next")])
    }

    #[test]
    fn builds_every_view() {
        let headers = HeaderConverter::from_pairs([("Server", "Vercel"), ("X-Vercel-Id", "iad1")]);
        let body = br#"<html><head><title>Home</title><meta name="generator" content="Next.js"></head>
            <body><div id="__next" class="app"><script src="/_next/static/chunks/main.js"></script></div></body></html>"#;

        let signals = SignalExtractor::new(&table(), 1024).extract(&headers, body);
        assert!(signals.markup_parsed);
        assert_eq!(signals.metadata.title, "Home");
        assert_eq!(signals.metadata.description, DESCRIPTION_PLACEHOLDER);

        let views = &signals.views;
        assert_eq!(views.headers().get("server").map(String::as_str), Some("Vercel"));
        assert!(views.body_lower().contains("_next/static"));
        assert!(views.markers().contains("#__next"));
        assert_eq!(views.meta().get("generator").map(String::as_str), Some("Next.js"));
        assert!(matches!(views.view(SignalKind::ScriptSources), SignalView::Text(s) if s.contains("main.js")));
        assert!(matches!(views.view(SignalKind::CssClassTokens), SignalView::Text(s) if s.contains("app")));
    }

    #[test]
    fn tiny_body_keeps_raw_and_header_views() {
        let headers = HeaderConverter::from_pairs([("cf-ray", "1")]);
        let signals = SignalExtractor::new(&table(), 1024).extract(&headers, b"wp-content");
        assert!(!signals.markup_parsed);
        assert!(signals.parse_error.is_none());
        assert_eq!(signals.views.body_lower(), "wp-content");
        assert!(signals.views.headers().contains_key("cf-ray"));
        assert_eq!(signals.metadata, PageMetadata::default());
    }

    #[test]
    fn short_markup_fragment_still_yields_markers() {
        let signals = SignalExtractor::new(&table(), 1024).extract(&HeaderMap::new(), b"<div id=__next>");
        assert!(signals.markup_parsed);
        assert!(signals.views.markers().contains("#__next"));
    }

    #[test]
    fn metadata_placeholders() {
        let meta = PageMetadata::from_parts(Some("   ".into()), None);
        assert_eq!(meta.title, TITLE_PLACEHOLDER);
        assert_eq!(meta.description, DESCRIPTION_PLACEHOLDER);
        assert_eq!(
            extract_metadata(b"<html><head><title>Shop</title></head></html>").title,
            "Shop"
        );
    }
}
