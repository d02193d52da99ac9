use rustc_hash::{FxHashMap, FxHashSet};

use super::enums::SignalKind;
use crate::utils::safe_lower::safe_lowercase;

/// 单个信号视图的只读借用
#[derive(Debug, Clone, Copy)]
pub enum SignalView<'a> {
    /// 文本型视图（body/script/link/inline/class）
    Text(&'a str),
    /// KV型视图（header/meta），key均为小写
    Keyed(&'a FxHashMap<String, String>),
    /// 结构标记集合（命中的选择器）
    Markers(&'a FxHashSet<String>),
}

impl SignalView<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            SignalView::Text(s) => s.is_empty(),
            SignalView::Keyed(m) => m.is_empty(),
            SignalView::Markers(s) => s.is_empty(),
        }
    }
}

/// 一次扫描的全部信号视图
/// 由 SignalViewsBuilder 一次性构建，构建完成后只暴露只读访问
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalViews {
    body_lower: String,
    headers: FxHashMap<String, String>,
    script_sources: String,
    link_hrefs: String,
    inline_scripts: String,
    markers: FxHashSet<String>,
    meta: FxHashMap<String, String>,
    css_classes: String,
}

impl SignalViews {
    pub fn builder() -> SignalViewsBuilder {
        SignalViewsBuilder::default()
    }

    /// 按类型取视图，所有规则共享同一份数据
    #[inline(always)]
    pub fn view(&self, kind: SignalKind) -> SignalView<'_> {
        match kind {
            SignalKind::RawBodyLower => SignalView::Text(&self.body_lower),
            SignalKind::HeaderMap => SignalView::Keyed(&self.headers),
            SignalKind::ScriptSources => SignalView::Text(&self.script_sources),
            SignalKind::LinkHrefs => SignalView::Text(&self.link_hrefs),
            SignalKind::InlineScriptText => SignalView::Text(&self.inline_scripts),
            SignalKind::StructuralMarkers => SignalView::Markers(&self.markers),
            SignalKind::MetaTagValues => SignalView::Keyed(&self.meta),
            SignalKind::CssClassTokens => SignalView::Text(&self.css_classes),
        }
    }

    pub fn body_lower(&self) -> &str {
        &self.body_lower
    }

    pub fn headers(&self) -> &FxHashMap<String, String> {
        &self.headers
    }

    pub fn markers(&self) -> &FxHashSet<String> {
        &self.markers
    }

    pub fn meta(&self) -> &FxHashMap<String, String> {
        &self.meta
    }

    /// 视图体积统计（日志用）
    pub fn summary(&self) -> String {
        format!(
            "body={}B headers={} script_src={}B link_href={}B inline={}B markers={} meta={} class={}B",
            self.body_lower.len(),
            self.headers.len(),
            self.script_sources.len(),
            self.link_hrefs.len(),
            self.inline_scripts.len(),
            self.markers.len(),
            self.meta.len(),
            self.css_classes.len()
        )
    }
}

/// 信号视图构建器（仅提取阶段可变）
#[derive(Debug, Default)]
pub struct SignalViewsBuilder {
    views: SignalViews,
}

impl SignalViewsBuilder {
    /// 原始响应体，统一转ASCII小写
    pub fn body(mut self, body: &str) -> Self {
        self.views.body_lower = safe_lowercase(body);
        self
    }

    /// Header名称统一转小写，同名Header保留先写入的值
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.views
                .headers
                .entry(safe_lowercase(name.as_ref()))
                .or_insert_with(|| value.into());
        }
        self
    }

    pub fn script_sources(mut self, combined: String) -> Self {
        self.views.script_sources = combined;
        self
    }

    pub fn link_hrefs(mut self, combined: String) -> Self {
        self.views.link_hrefs = combined;
        self
    }

    pub fn inline_scripts(mut self, text: String) -> Self {
        self.views.inline_scripts = text;
        self
    }

    pub fn markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views.markers.extend(markers.into_iter().map(Into::into));
        self
    }

    /// Meta名称统一转小写，同名Meta保留第一个
    pub fn meta<I, K, V>(mut self, meta: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, content) in meta {
            self.views
                .meta
                .entry(safe_lowercase(name.as_ref()))
                .or_insert_with(|| content.into());
        }
        self
    }

    pub fn css_classes(mut self, classes: String) -> Self {
        self.views.css_classes = classes;
        self
    }

    pub fn build(self) -> SignalViews {
        self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_normalizes_keys_and_body() {
        let views = SignalViews::builder()
            .body("<HTML>WP-Content</HTML>")
            .headers([("Server", "cloudflare"), ("SERVER", "nginx")])
            .meta([("Generator", "WordPress 6.4")])
            .markers(["#__next"])
            .build();

        assert_eq!(views.body_lower(), "<html>wp-content</html>");
        assert_eq!(views.headers().get("server").map(String::as_str), Some("cloudflare"));
        assert_eq!(views.meta().get("generator").map(String::as_str), Some("WordPress 6.4"));
        assert!(matches!(views.view(SignalKind::StructuralMarkers), SignalView::Markers(m) if m.contains("#__next")));
        assert!(views.view(SignalKind::CssClassTokens).is_empty());
    }
}
