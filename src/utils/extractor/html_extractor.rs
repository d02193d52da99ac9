//! HTML 信号提取器
//! 基于 lol_html 流式解析，一次遍历收集全部结构化信号：
//! <script src> / <link href> / 内联脚本 / <title> / <meta> / class属性 / 结构标记
//! 只读不改写：输出接收器直接丢弃
use std::cell::RefCell;

use lol_html::{element, text, HtmlRewriter, MemorySettings, Selector, Settings};
use rustc_hash::FxHashSet;

use crate::error::{ProbeResult, StackProbeError};

/// 单个资源地址长度上限
const MAX_URL_LEN: usize = 2048;
/// 单个meta内容长度上限
const MAX_META_CONTENT_LEN: usize = 4096;
/// 解析器内存上限
const MAX_PARSER_MEMORY: usize = 16 * 1024 * 1024;

/// 提取结果结构体
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractResult {
    /// <script src> 拼接（换行分隔）
    pub script_src_combined: String,
    /// <link href> 拼接（换行分隔）
    pub link_href_combined: String,
    /// 无src的<script>文本
    pub inline_script_text: String,
    /// 首个<title>文本（已trim，空则为None）
    pub title: Option<String>,
    /// meta description
    pub description: Option<String>,
    /// (小写name或property, content)，文档顺序
    pub meta_tags: Vec<(String, String)>,
    /// class属性拼接（空格分隔，有上限）
    pub css_classes: String,
    /// class扫描是否触达上限
    pub css_classes_truncated: bool,
    /// 命中的结构标记选择器
    pub markers: FxHashSet<String>,
}

/// 解析过程中的可变状态
#[derive(Debug, Default)]
struct ExtractState {
    result: ExtractResult,
    title_raw: String,
    titles_seen: usize,
    in_inline_script: bool,
}

impl ExtractState {
    fn push_script_src(&mut self, src: &str) {
        if !is_plain_url(src) {
            return;
        }
        self.result.script_src_combined.push_str(src);
        self.result.script_src_combined.push('\n');
    }

    fn push_link_href(&mut self, href: &str) {
        if !is_plain_url(href) {
            return;
        }
        self.result.link_href_combined.push_str(href);
        self.result.link_href_combined.push('\n');
    }

    /// from_name: 键来自 name 属性（页面描述只认 meta[name=description]）
    fn push_meta_tag(&mut self, name: &str, content: String, from_name: bool) {
        if content.len() > MAX_META_CONTENT_LEN {
            return;
        }
        let name = name.trim().to_ascii_lowercase();
        if from_name && name == "description" && self.result.description.is_none() {
            let trimmed = decode_basic_entities(content.trim());
            if !trimmed.is_empty() {
                self.result.description = Some(trimmed);
            }
        }
        self.result.meta_tags.push((name, content));
    }

    fn push_classes(&mut self, classes: &str, limit: usize) {
        if self.result.css_classes_truncated {
            return;
        }
        let classes = classes.trim();
        if classes.is_empty() {
            return;
        }
        if self.result.css_classes.len() + classes.len() + 1 > limit {
            self.result.css_classes_truncated = true;
            return;
        }
        self.result.css_classes.push_str(classes);
        self.result.css_classes.push(' ');
    }
}

/// 过滤明显不是URL的属性值
#[inline(always)]
fn is_plain_url(value: &str) -> bool {
    !(value.is_empty()
        || value.len() > MAX_URL_LEN
        || value.contains('<')
        || value.contains('>')
        || value.contains('\n')
        || value.contains('\r'))
}

/// 常见HTML实体解码（仅用于title/description展示）
fn decode_basic_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// 校验结构标记选择器，返回无法解析时的原因
pub fn validate_selector(selector: &str) -> Option<String> {
    selector
        .parse::<Selector>()
        .err()
        .map(|e| format!("unsupported selector `{}`: {}", selector, e))
}

/// 对外暴露的HTML提取器
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    /// 需要探测的结构标记选择器（已校验）
    marker_selectors: Vec<String>,
    class_scan_limit: usize,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self {
            marker_selectors: Vec::new(),
            class_scan_limit: 64 * 1024,
        }
    }
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置结构标记选择器；无法解析的选择器被跳过并记录
    pub fn with_markers<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.marker_selectors.clear();
        for selector in selectors {
            let selector = selector.as_ref();
            match validate_selector(selector) {
                None => self.marker_selectors.push(selector.to_string()),
                Some(reason) => log::warn!("Skipping structural marker: {}", reason),
            }
        }
        self
    }

    pub fn with_class_scan_limit(mut self, limit: usize) -> Self {
        self.class_scan_limit = limit;
        self
    }

    pub fn marker_selectors(&self) -> &[String] {
        &self.marker_selectors
    }

    /// 流式解析HTML；解析器报错时返回 ParseError
    pub fn extract(&self, html: &str) -> ProbeResult<ExtractResult> {
        let state = RefCell::new(ExtractState::default());
        let state = &state;
        let class_limit = self.class_scan_limit;

        let mut handlers = vec![
            // <script>：src进入脚本地址视图，无src的进入内联文本视图
            element!("script", move |el| {
                let mut st = state.borrow_mut();
                match el.get_attribute("src") {
                    Some(src) => {
                        st.in_inline_script = false;
                        st.push_script_src(src.trim());
                    }
                    None => st.in_inline_script = true,
                }
                Ok(())
            }),
            text!("script", move |t| {
                let mut st = state.borrow_mut();
                if st.in_inline_script {
                    st.result.inline_script_text.push_str(t.as_str());
                    if t.last_in_text_node() {
                        st.result.inline_script_text.push('\n');
                    }
                }
                Ok(())
            }),
            element!("link[href]", move |el| {
                if let Some(href) = el.get_attribute("href") {
                    state.borrow_mut().push_link_href(href.trim());
                }
                Ok(())
            }),
            // 只取第一个<title>
            element!("title", move |_el| {
                state.borrow_mut().titles_seen += 1;
                Ok(())
            }),
            text!("title", move |t| {
                let mut st = state.borrow_mut();
                if st.titles_seen == 1 {
                    st.title_raw.push_str(t.as_str());
                }
                Ok(())
            }),
            // <meta name|property content>
            element!("meta[content]", move |el| {
                let name = match el.get_attribute("name") {
                    Some(n) => Some((n, true)),
                    None => el.get_attribute("property").map(|p| (p, false)),
                };
                if let (Some((n, from_name)), Some(c)) = (name, el.get_attribute("content")) {
                    state.borrow_mut().push_meta_tag(&n, c, from_name);
                }
                Ok(())
            }),
            element!("[class]", move |el| {
                if let Some(classes) = el.get_attribute("class") {
                    state.borrow_mut().push_classes(&classes, class_limit);
                }
                Ok(())
            }),
        ];

        // 结构标记：选择器已校验，命中即记录
        for selector in &self.marker_selectors {
            let marker = selector.clone();
            handlers.push(element!(selector.as_str(), move |_el| {
                state.borrow_mut().result.markers.insert(marker.clone());
                Ok(())
            }));
        }

        let mut memory_settings = MemorySettings::default();
        memory_settings.max_allowed_memory_usage = MAX_PARSER_MEMORY;

        let settings = Settings {
            strict: false, // 兼容畸形HTML/大小写标签/残缺标签
            element_content_handlers: handlers,
            memory_settings,
            ..Settings::default()
        };

        let mut rewriter = HtmlRewriter::new(settings, |_: &[u8]| {});
        rewriter
            .write(html.as_bytes())
            .map_err(|e| StackProbeError::ParseError(e.to_string()))?;
        rewriter
            .end()
            .map_err(|e| StackProbeError::ParseError(e.to_string()))?;

        let ExtractState {
            mut result,
            title_raw,
            ..
        } = state.take();
        let title = decode_basic_entities(title_raw.trim());
        if !title.is_empty() {
            result.title = Some(title);
        }
        if result.css_classes_truncated {
            log::debug!(
                "Class attribute scan stopped at {}B limit",
                self.class_scan_limit
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>  Acme &amp; Co  </title>
            <meta name="description" content="Widgets for everyone">
            <meta NAME="Generator" content="WordPress 6.4" />
            <meta property="og:site_name" content="Acme">
            <link rel="stylesheet" href="/wp-content/themes/acme/style.css">
            <script src="/jquery.min.js"></script>
            <script>window.dataLayer = [];</script>
        </head>
        <body class="home page">
            <div id="__next"><svg><title>icon</title></svg></div>
            <span class="btn   md:flex"></span>
        </body>
        </html>
    "#;

    #[test]
    fn extracts_all_structural_signals() {
        let result = HtmlExtractor::new()
            .with_markers(["#__next", "[data-reactroot]"])
            .extract(PAGE)
            .unwrap();

        assert_eq!(result.title.as_deref(), Some("Acme & Co"));
        assert_eq!(result.description.as_deref(), Some("Widgets for everyone"));
        assert_eq!(result.script_src_combined, "/jquery.min.js\n");
        assert_eq!(result.link_href_combined, "/wp-content/themes/acme/style.css\n");
        assert!(result.inline_script_text.contains("window.dataLayer"));
        assert!(!result.inline_script_text.contains("jquery"));
        assert_eq!(
            result.meta_tags,
            vec![
                ("description".into(), "Widgets for everyone".into()),
                ("generator".into(), "WordPress 6.4".into()),
                ("og:site_name".into(), "Acme".into()),
            ]
        );
        assert_eq!(result.css_classes, "home page btn   md:flex ");
        assert!(result.markers.contains("#__next"));
        assert!(!result.markers.contains("[data-reactroot]"));
    }

    #[test]
    fn missing_elements_yield_empty_signals() {
        let result = HtmlExtractor::new().extract("<html><body><p>plain</p></body></html>").unwrap();
        assert_eq!(result.title, None);
        assert_eq!(result.description, None);
        assert!(result.script_src_combined.is_empty());
        assert!(result.markers.is_empty());
    }

    #[test]
    fn broken_html_is_tolerated() {
        let html = r#"<html><head><SCRIPT SRC="/react.js"></SCRIPT><meta NAME="generator" CONTENT="PHP 8.2"><script src="invalid<>src.js"></script><div class="a"><p>unclosed</head>"#;
        let result = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(result.script_src_combined, "/react.js\n");
        assert_eq!(result.meta_tags, vec![("generator".into(), "PHP 8.2".into())]);
        assert_eq!(result.css_classes, "a ");
    }

    #[test]
    fn description_only_comes_from_the_name_attribute() {
        let html = r#"<meta property="description" content="from-property"><meta property="og:title" content="Acme">"#;
        let result = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(result.description, None);
        assert_eq!(
            result.meta_tags,
            vec![
                ("description".into(), "from-property".into()),
                ("og:title".into(), "Acme".into()),
            ]
        );

        let html = r#"<meta property="description" content="p"><meta name="Description" content="n">"#;
        let result = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(result.description.as_deref(), Some("n"));
    }

    #[test]
    fn class_scan_is_bounded() {
        let html = r#"<div class="aaaaaaaa"></div><div class="bbbbbbbb"></div>"#;
        let result = HtmlExtractor::new().with_class_scan_limit(12).extract(html).unwrap();
        assert_eq!(result.css_classes, "aaaaaaaa ");
        assert!(result.css_classes_truncated);
    }

    #[test]
    fn invalid_marker_selectors_are_skipped() {
        let extractor = HtmlExtractor::new().with_markers(["#ok", "div:::nope"]);
        assert_eq!(extractor.marker_selectors(), ["#ok".to_string()]);
        assert!(validate_selector("div:::nope").is_some());
    }
}
