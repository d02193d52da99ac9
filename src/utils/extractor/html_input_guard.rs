/// HTML 输入守卫：负责在进入 HTML / DOM / Regex 分析前
/// 保证输入「值得分析」且「不会拖垮引擎」
use std::borrow::Cow;

pub struct HtmlInputGuard;

impl HtmlInputGuard {
    /// 最大 HTML 长度（2MB）
    pub const MAX_HTML_LEN: usize = 2 * 1024 * 1024;
    /// 最小有效长度（过滤不含标签的垃圾输入）
    pub const MIN_VALID_LEN: usize = 16;

    /// 超长保护（UTF-8 边界安全），未超长时零拷贝
    #[inline(always)]
    pub fn truncate(html: Cow<'_, str>) -> Cow<'_, str> {
        if html.len() <= Self::MAX_HTML_LEN {
            return html;
        }
        let mut cut = Self::MAX_HTML_LEN;
        while !html.is_char_boundary(cut) {
            cut -= 1;
        }
        log::debug!("HTML input truncated from {}B to {}B", html.len(), cut);
        match html {
            Cow::Borrowed(s) => Cow::Borrowed(&s[..cut]),
            Cow::Owned(mut s) => {
                s.truncate(cut);
                Cow::Owned(s)
            }
        }
    }

    /// 是否值得做结构化解析：含标签起始符，或去除首尾空白/控制字符后长度足够
    #[inline(always)]
    pub fn worth_parsing(html: &str) -> bool {
        let meaningful = |b: &u8| !b.is_ascii_whitespace() && !b.is_ascii_control();
        let bytes = html.as_bytes();
        let Some(start) = bytes.iter().position(meaningful) else {
            return false;
        };
        let end = bytes.iter().rposition(meaningful).map_or(0, |p| p + 1);
        end - start >= Self::MIN_VALID_LEN || bytes[start..end].contains(&b'<')
    }

    /// 截断 + 有效性校验；返回 None 表示不做结构化解析
    #[inline(always)]
    pub fn guard(html: Cow<'_, str>) -> Option<Cow<'_, str>> {
        let html = Self::truncate(html);
        Self::worth_parsing(&html).then_some(html)
    }
}
