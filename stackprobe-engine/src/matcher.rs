use crate::{
    core::{MatchType, SignalKind, SignatureRule},
    error::{CoreError, CoreResult},
    utils::safe_lower::contains_ignore_ascii_case,
};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// 单条正则编译后的体积上限（NFA）
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;
/// 单条正则懒DFA缓存上限
pub const REGEX_DFA_SIZE_LIMIT: usize = 2 << 20;

/// 签名表构建期的正则缓存：相同模式只编译一次
pub type RegexCache = FxHashMap<String, Arc<Regex>>;

/// 运行时匹配器
/// 核心特性：
/// 1. 构建签名表时一次性编译，运行期只读
/// 2. 正则基于有限自动机，匹配耗时与输入长度线性相关，不存在回溯爆炸
/// 3. 针对已小写视图的字面量规则，模式在编译期转小写
#[derive(Debug, Clone)]
pub enum Matcher {
    /// 包含匹配（区分大小写）
    Contains(Arc<str>),
    /// 包含匹配（ASCII忽略大小写，模式已小写）
    IContains(Arc<str>),
    /// 正则匹配（忽略大小写）
    Regex(Arc<Regex>),
    /// 存在匹配（KV视图的键存在即命中）
    Exists,
}

impl Matcher {
    /// 从规则编译匹配器
    pub fn compile(rule: &SignatureRule) -> CoreResult<Self> {
        Self::compile_with_cache(rule, &mut RegexCache::default())
    }

    /// 从规则编译匹配器（复用正则缓存）
    pub fn compile_with_cache(rule: &SignatureRule, cache: &mut RegexCache) -> CoreResult<Self> {
        match rule.match_type {
            MatchType::Exists => {
                if !rule.signal.is_keyed() {
                    return Err(CoreError::UnsupportedMatch {
                        match_type: "exists",
                        signal: rule.signal,
                    });
                }
                Ok(Matcher::Exists)
            }
            MatchType::Contains | MatchType::IContains if rule.signal.is_case_folded() => {
                Ok(Matcher::Contains(Arc::from(rule.pattern.to_ascii_lowercase())))
            }
            MatchType::Contains => Ok(Matcher::Contains(Arc::from(rule.pattern.as_str()))),
            MatchType::IContains => Ok(Matcher::IContains(Arc::from(rule.pattern.to_ascii_lowercase()))),
            MatchType::Regex => {
                if let Some(re) = cache.get(&rule.pattern) {
                    return Ok(Matcher::Regex(re.clone()));
                }
                let re = Arc::new(Self::compile_regex(&rule.pattern)?);
                cache.insert(rule.pattern.clone(), re.clone());
                Ok(Matcher::Regex(re))
            }
        }
    }

    /// 正则编译公共逻辑
    /// 1. 忽略大小写 + 体积上限
    /// 2. 拒绝可匹配空串的模式（会命中任意页面）
    fn compile_regex(pattern: &str) -> CoreResult<Regex> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
            .build()?;

        if let Ok(hir) = regex_syntax::Parser::new().parse(pattern) {
            if hir.properties().minimum_len() == Some(0) {
                return Err(CoreError::EmptyMatchRegex(pattern.to_string()));
            }
        }
        Ok(re)
    }

    /// 判断是否为Exists类型匹配器
    #[inline(always)]
    pub fn is_exists(&self) -> bool {
        matches!(self, Matcher::Exists)
    }

    /// 执行匹配
    #[inline(always)]
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Matcher::Contains(s) => input.contains(&**s),
            Matcher::IContains(s) => contains_ignore_ascii_case(input, s),
            Matcher::Regex(re) => re.is_match(input),
            Matcher::Exists => true,
        }
    }

    /// 定位首个命中区间（仅用于日志预览）
    pub fn locate(&self, input: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Contains(s) => input.find(&**s).map(|start| (start, start + s.len())),
            Matcher::IContains(s) => input
                .to_ascii_lowercase()
                .find(&**s)
                .map(|start| (start, start + s.len())),
            Matcher::Regex(re) => re.find(input).map(|m| (m.start(), m.end())),
            Matcher::Exists => None,
        }
    }

    /// 描述匹配器规则（用于日志/调试输出）
    pub fn describe(&self) -> String {
        match self {
            Matcher::Contains(s) => format!("contains: {}", s),
            Matcher::IContains(s) => format!("icontains: {}", s),
            Matcher::Regex(re) => format!("regex: {}", re.as_str()),
            Matcher::Exists => "exists".to_string(),
        }
    }
}

/// 签名规则的静态校验，先于匹配器编译执行
pub(crate) fn validate_rule(rule: &SignatureRule) -> Result<(), String> {
    if rule.tech.trim().is_empty() {
        return Err("empty technology name".to_string());
    }
    if rule.signal.is_keyed() && rule.key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        return Err(format!("signal {} requires a key", rule.signal));
    }
    if rule.signal == SignalKind::StructuralMarkers && rule.match_type != MatchType::Exists {
        return Err("structural markers only support `exists`".to_string());
    }
    if rule.match_type != MatchType::Exists && rule.pattern.is_empty() {
        return Err("empty pattern".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    fn rule(signal: SignalKind, match_type: MatchType, pattern: &str) -> SignatureRule {
        SignatureRule::new("T", Category::Other, "t", signal, match_type, pattern)
    }

    #[test]
    fn literal_on_folded_body_is_lowered() {
        let m = Matcher::compile(&rule(SignalKind::RawBodyLower, MatchType::Contains, "WP-Content")).unwrap();
        assert!(m.matches("<link href=/wp-content/x.css>"));
    }

    #[test]
    fn icontains_ignores_case() {
        let m = Matcher::compile(&rule(SignalKind::ScriptSources, MatchType::IContains, "jQuery")).unwrap();
        assert!(m.matches("/static/JQUERY.min.js"));
        assert_eq!(m.locate("/x/JQuery.js"), Some((3, 9)));
    }

    #[test]
    fn regex_is_case_insensitive() {
        let m = Matcher::compile(&rule(SignalKind::ScriptSources, MatchType::Regex, r"react(?:-dom)?(?:\.production)?\.min\.js")).unwrap();
        assert!(m.matches("https://unpkg.com/React-DOM.production.min.js"));
        assert!(!m.matches("/preact.js"));
    }

    #[test]
    fn empty_matching_regex_is_rejected() {
        let err = Matcher::compile(&rule(SignalKind::RawBodyLower, MatchType::Regex, "a*")).unwrap_err();
        assert!(matches!(err, CoreError::EmptyMatchRegex(_)));
    }

    #[test]
    fn broken_regex_is_rejected() {
        let err = Matcher::compile(&rule(SignalKind::RawBodyLower, MatchType::Regex, "(unclosed")).unwrap_err();
        assert!(matches!(err, CoreError::RegexCompileError(_)));
    }

    #[test]
    fn exists_requires_keyed_signal() {
        let err = Matcher::compile(&rule(SignalKind::ScriptSources, MatchType::Exists, "")).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedMatch { .. }));
        let ok = Matcher::compile(&rule(SignalKind::HeaderMap, MatchType::Exists, "").with_key("cf-ray")).unwrap();
        assert!(ok.is_exists());
    }

    #[test]
    fn regex_cache_shares_compiled_patterns() {
        let mut cache = RegexCache::default();
        let r = rule(SignalKind::LinkHrefs, MatchType::Regex, r"bootstrap(?:\.min)?\.css");
        let a = Matcher::compile_with_cache(&r, &mut cache).unwrap();
        let b = Matcher::compile_with_cache(&r, &mut cache).unwrap();
        match (a, b) {
            (Matcher::Regex(a), Matcher::Regex(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected regex matchers"),
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn validation_catches_missing_key() {
        let r = rule(SignalKind::MetaTagValues, MatchType::Regex, "^wordpress");
        assert!(validate_rule(&r).is_err());
        assert!(validate_rule(&r.with_key("generator")).is_ok());
    }
}
