//! stackprobe-engine 内核错误定义
//! 封装内核层所有核心错误，与业务层错误解耦，基于thiserror实现类型安全处理
use thiserror::Error;

use regex::Error as RegexError;

use crate::core::SignalKind;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 签名表相关错误 =====================
    /// 签名表加载失败（JSON格式错误等）
    #[error("Signature table load failed: {0}")]
    TableLoadError(String),

    /// 单条规则无效（缺少key、空模式等）
    #[error("Invalid rule #{index} for [{tech}]: {reason}")]
    InvalidRule {
        index: usize,
        tech: String,
        reason: String,
    },

    // ===================== 编译相关错误 =====================
    /// 正则表达式编译失败（语法错误/超出体积上限）
    #[error("Regex compilation failed: {0}")]
    RegexCompileError(#[from] RegexError),

    /// 正则可匹配空串，会命中任意输入
    #[error("Regex matches the empty string: {0}")]
    EmptyMatchRegex(String),

    /// 匹配方式与视图类型不兼容
    #[error("Match type {match_type} is not supported on signal {signal}")]
    UnsupportedMatch {
        match_type: &'static str,
        signal: SignalKind,
    },

    // ===================== 内核基础错误 =====================
    /// JSON解析失败
    #[error("JSON parse failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
