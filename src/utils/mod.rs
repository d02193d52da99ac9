//! 工具模块：提供通用工具函数
pub mod extractor;
pub mod header_converter;

pub use self::extractor::{HtmlExtractor, HtmlInputGuard};
pub use self::header_converter::HeaderConverter;
