// 核心公共结构体+枚举
pub mod core;
// 内核错误定义
pub mod error;
// 匹配器编译+执行
pub mod matcher;
// 签名表（规则注册中心）
pub mod table;
// 规则执行器
pub mod evaluator;
// 身份归并
pub mod resolver;
// 工具函数
pub mod utils;

// 顶层导出常用类型
pub use core::{
    icon_url, Category, DetectionHit, EvidenceSpec, MatchType, SignalKind, SignalView,
    SignalViews, SignalViewsBuilder, SignatureRule, TechSignature, TechnologyRecord,
    ICON_URL_TEMPLATE,
};
pub use error::{CoreError, CoreResult};
pub use evaluator::{EvalBudget, EvalReport, RuleEvaluator, DEFAULT_EVAL_BUDGET};
pub use matcher::Matcher;
pub use resolver::IdentityResolver;
pub use table::{CompiledRule, SignatureTable, SkippedRule};
