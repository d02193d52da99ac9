mod enums;
mod record;
mod rule;
mod signal;

// 导出常用项
pub use enums::{Category, MatchType, SignalKind};
pub use record::{icon_url, DetectionHit, TechnologyRecord, ICON_URL_TEMPLATE};
pub use rule::{EvidenceSpec, SignatureRule, TechSignature};
pub use signal::{SignalView, SignalViews, SignalViewsBuilder};
