pub mod preview;
pub mod safe_lower;
