mod analyze;
mod health;

pub use analyze::{AnalyzeResponse, ErrorResponse, analyze_handler};
pub use health::health_handler;
