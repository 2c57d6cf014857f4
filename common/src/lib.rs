//! IMANI Common Library
//!
//! 報告書照合パイプラインの純粋ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod heuristics;
pub mod diagnostic;
pub mod matching;
pub mod parser;
pub mod prompts;
pub mod progress;
pub mod table;
pub mod export;

pub use types::{DiagnosticRecord, ProjectRow, ResultRecord, RowStatus, RunMode, SENTINEL};
pub use error::{Error, Result};
pub use heuristics::{extract_date, extract_issuer};
pub use diagnostic::{basename, build_diagnostic};
pub use matching::{find_match, storage_prefix};
pub use parser::parse_recommendations;
pub use prompts::{build_recommendation_prompt, SYSTEM_PROMPT};
pub use progress::{estimate_remaining, format_hms};
pub use table::DiagnosticView;
