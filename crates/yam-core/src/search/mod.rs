//! Query filtering: pattern compilation, the filter pipeline, and the
//! dispatcher that keeps only the freshest result.

mod dispatch;
mod filter;
mod pattern;

pub use dispatch::{FilterDispatcher, FilterOutcome};
pub use filter::{FilterPipeline, FilterRequest};
pub use pattern::{FuzzyPattern, QueryMatcher};
