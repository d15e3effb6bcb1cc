//! Diagnostic views of a resolved graph. None of them resolve anything.
pub mod dot;
pub mod pretty;
pub mod report;

pub use pretty::ERROR_MARKER;
pub use report::{ErrorReport, ModelReport, NodeReport};
