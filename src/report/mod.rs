//! Rendering of quotations: terminal summaries and the quote document.

pub mod document;
pub mod format;

pub use document::*;
pub use format::*;
