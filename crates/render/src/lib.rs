//! Mixed-content rendering for assistant output.
//!
//! Segments text that mixes prose with code, SQL, HTML, CSS and LaTeX math
//! into typed runs, then hands each run to a per-kind renderer.
//!
//! # Example
//! ```
//! use aipa_render::{classify, SegmentKind};
//!
//! let segments = classify("Try this:\n```sql\nSELECT 1;\n```");
//! assert_eq!(segments[1].kind, SegmentKind::FencedCode);
//! assert_eq!(segments[1].language.as_deref(), Some("sql"));
//! ```

pub mod classifier;
pub mod dispatch;
pub mod language;
pub mod math;
mod patterns;
pub mod segment;

// Re-export main types
pub use classifier::classify;
pub use dispatch::{classify_and_render, render_markdown, MarkdownRenderer, Renderer, RendererMap};
pub use language::{detect_sql_dialect, guess_language, SqlDialect};
pub use math::normalize_inline_math;
pub use segment::{reconstruct, Delimiters, Segment, SegmentKind};
