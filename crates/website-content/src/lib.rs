//! Website Content - resume data and page rendering
//!
//! Pages are rendered once at startup from the bilingual site content and
//! served from memory afterwards.

pub mod html;
pub mod lang;
pub mod pages;
pub mod resume;

// Re-exports
pub use lang::{Lang, Localized};
pub use pages::{Page, Pages, render_error_page, render_page};
pub use resume::Resume;
