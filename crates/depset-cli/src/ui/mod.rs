//! Terminal output.

pub mod report;
pub mod theme;

pub use theme::{Theme, format_size};
