//! Turning declaration templates into published-ready letter artifacts.

pub mod document;
pub mod metrics;
pub mod placeholder;

pub use document::{Letter, LetterRenderer, PageLayout, RenderError};
