//! Helper functions shared by page builders

mod date;
mod html;

pub use date::*;
pub use html::*;
