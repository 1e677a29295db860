//! Output playlist generation

pub mod generator;
pub mod rewriter;

pub use generator::PlaylistGenerator;
pub use rewriter::{RewriteContext, rewrite, rewrite_result};
