//! JavaScript front-end
//!
//! This module provides access to pompe-ast: the oxc parser configured for
//! JavaScript with embedded markup, plus span-based source edits.

// Re-export all pompe-ast functionality
pub use pompe_ast::*;
