//! Reactive runtime
//!
//! This module provides access to pompe-runtime, the runtime compiled
//! components call into.
//!
//! ## Example
//!
//! ```rust
//! use pompe::runtime::{Runtime, StatefulArray, ViewContent};
//!
//! let mut rt = Runtime::new();
//! let todos = StatefulArray::new(&mut rt, ["write", "test"]);
//! let view = rt.construct_list_view(&todos, |_, item, index| {
//! 	ViewContent::text(format!("{}. {} ", index + 1, item.get()))
//! });
//! let body = rt.document().body();
//! rt.document_mut().append_child(body, view);
//!
//! todos.push(&mut rt, "ship");
//! assert_eq!(rt.document().text_content(body), "1. write 2. test 3. ship ");
//! ```

// Re-export all pompe-runtime functionality
pub use pompe_runtime::*;
