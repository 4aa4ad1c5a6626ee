//! Gravity classification engine.
//!
//! All list data is compiled into an immutable [`ListIndex`] that is swapped
//! atomically on reload. Client scopes and cached hop verdicts live inside
//! the index, so a swap invalidates them together.

mod client_scope;
mod compiler;
mod decision_cache;
mod engine;
mod list_index;

pub use client_scope::ClientScope;
pub use compiler::compile_list_index;
pub use decision_cache::DecisionCache;
pub use engine::GravityEngine;
pub use list_index::{GroupMask, HopMatch, ListIndex, MAX_GROUPS};
