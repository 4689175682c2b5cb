//! Process-local adapters. Each instance is isolated, which makes them the
//! backing store for tests.

mod refresh_token_store_memory;
mod user_repo_memory;

pub use refresh_token_store_memory::*;
pub use user_repo_memory::*;
