//! # Router Module
//!
//! URL-template matching for the dispatch pipeline.
//!
//! Templates mix literal segments with `{name}` variable segments:
//!
//! ```text
//! /api/device/status
//! /api/user/{userId}
//! /hello/{a}/{b}/{c}
//! ```
//!
//! [`EndpointTrie`] stores the registered templates and resolves a concrete
//! request path to at most one of them, extracting the variable bindings on
//! the way down. Literal segments always win over variable segments at the
//! same depth; among variable siblings, registration order decides.
//!
//! The trie is built once at boot and read-only afterwards, so concurrent
//! lookups need no locking.

mod trie;

pub use trie::{EndpointMatch, EndpointTrie, PatternError};
