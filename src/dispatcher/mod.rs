//! # Dispatcher Module
//!
//! Binds `(method, URL template)` pairs to handler adapters and turns an
//! inbound request into a wire response.
//!
//! A handler adapter is a closure over `(raw_body, path_vars)` returning
//! `anyhow::Result<HttpResponse>`. Adapters are registered at boot, one
//! per method and template; afterwards the dispatcher is read-only and
//! safe to share across workers.
//!
//! Every failure mode ends in a normal wire response: unmatched paths and
//! unmapped methods produce a 404 JSON document, handler errors and
//! panics produce a 500 JSON document. The originating request's id and
//! source tag are stamped onto whatever comes out.

mod core;

pub use core::{Dispatcher, HandlerFn, HandlerResult};
