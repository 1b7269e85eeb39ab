//! # Server Module
//!
//! Transport-facing types of the dispatch pipeline.
//!
//! The device serves two transports at once: a local one (on-device LAN)
//! and a cloud one (remote tunnel). The core never reads sockets itself;
//! it talks to both through the [`Transport`] trait and deals purely in
//! [`HttpRequest`] and [`HttpResponse`] values. Every request carries a
//! [`RequestSource`] tag and a request id, and its response is delivered
//! back over the transport the tag names.
//!
//! ```text
//! Transport A/B -> request queue -> RequestProcessor -> dispatcher
//!              -> response queue (per-source lane) -> ResponseProcessor -> Transport A/B
//! ```
//!
//! [`ChannelTransport`] is the in-memory implementation used by the demo
//! binary and the test suite.

mod processor;
mod response;
mod transport;

pub use processor::{RequestProcessor, ResponseProcessor};
pub use response::HttpResponse;
pub use transport::{ChannelTransport, HttpRequest, RequestSource, Transport};
