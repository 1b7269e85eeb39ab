pub mod body;
pub mod cli;
pub mod convert;
pub mod dispatcher;
pub mod entity;
pub mod manager;
pub mod queue;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod status;
pub mod worker_pool;

pub use body::{Json, ResponseBody};
pub use convert::{ConvertError, FromPathVar, PathVars};
pub use dispatcher::Dispatcher;
pub use entity::ResponseEntity;
pub use manager::RequestManager;
pub use router::{EndpointMatch, EndpointTrie, PatternError};
pub use server::{HttpRequest, HttpResponse, RequestSource, Transport};
pub use status::HttpStatus;
