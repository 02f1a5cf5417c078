mod error;
mod message;
mod pipeline;
mod pipeline_config;

pub use error::*;
pub use message::*;
pub use pipeline::*;
pub use pipeline_config::*;
