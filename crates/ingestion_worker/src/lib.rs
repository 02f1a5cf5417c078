pub mod domain;
pub mod ingestion_worker;
pub mod websocket;

pub use domain::*;
pub use ingestion_worker::*;
pub use websocket::*;
