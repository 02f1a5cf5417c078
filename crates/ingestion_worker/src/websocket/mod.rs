pub(crate) mod subscriber;
mod url;

pub use subscriber::run_websocket_subscriber;
pub use url::validate_websocket_url;
