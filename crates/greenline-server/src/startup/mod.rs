//! Server startup module

pub mod http;
pub mod logging;
pub mod shutdown;

pub use http::http_server;
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{GracefulShutdown, ShutdownSignal, wait_for_shutdown_signal};
