mod error;
mod routes;
mod server;

pub use error::{ApiError, MESSAGE_REQUIRED, SERVER_ERROR};
pub use routes::{build, RelayState};
pub use server::{serve, serve_with_shutdown};
