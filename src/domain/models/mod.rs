mod analysis;
mod case;
mod chat_message;
mod identity;
mod relay;
mod user_profile;

pub use analysis::*;
pub use case::*;
pub use chat_message::*;
pub use identity::*;
pub use relay::*;
pub use user_profile::*;

/// Milliseconds since the Unix epoch; the store-side clock for every timestamp.
pub fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
