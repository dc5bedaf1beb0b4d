mod case_repository;
mod chat_client;
mod message_repository;
mod profile_repository;
mod relay_client;
mod subscription;

pub use case_repository::*;
pub use chat_client::*;
pub use message_repository::*;
pub use profile_repository::*;
pub use relay_client::*;
pub use subscription::*;
