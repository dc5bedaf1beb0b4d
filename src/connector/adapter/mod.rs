mod duckdb_chat_store;
mod http_relay_client;
mod in_memory_chat_store;
mod local_relay;
mod mock_chat_client;
mod openrouter_client;
mod subscription_hub;

pub use duckdb_chat_store::*;
pub use http_relay_client::*;
pub use in_memory_chat_store::*;
pub use local_relay::*;
pub use mock_chat_client::*;
pub use openrouter_client::*;
pub use subscription_hub::*;
