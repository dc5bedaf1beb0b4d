mod access_gate;
mod case_history;
mod chat_session;
mod health_analysis;
mod profile_setup;

pub use access_gate::*;
pub use case_history::*;
pub use chat_session::*;
pub use health_analysis::*;
pub use profile_setup::*;
