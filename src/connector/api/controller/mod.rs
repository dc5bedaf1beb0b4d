pub mod cases_controller;
pub mod chat_controller;
pub mod profile_controller;
pub mod serve_controller;

pub use cases_controller::CasesController;
pub use chat_controller::{run_repl, ChatController};
pub use profile_controller::ProfileController;
pub use serve_controller::ServeController;
