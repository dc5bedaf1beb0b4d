use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{CasesController, ChatController, ProfileController, ServeController};

pub struct Router<'a> {
    serve_controller: ServeController<'a>,
    chat_controller: ChatController<'a>,
    profile_controller: ProfileController<'a>,
    cases_controller: CasesController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            serve_controller: ServeController::new(container),
            chat_controller: ChatController::new(container),
            profile_controller: ProfileController::new(container),
            cases_controller: CasesController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve { port, public } => self.serve_controller.serve(port, public).await,
            Commands::Chat { uid, email, .. } => self.chat_controller.chat(uid, email).await,
            Commands::ProfileSetup { uid, email, field } => {
                self.profile_controller.setup(uid, email, field).await
            }
            Commands::Cases { uid } => self.cases_controller.list(uid).await,
            Commands::Transcript { uid, case } => {
                self.cases_controller.transcript(uid, case).await
            }
        }
    }
}
