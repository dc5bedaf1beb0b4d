use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay HTTP server (POST /api/chat)
    Serve {
        /// Listening port; defaults to $PORT or 8080
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the relay on all network interfaces
        #[arg(long)]
        public: bool,
    },

    /// Open a new case and chat with the assistant on stdin/stdout
    Chat {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        email: Option<String>,

        /// Run the relay pipeline in process instead of calling SWASTHYA_RELAY_URL
        #[arg(long)]
        local: bool,
    },

    /// Create or overwrite the profile gating access to chat
    ProfileSetup {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        email: Option<String>,

        /// Profile field as key=value; repeatable
        #[arg(short, long)]
        field: Vec<String>,
    },

    /// List a user's cases, newest first
    Cases {
        #[arg(long)]
        uid: String,
    },

    /// Print one case with its messages in order
    Transcript {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        case: String,
    },
}
