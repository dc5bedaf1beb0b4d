use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swasthya::connector::api::{Container, ContainerConfig, Router};
use swasthya::{Commands, Config};

#[derive(Parser)]
#[command(name = "swasthya")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Overrides SWASTHYA_DATA_DIR
    #[arg(short, long, global = true)]
    data_dir: Option<String>,

    #[arg(long, global = true)]
    memory_storage: bool,

    /// Answer with a canned echo instead of calling OpenRouter
    #[arg(long, global = true)]
    mock_llm: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Config::from_env();
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    // RUST_LOG wins over SWASTHYA_LOG; --verbose forces debug
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let local_relay = matches!(cli.command, Commands::Chat { local: true, .. });

    let container = Container::new(ContainerConfig {
        settings,
        memory_storage: cli.memory_storage,
        mock_llm: cli.mock_llm,
        local_relay,
    })
    .await?;

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn chat_requires_uid() {
        let res = Cli::try_parse_from(["swasthya", "chat"]);
        assert!(res.is_err(), "chat without --uid should be rejected");
    }

    #[test]
    fn profile_fields_are_repeatable() {
        let cli = Cli::try_parse_from([
            "swasthya",
            "profile-setup",
            "--uid",
            "u1",
            "-f",
            "age=42",
            "-f",
            "village=Rampur",
        ])
        .unwrap();

        match cli.command {
            Commands::ProfileSetup { uid, field, .. } => {
                assert_eq!(uid, "u1");
                assert_eq!(field, vec!["age=42", "village=Rampur"]);
            }
            _ => panic!("expected profile-setup"),
        }
    }

    #[test]
    fn serve_accepts_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["swasthya", "serve", "--port", "9000", "--mock-llm"]).unwrap();
        assert!(cli.mock_llm);
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), public: false }));
    }
}
