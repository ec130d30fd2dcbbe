//! meetai CLI binary entry point.

use clap::Parser;
use meetai::cli::{AuthCommands, Cli, Commands};
use meetai::config::MeetConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetai=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match MeetConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login => meetai::cli::auth::handle_login(&config).await,
            AuthCommands::Status => meetai::cli::auth::handle_status(&config).await,
            AuthCommands::Logout => meetai::cli::auth::handle_logout(&config).await,
        },
        Commands::Upload(args) => {
            meetai::cli::upload::handle_upload(&config, &args.path, &args.destination).await
        }
        Commands::Record(args) => {
            meetai::cli::upload::handle_record(&config, args.device.as_deref(), &args.destination)
                .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
