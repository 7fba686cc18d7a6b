use clap::Parser;
use passvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PASSVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => passvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref title,
            ref username,
        } => passvault::cli::commands::add::execute(&cli, title, username.as_deref()),
        Commands::List => passvault::cli::commands::list::execute(&cli),
        Commands::Show { ref title, copy } => {
            passvault::cli::commands::show::execute(&cli, title, copy)
        }
        Commands::Edit {
            ref title,
            ref username,
        } => passvault::cli::commands::edit::execute(&cli, title, username.as_deref()),
        Commands::Delete { ref title, force } => {
            passvault::cli::commands::delete::execute(&cli, title, force)
        }
        Commands::Repair => passvault::cli::commands::repair::execute(&cli),
        Commands::Completions { shell } => passvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
