//! Board Export entry point.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use board_export::{AutoConfirm, ConfirmGate};
use board_export_cli::config::{load_config, resolve_config_path, resolve_output_path};
use board_export_cli::{export_board, ChromiumRenderer, LaunchOptions, PromptGate};

#[derive(Parser)]
#[command(
    name = "board-export",
    about = "Export every task and comment on a kanban board, grouped by column",
    version
)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the board (default).
    Run(RunArgs),

    /// Print the resolved configuration as JSON.
    Config,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   board-export completions bash > ~/.local/share/bash-completion/completions/board-export
    ///   board-export completions zsh > ~/.zfunc/_board-export
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// DevTools websocket URL of an already running, logged-in browser.
    #[arg(long, conflicts_with_all = ["chrome", "user_data_dir", "headless"])]
    connect: Option<String>,

    /// Chromium binary to launch.
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Browser profile directory to reuse an existing login.
    #[arg(long)]
    user_data_dir: Option<PathBuf>,

    /// Launch without a visible window.
    #[arg(long)]
    headless: bool,

    /// Board URL; defaults to the first open tab showing a board.
    #[arg(long)]
    url: Option<String>,

    /// Output file. Also reads BOARD_EXPORT_OUTPUT.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let config = load_config(cli.config.as_deref())?;
            run(args, config).await?;
        }

        Commands::Config => {
            if let Some(path) = resolve_config_path(cli.config.as_deref()) {
                eprintln!("Config: {}", path.display());
            }
            let config = load_config(cli.config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "board-export", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn run(args: RunArgs, config: board_export::ExportConfig) -> anyhow::Result<()> {
    let output = resolve_output_path(args.output.as_deref());

    let renderer = match args.connect.as_deref() {
        Some(ws_url) => ChromiumRenderer::connect(ws_url).await?,
        None => {
            ChromiumRenderer::launch(LaunchOptions {
                chrome: args.chrome,
                user_data_dir: args.user_data_dir,
                headless: args.headless,
            })
            .await?
        }
    };

    let gate: &dyn ConfirmGate = if args.yes { &AutoConfirm } else { &PromptGate };
    export_board(&renderer, args.url.as_deref(), gate, config, &output).await
}
