//! gistdeck CLI - browse, search, star and fork GitHub gists.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use gistdeck::mutation::Action;
use tracing_subscriber::EnvFilter;

use crate::commands::shared::Context;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "gistdeck")]
#[command(version)]
#[command(about = "Browse, search, star and fork GitHub gists")]
#[command(
    long_about = "gistdeck talks to the GitHub Gist API. It lists public and per-user \
gists, finds gists by id, URL or keywords, and stars or forks them. Signing in with a \
personal access token unlocks your own gists and the write commands."
)]
#[command(after_long_help = r#"EXAMPLES
    List the newest public gists:
        $ gistdeck public

    Search by keywords, a gist id or a gist URL:
        $ gistdeck search "docker compose"
        $ gistdeck search https://gist.github.com/octocat/aa5a315d61ae9438b18d

    Sign in, then star and fork:
        $ gistdeck login --token ghp_xxx
        $ gistdeck star aa5a315d61ae9438b18d
        $ gistdeck fork aa5a315d61ae9438b18d

    Create a secret gist from local files:
        $ gistdeck create notes.md script.sh -d "Setup notes"

    Generate shell completions:
        $ gistdeck completions bash > ~/.local/share/bash-completion/completions/gistdeck

CONFIGURATION
    gistdeck reads configuration from:
      1. ~/.config/gistdeck/config.toml (or $XDG_CONFIG_HOME/gistdeck/config.toml)
      2. ./gistdeck.toml
      3. Environment variables (GISTDECK_* prefix, "__" between section and key)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GISTDECK_GITHUB__TOKEN                  GitHub personal access token
    GISTDECK_GITHUB__API_URL                API base URL (default: https://api.github.com)
    GISTDECK_GITHUB__REQUESTS_PER_SECOND    Request pacing, 0 disables (default: 10)
    GISTDECK_GITHUB__PER_PAGE               Listing page size when --per-page is omitted (default: 10)
    GISTDECK_SEARCH__USER_PAGES             Pages of your gists scanned by name search (default: 5)
    GISTDECK_SEARCH__PUBLIC_PAGES           Pages of public gists scanned by name search (default: 1)
    RUST_LOG                                Log filter when output is not a terminal
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Page selection shared by the listing commands.
#[derive(Debug, Clone, Copy, clap::Args)]
pub(crate) struct PageArgs {
    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Gists per page, 1-100 (default from config or 10)
    #[arg(long)]
    per_page: Option<u32>,
}

impl PageArgs {
    pub(crate) fn per_page_or(&self, default: u32) -> u32 {
        self.per_page.unwrap_or(default)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List public gists, newest first
    Public {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List a user's public gists
    User {
        /// GitHub login
        login: String,

        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List your own gists, including secret ones (requires login)
    Mine {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show a single gist
    Show {
        /// Gist id or URL
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Search gists by id, URL or keywords
    ///
    /// An id or URL opens that gist directly. Keywords search file contents
    /// and gist names; keyword search requires login.
    Search {
        /// Gist id, gist URL or keywords
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Create a gist from local files (requires login)
    Create {
        /// Files to upload, keyed by base name
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Gist description
        #[arg(short, long)]
        description: Option<String>,

        /// Make the gist public (secret by default)
        #[arg(long)]
        public: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Delete one of your gists (requires login)
    Delete {
        /// Gist id or URL
        id: String,
    },
    /// Star a gist (requires login)
    Star {
        /// Gist id or URL
        id: String,
    },
    /// Remove your star from a gist (requires login)
    Unstar {
        /// Gist id or URL
        id: String,
    },
    /// Fork a gist into your account (requires login)
    Fork {
        /// Gist id or URL
        id: String,
    },
    /// Sign in with a GitHub personal access token
    ///
    /// The token needs the `gist` scope. It is saved to the session file
    /// under your state directory.
    Login {
        /// Token (prompted for when omitted)
        #[arg(long, env = "GISTDECK_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Forget the saved token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when stdout is not a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("gistdeck=info,gistdeck_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    // Commands that don't need an API client
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    let ctx = Context::new(&config)?;

    match cli.command {
        Commands::Public { page, output } => {
            commands::gists::handle_public(&ctx, page, output).await?;
        }
        Commands::User {
            login,
            page,
            output,
        } => {
            commands::gists::handle_user(&ctx, &login, page, output).await?;
        }
        Commands::Mine { page, output } => {
            commands::gists::handle_mine(&ctx, page, output).await?;
        }
        Commands::Show { id, output } => {
            commands::gists::handle_show(&ctx, &id, output).await?;
        }
        Commands::Search { query, output } => {
            commands::search::handle_search(&ctx, &config, &query, output).await?;
        }
        Commands::Create {
            files,
            description,
            public,
            output,
        } => {
            commands::gists::handle_create(&ctx, &files, description, public, output).await?;
        }
        Commands::Delete { id } => {
            commands::gists::handle_delete(&ctx, &id).await?;
        }
        Commands::Star { id } => {
            commands::actions::handle_action(&ctx, Action::Star, &id).await?;
        }
        Commands::Unstar { id } => {
            commands::actions::handle_action(&ctx, Action::Unstar, &id).await?;
        }
        Commands::Fork { id } => {
            commands::actions::handle_action(&ctx, Action::Fork, &id).await?;
        }
        Commands::Login { token } => {
            commands::auth::handle_login(&ctx, token).await?;
        }
        Commands::Logout => commands::auth::handle_logout(&ctx)?,
        Commands::Whoami => commands::auth::handle_whoami(&ctx).await?,
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
