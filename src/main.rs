//! helix-sidekick: manage sidekick project configurations from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

use helix_sidekick::config::Settings;
use helix_sidekick::sidekick::fstab::{GitHubFstab, MountpointSource, StaticMountpoints};
use helix_sidekick::sidekick::FileStore;

mod commands;

#[derive(Parser)]
#[command(name = "helix-sidekick")]
#[command(about = "Manage Helix sidekick projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Do not fetch fstab.yaml; projects get no mountpoints
    #[arg(long, global = true)]
    no_fetch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a project from a share URL or a GitHub URL
    Add {
        /// Share URL (https://www.hlx.page/tools/sidekick/?...)
        #[arg(long, conflicts_with_all = ["giturl", "host", "project"], required_unless_present = "giturl")]
        share_url: Option<String>,

        /// GitHub URL (https://github.com/{owner}/{repo}[/tree/{ref}])
        #[arg(long)]
        giturl: Option<String>,

        /// Production host
        #[arg(long)]
        host: Option<String>,

        /// Project name
        #[arg(long)]
        project: Option<String>,
    },

    /// List all projects
    List,

    /// Edit a project (empty values clear a field)
    Edit {
        /// Project ID (see `list`)
        id: String,

        /// New GitHub URL
        #[arg(long)]
        giturl: Option<String>,

        /// New production host
        #[arg(long)]
        host: Option<String>,

        /// New project name
        #[arg(long)]
        project: Option<String>,
    },

    /// Delete a project
    Remove {
        /// Project ID (see `list`)
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print a share URL for a project
    Share {
        /// Project ID (see `list`)
        id: String,
    },

    /// Delete all projects and settings
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show which projects apply to a page URL
    Check {
        /// Page URL
        url: String,
    },

    /// Show or change whether the sidekick is displayed
    Display {
        #[arg(value_enum)]
        action: Option<commands::display::DisplayAction>,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let settings = Settings::load().context("Failed to load settings")?;
    let store = FileStore::open_default()?;
    let mountpoints: Box<dyn MountpointSource> = if cli.no_fetch {
        Box::new(StaticMountpoints::default())
    } else {
        Box::new(GitHubFstab::new(&settings))
    };

    match cli.command {
        Commands::Add {
            share_url,
            giturl,
            host,
            project,
        } => {
            let source = match (share_url, giturl) {
                (Some(share_url), _) => commands::add::AddSource::Share(share_url),
                (None, Some(giturl)) => commands::add::AddSource::Manual {
                    giturl,
                    host,
                    project,
                },
                (None, None) => anyhow::bail!("Either --share-url or --giturl must be provided"),
            };
            commands::add::execute(&store, mountpoints.as_ref(), source, &settings.default_ref)
                .await?;
        }

        Commands::List => {
            let output = commands::list::execute(&store, &settings).await?;
            println!("{}", output);
        }

        Commands::Edit {
            id,
            giturl,
            host,
            project,
        } => {
            let options = commands::edit::EditOptions {
                giturl,
                host,
                project,
            };
            commands::edit::execute(
                &store,
                mountpoints.as_ref(),
                &id,
                options,
                &settings.default_ref,
            )
            .await?;
        }

        Commands::Remove { id, yes } => {
            commands::remove::execute(&store, &id, yes, &settings.default_ref).await?;
        }

        Commands::Share { id } => {
            let url = commands::share::execute(&store, &id).await?;
            println!("{}", url);
        }

        Commands::Reset { yes } => {
            commands::reset::execute(&store, yes).await?;
        }

        Commands::Check { url } => {
            let output = commands::check::execute(&store, &settings, &url).await?;
            println!("{}", output);
        }

        Commands::Display { action } => {
            let display = commands::display::execute(&store, action).await?;
            println!(
                "Sidekick is {}",
                commands::display::describe(display).bold()
            );
        }
    }

    Ok(())
}
