///
/// This module implements the CLI for cheatsheets: command parsing, wiring the
/// core [`Catalog`] to a repository and a favorites file, and printing results.
///
/// All behaviour (listing, cleaning, favorites) lives in the [`cheatsheets-core`] crate.
/// This module is strictly for glue and output formatting.
///
/// ## How To Use
/// - For command-line users: use the installed `cheatsheets` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`cheatsheets-core`]: ../../cheatsheets-core/
use crate::load_config::{resolve_config, CliConfig};
use anyhow::{Context, Result};
use cheatsheets_core::catalog::{Catalog, CatalogView};
use cheatsheets_core::contract::{Repository, SheetId};
use cheatsheets_core::favorites::{FavoritesStore, JsonFileStorage};
use cheatsheets_core::repository::{DirectoryRepository, GithubRepository};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for cheatsheets: browse devhints-style cheatsheets and keep favorites.
#[derive(Parser)]
#[clap(
    name = "cheatsheets",
    version,
    about = "Browse devhints-style cheatsheets from the terminal and keep a list of favorites"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all cheatsheets, favorites first
    List {
        /// Print the catalog as JSON instead of sections
        #[clap(long)]
        json: bool,
    },
    /// Print a cheatsheet as cleaned markdown
    Show { id: SheetId },
    /// Print the browsable URL of a cheatsheet
    Url { id: SheetId },
    /// Add or remove a favorite
    #[clap(subcommand)]
    Favorite(FavoriteCommand),
    /// Print the favorites in order
    Favorites,
}

#[derive(Subcommand)]
pub enum FavoriteCommand {
    /// Mark a cheatsheet as favorite
    Add { id: SheetId },
    /// Unmark a favorite
    Remove { id: SheetId },
}

type CliCatalog = Catalog<Box<dyn Repository>, JsonFileStorage>;

fn build_catalog(config: &CliConfig) -> Result<CliCatalog> {
    let repo_config = &config.core.repository;
    let repository: Box<dyn Repository> = match &repo_config.local_dir {
        Some(dir) => Box::new(DirectoryRepository::new(dir, &repo_config.site_url)),
        None => Box::new(
            GithubRepository::new(repo_config.clone(), config.github_token.clone())
                .context("Failed to set up GitHub client")?,
        ),
    };
    let storage = JsonFileStorage::new(config.core.favorites.resolved_path());
    Ok(Catalog::new(repository, FavoritesStore::new(storage)))
}

fn print_view(view: &CatalogView) {
    if !view.favorites.is_empty() {
        println!("Favorites");
        for id in &view.favorites {
            println!("  {id}");
        }
    }
    println!("Cheatsheets");
    for id in &view.others {
        println!("  {id}");
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = resolve_config(cli.config)?;
    let catalog = build_catalog(&config)?;

    match cli.command {
        Commands::List { json } => {
            tracing::info!(command = "list", "Listing cheatsheets");
            let view = catalog
                .list()
                .await
                .context("Could not list cheatsheets")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        Commands::Show { id } => {
            tracing::info!(command = "show", sheet = %id, "Showing cheatsheet");
            let markdown = catalog
                .open(&id)
                .await
                .with_context(|| format!("Could not open cheatsheet '{id}'"))?;
            println!("{markdown}");
        }
        Commands::Url { id } => {
            println!("{}", catalog.url_for(&id));
        }
        Commands::Favorite(FavoriteCommand::Add { id }) => {
            if catalog.add_favorite(&id).await? {
                println!("Added '{id}' to favorites");
            } else {
                println!("'{id}' is already a favorite");
            }
        }
        Commands::Favorite(FavoriteCommand::Remove { id }) => {
            if catalog.remove_favorite(&id).await? {
                println!("Removed '{id}' from favorites");
            } else {
                println!("'{id}' is not a favorite");
            }
        }
        Commands::Favorites => {
            for id in catalog.favorites().await? {
                println!("{id}");
            }
        }
    }

    let exit_span = tracing::info_span!("exit");
    exit_span.in_scope(|| {
        tracing::info!("command finished");
    });
    Ok(())
}
