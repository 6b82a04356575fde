use clap::{Arg, ArgAction, Command};
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{CommentsClient, HttpCommentGateway},
    cli::{format_comment, print_comments, StderrNotifier, StdinConfirmer},
    config::{FileConfigStore, FilePreferenceStore, InMemoryPreferenceStore},
    tui::{run_tui, App, ChannelNotifier},
};
use application::{AppError, CommentStore, CreatePlacement};
use domain::{CommentId, SortField, SortOrder};
use ports::{AppConfig, ConfigStore, Confirmer, Notifier, PreferenceStore, DELETE_PROMPT};

const API_URL_ENV: &str = "COMMENT_HUB_API_URL";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    // Initialize logging to file so the TUI stays clean
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("comment-hub.log")?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = Command::new("comment-hub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("List, write and sort comments on a remote comment board")
        .long_about("A small client for a REST comment board.\n\nRun without a subcommand for the interactive terminal interface.")
        .arg(
            Arg::new("api_url")
                .long("api-url")
                .value_name("URL")
                .help("Comments collection URL (can also be set via COMMENT_HUB_API_URL env var)")
                .global(true)
        )
        .subcommand(
            Command::new("list")
                .about("List comments in the current sort order")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print comments as JSON")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("add")
                .about("Post a new comment")
                .arg(
                    Arg::new("text")
                        .help("Comment text")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("edit")
                .about("Replace the text of a comment")
                .arg(
                    Arg::new("id")
                        .help("Comment ID")
                        .required(true)
                        .value_parser(clap::value_parser!(i64))
                        .index(1)
                )
                .arg(
                    Arg::new("text")
                        .help("New comment text")
                        .required(true)
                        .index(2)
                )
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a comment")
                .arg(
                    Arg::new("id")
                        .help("Comment ID")
                        .required(true)
                        .value_parser(clap::value_parser!(i64))
                        .index(1)
                )
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .help("Skip the confirmation prompt")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("sort")
                .about("Show or change the saved sort preference")
                .subcommand(Command::new("show").about("Print the current sort preference"))
                .subcommand(
                    Command::new("field")
                        .about("Set the sort field, or toggle it when omitted")
                        .arg(
                            Arg::new("value")
                                .value_parser(["date", "id"])
                                .index(1)
                        )
                )
                .subcommand(
                    Command::new("order")
                        .about("Set the sort order, or toggle it when omitted")
                        .arg(
                            Arg::new("value")
                                .value_parser(["asc", "desc"])
                                .index(1)
                        )
                )
        )
        .get_matches();

    // Load configuration
    let config_store = match FileConfigStore::new() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("No config directory available, using defaults: {}", e);
            None
        }
    };
    let mut config = match &config_store {
        Some(store) => store.load_config().await?,
        None => AppConfig::default(),
    };

    // Override with command line arguments or environment variables
    if let Some(api_url) = matches.get_one::<String>("api_url") {
        config.api_url = api_url.clone();
        // Only an explicit flag is remembered
        if let Some(store) = &config_store {
            store.save_config(&config).await?;
        }
    } else if let Ok(api_url) = std::env::var(API_URL_ENV) {
        config.api_url = api_url;
    }

    let preferences: Arc<dyn PreferenceStore> = match FilePreferenceStore::new() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Sort preference will not be saved: {}", e);
            Arc::new(InMemoryPreferenceStore::new())
        }
    };

    // Create dependencies
    let api_client = CommentsClient::new(
        &config.api_url,
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    tracing::info!("Using comments API at {}", api_client.base_url());
    let gateway = Arc::new(HttpCommentGateway::new(api_client));
    let placement = if config.refetch_after_create {
        CreatePlacement::Refetch
    } else {
        CreatePlacement::Prepend
    };

    let build_store = |notifier: Arc<dyn Notifier>| {
        Arc::new(
            CommentStore::new(gateway.clone(), preferences.clone(), notifier)
                .with_create_placement(placement),
        )
    };

    // Handle subcommands
    match matches.subcommand() {
        None => {
            // Default behavior - run TUI
            let (notifier, notifications) = ChannelNotifier::new();
            let app = App::new(build_store(Arc::new(notifier)), notifications);

            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        Some((command, command_matches)) => {
            let store = build_store(Arc::new(StderrNotifier));
            run_command(&store, command, command_matches).await?;
        }
    }

    Ok(())
}

async fn run_command(
    store: &CommentStore,
    command: &str,
    matches: &clap::ArgMatches,
) -> Result<()> {
    match command {
        "list" => {
            if let Err(e) = store.initialize().await {
                eprintln!("❌ Failed to load comments: {e}");
                std::process::exit(1);
            }

            let snapshot = store.snapshot().await;
            if matches.get_flag("json") {
                let json = serde_json::to_string_pretty(&snapshot.comments)?;
                println!("{json}");
            } else {
                println!("Sorted by {}\n", snapshot.sort);
                print_comments(&snapshot.comments);
            }
        }
        "add" => {
            let text = required_text(matches);
            // A refetching store lists in the saved order
            store.restore_sort_preference().await;

            match store.add_comment(&text).await {
                Ok(comment) => {
                    println!("✅ Added comment");
                    println!("{}", format_comment(&comment));
                }
                Err(e) => exit_on_mutation_error(e),
            }
        }
        "edit" => {
            let id = required_id(matches);
            let text = required_text(matches);

            match store.update_comment(id, &text).await {
                Ok(comment) => {
                    println!("✅ Updated comment");
                    println!("{}", format_comment(&comment));
                }
                Err(e) => exit_on_mutation_error(e),
            }
        }
        "delete" => {
            let id = required_id(matches);
            if !matches.get_flag("yes") && !StdinConfirmer.confirm(DELETE_PROMPT) {
                println!("Cancelled");
                return Ok(());
            }

            match store.delete_comment(id).await {
                Ok(()) => println!("✅ Deleted comment #{id}"),
                Err(e) => exit_on_mutation_error(e),
            }
        }
        "sort" => run_sort_command(store, matches).await?,
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_sort_command(store: &CommentStore, matches: &clap::ArgMatches) -> Result<()> {
    let current = store.restore_sort_preference().await;

    let result = match matches.subcommand() {
        None | Some(("show", _)) => {
            println!("{current}");
            return Ok(());
        }
        Some(("field", field_matches)) => match field_matches.get_one::<String>("value") {
            Some(value) => {
                let field: SortField = value.parse().map_err(AppError::from)?;
                store.set_sort_field(field).await
            }
            None => store.toggle_sort_field().await,
        },
        Some(("order", order_matches)) => match order_matches.get_one::<String>("value") {
            Some(value) => {
                let order: SortOrder = value.parse().map_err(AppError::from)?;
                store.set_sort_order(order).await
            }
            None => store.toggle_sort_order().await,
        },
        _ => {
            eprintln!("❌ Unknown sort subcommand");
            std::process::exit(1);
        }
    };

    println!("Sorted by {}", store.sort_preference().await);
    if let Err(e) = result {
        eprintln!("❌ Failed to load comments: {e}");
        std::process::exit(1);
    }
    print_comments(&store.snapshot().await.comments);

    Ok(())
}

fn required_id(matches: &clap::ArgMatches) -> CommentId {
    // clap enforces presence and type
    CommentId(matches.get_one::<i64>("id").copied().unwrap_or_default())
}

fn required_text(matches: &clap::ArgMatches) -> String {
    matches
        .get_one::<String>("text")
        .cloned()
        .unwrap_or_default()
}

/// Everything but local validation was already reported by the notifier.
fn exit_on_mutation_error(error: AppError) -> ! {
    match error {
        AppError::Domain(e) => eprintln!("❌ {e}"),
        e => tracing::debug!("Command failed: {}", e),
    }
    std::process::exit(1);
}
