use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

use cardstash::clients::{CollectionStore, HttpNamingService, NamingService, OwnerId};
use cardstash::config::CardstashConfig;
use cardstash::telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
use cardstash::workflow::{Phase, SaveWorkflow};

type Item = serde_json::Value;

#[derive(Parser)]
#[command(name = "cardstash")]
#[command(about = "Persist generated item sets as uniquely named collections")]
#[command(long_about = "Cardstash takes an already-generated set of items, optionally asks the \
                        naming service for a suggested collection name, verifies the name is \
                        unused for the owning account, and persists the named collection.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, name, and persist a collection of items
    Save {
        /// JSON file holding the item array
        #[arg(long, help = "Path to a JSON array of items to save")]
        items: PathBuf,
        /// Owner identity token that scopes name uniqueness
        #[arg(long)]
        owner: String,
        /// Collection name to use
        #[arg(long, help = "Name for the collection; uniqueness is checked case-insensitively")]
        name: Option<String>,
        /// Ask the naming service to suggest a name first
        #[arg(long, help = "Request a generated name before saving")]
        generate_name: bool,
    },
    /// List collections saved for an owner
    List {
        /// Owner identity token
        #[arg(long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = CardstashConfig::load_env_file();
    let config = CardstashConfig::load()?;
    init_telemetry()?;
    match cli.command {
        Commands::Save {
            items,
            owner,
            name,
            generate_name,
        } => {
            let correlation_id = generate_correlation_id();
            let span = create_workflow_span("save", Some(&owner), Some(&correlation_id));
            run_save(&config, items, owner, name, generate_name)
                .instrument(span)
                .await
        }
        Commands::List { owner } => run_list(&config, owner).await,
    }
}

async fn run_save(
    config: &CardstashConfig,
    items_path: PathBuf,
    owner: String,
    name: Option<String>,
    generate_name: bool,
) -> Result<()> {
    if name.is_none() && !generate_name {
        bail!("provide --name or --generate-name");
    }

    let raw = tokio::fs::read_to_string(&items_path)
        .await
        .with_context(|| format!("reading items from {}", items_path.display()))?;
    let items: Vec<Item> =
        serde_json::from_str(&raw).context("items file must hold a JSON array")?;
    if items.is_empty() {
        bail!("items file holds no items");
    }

    let store = open_store(config).await?;
    let naming: Arc<dyn NamingService<Item>> = Arc::new(HttpNamingService::new(&config.naming)?);
    let workflow = SaveWorkflow::new(items, OwnerId::new(owner), naming, store);
    let completion = workflow.completion().await;

    if generate_name {
        let snapshot = workflow.request_name_suggestion().await;
        match snapshot.error {
            Some(failure) => bail!("name suggestion failed: {failure}"),
            None => println!("Suggested name: {}", snapshot.candidate_name),
        }
    }
    if let Some(name) = name {
        workflow.set_name(name).await;
    }

    let snapshot = workflow.submit().await;
    match snapshot.phase {
        Phase::Succeeded => {
            let id = match completion {
                Some(receiver) => receiver.await.ok(),
                None => None,
            };
            match id {
                Some(id) => println!("Saved '{}' as collection {}", snapshot.candidate_name, id),
                None => println!("Saved '{}'", snapshot.candidate_name),
            }
            Ok(())
        }
        _ => {
            let message = snapshot
                .error
                .map(|failure| failure.message)
                .unwrap_or_else(|| "save did not complete".to_string());
            bail!("save failed: {message}")
        }
    }
}

async fn run_list(config: &CardstashConfig, owner: String) -> Result<()> {
    let store = open_store(config).await?;
    let records = store.list_collections(&OwnerId::new(owner)).await?;
    if records.is_empty() {
        println!("No collections saved.");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {}  ({} items, created {})",
            record.id,
            record.name,
            record.items.len(),
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

#[cfg(feature = "database")]
async fn open_store(config: &CardstashConfig) -> Result<Arc<dyn CollectionStore<Item>>> {
    use cardstash::clients::SqliteCollectionStore;

    std::fs::create_dir_all(&config.store.data_dir)
        .with_context(|| format!("creating data directory {}", config.store.data_dir))?;
    let store =
        SqliteCollectionStore::new(&config.store.database_url(), config.store.auto_migrate).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "database"))]
async fn open_store(_config: &CardstashConfig) -> Result<Arc<dyn CollectionStore<Item>>> {
    use cardstash::clients::InMemoryCollectionStore;

    tracing::warn!(
        "built without the 'database' feature; collections are held in memory and not durable"
    );
    Ok(Arc::new(InMemoryCollectionStore::new()))
}
