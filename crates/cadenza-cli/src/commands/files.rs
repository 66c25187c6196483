//! File record management backed by the JSON metadata store.

use anyhow::Context;
use cadenza_config::{EngineConfig, user_config_dir};
use cadenza_engine::Engine;
use cadenza_index::{FileId, FileMetadata};
use cadenza_io::{JsonMetadataStore, wav_metadata};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct FilesArgs {
    /// Metadata store (defaults to files.json in the user config directory)
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: FilesCommand,
}

#[derive(Subcommand)]
enum FilesCommand {
    /// Register a WAV file
    Add {
        /// WAV file to register
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Record id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List every record in id order
    List,

    /// Remove a record
    Remove {
        /// Record id
        id: String,
    },

    /// Search by filename substring and tags
    Search {
        /// Case-insensitive filename substring
        #[arg(default_value = "")]
        query: String,

        /// Tag to match (repeatable, any matches)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

fn print_record(meta: &FileMetadata) {
    let tags = if meta.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", meta.tags.join(", "))
    };
    println!(
        "  {:16} {:24} {:>8.2}s  {} Hz  {} ch{}",
        meta.id.as_str(),
        meta.filename,
        meta.duration_seconds,
        meta.sample_rate,
        meta.channels,
        tags
    );
}

pub fn run(args: FilesArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let store_path = args
        .store
        .unwrap_or_else(|| user_config_dir().join("files.json"));
    let store = JsonMetadataStore::open(&store_path)
        .with_context(|| format!("failed to open {}", store_path.display()))?;
    let engine = Engine::new(config.clone())?.with_metadata_store(Arc::new(store));
    engine.load_index()?;

    match args.command {
        FilesCommand::Add { input, id, tags } => {
            let id = match id {
                Some(id) => id,
                None => input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .context("cannot derive an id from the file name, pass --id")?,
            };
            let path = input.canonicalize().unwrap_or(input);
            let meta = wav_metadata(id, &path)?.with_tags(tags);
            let id = meta.id.clone();
            if engine.register_file(meta)?.is_some() {
                println!("Updated {}", id);
            } else {
                println!("Added {}", id);
            }
        }
        FilesCommand::List => {
            let files = engine.index().in_order();
            println!("{} file(s) in {}", files.len(), store_path.display());
            for meta in &files {
                print_record(meta);
            }
        }
        FilesCommand::Remove { id } => {
            let removed = engine.remove_file(&FileId::new(id))?;
            println!("Removed {} ({})", removed.id, removed.filename);
        }
        FilesCommand::Search { query, tags, limit } => {
            let files = engine.index().search(&query, &tags, limit);
            println!("{} match(es)", files.len());
            for meta in &files {
                print_record(meta);
            }
        }
    }

    Ok(())
}
