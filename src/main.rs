// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Convo Folders CLI entrypoint.
//!
//! Every command loads the persisted folder record from `--data-dir`, runs through the tree
//! store, and prints the result. `sync` reconciles cached titles against a sidebar snapshot.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use convo_folders::config::Config;
use convo_folders::error::{FolderError, StoreError};
use convo_folders::model::{ConversationId, ConversationReference, FolderId};
use convo_folders::ops::ApplyResult;
use convo_folders::query::walk;
use convo_folders::store::{FileBlobStore, TreeStore};
use convo_folders::sync::{
    build_conversation_url, extract_conversation_id, MemoryDocument, Reconciler,
    SnapshotNode,
};
use convo_folders::time::now_millis;
use convo_folders::transfer::{ImportOptions, ImportStrategy};

#[derive(Debug, Parser)]
#[command(name = "convo-folders", version, about = "Nested folders for chat conversation lists")]
struct Cli {
    /// Directory holding the persisted records.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// JSON config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the folder tree in display order.
    Tree,
    Create {
        name: String,
        #[arg(long)]
        parent: Option<FolderId>,
    },
    Rename {
        id: FolderId,
        name: String,
    },
    /// Delete a folder with its subfolders and their conversations.
    Delete { id: FolderId },
    Pin { id: FolderId },
    Expand { id: FolderId },
    /// Move a folder under `--to`, or to the root level.
    Move {
        id: FolderId,
        #[arg(long)]
        to: Option<FolderId>,
    },
    /// File a conversation; `root` names the root-level list.
    Add {
        folder: FolderId,
        url_or_id: String,
        title: String,
        /// Move from this folder instead of copying.
        #[arg(long)]
        from: Option<FolderId>,
    },
    /// Remove from `--from FOLDER`, or from every folder with `--everywhere`.
    Remove {
        conversation: ConversationId,
        #[arg(long, required_unless_present = "everywhere", conflicts_with = "everywhere")]
        from: Option<FolderId>,
        /// Remove from every folder, matching urls too.
        #[arg(long)]
        everywhere: bool,
    },
    /// Override the cached title of one entry.
    Retitle {
        folder: FolderId,
        conversation: ConversationId,
        title: String,
    },
    /// Write a versioned snapshot; a directory gets the default file name.
    Export { path: PathBuf },
    Import {
        file: PathBuf,
        /// Replace the tree instead of merging into it.
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        no_backup: bool,
    },
    /// Reconcile cached titles against a sidebar snapshot (JSON node list).
    Sync { snapshot: PathBuf },
}

fn folder_arg(id: FolderId) -> FolderId {
    if id.as_str() == "root" {
        FolderId::root()
    } else {
        id
    }
}

/// `--to root` and no `--to` both mean the root level.
fn move_target(to: Option<FolderId>) -> Option<FolderId> {
    to.map(folder_arg).filter(|parent| !parent.is_root())
}

fn conversation_arg(base_url: &str, raw: &str, title: &str) -> Result<ConversationReference, FolderError> {
    let (conversation_id, url) = match extract_conversation_id(raw) {
        Some(id) => (id, convo_folders::sync::identity::absolute_url(base_url, raw)),
        None => {
            let id = ConversationId::new(raw)
                .map_err(|err| FolderError::validation("conversation id", err.to_string()))?;
            let url = build_conversation_url(base_url, &id);
            (id, url)
        }
    };
    Ok(ConversationReference::new(
        conversation_id,
        title.trim(),
        url,
        now_millis(),
    ))
}

fn report(result: &ApplyResult) {
    if result.changed() {
        println!("ok");
    } else {
        println!("unchanged");
    }
}

fn print_tree(store: &TreeStore<FileBlobStore>) {
    let data = store.data();
    for row in walk(data) {
        let folder = row.folder;
        let marker = if folder.pinned() { "*" } else { " " };
        let fold = if folder.is_expanded() { "-" } else { "+" };
        println!(
            "{}{fold}{marker} {} ({}) [{}]",
            "  ".repeat(row.depth),
            folder.name(),
            folder.id(),
            data.contents(folder.id()).len()
        );
    }
    let loose = data.contents(&FolderId::root());
    if !loose.is_empty() {
        println!("root-level conversations:");
        for entry in loose {
            println!("  {} ({})", entry.title(), entry.conversation_id());
        }
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn run(cli: Cli, config: Config) -> Result<(), Box<dyn Error>> {
    let blobs = FileBlobStore::new(&cli.data_dir).with_durability(config.write_durability());
    let mut store = TreeStore::open(blobs, &config.storage_key, &config.backup_key)?;

    match cli.command {
        Command::Tree => print_tree(&store),
        Command::Create { name, parent } => {
            let id = store.create_folder(&name, parent.map(folder_arg))?;
            println!("{id}");
        }
        Command::Rename { id, name } => report(&store.rename_folder(id, &name)?),
        Command::Delete { id } => report(&store.delete_folder(id)?),
        Command::Pin { id } => report(&store.toggle_pin(id)?),
        Command::Expand { id } => report(&store.toggle_expand(id)?),
        Command::Move { id, to } => {
            let to = move_target(to);
            let result = store.move_folder(id.clone(), to)?;
            if let Some(rejection) = result.reparent_rejection() {
                if rejection.is_cycle() {
                    return Err(FolderError::Cycle {
                        folder_id: id,
                        reason: rejection.as_str(),
                    }
                    .into());
                }
                println!("refused: {}", rejection.as_str());
            } else {
                report(&result);
            }
        }
        Command::Add {
            folder,
            url_or_id,
            title,
            from,
        } => {
            let conversation = conversation_arg(&config.conversation_base_url, &url_or_id, &title)?;
            let folder = folder_arg(folder);
            let result = match from.map(folder_arg) {
                Some(source) => store.move_conversation(source, folder, conversation)?,
                None => store.add_conversation(folder, conversation, None)?,
            };
            report(&result);
        }
        Command::Remove {
            conversation,
            from,
            everywhere,
        } => {
            let result = match from.map(folder_arg) {
                Some(folder) if !everywhere => store.remove_conversation(folder, conversation)?,
                _ => store.remove_conversation_everywhere(conversation)?,
            };
            report(&result);
        }
        Command::Retitle {
            folder,
            conversation,
            title,
        } => report(&store.rename_conversation(folder_arg(folder), conversation, &title)?),
        Command::Export { path } => {
            let target = path.clone();
            let file_name = store
                .export_with(|file_name, json| async move {
                    let out = if target.is_dir() {
                        target.join(&file_name)
                    } else {
                        target
                    };
                    fs::write(&out, json).map_err(|source| StoreError::Io { path: out, source })
                })
                .await?;
            println!("exported {file_name}");
        }
        Command::Import {
            file,
            overwrite,
            no_backup,
        } => {
            let options = ImportOptions {
                strategy: if overwrite {
                    ImportStrategy::Overwrite
                } else {
                    ImportStrategy::Merge
                },
                create_backup: !no_backup,
            };
            let stats = store
                .import_from(async { read_file(&file) }, options)
                .await?;
            println!(
                "imported {} folders, {} conversations, skipped {} duplicates",
                stats.folders_imported,
                stats.conversations_imported,
                stats.duplicate_conversations_skipped
            );
        }
        Command::Sync { snapshot } => {
            let nodes: Vec<SnapshotNode> = serde_json::from_str(&read_file(&snapshot)?)
                .map_err(|source| StoreError::Json {
                    key: snapshot.display().to_string(),
                    source,
                })?;
            let doc = MemoryDocument::from_snapshot(&nodes);
            let mut reconciler = Reconciler::new(
                config.selectors.clone(),
                config.conversation_base_url.clone(),
                config.menu_retry(),
            );

            // A snapshot never changes, so a few missed probes are enough to give up.
            let interval = config.container_poll_interval();
            let wait = reconciler.await_container(&doc, interval);
            let Ok(container) = tokio::time::timeout(interval * 3, wait).await else {
                return Err(FolderError::NotFound {
                    what: config.selectors.sidebar_container.description.clone(),
                }
                .into());
            };
            tracing::debug!(container, "sidebar located");

            let summary = reconciler.full_pass(&doc, &mut store)?;
            println!(
                "indexed {} rows, updated {} titles",
                summary.rows_indexed, summary.titles_updated
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
