// SPDX-License-Identifier: MIT OR Apache-2.0
//! The interactive session loop.
//!
//! Reads commands from stdin while applying finished ingestions and file
//! change notifications as they arrive.

use crate::commands::{Command, HELP};
use crate::config::SessionConfig;
use crate::file_watcher::{FileEvent, FileWatcher, FileWatcherConfig};
use crate::report;
use crate::session::{Loaded, Reply, Session};
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

enum Event {
    Line(Option<String>),
    Loaded(Loaded),
    File(FileEvent),
}

/// Run a session until `quit` or end of input
pub async fn run(config: SessionConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config.clone());
    let (file_tx, mut file_rx) = mpsc::unbounded_channel();
    let mut watcher = if config.watch {
        Some(
            FileWatcher::new(FileWatcherConfig::from(&config), file_tx.clone())
                .context("failed to start file watcher")?,
        )
    } else {
        None
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line.context("failed to read stdin")?),
            Some(loaded) = session.next_loaded() => Event::Loaded(loaded),
            Some(file) = file_rx.recv() => Event::File(file),
        };

        match event {
            Event::Line(None) => break,
            Event::Line(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                let loading = matches!(command, Command::Load(_) | Command::Reload(..));
                match session.execute(command).await {
                    Ok(Reply::Message(text)) => println!("{text}"),
                    Ok(Reply::Silent) => {}
                    Ok(Reply::Quit) => return Ok(()),
                    Err(e) => eprintln!("{e}"),
                }
                if loading {
                    if let Some(watcher) = watcher.as_mut() {
                        let paths: Vec<_> = session.source_paths().map(|p| p.to_path_buf()).collect();
                        for path in paths {
                            if let Err(e) = watcher.watch_file(&path) {
                                tracing::warn!("Cannot watch {}: {e}", path.display());
                            }
                        }
                    }
                }
            }
            Event::Loaded(loaded) => {
                let node = loaded.node;
                session.apply(loaded);
                // Only the latest request for a node is announced
                if !session.is_loading(node) {
                    if let Some(line) = report::loaded_message(&session, node) {
                        println!("{line}");
                    }
                }
            }
            Event::File(FileEvent::Changed(path)) => {
                session.reload_changed(&path);
            }
            Event::File(FileEvent::Deleted(path)) => {
                tracing::warn!("{} was deleted; its models keep their last ports", path.display());
            }
            Event::File(FileEvent::Error(e)) => tracing::warn!("File watcher error: {e}"),
        }
    }

    // End of input: finish pending loads so scripted sessions see final ranks
    if session.pending() > 0 {
        tracing::info!("Waiting for {} pending load(s)", session.pending());
    }
    session.wait_idle().await;
    println!("{}", report::table(&session));
    drop(file_tx);
    Ok(())
}
