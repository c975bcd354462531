use std::sync::Arc;

use anyhow::Result;
use cyclegraph_sync::{DirectoryState, SyncCoordinator};
use tokio::sync::watch;
use tracing::info;

use crate::context::AppContext;
use crate::output;

/// Keep the directory synced and reprint it whenever it settles, until Ctrl-C.
pub async fn run_watch(ctx: &AppContext) -> Result<()> {
    let directory = Arc::new(ctx.directory());
    let mut state_rx = directory.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let coordinator = SyncCoordinator::new(Arc::clone(&directory), ctx.poll_interval());
    let handle = tokio::spawn(coordinator.run(shutdown_rx));
    info!("Watching sessions from {}", ctx.config.server.url);

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                print_state(ctx, &state);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    handle.await?;
    Ok(())
}

fn print_state(ctx: &AppContext, state: &DirectoryState) {
    if state.is_loading {
        eprintln!("Loading sessions ({})...", ctx.mode.mode());
        return;
    }
    if let Some(error) = &state.error {
        eprintln!("Error: {error}");
    }
    if let Some(items) = &state.items {
        print!("{}", output::session_table(items));
    }
}
