use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;

use super::Session;
use crate::cli::render::print_app_row;
use crate::store::ReconcileLoop;

#[derive(Args)]
pub struct WatchArgs {
    /// Exit once nothing is installing or uninstalling
    #[arg(long)]
    pub until_idle: bool,
}

pub async fn watch_command(session: &Session, args: WatchArgs) -> Result<()> {
    session.store.fetch_snapshot(false, None).await?;

    let busy = session.store.pending_ids();
    if busy.is_empty() {
        println!("{}", "Nothing is installing or uninstalling".dimmed());
        if args.until_idle {
            return Ok(());
        }
    }
    for app in session.store.apps().iter().filter(|app| app.status().is_busy()) {
        print_app_row(app);
    }

    if args.until_idle {
        follow_until_idle(session).await
    } else {
        follow_forever(session).await
    }
}

/// Poll until no app is busy or Ctrl-C is pressed
pub async fn follow_until_idle(session: &Session) -> Result<()> {
    let period = session.config.poll_interval();
    let poller = ReconcileLoop::new(session.store.clone(), period);
    let handle = poller.clone().spawn();

    let idle = async {
        loop {
            tokio::time::sleep(period).await;
            if session.store.pending_ids().is_empty() {
                break;
            }
        }
    };

    tokio::select! {
        _ = idle => info!("No pending operations left"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }
    // outcome notices of the last snapshot are raised before its tick ends
    while poller.is_fetching() {
        tokio::task::yield_now().await;
    }
    handle.stop();
    Ok(())
}

async fn follow_forever(session: &Session) -> Result<()> {
    let _poller = ReconcileLoop::new(session.store.clone(), session.config.poll_interval()).spawn();
    println!("{}", "Watching for status changes, Ctrl-C to stop".dimmed());
    tokio::signal::ctrl_c().await?;
    info!("Watch stopped");
    Ok(())
}
