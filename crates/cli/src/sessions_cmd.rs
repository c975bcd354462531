use anyhow::{Result, bail};

use crate::context::AppContext;
use crate::output;

/// Load the directory once and print it.
pub async fn run_sessions(ctx: &AppContext, json: bool) -> Result<()> {
    let directory = ctx.directory();
    directory.load().await;
    let state = directory.snapshot();

    if let Some(error) = state.error {
        bail!(error);
    }
    let items = state.items.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        eprintln!("Source: {}", ctx.mode.mode());
        print!("{}", output::session_table(&items));
    }
    Ok(())
}

/// Load one session's report through the detail store and print it.
pub async fn run_show(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let detail = ctx.detail_store();
    detail.load(id).await;
    let state = detail.snapshot();

    if let Some(error) = state.error {
        bail!(error);
    }
    let Some(report) = state.report else {
        bail!("No report returned for {}", id.trim());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(report.as_value())?);
    } else {
        print!("{}", output::report_summary(id.trim(), &report));
    }
    Ok(())
}
