use anyhow::{Context, Result};

use crate::context::AppContext;
use crate::output;

pub fn set_demo(ctx: &AppContext, on: bool) -> Result<()> {
    ctx.mode
        .set_demo_active(on)
        .context("Failed to persist demo flag")?;
    println!("Data source: {}", ctx.mode.mode());
    Ok(())
}

pub fn demo_status(ctx: &AppContext) -> Result<()> {
    println!("Data source: {}", ctx.mode.mode());
    Ok(())
}

pub async fn run_progression(ctx: &AppContext, json: bool) -> Result<()> {
    let summary = ctx
        .demo()
        .progression()
        .await
        .context("Progression is only available from the demo dataset")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", output::progression_table(&summary));
    }
    Ok(())
}
