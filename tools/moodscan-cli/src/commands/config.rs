//! Show or initialize the config file.

use moodscan_common::config::AppConfig;

use super::Context;

pub fn run(ctx: &Context, init: bool) -> anyhow::Result<()> {
    if init {
        ctx.config
            .save_to(&ctx.config_path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", ctx.config_path.display()))?;
        println!("Wrote {}", ctx.config_path.display());
        return Ok(());
    }

    if !ctx.json {
        println!("# {}", ctx.config_path.display());
        if let Err(e) = AppConfig::try_load_from(&ctx.config_path) {
            println!("# [WARN] {e}; showing defaults");
        }
    }
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}
