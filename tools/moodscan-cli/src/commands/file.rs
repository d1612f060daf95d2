//! Analyze a file.

use std::path::PathBuf;

use moodscan_analysis::FileInput;

use super::Context;

pub async fn run(ctx: &Context, path: PathBuf) -> anyhow::Result<()> {
    let file = FileInput::from_path(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;

    if !ctx.json {
        println!("File: {} ({})", file.name, file.content_type);
    }

    let analyzer = ctx.analyzer(None);
    let result = analyzer.analyze(file.into()).await?;
    ctx.print_result(&result)
}
