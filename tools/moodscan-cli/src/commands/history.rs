//! List saved analyses.

use moodscan_analysis::RecordStore;

use super::Context;

const PREVIEW_CHARS: usize = 60;

pub async fn run(ctx: &Context, search: Option<String>, limit: Option<usize>) -> anyhow::Result<()> {
    let store = ctx.store();
    let mut records = match search.as_deref() {
        Some(query) => store.search(query).await?,
        None => store.list().await?,
    };
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No saved analyses in {}", store.path().display());
        return Ok(());
    }

    for record in &records {
        let mut preview: String = record.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if preview.chars().count() > PREVIEW_CHARS {
            preview = preview.chars().take(PREVIEW_CHARS).collect::<String>() + "...";
        }
        println!(
            "{}  {}  {:<8} {:>3}%  [{}]  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.sentiment.label(),
            record.confidence,
            record.source,
            preview
        );
    }
    println!();
    println!("{} record(s)", records.len());
    Ok(())
}
