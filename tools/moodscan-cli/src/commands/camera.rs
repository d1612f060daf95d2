//! Capture a frame and analyze it.

use std::path::PathBuf;

use moodscan_analysis::{AnalysisResult, Analyzer};

use super::Context;

pub async fn run(ctx: &Context, source: Option<PathBuf>, retakes: u32) -> anyhow::Result<()> {
    let analyzer = ctx.analyzer(source.as_deref());

    let outcome = capture_and_analyze(&analyzer, retakes).await;
    analyzer.close_capture();

    let result = outcome?;
    ctx.print_result(&result)
}

async fn capture_and_analyze(analyzer: &Analyzer, retakes: u32) -> anyhow::Result<AnalysisResult> {
    let session = analyzer.open_capture()?;
    session.ready().await?;

    let (width, height) = session.frame_size();
    tracing::info!(width, height, "Camera streaming");

    session.capture()?;
    for attempt in 1..=retakes {
        tracing::info!(attempt, "Retaking");
        session.retake()?;
        session.capture()?;
    }

    Ok(analyzer.analyze_capture(&session).await?)
}
