//! Analyze text given on the command line.

use moodscan_analysis::AnalysisInput;

use super::Context;

pub async fn run(ctx: &Context, text: String) -> anyhow::Result<()> {
    let analyzer = ctx.analyzer(None);
    let result = analyzer.analyze(AnalysisInput::Text(text)).await?;
    ctx.print_result(&result)
}
