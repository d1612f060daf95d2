//! Delete a saved analysis.

use moodscan_analysis::RecordStore;
use uuid::Uuid;

use super::Context;

pub async fn run(ctx: &Context, id: Uuid) -> anyhow::Result<()> {
    let store = ctx.store();
    if !store.delete(id).await? {
        anyhow::bail!("No saved analysis with ID {id}");
    }
    println!("Deleted {id}");
    Ok(())
}
