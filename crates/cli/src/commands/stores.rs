//! Store registry commands.

#![allow(clippy::print_stdout)]

use orderdesk_core::StoreId;

use super::{CommandError, Context};

/// Print every connected store, one per line: `<id>\t<name>`.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let stores = ctx.state().registry().list().await;
    if stores.is_empty() {
        tracing::info!("No stores connected");
    }
    for store in stores {
        println!("{}\t{}", store.id, store.name);
    }
    Ok(())
}

/// Connect a store and print its new id.
pub async fn add(
    ctx: &Context,
    store_hash: &str,
    api_token: &str,
    name: Option<&str>,
) -> Result<(), CommandError> {
    let summary = ctx
        .state()
        .registry()
        .connect(store_hash, api_token, name)
        .await?;
    println!("{}\t{}", summary.id, summary.name);
    Ok(())
}

/// Remove a store.
pub async fn remove(ctx: &Context, store_id: &str) -> Result<(), CommandError> {
    ctx.state()
        .registry()
        .remove(&StoreId::new(store_id))
        .await?;
    println!("Removed {store_id}");
    Ok(())
}
