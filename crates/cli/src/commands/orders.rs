//! Order commands.

#![allow(clippy::print_stdout)]

use orderdesk_core::{OrderId, OrderSummary, StoreId, summarize_orders};
use orderdesk_server::bigcommerce::OrderListQuery;
use orderdesk_server::services::bulk_approval;

use super::{CommandError, Context};

/// Print a store's orders as a table, or as raw JSON with `json`.
pub async fn list(
    ctx: &Context,
    store_id: &str,
    query: &OrderListQuery,
    json: bool,
) -> Result<(), CommandError> {
    let state = ctx.state();
    let conn = state.registry().get(&StoreId::new(store_id)).await?;
    let orders = state.bigcommerce().list_orders(&conn, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&orders)?);
        return Ok(());
    }

    let records = orders.as_array().map_or(&[][..], Vec::as_slice);
    let (summaries, skipped) = summarize_orders(records);
    for (index, reason) in &skipped {
        tracing::warn!(index, error = %reason, "Skipping order without summary fields");
    }

    println!(
        "{:<10} {:<22} {:<24} {:>12}  {}",
        "ID", "CREATED", "STATUS", "TOTAL", "CUSTOMER"
    );
    for summary in &summaries {
        println!("{}", format_row(summary));
    }
    Ok(())
}

fn format_row(summary: &OrderSummary) -> String {
    let created = summary.created_at.map_or_else(
        || summary.date_created.clone(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    );
    format!(
        "{:<10} {:<22} {:<24} {:>12}  {}",
        summary.id,
        created,
        summary.status,
        summary.total.round_dp(2),
        summary.customer.name
    )
}

/// Approve orders and print each outcome.
///
/// # Errors
///
/// Returns `CommandError::ApprovalsFailed` when any order was not approved,
/// so the process exits non-zero.
pub async fn approve(
    ctx: &Context,
    store_id: &str,
    order_ids: Vec<OrderId>,
) -> Result<(), CommandError> {
    let state = ctx.state();
    let conn = state.registry().get(&StoreId::new(store_id)).await?;

    let result = bulk_approval::approve_all(
        state.bigcommerce(),
        &conn,
        order_ids,
        state.config().upstream.approval_concurrency,
    )
    .await?;

    for order_id in &result.succeeded {
        println!("approved {order_id}");
    }
    for failure in &result.failed {
        println!("failed   {}: {}", failure.order_id, failure.error);
    }

    if result.all_succeeded() {
        Ok(())
    } else {
        Err(CommandError::ApprovalsFailed {
            failed: result.failed.len(),
            total: result.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_row() {
        let summary = OrderSummary::from_upstream(&json!({
            "id": 101,
            "date_created": "Tue, 05 Mar 2024 10:00:00 +0000",
            "status": "Pending",
            "total_inc_tax": "19.9900",
            "billing_address": {"first_name": "Ada", "last_name": "Lovelace"}
        }))
        .unwrap();

        let row = format_row(&summary);
        assert!(row.starts_with("101"));
        assert!(row.contains("2024-03-05 10:00"));
        assert!(row.contains("19.99"));
        assert!(row.ends_with("Ada Lovelace"));
    }
}
