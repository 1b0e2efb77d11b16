//! Normalised view of upstream order records.
//!
//! The upstream orders listing is loosely typed JSON. [`OrderSummary`]
//! extracts the handful of fields an operator needs to decide on approval and
//! rejects records that are missing the essentials.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::id::OrderId;

/// Reasons an upstream order record cannot be summarised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderSummaryError {
    #[error("Invalid order ID")]
    InvalidId,
    #[error("Missing status")]
    MissingStatus,
    #[error("Missing billing address")]
    MissingBillingAddress,
}

/// Billing customer attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
}

/// Operator-facing summary of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    /// Raw upstream creation timestamp.
    pub date_created: String,
    /// Parsed creation timestamp, when the upstream value is RFC 2822.
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    /// Total including tax; zero when the upstream value is missing or unparseable.
    pub total: Decimal,
    pub payment_status: String,
    pub items_total: u64,
    pub customer: CustomerSummary,
}

impl OrderSummary {
    /// Summarise a single upstream order record.
    ///
    /// # Errors
    ///
    /// Returns `OrderSummaryError` when the record has no numeric id, no
    /// status string, or no billing address object.
    pub fn from_upstream(order: &Value) -> Result<Self, OrderSummaryError> {
        let id = order
            .get("id")
            .and_then(Value::as_u64)
            .map(OrderId::new)
            .ok_or(OrderSummaryError::InvalidId)?;
        let status = order
            .get("status")
            .and_then(Value::as_str)
            .ok_or(OrderSummaryError::MissingStatus)?;
        let billing = order
            .get("billing_address")
            .filter(|b| b.is_object())
            .ok_or(OrderSummaryError::MissingBillingAddress)?;

        let date_created = text(order, "date_created");
        let created_at = DateTime::parse_from_rfc2822(&date_created)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        let customer = CustomerSummary {
            name: format!(
                "{} {}",
                text(billing, "first_name"),
                text(billing, "last_name")
            )
            .trim()
            .to_owned(),
            email: text(billing, "email"),
            phone: text(billing, "phone"),
            city: text(billing, "city"),
            country: text(billing, "country"),
        };

        Ok(Self {
            id,
            date_created,
            created_at,
            status: status.trim().to_owned(),
            total: decimal(order.get("total_inc_tax")),
            payment_status: text(order, "payment_status"),
            items_total: order.get("items_total").and_then(Value::as_u64).unwrap_or(0),
            customer,
        })
    }
}

/// Summarise an upstream listing, keeping the records that could not be
/// summarised (by index) so the caller can report them.
#[must_use]
pub fn summarize_orders(orders: &[Value]) -> (Vec<OrderSummary>, Vec<(usize, OrderSummaryError)>) {
    let mut summaries = Vec::with_capacity(orders.len());
    let mut skipped = Vec::new();

    for (index, order) in orders.iter().enumerate() {
        match OrderSummary::from_upstream(order) {
            Ok(summary) => summaries.push(summary),
            Err(e) => skipped.push((index, e)),
        }
    }

    (summaries, skipped)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_owned()
}

fn decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or_default(),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}
