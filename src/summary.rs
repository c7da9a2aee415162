use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::balance::{compute_balance_from_event, Balances};
use crate::currency::{symbol_for, DEFAULT_CURRENCY};
use crate::events::EventError;
use crate::settlement::{compute_settlements, Transfer};
use crate::schemas::Event;

/// What the front-end shows for an event. Rebuilt from the event on every
/// read and never stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event_id: String,
    pub title: String,
    pub currency: String,
    pub symbol: &'static str,
    pub total: Decimal,
    pub per_person: Decimal,
    pub balances: Balances,
    pub settlements: Vec<Transfer>,
}

pub fn round_to_2_decimals(n: Decimal) -> Decimal {
    n.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn summarize_event(event: &Event) -> Result<EventSummary, EventError> {
    let total = event.total_spent().ok_or(EventError::TotalOverflow)?;
    let balances = compute_balance_from_event(event);
    let settlements = compute_settlements(&balances);

    let per_person = if event.participants.is_empty() {
        Decimal::ZERO
    } else {
        total / Decimal::from(event.participants.len())
    };

    Ok(EventSummary {
        event_id: event.id.clone(),
        title: event.title.clone(),
        currency: event
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        symbol: symbol_for(event.currency.as_deref()),
        total: round_to_2_decimals(total),
        per_person: round_to_2_decimals(per_person),
        balances: balances
            .into_iter()
            .map(|(name, balance)| (name, round_to_2_decimals(balance)))
            .collect(),
        settlements: settlements
            .into_iter()
            .map(|transfer| Transfer {
                amount: round_to_2_decimals(transfer.amount),
                ..transfer
            })
            .collect(),
    })
}

/// Plain-text recap meant to be pasted into a chat.
pub fn share_text(summary: &EventSummary) -> String {
    format!(
        "💸 *{}* Summary\nTotal: {:.2}{}\nPer Person: {:.2}{}",
        summary.title, summary.total, summary.symbol, summary.per_person, summary.symbol
    )
}
