use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::currency::{find_currency, DEFAULT_CURRENCY};
use crate::schemas::{Event, EventType, Expense, ParticipantName};

/// Roster entry for whoever creates an event when no member name is known.
pub const DEFAULT_HOST: &str = "Me";

#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Event title can't be empty")]
    EmptyTitle,
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("Expenses add up to more than the largest supported amount")]
    TotalOverflow,
    #[error("{0} is not a participant of this event")]
    UnknownPayer(ParticipantName),
    #[error("Couldn't find expense {0}")]
    ExpenseNotFound(String),
}

/// Participants as typed in the form (`"Ana, Ben"`) or as a JSON list.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParticipantList {
    Csv(String),
    Names(Vec<ParticipantName>),
}

impl Default for ParticipantList {
    fn default() -> Self {
        ParticipantList::Names(Vec::new())
    }
}

impl ParticipantList {
    fn into_names(self) -> Vec<ParticipantName> {
        let names: Vec<String> = match self {
            ParticipantList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
            ParticipantList::Names(names) => names,
        };
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    #[serde(default)]
    pub participants: ParticipantList,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub paid_by: Option<ParticipantName>,
}

/// Builds a fresh event with `host` first on the roster.
pub fn create_event(new_event: NewEvent, host: &str) -> Result<Event, EventError> {
    let title = new_event.title.trim();
    if title.is_empty() {
        return Err(EventError::EmptyTitle);
    }

    let currency = match new_event.currency.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_CURRENCY,
        Some(code) => {
            find_currency(code)
                .ok_or_else(|| EventError::UnsupportedCurrency(code.to_string()))?
                .code
        }
    };

    let mut participants: Vec<ParticipantName> = vec![host.to_string()];
    for name in new_event.participants.into_names() {
        if !participants.contains(&name) {
            participants.push(name);
        }
    }

    Ok(Event {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        kind: new_event.kind,
        participants,
        expenses: vec![],
        date: Utc::now(),
        currency: Some(currency.to_string()),
    })
}

/// Records an expense on `event`, newest first. The payer defaults to the
/// host and has to be on the roster.
pub fn add_expense(event: &mut Event, new_expense: NewExpense) -> Result<&Expense, EventError> {
    if new_expense.amount <= Decimal::ZERO {
        return Err(EventError::NonPositiveAmount(new_expense.amount));
    }
    if event
        .total_spent()
        .and_then(|total| total.checked_add(new_expense.amount))
        .is_none()
    {
        return Err(EventError::TotalOverflow);
    }

    let paid_by = match new_expense.paid_by.as_deref().map(str::trim) {
        None | Some("") => event
            .participants
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        Some(name) => name.to_string(),
    };
    if !event.participants.contains(&paid_by) {
        return Err(EventError::UnknownPayer(paid_by));
    }

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        description: new_expense.description.trim().to_string(),
        amount: new_expense.amount,
        paid_by,
        date: Utc::now(),
    };
    debug!(event = %event.id, expense = %expense.id, "adding expense");
    event.expenses.insert(0, expense);
    Ok(&event.expenses[0])
}

pub fn remove_expense(event: &mut Event, expense_id: &str) -> Result<Expense, EventError> {
    let position = event
        .expenses
        .iter()
        .position(|expense| expense.id == expense_id)
        .ok_or_else(|| EventError::ExpenseNotFound(expense_id.to_string()))?;
    Ok(event.expenses.remove(position))
}
