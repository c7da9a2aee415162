use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ParticipantName = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Trip,
    Party,
    Dinner,
    Other,
}

/// A shared event (trip, party, dinner...) whose costs are split equally
/// between everyone on the roster.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub participants: Vec<ParticipantName>,
    pub expenses: Vec<Expense>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: ParticipantName,
    pub date: DateTime<Utc>,
}

impl Event {
    /// `None` when the amounts add up to more than a `Decimal` can hold.
    pub fn total_spent(&self) -> Option<Decimal> {
        crate::balance::checked_total(&self.expenses)
    }
}
