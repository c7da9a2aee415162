use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::schemas::{Event, Expense, ParticipantName};

/// Net position per participant, in roster order. Positive means the
/// participant is owed money, negative means they owe.
pub type Balances = IndexMap<ParticipantName, Decimal>;

pub fn compute_balance_from_event(event: &Event) -> Balances {
    compute_balances(&event.participants, &event.expenses)
}

/// Sum of all expense amounts, or `None` if it does not fit in a `Decimal`.
pub fn checked_total(expenses: &[Expense]) -> Option<Decimal> {
    expenses
        .iter()
        .try_fold(Decimal::ZERO, |total, expense| total.checked_add(expense.amount))
}

/// Splits the total of `expenses` equally between `participants` and credits
/// every payer with what they paid.
///
/// A payer missing from the roster gets its own entry (appended after the
/// roster) but is never charged a share. With no participants there is
/// nothing to split and the result is empty. Amounts too large to add up
/// also give an empty result.
pub fn compute_balances(participants: &[ParticipantName], expenses: &[Expense]) -> Balances {
    if participants.is_empty() {
        return Balances::new();
    }
    split_equally(participants, expenses).unwrap_or_else(|| {
        warn!(expenses = expenses.len(), "expense amounts overflow, nothing to split");
        Balances::new()
    })
}

fn split_equally(participants: &[ParticipantName], expenses: &[Expense]) -> Option<Balances> {
    let mut balance = Balances::new();
    for participant in participants {
        balance.insert(participant.clone(), Decimal::ZERO);
    }

    let total = checked_total(expenses)?;
    let share = total.checked_div(Decimal::from(participants.len()))?;
    trace!(%total, %share, participants = participants.len(), "splitting event cost");

    for expense in expenses {
        let value = balance
            .entry(expense.paid_by.clone())
            .or_insert(Decimal::ZERO);
        *value = value.checked_add(expense.amount)?;
    }
    for participant in participants {
        if let Some(value) = balance.get_mut(participant) {
            *value = value.checked_sub(share)?;
        }
    }
    Some(balance)
}
