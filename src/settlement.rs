use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::balance::Balances;
use crate::schemas::ParticipantName;

/// One minor currency unit (0.01). Balances this close to zero count as settled.
pub const SETTLEMENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: ParticipantName,
    balance: Decimal,
}

/// `from` pays `to` the given amount.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transfer {
    pub from: ParticipantName,
    pub to: ParticipantName,
    pub amount: Decimal,
}

pub fn is_settled(balance: Decimal) -> bool {
    balance.abs() <= SETTLEMENT_TOLERANCE
}

fn split_debtors_and_creditors(
    balances: &Balances,
) -> (Vec<PersonalBalance>, Vec<PersonalBalance>) {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for (id, &balance) in balances {
        let person = PersonalBalance {
            id: id.clone(),
            balance,
        };
        if balance < -SETTLEMENT_TOLERANCE {
            debtors.push(person);
        } else if balance > SETTLEMENT_TOLERANCE {
            creditors.push(person);
        }
    }
    (debtors, creditors)
}

/// Greedily pairs the largest debtor with the largest creditor until one
/// side runs out.
///
/// Both sorts are stable, so ties keep the order of `balances` (roster
/// order). This is a heuristic: it does not search for the theoretical
/// minimum number of transfers.
pub fn compute_settlements(balances: &Balances) -> Vec<Transfer> {
    let (mut debtors, mut creditors) = split_debtors_and_creditors(balances);

    debtors.sort_by(|a, b| a.balance.cmp(&b.balance));
    creditors.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let amount = debtor.balance.abs().min(creditor.balance);
        transfers.push(Transfer {
            from: debtor.id.clone(),
            to: creditor.id.clone(),
            amount,
        });

        debtor.balance += amount;
        creditor.balance -= amount;

        if is_settled(debtor.balance) {
            i += 1;
        }
        if is_settled(creditor.balance) {
            j += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transfers = transfers.len(),
        "computed settlements"
    );
    transfers
}

/// Balances left over once every transfer has been paid.
pub fn apply_transfers(balances: &Balances, transfers: &[Transfer]) -> Balances {
    let mut remaining = balances.clone();
    for transfer in transfers {
        *remaining
            .entry(transfer.from.clone())
            .or_insert(Decimal::ZERO) += transfer.amount;
        *remaining
            .entry(transfer.to.clone())
            .or_insert(Decimal::ZERO) -= transfer.amount;
    }
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::compute_balances;
    use crate::balance::tests::{expense, names};
    use rust_decimal_macros::dec;

    fn transfer(from: &str, to: &str, amount: Decimal) -> Transfer {
        Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        }
    }

    fn balances(entries: &[(&str, Decimal)]) -> Balances {
        entries
            .iter()
            .map(|(name, balance)| (name.to_string(), *balance))
            .collect()
    }

    #[test]
    fn tolerance_is_one_cent() {
        assert_eq!(SETTLEMENT_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn equal_pair() {
        let balance = compute_balances(&names(&["Alice", "Bob"]), &[expense(dec!(100), "Alice")]);

        assert_eq!(
            compute_settlements(&balance),
            vec![transfer("Bob", "Alice", dec!(50))]
        );
    }

    #[test]
    fn everyone_pays_the_single_payer() {
        let balance = compute_balances(&names(&["A", "B", "C"]), &[expense(dec!(90), "A")]);

        assert_eq!(
            compute_settlements(&balance),
            vec![transfer("B", "A", dec!(30)), transfer("C", "A", dec!(30))]
        );
    }

    #[test]
    fn empty_balances_need_no_transfers() {
        assert!(compute_settlements(&Balances::new()).is_empty());
    }

    #[test]
    fn single_participant_needs_no_transfers() {
        let balance = compute_balances(&names(&["Alice"]), &[expense(dec!(50), "Alice")]);

        assert!(compute_settlements(&balance).is_empty());
    }

    #[test]
    fn already_settled_event_needs_no_transfers() {
        let balance = compute_balances(
            &names(&["A", "B", "C"]),
            &[
                expense(dec!(20), "A"),
                expense(dec!(20), "B"),
                expense(dec!(20), "C"),
            ],
        );

        assert!(compute_settlements(&balance).is_empty());
    }

    #[test]
    fn greedy_walks_both_sorted_lists() {
        let balance = balances(&[
            ("A", dec!(-10)),
            ("B", dec!(70)),
            ("C", dec!(-60)),
            ("D", dec!(30)),
            ("E", dec!(-30)),
        ]);

        assert_eq!(
            compute_settlements(&balance),
            vec![
                transfer("C", "B", dec!(60)),
                transfer("E", "B", dec!(10)),
                transfer("E", "D", dec!(20)),
                transfer("A", "D", dec!(10)),
            ]
        );
    }

    #[test]
    fn ties_keep_roster_order() {
        let balance = balances(&[
            ("Zoe", dec!(-25)),
            ("Adam", dec!(-25)),
            ("Max", dec!(25)),
            ("Bea", dec!(25)),
        ]);

        assert_eq!(
            compute_settlements(&balance),
            vec![
                transfer("Zoe", "Max", dec!(25)),
                transfer("Adam", "Bea", dec!(25)),
            ]
        );
    }

    #[test]
    fn one_credit_can_be_split_between_debtors() {
        let balance = balances(&[("A", dec!(100)), ("B", dec!(-40)), ("C", dec!(-60))]);

        assert_eq!(
            compute_settlements(&balance),
            vec![transfer("C", "A", dec!(60)), transfer("B", "A", dec!(40))]
        );
    }

    #[test]
    fn thirds_do_not_leave_dust_transfers() {
        let balance = compute_balances(&names(&["A", "B", "C"]), &[expense(dec!(100), "A")]);
        let transfers = compute_settlements(&balance);

        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.amount > SETTLEMENT_TOLERANCE));

        let paid: Decimal = transfers.iter().map(|t| t.amount).sum();
        assert!((paid - balance["A"]).abs() <= SETTLEMENT_TOLERANCE);
        assert!(apply_transfers(&balance, &transfers)
            .values()
            .all(|b| is_settled(*b)));
    }

    #[test]
    fn balances_within_tolerance_are_ignored() {
        let balance = balances(&[("A", dec!(0.01)), ("B", dec!(-0.01)), ("C", dec!(0.004))]);

        assert!(compute_settlements(&balance).is_empty());
    }

    #[test]
    fn cent_credits_leave_their_debtor_unmatched() {
        let balance = compute_balances(
            &names(&["A", "B", "C"]),
            &[
                expense(dec!(100.01), "A"),
                expense(dec!(100.01), "B"),
                expense(dec!(99.98), "C"),
            ],
        );
        assert_eq!(
            balance.values().copied().collect::<Vec<_>>(),
            vec![dec!(0.01), dec!(0.01), dec!(-0.02)]
        );

        let transfers = compute_settlements(&balance);
        assert!(transfers.is_empty());

        let remaining = apply_transfers(&balance, &transfers);
        assert_eq!(remaining["C"], dec!(-0.02));
        assert!(!is_settled(remaining["C"]));
        assert!(remaining["C"].abs() <= SETTLEMENT_TOLERANCE * Decimal::from(balance.len()));
    }

    #[test]
    fn remainder_of_exactly_one_cent_is_dropped() {
        let balance = balances(&[("A", dec!(-10.01)), ("B", dec!(10))]);

        assert_eq!(
            compute_settlements(&balance),
            vec![transfer("A", "B", dec!(10))]
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let balance = compute_balances(
            &names(&["A", "B", "C", "D"]),
            &[expense(dec!(13.37), "B"), expense(dec!(71.5), "D")],
        );

        assert_eq!(compute_settlements(&balance), compute_settlements(&balance));
    }

    #[test]
    fn applying_transfers_moves_money_between_both_sides() {
        let balance = balances(&[("A", dec!(50)), ("B", dec!(-50))]);
        let remaining = apply_transfers(&balance, &[transfer("B", "A", dec!(20))]);

        assert_eq!(remaining["A"], dec!(30));
        assert_eq!(remaining["B"], dec!(-30));
    }
}
