use crate::model::{Amount, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals over a list of transactions.
///
/// `balance` can be negative, so it is a plain `Decimal` rather than an `Amount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    income: Amount,
    expense: Amount,
    balance: Decimal,
}

impl Aggregates {
    /// Computes the totals from scratch over `transactions`.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income, expense) = transactions.into_iter().fold(
            (Amount::ZERO, Amount::ZERO),
            |(income, expense), t| match t.transaction_type() {
                TransactionType::Income => (income + t.amount(), expense),
                TransactionType::Expense => (income, expense + t.amount()),
            },
        );
        Self {
            income,
            expense,
            balance: income.value() - expense.value(),
        }
    }

    pub fn income(&self) -> Amount {
        self.income
    }

    pub fn expense(&self) -> Amount {
        self.expense
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Month, NewTransaction, TransactionId};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn txn(id: u64, transaction_type: TransactionType, amount: &str) -> Transaction {
        NewTransaction::new(
            transaction_type,
            Amount::from_str(amount).unwrap(),
            "test",
            Month::new(2024, 6).unwrap(),
        )
        .unwrap()
        .into_transaction(TransactionId::from(id), NaiveDateTime::default())
    }

    #[test]
    fn test_empty() {
        let totals = Aggregates::from_transactions(&Vec::<Transaction>::new());
        assert_eq!(totals, Aggregates::default());
    }

    #[test]
    fn test_totals_and_negative_balance() {
        let list = vec![
            txn(1, TransactionType::Expense, "45.00"),
            txn(2, TransactionType::Income, "10.10"),
            txn(3, TransactionType::Expense, "0.15"),
        ];
        let totals = Aggregates::from_transactions(&list);
        assert_eq!(totals.income().value(), Decimal::from_str("10.10").unwrap());
        assert_eq!(totals.expense().value(), Decimal::from_str("45.15").unwrap());
        assert_eq!(totals.balance(), Decimal::from_str("-35.05").unwrap());
    }
}
