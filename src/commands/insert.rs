use crate::args::AddArgs;
use crate::commands::{open_store, Out};
use crate::model::Transaction;
use crate::{Config, Result};

/// Records a new income or expense in the month given by `args`.
///
/// The amount and description are validated before anything is sent to the backend.
pub async fn add(config: &Config, args: &AddArgs) -> Result<Out<Transaction>> {
    let store = open_store(config, args.month()).await?;
    let created = store
        .add(args.transaction_type(), args.amount(), args.description())
        .await?;
    let totals = store.aggregates();
    let message = format!(
        "Added {} {} '{}' with id {}. {} balance: {}",
        created.transaction_type(),
        created.amount(),
        created.description(),
        created.id(),
        created.month().display_name(),
        totals.balance(),
    );
    Ok(Out::new(message, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Month, TransactionType};
    use crate::test::TestEnv;
    use crate::{ErrorType, INVALID_AMOUNT, MISSING_INPUT};

    fn june() -> Option<Month> {
        Month::new(2024, 6)
    }

    #[tokio::test]
    async fn test_add_income() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(TransactionType::Income, "1200.50", "Salary", june());
        let out = add(&env.config(), &args).await.unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.amount().to_string(), "$1,200.50");
        assert_eq!(created.month(), june().unwrap());
        assert!(out.message().contains("June 2024 balance: 1200.50"));

        let stored = env.transactions(june().unwrap()).await;
        assert_eq!(stored, vec![created.clone()]);
    }

    #[tokio::test]
    async fn test_add_invalid_amount() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(TransactionType::Expense, "abc", "Lunch", june());
        let e = add(&env.config(), &args).await.unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Validation);
        assert_eq!(e.to_string(), INVALID_AMOUNT);
        assert!(env.transactions(june().unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn test_add_blank_description() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(TransactionType::Expense, "3", " ", june());
        let e = add(&env.config(), &args).await.unwrap_err();
        assert_eq!(e.to_string(), MISSING_INPUT);
    }
}
