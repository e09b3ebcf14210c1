use crate::commands::{open_store, Out};
use crate::model::{Month, TransactionId};
use crate::{Config, Result};

/// Deletes the transaction `id` from `month`.
pub async fn remove(
    config: &Config,
    id: &TransactionId,
    month: Month,
) -> Result<Out<TransactionId>> {
    let store = open_store(config, month).await?;
    store.remove(id).await?;
    let left = store.transactions().len();
    let message = format!(
        "Deleted transaction {id}. {} has {left} transaction{} left",
        month.display_name(),
        if left == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use crate::test::TestEnv;
    use crate::{ErrorType, DELETE_FAILED};

    #[tokio::test]
    async fn test_remove() {
        let env = TestEnv::new().await;
        let june = Month::new(2024, 6).unwrap();
        let a = env.seed(TransactionType::Income, "10", "a", june).await;
        let b = env.seed(TransactionType::Expense, "4", "b", june).await;

        let out = remove(&env.config(), a.id(), june).await.unwrap();
        assert_eq!(out.structure(), Some(a.id()));
        assert!(out.message().ends_with("has 1 transaction left"));
        assert_eq!(env.transactions(june).await, vec![b]);
    }

    #[tokio::test]
    async fn test_remove_unknown_id() {
        let env = TestEnv::new().await;
        let june = Month::new(2024, 6).unwrap();
        let kept = env.seed(TransactionType::Income, "10", "a", june).await;

        let e = remove(&env.config(), &TransactionId::from(42u64), june)
            .await
            .unwrap_err();
        assert_eq!(e.error_type(), ErrorType::NotFound);
        assert_eq!(e.to_string(), DELETE_FAILED);
        assert_eq!(env.transactions(june).await, vec![kept]);
    }
}
