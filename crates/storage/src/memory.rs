use std::sync::Mutex;

use financas_core::{Account, Budget, Category, Transaction};

use crate::{LedgerStore, Snapshot, StoreError};

/// In-memory ledger with the same contract as the remote one. Backs
/// tests and `--dry-run` sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        MemoryStore {
            inner: Mutex::new(snapshot),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        // a poisoned lock only happens when a test already panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerStore for MemoryStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.lock().clone())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.lock().transactions.push(transaction.clone());
        Ok(())
    }

    async fn create_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        self.lock().transactions.extend_from_slice(transactions);
        Ok(())
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(existing) = inner.transactions.iter_mut().find(|t| t.id == transaction.id) {
            *existing = transaction.clone();
        }
        Ok(())
    }

    async fn update_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for transaction in transactions {
            if let Some(existing) = inner.transactions.iter_mut().find(|t| t.id == transaction.id)
            {
                *existing = transaction.clone();
            }
        }
        Ok(())
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError> {
        self.lock().transactions.retain(|t| t.id != id);
        Ok(())
    }

    async fn delete_transactions(&self, ids: &[String]) -> Result<(), StoreError> {
        self.lock()
            .transactions
            .retain(|t| !ids.iter().any(|id| *id == t.id));
        Ok(())
    }

    async fn upsert_budgets(&self, budgets: &[Budget]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for budget in budgets {
            match inner.budgets.iter_mut().find(|b| b.id == budget.id) {
                Some(existing) => *existing = budget.clone(),
                None => inner.budgets.push(budget.clone()),
            }
        }
        Ok(())
    }

    async fn create_category(&self, category: &Category) -> Result<(), StoreError> {
        self.lock().categories.push(category.clone());
        Ok(())
    }

    async fn create_account(&self, account: &Account) -> Result<(), StoreError> {
        self.lock().accounts.push(account.clone());
        Ok(())
    }
}
