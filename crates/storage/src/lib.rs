//! Persistence collaborator: a remote REST ledger plus an in-memory
//! stand-in for tests and dry runs.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use financas_core::{Account, Budget, Category, Transaction};
use serde::{Deserialize, Serialize};

/// The full current ledger, fetched whole. All matching and state
/// derivation runs over one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote rejected the request ({status}): {body}")]
    Remote { status: u16, body: String },
}

/// Write API of the ledger collaborator. One batch call per user
/// operation; errors surface verbatim and the caller decides whether to
/// re-attempt the same batch.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError>;
    async fn create_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError>;
    async fn update_transaction(&self, transaction: &Transaction) -> Result<(), StoreError>;
    async fn update_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError>;
    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError>;
    async fn delete_transactions(&self, ids: &[String]) -> Result<(), StoreError>;

    async fn upsert_budgets(&self, budgets: &[Budget]) -> Result<(), StoreError>;
    async fn create_category(&self, category: &Category) -> Result<(), StoreError>;
    async fn create_account(&self, account: &Account) -> Result<(), StoreError>;
}
