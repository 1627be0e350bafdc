use financas_core::{Account, Budget, Category, Transaction};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::{LedgerStore, Snapshot, StoreError};

/// JSON client for the ledger's REST routes. No retries; a failed batch
/// leaves the caller's preview state untouched so the same batch can be
/// re-sent.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        RemoteStore {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "ledger request");
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.request(Method::GET, path).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), StoreError> {
        let response = self.request(method, path).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

impl LedgerStore for RemoteStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            transactions: self.get_json("/transactions").await?,
            accounts: self.get_json("/accounts").await?,
            categories: self.get_json("/categories").await?,
            budgets: self.get_json("/budgets").await?,
        })
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.send_json(Method::POST, "/transactions", transaction)
            .await
    }

    async fn create_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        self.send_json(Method::POST, "/transactions/batch", transactions)
            .await
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.send_json(
            Method::PUT,
            &format!("/transactions/{}", transaction.id),
            transaction,
        )
        .await
    }

    async fn update_transactions(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        self.send_json(Method::PUT, "/transactions/batch", transactions)
            .await
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&format!("/transactions/{id}")).await
    }

    async fn delete_transactions(&self, ids: &[String]) -> Result<(), StoreError> {
        self.send_json(Method::DELETE, "/transactions/batch", ids)
            .await
    }

    async fn upsert_budgets(&self, budgets: &[Budget]) -> Result<(), StoreError> {
        self.send_json(Method::POST, "/budgets/batch", budgets).await
    }

    async fn create_category(&self, category: &Category) -> Result<(), StoreError> {
        self.send_json(Method::POST, "/categories", category).await
    }

    async fn create_account(&self, account: &Account) -> Result<(), StoreError> {
        self.send_json(Method::POST, "/accounts", account).await
    }
}
