use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("split entries total {actual} but the transaction amount is {expected}")]
    SplitOutOfBalance { expected: Money, actual: Money },
    #[error("invoice \"{0}\" is closed")]
    InvoiceClosed(String),
    #[error("no payment transaction found for \"{0}\"")]
    PaymentNotFound(String),
    #[error("account \"{0}\" is not a credit card")]
    NotACreditCard(String),
    #[error("credit card \"{0}\" has no due day configured")]
    MissingDueDay(String),
    #[error("account \"{0}\" not found")]
    AccountNotFound(String),
    #[error("credit card \"{0}\" has no cash balance to project")]
    NoCashBalance(String),
}
