//! Ledger engines: invoice lifecycle, budget aggregation and daily
//! balance projection. Pure functions over a snapshot of the ledger.

pub mod balance;
pub mod budget;
pub mod invoice;

pub use balance::{project, BalanceScope, DayBalance};
pub use invoice::{
    close, invoice_name, invoice_total, is_closed, list_buckets, reopen, ClosedInvoice,
    PAYMENT_CATEGORY,
};
