//! recon-core: Core types and utilities for statement reconciliation

pub mod classifier;
pub mod dates;
pub mod transaction;
pub mod verdict;

pub use classifier::{classify, Classification};
pub use dates::{resolve_day_month, today_in};
pub use transaction::{Dialect, Direction, Transaction, TxnDate};
pub use verdict::{ValidationVerdict, VerdictStatus};
