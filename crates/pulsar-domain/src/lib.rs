//! pulsar-domain
//!
//! Pure domain models (transactions, recurring rules, intervals, occurrences).
//! No I/O, no CLI, no storage. Only data types, date arithmetic and rule expansion.

pub mod common;
pub mod ledger;
pub mod recurring;
pub mod selection;
pub mod time_interval;
pub mod transaction;

pub use common::*;
pub use ledger::*;
pub use recurring::*;
pub use selection::*;
pub use time_interval::*;
pub use transaction::*;
