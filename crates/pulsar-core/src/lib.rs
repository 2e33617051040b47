//! pulsar-core
//!
//! Projection engine and ledger maintenance services for Pulsar.
//! Depends on pulsar-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod error;
pub mod forecast_service;
pub mod horizon;
pub mod projection_service;
pub mod rule_service;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;
pub mod trend_service;
pub mod window_service;

pub use error::CoreError;
pub use forecast_service::*;
pub use horizon::horizon_date;
pub use projection_service::*;
pub use rule_service::*;
pub use summary_service::*;
pub use time::{Clock, FixedClock};
pub use transaction_service::*;
pub use trend_service::*;
pub use window_service::*;
