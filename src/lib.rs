//! Ledger-backed store for trade contracts between a trader and a buyer.
//!
//! * [`schema`] — the fixed 26-column contract table.
//! * [`codec`] — delimited / JSON input decoding and record encoding.
//! * [`ledger`] — the keyed-table substrate trait and an in-memory ledger.
//! * [`table`] — insert / replace / get over the contract table.
//! * [`access`] — read authorisation for trader and buyer.
//! * [`service`] — `init`, `invoke` and `query` entry points.
//! * [`state`] — locked snapshot file used by the CLI host.

pub mod access;
pub mod codec;
pub mod contracts;
pub mod ledger;
pub mod log;
pub mod schema;
pub mod service;
pub mod state;
pub mod table;

mod error;

pub use error::ContractError;
pub use ledger::{MemoryLedger, StoreError, TableStore};
pub use service::ContractService;
