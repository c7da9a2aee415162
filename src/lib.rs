pub mod auth;
pub mod balance;
pub mod config;
pub mod currency;
pub mod error;
pub mod events;
pub mod handlers;
pub mod schemas;
pub mod settlement;
pub mod store;
pub mod summary;

pub use balance::{compute_balances, Balances};
pub use settlement::{compute_settlements, Transfer, SETTLEMENT_TOLERANCE};
