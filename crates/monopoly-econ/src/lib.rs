#![deny(warnings)]

//! Money and valuation for the board game simulation.
//!
//! The [`Ledger`] owns every player balance and is the only place money moves.
//! Rent, prices and property operations are free functions over a
//! [`monopoly_core::Board`] and a ledger; trades live in a [`TradeBook`].

pub mod assets;
pub mod ledger;
pub mod pricing;
pub mod rent;
pub mod trade;

pub use assets::{build, buy, liquidate, locate, mortgage, sell, transfer_property, unmortgage};
pub use ledger::{ChargeMode, Ledger, Payment};
pub use pricing::{inflate_unsold, price_board, Valuation};
pub use rent::rent;
pub use trade::{Trade, TradeBook, TradeKind, TradeState};
