pub mod coin;
pub mod commands;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod logging;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod testing;

pub use self::{
    coin::*, crypto::*, error::*, hash::*, transaction::*, tx_handler::*, utxo_pool::*,
    validation::TransactionValidator,
};
