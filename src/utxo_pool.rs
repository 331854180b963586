use crate::{Address, OutputIndex, Scroogecoin, Transaction, TransactionId, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;
use tracing::trace;

/// Identifies an unspent transaction output by the transaction that created it and its position
/// in that transaction. Two UTXOs are equal iff both fields are equal, the value is not part of
/// the identity.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
pub struct Utxo {
    tx_id: TransactionId,
    index: OutputIndex,
}

impl Utxo {
    pub fn new(tx_id: TransactionId, index: OutputIndex) -> Self {
        Self { tx_id, index }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn index(&self) -> OutputIndex {
        self.index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// A pool of confirmed and unspent transaction outputs.
/// Cloning the pool produces an independent snapshot.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get_output(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    /// Binds the output to the identity, replacing any existing binding.
    pub fn add_utxo(&mut self, utxo: Utxo, output: TransactionOutput) {
        trace!(%utxo, %output, "Adding UTXO");
        self.utxos.insert(utxo, output);
    }

    /// Removes the binding if it exists. Removing an absent identity is not an error.
    pub fn remove_utxo(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        trace!(%utxo, "Removing UTXO");
        self.utxos.remove(utxo)
    }

    /// Adds an entry for every output of the transaction.
    pub fn add_transaction_outputs(&mut self, transaction: &Transaction) {
        for (utxo, output) in transaction.utxos() {
            self.add_utxo(utxo, output.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// All identities in the pool in ascending order.
    pub fn all_utxos(&self) -> Vec<Utxo> {
        let mut utxos = self.utxos.keys().copied().collect::<Vec<Utxo>>();
        utxos.sort();
        utxos
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Spendable value per address.
    /// Returns None if the balance of some address overflows.
    pub fn balances(&self) -> Option<HashMap<Address, Scroogecoin>> {
        let mut balances = HashMap::new();
        for output in self.utxos.values() {
            // Ensure that the key exists if it's the first time we're seeing the address.
            let balance = balances
                .entry(*output.address())
                .or_insert_with(Scroogecoin::zero);
            *balance = balance.checked_add(output.value())?;
        }
        Some(balances)
    }
}

impl FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
