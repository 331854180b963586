//! Fixtures shared by the unit tests.

use crate::{
    Address, Keypair, Signature, SignatureVerifier, Transaction, TransactionBuilder,
    TransactionOutput, UtxoPool,
};

/// Deterministic keypair, so that tests can refer to the same owner by its seed.
pub fn keypair(seed: u8) -> Keypair {
    Keypair::from_seed(&[seed; 32])
}

/// A pool holding the outputs of a single genesis transaction.
/// Each output is given as `(value, owner seed)`.
pub fn genesis(outputs: &[(i64, u8)]) -> (UtxoPool, Transaction) {
    let outputs = outputs
        .iter()
        .map(|(value, seed)| TransactionOutput::new((*value).into(), keypair(*seed).address()))
        .collect();
    let transaction = Transaction::new(vec![], outputs).unwrap();
    let mut pool = UtxoPool::new();
    pool.add_transaction_outputs(&transaction);
    (pool, transaction)
}

/// A transaction spending `(source, output index, signer seed)` and paying `(value, owner seed)`.
pub fn payment(spends: &[(&Transaction, u32, u8)], outputs: &[(i64, u8)]) -> Transaction {
    let mut builder = TransactionBuilder::new();
    for (source, index, _) in spends {
        builder.add_input(*source.id(), *index);
    }
    for (value, seed) in outputs {
        builder.add_output((*value).into(), keypair(*seed).address());
    }
    for (position, (_, _, signer)) in spends.iter().enumerate() {
        builder.sign_input(position, &keypair(*signer)).unwrap();
    }
    builder.build().unwrap()
}

/// Accepts every signature.
pub struct AcceptAll;

impl SignatureVerifier for AcceptAll {
    fn verify(&self, _address: &Address, _message: &[u8], _signature: &Signature) -> bool {
        true
    }
}
