use crate::{Scroogecoin, SignatureVerifier, Transaction, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// The first rule a transaction broke.
/// Only used for diagnostics, callers of the validator see a plain valid/invalid answer.
#[derive(Debug, Error, Eq, PartialEq)]
pub(crate) enum Rejection {
    #[error("input {index} claims {utxo} which is not in the pool")]
    MissingUtxo { index: usize, utxo: Utxo },

    #[error("input {index} is not signed")]
    MissingSignature { index: usize },

    #[error("input {index} has no signable payload")]
    UnsignablePayload { index: usize },

    #[error("signature of input {index} does not verify under the owner of {utxo}")]
    InvalidSignature { index: usize, utxo: Utxo },

    #[error("input {index} claims {utxo} which an earlier input already claims")]
    DoubleClaim { index: usize, utxo: Utxo },

    #[error("output {index} has negative value {value}")]
    NegativeOutput { index: usize, value: Scroogecoin },

    #[error("sum of {side} values overflows")]
    Overflow { side: &'static str },

    #[error("outputs total {outputs} but inputs only provide {inputs}")]
    ValueCreated {
        inputs: Scroogecoin,
        outputs: Scroogecoin,
    },
}

/// Responsible for deciding whether a transaction may be applied to a pool.
///
/// A transaction is valid iff:
///   - every output claimed by its inputs is in the pool,
///   - the signature of every input verifies under the address owning the claimed output,
///   - no output is claimed more than once,
///   - every output value is non-negative,
///   - the claimed values sum to at least the output values.
///
/// Checks are evaluated against the given pool only, which need not be the live one.
pub struct TransactionValidator {}

impl TransactionValidator {
    pub fn is_valid<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> bool {
        Self::check(transaction, pool, verifier).is_ok()
    }

    pub(crate) fn check<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<(), Rejection> {
        let input_sum = Self::validate_inputs(transaction, pool, verifier)?;
        let output_sum = Self::validate_outputs(transaction)?;
        if output_sum <= input_sum {
            Ok(())
        } else {
            Err(Rejection::ValueCreated {
                inputs: input_sum,
                outputs: output_sum,
            })
        }
    }

    /// Validates every input and returns the total value they claim.
    /// Stops at the first failing input.
    fn validate_inputs<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<Scroogecoin, Rejection> {
        let mut claimed = HashSet::with_capacity(transaction.inputs().len());
        let mut input_sum = Scroogecoin::zero();
        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = input.utxo();
            let output = pool
                .get_output(&utxo)
                .ok_or(Rejection::MissingUtxo { index, utxo })?;

            let signature = input
                .signature()
                .ok_or(Rejection::MissingSignature { index })?;
            let message = transaction
                .raw_data_to_sign(index)
                .map_err(|_| Rejection::UnsignablePayload { index })?;
            if !verifier.verify(output.address(), &message, signature) {
                return Err(Rejection::InvalidSignature { index, utxo });
            }

            if !claimed.insert(utxo) {
                return Err(Rejection::DoubleClaim { index, utxo });
            }

            input_sum = input_sum
                .checked_add(output.value())
                .ok_or(Rejection::Overflow { side: "input" })?;
        }
        Ok(input_sum)
    }

    /// Validates that no output is negative and returns their total value.
    fn validate_outputs(transaction: &Transaction) -> Result<Scroogecoin, Rejection> {
        if let Some((index, output)) = transaction
            .outputs()
            .iter()
            .enumerate()
            .find(|(_, output)| output.value().is_negative())
        {
            return Err(Rejection::NegativeOutput {
                index,
                value: output.value(),
            });
        }
        Scroogecoin::checked_sum(transaction.outputs().iter().map(|output| output.value()))
            .ok_or(Rejection::Overflow { side: "output" })
    }
}
