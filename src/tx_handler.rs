use crate::{
    Ed25519Verifier, SignatureVerifier, Transaction, TransactionId, TransactionValidator, UtxoPool,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info};

/// The order in which the candidates of an epoch are considered.
/// Acceptance is greedy, so when two candidates conflict the one considered first wins.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// The order in which the caller submitted the candidates.
    Submission,
    /// Ascending transaction id, independent of how the caller ordered the batch.
    TransactionId,
}

impl Default for CandidateOrder {
    fn default() -> Self {
        CandidateOrder::Submission
    }
}

impl FromStr for CandidateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submission" => Ok(CandidateOrder::Submission),
            "id" | "transaction_id" => Ok(CandidateOrder::TransactionId),
            _ => Err(format!(
                "Unknown candidate order: {}, expected one of: submission, id",
                s
            )),
        }
    }
}

impl Display for CandidateOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateOrder::Submission => write!(f, "submission"),
            CandidateOrder::TransactionId => write!(f, "id"),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub candidate_order: CandidateOrder,
}

/// The result of one epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochOutcome {
    /// Accepted transactions, in the order they were applied.
    pub accepted: Vec<Transaction>,
    /// Ids of the candidates that were left out.
    pub rejected: Vec<TransactionId>,
}

/// Maintains the ledger of unspent outputs and applies epochs of proposed transactions to it.
///
/// The handler owns a private copy of the pool it was created from, the caller's pool is never
/// modified.
pub struct TxHandler<V = Ed25519Verifier> {
    utxo_pool: UtxoPool,
    config: HandlerConfig,
    verifier: V,
}

impl TxHandler<Ed25519Verifier> {
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self::with_config(utxo_pool, HandlerConfig::default(), Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_config(utxo_pool: &UtxoPool, config: HandlerConfig, verifier: V) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
            config,
            verifier,
        }
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Whether the transaction could be applied to the current pool.
    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(transaction, &self.utxo_pool, &self.verifier)
    }

    /// Handles an epoch of proposed transactions and returns the ones that were accepted.
    /// See `handle_epoch`.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_epoch(candidates).accepted
    }

    /// Considers every candidate once, in the configured order. A candidate that is valid
    /// against the pool at the moment it is considered is applied immediately, so a later
    /// candidate spending the same output is rejected. Rejected candidates are not retried.
    pub fn handle_epoch(&mut self, candidates: &[Transaction]) -> EpochOutcome {
        let mut outcome = EpochOutcome::default();
        let mut seen = HashSet::with_capacity(candidates.len());
        for transaction in self.ordered(candidates) {
            if !seen.insert(*transaction.id()) {
                debug!(id = %transaction.id(), "Skipping duplicate candidate");
                continue;
            }
            match TransactionValidator::check(transaction, &self.utxo_pool, &self.verifier) {
                Ok(()) => {
                    self.apply(transaction);
                    outcome.accepted.push(transaction.clone());
                }
                Err(rejection) => {
                    debug!(id = %transaction.id(), reason = %rejection, "Rejected transaction");
                    outcome.rejected.push(*transaction.id());
                }
            }
        }
        info!(
            candidates = candidates.len(),
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            pool_size = self.utxo_pool.len(),
            "Epoch processed"
        );
        outcome
    }

    fn ordered<'a>(&self, candidates: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut ordered = candidates.iter().collect::<Vec<&Transaction>>();
        match self.config.candidate_order {
            CandidateOrder::Submission => {}
            CandidateOrder::TransactionId => ordered.sort_by_key(|transaction| *transaction.id()),
        }
        ordered
    }

    /// Spends the outputs claimed by the transaction and adds the outputs it creates.
    fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.utxo_pool.remove_utxo(&input.utxo());
        }
        self.utxo_pool.add_transaction_outputs(transaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{genesis, keypair, payment};
    use crate::{OutputIndex, Scroogecoin, Utxo};

    fn ids(transactions: &[Transaction]) -> Vec<TransactionId> {
        transactions.iter().map(|t| *t.id()).collect()
    }

    #[test]
    fn single_payment_moves_the_output() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let t1 = payment(&[(&funding, 0, 1)], &[(10, 2)]);
        let mut handler = TxHandler::new(&pool);
        assert!(handler.is_valid_tx(&t1));

        let accepted = handler.handle_txs(&[t1.clone()]);

        assert_eq!(accepted, vec![t1.clone()]);
        let pool = handler.utxo_pool();
        assert!(!pool.contains(&Utxo::new(*funding.id(), OutputIndex::new(0))));
        assert_eq!(pool.len(), 1);
        let created = Utxo::new(*t1.id(), OutputIndex::new(0));
        let output = pool.get_output(&created).unwrap();
        assert_eq!(output.value(), Scroogecoin::new(10));
        assert_eq!(*output.address(), keypair(2).address());
    }

    #[test]
    fn caller_pool_is_never_modified() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let snapshot = pool.clone();
        let mut handler = TxHandler::new(&pool);
        handler.handle_txs(&[payment(&[(&funding, 0, 1)], &[(10, 2)])]);
        assert_eq!(pool, snapshot);
        assert_ne!(handler.utxo_pool(), &snapshot);
    }

    #[test]
    fn conflicting_spends_accept_exactly_one() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let t1 = payment(&[(&funding, 0, 1)], &[(10, 2)]);
        let t2 = payment(&[(&funding, 0, 1)], &[(10, 3)]);
        let mut handler = TxHandler::new(&pool);
        assert!(handler.is_valid_tx(&t1));
        assert!(handler.is_valid_tx(&t2));

        let outcome = handler.handle_epoch(&[t1.clone(), t2.clone()]);

        assert_eq!(ids(&outcome.accepted), vec![*t1.id()]);
        assert_eq!(outcome.rejected, vec![*t2.id()]);
        assert!(!handler.is_valid_tx(&t2));
    }

    #[test]
    fn transaction_id_order_breaks_ties_independently_of_submission() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let t1 = payment(&[(&funding, 0, 1)], &[(10, 2)]);
        let t2 = payment(&[(&funding, 0, 1)], &[(10, 3)]);
        let winner = std::cmp::min(*t1.id(), *t2.id());
        let config = HandlerConfig {
            candidate_order: CandidateOrder::TransactionId,
        };

        for batch in &[vec![t1.clone(), t2.clone()], vec![t2.clone(), t1.clone()]] {
            let mut handler = TxHandler::with_config(&pool, config, Ed25519Verifier);
            assert_eq!(ids(&handler.handle_txs(batch)), vec![winner]);
        }
    }

    #[test]
    fn chained_spend_is_accepted_when_parent_comes_first() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let parent = payment(&[(&funding, 0, 1)], &[(6, 2), (4, 1)]);
        let child = payment(&[(&parent, 0, 2)], &[(6, 3)]);

        let mut handler = TxHandler::new(&pool);
        let accepted = handler.handle_txs(&[parent.clone(), child.clone()]);
        assert_eq!(ids(&accepted), vec![*parent.id(), *child.id()]);
        let balances = handler.utxo_pool().balances().unwrap();
        assert_eq!(balances[&keypair(3).address()], Scroogecoin::new(6));
        assert_eq!(balances[&keypair(1).address()], Scroogecoin::new(4));
        assert!(!balances.contains_key(&keypair(2).address()));
    }

    #[test]
    fn chained_spend_is_not_retried_when_child_comes_first() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let parent = payment(&[(&funding, 0, 1)], &[(10, 2)]);
        let child = payment(&[(&parent, 0, 2)], &[(10, 3)]);

        let mut handler = TxHandler::new(&pool);
        let outcome = handler.handle_epoch(&[child.clone(), parent.clone()]);
        assert_eq!(ids(&outcome.accepted), vec![*parent.id()]);
        assert_eq!(outcome.rejected, vec![*child.id()]);

        // The child is valid in the next epoch.
        assert_eq!(ids(&handler.handle_txs(&[child.clone()])), vec![*child.id()]);
    }

    #[test]
    fn invalid_candidates_are_excluded() {
        let (pool, funding) = genesis(&[(10, 1), (5, 2), (7, 3)]);
        let valid = payment(&[(&funding, 0, 1)], &[(9, 4)]);
        let overspend = payment(&[(&funding, 1, 2)], &[(7, 4)]);
        let forged = payment(&[(&funding, 2, 1)], &[(7, 1)]);
        let negative = payment(&[(&funding, 2, 3)], &[(8, 1), (-1, 3)]);

        let mut handler = TxHandler::new(&pool);
        let outcome = handler.handle_epoch(&[
            overspend.clone(),
            valid.clone(),
            forged.clone(),
            negative.clone(),
        ]);

        assert_eq!(ids(&outcome.accepted), vec![*valid.id()]);
        assert_eq!(
            outcome.rejected,
            vec![*overspend.id(), *forged.id(), *negative.id()]
        );
        // Everything except the spent output is still there, plus the new output.
        assert_eq!(handler.utxo_pool().len(), 3);
    }

    #[test]
    fn duplicate_candidate_is_accepted_once() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let t1 = payment(&[(&funding, 0, 1)], &[(10, 2)]);
        let mut handler = TxHandler::new(&pool);
        let outcome = handler.handle_epoch(&[t1.clone(), t1.clone()]);
        assert_eq!(outcome.accepted, vec![t1]);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn empty_epoch_changes_nothing() {
        let (pool, _) = genesis(&[(10, 1)]);
        let mut handler = TxHandler::new(&pool);
        assert!(handler.handle_txs(&[]).is_empty());
        assert_eq!(handler.into_utxo_pool(), pool);
    }

    #[test]
    fn total_value_never_increases() {
        let (pool, funding) = genesis(&[(10, 1), (20, 2)]);
        let candidates = vec![
            payment(&[(&funding, 0, 1)], &[(3, 2), (3, 3)]),
            payment(&[(&funding, 1, 2)], &[(20, 1)]),
            payment(&[(&funding, 1, 2)], &[(19, 3)]),
            payment(&[(&funding, 0, 1), (&funding, 1, 2)], &[(30, 3)]),
        ];
        let total = |pool: &UtxoPool| {
            Scroogecoin::checked_sum(pool.iter().map(|(_, output)| output.value())).unwrap()
        };
        let mut handler = TxHandler::new(&pool);
        handler.handle_txs(&candidates);
        assert!(total(handler.utxo_pool()) <= total(&pool));
    }

    #[test]
    fn candidate_order_parses() {
        assert_eq!(
            "submission".parse::<CandidateOrder>(),
            Ok(CandidateOrder::Submission)
        );
        assert_eq!("id".parse::<CandidateOrder>(), Ok(CandidateOrder::TransactionId));
        assert!("random".parse::<CandidateOrder>().is_err());
        assert_eq!(CandidateOrder::TransactionId.to_string(), "id");
    }
}
