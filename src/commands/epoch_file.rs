use crate::{
    Address, CandidateOrder, EpochOutcome, LedgerResult, OutputIndex, Scroogecoin, Transaction,
    TransactionId, TransactionOutput, Utxo, UtxoPool,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single unspent output as it appears in epoch files and reports.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub tx_id: TransactionId,
    pub index: OutputIndex,
    pub value: Scroogecoin,
    pub address: Address,
}

impl PoolEntry {
    pub fn new(utxo: &Utxo, output: &TransactionOutput) -> Self {
        Self {
            tx_id: *utxo.tx_id(),
            index: utxo.index(),
            value: output.value(),
            address: *output.address(),
        }
    }

    /// Entries for the whole pool, ordered by UTXO.
    pub fn from_pool(pool: &UtxoPool) -> Vec<PoolEntry> {
        pool.all_utxos()
            .iter()
            .filter_map(|utxo| pool.get_output(utxo).map(|output| Self::new(utxo, output)))
            .collect()
    }
}

/// The input of the `epoch` command: a pool snapshot and the candidates proposed for one epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochFile {
    pub pool: Vec<PoolEntry>,
    pub transactions: Vec<Transaction>,
}

impl EpochFile {
    pub fn new(pool: &UtxoPool, transactions: Vec<Transaction>) -> Self {
        Self {
            pool: PoolEntry::from_pool(pool),
            transactions,
        }
    }

    pub fn read(path: &Path) -> LedgerResult<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn write(&self, path: &Path) -> LedgerResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn utxo_pool(&self) -> UtxoPool {
        self.pool
            .iter()
            .map(|entry| {
                (
                    Utxo::new(entry.tx_id, entry.index),
                    TransactionOutput::new(entry.value, entry.address),
                )
            })
            .collect()
    }
}

/// The output of the `epoch` command.
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub processed_at: String,
    pub candidate_order: CandidateOrder,
    pub accepted: Vec<TransactionId>,
    pub rejected: Vec<TransactionId>,
    pub pool: Vec<PoolEntry>,
}

impl EpochReport {
    pub fn new(outcome: &EpochOutcome, candidate_order: CandidateOrder, pool: &UtxoPool) -> Self {
        Self {
            processed_at: chrono::Utc::now().to_rfc3339(),
            candidate_order,
            accepted: outcome.accepted.iter().map(|t| *t.id()).collect(),
            rejected: outcome.rejected.clone(),
            pool: PoolEntry::from_pool(pool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{genesis, payment};

    #[test]
    fn epoch_file_roundtrips_through_json() {
        let (pool, funding) = genesis(&[(10, 1), (3, 2)]);
        let file = EpochFile::new(&pool, vec![payment(&[(&funding, 0, 1)], &[(10, 2)])]);

        let json = serde_json::to_string(&file).unwrap();
        let decoded: EpochFile = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.utxo_pool(), pool);
        assert_eq!(decoded.transactions, file.transactions);
    }

    #[test]
    fn entries_are_ordered() {
        let (pool, _) = genesis(&[(10, 1), (3, 2), (4, 3)]);
        let entries = PoolEntry::from_pool(&pool);
        let indices = entries.iter().map(|e| e.index.value()).collect::<Vec<u32>>();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn read_and_write_file() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let file = EpochFile::new(&pool, vec![payment(&[(&funding, 0, 1)], &[(10, 2)])]);
        let path = std::env::temp_dir().join(format!(
            "scroogecoin-epoch-file-test-{}.json",
            std::process::id()
        ));
        file.write(&path).unwrap();
        let decoded = EpochFile::read(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(decoded.transactions, file.transactions);
        assert_eq!(decoded.pool, file.pool);
    }

    #[test]
    fn tampered_transaction_fails_to_decode() {
        let (pool, funding) = genesis(&[(10, 1)]);
        let file = EpochFile::new(&pool, vec![payment(&[(&funding, 0, 1)], &[(10, 2)])]);
        let mut value = serde_json::to_value(&file).unwrap();
        value["transactions"][0]["outputs"][0]["value"] = serde_json::json!(1000);
        assert!(serde_json::from_value::<EpochFile>(value).is_err());
    }
}
