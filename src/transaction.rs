use crate::{Address, Keypair, LedgerError, LedgerResult, Scroogecoin, Sha256, Signature, Utxo};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction content.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_sha256(&self) -> &Sha256 {
        &self.0
    }

    pub fn from_hex(s: &str) -> LedgerResult<Self> {
        Sha256::from_hex(s).map(Self)
    }
}

/// The position of an output in its transaction, the first one is 0.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // A pointer to the transaction containing the output to be spent.
    prev_tx_id: TransactionId,
    // The index of that output in the referenced transaction.
    output_index: OutputIndex,
    // Signature over `raw_data_to_sign` for this input's position, made by the key
    // owning the referenced output. None until the input is signed.
    signature: Option<Signature>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prev_tx_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(prev_tx_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            prev_tx_id,
            output_index,
            signature: None,
        }
    }

    pub fn prev_tx_id(&self) -> &TransactionId {
        &self.prev_tx_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The unspent output this input claims.
    pub fn utxo(&self) -> Utxo {
        Utxo::new(self.prev_tx_id, self.output_index)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    value: Scroogecoin,
    address: Address,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.value, self.address)
    }
}

impl TransactionOutput {
    pub fn new(value: Scroogecoin, address: Address) -> Self {
        Self { value, address }
    }

    pub fn value(&self) -> Scroogecoin {
        self.value
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// The message that the signature of the input at `position` authenticates.
/// Signatures are excluded, and the position and the claimed output are included so that a
/// signature can't be moved to another input.
#[derive(Serialize)]
struct SignablePayload<'a> {
    position: u32,
    prev_tx_id: &'a TransactionId,
    output_index: OutputIndex,
    outputs: &'a [TransactionOutput],
}

#[derive(Serialize)]
struct TransactionContent<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

fn raw_data_to_sign(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    index: usize,
) -> LedgerResult<Vec<u8>> {
    let input = inputs.get(index).ok_or(LedgerError::InputIndexOutOfRange {
        index,
        len: inputs.len(),
    })?;
    let payload = SignablePayload {
        position: index as u32,
        prev_tx_id: &input.prev_tx_id,
        output_index: input.output_index,
        outputs,
    };
    Ok(bincode::serialize(&payload)?)
}

fn hash_transaction_data(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
) -> LedgerResult<TransactionId> {
    let data = bincode::serialize(&TransactionContent { inputs, outputs })?;
    Ok(TransactionId(Sha256::double_digest(&data)))
}

/// A finalized transaction. The id is derived from the content when the transaction is created,
/// so the content can't change afterwards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> LedgerResult<Self> {
        let id = hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    /// A transaction without inputs that mints `value` to `address`.
    /// Only useful to seed a pool, an epoch never accepts value out of thin air because the
    /// outputs of a transaction without inputs must sum to zero.
    pub fn coinbase(value: Scroogecoin, address: Address) -> LedgerResult<Self> {
        Self::new(vec![], vec![TransactionOutput::new(value, address)])
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&TransactionInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&TransactionOutput> {
        self.outputs.get(index)
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1
    }

    /// Returns the canonical bytes that the signature of the input at `index` must sign.
    pub fn raw_data_to_sign(&self, index: usize) -> LedgerResult<Vec<u8>> {
        raw_data_to_sign(&self.inputs, &self.outputs, index)
    }

    /// The outputs this transaction creates, paired with the identity each gets once accepted.
    pub fn utxos(&self) -> impl Iterator<Item = (Utxo, &TransactionOutput)> + '_ {
        let id = self.id;
        self.outputs
            .iter()
            .enumerate()
            .map(move |(index, output)| (Utxo::new(id, OutputIndex::new(index as u32)), output))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] => [{}]",
            self.id,
            self.inputs
                .iter()
                .map(TransactionInput::to_string)
                .collect::<Vec<String>>()
                .join(", "),
            self.outputs
                .iter()
                .map(TransactionOutput::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// Wire form of a transaction. The id is optional and, when present, must match the content.
#[derive(Deserialize)]
struct TransactionRecord {
    #[serde(default)]
    id: Option<TransactionId>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LedgerError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let transaction = Transaction::new(record.inputs, record.outputs)?;
        match record.id {
            Some(stated) if stated != transaction.id => Err(LedgerError::IdMismatch {
                stated,
                computed: transaction.id,
            }),
            _ => Ok(transaction),
        }
    }
}

/// Assembles a transaction input by input, so that each input can be signed before the
/// transaction is finalized.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, prev_tx_id: TransactionId, output_index: u32) -> &mut Self {
        self.inputs
            .push(TransactionInput::new(prev_tx_id, OutputIndex::new(output_index)));
        self
    }

    pub fn add_output(&mut self, value: Scroogecoin, address: Address) -> &mut Self {
        self.outputs.push(TransactionOutput::new(value, address));
        self
    }

    /// Removes the input at `index`. Signatures of the following inputs are bound to their
    /// positions, so they must be produced again.
    pub fn remove_input(&mut self, index: usize) -> Option<TransactionInput> {
        if index < self.inputs.len() {
            Some(self.inputs.remove(index))
        } else {
            None
        }
    }

    /// Removes the first input claiming `utxo`.
    pub fn remove_input_for(&mut self, utxo: &Utxo) -> Option<TransactionInput> {
        let index = self.inputs.iter().position(|input| input.utxo() == *utxo)?;
        self.remove_input(index)
    }

    pub fn raw_data_to_sign(&self, index: usize) -> LedgerResult<Vec<u8>> {
        raw_data_to_sign(&self.inputs, &self.outputs, index)
    }

    pub fn add_signature(&mut self, index: usize, signature: Signature) -> LedgerResult<()> {
        let len = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(LedgerError::InputIndexOutOfRange { index, len })?;
        input.signature = Some(signature);
        Ok(())
    }

    pub fn sign_input(&mut self, index: usize, keypair: &Keypair) -> LedgerResult<()> {
        let message = self.raw_data_to_sign(index)?;
        self.add_signature(index, keypair.sign(&message))
    }

    pub fn build(&self) -> LedgerResult<Transaction> {
        Transaction::new(self.inputs.clone(), self.outputs.clone())
    }
}
