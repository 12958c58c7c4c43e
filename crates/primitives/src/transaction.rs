use crate::{EnqueueEntry, PrimitiveError};

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// The origin of a transaction in the canonical transaction chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum QueueOrigin {
    /// The transaction was submitted by the sequencer.
    Sequencer,
    /// The transaction was enqueued directly on the L1.
    L1,
}

impl QueueOrigin {
    /// Returns the str representation of the [`QueueOrigin`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sequencer => "sequencer",
            Self::L1 => "l1",
        }
    }
}

impl TryFrom<&str> for QueueOrigin {
    type Error = PrimitiveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sequencer" => Ok(Self::Sequencer),
            "l1" => Ok(Self::L1),
            other => Err(PrimitiveError::UnknownQueueOrigin(other.to_owned())),
        }
    }
}

/// The embedded encoding of a sequencer batch transaction, given by its leading type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum TransactionType {
    /// EIP-155 style signed transaction, type byte `0`.
    #[serde(rename = "EIP155")]
    Eip155,
    /// `eth_sign` style signed transaction, type byte `1`.
    #[serde(rename = "ETH_SIGN")]
    EthSign,
}

impl TransactionType {
    /// Returns the [`TransactionType`] for the provided type byte, if known.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Eip155),
            1 => Some(Self::EthSign),
            _ => None,
        }
    }

    /// Returns the type byte of the [`TransactionType`].
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Eip155 => 0,
            Self::EthSign => 1,
        }
    }

    /// Returns the str representation of the [`TransactionType`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eip155 => "EIP155",
            Self::EthSign => "ETH_SIGN",
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = PrimitiveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EIP155" => Ok(Self::Eip155),
            "ETH_SIGN" => Ok(Self::EthSign),
            other => Err(PrimitiveError::UnknownTransactionType(other.to_owned())),
        }
    }
}

/// The signature of a sequencer batch transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Signature {
    /// The `r` value.
    pub r: B256,
    /// The `s` value.
    pub s: B256,
    /// The recovery parameter. Only `0` and `1` are valid.
    pub v: u8,
}

/// A sequencer batch transaction decoded from its embedded encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    /// The transaction signature.
    pub sig: Signature,
    /// The gas limit.
    pub gas_limit: u64,
    /// The gas price.
    pub gas_price: u64,
    /// The sender nonce.
    pub nonce: u64,
    /// The call target.
    pub target: Address,
    /// The call data.
    pub data: Bytes,
    /// The embedded encoding the transaction was decoded from.
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

/// One L2 bound transaction of the canonical transaction chain, either submitted in a sequencer
/// batch or enqueued directly on the L1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    /// The global index of the transaction.
    pub index: u64,
    /// The index of the batch the transaction was submitted in.
    pub batch_index: u64,
    /// The L2 block number of the transaction.
    pub block_number: u64,
    /// The L2 timestamp of the transaction.
    pub timestamp: u64,
    /// The gas limit of the transaction.
    pub gas_limit: u64,
    /// The call target.
    pub target: Address,
    /// The L1 origin of an enqueued transaction.
    pub origin: Option<Address>,
    /// The raw transaction data.
    pub data: Bytes,
    /// The origin of the transaction.
    pub queue_origin: QueueOrigin,
    /// The embedded encoding of a sequencer transaction.
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    /// The queue index of an enqueued transaction.
    pub queue_index: Option<u64>,
    /// The decoded sequencer transaction, if it could be decoded and validated.
    pub decoded: Option<DecodedTransaction>,
    /// Whether the transaction has been confirmed on the L1.
    pub confirmed: bool,
}

impl TransactionEntry {
    /// Returns true if the entry is an L1 origin entry which was written without its enqueue
    /// companion, i.e. with zero block number and timestamp.
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.queue_origin, QueueOrigin::L1) &&
            self.block_number == 0 &&
            self.timestamp == 0
    }

    /// Fills the enqueue derived fields of the entry from the provided [`EnqueueEntry`].
    pub fn reconcile(&mut self, enqueue: &EnqueueEntry) {
        debug_assert_eq!(self.queue_index, Some(enqueue.index));
        self.block_number = enqueue.block_number;
        self.timestamp = enqueue.timestamp;
        self.gas_limit = enqueue.gas_limit;
        self.target = enqueue.target;
        self.origin = Some(enqueue.origin);
        self.data = enqueue.data.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    fn placeholder(index: u64, queue_index: u64) -> TransactionEntry {
        TransactionEntry {
            index,
            batch_index: 0,
            block_number: 0,
            timestamp: 0,
            gas_limit: 0,
            target: Address::ZERO,
            origin: Some(Address::ZERO),
            data: Bytes::new(),
            queue_origin: QueueOrigin::L1,
            tx_type: Some(TransactionType::Eip155),
            queue_index: Some(queue_index),
            decoded: None,
            confirmed: true,
        }
    }

    #[test]
    fn test_should_reconcile_placeholder_with_enqueue() {
        let mut entry = placeholder(3, 0);
        assert!(entry.is_placeholder());

        let enqueue = EnqueueEntry {
            index: 0,
            target: address!("0x1111111111111111111111111111111111111111"),
            data: bytes!("c0ffee"),
            gas_limit: 250_000,
            origin: address!("0x2222222222222222222222222222222222222222"),
            block_number: 12,
            timestamp: 1_700_000_000,
            ctc_index: None,
        };
        entry.reconcile(&enqueue);

        assert!(!entry.is_placeholder());
        assert_eq!(entry.index, 3);
        assert_eq!(entry.target, enqueue.target);
        assert_eq!(entry.origin, Some(enqueue.origin));
        assert_eq!(entry.data, enqueue.data);
        assert_eq!(entry.gas_limit, 250_000);
        assert_eq!(entry.block_number, 12);
    }

    #[test]
    fn test_should_serialize_with_original_field_names() {
        let entry = placeholder(0, 7);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["queueOrigin"], "l1");
        assert_eq!(json["type"], "EIP155");
        assert_eq!(json["queueIndex"], 7);
        assert!(json["decoded"].is_null());
    }

    #[test]
    fn test_transaction_type_tags() {
        assert_eq!(TransactionType::from_tag(0), Some(TransactionType::Eip155));
        assert_eq!(TransactionType::from_tag(1), Some(TransactionType::EthSign));
        assert_eq!(TransactionType::from_tag(2), None);
        assert_eq!(TransactionType::try_from("ETH_SIGN"), Ok(TransactionType::EthSign));
        assert!(QueueOrigin::try_from("l2").is_err());
    }
}
