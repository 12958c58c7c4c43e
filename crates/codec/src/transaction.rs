use crate::{from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf, put_be_bytes_checked, CodecError};

use alloy_primitives::{Address, Bytes, B256};
use dtl_primitives::{DecodedTransaction, Signature, TransactionType};

/// The minimum length of an embedded transaction: the type byte, `r`, `s`, `v`, the gas limit,
/// gas price and nonce (3 bytes each) and the target.
pub const TRANSACTION_MIN_LENGTH: usize = 95;

/// The outcome of decoding a sequencer transaction.
///
/// An unknown type byte or a structurally invalid encoding yields neither a decoded
/// transaction nor a type. A known encoding with a rejected signature keeps the type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaybeDecodedTransaction {
    /// The decoded transaction, if decoding and validation succeeded.
    pub decoded: Option<DecodedTransaction>,
    /// The type read from the leading byte.
    pub tx_type: Option<TransactionType>,
}

/// Decodes a sequencer transaction from its embedded encoding. Never fails: decoding errors
/// are reflected in the returned [`MaybeDecodedTransaction`].
pub fn decode_transaction(bytes: &[u8]) -> MaybeDecodedTransaction {
    let Some(tx_type) = bytes.first().copied().and_then(TransactionType::from_tag) else {
        return MaybeDecodedTransaction::default()
    };
    let Some(decoded) = try_decode_body(&mut &bytes[1..], tx_type) else {
        return MaybeDecodedTransaction::default()
    };

    let decoded = validate_batch_transaction(Some(tx_type), Some(&decoded)).then_some(decoded);
    MaybeDecodedTransaction { decoded, tx_type: Some(tx_type) }
}

fn try_decode_body(buf: &mut &[u8], tx_type: TransactionType) -> Option<DecodedTransaction> {
    if buf.len() < TRANSACTION_MIN_LENGTH - 1 {
        return None
    }

    let r = from_slice_and_advance_buf!(B256, 32, buf);
    let s = from_slice_and_advance_buf!(B256, 32, buf);
    let v = from_be_bytes_slice_and_advance_buf!(u8, buf);
    let gas_limit = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
    let gas_price = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
    let nonce = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
    let target = from_slice_and_advance_buf!(Address, 20, buf);
    let data = Bytes::copy_from_slice(buf);

    Some(DecodedTransaction {
        sig: Signature { r, s, v },
        gas_limit,
        gas_price,
        nonce,
        target,
        data,
        tx_type,
    })
}

/// Returns true if the transaction has a known type and a signature recovery parameter of
/// exactly `0` or `1`.
pub fn validate_batch_transaction(
    tx_type: Option<TransactionType>,
    decoded: Option<&DecodedTransaction>,
) -> bool {
    match (tx_type, decoded) {
        (Some(TransactionType::Eip155 | TransactionType::EthSign), Some(decoded)) => {
            matches!(decoded.sig.v, 0 | 1)
        }
        _ => false,
    }
}

/// Encodes the [`DecodedTransaction`] into its embedded encoding.
pub fn encode_transaction(transaction: &DecodedTransaction) -> Result<Bytes, CodecError> {
    let mut buf = Vec::with_capacity(TRANSACTION_MIN_LENGTH + transaction.data.len());
    buf.push(transaction.tx_type.tag());
    buf.extend_from_slice(transaction.sig.r.as_slice());
    buf.extend_from_slice(transaction.sig.s.as_slice());
    buf.push(transaction.sig.v);
    put_be_bytes_checked!(buf, transaction.gas_limit, 3, "gasLimit");
    put_be_bytes_checked!(buf, transaction.gas_price, 3, "gasPrice");
    put_be_bytes_checked!(buf, transaction.nonce, 3, "nonce");
    buf.extend_from_slice(transaction.target.as_slice());
    buf.extend_from_slice(&transaction.data);
    Ok(buf.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_transaction;

    #[test]
    fn test_should_decode_transactions() -> eyre::Result<()> {
        for i in 0..16 {
            let transaction = sample_transaction(i);
            let encoded = encode_transaction(&transaction)?;

            let decoded = decode_transaction(&encoded);

            assert_eq!(decoded.tx_type, Some(transaction.tx_type));
            assert_eq!(decoded.decoded, Some(transaction));
        }
        Ok(())
    }

    #[test]
    fn test_should_soft_fail_on_unknown_type() -> eyre::Result<()> {
        let mut encoded = encode_transaction(&sample_transaction(1))?.to_vec();
        encoded[0] = 2;

        assert_eq!(decode_transaction(&encoded), MaybeDecodedTransaction::default());
        assert_eq!(decode_transaction(&[]), MaybeDecodedTransaction::default());

        Ok(())
    }

    #[test]
    fn test_should_soft_fail_on_truncated_transaction() -> eyre::Result<()> {
        let encoded = encode_transaction(&sample_transaction(3))?;

        let decoded = decode_transaction(&encoded[..TRANSACTION_MIN_LENGTH - 1]);

        assert_eq!(decoded, MaybeDecodedTransaction { decoded: None, tx_type: None });
        Ok(())
    }

    #[test]
    fn test_should_keep_type_on_rejected_signature() -> eyre::Result<()> {
        for v in [2u8, 27, 28, 255] {
            let mut transaction = sample_transaction(4);
            transaction.sig.v = v;
            let encoded = encode_transaction(&transaction)?;

            let decoded = decode_transaction(&encoded);

            assert_eq!(decoded.decoded, None);
            assert_eq!(decoded.tx_type, Some(transaction.tx_type));
        }
        Ok(())
    }

    #[test]
    fn test_validate_batch_transaction() {
        let mut transaction = sample_transaction(0);

        for ty in [TransactionType::Eip155, TransactionType::EthSign] {
            for v in [0, 1] {
                transaction.sig.v = v;
                assert!(validate_batch_transaction(Some(ty), Some(&transaction)));
            }
            transaction.sig.v = 2;
            assert!(!validate_batch_transaction(Some(ty), Some(&transaction)));
            assert!(!validate_batch_transaction(Some(ty), None));
        }

        transaction.sig.v = 0;
        assert!(!validate_batch_transaction(None, Some(&transaction)));
        assert!(!validate_batch_transaction(None, None));
    }
}
