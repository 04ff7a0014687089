//! Receipt polling: a cost-free, lazy follow-up query that polls with
//! exponential backoff until a terminal receipt code or the overall
//! deadline (spec §4.5).

use crate::error::TransactionError;
use crate::query::QueryBody;
use crate::transaction_id::TransactionId;

/// The payload of a receipt query: just the transaction id being polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptQueryBody {
    pub transaction_id: TransactionId,
}

impl QueryBody for ReceiptQueryBody {
    fn to_bytes(&self) -> Vec<u8> {
        self.transaction_id.to_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let transaction_id =
            TransactionId::from_bytes(bytes).ok_or_else(|| TransactionError::BodyDecode("truncated ReceiptQueryBody".into()))?;
        Ok(Self { transaction_id })
    }

    /// Receipt polling never carries a payment, per spec §4.6.
    fn is_free(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgersdk_primitives::{AccountId, Timestamp};

    #[test]
    fn is_always_free() {
        let body = ReceiptQueryBody {
            transaction_id: TransactionId { payer: AccountId::new(0, 0, 1), valid_start: Timestamp::new(1, 0), nonce: 0, scheduled: false },
        };
        assert!(body.is_free());
    }

    #[test]
    fn round_trips_through_bytes() {
        let body = ReceiptQueryBody {
            transaction_id: TransactionId { payer: AccountId::new(0, 0, 7), valid_start: Timestamp::new(42, 9), nonce: 0, scheduled: false },
        };
        let bytes = body.to_bytes();
        let decoded = ReceiptQueryBody::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, body);
    }
}
