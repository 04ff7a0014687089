//! `TransactionId`: `(payer, validStart, nonce, scheduled)`. Two
//! transactions with equal tuples are the same on-chain identity.

use ledgersdk_primitives::{AccountId, Timestamp};

/// Identifies a transaction (or a scheduled transaction) on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionId {
    pub payer: AccountId,
    pub valid_start: Timestamp,
    pub nonce: i32,
    pub scheduled: bool,
}

impl TransactionId {
    /// Builds a fresh, non-scheduled transaction id with `nonce = 0` and
    /// `valid_start` jittered up to 10 s before `now`, per spec §4.5
    /// (`freezeWith` defaulting rule).
    pub fn generate(payer: AccountId, now: Timestamp) -> Self {
        let jitter_secs = rand::random::<u64>() % 10;
        Self { payer, valid_start: now.minus_seconds(jitter_secs), nonce: 0, scheduled: false }
    }

    /// The transaction id for the `n`-th chunk of a chunked transaction:
    /// same payer and valid-start as the initial id, nanos incremented by
    /// `n`.
    pub fn for_chunk(&self, n: u64) -> Self {
        Self { payer: self.payer.clone(), valid_start: self.valid_start.plus_nanos(n), nonce: self.nonce, scheduled: self.scheduled }
    }

    /// `payer‖seconds‖nanos‖nonce‖scheduled` in a simple fixed-width wire
    /// form (the real wire schema is an external collaborator per spec
    /// §1; this crate's `toBytes`/`fromBytes` only need to round-trip
    /// internally).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        let payer = self.payer.to_string_no_checksum();
        out.extend((payer.len() as u32).to_be_bytes());
        out.extend(payer.as_bytes());
        out.extend(self.valid_start.seconds.to_be_bytes());
        out.extend(self.valid_start.nanos.to_be_bytes());
        out.extend(self.nonce.to_be_bytes());
        out.push(self.scheduled as u8);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let payer_len = u32::from_be_bytes(bytes[0..4].try_into().ok()?) as usize;
        let mut offset = 4;
        let payer_str = std::str::from_utf8(bytes.get(offset..offset + payer_len)?).ok()?;
        offset += payer_len;
        let payer = AccountId::from_str_checked(payer_str, None).ok()?;
        let seconds = u64::from_be_bytes(bytes.get(offset..offset + 8)?.try_into().ok()?);
        offset += 8;
        let nanos = u32::from_be_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?);
        offset += 4;
        let nonce = i32::from_be_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?);
        offset += 4;
        let scheduled = *bytes.get(offset)? != 0;
        Some(Self { payer, valid_start: ledgersdk_primitives::Timestamp::new(seconds, nanos), nonce, scheduled })
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}.{}{}",
            self.payer,
            self.valid_start.seconds,
            self.valid_start.nanos,
            if self.scheduled { "?scheduled" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let id = TransactionId {
            payer: AccountId::new(0, 0, 1001),
            valid_start: Timestamp::new(1_700_000_000, 123_456_789),
            nonce: 0,
            scheduled: false,
        };
        let bytes = id.to_bytes();
        assert_eq!(TransactionId::from_bytes(&bytes).unwrap(), id);
    }

    #[test]
    fn chunk_ids_increment_nanos_keeping_payer_and_nonce() {
        let id = TransactionId { payer: AccountId::new(0, 0, 1), valid_start: Timestamp::new(100, 0), nonce: 0, scheduled: false };
        let chunk2 = id.for_chunk(2);
        assert_eq!(chunk2.valid_start, Timestamp::new(100, 2));
        assert_eq!(chunk2.payer, id.payer);
        assert_eq!(chunk2.nonce, id.nonce);
    }

    #[test]
    fn generated_valid_start_is_at_or_before_now() {
        let now = Timestamp::new(1_700_000_100, 0);
        let id = TransactionId::generate(AccountId::new(0, 0, 2), now);
        assert!(id.valid_start.seconds <= now.seconds);
        assert!(now.seconds - id.valid_start.seconds <= 10);
        assert_eq!(id.nonce, 0);
        assert!(!id.scheduled);
    }
}
