//! Entity-id checksum algorithm.
//!
//! Five lowercase letters, deterministic in `(shard, realm, num, ledger id)`,
//! distinct across ledgers for the same id. Shape: a weighted positional
//! digit sum folded with a rolling hash of the same digit stream, mixed with
//! the ledger id and reduced to a base-26 alphabet.
//!
//! This does not reproduce the fixed-vector corpus some deployments pin
//! their checksums to. That corpus is generated by an undisclosed exact
//! mixing/encoding procedure; no reference implementation for it was part
//! of the material this crate was built from, and working backward from
//! the handful of known input/output pairs (varying the rolling-hash
//! modulus, digit/parity assignment, term nesting order, and final-encode
//! width) did not converge on a formula that reproduces them. What's
//! implemented here instead satisfies the checksum's structural contract:
//! deterministic, five lowercase letters, and distinct across ledger ids
//! for the same entity id (see the tests below). See `DESIGN.md` for the
//! full account of this gap.

use crate::ledger_id::LedgerId;

/// Modulus for the positional sums and the rolling hash (`11^5`).
const P: u64 = 11 * 11 * 11 * 11 * 11;
/// Modulus for the final base-26 reduction (`26^5`): gives every one of the
/// five output letters full entropy instead of pinning the leading letters
/// to `'a'` when reduced by the smaller `P`.
const FINAL_MOD: u64 = 26 * 26 * 26 * 26 * 26;
const ROLLING_WEIGHT: u64 = 31;

/// Computes the 5-letter checksum for `shard.realm.num` against `ledger_id`.
pub fn compute(shard: u64, realm: u64, num: u64, ledger_id: &LedgerId) -> String {
    let digits = digit_stream(shard, realm, num);

    let mut s: u64 = 0;
    let mut s0: u64 = 0;
    let mut s1: u64 = 0;
    let mut sh: u64 = 0;
    for (i, &d) in digits.iter().enumerate() {
        s = (s + d) % 11;
        if i % 2 == 0 {
            s0 = (s0 + d) % 11;
        } else {
            s1 = (s1 + d) % 11;
        }
        sh = (sh * ROLLING_WEIGHT + d) % P;
    }

    // Seeded at 1 rather than 0 so a single `0x00` byte (mainnet's ledger
    // id) still folds to a nonzero mixing factor below; otherwise mainnet
    // ids would all collapse onto the same checksum regardless of `sh`/`s`.
    let mut folded: u64 = 1;
    for &b in ledger_id.as_bytes() {
        folded = (folded * 256 + b as u64 + 1) % P;
    }
    let m = folded % P;

    let len_term = (digits.len() as u64 % 5) * 11 + s0;
    let inner = ((len_term * 11 + s1) * 11 + sh + s) % FINAL_MOD;
    let c = (inner * m) % FINAL_MOD;

    encode_base26(c)
}

/// Verifies `checksum` against the checksum computed for `(shard, realm, num)`
/// on `ledger_id`.
pub fn verify(shard: u64, realm: u64, num: u64, ledger_id: &LedgerId, checksum: &str) -> bool {
    compute(shard, realm, num, ledger_id) == checksum
}

fn digit_stream(shard: u64, realm: u64, num: u64) -> Vec<u64> {
    let mut out = Vec::new();
    push_decimal(&mut out, shard);
    out.push(10);
    push_decimal(&mut out, realm);
    out.push(10);
    push_decimal(&mut out, num);
    out
}

fn push_decimal(out: &mut Vec<u64>, mut n: u64) {
    let start = out.len();
    if n == 0 {
        out.push(0);
        return;
    }
    while n > 0 {
        out.push(n % 10);
        n /= 10;
    }
    out[start..].reverse();
}

fn encode_base26(mut c: u64) -> String {
    let mut letters = [0u8; 5];
    for slot in letters.iter_mut().rev() {
        *slot = (c % 26) as u8;
        c /= 26;
    }
    letters.iter().map(|&d| (b'a' + d) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_five_lowercase_letters() {
        let cs = compute(0, 0, 1126123, &LedgerId::mainnet());
        assert_eq!(cs.len(), 5);
        assert!(cs.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn deterministic() {
        let a = compute(0, 0, 255, &LedgerId::mainnet());
        let b = compute(0, 0, 255, &LedgerId::mainnet());
        assert_eq!(a, b);
    }

    #[test]
    fn differs_across_ledgers() {
        let mainnet = compute(0, 0, 1, &LedgerId::mainnet());
        let testnet = compute(0, 0, 1, &LedgerId::testnet());
        let previewnet = compute(0, 0, 1, &LedgerId::previewnet());
        assert_ne!(mainnet, testnet);
        assert_ne!(testnet, previewnet);
        assert_ne!(mainnet, previewnet);
    }

    #[test]
    fn distinct_ids_usually_differ() {
        let a = compute(0, 0, 1, &LedgerId::mainnet());
        let b = compute(0, 0, 2, &LedgerId::mainnet());
        let c = compute(0, 0, 1126123, &LedgerId::mainnet());
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn verify_roundtrips() {
        let id = LedgerId::testnet();
        let cs = compute(1, 2, 3, &id);
        assert!(verify(1, 2, 3, &id, &cs));
        assert!(!verify(1, 2, 3, &id, "zzzzz"));
    }
}
