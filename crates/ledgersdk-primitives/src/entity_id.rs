//! The entity-id family: `shard.realm.num` triplets, their checksum-bearing
//! string form, and the account/contract alias & EVM-address variants.

use std::fmt;

use crate::checksum;
use crate::error::PrimitivesError;
use crate::ledger_id::LedgerId;

fn bad(input: &str, reason: impl Into<String>) -> PrimitivesError {
    PrimitivesError::BadEntityId { input: input.to_string(), reason: reason.into() }
}

/// Splits `shard.realm.tail` into its three components. `tail` is returned
/// unparsed so callers can further split off a `-checksum` suffix or decide
/// whether it's a decimal number or an EVM address.
fn split_shard_realm_tail(s: &str) -> Result<(u64, u64, &str), PrimitivesError> {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [num] => Ok((0, 0, num)),
        [shard, realm, tail] => {
            let shard = shard.parse().map_err(|_| bad(s, "bad shard"))?;
            let realm = realm.parse().map_err(|_| bad(s, "bad realm"))?;
            Ok((shard, realm, tail))
        }
        _ => Err(bad(s, "expected `num` or `shard.realm.num`")),
    }
}

/// Splits a trailing `-xxxxx` checksum suffix (5 lowercase letters) off
/// `tail`, if present.
fn split_checksum(tail: &str) -> (&str, Option<String>) {
    if let Some((body, cs)) = tail.rsplit_once('-') {
        if cs.len() == 5 && cs.chars().all(|c| c.is_ascii_lowercase()) {
            return (body, Some(cs.to_string()));
        }
    }
    (tail, None)
}

fn verify_checksum_if_present(
    shard: u64,
    realm: u64,
    num: u64,
    checksum: &Option<String>,
    ledger_id: Option<&LedgerId>,
) -> Result<(), PrimitivesError> {
    let (Some(cs), Some(ledger_id)) = (checksum.as_ref(), ledger_id) else {
        return Ok(());
    };
    let expected = checksum::compute(shard, realm, num, ledger_id);
    if &expected != cs {
        return Err(PrimitivesError::ChecksumMismatch {
            shard,
            realm,
            num,
            expected,
            actual: cs.clone(),
        });
    }
    Ok(())
}

fn parse_evm_address(hex_str: &str) -> Option<[u8; 20]> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if hex_str.len() != 40 {
        return None;
    }
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

macro_rules! simple_entity_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            /// Shard number.
            pub shard: u64,
            /// Realm number.
            pub realm: u64,
            /// Entity number.
            pub num: u64,
            /// Checksum embedded in the string this id was parsed from, if any.
            pub checksum: Option<String>,
        }

        impl $name {
            /// Builds an id with no checksum annotation.
            pub fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self { shard, realm, num, checksum: None }
            }

            /// Parses `num`, `shard.realm.num`, or `shard.realm.num-checksum`.
            /// If a checksum is present and `ledger_id` is supplied, it is
            /// validated immediately.
            pub fn from_str_checked(
                s: &str,
                ledger_id: Option<&LedgerId>,
            ) -> Result<Self, PrimitivesError> {
                let (shard, realm, tail) = split_shard_realm_tail(s)?;
                let (num_str, checksum) = split_checksum(tail);
                let num: u64 = num_str.parse().map_err(|_| bad(s, "bad entity number"))?;
                verify_checksum_if_present(shard, realm, num, &checksum, ledger_id)?;
                Ok(Self { shard, realm, num, checksum })
            }

            /// The checksum for this id against `ledger_id`, computing it if
            /// it was not carried from the parsed string.
            pub fn checksum_for(&self, ledger_id: &LedgerId) -> String {
                checksum::compute(self.shard, self.realm, self.num, ledger_id)
            }

            /// Canonical `shard.realm.num` form, without a checksum.
            pub fn to_string_no_checksum(&self) -> String {
                format!("{}.{}.{}", self.shard, self.realm, self.num)
            }

            /// `shard.realm.num-checksum` against `ledger_id`.
            pub fn to_string_with_checksum(&self, ledger_id: &LedgerId) -> String {
                format!("{}-{}", self.to_string_no_checksum(), self.checksum_for(ledger_id))
            }

            /// Wire-schema serialization: `shard‖realm‖num`, each an 8-byte
            /// big-endian integer. Carries no checksum (it's a derived,
            /// ledger-relative annotation, not part of the id's identity).
            pub fn to_bytes(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(24);
                out.extend(self.shard.to_be_bytes());
                out.extend(self.realm.to_be_bytes());
                out.extend(self.num.to_be_bytes());
                out
            }

            /// Parses the [`to_bytes`](Self::to_bytes) wire form.
            pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
                if bytes.len() != 24 {
                    return None;
                }
                let shard = u64::from_be_bytes(bytes[0..8].try_into().ok()?);
                let realm = u64::from_be_bytes(bytes[8..16].try_into().ok()?);
                let num = u64::from_be_bytes(bytes[16..24].try_into().ok()?);
                Some(Self { shard, realm, num, checksum: None })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_string_no_checksum())
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                (self.shard, self.realm, self.num) == (other.shard, other.realm, other.num)
            }
        }
        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                (self.shard, self.realm, self.num).hash(state);
            }
        }
    };
}

simple_entity_id!(TokenId, "A fungible or non-fungible token type.");
simple_entity_id!(TopicId, "A consensus topic.");
simple_entity_id!(FileId, "A file stored on the ledger.");
simple_entity_id!(ScheduleId, "A scheduled transaction.");

/// The underlying address of an [`AccountId`]: a plain number, a public-key
/// alias, or an EVM address. Exactly one is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountAddress {
    /// A plain entity number.
    Num(u64),
    /// A public-key alias, stored as its DER-encoded bytes.
    Alias(Vec<u8>),
    /// A 20-byte EVM address.
    Evm([u8; 20]),
}

/// An account on the ledger.
#[derive(Debug, Clone)]
pub struct AccountId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// The account's address.
    pub address: AccountAddress,
    /// Checksum embedded in the string this id was parsed from, if any.
    /// Only meaningful when `address` is `Num`.
    pub checksum: Option<String>,
}

impl AccountId {
    /// Builds a plain-numbered account id.
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, address: AccountAddress::Num(num), checksum: None }
    }

    /// Builds an alias account id from DER-encoded public-key bytes.
    pub fn from_alias_bytes(shard: u64, realm: u64, alias_der: Vec<u8>) -> Self {
        Self { shard, realm, address: AccountAddress::Alias(alias_der), checksum: None }
    }

    /// Builds an EVM-address account id.
    pub fn from_evm_address(shard: u64, realm: u64, evm: [u8; 20]) -> Self {
        Self { shard, realm, address: AccountAddress::Evm(evm), checksum: None }
    }

    /// Parses `num`, `shard.realm.num`, `shard.realm.num-checksum`, or
    /// `shard.realm.evmAddress`.
    pub fn from_str_checked(
        s: &str,
        ledger_id: Option<&LedgerId>,
    ) -> Result<Self, PrimitivesError> {
        let (shard, realm, tail) = split_shard_realm_tail(s)?;
        if let Some(evm) = parse_evm_address(tail) {
            return Ok(Self { shard, realm, address: AccountAddress::Evm(evm), checksum: None });
        }
        let (num_str, checksum) = split_checksum(tail);
        let num: u64 = num_str.parse().map_err(|_| bad(s, "bad account number"))?;
        verify_checksum_if_present(shard, realm, num, &checksum, ledger_id)?;
        Ok(Self { shard, realm, address: AccountAddress::Num(num), checksum })
    }

    /// The checksum for this id against `ledger_id`. Only defined for
    /// plain-numbered accounts.
    pub fn checksum_for(&self, ledger_id: &LedgerId) -> Option<String> {
        match self.address {
            AccountAddress::Num(num) => Some(checksum::compute(self.shard, self.realm, num, ledger_id)),
            _ => None,
        }
    }

    /// Canonical string form without a checksum.
    pub fn to_string_no_checksum(&self) -> String {
        match &self.address {
            AccountAddress::Num(num) => format!("{}.{}.{}", self.shard, self.realm, num),
            AccountAddress::Alias(der) => format!("{}.{}.{}", self.shard, self.realm, hex::encode(der)),
            AccountAddress::Evm(evm) => format!("{}.{}.0x{}", self.shard, self.realm, hex::encode(evm)),
        }
    }

    /// `shard.realm.num-checksum` against `ledger_id`. Fails if this id is
    /// not a plain-numbered account (spec: `CannotToStringWithChecksum`).
    pub fn to_string_with_checksum(
        &self,
        ledger_id: &LedgerId,
    ) -> Result<String, PrimitivesError> {
        match self.checksum_for(ledger_id) {
            Some(cs) => Ok(format!("{}-{}", self.to_string_no_checksum(), cs)),
            None => Err(PrimitivesError::CannotToStringWithChecksum),
        }
    }

    /// Wire-schema serialization: `shard‖realm‖tag‖payload`, where `tag`
    /// selects the address variant (`0` = num, `1` = alias, `2` = EVM) and
    /// `payload` is an 8-byte big-endian number, a length-prefixed DER blob,
    /// or 20 raw bytes respectively. Carries no checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        out.extend(self.shard.to_be_bytes());
        out.extend(self.realm.to_be_bytes());
        match &self.address {
            AccountAddress::Num(num) => {
                out.push(0);
                out.extend(num.to_be_bytes());
            }
            AccountAddress::Alias(der) => {
                out.push(1);
                out.extend((der.len() as u32).to_be_bytes());
                out.extend(der);
            }
            AccountAddress::Evm(evm) => {
                out.push(2);
                out.extend(evm);
            }
        }
        out
    }

    /// Parses the [`to_bytes`](Self::to_bytes) wire form.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 17 {
            return None;
        }
        let shard = u64::from_be_bytes(bytes[0..8].try_into().ok()?);
        let realm = u64::from_be_bytes(bytes[8..16].try_into().ok()?);
        let tag = bytes[16];
        let payload = &bytes[17..];
        let address = match tag {
            0 => AccountAddress::Num(u64::from_be_bytes(payload.try_into().ok()?)),
            1 => {
                let len = u32::from_be_bytes(payload.get(0..4)?.try_into().ok()?) as usize;
                AccountAddress::Alias(payload.get(4..4 + len)?.to_vec())
            }
            2 => AccountAddress::Evm(payload.try_into().ok()?),
            _ => return None,
        };
        Some(Self { shard, realm, address, checksum: None })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_no_checksum())
    }
}

impl PartialEq for AccountId {
    fn eq(&self, other: &Self) -> bool {
        (self.shard, self.realm, &self.address) == (other.shard, other.realm, &other.address)
    }
}
impl Eq for AccountId {}

impl std::hash::Hash for AccountId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.shard.hash(state);
        self.realm.hash(state);
        self.address.hash(state);
    }
}

/// Ordering used for node selection (spec §4.5: "sorted ascending by account-id").
impl PartialOrd for AccountId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for AccountId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.shard, self.realm, account_address_rank(&self.address))
            .cmp(&(other.shard, other.realm, account_address_rank(&other.address)))
    }
}

fn account_address_rank(addr: &AccountAddress) -> u64 {
    match addr {
        AccountAddress::Num(n) => *n,
        AccountAddress::Alias(_) | AccountAddress::Evm(_) => u64::MAX,
    }
}

/// The underlying address of a [`ContractId`]: a plain number or an EVM
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractAddress {
    /// A plain entity number.
    Num(u64),
    /// A 20-byte EVM address.
    Evm([u8; 20]),
}

/// A smart-contract instance on the ledger.
#[derive(Debug, Clone)]
pub struct ContractId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// The contract's address.
    pub address: ContractAddress,
    /// Checksum embedded in the string this id was parsed from, if any.
    pub checksum: Option<String>,
}

impl ContractId {
    /// Builds a plain-numbered contract id.
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, address: ContractAddress::Num(num), checksum: None }
    }

    /// Builds an EVM-address contract id.
    pub fn from_evm_address(shard: u64, realm: u64, evm: [u8; 20]) -> Self {
        Self { shard, realm, address: ContractAddress::Evm(evm), checksum: None }
    }

    /// Parses `num`, `shard.realm.num`, `shard.realm.num-checksum`, or
    /// `shard.realm.evmAddress`.
    pub fn from_str_checked(
        s: &str,
        ledger_id: Option<&LedgerId>,
    ) -> Result<Self, PrimitivesError> {
        let (shard, realm, tail) = split_shard_realm_tail(s)?;
        if let Some(evm) = parse_evm_address(tail) {
            return Ok(Self { shard, realm, address: ContractAddress::Evm(evm), checksum: None });
        }
        let (num_str, checksum) = split_checksum(tail);
        let num: u64 = num_str.parse().map_err(|_| bad(s, "bad contract number"))?;
        verify_checksum_if_present(shard, realm, num, &checksum, ledger_id)?;
        Ok(Self { shard, realm, address: ContractAddress::Num(num), checksum })
    }

    /// Canonical string form without a checksum.
    pub fn to_string_no_checksum(&self) -> String {
        match &self.address {
            ContractAddress::Num(num) => format!("{}.{}.{}", self.shard, self.realm, num),
            ContractAddress::Evm(evm) => format!("{}.{}.0x{}", self.shard, self.realm, hex::encode(evm)),
        }
    }

    /// Wire-schema serialization: `shard‖realm‖tag‖payload`, where `tag`
    /// selects the address variant (`0` = num, `1` = EVM) and `payload` is
    /// an 8-byte big-endian number or 20 raw bytes respectively. Carries no
    /// checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        out.extend(self.shard.to_be_bytes());
        out.extend(self.realm.to_be_bytes());
        match &self.address {
            ContractAddress::Num(num) => {
                out.push(0);
                out.extend(num.to_be_bytes());
            }
            ContractAddress::Evm(evm) => {
                out.push(1);
                out.extend(evm);
            }
        }
        out
    }

    /// Parses the [`to_bytes`](Self::to_bytes) wire form.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 17 {
            return None;
        }
        let shard = u64::from_be_bytes(bytes[0..8].try_into().ok()?);
        let realm = u64::from_be_bytes(bytes[8..16].try_into().ok()?);
        let tag = bytes[16];
        let payload = &bytes[17..];
        let address = match tag {
            0 => ContractAddress::Num(u64::from_be_bytes(payload.try_into().ok()?)),
            1 => ContractAddress::Evm(payload.try_into().ok()?),
            _ => return None,
        };
        Some(Self { shard, realm, address, checksum: None })
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_no_checksum())
    }
}

impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        (self.shard, self.realm, &self.address) == (other.shard, other.realm, &other.address)
    }
}
impl Eq for ContractId {}

impl std::hash::Hash for ContractId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.shard.hash(state);
        self.realm.hash(state);
        self.address.hash(state);
    }
}

/// A single non-fungible-token instance: a [`TokenId`] plus its serial
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NftId {
    /// The token type this NFT belongs to.
    pub token_id: TokenId,
    /// Serial number within that token type.
    pub serial: u64,
}

impl NftId {
    /// Builds a new NFT id.
    pub fn new(token_id: TokenId, serial: u64) -> Self {
        Self { token_id, serial }
    }

    /// Parses `tokenId@serial` or `tokenId/serial`.
    pub fn from_str_checked(
        s: &str,
        ledger_id: Option<&LedgerId>,
    ) -> Result<Self, PrimitivesError> {
        let (token_part, serial_part) = s
            .split_once('@')
            .or_else(|| s.rsplit_once('/'))
            .ok_or_else(|| bad(s, "expected `tokenId@serial` or `tokenId/serial`"))?;
        let token_id = TokenId::from_str_checked(token_part, ledger_id)?;
        let serial: u64 = serial_part.parse().map_err(|_| bad(s, "bad serial number"))?;
        Ok(Self { token_id, serial })
    }

    /// Wire-schema serialization: the token id's 24-byte form followed by
    /// the serial number as an 8-byte big-endian integer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.token_id.to_bytes();
        out.extend(self.serial.to_be_bytes());
        out
    }

    /// Parses the [`to_bytes`](Self::to_bytes) wire form.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 32 {
            return None;
        }
        let token_id = TokenId::from_bytes(&bytes[0..24])?;
        let serial = u64::from_be_bytes(bytes[24..32].try_into().ok()?);
        Some(Self { token_id, serial })
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.token_id, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_number_as_shard_zero_realm_zero() {
        let id = TokenId::from_str_checked("5", None).unwrap();
        assert_eq!((id.shard, id.realm, id.num), (0, 0, 5));
    }

    #[test]
    fn parses_full_triplet() {
        let id = TopicId::from_str_checked("1.2.3", None).unwrap();
        assert_eq!((id.shard, id.realm, id.num), (1, 2, 3));
    }

    #[test]
    fn display_round_trip_without_checksum() {
        let id = FileId::new(0, 0, 150);
        let rendered = id.to_string();
        let parsed = FileId::from_str_checked(&rendered, None).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn checksum_round_trip_against_active_ledger() {
        let ledger = LedgerId::mainnet();
        let id = ScheduleId::new(0, 0, 1126123);
        let rendered = id.to_string_with_checksum(&ledger);
        let parsed = ScheduleId::from_str_checked(&rendered, Some(&ledger)).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn mismatched_checksum_is_a_hard_error() {
        let ledger = LedgerId::mainnet();
        let id = ScheduleId::new(0, 0, 1126123);
        let mut rendered = id.to_string_with_checksum(&ledger);
        rendered.replace_range(rendered.len() - 5.., "zzzzz");
        let err = ScheduleId::from_str_checked(&rendered, Some(&ledger)).unwrap_err();
        assert!(matches!(err, PrimitivesError::ChecksumMismatch { .. }));
    }

    #[test]
    fn absent_checksum_is_accepted() {
        let ledger = LedgerId::mainnet();
        assert!(TopicId::from_str_checked("0.0.1", Some(&ledger)).is_ok());
    }

    #[test]
    fn account_id_evm_address_round_trip() {
        let evm = [0xAB; 20];
        let id = AccountId::from_evm_address(0, 0, evm);
        let rendered = id.to_string_no_checksum();
        let parsed = AccountId::from_str_checked(&rendered, None).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn account_id_alias_and_num_are_mutually_exclusive() {
        let num = AccountId::new(0, 0, 5);
        let alias = AccountId::from_alias_bytes(0, 0, vec![1, 2, 3]);
        assert_ne!(num, alias);
    }

    #[test]
    fn account_id_ordering_is_by_num_ascending() {
        let mut ids = vec![AccountId::new(0, 0, 3), AccountId::new(0, 0, 1), AccountId::new(0, 0, 2)];
        ids.sort();
        let nums: Vec<u64> = ids
            .iter()
            .map(|id| match id.address {
                AccountAddress::Num(n) => n,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn nft_id_parses_at_and_slash_forms() {
        let a = NftId::from_str_checked("0.0.314@5", None).unwrap();
        let b = NftId::from_str_checked("0.0.314/5", None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.serial, 5);
    }

    #[test]
    fn account_id_without_num_cannot_render_checksum() {
        let id = AccountId::from_evm_address(0, 0, [0; 20]);
        assert!(id.to_string_with_checksum(&LedgerId::mainnet()).is_err());
    }

    #[test]
    fn simple_entity_id_bytes_round_trip() {
        let id = TopicId::new(1, 2, 1126123);
        let bytes = id.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(TopicId::from_bytes(&bytes).unwrap(), id);
    }

    #[test]
    fn account_id_bytes_round_trip_num() {
        let id = AccountId::new(0, 0, 98);
        assert_eq!(AccountId::from_bytes(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn account_id_bytes_round_trip_alias() {
        let id = AccountId::from_alias_bytes(0, 0, vec![1, 2, 3, 4, 5]);
        assert_eq!(AccountId::from_bytes(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn account_id_bytes_round_trip_evm() {
        let id = AccountId::from_evm_address(0, 0, [0xAB; 20]);
        assert_eq!(AccountId::from_bytes(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn contract_id_bytes_round_trip() {
        let num = ContractId::new(0, 0, 42);
        assert_eq!(ContractId::from_bytes(&num.to_bytes()).unwrap(), num);
        let evm = ContractId::from_evm_address(0, 0, [0xCD; 20]);
        assert_eq!(ContractId::from_bytes(&evm.to_bytes()).unwrap(), evm);
    }

    #[test]
    fn nft_id_bytes_round_trip() {
        let id = NftId::new(TokenId::new(0, 0, 314), 5);
        assert_eq!(NftId::from_bytes(&id.to_bytes()).unwrap(), id);
    }
}
