//! Ethereum-style transaction encoding and decoding: legacy (type-0,
//! unprefixed, no access list) and EIP-1559 (type-2, `0x02` prefix byte,
//! chain-id and access-list fields present).

use crate::error::EthereumTxError;
use crate::rlp::RlpItem;

/// One entry of an EIP-2930/EIP-1559 access list: an address plus the
/// storage keys touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessListEntry {
    pub address: [u8; 20],
    pub storage_keys: Vec<[u8; 32]>,
}

/// A decoded Ethereum transaction, legacy or EIP-1559.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthereumTransaction {
    Legacy {
        nonce: u64,
        gas_price: Vec<u8>,
        gas_limit: u64,
        to: Option<[u8; 20]>,
        value: Vec<u8>,
        data: Vec<u8>,
        v: Vec<u8>,
        r: Vec<u8>,
        s: Vec<u8>,
    },
    Eip1559 {
        chain_id: u64,
        nonce: u64,
        max_priority_fee_per_gas: Vec<u8>,
        max_fee_per_gas: Vec<u8>,
        gas_limit: u64,
        to: Option<[u8; 20]>,
        value: Vec<u8>,
        data: Vec<u8>,
        access_list: Vec<AccessListEntry>,
        signature_y_parity: bool,
        r: Vec<u8>,
        s: Vec<u8>,
    },
}

fn to_field(to: &Option<[u8; 20]>) -> RlpItem {
    match to {
        Some(addr) => RlpItem::String(addr.to_vec()),
        None => RlpItem::String(Vec::new()),
    }
}

fn decode_to(item: &RlpItem) -> Result<Option<[u8; 20]>, EthereumTxError> {
    let bytes = item.as_bytes()?;
    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() != 20 {
        return Err(EthereumTxError::MalformedField("to"));
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(bytes);
    Ok(Some(addr))
}

fn access_list_to_item(list: &[AccessListEntry]) -> RlpItem {
    RlpItem::List(
        list.iter()
            .map(|entry| {
                RlpItem::List(vec![
                    RlpItem::String(entry.address.to_vec()),
                    RlpItem::List(entry.storage_keys.iter().map(|k| RlpItem::String(k.to_vec())).collect()),
                ])
            })
            .collect(),
    )
}

fn item_to_access_list(item: &RlpItem) -> Result<Vec<AccessListEntry>, EthereumTxError> {
    item.as_list()?
        .iter()
        .map(|entry_item| {
            let fields = entry_item.as_list()?;
            if fields.len() != 2 {
                return Err(EthereumTxError::WrongFieldCount { expected: 2, actual: fields.len() });
            }
            let addr_bytes = fields[0].as_bytes()?;
            if addr_bytes.len() != 20 {
                return Err(EthereumTxError::MalformedField("access_list.address"));
            }
            let mut address = [0u8; 20];
            address.copy_from_slice(addr_bytes);
            let storage_keys = fields[1]
                .as_list()?
                .iter()
                .map(|key_item| {
                    let key_bytes = key_item.as_bytes()?;
                    if key_bytes.len() != 32 {
                        return Err(EthereumTxError::MalformedField("access_list.storage_key"));
                    }
                    let mut key = [0u8; 32];
                    key.copy_from_slice(key_bytes);
                    Ok(key)
                })
                .collect::<Result<Vec<_>, EthereumTxError>>()?;
            Ok(AccessListEntry { address, storage_keys })
        })
        .collect()
}

impl EthereumTransaction {
    /// Encodes this transaction to its wire form: the legacy shape is a
    /// bare RLP list, the EIP-1559 shape is `0x02` followed by an RLP list.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            EthereumTransaction::Legacy { nonce, gas_price, gas_limit, to, value, data, v, r, s } => {
                RlpItem::List(vec![
                    RlpItem::from_u64(*nonce),
                    RlpItem::from_be_bytes(gas_price),
                    RlpItem::from_u64(*gas_limit),
                    to_field(to),
                    RlpItem::from_be_bytes(value),
                    RlpItem::String(data.clone()),
                    RlpItem::from_be_bytes(v),
                    RlpItem::from_be_bytes(r),
                    RlpItem::from_be_bytes(s),
                ])
                .encode()
            }
            EthereumTransaction::Eip1559 {
                chain_id,
                nonce,
                max_priority_fee_per_gas,
                max_fee_per_gas,
                gas_limit,
                to,
                value,
                data,
                access_list,
                signature_y_parity,
                r,
                s,
            } => {
                let mut out = vec![0x02u8];
                out.extend(
                    RlpItem::List(vec![
                        RlpItem::from_u64(*chain_id),
                        RlpItem::from_u64(*nonce),
                        RlpItem::from_be_bytes(max_priority_fee_per_gas),
                        RlpItem::from_be_bytes(max_fee_per_gas),
                        RlpItem::from_u64(*gas_limit),
                        to_field(to),
                        RlpItem::from_be_bytes(value),
                        RlpItem::String(data.clone()),
                        access_list_to_item(access_list),
                        RlpItem::from_u64(*signature_y_parity as u64),
                        RlpItem::from_be_bytes(r),
                        RlpItem::from_be_bytes(s),
                    ])
                    .encode(),
                );
                out
            }
        }
    }

    /// Decodes a transaction, dispatching on the leading type byte (absent
    /// for legacy, `0x02` for EIP-1559).
    pub fn decode(input: &[u8]) -> Result<Self, EthereumTxError> {
        let &first = input.first().ok_or(EthereumTxError::Rlp(crate::error::RlpError::Truncated {
            expected: 1,
            available: 0,
        }))?;
        if first == 0x02 {
            Self::decode_eip1559(&input[1..])
        } else if (0xc0..=0xff).contains(&first) {
            Self::decode_legacy(input)
        } else {
            Err(EthereumTxError::UnknownTxType(first))
        }
    }

    fn decode_legacy(input: &[u8]) -> Result<Self, EthereumTxError> {
        let item = RlpItem::decode(input)?;
        let fields = item.as_list()?;
        if fields.len() != 9 {
            return Err(EthereumTxError::WrongFieldCount { expected: 9, actual: fields.len() });
        }
        Ok(EthereumTransaction::Legacy {
            nonce: fields[0].as_u64()?,
            gas_price: fields[1].as_bytes()?.to_vec(),
            gas_limit: fields[2].as_u64()?,
            to: decode_to(&fields[3])?,
            value: fields[4].as_bytes()?.to_vec(),
            data: fields[5].as_bytes()?.to_vec(),
            v: fields[6].as_bytes()?.to_vec(),
            r: fields[7].as_bytes()?.to_vec(),
            s: fields[8].as_bytes()?.to_vec(),
        })
    }

    fn decode_eip1559(input: &[u8]) -> Result<Self, EthereumTxError> {
        let item = RlpItem::decode(input)?;
        let fields = item.as_list()?;
        if fields.len() != 12 {
            return Err(EthereumTxError::WrongFieldCount { expected: 12, actual: fields.len() });
        }
        Ok(EthereumTransaction::Eip1559 {
            chain_id: fields[0].as_u64()?,
            nonce: fields[1].as_u64()?,
            max_priority_fee_per_gas: fields[2].as_bytes()?.to_vec(),
            max_fee_per_gas: fields[3].as_bytes()?.to_vec(),
            gas_limit: fields[4].as_u64()?,
            to: decode_to(&fields[5])?,
            value: fields[6].as_bytes()?.to_vec(),
            data: fields[7].as_bytes()?.to_vec(),
            access_list: item_to_access_list(&fields[8])?,
            signature_y_parity: fields[9].as_u64()? != 0,
            r: fields[10].as_bytes()?.to_vec(),
            s: fields[11].as_bytes()?.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_legacy() -> EthereumTransaction {
        EthereumTransaction::Legacy {
            nonce: 9,
            gas_price: vec![0x4a, 0x81, 0x7c, 0x80],
            gas_limit: 21000,
            to: Some([0x35u8; 20]),
            value: vec![0x0d, 0xe0, 0xb6, 0xb3, 0xa7, 0x64, 0x00, 0x00],
            data: Vec::new(),
            v: vec![0x25],
            r: vec![0x11; 32],
            s: vec![0x22; 32],
        }
    }

    fn sample_eip1559() -> EthereumTransaction {
        EthereumTransaction::Eip1559 {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: vec![0x3b, 0x9a, 0xca, 0x00],
            max_fee_per_gas: vec![0x77, 0x35, 0x94, 0x00],
            gas_limit: 21000,
            to: Some([0xab; 20]),
            value: vec![],
            data: vec![],
            access_list: vec![],
            signature_y_parity: true,
            r: vec![0x33; 32],
            s: vec![0x44; 32],
        }
    }

    #[test]
    fn legacy_round_trips() {
        let tx = sample_legacy();
        let encoded = tx.encode();
        assert_eq!(EthereumTransaction::decode(&encoded).unwrap(), tx);
    }

    #[test]
    fn eip1559_round_trips() {
        let tx = sample_eip1559();
        let encoded = tx.encode();
        assert_eq!(encoded[0], 0x02);
        assert_eq!(EthereumTransaction::decode(&encoded).unwrap(), tx);
    }

    #[test]
    fn eip1559_with_access_list_round_trips() {
        let mut tx = sample_eip1559();
        if let EthereumTransaction::Eip1559 { access_list, .. } = &mut tx {
            *access_list = vec![AccessListEntry { address: [0x01; 20], storage_keys: vec![[0x02; 32], [0x03; 32]] }];
        }
        let encoded = tx.encode();
        assert_eq!(EthereumTransaction::decode(&encoded).unwrap(), tx);
    }

    #[test]
    fn contract_creation_has_no_to() {
        let mut tx = sample_legacy();
        if let EthereumTransaction::Legacy { to, .. } = &mut tx {
            *to = None;
        }
        let encoded = tx.encode();
        assert_eq!(EthereumTransaction::decode(&encoded).unwrap(), tx);
    }

    #[test]
    fn rejects_unknown_type_byte() {
        let err = EthereumTransaction::decode(&[0x01, 0xc0]).unwrap_err();
        assert!(matches!(err, EthereumTxError::UnknownTxType(0x01)));
    }
}
