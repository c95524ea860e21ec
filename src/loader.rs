//! Deposit data file loading.
//!
//! Reads the `deposit_data-*.json` array produced by the staking deposit
//! cli and turns one entry into a fully length-checked [`DepositRecord`].

use alloy::primitives::{B256, FixedBytes, hex};
use log::*;
use serde_derive::Deserialize;
use std::path::Path;

use crate::{
    error::{DepositError, Result},
    helpers::depositdata::{DepositData, DepositMessage},
};

/// Which entry of the deposit data array is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSelector {
    /// The file must contain exactly one record
    #[default]
    Only,
    /// Zero based index into the array
    Index(usize),
}

/// Entry as found in the json file, every field except `amount` hex encoded
#[derive(Debug, Deserialize)]
struct RawDepositRecord {
    pubkey: String,
    withdrawal_credentials: String,
    amount: u64,
    signature: String,
    deposit_message_root: String,
    deposit_data_root: String,
    fork_version: String,
    network_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRecord {
    pub pubkey: FixedBytes<48>,
    pub withdrawal_credentials: B256,
    /// Informational only, the submitted value is always `DEPOSIT_AMOUNT_ETH`
    pub amount: u64,
    pub signature: FixedBytes<96>,
    pub deposit_message_root: B256,
    pub deposit_data_root: B256,
    pub fork_version: FixedBytes<4>,
    pub network_name: String,
}

impl DepositRecord {
    pub fn deposit_message(&self) -> DepositMessage {
        DepositMessage {
            pubkey: self.pubkey,
            withdrawal_credentials: self.withdrawal_credentials,
            amount: self.amount,
        }
    }

    pub fn deposit_data(&self) -> DepositData {
        DepositData {
            pubkey: self.pubkey,
            withdrawal_credentials: self.withdrawal_credentials,
            amount: self.amount,
            signature: self.signature,
        }
    }
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<FixedBytes<N>> {
    let bytes = hex::decode(value.trim())
        .map_err(|e| DepositError::Data(format!("{field}: invalid hex: {e}")))?;
    FixedBytes::<N>::try_from(bytes.as_slice()).map_err(|_| {
        DepositError::Data(format!(
            "{field}: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}

impl TryFrom<RawDepositRecord> for DepositRecord {
    type Error = DepositError;

    fn try_from(raw: RawDepositRecord) -> Result<Self> {
        Ok(DepositRecord {
            pubkey: decode_fixed("pubkey", &raw.pubkey)?,
            withdrawal_credentials: decode_fixed(
                "withdrawal_credentials",
                &raw.withdrawal_credentials,
            )?,
            amount: raw.amount,
            signature: decode_fixed("signature", &raw.signature)?,
            deposit_message_root: decode_fixed(
                "deposit_message_root",
                &raw.deposit_message_root,
            )?,
            deposit_data_root: decode_fixed("deposit_data_root", &raw.deposit_data_root)?,
            fork_version: decode_fixed("fork_version", &raw.fork_version)?,
            network_name: raw.network_name,
        })
    }
}

pub fn parse_deposit_data(json: &str, selector: RecordSelector) -> Result<DepositRecord> {
    let mut records = serde_json::from_str::<Vec<RawDepositRecord>>(json)?;
    let count = records.len();
    let index = match (selector, count) {
        (_, 0) => return Err(DepositError::Data("deposit data is empty".to_string())),
        (RecordSelector::Only, 1) => 0,
        (RecordSelector::Only, n) => {
            return Err(DepositError::Data(format!(
                "expected exactly one deposit record, found {n} (select one with --index)"
            )));
        }
        (RecordSelector::Index(i), n) if i < n => i,
        (RecordSelector::Index(i), n) => {
            return Err(DepositError::Data(format!(
                "record index {i} out of range, file contains {n} record(s)"
            )));
        }
    };
    trace!("Selected deposit record {}/{}", index + 1, count);
    DepositRecord::try_from(records.swap_remove(index))
        .map_err(|e| DepositError::Data(format!("record {index}: {e}")))
}

pub fn load_deposit_data(path: &Path, selector: RecordSelector) -> Result<DepositRecord> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| DepositError::Data(format!("{}: {e}", path.display())))?;
    let record = parse_deposit_data(&json, selector)?;
    debug!(
        "Loaded deposit for {} ({} gwei, network {})",
        hex::encode(record.pubkey),
        record.amount,
        record.network_name,
    );
    Ok(record)
}
