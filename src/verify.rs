//! Pre-flight checks on a deposit record.
//!
//! The deposit contract only checks `deposit_data_root`, the BLS signature
//! is verified here before anything is signed.

use alloy::primitives::hex;
use colored::*;
use log::*;
use tree_hash::TreeHash;

use crate::{
    chain::ChainData,
    error::{DepositError, Result},
    helpers::depositdata::{compute_deposit_domain, compute_signing_root, verify_signature},
    loader::DepositRecord,
};

pub fn verify_deposit(record: &DepositRecord) -> Result<()> {
    let message_root = record.deposit_message().tree_hash_root();
    if message_root != record.deposit_message_root {
        return Err(DepositError::Data(format!(
            "deposit_message_root mismatch: computed {message_root}, file has {}",
            record.deposit_message_root
        )));
    }

    let data_root = record.deposit_data().tree_hash_root();
    if data_root != record.deposit_data_root {
        return Err(DepositError::Data(format!(
            "deposit_data_root mismatch: computed {data_root}, file has {}",
            record.deposit_data_root
        )));
    }

    let domain = compute_deposit_domain(record.fork_version);
    let signing_root = compute_signing_root(message_root, domain);
    if !verify_signature(&record.pubkey, &record.signature, &signing_root) {
        return Err(DepositError::Data(format!(
            "invalid deposit signature for {} (fork version {})",
            hex::encode(record.pubkey),
            hex::encode(record.fork_version)
        )));
    }

    debug!(
        "Deposit {} verified",
        hex::encode(record.pubkey).to_string().green()
    );
    Ok(())
}

/// Fails when the record was generated for a different network than
/// the one we are connected to, its signature would not be valid there
pub fn check_network(record: &DepositRecord, chain: &ChainData) -> Result<()> {
    if record.fork_version != chain.genesis_fork_version {
        return Err(DepositError::Data(format!(
            "deposit fork version {} does not match {} genesis fork version {}",
            hex::encode(record.fork_version),
            chain.name,
            hex::encode(chain.genesis_fork_version)
        )));
    }
    if !record.network_name.eq_ignore_ascii_case(chain.name) {
        return Err(DepositError::Data(format!(
            "deposit was generated for '{}' but connected to '{}'",
            record.network_name, chain.name
        )));
    }
    debug!("Deposit matches network {}", chain.name.green());
    Ok(())
}
