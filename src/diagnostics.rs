//! Revert reason recovery.
//!
//! A reverted receipt carries no reason, so the original transaction is
//! fetched and replayed with `eth_call` against the latest state.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash, hex},
    sol_types::decode_revert_reason,
};
use log::*;

use crate::{
    error::{DepositError, Result},
    rpc::ChainClient,
};

pub const NO_REVERT_REASON: &str = "transaction failed without a revert reason";

/// Human readable form of a revert payload: `Error(string)` and
/// `Panic(uint256)` are decoded, anything else is shown as hex
pub fn describe_revert_data(data: &[u8]) -> String {
    match decode_revert_reason(data) {
        Some(reason) if !reason.trim().is_empty() => reason,
        _ => format!("0x{}", hex::encode(data)),
    }
}

async fn replay<C: ChainClient>(client: &C, tx_hash: TxHash, from: Address) -> Result<Bytes> {
    let request = client
        .transaction_by_hash(tx_hash)
        .await
        .map_err(|e| DepositError::RevertDiagnosis(format!("failed to fetch transaction: {e}")))?
        .ok_or_else(|| DepositError::RevertDiagnosis(format!("transaction {tx_hash} not found")))?
        .with_from(from);
    trace!("Replaying {tx_hash}: {:?}", request);
    client
        .call(&request)
        .await
        .map_err(|e| DepositError::RevertDiagnosis(e.to_string()))
}

/// Always yields a non-empty explanation, failures of the replay itself
/// are folded into the message
pub async fn diagnose_revert<C: ChainClient>(client: &C, tx_hash: TxHash, from: Address) -> String {
    match replay(client, tx_hash, from).await {
        Ok(data) if data.is_empty() => NO_REVERT_REASON.to_string(),
        Ok(data) => format!("revert reason: {}", describe_revert_data(&data)),
        Err(e) => {
            warn!("Revert diagnosis for {tx_hash} failed: {e}");
            format!("failed to fetch revert reason: {e}")
        }
    }
}
