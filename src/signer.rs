use alloy::{
    consensus::{SignableTransaction, TxEnvelope},
    eips::eip2718::Decodable2718,
    network::{TransactionBuilder, TxSigner},
    primitives::{Address, Signature, TxHash},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use log::*;

use crate::error::{DepositError, Result};

/// Environment variable holding the hex encoded sender key
pub const DEFAULT_KEY_ENV: &str = "ETH_PRIVATE_KEY";

/// A transaction bound to one chain id, identified by its hash
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub chain_id: u64,
    pub from: Address,
    pub signature: Signature,
    pub envelope: TxEnvelope,
    /// The request that was signed, chain id included
    pub request: TransactionRequest,
}

pub struct TransactionSigner {
    signer: PrivateKeySigner,
}

impl TransactionSigner {
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| DepositError::Key(format!("invalid private key: {e}")))?;
        Ok(Self { signer })
    }

    pub fn from_env(var: &str) -> Result<Self> {
        let private_key = std::env::var(var)
            .map_err(|e| DepositError::Key(format!("${var}: {e}")))?;
        Self::from_hex(&private_key)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs `tx` for `chain_id` (EIP-155), the chain id is part of the
    /// signed payload so the result is only valid on that network
    pub async fn sign(&self, tx: &TransactionRequest, chain_id: u64) -> Result<SignedTransaction> {
        let from = self.address();
        match tx.from {
            Some(sender) if sender != from => {
                return Err(DepositError::Key(format!(
                    "transaction sender {sender} does not match signing key {from}"
                )));
            }
            _ => {}
        }

        let request = tx.clone().with_from(from).with_chain_id(chain_id);
        let mut tx_signable = request
            .clone()
            .build_unsigned()
            .map_err(|e| DepositError::Encoding(e.to_string()))?;
        let signature = self
            .signer
            .sign_transaction(&mut tx_signable)
            .await
            .map_err(|e| DepositError::Key(format!("signing failed: {e}")))?;
        let tx_signed = tx_signable.into_signed(signature);

        let mut buf: Vec<u8> = Vec::new();
        tx_signed.eip2718_encode(&mut buf);
        let envelope = TxEnvelope::decode_2718(&mut buf.as_ref())
            .map_err(|e| DepositError::Encoding(e.to_string()))?;
        let hash = *envelope.tx_hash();
        trace!("Signed {hash} for chain {chain_id}: {:?}", envelope);

        Ok(SignedTransaction {
            hash,
            chain_id,
            from,
            signature,
            envelope,
            request,
        })
    }
}
