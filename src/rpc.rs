use alloy::{
    consensus::Transaction as _,
    eips::eip2718::Encodable2718,
    network::{ReceiptResponse as _, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportErrorKind},
};
use colored::*;
use log::*;
use std::future::Future;

use crate::{
    chain,
    diagnostics::describe_revert_data,
    error::{DepositError, Result},
    signer::SignedTransaction,
};

/// What the pipeline needs to know about a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// true on success, false when execution reverted
    pub status: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            status: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Node access used by the deposit pipeline
pub trait ChainClient {
    /// Next usable nonce, pending transactions included
    fn pending_nonce(&self, address: Address) -> impl Future<Output = Result<u64>> + Send;

    fn suggest_gas_price(&self) -> impl Future<Output = Result<u128>> + Send;

    fn chain_id(&self) -> impl Future<Output = Result<u64>> + Send;

    fn estimate_gas(&self, tx: &TransactionRequest) -> impl Future<Output = Result<u64>> + Send;

    /// Submit the raw signed bytes, a rejection is never retried
    fn broadcast(&self, tx: &SignedTransaction) -> impl Future<Output = Result<TxHash>> + Send;

    /// `None` while the transaction is not mined yet
    fn receipt(&self, tx_hash: TxHash) -> impl Future<Output = Result<Option<Receipt>>> + Send;

    /// Call parameters (from, to, gas, gasPrice, value, data) of a known transaction
    fn transaction_by_hash(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TransactionRequest>>> + Send;

    /// `eth_call` against the latest state, nothing is committed
    fn call(&self, tx: &TransactionRequest) -> impl Future<Output = Result<Bytes>> + Send;
}

pub struct Client {
    /// Probed once while dialing
    chain_id: u64,
    provider: DynProvider,
}

fn query_err(what: &str, e: RpcError<TransportErrorKind>) -> DepositError {
    DepositError::Query(format!("{what} failed: {e}"))
}

impl Client {
    /// Connects to `url` and probes the node with `eth_chainId`, the
    /// connection is released when the returned client is dropped
    pub async fn dial(url: &str) -> Result<Client> {
        if url.trim().is_empty() {
            return Err(DepositError::Connection("empty endpoint url".to_string()));
        }
        let rpc_url = url::Url::parse(url.trim())
            .map_err(|e| DepositError::Connection(format!("invalid url '{url}': {e}")))?;

        let provider = DynProvider::new(
            ProviderBuilder::new()
                .connect(rpc_url.as_str())
                .await
                .map_err(|e| DepositError::Connection(format!("connect failed to '{url}': {e}")))?,
        );

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| DepositError::Connection(format!("'{url}' unreachable: {e}")))?;

        debug!(
            "Connected to {} {}:{}",
            chain::chain_data(chain_id)
                .map(|c| c.name)
                .unwrap_or("unknown")
                .green()
                .bold(),
            "chainId".white().bold(),
            format!("{:?}", chain_id).blue(),
        );

        Ok(Client { chain_id, provider })
    }
}

impl ChainClient for Client {
    async fn pending_nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| query_err("eth_getTransactionCount", e))
    }

    async fn suggest_gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| query_err("eth_gasPrice", e))
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| query_err("eth_estimateGas", e))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash> {
        let raw = tx.envelope.encoded_2718();
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| DepositError::Submission(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        Ok(self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| query_err("eth_getTransactionReceipt", e))?
            .map(Receipt::from))
    }

    async fn transaction_by_hash(&self, tx_hash: TxHash) -> Result<Option<TransactionRequest>> {
        let Some(tx) = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(|e| query_err("eth_getTransactionByHash", e))?
        else {
            return Ok(None);
        };
        let (envelope, from) = tx.inner.into_parts();
        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_gas_limit(envelope.gas_limit())
            .with_value(envelope.value())
            .with_input(envelope.input().clone());
        if let Some(to) = envelope.to() {
            request = request.with_to(to);
        }
        if let Some(gas_price) = envelope.gas_price() {
            request = request.with_gas_price(gas_price);
        }
        Ok(Some(request))
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.provider.call(tx.clone()).await.map_err(|e| {
            // Nodes return the revert payload inside the error response
            let revert_data = e
                .as_error_resp()
                .and_then(|payload| payload.as_revert_data());
            match revert_data {
                Some(data) if !data.is_empty() => DepositError::Query(format!(
                    "eth_call failed: {e} ({})",
                    describe_revert_data(&data)
                )),
                _ => query_err("eth_call", e),
            }
        })
    }
}
