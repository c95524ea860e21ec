//! Scripted node and fixtures shared by the unit tests.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, B256, Bytes, FixedBytes, TxHash, U256, address, hex},
    rpc::types::TransactionRequest,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};
use tree_hash::TreeHash;

use crate::{
    error::{DepositError, Result},
    helpers::depositdata::{BLS_DST, compute_deposit_domain, compute_signing_root},
    loader::DepositRecord,
    rpc::{ChainClient, Receipt},
    signer::{SignedTransaction, TransactionSigner},
};

/// First anvil/hardhat development key
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_KEY_ADDRESS: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A deposit signed with a throwaway BLS key over `fork_version`
pub fn signed_record(fork_version: [u8; 4]) -> DepositRecord {
    let sk = blst::min_pk::SecretKey::key_gen(&[7u8; 32], &[]).unwrap();
    let mut record = DepositRecord {
        pubkey: FixedBytes::from(sk.sk_to_pk().compress()),
        withdrawal_credentials: {
            let mut wc = [0u8; 32];
            wc[0] = 0x01;
            wc[12..].copy_from_slice(TEST_KEY_ADDRESS.as_slice());
            B256::from(wc)
        },
        amount: 32_000_000_000,
        signature: FixedBytes::ZERO,
        deposit_message_root: B256::ZERO,
        deposit_data_root: B256::ZERO,
        fork_version: fork_version.into(),
        network_name: match fork_version {
            [0x10, 0x00, 0x09, 0x10] => "hoodi",
            [0x00, 0x00, 0x00, 0x00] => "mainnet",
            _ => "holesky",
        }
        .to_string(),
    };
    record.deposit_message_root = record.deposit_message().tree_hash_root();
    let signing_root = compute_signing_root(
        record.deposit_message_root,
        compute_deposit_domain(record.fork_version),
    );
    record.signature =
        FixedBytes::from(sk.sign(signing_root.as_slice(), BLS_DST, &[]).compress());
    record.deposit_data_root = record.deposit_data().tree_hash_root();
    record
}

/// Serializes `record` the way the staking deposit cli does (unprefixed hex)
pub fn record_json(record: &DepositRecord) -> String {
    serde_json::json!({
        "pubkey": hex::encode(record.pubkey),
        "withdrawal_credentials": hex::encode(record.withdrawal_credentials),
        "amount": record.amount,
        "signature": hex::encode(record.signature),
        "deposit_message_root": hex::encode(record.deposit_message_root),
        "deposit_data_root": hex::encode(record.deposit_data_root),
        "fork_version": hex::encode(record.fork_version),
        "network_name": record.network_name,
        "deposit_cli_version": "2.7.0",
    })
    .to_string()
}

pub async fn signed_tx(chain_id: u64) -> SignedTransaction {
    let tx = TransactionRequest::default()
        .with_to(address!("0x4242424242424242424242424242424242424242"))
        .with_nonce(0)
        .with_gas_limit(500_000)
        .with_gas_price(1_000_000_000)
        .with_value(U256::from(1u64));
    TransactionSigner::from_hex(TEST_KEY)
        .unwrap()
        .sign(&tx, chain_id)
        .await
        .unwrap()
}

pub enum CallBehavior {
    Return(Bytes),
    Fail(String),
}

/// In-memory node: receipts are served from a script whose last entry
/// repeats forever, broadcasts are remembered so they can be replayed
pub struct StubClient {
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    estimate: u64,
    broadcast_error: Option<String>,
    receipt_error: Option<String>,
    unanswered_receipts: bool,
    receipts: Mutex<VecDeque<Option<bool>>>,
    call: CallBehavior,
    transactions: Mutex<HashMap<TxHash, TransactionRequest>>,
    broadcasts: Mutex<Vec<TxHash>>,
    nonce_queries: Mutex<Vec<Address>>,
    receipt_queries: Mutex<usize>,
    estimates: Mutex<usize>,
    calls: Mutex<Vec<TransactionRequest>>,
}

impl StubClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            nonce: 0,
            gas_price: 1_000_000_000,
            estimate: 60_000,
            broadcast_error: None,
            receipt_error: None,
            unanswered_receipts: false,
            receipts: Mutex::new(VecDeque::from([None])),
            call: CallBehavior::Return(Bytes::new()),
            transactions: Mutex::new(HashMap::new()),
            broadcasts: Mutex::new(Vec::new()),
            nonce_queries: Mutex::new(Vec::new()),
            receipt_queries: Mutex::new(0),
            estimates: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_estimate(mut self, estimate: u64) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_broadcast_error(mut self, msg: &str) -> Self {
        self.broadcast_error = Some(msg.to_string());
        self
    }

    pub fn with_receipt_error(mut self, msg: &str) -> Self {
        self.receipt_error = Some(msg.to_string());
        self
    }

    /// Receipt queries are accepted but never answered
    pub fn with_unanswered_receipts(mut self) -> Self {
        self.unanswered_receipts = true;
        self
    }

    /// `None` = not mined yet, `Some(status)` = mined
    pub fn with_receipts<I: IntoIterator<Item = Option<bool>>>(self, script: I) -> Self {
        *self.receipts.lock().unwrap() = script.into_iter().collect();
        self
    }

    pub fn with_call(mut self, call: CallBehavior) -> Self {
        self.call = call;
        self
    }

    pub fn with_transaction(self, tx_hash: TxHash, tx: TransactionRequest) -> Self {
        self.transactions.lock().unwrap().insert(tx_hash, tx);
        self
    }

    pub fn broadcasts(&self) -> usize {
        self.broadcasts.lock().unwrap().len()
    }

    pub fn receipt_queries(&self) -> usize {
        *self.receipt_queries.lock().unwrap()
    }

    pub fn nonce_queries(&self) -> Vec<Address> {
        self.nonce_queries.lock().unwrap().clone()
    }

    pub fn estimates(&self) -> usize {
        *self.estimates.lock().unwrap()
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Request behind a broadcast (or preloaded) transaction
    pub fn broadcast_request(&self, tx_hash: TxHash) -> Option<TransactionRequest> {
        self.transactions.lock().unwrap().get(&tx_hash).cloned()
    }

    pub fn last_call(&self) -> Option<TransactionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl ChainClient for StubClient {
    async fn pending_nonce(&self, address: Address) -> Result<u64> {
        self.nonce_queries.lock().unwrap().push(address);
        Ok(self.nonce)
    }

    async fn suggest_gas_price(&self) -> Result<u128> {
        Ok(self.gas_price)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64> {
        *self.estimates.lock().unwrap() += 1;
        Ok(self.estimate)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash> {
        if let Some(msg) = &self.broadcast_error {
            return Err(DepositError::Submission(msg.clone()));
        }
        self.broadcasts.lock().unwrap().push(tx.hash);
        self.transactions
            .lock()
            .unwrap()
            .insert(tx.hash, tx.request.clone());
        Ok(tx.hash)
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        *self.receipt_queries.lock().unwrap() += 1;
        if self.unanswered_receipts {
            std::future::pending::<()>().await;
        }
        if let Some(msg) = &self.receipt_error {
            return Err(DepositError::Query(msg.clone()));
        }
        let mut script = self.receipts.lock().unwrap();
        let next = match script.len() {
            0 | 1 => script.front().copied().flatten(),
            _ => script.pop_front().flatten(),
        };
        Ok(next.map(|status| Receipt {
            tx_hash,
            status,
            block_number: Some(1),
            gas_used: 54_000,
        }))
    }

    async fn transaction_by_hash(&self, tx_hash: TxHash) -> Result<Option<TransactionRequest>> {
        Ok(self.transactions.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.calls.lock().unwrap().push(tx.clone());
        match &self.call {
            CallBehavior::Return(data) => Ok(data.clone()),
            CallBehavior::Fail(msg) => Err(DepositError::Query(msg.clone())),
        }
    }
}
