use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256, utils::Unit},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use colored::*;
use log::*;
use once_cell::sync::Lazy;

use crate::{
    error::Result,
    helpers,
    loader::DepositRecord,
    macros::parse_address,
    rpc::ChainClient,
};

/// Submitted value in ether, independent of the record's own `amount`
pub const DEPOSIT_AMOUNT_ETH: u64 = 32;

/// Safety margin for the deposit call, the contract uses ~60k gas
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

// Holesky deposit contract
pub static DEFAULT_DEPOSIT_CONTRACT: Lazy<Address> =
    Lazy::new(|| parse_address!("0x4242424242424242424242424242424242424242"));

// https://github.com/ethereum/consensus-specs/blob/dev/solidity_deposit_contract/deposit_contract.sol
alloy::sol! {
    #[derive(Debug, PartialEq)]
    interface IDepositContract {
        /// @notice Submit a Phase 0 DepositData object.
        function deposit(
            bytes calldata pubkey,
            bytes calldata withdrawal_credentials,
            bytes calldata signature,
            bytes32 deposit_data_root
        ) external payable;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasStrategy {
    /// Use this gas limit as is
    Fixed(u64),
    /// Ask the node with `eth_estimateGas`
    Estimate,
}

impl Default for GasStrategy {
    fn default() -> Self {
        GasStrategy::Fixed(DEFAULT_GAS_LIMIT)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DepositTxParams {
    /// Explicit contract, `None` uses the connected network's deposit
    /// contract or `DEFAULT_DEPOSIT_CONTRACT` on unknown chains
    pub deposit_contract: Option<Address>,
    pub gas: GasStrategy,
}

impl DepositTxParams {
    pub fn contract(&self) -> Address {
        self.deposit_contract.unwrap_or(*DEFAULT_DEPOSIT_CONTRACT)
    }
}

/// `DEPOSIT_AMOUNT_ETH` in wei
pub fn deposit_value() -> U256 {
    U256::from(DEPOSIT_AMOUNT_ETH) * Unit::ETHER.wei()
}

/// ABI encodes `deposit(pubkey, withdrawal_credentials, signature, deposit_data_root)`,
/// the root goes in as a static `bytes32` word
pub fn encode_deposit_call(record: &DepositRecord) -> Bytes {
    IDepositContract::depositCall {
        pubkey: record.pubkey.to_vec().into(),
        withdrawal_credentials: record.withdrawal_credentials.to_vec().into(),
        signature: record.signature.to_vec().into(),
        deposit_data_root: record.deposit_data_root,
    }
    .abi_encode()
    .into()
}

/// Builds the unsigned deposit transaction for `from`, nonce and gas
/// price are taken from the node at build time
pub async fn build_deposit_tx<C: ChainClient>(
    client: &C,
    record: &DepositRecord,
    from: Address,
    params: &DepositTxParams,
) -> Result<TransactionRequest> {
    let input = encode_deposit_call(record);
    let nonce = client.pending_nonce(from).await?;
    let gas_price = client.suggest_gas_price().await?;
    let value = deposit_value();

    let tx = TransactionRequest::default()
        .with_from(from)
        .with_to(params.contract())
        .with_nonce(nonce)
        .with_gas_price(gas_price)
        .with_value(value)
        .with_input(input);

    let gas_limit = match params.gas {
        GasStrategy::Fixed(gas_limit) => gas_limit,
        GasStrategy::Estimate => client.estimate_gas(&tx).await?,
    };
    debug!(
        "{} nonce:{} gas_price:{} gwei gas_limit:{} value:{} eth",
        "Deposit tx".white().bold(),
        nonce.to_string().blue(),
        helpers::format_gwei(&gas_price).blue(),
        gas_limit.to_string().magenta(),
        helpers::format_eth(&value).green(),
    );

    Ok(tx.with_gas_limit(gas_limit))
}
