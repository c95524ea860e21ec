//! One deposit, start to finish.
//!
//! `verify -> build -> sign -> broadcast -> poll -> (revert) diagnose`,
//! every step fallible and strictly sequential over a single client.

use alloy::primitives::hex;
use colored::*;
use log::*;
use std::future::Future;

use crate::{
    chain,
    deposit::{self, DepositTxParams},
    error::Result,
    loader::DepositRecord,
    rpc::ChainClient,
    signer::TransactionSigner,
    submit::{PollConfig, Submission, TransactionOutcome},
    verify,
};

#[derive(Debug, Clone, Default)]
pub struct PipelineParams {
    pub tx: DepositTxParams,
    pub poll: PollConfig,
    /// Skip the local root and signature checks
    pub skip_verify: bool,
}

pub async fn run<C, F>(
    client: &C,
    record: &DepositRecord,
    signer: &TransactionSigner,
    params: &PipelineParams,
    cancel: F,
) -> Result<TransactionOutcome>
where
    C: ChainClient,
    F: Future<Output = ()>,
{
    match params.skip_verify {
        true => warn!("Skipping deposit verification"),
        false => verify::verify_deposit(record)?,
    }

    let chain_id = client.chain_id().await?;
    let mut tx_params = params.tx.clone();
    match chain::chain_data(chain_id) {
        Some(chain) => {
            match (verify::check_network(record, chain), params.skip_verify) {
                (Err(e), false) => return Err(e),
                (Err(e), true) => warn!("{e}"),
                (Ok(()), _) => {}
            }
            match tx_params.deposit_contract {
                Some(contract) if contract != chain.deposit_contract => warn!(
                    "Deposit contract {} overrides the {} deposit contract {}",
                    contract.to_string().red(),
                    chain.name,
                    chain.deposit_contract
                ),
                Some(_) => {}
                None => tx_params.deposit_contract = Some(chain.deposit_contract),
            }
        }
        None => debug!("Unknown chain {chain_id}, skipping network checks"),
    }

    let from = signer.address();
    info!("Sending from address: {}", from.to_string().blue());
    info!(
        "Depositing {} ETH for validator {}",
        deposit::DEPOSIT_AMOUNT_ETH,
        hex::encode(record.pubkey).green()
    );

    let tx = deposit::build_deposit_tx(client, record, from, &tx_params).await?;
    let signed = signer.sign(&tx, chain_id).await?;

    let mut submission = Submission::new(client, signed);
    submission.broadcast().await?;
    submission.wait(&params.poll, cancel).await
}
