#[macro_use]
extern crate log;

use clap::Parser;
use colored::*;
use eyre::{Result, WrapErr, bail};

use eth_deposit::{
    config::{self, *},
    loader,
    logger::{DEFAULT_LOG_LEVEL, Logger},
    pipeline,
    rpc::Client,
    signer::TransactionSigner,
    submit::TransactionOutcome,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args with clap
    let args = Cli::parse();

    // Setup our global logger, the level is adjusted once the config is read
    let logger = Logger::new(DEFAULT_LOG_LEVEL);
    logger.set_global()?;

    // Merge the config file on top of the command line
    let config = config::merge_args_from_file::<CliArgs>(args.config, args.config_path)?;
    logger.set_log_level(config.log_level.unwrap_or(DEFAULT_LOG_LEVEL));

    let params = config.pipeline_params()?;
    let deposit_file = config.deposit_file()?;
    let record = loader::load_deposit_data(&deposit_file, config.selector())
        .wrap_err_with(|| format!("{}", deposit_file.display()))?;

    let signer = TransactionSigner::from_env(config.key_env())?;
    let client = Client::dial(config.rpc_url())
        .await
        .wrap_err_with(|| format!("--rpc-url '{}'", config.rpc_url()))?;

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler, poll until the node answers
            std::future::pending::<()>().await
        }
    };

    match pipeline::run(&client, &record, &signer, &params, cancel).await? {
        TransactionOutcome::Confirmed {
            tx_hash,
            block_number,
        } => {
            info!(
                "{} {} (block {})",
                "Transaction successful:".green(),
                tx_hash,
                block_number.map_or("unknown".to_string(), |b| b.to_string())
            );
        }
        TransactionOutcome::Reverted { tx_hash, reason } => {
            error!("Transaction {} failed, {}", tx_hash.to_string().red(), reason);
        }
        TransactionOutcome::TimedOut { tx_hash, waited } => {
            bail!("Transaction {tx_hash} not mined after {waited:?}, it may still be included");
        }
        TransactionOutcome::Cancelled { tx_hash } => {
            bail!("Interrupted while waiting for {tx_hash}, it may still be included");
        }
    }

    Ok(())
}
