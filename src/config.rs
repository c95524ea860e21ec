use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs::File, io::BufReader};

use alloy::primitives::Address;
use eyre::{Result, WrapErr, bail};
use serde_derive::Deserialize;

use clap_serde_derive::{
    ClapSerde,
    clap::{self, Parser},
};

use crate::{
    deposit::{DEFAULT_GAS_LIMIT, DepositTxParams, GasStrategy},
    error::DepositError,
    loader::RecordSelector,
    pipeline::PipelineParams,
    signer::DEFAULT_KEY_ENV,
    submit::{DEFAULT_POLL_INTERVAL, PollConfig},
};

pub const DEFAULT_RPC_URL: &str = "https://ethereum-holesky.publicnode.com";
pub const DEFAULT_DEPOSIT_FILE: &str = "deposit_data.json";

#[allow(deprecated)]
fn config_file() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default()
        .join("eth-deposit")
        .join("config.toml")
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Config file
    #[arg(short, long = "config", default_value = config_file().into_os_string())]
    pub config_path: Option<PathBuf>,

    /// Deposit arguments
    #[command(flatten)]
    pub config: <CliArgs as ClapSerde>::Opt,
}

// Make sure all values are optional or parsing fails if a value
// is missing in the config fill
#[derive(Debug, Clone, ClapSerde, Deserialize)]
pub struct CliArgs {
    /// Logging level
    #[arg(short, long = "log-level", required = false, default_value = "3")]
    pub log_level: Option<u8>,

    /// JsonRPC URL
    #[arg(long = "rpc-url", required = false, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: Option<String>,

    /// Deposit data file generated by the staking deposit cli
    #[arg(short, long = "deposit-file", default_value = DEFAULT_DEPOSIT_FILE)]
    pub deposit_file: Option<String>,

    /// Deposit contract address
    #[arg(long = "deposit-contract", required = false)]
    pub deposit_contract: Option<String>,

    /// Record to submit when the file holds more than one deposit
    #[arg(short, long, required = false)]
    pub index: Option<usize>,

    /// TX gas limit
    #[arg(long = "gas-limit", required = false, default_value = "500000")]
    pub gas_limit: Option<u64>,

    /// Estimate the gas limit with the node instead of using --gas-limit
    #[arg(long = "estimate-gas", required = false, action = clap::ArgAction::SetTrue)]
    pub estimate_gas: bool,

    /// Seconds between receipt queries
    #[arg(long = "poll-interval", required = false, default_value = "3")]
    pub poll_interval: Option<u64>,

    /// Stop waiting for the receipt after this many seconds
    #[arg(short, long, required = false)]
    pub timeout: Option<u64>,

    /// Environment variable holding the sender private key
    #[arg(long = "key-env", required = false, default_value = DEFAULT_KEY_ENV)]
    pub key_env: Option<String>,

    /// Skip the local deposit root and signature checks
    #[arg(long = "skip-verify", required = false, action = clap::ArgAction::SetTrue)]
    pub skip_verify: bool,
}

impl CliArgs {
    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL)
    }

    pub fn key_env(&self) -> &str {
        self.key_env.as_deref().unwrap_or(DEFAULT_KEY_ENV)
    }

    /// Deposit file with `~` and env vars expanded
    pub fn deposit_file(&self) -> crate::error::Result<PathBuf> {
        let path = self.deposit_file.as_deref().unwrap_or(DEFAULT_DEPOSIT_FILE);
        let expanded = shellexpand::full(path)
            .map_err(|e| DepositError::Config(format!("deposit file {path}: {e}")))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// `None` unless set, the pipeline then uses the network's contract
    pub fn deposit_contract(&self) -> crate::error::Result<Option<Address>> {
        self.deposit_contract
            .as_deref()
            .map(|addr| {
                addr.parse()
                    .map_err(|e| DepositError::Config(format!("deposit contract {addr}: {e}")))
            })
            .transpose()
    }

    pub fn selector(&self) -> RecordSelector {
        match self.index {
            Some(index) => RecordSelector::Index(index),
            None => RecordSelector::Only,
        }
    }

    pub fn gas_strategy(&self) -> crate::error::Result<GasStrategy> {
        match (self.estimate_gas, self.gas_limit) {
            (true, _) => Ok(GasStrategy::Estimate),
            (false, Some(0)) => Err(DepositError::Config("gas limit must be positive".into())),
            (false, gas_limit) => Ok(GasStrategy::Fixed(gas_limit.unwrap_or(DEFAULT_GAS_LIMIT))),
        }
    }

    pub fn poll_config(&self) -> crate::error::Result<PollConfig> {
        let interval = match self.poll_interval {
            Some(0) => {
                return Err(DepositError::Config("poll interval must be positive".into()));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };
        Ok(PollConfig {
            interval,
            timeout: self.timeout.map(Duration::from_secs),
        })
    }

    pub fn pipeline_params(&self) -> crate::error::Result<PipelineParams> {
        Ok(PipelineParams {
            tx: DepositTxParams {
                deposit_contract: self.deposit_contract()?,
                gas: self.gas_strategy()?,
            },
            poll: self.poll_config()?,
            skip_verify: self.skip_verify,
        })
    }
}

pub fn merge_args_from_file<T>(
    args: <T as ClapSerde>::Opt,
    maybe_path: Option<PathBuf>,
) -> Result<T>
where
    T: ClapSerde + serde::de::DeserializeOwned,
{
    match maybe_path {
        Some(path) if path.exists() => {
            // Values present in the file replace the command line ones
            Ok(T::from(args).merge(read_config::<T>(&path)?))
        }
        _ => Ok(T::from(args)),
    }
}

fn read_config<T: ClapSerde>(path: &Path) -> Result<<T as ClapSerde>::Opt> {
    let context = || format!("{}", path.display());
    let config = match path.extension().and_then(OsStr::to_str) {
        Some("toml") => toml::from_str(&std::fs::read_to_string(path).wrap_err_with(context)?)
            .wrap_err_with(context)?,
        Some("json") => {
            serde_json::from_reader(BufReader::new(File::open(path).wrap_err_with(context)?))
                .wrap_err_with(context)?
        }
        Some("jsonc") => {
            serde_jsonc::from_reader(BufReader::new(File::open(path).wrap_err_with(context)?))
                .wrap_err_with(context)?
        }
        _ => bail!("Unsupported config file type: {:?}", path),
    };
    Ok(config)
}
