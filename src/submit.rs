use alloy::primitives::TxHash;
use colored::*;
use log::*;
use std::{future::Future, time::Duration};
use tokio::time::Instant;

use crate::{
    diagnostics::diagnose_revert,
    error::{DepositError, Result},
    rpc::{ChainClient, Receipt},
    signer::SignedTransaction,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between receipt queries
    pub interval: Duration,
    /// Give up after this long, `None` waits until the node answers
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Signed,
    Submitted,
    Confirmed,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    Reverted {
        tx_hash: TxHash,
        reason: String,
    },
    /// Still pending when the poll timeout expired
    TimedOut { tx_hash: TxHash, waited: Duration },
    /// Polling was interrupted, the transaction may still be mined
    Cancelled { tx_hash: TxHash },
}

enum Poll {
    Mined(Receipt),
    TimedOut(Duration),
    Cancelled,
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Drives one signed transaction through broadcast and confirmation
pub struct Submission<'a, C> {
    client: &'a C,
    tx: SignedTransaction,
    state: SubmissionState,
}

impl<'a, C: ChainClient> Submission<'a, C> {
    pub fn new(client: &'a C, tx: SignedTransaction) -> Self {
        Self {
            client,
            tx,
            state: SubmissionState::Signed,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx.hash
    }

    /// `Signed -> Submitted`, the transaction is sent at most once
    pub async fn broadcast(&mut self) -> Result<TxHash> {
        if self.state != SubmissionState::Signed {
            return Ok(self.tx.hash);
        }
        let tx_hash = self.client.broadcast(&self.tx).await?;
        if tx_hash != self.tx.hash {
            warn!(
                "Node reported hash {} for transaction {}",
                tx_hash, self.tx.hash
            );
        }
        self.state = SubmissionState::Submitted;
        info!("Transaction sent! Tx Hash: {}", self.tx.hash.to_string().red());
        Ok(self.tx.hash)
    }

    async fn poll<F>(&self, config: &PollConfig, cancel: F) -> Result<Poll>
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let deadline = config.timeout.map(|timeout| started + timeout);
        tokio::pin!(cancel);
        loop {
            // A node that never answers must not outlive the deadline
            let receipt = tokio::select! {
                biased;
                receipt = self.client.receipt(self.tx.hash) => receipt?,
                _ = &mut cancel => return Ok(Poll::Cancelled),
                _ = deadline_reached(deadline) => return Ok(Poll::TimedOut(started.elapsed())),
            };
            if let Some(receipt) = receipt {
                return Ok(Poll::Mined(receipt));
            }
            trace!(
                "{} not mined yet, next check in {:?}",
                self.tx.hash, config.interval
            );
            tokio::select! {
                _ = &mut cancel => return Ok(Poll::Cancelled),
                _ = deadline_reached(deadline) => return Ok(Poll::TimedOut(started.elapsed())),
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }

    /// Polls for the receipt until a terminal outcome, a reverted
    /// receipt is replayed to recover the reason. Waiting again on a
    /// mined transaction re-reads the receipt, it never resubmits
    pub async fn wait<F>(&mut self, config: &PollConfig, cancel: F) -> Result<TransactionOutcome>
    where
        F: Future<Output = ()>,
    {
        if self.state == SubmissionState::Signed {
            return Err(DepositError::Submission(format!(
                "transaction {} was never broadcast",
                self.tx.hash
            )));
        }
        let tx_hash = self.tx.hash;
        match self.poll(config, cancel).await? {
            Poll::Mined(receipt) if receipt.status => {
                self.state = SubmissionState::Confirmed;
                debug!(
                    "Transaction {} mined in block {:?} (gas used {})",
                    tx_hash, receipt.block_number, receipt.gas_used
                );
                Ok(TransactionOutcome::Confirmed {
                    tx_hash,
                    block_number: receipt.block_number,
                })
            }
            Poll::Mined(receipt) => {
                self.state = SubmissionState::Reverted;
                debug!(
                    "Transaction {} reverted in block {:?}",
                    tx_hash, receipt.block_number
                );
                let reason = diagnose_revert(self.client, tx_hash, self.tx.from).await;
                Ok(TransactionOutcome::Reverted { tx_hash, reason })
            }
            Poll::TimedOut(waited) => Ok(TransactionOutcome::TimedOut { tx_hash, waited }),
            Poll::Cancelled => Ok(TransactionOutcome::Cancelled { tx_hash }),
        }
    }
}
