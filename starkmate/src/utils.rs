use std::time::Duration;

use anyhow::{bail, Result};
use starknet::{
    core::types::{BlockId, BlockTag, ExecutionResult, Felt, StarknetError, TransactionStatus},
    providers::{Provider, ProviderError},
};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls the transaction status until the network accepts or rejects it.
/// Rejected and reverted transactions are errors.
pub async fn wait_transaction<P>(provider: &P, transaction_hash: Felt) -> Result<()>
where
    P: Provider + Sync,
{
    loop {
        match provider.get_transaction_status(transaction_hash).await {
            Ok(TransactionStatus::Rejected { .. }) => {
                bail!("transaction {} rejected by the network", hex(transaction_hash));
            }
            Ok(TransactionStatus::Received) => {
                log::debug!("transaction {} received, not accepted yet", hex(transaction_hash));
            }
            Ok(_) => break,
            Err(ProviderError::StarknetError(StarknetError::TransactionHashNotFound)) => {
                log::debug!("transaction {} not found yet", hex(transaction_hash));
            }
            Err(err) => return Err(err.into()),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let receipt = provider.get_transaction_receipt(transaction_hash).await?;
    if let ExecutionResult::Reverted { reason } = receipt.receipt.execution_result() {
        bail!("transaction {} reverted: {reason}", hex(transaction_hash));
    }
    Ok(())
}

/// Whether `class_hash` is already declared on the latest block.
pub async fn is_declared<P>(provider: &P, class_hash: Felt) -> Result<bool>
where
    P: Provider + Sync,
{
    match provider
        .get_class(BlockId::Tag(BlockTag::Latest), class_hash)
        .await
    {
        Ok(_) => Ok(true),
        Err(ProviderError::StarknetError(StarknetError::ClassHashNotFound)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub fn hex(felt: Felt) -> String {
    felt.to_fixed_hex_string()
}
