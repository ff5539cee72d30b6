use std::{fmt, sync::Arc};

use anyhow::{anyhow, Context, Result};
use starknet::{
    accounts::{Account, ConnectedAccount, ExecutionEncoding, SingleOwnerAccount},
    contract::ContractFactory,
    core::types::{BlockId, BlockTag, Felt},
    providers::{jsonrpc::HttpTransport, JsonRpcClient, Provider, Url},
    signers::{LocalWallet, SigningKey},
};

use crate::{
    config::{Config, DeploymentCredentials, Network},
    contracts::{load_artifacts, ArtifactPaths, Artifacts},
    utils::{hex, is_declared, wait_transaction},
};

type RpcAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: Felt,
    pub class_hash: Felt,
    /// `None` when the class was already declared.
    pub declare_transaction_hash: Option<Felt>,
    pub deploy_transaction_hash: Felt,
    pub abi_loaded: bool,
}

impl fmt::Display for DeploymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "contract deployed at: {}", hex(self.contract_address))?;
        if let Some(hash) = self.declare_transaction_hash {
            writeln!(f, "declare tx hash: {}", hex(hash))?;
        }
        writeln!(f, "deploy tx hash: {}", hex(self.deploy_transaction_hash))?;
        writeln!(f, "class hash: {}", hex(self.class_hash))?;
        write!(f, "ABI loaded: {}", self.abi_loaded)
    }
}

pub struct Deploy {
    account: Arc<RpcAccount>,
    network: Network,
}

impl Deploy {
    pub async fn new(credentials: &DeploymentCredentials) -> Result<Self> {
        Self::connect(credentials.network.rpc_url(), credentials).await
    }

    /// Like [`Deploy::new`] against an explicit endpoint.
    pub async fn connect(rpc_url: &str, credentials: &DeploymentCredentials) -> Result<Self> {
        let network = credentials.network;
        let url = Url::parse(rpc_url)?;
        let provider = JsonRpcClient::new(HttpTransport::new(url));
        let chain_id = provider
            .chain_id()
            .await
            .with_context(|| format!("cannot reach {network} at {rpc_url}"))?;

        let signer = LocalWallet::from(SigningKey::from_secret_scalar(credentials.private_key));
        let mut account = SingleOwnerAccount::new(
            provider,
            signer,
            credentials.account_address,
            chain_id,
            ExecutionEncoding::New,
        );
        account.set_block_id(BlockId::Tag(BlockTag::Pending));

        Ok(Self {
            account: Arc::new(account),
            network,
        })
    }

    pub async fn run(&self, artifacts: Artifacts) -> Result<DeploymentResult> {
        let Artifacts { sierra, casm } = artifacts;
        let class_hash = sierra.class_hash()?;
        let compiled_class_hash = casm.class_hash()?;
        let abi_loaded = !sierra.abi.is_empty();

        let declare_transaction_hash = if is_declared(self.account.provider(), class_hash).await? {
            log::info!("class {} already declared, skipping declare", hex(class_hash));
            None
        } else {
            let flattened = sierra.flatten()?;
            let declared = self
                .account
                .declare_v3(Arc::new(flattened), compiled_class_hash)
                .send()
                .await
                .map_err(|err| anyhow!("declare rejected: {err}"))?;
            log::info!("declare transaction hash:{}", hex(declared.transaction_hash));
            wait_transaction(self.account.provider(), declared.transaction_hash).await?;
            Some(declared.transaction_hash)
        };

        let (contract_address, deploy_transaction_hash) = self.deploy_contract(class_hash).await?;

        Ok(DeploymentResult {
            contract_address,
            class_hash,
            declare_transaction_hash,
            deploy_transaction_hash,
            abi_loaded,
        })
    }

    async fn deploy_contract(&self, class_hash: Felt) -> Result<(Felt, Felt)> {
        let factory = ContractFactory::new(class_hash, self.account.clone());
        let salt = SigningKey::from_random().secret_scalar();
        let deployment = factory.deploy_v3(Vec::new(), salt, true);
        let contract_address = deployment.deployed_address();

        let deployed = deployment
            .send()
            .await
            .map_err(|err| anyhow!("deploy rejected: {err}"))?;
        log::info!("deploy transaction hash:{}", hex(deployed.transaction_hash));
        wait_transaction(self.account.provider(), deployed.transaction_hash).await?;

        Ok((contract_address, deployed.transaction_hash))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> Felt {
        self.account.address()
    }
}

/// Validates configuration and loads both artifacts before any connection
/// is made, then declares and deploys.
pub async fn deploy_contract(config: &Config, paths: &ArtifactPaths) -> Result<DeploymentResult> {
    let credentials = config.credentials()?;
    let artifacts = load_artifacts(paths)?;

    let deploy = Deploy::new(&credentials).await?;
    println!(
        "connected to {} with account: {}",
        deploy.network(),
        hex(deploy.address())
    );

    let result = deploy.run(artifacts).await?;
    println!("{result}");
    Ok(result)
}
