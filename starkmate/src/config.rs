use std::{
    env::{self, VarError},
    fmt,
    str::FromStr,
};

use starknet::core::types::Felt;
use thiserror::Error;

pub const NETWORK_ENV: &str = "STARKNET_NETWORK";
pub const PRIVATE_KEY_ENV: &str = "STARKNET_PRIVATE_KEY";
pub const ACCOUNT_ADDRESS_ENV: &str = "STARKNET_ACCOUNT_ADDRESS";
pub const FAUCET_URL_ENV: &str = "STARKNET_FAUCET_URL";

pub const DEFAULT_FAUCET_URL: &str = "https://starknet-faucet.vercel.app/api/faucet";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("private key not found, set {PRIVATE_KEY_ENV}")]
    MissingPrivateKey,
    #[error("account address not found, set {ACCOUNT_ADDRESS_ENV}")]
    MissingAccountAddress,
    #[error("unsupported network: {0} (expected testnet or mainnet)")]
    UnknownNetwork(String),
    #[error("{name} is not a valid field element: {value}")]
    InvalidFelt { name: &'static str, value: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://starknet-sepolia.public.blastapi.io/rpc/v0_8",
            Network::Mainnet => "https://starknet-mainnet.public.blastapi.io/rpc/v0_8",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

/// Process configuration, read once at startup and handed to each command.
///
/// Values are kept raw; they are only validated by the command that needs
/// them, so `init` and `compile` never fail on a half-configured account.
#[derive(Default, Clone)]
pub struct Config {
    network: Option<String>,
    private_key: Option<String>,
    account_address: Option<String>,
    faucet_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("network", &self.network)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("account_address", &self.account_address)
            .field("faucet_url", &self.faucet_url)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentCredentials {
    pub network: Network,
    pub account_address: Felt,
    pub private_key: Felt,
}

impl fmt::Debug for DeploymentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentCredentials")
            .field("network", &self.network)
            .field("account_address", &self.account_address.to_hex_string())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env_value(key, env::var(key)))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            network: read(NETWORK_ENV),
            private_key: read(PRIVATE_KEY_ENV),
            account_address: read(ACCOUNT_ADDRESS_ENV),
            faucet_url: read(FAUCET_URL_ENV),
        }
    }

    /// Selected network, `testnet` when unset.
    pub fn network(&self) -> Result<Network, ConfigError> {
        match &self.network {
            Some(name) => name.parse(),
            None => Ok(Network::default()),
        }
    }

    pub fn credentials(&self) -> Result<DeploymentCredentials, ConfigError> {
        let private_key = self
            .private_key
            .as_deref()
            .ok_or(ConfigError::MissingPrivateKey)?;
        let account_address = self
            .account_address
            .as_deref()
            .ok_or(ConfigError::MissingAccountAddress)?;
        let network = self.network()?;

        Ok(DeploymentCredentials {
            network,
            account_address: parse_felt(ACCOUNT_ADDRESS_ENV, account_address)?,
            private_key: parse_felt(PRIVATE_KEY_ENV, private_key)?,
        })
    }

    pub fn faucet_url(&self) -> &str {
        self.faucet_url.as_deref().unwrap_or(DEFAULT_FAUCET_URL)
    }
}

/// A non-UTF-8 value is kept (lossily) rather than read as unset, so it fails
/// validation instead of being reported as missing.
fn env_value(key: &str, value: Result<String, VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(raw)) => {
            log::warn!("{key} is not valid unicode");
            Some(raw.to_string_lossy().into_owned())
        }
    }
}

fn parse_felt(name: &'static str, value: &str) -> Result<Felt, ConfigError> {
    let parsed = if value.starts_with("0x") {
        Felt::from_hex(value)
    } else {
        Felt::from_dec_str(value)
    };
    parsed.map_err(|_| ConfigError::InvalidFelt {
        name,
        // never echo the key itself
        value: if name == PRIVATE_KEY_ENV {
            "<redacted>".to_string()
        } else {
            value.to_string()
        },
    })
}
