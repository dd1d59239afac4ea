//! Settings of the command line client

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use candy_mint::{Address, Commitment, SessionConfig};
use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File, Source};
use serde::{Deserialize, Serialize};
use url::Url;

/// Prefix of environment overrides, e.g. `CANDY_MINT_RPC_URL`
pub const ENV_PREFIX: &str = "CANDY_MINT";

const DEFAULT_WORK_DIR: &str = ".candy-mint";

/// Ledger cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Development cluster
    #[default]
    Devnet,
    /// Test cluster
    Testnet,
    /// Main cluster
    MainnetBeta,
    /// Local validator
    Localnet,
}

impl Network {
    /// Public RPC endpoint of the cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Localnet => "http://127.0.0.1:8899",
        }
    }
}

/// Where the session reads and submits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON-RPC node, watch-only wallet
    #[default]
    Rpc,
    /// In-memory ledger seeded with a sample drop
    Fake,
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Node url, defaults to the public endpoint of `network`
    pub rpc_url: Option<String>,
    /// Cluster
    pub network: Network,
    /// Candy machine account
    pub program_id: String,
    /// Wallet address
    pub wallet: Option<String>,
    /// Commitment of reads and confirmations
    pub commitment: Commitment,
    /// Confirmation deadline
    pub tx_timeout_ms: u64,
    /// Background refresh interval
    pub refresh_interval_secs: u64,
    /// Backend
    pub backend: Backend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            network: Network::default(),
            program_id: String::new(),
            wallet: None,
            commitment: Commitment::default(),
            tx_timeout_ms: 30_000,
            refresh_interval_secs: 20,
            backend: Backend::default(),
        }
    }
}

impl Settings {
    /// Load defaults, then the config file, then `CANDY_MINT_*` variables.
    ///
    /// Without `config_file` the default file in the home directory is used
    /// if it exists.
    pub fn new(config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) => Self::layered(File::from(path).required(true)),
            None => {
                let path = home::home_dir()
                    .ok_or(ConfigError::NotFound("Config Path".to_string()))?
                    .join(DEFAULT_WORK_DIR)
                    .join("config.toml");
                Self::layered(File::from(path).required(false))
            }
        }
    }

    fn layered<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config: Config = Config::builder()
            // use defaults
            .add_source(Config::try_from(&Settings::default())?)
            // override with file contents
            .add_source(file)
            // override with environment
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Candy machine address
    pub fn machine_id(&self) -> Result<Address, ConfigError> {
        Address::from_str(&self.program_id).map_err(|e| {
            ConfigError::Message(format!("Invalid program_id '{}': {}", self.program_id, e))
        })
    }

    /// Node url
    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        let url = self
            .rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url());
        Url::parse(url).map_err(|e| ConfigError::Message(format!("Invalid rpc_url '{}': {}", url, e)))
    }

    /// Wallet address, if configured
    pub fn wallet(&self) -> Result<Option<Address>, ConfigError> {
        self.wallet
            .as_deref()
            .map(|wallet| {
                Address::from_str(wallet).map_err(|e| {
                    ConfigError::Message(format!("Invalid wallet '{}': {}", wallet, e))
                })
            })
            .transpose()
    }

    /// Session settings
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        if self.tx_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "tx_timeout_ms must be positive".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }

        Ok(SessionConfig::new(self.machine_id()?)
            .commitment(self.commitment)
            .confirmation_timeout(Duration::from_millis(self.tx_timeout_ms))
            .refresh_interval(Duration::from_secs(self.refresh_interval_secs)))
    }

    /// Check every field that must parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session_config()?;
        self.rpc_url()?;
        self.wallet()?;
        Ok(())
    }
}
