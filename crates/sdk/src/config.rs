use std::fs;
use std::str::FromStr;
use std::time::Duration;

use pulse_types::{DEFAULT_PLATFORM_FEE_BPS, MAX_PLATFORM_FEE_BPS, MAX_TRANSFER_LAMPORTS};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::cache::DEFAULT_NAMESPACE;
use crate::error::{SdkError, SdkResult};
use crate::PULSE_PROGRAM_ID;

const COMMITMENT_LEVELS: [&str; 3] = ["processed", "confirmed", "finalized"];

/// SDK configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SdkConfig {
    /// JSON-RPC endpoint of the ledger
    pub rpc_url: String,

    /// Pulse program ID
    #[serde(with = "pubkey_serde")]
    pub program_id: Pubkey,

    /// Commitment level for reads
    pub commitment: String,

    /// Fee used for previews when the platform config cannot be read
    pub platform_fee_bps: u16,

    /// Upper bound on any single transfer the client will build
    pub max_transfer_lamports: u64,

    /// Refuse share trades when the program prices with a different scale
    pub verify_price_scale: bool,

    pub http: HttpConfig,

    pub cache: CacheConfig,
}

/// Timeouts for the bundled HTTP transport
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

/// Cache namespace and TTLs per record family
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefix of every key the cache owns in the shared store
    pub namespace: String,
    pub profile_ttl_secs: u64,
    pub listing_ttl_secs: u64,
    /// Follower / following lists and offer scans
    pub relationship_ttl_secs: u64,
    /// Stake positions and proposals
    pub governance_ttl_secs: u64,
    pub pool_ttl_secs: u64,
}

impl SdkConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> SdkResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SdkError::config(format!("Failed to read config file {}: {}", path, e)))?;

        let config: SdkConfig = toml::from_str(&content)
            .map_err(|e| SdkError::config(format!("Failed to parse config file {}: {}", path, e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> SdkResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SdkError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| SdkError::config(format!("Failed to write config file {}: {}", path, e)))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SdkResult<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(SdkError::config(format!(
                "rpc_url '{}' must be an http(s) URL",
                self.rpc_url
            )));
        }

        if !COMMITMENT_LEVELS.contains(&self.commitment.as_str()) {
            return Err(SdkError::config(format!(
                "commitment '{}' must be one of {:?}",
                self.commitment, COMMITMENT_LEVELS
            )));
        }

        if self.platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(SdkError::config(format!(
                "platform_fee_bps {} exceeds maximum {}",
                self.platform_fee_bps, MAX_PLATFORM_FEE_BPS
            )));
        }

        if self.max_transfer_lamports == 0 || self.max_transfer_lamports > MAX_TRANSFER_LAMPORTS {
            return Err(SdkError::config(format!(
                "max_transfer_lamports {} must be in 1..={}",
                self.max_transfer_lamports, MAX_TRANSFER_LAMPORTS
            )));
        }

        self.http.validate()?;
        self.cache.validate()?;

        Ok(())
    }
}

impl HttpConfig {
    fn validate(&self) -> SdkResult<()> {
        if self.connect_timeout_secs == 0 {
            return Err(SdkError::config("http.connect_timeout_secs must be greater than 0"));
        }
        if self.read_timeout_secs == 0 {
            return Err(SdkError::config("http.read_timeout_secs must be greater than 0"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl CacheConfig {
    fn validate(&self) -> SdkResult<()> {
        if self.namespace.is_empty() || !self.namespace.ends_with(':') {
            return Err(SdkError::config(format!(
                "cache.namespace '{}' must be non-empty and end with ':'",
                self.namespace
            )));
        }
        let ttls = [
            ("profile_ttl_secs", self.profile_ttl_secs),
            ("listing_ttl_secs", self.listing_ttl_secs),
            ("relationship_ttl_secs", self.relationship_ttl_secs),
            ("governance_ttl_secs", self.governance_ttl_secs),
            ("pool_ttl_secs", self.pool_ttl_secs),
        ];
        for (name, ttl) in ttls {
            if ttl == 0 {
                return Err(SdkError::config(format!("cache.{} must be greater than 0", name)));
            }
        }
        Ok(())
    }

    pub fn profile_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.profile_ttl_secs))
    }

    pub fn listing_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.listing_ttl_secs))
    }

    pub fn relationship_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.relationship_ttl_secs))
    }

    pub fn governance_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.governance_ttl_secs))
    }

    pub fn pool_ttl(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.pool_ttl_secs))
    }

    /// Platform config only changes on program upgrades
    pub fn config_ttl(&self) -> Option<Duration> {
        None
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8899".to_string(),
            program_id: PULSE_PROGRAM_ID,
            commitment: "confirmed".to_string(),
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            max_transfer_lamports: MAX_TRANSFER_LAMPORTS,
            verify_price_scale: true,
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            profile_ttl_secs: 45,
            listing_ttl_secs: 45,
            relationship_ttl_secs: 45,
            governance_ttl_secs: 30,
            pool_ttl_secs: 15,
        }
    }
}

/// Create example configuration file
pub fn create_example_config(path: &str) -> SdkResult<()> {
    let example_config = SdkConfig {
        rpc_url: "https://api.devnet.solana.com".to_string(),
        program_id: PULSE_PROGRAM_ID,
        commitment: "confirmed".to_string(),
        platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
        max_transfer_lamports: MAX_TRANSFER_LAMPORTS,
        verify_price_scale: true,
        http: HttpConfig {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        },
        cache: CacheConfig::default(),
    };

    example_config.save(path)?;
    Ok(())
}

// Custom serde module for Pubkey
mod pubkey_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
