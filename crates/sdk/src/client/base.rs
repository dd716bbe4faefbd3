use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use pulse_types::{AccountRecord, PlatformConfig, PRICE_SCALE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{
    cache::{keys, Cached, KeyValueStore, ResilientCache},
    clock::Clock,
    config::SdkConfig,
    error::{classify, SdkError, SdkResult},
    filters::AccountFilter,
    pda::PdaBuilder,
    rpc::{IndexState, LedgerRpc, TransactionSigner},
};

/// Decoded records from a program-account scan
pub type Records<T> = IndexState<Vec<(Pubkey, T)>>;

/// Shared ledger access for every service: RPC reads through the cache,
/// decoding, and submission through the signer
pub struct BaseClient {
    rpc: Arc<dyn LedgerRpc>,
    signer: Option<Arc<dyn TransactionSigner>>,
    cache: ResilientCache,
    clock: Arc<dyn Clock>,
    config: SdkConfig,
    pda: Arc<PdaBuilder>,
}

impl BaseClient {
    pub fn new(
        config: SdkConfig,
        rpc: Arc<dyn LedgerRpc>,
        signer: Option<Arc<dyn TransactionSigner>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        pda: Arc<PdaBuilder>,
    ) -> Self {
        let cache = ResilientCache::with_namespace(store, clock.clone(), &config.cache.namespace);
        Self {
            rpc,
            signer,
            cache,
            clock,
            config,
            pda,
        }
    }

    /// Get the program ID
    pub fn program_id(&self) -> Pubkey {
        self.config.program_id
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResilientCache {
        &self.cache
    }

    pub fn rpc(&self) -> &dyn LedgerRpc {
        self.rpc.as_ref()
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Wallet that signs submitted transactions
    pub fn authority(&self) -> SdkResult<Pubkey> {
        Ok(self.signer()?.authority())
    }

    fn signer(&self) -> SdkResult<&Arc<dyn TransactionSigner>> {
        self.signer
            .as_ref()
            .ok_or_else(|| SdkError::config("client was built without a transaction signer"))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetch and decode one account, bypassing the cache
    pub async fn fetch_account<T: AccountRecord>(&self, address: &Pubkey) -> SdkResult<T> {
        debug!("Fetching {:?} account {}", T::KIND, address);
        let data = self
            .rpc
            .get_account_data(address)
            .await
            .map_err(classify)?
            .ok_or(SdkError::AccountNotFound { address: *address })?;
        Ok(T::decode(&data)?)
    }

    /// Fetch one account through the cache
    pub async fn fetch_cached<T>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        address: &Pubkey,
    ) -> SdkResult<Cached<T>>
    where
        T: AccountRecord + Serialize + DeserializeOwned,
    {
        self.cache
            .read_through(key, ttl, || self.fetch_account::<T>(address))
            .await
    }

    /// Scan program accounts of one kind, bypassing the cache
    pub async fn scan<T: AccountRecord>(&self, filters: &[AccountFilter]) -> SdkResult<Records<T>> {
        let state = self
            .rpc
            .get_program_accounts(&self.program_id(), filters)
            .await
            .map_err(classify)?;

        match state {
            IndexState::NotIndexed => Ok(IndexState::NotIndexed),
            IndexState::Ready(accounts) => {
                let mut records = Vec::with_capacity(accounts.len());
                for (address, data) in accounts {
                    records.push((address, T::decode(&data)?));
                }
                Ok(IndexState::Ready(records))
            }
        }
    }

    /// Scan through the cache. A `NotIndexed` answer is cached like any other.
    pub async fn scan_cached<T>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        filters: &[AccountFilter],
    ) -> SdkResult<Cached<Records<T>>>
    where
        T: AccountRecord + Serialize + DeserializeOwned,
    {
        self.cache
            .read_through(key, ttl, || self.scan::<T>(filters))
            .await
    }

    /// Platform config, cached until invalidated
    pub async fn platform_config(&self) -> SdkResult<Cached<PlatformConfig>> {
        let address = self.pda.platform_config()?.address;
        self.fetch_cached(&keys::config(), self.config.cache.config_ttl(), &address)
            .await
    }

    /// Refuse to price trades against a program using another bucket width
    pub async fn ensure_compatible(&self) -> SdkResult<()> {
        if !self.config.verify_price_scale {
            return Ok(());
        }
        let platform = self.platform_config().await?.value;
        if platform.price_scale != PRICE_SCALE {
            return Err(SdkError::IncompatibleProgram {
                on_chain: platform.price_scale,
                expected: PRICE_SCALE,
            });
        }
        Ok(())
    }

    /// Fee rate for previews; falls back to the configured rate when the
    /// platform config cannot be read at all
    pub async fn fee_bps(&self) -> SdkResult<u16> {
        match self.platform_config().await {
            Ok(platform) => Ok(platform.value.platform_fee_bps),
            Err(SdkError::Transport { reason }) => {
                debug!("Using configured fee, platform config unavailable: {}", reason);
                Ok(self.config.platform_fee_bps)
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Sign and submit, classifying any rejection
    pub async fn submit(&self, action: &str, instructions: Vec<Instruction>) -> SdkResult<Signature> {
        let signer = self.signer()?;
        let signature = signer
            .sign_and_submit(instructions)
            .await
            .map_err(classify)?;
        info!("Submitted {}: {}", action, signature);
        Ok(signature)
    }
}
