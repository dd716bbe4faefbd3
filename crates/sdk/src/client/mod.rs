pub mod base;
pub mod governance;
pub mod marketplace;
pub mod shares;
pub mod social;

use std::sync::Arc;

use crate::prelude::*;

use crate::{
    cache::KeyValueStore,
    clock::{Clock, SystemClock},
    config::SdkConfig,
    error::SdkResult,
    instructions::PulseInstructions,
    pda::PdaBuilder,
    rpc::{HttpLedgerRpc, LedgerRpc, TransactionSigner},
};

pub use base::{BaseClient, Records};
pub use governance::GovernanceService;
pub use marketplace::MarketplaceService;
pub use shares::{SharesService, TradeResult};
pub use social::SocialService;

/// Main Pulse protocol client with service-based architecture
pub struct PulseClient {
    /// Shared RPC, cache and signer
    pub base: Arc<BaseClient>,
    /// Creator shares, tips and subscriptions
    pub shares: SharesService,
    /// Username marketplace
    pub marketplace: MarketplaceService,
    /// Staking and proposals
    pub governance: GovernanceService,
    /// Profiles, follows and groups
    pub social: SocialService,
    /// PDA builder
    pub pda: Arc<PdaBuilder>,
}

impl PulseClient {
    /// Create a client from validated configuration and injected collaborators
    pub fn new(
        config: SdkConfig,
        rpc: Arc<dyn LedgerRpc>,
        signer: Option<Arc<dyn TransactionSigner>>,
        store: Arc<dyn KeyValueStore>,
    ) -> SdkResult<Self> {
        Self::with_clock(config, rpc, signer, store, Arc::new(SystemClock))
    }

    /// Create a client over the bundled HTTP transport
    pub fn connect(
        config: SdkConfig,
        signer: Option<Arc<dyn TransactionSigner>>,
        store: Arc<dyn KeyValueStore>,
    ) -> SdkResult<Self> {
        let rpc = Arc::new(HttpLedgerRpc::new(&config));
        Self::new(config, rpc, signer, store)
    }

    pub fn with_clock(
        config: SdkConfig,
        rpc: Arc<dyn LedgerRpc>,
        signer: Option<Arc<dyn TransactionSigner>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> SdkResult<Self> {
        config.validate()?;

        let pda = Arc::new(PdaBuilder::new(config.program_id));
        let ixs = Arc::new(PulseInstructions::new(
            pda.clone(),
            config.max_transfer_lamports,
        ));
        let base = Arc::new(BaseClient::new(
            config,
            rpc,
            signer,
            store,
            clock,
            pda.clone(),
        ));

        Ok(Self {
            shares: SharesService::new(base.clone(), pda.clone(), ixs.clone()),
            marketplace: MarketplaceService::new(base.clone(), pda.clone(), ixs.clone()),
            governance: GovernanceService::new(base.clone(), pda.clone(), ixs.clone()),
            social: SocialService::new(base.clone(), pda.clone(), ixs),
            base,
            pda,
        })
    }

    /// Get the program ID
    pub fn program_id(&self) -> Pubkey {
        self.base.program_id()
    }

    pub fn config(&self) -> &SdkConfig {
        self.base.config()
    }
}
