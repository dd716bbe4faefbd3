use std::sync::Arc;

use crate::prelude::*;
use pulse_math::{max_shares_for_budget, quote_trade, Side, TradeQuote};
use pulse_types::{CreatorPool, PulseError, ShareHolding};

use crate::{
    cache::{keys, Cached},
    client::BaseClient,
    error::SdkResult,
    instructions::{BuySharesParams, PulseInstructions, SellSharesParams, SubscribeParams},
    pda::PdaBuilder,
};

/// Result of a submitted share trade
#[derive(Debug, Clone, PartialEq)]
pub struct TradeResult {
    pub signature: Signature,
    /// Preview the limit was checked against
    pub quote: TradeQuote,
}

/// Service for creator shares, tips and subscriptions
pub struct SharesService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    ixs: Arc<PulseInstructions>,
}

impl SharesService {
    pub fn new(base: Arc<BaseClient>, pda: Arc<PdaBuilder>, ixs: Arc<PulseInstructions>) -> Self {
        Self { base, pda, ixs }
    }

    pub async fn pool(&self, creator: &Pubkey) -> SdkResult<Cached<CreatorPool>> {
        let address = self.pda.creator_pool(creator)?.address;
        self.base
            .fetch_cached(&keys::pool(creator), self.base.config().cache.pool_ttl(), &address)
            .await
    }

    pub async fn holding(&self, holder: &Pubkey, creator: &Pubkey) -> SdkResult<Cached<ShareHolding>> {
        let address = self.pda.share_holding(holder, creator)?.address;
        self.base
            .fetch_cached(
                &keys::holding(holder, creator),
                self.base.config().cache.pool_ttl(),
                &address,
            )
            .await
    }

    /// Preview a trade against the current pool, fee included
    pub async fn quote(&self, creator: &Pubkey, amount: u64, side: Side) -> SdkResult<TradeQuote> {
        self.base.ensure_compatible().await?;
        let pool = self.pool(creator).await?.value;
        let fee_bps = self.base.fee_bps().await?;
        Ok(quote_trade(&pool, amount, side, fee_bps)?)
    }

    /// Largest buy whose total fits `budget`
    pub async fn max_buy_for_budget(&self, creator: &Pubkey, budget: u64) -> SdkResult<u64> {
        self.base.ensure_compatible().await?;
        let pool = self.pool(creator).await?.value;
        let fee_bps = self.base.fee_bps().await?;
        Ok(max_shares_for_budget(&pool, budget, fee_bps)?)
    }

    /// Buy `amount` shares, refusing locally when the preview already
    /// exceeds `max_cost`
    pub async fn buy(&self, creator: Pubkey, amount: u64, max_cost: u64) -> SdkResult<TradeResult> {
        let buyer = self.base.authority()?;
        let quote = self.quote(&creator, amount, Side::Buy).await?;
        if quote.total > max_cost {
            return Err(PulseError::SlippageExceeded {
                quoted: quote.total,
                limit: max_cost,
            }
            .into());
        }

        let ix = self
            .ixs
            .buy_shares(buyer, creator, BuySharesParams { amount, max_cost })?;
        let signature = self.base.submit("buy_shares", vec![ix]).await?;
        self.invalidate_trade(&buyer, &creator);

        Ok(TradeResult { signature, quote })
    }

    /// Sell `amount` shares, refusing locally when the preview already
    /// falls below `min_proceeds`
    pub async fn sell(
        &self,
        creator: Pubkey,
        amount: u64,
        min_proceeds: u64,
    ) -> SdkResult<TradeResult> {
        let seller = self.base.authority()?;
        let quote = self.quote(&creator, amount, Side::Sell).await?;
        if quote.total < min_proceeds {
            return Err(PulseError::SlippageExceeded {
                quoted: quote.total,
                limit: min_proceeds,
            }
            .into());
        }

        let ix = self.ixs.sell_shares(
            seller,
            creator,
            SellSharesParams {
                amount,
                min_proceeds,
            },
        )?;
        let signature = self.base.submit("sell_shares", vec![ix]).await?;
        self.invalidate_trade(&seller, &creator);

        Ok(TradeResult { signature, quote })
    }

    pub async fn tip(&self, creator: Pubkey, amount: u64) -> SdkResult<Signature> {
        let ix = self.ixs.tip_creator(self.base.authority()?, creator, amount)?;
        self.base.submit("tip_creator", vec![ix]).await
    }

    pub async fn subscribe(
        &self,
        creator: Pubkey,
        tier_id: u8,
        price_lamports: u64,
    ) -> SdkResult<Signature> {
        let ix = self.ixs.subscribe(
            self.base.authority()?,
            creator,
            SubscribeParams {
                tier_id,
                price_lamports,
            },
        )?;
        self.base.submit("subscribe", vec![ix]).await
    }

    fn invalidate_trade(&self, trader: &Pubkey, creator: &Pubkey) {
        let cache = self.base.cache();
        cache.invalidate(&keys::pool(creator));
        cache.invalidate(&keys::holding(trader, creator));
    }
}
