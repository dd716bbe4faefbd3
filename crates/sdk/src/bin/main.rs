use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_sdk::{
    config::create_example_config, lock_multiplier_bps, quote_trade, voting_power, CreatorPool,
    DerivedAddress, MemoryStore, PdaBuilder, PulseClient, SdkConfig, Side, LAMPORTS_PER_TOKEN,
    SECONDS_PER_DAY,
};

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(about = "Pulse protocol client: previews, address derivation and reads")]
struct Args {
    /// Path to SDK configuration file
    #[arg(short, long, default_value = "pulse.toml")]
    config: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview the cost of a share trade on a bonding curve
    Quote {
        #[arg(long)]
        base_price: u64,
        #[arg(long, default_value = "0")]
        supply: u64,
        #[arg(long)]
        amount: u64,
        #[arg(long, value_enum, default_value = "buy")]
        side: TradeSide,
        #[arg(long, default_value = "250")]
        fee_bps: u16,
    },
    /// Voting power of a stake
    VotingPower {
        /// Staked amount in lamports
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "0")]
        lock_days: i64,
    },
    /// Derive a program address
    Derive {
        #[arg(value_enum)]
        target: DeriveTarget,
        /// Pubkey seeds, in seed order
        #[arg(long = "key")]
        keys: Vec<Pubkey>,
        /// Text seed (username, group name or proposal title)
        #[arg(long)]
        text: Option<String>,
        /// Subscription tier
        #[arg(long, default_value = "0")]
        tier: u8,
    },
    /// Fetch a user profile through the cache
    Profile { owner: Pubkey },
    /// Write an example configuration file
    InitConfig {
        #[arg(default_value = "pulse.toml")]
        path: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TradeSide {
    Buy,
    Sell,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeriveTarget {
    PlatformConfig,
    UserProfile,
    CreatorPool,
    PoolVault,
    ShareHolding,
    Subscription,
    Group,
    GroupMember,
    StakePosition,
    Proposal,
    Vote,
    UsernameNft,
    Listing,
    Offer,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Quote {
            base_price,
            supply,
            amount,
            side,
            fee_bps,
        } => {
            let pool = CreatorPool {
                supply,
                ..CreatorPool::new(Pubkey::default(), base_price)
            };
            let side = match side {
                TradeSide::Buy => Side::Buy,
                TradeSide::Sell => Side::Sell,
            };
            let quote = quote_trade(&pool, amount, side, fee_bps)?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::VotingPower { amount, lock_days } => {
            let lock_seconds = lock_days
                .checked_mul(SECONDS_PER_DAY)
                .ok_or_else(|| anyhow!("lock of {} days overflows", lock_days))?;
            let power = voting_power(amount, lock_seconds)?;
            let output = json!({
                "amount": amount,
                "lock_days": lock_days,
                "multiplier_bps": lock_multiplier_bps(lock_seconds),
                "voting_power": power,
                "voting_power_tokens": power as f64 / LAMPORTS_PER_TOKEN as f64,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Derive {
            target,
            keys,
            text,
            tier,
        } => {
            let config = load_config(&args.config)?;
            let pda = PdaBuilder::new(config.program_id);
            let derived = derive(&pda, target, &keys, text.as_deref(), tier)?;
            let output = json!({
                "address": derived.address.to_string(),
                "bump": derived.bump,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Profile { owner } => {
            let config = load_config(&args.config)?;
            info!("Fetching profile of {} from {}", owner, config.rpc_url);
            let client = PulseClient::connect(config, None, Arc::new(MemoryStore::new()))?;
            let profile = client.social.profile(&owner).await?;
            if profile.is_stale() {
                warn!("Ledger unreachable, showing cached profile");
            }
            println!("{}", serde_json::to_string_pretty(&profile.value)?);
        }
        Command::InitConfig { path } => {
            create_example_config(&path)?;
            info!("Wrote example configuration to {}", path);
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<SdkConfig> {
    if Path::new(path).exists() {
        Ok(SdkConfig::load(path)?)
    } else {
        warn!("No config at {}, using defaults", path);
        Ok(SdkConfig::default())
    }
}

fn derive(
    pda: &PdaBuilder,
    target: DeriveTarget,
    keys: &[Pubkey],
    text: Option<&str>,
    tier: u8,
) -> Result<DerivedAddress> {
    let key = |index: usize| {
        keys.get(index)
            .ok_or_else(|| anyhow!("{:?} needs {} --key argument(s)", target, index + 1))
    };
    let text = || text.ok_or_else(|| anyhow!("{:?} needs --text", target));

    let derived = match target {
        DeriveTarget::PlatformConfig => pda.platform_config()?,
        DeriveTarget::UserProfile => pda.user_profile(key(0)?)?,
        DeriveTarget::CreatorPool => pda.creator_pool(key(0)?)?,
        DeriveTarget::PoolVault => pda.pool_vault(key(0)?)?,
        DeriveTarget::ShareHolding => pda.share_holding(key(0)?, key(1)?)?,
        DeriveTarget::Subscription => pda.subscription(key(0)?, key(1)?, tier)?,
        DeriveTarget::Group => pda.group(key(0)?, text()?)?,
        DeriveTarget::GroupMember => pda.group_member(key(0)?, key(1)?)?,
        DeriveTarget::StakePosition => pda.stake_position(key(0)?)?,
        DeriveTarget::Proposal => pda.proposal(key(0)?, text()?)?,
        DeriveTarget::Vote => pda.vote(key(0)?, key(1)?)?,
        DeriveTarget::UsernameNft => pda.username_nft(text()?)?,
        DeriveTarget::Listing => pda.listing(key(0)?)?,
        DeriveTarget::Offer => pda.offer(key(0)?, key(1)?)?,
    };
    Ok(derived)
}
