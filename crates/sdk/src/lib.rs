/// Pulse Protocol SDK
///
/// Client layer for the Pulse social protocol. Provides:
/// - Program address derivation
/// - Bonding-curve and voting-power previews
/// - The username marketplace and governance state machines
/// - A stale-on-error cache over the ledger read path
/// - Instruction builders and the `PulseClient` facade

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod filters;
pub mod governance;
pub mod instructions;
pub mod marketplace;
pub mod pda;
pub mod prelude;
pub mod rpc;

pub use cache::{
    CacheLookup, Cached, Freshness, KeyValueStore, MemoryStore, ResilientCache, WriteStamp,
};
pub use client::PulseClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, HttpConfig, SdkConfig};
pub use error::{classify, LedgerError, SdkError, SdkResult};
pub use filters::AccountFilter;
pub use pda::{DerivedAddress, PdaBuilder};
pub use rpc::{HttpLedgerRpc, IndexState, LedgerRpc, TransactionSigner};

// Shared protocol types and math
pub use pulse_math::*;
pub use pulse_types::*;

use solana_sdk::pubkey;

/// Program id of the deployed Pulse program
pub const PULSE_PROGRAM_ID: solana_sdk::pubkey::Pubkey =
    pubkey!("PuLse11111111111111111111111111111111111111");
