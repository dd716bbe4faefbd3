//! Prelude module for common imports
//!
//! Serialization traits come straight from borsh; everything ledger-facing
//! comes from solana-sdk.

pub use borsh::{BorshDeserialize, BorshSerialize};

pub use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Signature,
    system_program,
};
