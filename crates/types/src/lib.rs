/// Shared types for the Pulse protocol client
///
/// Protocol constants, the PDA seed table, account records with their
/// discriminator-keyed decoding, memcmp layout offsets, the program error
/// table and the error type shared by the math crate and the SDK.

pub mod accounts;
pub mod constants;
pub mod errors;
pub mod layout;
pub mod program_errors;
pub mod seeds;

// Re-export all public types
pub use accounts::*;
pub use constants::*;
pub use errors::*;
pub use program_errors::*;
