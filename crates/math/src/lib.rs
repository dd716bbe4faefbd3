/// Mathematical utilities for the Pulse protocol client
///
/// Checked u64 arithmetic plus the client-side mirror of the program's
/// bonding-curve pricing, platform fees and governance voting power. Every
/// function here is pure and safe to call on every keystroke.

pub mod bonding_curve;
pub mod fees;
pub mod safe;
pub mod voting;

// Re-export commonly used functions
pub use bonding_curve::*;
pub use fees::*;
pub use safe::*;
pub use voting::*;
