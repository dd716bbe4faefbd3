/// Instruction builders for the Pulse program
pub mod builder;
pub mod governance;
pub mod marketplace;
pub mod shares;
pub mod social;

pub use builder::*;
pub use governance::*;
pub use marketplace::*;
pub use shares::*;
pub use social::*;
