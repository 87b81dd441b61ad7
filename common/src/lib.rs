//! Bank Ledger Common Types
//!
//! Shared types used across the ledger workspace: identifiers, the closed
//! currency set, fixed-key balances, conversion rates and the error type
//! every engine operation surfaces.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
