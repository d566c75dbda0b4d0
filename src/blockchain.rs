// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into the block record, the chain store, and integrity validation.

pub mod core;
pub use self::core::*;
