//! chainfile - an append-only, tamper-evident hash chain kept in a flat JSON file
//!
//! # Architecture
//!
//! ## Core Chain
//! - [`blockchain`] - Block record, chain store (`add`, lookups) and verification
//! - [`crypto`] - The link hash binding each block to its predecessor
//!
//! ## Storage
//! - [`persistence`] - Storage backends and the on-disk JSON encoding
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`logging`] - Tracing subscriber setup
//! - [`cli`] - Helpers shared by the binaries
//! - [`phrases`] - Demo transaction text
//!
//! # Example
//!
//! ```no_run
//! use chainfile::blockchain::Blockchain;
//!
//! let mut chain = Blockchain::open("chain.json")?;
//! chain.add("Jen Cook", "BC-1")?;
//! chain.verify()?;
//! # Ok::<(), chainfile::error::ChainError>(())
//! ```

#![forbid(unsafe_code)]

// ============================================================================
// Core Chain
// ============================================================================
pub mod blockchain;
pub mod crypto;

// ============================================================================
// Storage
// ============================================================================
pub mod persistence;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod phrases;
