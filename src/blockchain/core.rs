// core.rs splits the chain into its record type, the store, and validation.
pub mod block;
pub mod chain;
pub mod validation;

pub use block::*;
pub use chain::*;
pub use validation::*;
