// Thin re-export module: the implementation lives in `blockchain/core.rs`,
// split into block construction, chain management and validation.

pub mod core;
pub use core::*;
