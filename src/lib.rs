//! DualChain - an educational blockchain with two consensus strategies
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Blockchain
//! - [`blockchain`] - Block construction, the chain and its validation
//! - [`transaction`] - Transaction records and their canonical form
//! - [`merkle`] - Merkle root over a transaction batch
//!
//! ## Consensus
//! - [`consensus`] - Proof-of-Work mining and Proof-of-Stake election
//!
//! ## Cryptography
//! - [`crypto`] - Pluggable digest functions
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod merkle;
pub mod transaction;

// ============================================================================
// Consensus
// ============================================================================
pub mod consensus;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
