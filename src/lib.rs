//! coil - A thin client for the Coil network
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Chain
//! - [`blockchain`] - Chain, block and transaction model, canonical block hash
//! - [`history`] - Per-address history reconstruction
//! - [`transaction`] - Transaction submission payloads
//!
//! ## Cryptography
//! - [`crypto`] - Double SHA-256 and key encoding
//!
//! ## State Management
//! - [`persistence`] - Local chain cache
//! - [`wallet`] - Wallet files
//!
//! ## Networking
//! - [`sync`] - Peer list and HTTP round trips
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - Command implementations

#![forbid(unsafe_code)]

// ============================================================================
// Chain
// ============================================================================
pub mod blockchain;
pub mod history;
pub mod transaction;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// State Management
// ============================================================================
pub mod persistence;
pub mod wallet;

// ============================================================================
// Networking
// ============================================================================
pub mod sync;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
