//! # Veritrack Application Library
//!
//! Library surface of the Veritrack binary: the HTTP API, CLI, snapshot
//! store, and configuration. Split out from `main.rs` so integration
//! tests can build routers and drive handlers directly.
//!
//! All domain logic lives in `veritrack-core`; this crate adds the
//! async, network, clock, and filesystem layers around it.

pub mod api;
pub mod cli;
pub mod config;
pub mod store;
