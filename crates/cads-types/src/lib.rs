//! Foundation types for content-addressed datasets (CADS).
//!
//! Every other CADS crate depends on `cads-types`.
//!
//! # Key Types
//!
//! - [`Address`] -- Content address or store path (`/ipfs/Qm…/structure.json`)
//! - [`Logger`] -- Injected logging capability wrapping a `tracing` dispatch

pub mod address;
pub mod error;
pub mod log;

pub use address::Address;
pub use error::TypeError;
pub use log::Logger;
