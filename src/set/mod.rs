//! Port Set Module
//!
//! This module provides the membership core of portset: the set entity,
//! its two storage variants and the background expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         PortSet                             │
//! │   bounds fixed at creation, RwLock around member storage    │
//! │  ┌──────────────────────┐   ┌──────────────────────────┐   │
//! │  │  MembershipBitmap    │   │  ExpiringTable           │   │
//! │  │  (presence bits)     │ or│  (deadline slots)        │   │
//! │  └──────────────────────┘   └──────────┬───────────────┘   │
//! └────────────────────────────────────────┼───────────────────┘
//!                                          │ shared lock mode
//!                            ┌─────────────┴─────────────┐
//!                            │      ExpirySweeper        │
//!                            │  (background tokio task)  │
//!                            └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Fixed range**: element ids are offsets into the creation bounds
//! - **Two variants**: presence-only bits, or expiry-aware slots
//! - **Lazy expiry**: a stale element reads absent before any sweep
//! - **Active expiry**: the sweeper reclaims stale slots in the background
//! - **Cancel-and-join destroy**: no sweep can observe a destroyed set
//!
//! ## Example
//!
//! ```
//! use portset::set::{PortSet, SetParams};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let set = PortSet::create(SetParams {
//!     first_port: 8000,
//!     last_port: 8999,
//!     timeout: Some(300),
//! })
//! .unwrap();
//!
//! set.add(8080, 8089, None, true).unwrap();
//! assert!(set.matches(8085));
//! set.destroy().await;
//! # }
//! ```

pub mod bitmap;
pub mod engine;
pub mod expiring;
pub mod sweeper;

// Re-export commonly used types
pub use bitmap::MembershipBitmap;
pub use engine::{
    HeadInfo, ListCursor, ListOutcome, MemberRecord, PortRange, PortSet, SetError, SetParams,
};
pub use expiring::ExpiringTable;
pub use sweeper::{sweep_period, ExpirySweeper};
