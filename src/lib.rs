//! # portset - A Fixed-Range, Bitmap-Backed Port Membership Set
//!
//! portset answers one question on a packet-processing path - "is this
//! port a member?" - in O(1), over a port range fixed at creation. It
//! supports bulk add/remove of contiguous port ranges, optional
//! per-element expiry, and resumable listing of current members, all
//! driven by a small binary command protocol.
//!
//! ## Features
//!
//! - **O(1) matching**: one bit (or one expiry slot) per port in range
//! - **Two variants**: presence-only bitmap, or expiry-aware table,
//!   chosen once at creation by the presence of a default timeout
//! - **Lazy + active expiry**: stale elements read absent immediately and
//!   are physically reclaimed by a background sweeper
//! - **Resumable listing**: bounded reply pages with an explicit cursor
//! - **Async service**: a Tokio TCP front end speaking framed commands
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              portset                                │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐              │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │              │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │              │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘              │
//! │                                               │                     │
//! │  ┌─────────────┐                              ▼                     │
//! │  │   Frame     │    ┌──────────────────────────────────────────┐   │
//! │  │   Parser    │    │                 PortSet                  │   │
//! │  │             │    │  ┌───────────────┐  ┌──────────────────┐ │   │
//! │  └─────────────┘    │  │ Membership    │or│ ExpiringTable    │ │   │
//! │                     │  │ Bitmap        │  │ (deadline slots) │ │   │
//! │                     │  └───────────────┘  └────────┬─────────┘ │   │
//! │                     └──────────────────────────────┼───────────┘   │
//! │                                                    │               │
//! │                     ┌──────────────────────────────┴────────────┐  │
//! │                     │              ExpirySweeper                │  │
//! │                     │         (Background Tokio Task)           │  │
//! │                     └───────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use portset::set::{PortSet, SetParams};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // A set over the ephemeral port range, entries expiring after 5 minutes
//! let set = PortSet::create(SetParams {
//!     first_port: 32768,
//!     last_port: 60999,
//!     timeout: Some(300),
//! })
//! .unwrap();
//!
//! // Track a contiguous block of ports
//! set.add(40000, 40009, None, true).unwrap();
//!
//! // The packet path asks with a plain lookup
//! assert!(set.matches(40005));
//! assert!(!set.matches(40010));
//!
//! // Destruction joins the background sweeper before storage goes away
//! set.destroy().await;
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`set`]: the membership core - bitmap and expiring variants, the
//!   sweeper, listing cursors and the set entity itself
//! - [`protocol`]: the framed command format and its incremental parser
//! - [`commands`]: command validation (range resolution, conflict
//!   absorption) and dispatch
//! - [`connection`]: per-client connection management
//!
//! ## Design Highlights
//!
//! ### Locking Discipline
//!
//! The set owns a reader/writer lock around atomic member storage.
//! Membership tests and the expiry sweep share the read mode; mutating
//! commands take the write mode. The sweep can therefore run concurrently
//! with the packet path without ever racing a mutation.
//!
//! ### Lazy + Active Expiry
//!
//! Elements with a timeout expire twice over, and either alone suffices:
//! a stale deadline reads as absent on access, and the background sweeper
//! physically clears stale slots so untouched elements don't linger.
//!
//! ### Cancel-and-Join Destruction
//!
//! Destroying a set signals its sweeper and then awaits the task itself,
//! so no sweep can observe storage that is being torn down.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod set;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Attr, CommandFrame, FrameParser, ParseError, Response, SetOp, Status};
pub use set::{ListCursor, PortSet, SetError, SetParams};

/// The default port the portset service listens on
pub const DEFAULT_PORT: u16 = 6390;

/// The default host the portset service binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of portset
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
