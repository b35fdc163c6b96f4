//! Connection Handling Module
//!
//! This module manages individual client connections to the portset
//! service. Each connection is handled by its own async task, so a slow
//! client never stalls the others.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                      (main.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept() → spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │  │ Read bytes  │───>│ Parse frame  │───>│ Execute cmd  │   │
//! │  └─────────────┘    └──────────────┘    └──────┬───────┘   │
//! │                                                ▼            │
//! │                                        ┌──────────────┐    │
//! │                                        │ Send response│    │
//! │                                        └──────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: Tokio-based non-blocking network operations
//! - **Buffer Management**: a `BytesMut` accumulation buffer per client
//! - **Pipelining**: multiple command frames in a single TCP packet
//! - **Statistics**: connection and command counters

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
