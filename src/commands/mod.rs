//! Command Processing Module
//!
//! This module implements the command layer of portset. It receives
//! decoded command frames, validates their attributes against the active
//! set, executes the operation and builds the reply.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  FrameParser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Decode attrs │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    PortSet      │  (set module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `CREATE`, `DESTROY`, `FLUSH`
//! - `ADD`, `DEL` (single port or inclusive range, optional timeout)
//! - `TEST`, `HEAD`, `LIST` (resumable, bounded pages)

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
