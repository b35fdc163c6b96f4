//! Wire Protocol Implementation
//!
//! This module implements the binary command format the portset service
//! speaks: fixed frame headers carrying netlink-style typed attribute
//! blocks.
//!
//! ## Modules
//!
//! - `types`: opcodes, status codes, attributes and their serialization
//! - `parser`: incremental frame parsing and strict attribute decoding
//!
//! ## Example
//!
//! ```ignore
//! use portset::protocol::{Attr, AttrBlock, CommandFrame, FrameParser, SetOp};
//!
//! // Building a command
//! let frame = CommandFrame::new(SetOp::Add, 0, &[Attr::Port(8080)]);
//! let bytes = frame.serialize();
//!
//! // Parsing incoming data
//! let (frame, consumed) = FrameParser::new().parse(&bytes)?.unwrap();
//! let block = AttrBlock::decode(&frame.attrs)?;
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{decode_attrs, parse_response, AttrBlock, FrameParser, ParseError, ParseResult};
pub use types::{
    serialize_attrs, Attr, AttrKind, CommandFrame, Response, SetOp, Status, COMMAND_HEADER_LEN,
    FLAG_STRICT, MAX_ATTR_BYTES, RESPONSE_HEADER_LEN,
};
