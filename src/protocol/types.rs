//! Wire Format Data Types
//!
//! This module defines the binary command format portset speaks: a fixed
//! frame header followed by a block of typed attributes, in the style of a
//! netlink attribute stream.
//!
//! ## Frame Format
//!
//! ```text
//! Command:   op(u8)  flags(u8)  attr_len(u16 BE)  attributes...
//! Response:  status(u8)        attr_len(u16 BE)  attributes...
//! ```
//!
//! ## Attribute Format
//!
//! Each attribute is a TLV: `kind(u16 BE)  len(u16 BE)  payload(len bytes)`.
//! All integer payloads are big-endian. The `Member` attribute nests a
//! further attribute block and carries one listing record.
//!
//! ## Examples
//!
//! Port attribute:      `00 01 00 02 1F 90`            (port 8080)
//! Timeout attribute:   `00 03 00 04 00 00 01 2C`      (300 seconds)
//! Test command frame:  `06 00 00 06` + port attribute

use bytes::{BufMut, Bytes};
use std::fmt;

/// Command frame flag: report benign per-element conflicts during a range
/// add/delete instead of absorbing them.
pub const FLAG_STRICT: u8 = 0x01;

/// Size of the command frame header in bytes.
pub const COMMAND_HEADER_LEN: usize = 4;

/// Size of the response frame header in bytes.
pub const RESPONSE_HEADER_LEN: usize = 3;

/// Largest attribute block a frame can carry (the length field is 16 bits).
pub const MAX_ATTR_BYTES: usize = u16::MAX as usize;

/// The operations a command frame can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SetOp {
    /// Create the set (port + port_to bounds, optional default timeout).
    Create = 1,
    /// Stop the sweeper and drop the set.
    Destroy = 2,
    /// Clear all elements, keeping bounds and variant.
    Flush = 3,
    /// Add a port or inclusive port range.
    Add = 4,
    /// Delete a port or inclusive port range.
    Del = 5,
    /// Test a single port for membership.
    Test = 6,
    /// Report set metadata.
    Head = 7,
    /// Dump one page of members.
    List = 8,
}

impl SetOp {
    /// Decodes an opcode byte.
    pub fn from_u8(op: u8) -> Option<Self> {
        match op {
            1 => Some(SetOp::Create),
            2 => Some(SetOp::Destroy),
            3 => Some(SetOp::Flush),
            4 => Some(SetOp::Add),
            5 => Some(SetOp::Del),
            6 => Some(SetOp::Test),
            7 => Some(SetOp::Head),
            8 => Some(SetOp::List),
            _ => None,
        }
    }
}

/// Result codes carried by a response frame.
///
/// `Test` answers `Ok` for a present element and `NotFound` for an absent
/// one; every other command uses `Ok` purely as the success indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    /// Malformed frame or an attribute the set cannot accept.
    Protocol = 1,
    /// A port or resolved range outside the set bounds.
    Range = 2,
    /// Element (or set) already exists.
    Exists = 3,
    /// Element (or set) does not exist.
    NotFound = 4,
    /// Storage could not be allocated at create time.
    NoMemory = 5,
}

impl Status {
    /// Decodes a status byte.
    pub fn from_u8(status: u8) -> Option<Self> {
        match status {
            0 => Some(Status::Ok),
            1 => Some(Status::Protocol),
            2 => Some(Status::Range),
            3 => Some(Status::Exists),
            4 => Some(Status::NotFound),
            5 => Some(Status::NoMemory),
            _ => None,
        }
    }
}

/// Attribute kind numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AttrKind {
    Port = 1,
    PortTo = 2,
    Timeout = 3,
    Lineno = 4,
    Cursor = 5,
    References = 6,
    MemSize = 7,
    Member = 8,
}

/// A typed wire attribute.
///
/// Commands carry `Port`/`PortTo`/`Timeout`/`Lineno`/`Cursor`; replies
/// additionally use `References`, `MemSize` and nested `Member` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    /// A single port, or the low bound of a range. Payload: u16.
    Port(u16),
    /// High bound of a range. Payload: u16.
    PortTo(u16),
    /// Timeout in seconds (0 = never expires). Payload: u32.
    Timeout(u32),
    /// Caller-side line number for batched command sources. Payload: u32.
    Lineno(u32),
    /// Listing continuation position (element id). Payload: u16.
    Cursor(u16),
    /// External reference count. Payload: u32.
    References(u32),
    /// Memory footprint in bytes. Payload: u32.
    MemSize(u32),
    /// One listing record: a nested attribute block.
    Member(Vec<Attr>),
}

impl Attr {
    /// The kind number this attribute serializes under.
    pub fn kind(&self) -> AttrKind {
        match self {
            Attr::Port(_) => AttrKind::Port,
            Attr::PortTo(_) => AttrKind::PortTo,
            Attr::Timeout(_) => AttrKind::Timeout,
            Attr::Lineno(_) => AttrKind::Lineno,
            Attr::Cursor(_) => AttrKind::Cursor,
            Attr::References(_) => AttrKind::References,
            Attr::MemSize(_) => AttrKind::MemSize,
            Attr::Member(_) => AttrKind::Member,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            Attr::Port(_) | Attr::PortTo(_) | Attr::Cursor(_) => 2,
            Attr::Timeout(_) | Attr::Lineno(_) | Attr::References(_) | Attr::MemSize(_) => 4,
            Attr::Member(inner) => inner.iter().map(Attr::encoded_len).sum(),
        }
    }

    /// Serialized size including the 4-byte TLV header.
    ///
    /// Listing uses this to decide whether a record still fits the page.
    pub fn encoded_len(&self) -> usize {
        4 + self.payload_len()
    }

    /// Appends the TLV encoding of this attribute to `buf`.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.put_u16(self.kind() as u16);
        buf.put_u16(self.payload_len() as u16);
        match self {
            Attr::Port(v) | Attr::PortTo(v) | Attr::Cursor(v) => buf.put_u16(*v),
            Attr::Timeout(v) | Attr::Lineno(v) | Attr::References(v) | Attr::MemSize(v) => {
                buf.put_u32(*v)
            }
            Attr::Member(inner) => serialize_attrs(inner, buf),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Port(v) => write!(f, "port={}", v),
            Attr::PortTo(v) => write!(f, "port_to={}", v),
            Attr::Timeout(v) => write!(f, "timeout={}s", v),
            Attr::Lineno(v) => write!(f, "lineno={}", v),
            Attr::Cursor(v) => write!(f, "cursor={}", v),
            Attr::References(v) => write!(f, "references={}", v),
            Attr::MemSize(v) => write!(f, "memsize={}", v),
            Attr::Member(inner) => {
                write!(f, "member(")?;
                for (i, attr) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Appends the TLV encoding of each attribute in order.
pub fn serialize_attrs(attrs: &[Attr], buf: &mut Vec<u8>) {
    for attr in attrs {
        attr.serialize_into(buf);
    }
}

/// A decoded command frame: the operation, its flags, and the raw
/// attribute block for the command layer to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub op: SetOp,
    pub flags: u8,
    pub attrs: Bytes,
}

impl CommandFrame {
    /// Builds a frame from typed attributes (used by clients and tests).
    pub fn new(op: SetOp, flags: u8, attrs: &[Attr]) -> Self {
        let mut encoded = Vec::new();
        serialize_attrs(attrs, &mut encoded);
        Self {
            op,
            flags,
            attrs: Bytes::from(encoded),
        }
    }

    /// Serializes the frame for the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(COMMAND_HEADER_LEN + self.attrs.len());
        buf.put_u8(self.op as u8);
        buf.put_u8(self.flags);
        buf.put_u16(self.attrs.len() as u16);
        buf.extend_from_slice(&self.attrs);
        buf
    }
}

/// A response frame: a status code plus reply attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub attrs: Vec<u8>,
}

impl Response {
    /// A bare success with no payload.
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            attrs: Vec::new(),
        }
    }

    /// A response carrying serialized attributes.
    pub fn with_attrs(status: Status, attrs: &[Attr]) -> Self {
        let mut encoded = Vec::new();
        serialize_attrs(attrs, &mut encoded);
        Self {
            status,
            attrs: encoded,
        }
    }

    /// A bare failure with the given status.
    pub fn error(status: Status) -> Self {
        Self {
            status,
            attrs: Vec::new(),
        }
    }

    /// Serializes the response for the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RESPONSE_HEADER_LEN + self.attrs.len());
        buf.put_u8(self.status as u8);
        buf.put_u16(self.attrs.len() as u16);
        buf.extend_from_slice(&self.attrs);
        buf
    }
}
