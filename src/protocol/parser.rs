//! Incremental Frame and Attribute Parser
//!
//! The command service feeds raw socket bytes into this parser. Like any
//! stream protocol, a read may contain half a frame or several frames, so
//! parsing is incremental: the parser returns either
//!
//! - `Ok(Some((frame, consumed)))` - a complete frame, `consumed` bytes used
//! - `Ok(None)` - the data is incomplete, call again with more bytes
//! - `Err(ParseError)` - the data can never become a valid frame
//!
//! The caller appends incoming data to a buffer, parses, advances the
//! buffer by `consumed` on success, and waits for more data on `None`.
//!
//! Attribute decoding is strict: unknown kinds, wrong payload widths,
//! duplicates, and trailing garbage are all protocol errors rather than
//! being skipped. A command talks to a matching structure on a firewall
//! path; silently ignoring malformed input is the wrong default there.

use bytes::{Buf, Bytes};
use thiserror::Error;

use crate::protocol::types::{
    Attr, AttrKind, CommandFrame, Response, SetOp, Status, COMMAND_HEADER_LEN, RESPONSE_HEADER_LEN,
};

/// Errors that can occur while decoding frames or attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame header carries an opcode this protocol does not define.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// The response header carries an undefined status byte.
    #[error("unknown status: {0:#04x}")]
    UnknownStatus(u8),

    /// An attribute kind this protocol does not define.
    #[error("unknown attribute kind: {0}")]
    UnknownAttribute(u16),

    /// An attribute payload has the wrong size for its kind.
    #[error("attribute kind {kind} has invalid length {len}")]
    BadAttributeLength { kind: u16, len: usize },

    /// The same attribute kind appeared twice in one block.
    #[error("duplicate attribute kind {0}")]
    DuplicateAttribute(u16),

    /// An attribute block ended in the middle of a TLV.
    #[error("truncated attribute block")]
    TruncatedAttribute,

    /// An attribute that is only valid in replies appeared in a command.
    #[error("unexpected attribute in command: {0}")]
    UnexpectedAttribute(&'static str),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Incremental parser for command frames.
///
/// # Example
///
/// ```ignore
/// use portset::protocol::FrameParser;
/// use bytes::BytesMut;
///
/// let mut parser = FrameParser::new();
/// let mut buffer = BytesMut::from(&[0x06, 0x00, 0x00, 0x00][..]);
///
/// if let Some((frame, consumed)) = parser.parse(&buffer)? {
///     buffer.advance(consumed);
///     println!("parsed: {:?}", frame.op);
/// }
/// ```
#[derive(Debug, Default)]
pub struct FrameParser;

impl FrameParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self
    }

    /// Attempts to parse one command frame from the buffer.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(CommandFrame, usize)>> {
        if buf.len() < COMMAND_HEADER_LEN {
            return Ok(None);
        }

        let op = buf[0];
        let flags = buf[1];
        let attr_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;

        let total = COMMAND_HEADER_LEN + attr_len;
        if buf.len() < total {
            return Ok(None);
        }

        // Reject the opcode only once the whole frame is here, so a bad
        // frame consumes its bytes deterministically on the caller side.
        let op = SetOp::from_u8(op).ok_or(ParseError::UnknownOpcode(op))?;
        let attrs = Bytes::copy_from_slice(&buf[COMMAND_HEADER_LEN..total]);

        Ok(Some((CommandFrame { op, flags, attrs }, total)))
    }
}

/// Attempts to parse one response frame from the buffer.
///
/// The service only writes responses; this decoder exists for clients and
/// tests, with the same incremental contract as [`FrameParser::parse`].
pub fn parse_response(buf: &[u8]) -> ParseResult<Option<(Response, usize)>> {
    if buf.len() < RESPONSE_HEADER_LEN {
        return Ok(None);
    }

    let status = buf[0];
    let attr_len = u16::from_be_bytes([buf[1], buf[2]]) as usize;

    let total = RESPONSE_HEADER_LEN + attr_len;
    if buf.len() < total {
        return Ok(None);
    }

    let status = Status::from_u8(status).ok_or(ParseError::UnknownStatus(status))?;
    let attrs = buf[RESPONSE_HEADER_LEN..total].to_vec();

    Ok(Some((Response { status, attrs }, total)))
}

/// Decodes a complete attribute block into typed attributes.
///
/// Nested `Member` blocks are decoded recursively. Fails on unknown kinds,
/// wrong payload widths, or a block that ends mid-TLV.
pub fn decode_attrs(mut buf: &[u8]) -> ParseResult<Vec<Attr>> {
    let mut attrs = Vec::new();

    while !buf.is_empty() {
        if buf.len() < 4 {
            return Err(ParseError::TruncatedAttribute);
        }
        let kind = buf.get_u16();
        let len = buf.get_u16() as usize;
        if buf.len() < len {
            return Err(ParseError::TruncatedAttribute);
        }
        let (payload, rest) = buf.split_at(len);
        buf = rest;

        attrs.push(decode_attr(kind, payload)?);
    }

    Ok(attrs)
}

fn decode_attr(kind: u16, mut payload: &[u8]) -> ParseResult<Attr> {
    let len = payload.len();
    let expect = move |width: usize| {
        if len == width {
            Ok(())
        } else {
            Err(ParseError::BadAttributeLength { kind, len })
        }
    };

    let attr = match kind {
        k if k == AttrKind::Port as u16 => {
            expect(2)?;
            Attr::Port(payload.get_u16())
        }
        k if k == AttrKind::PortTo as u16 => {
            expect(2)?;
            Attr::PortTo(payload.get_u16())
        }
        k if k == AttrKind::Timeout as u16 => {
            expect(4)?;
            Attr::Timeout(payload.get_u32())
        }
        k if k == AttrKind::Lineno as u16 => {
            expect(4)?;
            Attr::Lineno(payload.get_u32())
        }
        k if k == AttrKind::Cursor as u16 => {
            expect(2)?;
            Attr::Cursor(payload.get_u16())
        }
        k if k == AttrKind::References as u16 => {
            expect(4)?;
            Attr::References(payload.get_u32())
        }
        k if k == AttrKind::MemSize as u16 => {
            expect(4)?;
            Attr::MemSize(payload.get_u32())
        }
        k if k == AttrKind::Member as u16 => Attr::Member(decode_attrs(payload)?),
        _ => return Err(ParseError::UnknownAttribute(kind)),
    };

    Ok(attr)
}

/// The attributes a command may carry, decoded and de-duplicated.
///
/// Which fields are mandatory depends on the operation; that policy lives
/// in the command layer. This type only guarantees the block was
/// well-formed and that reply-only attributes did not sneak in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttrBlock {
    pub port: Option<u16>,
    pub port_to: Option<u16>,
    pub timeout: Option<u32>,
    pub lineno: Option<u32>,
    pub cursor: Option<u16>,
}

impl AttrBlock {
    /// Decodes a command's attribute block.
    pub fn decode(buf: &[u8]) -> ParseResult<Self> {
        let mut block = Self::default();

        for attr in decode_attrs(buf)? {
            let duplicate = ParseError::DuplicateAttribute(attr.kind() as u16);
            match attr {
                Attr::Port(v) => {
                    if block.port.replace(v).is_some() {
                        return Err(duplicate);
                    }
                }
                Attr::PortTo(v) => {
                    if block.port_to.replace(v).is_some() {
                        return Err(duplicate);
                    }
                }
                Attr::Timeout(v) => {
                    if block.timeout.replace(v).is_some() {
                        return Err(duplicate);
                    }
                }
                Attr::Lineno(v) => {
                    if block.lineno.replace(v).is_some() {
                        return Err(duplicate);
                    }
                }
                Attr::Cursor(v) => {
                    if block.cursor.replace(v).is_some() {
                        return Err(duplicate);
                    }
                }
                Attr::References(_) => return Err(ParseError::UnexpectedAttribute("references")),
                Attr::MemSize(_) => return Err(ParseError::UnexpectedAttribute("memsize")),
                Attr::Member(_) => return Err(ParseError::UnexpectedAttribute("member")),
            }
        }

        Ok(block)
    }
}
