//! Command Handler Module
//!
//! This module implements the command surface of portset. It receives
//! decoded command frames, validates their attribute blocks against the
//! active set, executes the operation, and builds the response frame.
//!
//! ## Supported Commands
//!
//! - `CREATE port port_to [timeout]` - create the set (reversed bounds are
//!   swapped; a timeout selects the expiring variant)
//! - `ADD port [port_to] [timeout] [lineno]` - add a port or inclusive range
//! - `DEL port [port_to] [lineno]` - delete a port or inclusive range
//! - `TEST port` - membership test (Ok = present, NotFound = absent)
//! - `HEAD` - bounds, default timeout, references, memory footprint
//! - `LIST [cursor]` - one bounded page of members
//! - `FLUSH` - clear all elements
//! - `DESTROY` - stop the sweeper and drop the set
//!
//! ## Validation Order
//!
//! Add, delete and test share one validation pipeline, checked before any
//! element is touched:
//!
//! 1. The attribute block must decode cleanly (duplicates, widths, kinds).
//! 2. A timeout attribute on a set without timeout support is rejected.
//! 3. The starting port must lie inside the set bounds.
//! 4. A descending `port`/`port_to` pair is swapped, and the new low end
//!    must still lie inside the bounds.
//! 5. The resolved high end must not pass the upper bound.
//!
//! Test then uses only the first port; add and delete walk the resolved
//! range in ascending order. All bound arithmetic runs in `u32` so a
//! full-width range cannot wrap during the swap-and-check dance.
//!
//! ## Range Conflicts
//!
//! A range add meeting an element that is already present (or a range
//! delete meeting an absent one) absorbs the conflict and keeps walking;
//! the strict frame flag turns such conflicts into hard errors instead.
//! Either way there is no rollback: elements changed before an abort stay
//! changed. Single-element operations always surface the conflict.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::protocol::{Attr, AttrBlock, CommandFrame, Response, SetOp, Status, FLAG_STRICT};
use crate::set::{ListCursor, ListOutcome, MemberRecord, PortSet, SetError, SetParams};

/// Default budget for one listing reply's attribute bytes.
const DEFAULT_PAGE_BYTES: usize = 4096;

/// Executes commands against the service's active set.
///
/// The handler owns the single active set slot; cloning shares it, so each
/// connection task can hold its own handle to the same set.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The one set this service manages; `None` until a create succeeds.
    active: Arc<RwLock<Option<Arc<PortSet>>>>,
    /// Attribute-byte budget for a listing page.
    page_bytes: usize,
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler {
    /// Creates a handler with the default listing page budget.
    pub fn new() -> Self {
        Self::with_page_limit(DEFAULT_PAGE_BYTES)
    }

    /// Creates a handler whose listing pages hold at most `page_bytes` of
    /// serialized attributes.
    pub fn with_page_limit(page_bytes: usize) -> Self {
        Self {
            active: Arc::new(RwLock::new(None)),
            page_bytes: page_bytes.min(crate::protocol::MAX_ATTR_BYTES),
        }
    }

    fn active_set(&self) -> Option<Arc<PortSet>> {
        self.active.read().unwrap().clone()
    }

    /// Executes one command frame and returns the response to send back.
    pub async fn execute(&self, frame: CommandFrame) -> Response {
        let block = match AttrBlock::decode(&frame.attrs) {
            Ok(block) => block,
            Err(err) => {
                warn!(op = ?frame.op, error = %err, "malformed attribute block");
                return Response::error(Status::Protocol);
            }
        };

        let result = match frame.op {
            SetOp::Create => self.cmd_create(&block),
            SetOp::Destroy => self.cmd_destroy().await,
            op => match self.active_set() {
                None => Err(SetError::DoesNotExist),
                Some(set) => match op {
                    SetOp::Flush => {
                        set.flush();
                        Ok(Response::ok())
                    }
                    SetOp::Add => self.cmd_add(&set, &block, frame.flags),
                    SetOp::Del => self.cmd_del(&set, &block, frame.flags),
                    SetOp::Test => self.cmd_test(&set, &block),
                    SetOp::Head => Ok(self.cmd_head(&set)),
                    SetOp::List => self.cmd_list(&set, &block),
                    SetOp::Create | SetOp::Destroy => unreachable!("handled above"),
                },
            },
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                debug!(op = ?frame.op, error = %err, "command failed");
                error_response(&err, block.lineno)
            }
        }
    }

    /// CREATE: allocate the set, or recognize a no-op recreate.
    fn cmd_create(&self, block: &AttrBlock) -> Result<Response, SetError> {
        let (Some(first_port), Some(last_port)) = (block.port, block.port_to) else {
            return Err(SetError::Protocol(
                "create requires port and port_to attributes".to_string(),
            ));
        };
        let params = SetParams {
            first_port,
            last_port,
            timeout: block.timeout,
        };

        let mut active = self.active.write().unwrap();
        if let Some(existing) = active.as_ref() {
            // Recreating with identical parameters is a no-op, not an error.
            if existing.same_params(&params) {
                return Ok(Response::ok());
            }
            return Err(SetError::AlreadyExists);
        }

        *active = Some(PortSet::create(params)?);
        Ok(Response::ok())
    }

    /// DESTROY: take the set out of service and join its sweeper.
    async fn cmd_destroy(&self) -> Result<Response, SetError> {
        let set = self.active.write().unwrap().take();
        match set {
            None => Err(SetError::DoesNotExist),
            Some(set) => {
                set.destroy().await;
                Ok(Response::ok())
            }
        }
    }

    fn cmd_add(
        &self,
        set: &PortSet,
        block: &AttrBlock,
        flags: u8,
    ) -> Result<Response, SetError> {
        let port = checked_port(set, block)?;
        let (first, last) = resolve_span(set, port, block.port_to)?;
        let absorb = block.port_to.is_some() && flags & FLAG_STRICT == 0;

        set.add(first, last, block.timeout, absorb)?;
        Ok(Response::ok())
    }

    fn cmd_del(
        &self,
        set: &PortSet,
        block: &AttrBlock,
        flags: u8,
    ) -> Result<Response, SetError> {
        let port = checked_port(set, block)?;
        let (first, last) = resolve_span(set, port, block.port_to)?;
        let absorb = block.port_to.is_some() && flags & FLAG_STRICT == 0;

        set.remove(first, last, absorb)?;
        Ok(Response::ok())
    }

    /// TEST: only the first port matters; a range is not meaningful here.
    fn cmd_test(&self, set: &PortSet, block: &AttrBlock) -> Result<Response, SetError> {
        let port = checked_port(set, block)?;
        if set.test(port)? {
            Ok(Response::ok())
        } else {
            Err(SetError::DoesNotExist)
        }
    }

    fn cmd_head(&self, set: &PortSet) -> Response {
        let info = set.head();
        let mut attrs = vec![Attr::Port(info.first_port), Attr::PortTo(info.last_port)];
        if let Some(timeout) = info.timeout {
            attrs.push(Attr::Timeout(timeout));
        }
        attrs.push(Attr::References(info.references));
        attrs.push(Attr::MemSize(info.mem_size));
        Response::with_attrs(Status::Ok, &attrs)
    }

    /// LIST: one page of member records, bounded by the page budget.
    fn cmd_list(&self, set: &PortSet, block: &AttrBlock) -> Result<Response, SetError> {
        let cursor = block
            .cursor
            .map(|id| ListCursor::at(u32::from(id)))
            .unwrap_or_default();

        // Room for the trailing cursor attribute is reserved up front, so
        // an almost-full page can still say where to resume.
        let reserved = Attr::Cursor(0).encoded_len();
        let budget = self.page_bytes.saturating_sub(reserved);

        let mut attrs: Vec<Attr> = Vec::new();
        let mut used = 0usize;
        let outcome = set.list_page(cursor, |record| {
            let member = member_attr(record);
            let len = member.encoded_len();
            if used + len > budget {
                return false;
            }
            used += len;
            attrs.push(member);
            true
        });

        match outcome {
            ListOutcome::Finished => Ok(Response::with_attrs(Status::Ok, &attrs)),
            ListOutcome::More(next) => {
                attrs.push(Attr::Cursor(next.position() as u16));
                Ok(Response::with_attrs(Status::Ok, &attrs))
            }
            ListOutcome::PageFull => Err(SetError::Protocol(
                "listing page budget cannot hold a single record".to_string(),
            )),
        }
    }
}

/// Shared head of the add/delete/test validation pipeline.
fn checked_port(set: &PortSet, block: &AttrBlock) -> Result<u16, SetError> {
    let port = block
        .port
        .ok_or_else(|| SetError::Protocol("missing port attribute".to_string()))?;
    if block.timeout.is_some() && set.default_timeout().is_none() {
        return Err(SetError::Protocol(
            "timeout supplied to a set without timeout support".to_string(),
        ));
    }
    if !set.range().contains(port) {
        return Err(SetError::OutOfRange);
    }
    Ok(port)
}

/// Resolves `port`/`port_to` into an ascending span within the set bounds.
///
/// Arithmetic runs in `u32`; a descending pair is swapped and the new low
/// end re-validated before the upper bound is checked.
fn resolve_span(set: &PortSet, port: u16, port_to: Option<u16>) -> Result<(u16, u16), SetError> {
    let range = set.range();
    let mut first = u32::from(port);
    let mut last = match port_to {
        Some(port_to) => u32::from(port_to),
        None => first,
    };

    if first > last {
        std::mem::swap(&mut first, &mut last);
        if first < u32::from(range.first_port()) {
            return Err(SetError::OutOfRange);
        }
    }
    if last > u32::from(range.last_port()) {
        return Err(SetError::OutOfRange);
    }

    Ok((first as u16, last as u16))
}

fn member_attr(record: &MemberRecord) -> Attr {
    let mut inner = vec![Attr::Port(record.port)];
    if let Some(remaining) = record.remaining {
        inner.push(Attr::Timeout(remaining));
    }
    Attr::Member(inner)
}

fn error_response(err: &SetError, lineno: Option<u32>) -> Response {
    let status = match err {
        SetError::OutOfRange => Status::Range,
        SetError::Protocol(_) => Status::Protocol,
        SetError::AlreadyExists => Status::Exists,
        SetError::DoesNotExist => Status::NotFound,
        SetError::AllocationFailed => Status::NoMemory,
    };
    match lineno {
        Some(lineno) => Response::with_attrs(status, &[Attr::Lineno(lineno)]),
        None => Response::error(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{decode_attrs, CommandFrame};

    fn frame(op: SetOp, attrs: &[Attr]) -> CommandFrame {
        CommandFrame::new(op, 0, attrs)
    }

    fn strict_frame(op: SetOp, attrs: &[Attr]) -> CommandFrame {
        CommandFrame::new(op, FLAG_STRICT, attrs)
    }

    async fn handler_with_set(first: u16, last: u16, timeout: Option<u32>) -> CommandHandler {
        let handler = CommandHandler::new();
        let mut attrs = vec![Attr::Port(first), Attr::PortTo(last)];
        if let Some(timeout) = timeout {
            attrs.push(Attr::Timeout(timeout));
        }
        let response = handler.execute(frame(SetOp::Create, &attrs)).await;
        assert_eq!(response.status, Status::Ok);
        handler
    }

    /// Decodes the member ports (and cursor, if any) out of a list reply.
    fn decode_page(response: &Response) -> (Vec<u16>, Option<u16>) {
        assert_eq!(response.status, Status::Ok);
        let mut ports = Vec::new();
        let mut cursor = None;
        for attr in decode_attrs(&response.attrs).unwrap() {
            match attr {
                Attr::Member(inner) => match inner.first() {
                    Some(Attr::Port(port)) => ports.push(*port),
                    other => panic!("member record starts with {:?}", other),
                },
                Attr::Cursor(id) => cursor = Some(id),
                other => panic!("unexpected list attribute {:?}", other),
            }
        }
        (ports, cursor)
    }

    #[tokio::test]
    async fn test_commands_before_create_answer_not_found() {
        let handler = CommandHandler::new();
        for op in [SetOp::Add, SetOp::Del, SetOp::Test, SetOp::Head, SetOp::List, SetOp::Flush] {
            let attrs = [Attr::Port(1)];
            let response = handler.execute(frame(op, &attrs)).await;
            assert_eq!(response.status, Status::NotFound, "{:?}", op);
        }
    }

    #[tokio::test]
    async fn test_create_requires_both_bounds() {
        let handler = CommandHandler::new();
        let response = handler.execute(frame(SetOp::Create, &[Attr::Port(1)])).await;
        assert_eq!(response.status, Status::Protocol);
    }

    #[tokio::test]
    async fn test_create_normalizes_reversed_bounds() {
        let handler = CommandHandler::new();
        let response = handler
            .execute(frame(SetOp::Create, &[Attr::Port(2000), Attr::PortTo(1000)]))
            .await;
        assert_eq!(response.status, Status::Ok);

        let head = handler.execute(frame(SetOp::Head, &[])).await;
        let attrs = decode_attrs(&head.attrs).unwrap();
        assert_eq!(attrs[0], Attr::Port(1000));
        assert_eq!(attrs[1], Attr::PortTo(2000));
    }

    #[tokio::test]
    async fn test_recreate_same_params_is_noop() {
        let handler = handler_with_set(0, 100, None).await;

        handler
            .execute(frame(SetOp::Add, &[Attr::Port(7)]))
            .await;

        // Identical parameters: accepted, membership untouched.
        let response = handler
            .execute(frame(SetOp::Create, &[Attr::Port(0), Attr::PortTo(100)]))
            .await;
        assert_eq!(response.status, Status::Ok);
        let test = handler.execute(frame(SetOp::Test, &[Attr::Port(7)])).await;
        assert_eq!(test.status, Status::Ok);

        // Different parameters: refused.
        let response = handler
            .execute(frame(SetOp::Create, &[Attr::Port(0), Attr::PortTo(200)]))
            .await;
        assert_eq!(response.status, Status::Exists);
    }

    #[tokio::test]
    async fn test_add_test_del_roundtrip() {
        let handler = handler_with_set(0, 1000, None).await;

        let response = handler.execute(frame(SetOp::Add, &[Attr::Port(80)])).await;
        assert_eq!(response.status, Status::Ok);

        let response = handler.execute(frame(SetOp::Test, &[Attr::Port(80)])).await;
        assert_eq!(response.status, Status::Ok);

        let response = handler.execute(frame(SetOp::Del, &[Attr::Port(80)])).await;
        assert_eq!(response.status, Status::Ok);

        let response = handler.execute(frame(SetOp::Test, &[Attr::Port(80)])).await;
        assert_eq!(response.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_single_element_conflicts_surface() {
        let handler = handler_with_set(0, 100, None).await;

        handler.execute(frame(SetOp::Add, &[Attr::Port(5)])).await;
        let response = handler.execute(frame(SetOp::Add, &[Attr::Port(5)])).await;
        assert_eq!(response.status, Status::Exists);

        let response = handler.execute(frame(SetOp::Del, &[Attr::Port(6)])).await;
        assert_eq!(response.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_range_add_and_del_absorb_conflicts() {
        let handler = handler_with_set(0, 100, None).await;

        handler.execute(frame(SetOp::Add, &[Attr::Port(15)])).await;

        // 15 is already present; the range add continues past it.
        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(10), Attr::PortTo(20)]))
            .await;
        assert_eq!(response.status, Status::Ok);
        for port in 10..=20 {
            let test = handler.execute(frame(SetOp::Test, &[Attr::Port(port)])).await;
            assert_eq!(test.status, Status::Ok, "port {}", port);
        }

        // A wider delete absorbs the absent edges.
        let response = handler
            .execute(frame(SetOp::Del, &[Attr::Port(5), Attr::PortTo(25)]))
            .await;
        assert_eq!(response.status, Status::Ok);
        for port in 5..=25 {
            let test = handler.execute(frame(SetOp::Test, &[Attr::Port(port)])).await;
            assert_eq!(test.status, Status::NotFound, "port {}", port);
        }
    }

    #[tokio::test]
    async fn test_strict_flag_surfaces_range_conflicts() {
        let handler = handler_with_set(0, 100, None).await;

        handler.execute(frame(SetOp::Add, &[Attr::Port(15)])).await;
        let response = handler
            .execute(strict_frame(SetOp::Add, &[Attr::Port(10), Attr::PortTo(20)]))
            .await;
        assert_eq!(response.status, Status::Exists);

        // No rollback: the prefix before the conflict is in.
        for port in 10..15 {
            let test = handler.execute(frame(SetOp::Test, &[Attr::Port(port)])).await;
            assert_eq!(test.status, Status::Ok, "port {}", port);
        }
        let test = handler.execute(frame(SetOp::Test, &[Attr::Port(16)])).await;
        assert_eq!(test.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_descending_range_swaps() {
        let handler = handler_with_set(0, 100, None).await;

        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(50), Attr::PortTo(10)]))
            .await;
        assert_eq!(response.status, Status::Ok);

        for port in [10u16, 30, 50] {
            let test = handler.execute(frame(SetOp::Test, &[Attr::Port(port)])).await;
            assert_eq!(test.status, Status::Ok, "port {}", port);
        }
        let test = handler.execute(frame(SetOp::Test, &[Attr::Port(9)])).await;
        assert_eq!(test.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_swapped_low_end_is_revalidated() {
        // After swapping, 10 is below the set's first port: a range error,
        // detected before anything mutates.
        let handler = handler_with_set(20, 100, None).await;

        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(50), Attr::PortTo(10)]))
            .await;
        assert_eq!(response.status, Status::Range);

        let test = handler.execute(frame(SetOp::Test, &[Attr::Port(50)])).await;
        assert_eq!(test.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_range_upper_bound_checked() {
        let handler = handler_with_set(0, 100, None).await;
        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(90), Attr::PortTo(150)]))
            .await;
        assert_eq!(response.status, Status::Range);
    }

    #[tokio::test]
    async fn test_out_of_range_port() {
        let handler = handler_with_set(20, 100, None).await;
        for op in [SetOp::Add, SetOp::Del, SetOp::Test] {
            let response = handler.execute(frame(op, &[Attr::Port(10)])).await;
            assert_eq!(response.status, Status::Range, "{:?}", op);
        }
    }

    #[tokio::test]
    async fn test_timeout_attr_rejected_on_plain_set() {
        let handler = handler_with_set(0, 100, None).await;
        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(5), Attr::Timeout(60)]))
            .await;
        assert_eq!(response.status, Status::Protocol);

        let response = handler
            .execute(frame(SetOp::Test, &[Attr::Port(5), Attr::Timeout(60)]))
            .await;
        assert_eq!(response.status, Status::Protocol);
    }

    #[tokio::test]
    async fn test_error_echoes_lineno() {
        let handler = handler_with_set(0, 100, None).await;

        handler.execute(frame(SetOp::Add, &[Attr::Port(5)])).await;
        let response = handler
            .execute(frame(SetOp::Add, &[Attr::Port(5), Attr::Lineno(42)]))
            .await;

        assert_eq!(response.status, Status::Exists);
        assert_eq!(decode_attrs(&response.attrs).unwrap(), vec![Attr::Lineno(42)]);
    }

    #[tokio::test]
    async fn test_head_on_expiring_set() {
        let handler = handler_with_set(100, 200, Some(300)).await;

        let response = handler.execute(frame(SetOp::Head, &[])).await;
        let attrs = decode_attrs(&response.attrs).unwrap();
        assert_eq!(attrs[0], Attr::Port(100));
        assert_eq!(attrs[1], Attr::PortTo(200));
        assert_eq!(attrs[2], Attr::Timeout(300));
        assert!(matches!(attrs[3], Attr::References(0)));
        assert!(matches!(attrs[4], Attr::MemSize(_)));

        handler.execute(frame(SetOp::Destroy, &[])).await;
    }

    #[tokio::test]
    async fn test_list_empty_set() {
        let handler = handler_with_set(0, 100, None).await;
        let response = handler.execute(frame(SetOp::List, &[])).await;
        let (ports, cursor) = decode_page(&response);
        assert!(ports.is_empty());
        assert_eq!(cursor, None);
    }

    #[tokio::test]
    async fn test_list_single_page() {
        let handler = handler_with_set(0, 1000, None).await;
        handler
            .execute(frame(SetOp::Add, &[Attr::Port(100), Attr::PortTo(104)]))
            .await;

        let response = handler.execute(frame(SetOp::List, &[])).await;
        let (ports, cursor) = decode_page(&response);
        assert_eq!(ports, vec![100, 101, 102, 103, 104]);
        assert_eq!(cursor, None);
    }

    #[tokio::test]
    async fn test_list_pages_concatenate_without_loss() {
        // Each member record is 10 bytes; a 64-byte budget holds a handful
        // per page, forcing several continuation rounds.
        let handler = CommandHandler::with_page_limit(64);
        handler
            .execute(frame(SetOp::Create, &[Attr::Port(0), Attr::PortTo(500)]))
            .await;
        handler
            .execute(frame(SetOp::Add, &[Attr::Port(10), Attr::PortTo(40)]))
            .await;

        let mut collected = Vec::new();
        let mut cursor: Option<u16> = None;
        let mut pages = 0;
        loop {
            let attrs: Vec<Attr> = cursor.map(Attr::Cursor).into_iter().collect();
            let response = handler.execute(frame(SetOp::List, &attrs)).await;
            let (ports, next) = decode_page(&response);
            collected.extend(ports);
            pages += 1;
            assert!(pages < 20, "listing does not terminate");
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert!(pages > 1);
        assert_eq!(collected, (10u16..=40).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_list_page_too_small_for_one_record() {
        let handler = CommandHandler::with_page_limit(8);
        handler
            .execute(frame(SetOp::Create, &[Attr::Port(0), Attr::PortTo(100)]))
            .await;
        handler.execute(frame(SetOp::Add, &[Attr::Port(1)])).await;

        let response = handler.execute(frame(SetOp::List, &[])).await;
        assert_eq!(response.status, Status::Protocol);
    }

    #[tokio::test]
    async fn test_list_expiring_set_reports_remaining() {
        let handler = handler_with_set(0, 100, Some(120)).await;
        handler.execute(frame(SetOp::Add, &[Attr::Port(9)])).await;

        let response = handler.execute(frame(SetOp::List, &[])).await;
        let attrs = decode_attrs(&response.attrs).unwrap();
        match &attrs[0] {
            Attr::Member(inner) => {
                assert_eq!(inner[0], Attr::Port(9));
                match inner[1] {
                    Attr::Timeout(left) => assert!(left > 110 && left <= 120),
                    ref other => panic!("expected remaining timeout, got {:?}", other),
                }
            }
            other => panic!("expected member record, got {:?}", other),
        }

        handler.execute(frame(SetOp::Destroy, &[])).await;
    }

    #[tokio::test]
    async fn test_flush_clears_members() {
        let handler = handler_with_set(0, 100, None).await;
        handler
            .execute(frame(SetOp::Add, &[Attr::Port(0), Attr::PortTo(100)]))
            .await;

        let response = handler.execute(frame(SetOp::Flush, &[])).await;
        assert_eq!(response.status, Status::Ok);

        let (ports, _) = decode_page(&handler.execute(frame(SetOp::List, &[])).await);
        assert!(ports.is_empty());

        // A fresh add behaves as on a newly created set.
        let response = handler.execute(frame(SetOp::Add, &[Attr::Port(50)])).await;
        assert_eq!(response.status, Status::Ok);
    }

    #[tokio::test]
    async fn test_destroy_retires_the_set() {
        let handler = handler_with_set(0, 100, Some(60)).await;

        let response = handler.execute(frame(SetOp::Destroy, &[])).await;
        assert_eq!(response.status, Status::Ok);

        let response = handler.execute(frame(SetOp::Add, &[Attr::Port(1)])).await;
        assert_eq!(response.status, Status::NotFound);

        let response = handler.execute(frame(SetOp::Destroy, &[])).await;
        assert_eq!(response.status, Status::NotFound);
    }
}
