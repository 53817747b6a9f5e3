//! At most one outstanding request per surface

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceStatus {
    #[default]
    Idle,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    LoadMore,
    Refine,
    Extract,
    Chat,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Search => "search",
            RequestKind::LoadMore => "load-more",
            RequestKind::Refine => "refine",
            RequestKind::Extract => "extract",
            RequestKind::Chat => "chat",
        };
        f.write_str(name)
    }
}

/// Proof that a request was admitted.
///
/// Deliberately not `Clone`: one ticket completes one request.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    kind: RequestKind,
}

impl Ticket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// What happened to a completed request
#[derive(Debug)]
pub enum Completion {
    /// The result was written to the transcript
    Committed,
    /// The request failed; the transcript reflects the failure where the
    /// operation calls for it
    Failed(Error),
    /// The surface moved on (new conversation, teardown) before the result
    /// arrived; it was dropped
    Stale,
}

impl Completion {
    pub fn is_committed(&self) -> bool {
        matches!(self, Completion::Committed)
    }

    pub fn into_result(self) -> Result<bool> {
        match self {
            Completion::Committed => Ok(true),
            Completion::Stale => Ok(false),
            Completion::Failed(err) => Err(err),
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    status: SurfaceStatus,
    generation: u64,
    in_flight: Option<RequestKind>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SurfaceStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SurfaceStatus::Pending
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    /// Admit a request, or reject it while another is outstanding
    pub fn begin(&mut self, kind: RequestKind) -> Result<Ticket> {
        if self.is_loading() {
            tracing::debug!(%kind, pending = ?self.in_flight, "request rejected while busy");
            return Err(Error::Busy);
        }
        self.status = SurfaceStatus::Pending;
        self.in_flight = Some(kind);
        Ok(Ticket {
            generation: self.generation,
            kind,
        })
    }

    /// Whether `ticket` still belongs to the current generation
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Release the surface. Returns `false` for a stale ticket, which
    /// leaves the status alone.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(kind = %ticket.kind, "discarding stale completion");
            return false;
        }
        self.status = SurfaceStatus::Idle;
        self.in_flight = None;
        true
    }

    /// Orphan every outstanding ticket and return to idle
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.status = SurfaceStatus::Idle;
        self.in_flight = None;
    }
}
