//! Optional structured tracing.
//!
//! Per-parser trace output is a debugging aid, not part of the decode
//! contract, so it is injected rather than unconditional: [`Tracer`] is
//! the hook, [`LogTracer`] the default non-trivial implementation,
//! routed through the `log` facade the way any logging in this pack's
//! crates is routed.

use std::fmt;

/// One parser invocation, emitted after it completes.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    pub parser: &'a str,
    pub position: usize,
    pub outcome: TraceOutcome<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum TraceOutcome<'a> {
    Ok,
    Err(&'a str),
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            TraceOutcome::Ok => write!(f, "{:<24} at position {}: ok", self.parser, self.position),
            TraceOutcome::Err(msg) => {
                write!(f, "{:<24} at position {}: err({msg})", self.parser, self.position)
            }
        }
    }
}

pub trait Tracer {
    fn record(&self, event: TraceEvent<'_>);
}

/// Discards every event. The default when no tracer is supplied.
pub struct NullTracer;

impl Tracer for NullTracer {
    fn record(&self, _event: TraceEvent<'_>) {}
}

/// Emits every event through `log::trace!`.
pub struct LogTracer;

impl Tracer for LogTracer {
    fn record(&self, event: TraceEvent<'_>) {
        log::trace!("{event}");
    }
}
