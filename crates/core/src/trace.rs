//! Diagnostic APDU tracing
//!
//! Every exchange reports its bytes at four checkpoints through `tracing`
//! events. An [`ApduTrace`] additionally writes them as hex lines to a sink
//! of the caller's choosing while it is enabled. Writing is best effort: a
//! failing sink is logged and otherwise ignored.

use std::fmt;
use std::io::{self, Write};

use derive_more::{Deref, DerefMut};
use tracing::{debug, trace};

/// Point of an exchange at which bytes are observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// Plaintext command as given by the caller
    Command,
    /// Wrapped and addressed command as transmitted
    WrappedCommand,
    /// Raw response as received from the transport
    Response,
    /// Response after secure messaging has been removed
    UnwrappedResponse,
}

impl Checkpoint {
    /// Prefix written before the hex bytes
    pub const fn label(self) -> &'static str {
        match self {
            Self::Command => "Command -->",
            Self::WrappedCommand => "Wrapped command -->",
            Self::Response => "Response <--",
            Self::UnwrappedResponse => "Unwrapped response <--",
        }
    }
}

/// APDU trace configuration with an owned sink
pub struct ApduTrace {
    enabled: bool,
    sink: Option<Box<dyn Write + Send>>,
}

impl fmt::Debug for ApduTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApduTrace")
            .field("enabled", &self.enabled)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for ApduTrace {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ApduTrace {
    /// A trace that writes nothing
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            sink: None,
        }
    }

    /// An enabled trace writing to `sink`
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Self {
            enabled: true,
            sink: Some(Box::new(sink)),
        }
    }

    /// An enabled trace writing to standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Whether lines are currently written
    pub const fn is_enabled(&self) -> bool {
        self.enabled && self.sink.is_some()
    }

    /// Enable or disable writing, keeping the sink
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Enable writing
    pub const fn enable(&mut self) {
        self.set_enabled(true);
    }

    /// Disable writing
    pub const fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// Replace the sink, returning the previous one
    pub fn set_sink<W: Write + Send + 'static>(
        &mut self,
        sink: W,
    ) -> Option<Box<dyn Write + Send>> {
        self.sink.replace(Box::new(sink))
    }

    /// Remove the sink, flushing it first
    pub fn take_sink(&mut self) -> Option<Box<dyn Write + Send>> {
        let mut sink = self.sink.take()?;
        if let Err(e) = sink.flush() {
            debug!(error = %e, "Failed to flush APDU trace sink");
        }
        Some(sink)
    }

    /// Temporarily enable or disable writing
    ///
    /// The previous state is restored when the returned guard is dropped.
    pub fn scoped(&mut self, enabled: bool) -> TraceScope<'_> {
        let previous = self.enabled;
        self.enabled = enabled;
        TraceScope {
            trace: self,
            previous,
        }
    }

    /// Record bytes observed at a checkpoint
    pub fn record(&mut self, checkpoint: Checkpoint, bytes: &[u8]) {
        let hex = hex::encode_upper(bytes);
        trace!(checkpoint = checkpoint.label(), bytes = %hex, "APDU");

        if !self.enabled {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(sink, "{} {}", checkpoint.label(), hex).and_then(|()| sink.flush())
        {
            debug!(error = %e, "Failed to write APDU trace");
        }
    }
}

/// Guard returned by [`ApduTrace::scoped`]
#[derive(Deref, DerefMut)]
pub struct TraceScope<'a> {
    #[deref(forward)]
    #[deref_mut(forward)]
    trace: &'a mut ApduTrace,
    previous: bool,
}

impl fmt::Debug for TraceScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceScope")
            .field("trace", &self.trace)
            .field("previous", &self.previous)
            .finish()
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        self.trace.enabled = self.previous;
    }
}
