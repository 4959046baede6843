//! Progressive decoder
//!
//! Accepts the stream in chunks of any size. Bytes are buffered only until
//! the element they belong to is complete; each complete element is decoded
//! once, dropped from the buffer and routed into the frame stack. Container
//! frames stay open across calls until their last child arrives.

use bytes::{Buf, BytesMut};
use smallvec::SmallVec;
use tracing::{debug, trace};
use whiteshark_format::constants::HEADER_LEN;
use whiteshark_format::{ByteReader, Identifier, Result, SharkError, StreamHeader};

use crate::container::{Container, Placement};
use crate::element::{Element, Session};
use crate::lookahead::element_available;
use crate::options::DecodeOptions;
use crate::types::Collaborators;
use crate::value::Value;

/// Lifecycle of a progressive decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Fewer than 12 header bytes received
    AwaitingHeader,
    /// Header accepted, value in progress
    Running,
    /// Value delivered; terminal
    Complete,
    /// An error was reported; terminal
    Failed,
}

/// Outcome of feeding bytes to the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// More bytes are needed
    Incomplete,
    /// The stream's value is complete
    Complete(Value),
}

impl Progress {
    /// True when more bytes are needed
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Progress::Incomplete)
    }

    /// Completed value, if any
    pub fn into_value(self) -> Option<Value> {
        match self {
            Progress::Complete(value) => Some(value),
            Progress::Incomplete => None,
        }
    }
}

/// Incremental decoder driven by [`update`](Self::update) and
/// [`finalize`](Self::finalize)
pub struct ProgressiveDecoder<'c, C: ?Sized> {
    collaborators: &'c C,
    identifier: Identifier,
    state: DecoderState,
    buffer: BytesMut,
    session: Session,
    frames: SmallVec<[Container; 8]>,
}

impl<'c, C: Collaborators + ?Sized> ProgressiveDecoder<'c, C> {
    /// Decoder expecting a stream tagged with `identifier`
    pub fn new(identifier: impl Into<Identifier>, collaborators: &'c C) -> Self {
        Self::with_options(identifier, collaborators, DecodeOptions::default())
    }

    /// Decoder with explicit options
    pub fn with_options(
        identifier: impl Into<Identifier>,
        collaborators: &'c C,
        options: DecodeOptions,
    ) -> Self {
        Self {
            collaborators,
            identifier: identifier.into(),
            state: DecoderState::AwaitingHeader,
            buffer: BytesMut::new(),
            session: Session::new(options.limits),
            frames: SmallVec::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes received but not yet decoded
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Containers still waiting for children
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Append `bytes` and decode as much as is available
    pub fn update(&mut self, bytes: &[u8]) -> Result<Progress> {
        match self.state {
            DecoderState::Complete => {
                return Err(SharkError::InvalidState(
                    "decoder already delivered its value".to_string(),
                ))
            }
            DecoderState::Failed => {
                return Err(SharkError::InvalidState(
                    "decoder failed earlier".to_string(),
                ))
            }
            DecoderState::AwaitingHeader | DecoderState::Running => {}
        }

        self.buffer.extend_from_slice(bytes);
        match self.drain() {
            Ok(progress) => {
                if !progress.is_incomplete() {
                    self.state = DecoderState::Complete;
                    debug!(trailing = self.buffer.len(), "stream decoded");
                }
                Ok(progress)
            }
            Err(err) => {
                self.state = DecoderState::Failed;
                debug!(error = %err, "progressive decoding failed");
                Err(err)
            }
        }
    }

    /// Append the last `bytes`; the value must be complete afterwards
    pub fn finalize(&mut self, bytes: &[u8]) -> Result<Value> {
        match self.update(bytes)? {
            Progress::Complete(value) => Ok(value),
            Progress::Incomplete => {
                self.state = DecoderState::Failed;
                Err(SharkError::IncompleteStream {
                    buffered: self.buffer.len(),
                    open_frames: self.frames.len(),
                })
            }
        }
    }

    fn drain(&mut self) -> Result<Progress> {
        if self.state == DecoderState::AwaitingHeader {
            if self.buffer.len() < HEADER_LEN {
                return Ok(Progress::Incomplete);
            }
            let header = StreamHeader::decode(&self.buffer, self.identifier)?;
            self.buffer.advance(HEADER_LEN);
            self.session.begin(header.options);
            self.state = DecoderState::Running;
            debug!(
                identifier = %header.identifier,
                objects_as_generics = header.options.objects_as_generics,
                "header read"
            );
        }

        while element_available(&self.buffer, 0, self.session.limits())? {
            let mut reader = ByteReader::new(&self.buffer);
            let element = self.session.read_element(&mut reader, self.collaborators)?;
            let consumed = reader.position();
            self.buffer.advance(consumed);

            if let Some(value) = self.route(element)? {
                return Ok(Progress::Complete(value));
            }
        }
        Ok(Progress::Incomplete)
    }

    /// Route one element into the frame stack; returns the root value once done
    fn route(&mut self, element: Element) -> Result<Option<Value>> {
        let container = match element {
            Element::Leaf(value) => return self.deliver(value),
            Element::Property(name) => {
                let Some(top) = self.frames.last_mut() else {
                    return Err(SharkError::UnexpectedShape(format!(
                        "property '{}' outside of an object",
                        name
                    )));
                };
                top.accept_name(name)?;
                return Ok(None);
            }
            Element::Array {
                element_type,
                count,
            } => Container::array(element_type, count, self.placement()),
            Element::Object { kind, count } => {
                Container::object(kind, count, self.placement(), self.collaborators)?
            }
        };

        self.session.limits().check_depth(self.frames.len() + 1)?;
        if container.is_complete() {
            return self.deliver(container.finish());
        }
        self.frames.push(container);
        trace!(depth = self.frames.len(), "frame pushed");
        Ok(None)
    }

    fn placement(&self) -> Placement {
        self.frames.last().map_or(Placement::ROOT, Container::placement)
    }

    /// Assign a finished value upwards, popping every frame it completes
    fn deliver(&mut self, mut value: Value) -> Result<Option<Value>> {
        loop {
            let Some(mut top) = self.frames.pop() else {
                return Ok(Some(value));
            };
            top.assign(value)?;
            if !top.is_complete() {
                self.frames.push(top);
                return Ok(None);
            }
            trace!(depth = self.frames.len(), "frame popped");
            value = top.finish();
        }
    }
}
