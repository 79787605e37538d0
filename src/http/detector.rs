//! Incremental detection of a complete request head.
//!
//! The detector never interprets tokens; it only tracks enough structure to
//! know when the bytes received so far are worth handing to the parser:
//!
//! ```text
//! METHOD SP URI CRLF                      -> complete (HTTP/0.9)
//! METHOD SP URI SP VERSION CRLF
//! *( header-line CRLF ) CRLF              -> complete (HTTP/1.x)
//! ```
//!
//! Input may arrive in fragments of any size. The state is carried between
//! calls to [`RequestDetector::feed`], so splitting the same byte sequence at
//! any boundary gives the same verdict at the same offset.

/// Result of feeding bytes to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More bytes are required before a parse can be attempted.
    NeedMore,
    /// The request head ends at the given offset (exclusive) of the
    /// accumulated input.
    Complete(usize),
    /// The request line ended before a method and URI were seen. The head
    /// ends at the given offset and the parser will report the error.
    Malformed(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Skipping blank lines and whitespace before the method.
    LeadingLines,
    Method,
    BeforeUri,
    Uri,
    BeforeVersion,
    Version,
    /// Version seen; waiting for the end of the request line.
    LineEnd,
    /// Scanning header lines; `empty` is true at the start of a line.
    HeaderLine { empty: bool },
    Done(Verdict),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Complete,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    LineFeed,
    CarriageReturn,
    Other,
}

fn classify(byte: u8) -> Class {
    match byte {
        b' ' | b'\t' => Class::Space,
        b'\n' => Class::LineFeed,
        b'\r' => Class::CarriageReturn,
        _ => Class::Other,
    }
}

/// Resumable automaton deciding when a request head has fully arrived.
#[derive(Debug, Clone)]
pub struct RequestDetector {
    state: State,
    consumed: usize,
    versioned: bool,
}

impl Default for RequestDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDetector {
    pub fn new() -> Self {
        Self {
            state: State::LeadingLines,
            consumed: 0,
            versioned: false,
        }
    }

    /// Feeds the next fragment of input.
    ///
    /// Once a verdict is reached further input is ignored and the same
    /// verdict is returned again.
    pub fn feed(&mut self, chunk: &[u8]) -> Progress {
        for &byte in chunk {
            if matches!(self.state, State::Done(_)) {
                break;
            }
            self.state = step(self.state, classify(byte));
            self.consumed += 1;
            if matches!(self.state, State::HeaderLine { .. }) {
                self.versioned = true;
            }
        }
        self.progress()
    }

    /// Current verdict without consuming anything.
    pub fn progress(&self) -> Progress {
        match self.state {
            State::Done(Verdict::Complete) => Progress::Complete(self.consumed),
            State::Done(Verdict::Malformed) => Progress::Malformed(self.consumed),
            _ => Progress::NeedMore,
        }
    }

    /// Whether a version token was seen, i.e. the request carries a header
    /// block.
    pub fn has_headers(&self) -> bool {
        self.versioned
    }

    /// Total number of bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

fn step(state: State, class: Class) -> State {
    // A CR is never significant; LF alone terminates a line.
    if class == Class::CarriageReturn {
        return state;
    }

    match (state, class) {
        (State::LeadingLines, Class::Other) => State::Method,
        (State::LeadingLines, _) => State::LeadingLines,

        (State::Method, Class::Other) => State::Method,
        (State::Method, Class::Space) => State::BeforeUri,
        (State::Method, _) => State::Done(Verdict::Malformed),

        (State::BeforeUri, Class::Space) => State::BeforeUri,
        (State::BeforeUri, Class::Other) => State::Uri,
        (State::BeforeUri, _) => State::Done(Verdict::Malformed),

        (State::Uri, Class::Other) => State::Uri,
        (State::Uri, Class::Space) => State::BeforeVersion,
        (State::Uri, _) => State::Done(Verdict::Complete),

        (State::BeforeVersion, Class::Space) => State::BeforeVersion,
        (State::BeforeVersion, Class::Other) => State::Version,
        (State::BeforeVersion, _) => State::Done(Verdict::Complete),

        (State::Version, Class::Other) => State::Version,
        (State::Version, Class::Space) => State::LineEnd,
        (State::Version, _) => State::HeaderLine { empty: true },

        (State::LineEnd, Class::LineFeed) => State::HeaderLine { empty: true },
        (State::LineEnd, _) => State::LineEnd,

        (State::HeaderLine { empty: true }, Class::LineFeed) => State::Done(Verdict::Complete),
        (State::HeaderLine { .. }, Class::LineFeed) => State::HeaderLine { empty: true },
        (State::HeaderLine { .. }, _) => State::HeaderLine { empty: false },

        (State::Done(verdict), _) => State::Done(verdict),
    }
}
