//! Streaming XML tag parser.
//!
//! Consumes a document one byte at a time and reports structure through the
//! [`TagSink`] callbacks. This is a pure recognizer - it knows nothing about
//! the configuration schema and builds no tree. The sink decides which
//! elements are worth keeping; a rejected element puts the parser into skip
//! mode and its whole subtree is discarded without further callbacks.
//!
//! Only the XML subset found in core description documents is understood:
//! elements with single- or double-quoted attributes, self-closing tags,
//! declaration and comment markup (`<?..?>`, `<!..>`) which is dropped, and
//! the single `&amp;` escape in attribute values. Closing-tag names are not
//! checked against the open element.

use alloc::string::String;
use alloc::vec::Vec;

/// Verdict returned by [`TagSink::element_start`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Element is known; deliver its attributes and children
    Accept,

    /// Element is unknown; skip its whole subtree
    Reject,
}

/// Callback interface fed by [`TagParser`].
///
/// Element and attribute names are delivered exactly as written in the
/// document; case folding is the sink's business.
pub trait TagSink {
    /// A complete opening tag name has been read.
    fn element_start(&mut self, name: &str) -> Verdict;

    /// The current element was closed, by `/>` or a closing tag.
    fn element_end(&mut self);

    /// A complete `name="value"` pair has been read, with `&amp;` already
    /// unescaped.
    fn attribute(&mut self, name: &str, value: &str);
}

/// Parser state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// Outside any tag, waiting for `<`
    Idle,

    /// Saw `<`, deciding what kind of tag follows
    TagOpen,

    /// Inside markup to be dropped, waiting for `>`
    Discard,

    /// Reading an element name
    Name,

    /// Inside a tag, scanning for the next attribute
    AttrScan,

    /// Reading an attribute name
    AttrName,

    /// Attribute name done, scanning for `=`
    AttrEq,

    /// Saw `=`, scanning for the opening quote
    ValueStart,

    /// Reading a double-quoted attribute value
    ValueDq,

    /// Reading a single-quoted attribute value
    ValueSq,

    /// Inside a closing tag, waiting for `>`
    CloseTag,

    /// Malformed attribute syntax; all further input is ignored
    Failed,
}

/// Streaming tag parser.
///
/// All parse state (automaton state, name/value accumulators, skip counter)
/// lives in the value, so independent documents can be parsed concurrently
/// with independent parsers.
///
/// Attribute names and values may contain arbitrary UTF-8; the structural
/// characters the automaton switches on are all ASCII, so multi-byte
/// sequences pass through untouched. Invalid UTF-8 is delivered lossily
/// rather than aborting the parse.
#[derive(Debug)]
pub struct TagParser {
    /// Current automaton state
    state: State,

    /// Rejected-subtree nesting counter; callbacks are suppressed while > 0
    skip: u32,

    /// Element or attribute name being accumulated
    name: Vec<u8>,

    /// Attribute value being accumulated
    value: Vec<u8>,
}

impl TagParser {
    /// Create a new parser in idle state.
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            skip: 0,
            name: Vec::new(),
            value: Vec::new(),
        }
    }

    /// Feed one byte of the document.
    ///
    /// Structure is reported through `sink` as it is recognized. Malformed
    /// attribute syntax logs a warning and permanently stops the parser;
    /// everything else is tolerated.
    ///
    /// # Arguments
    ///
    /// * `byte` - Next document byte
    /// * `sink` - Receiver for the structure callbacks
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut parser = TagParser::new();
    /// for byte in b"<config name=\"Demo\"/>" {
    ///     parser.feed(*byte, &mut builder);
    /// }
    /// ```
    pub fn feed(&mut self, byte: u8, sink: &mut impl TagSink) {
        match self.state {
            State::Idle => self.feed_idle(byte),
            State::TagOpen => self.feed_tag_open(byte),
            State::Discard => self.feed_discard(byte),
            State::Name => self.feed_name(byte, sink),
            State::AttrScan => self.feed_attr_scan(byte, sink),
            State::AttrName => self.feed_attr_name(byte),
            State::AttrEq => self.feed_attr_eq(byte),
            State::ValueStart => self.feed_value_start(byte),
            State::ValueDq => self.feed_value(byte, b'"', sink),
            State::ValueSq => self.feed_value(byte, b'\'', sink),
            State::CloseTag => self.feed_close_tag(byte, sink),
            State::Failed => {}
        }
    }

    /// Reset the parser for a fresh document.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.skip = 0;
        self.name.clear();
        self.value.clear();
    }

    /// Process byte while waiting for a tag to open.
    fn feed_idle(&mut self, byte: u8) {
        if byte == b'<' {
            self.state = State::TagOpen;
        }
    }

    /// Process the first byte after `<`.
    fn feed_tag_open(&mut self, byte: u8) {
        match byte {
            // declaration or comment, contents are dropped
            b'?' | b'!' => self.state = State::Discard,

            b'/' => self.state = State::CloseTag,

            _ => {
                self.name.clear();
                self.name.push(byte);
                self.state = State::Name;
            }
        }
    }

    /// Drop bytes until the current markup closes.
    fn feed_discard(&mut self, byte: u8) {
        if byte == b'>' {
            self.state = State::Idle;
        }
    }

    /// Process byte while reading an element name.
    fn feed_name(&mut self, byte: u8, sink: &mut impl TagSink) {
        match byte {
            // self-closing tag; the tail up to `>` is dropped
            b'/' => {
                self.open_element(sink);
                self.close_element(sink);
                self.state = State::Discard;
            }

            b'>' => {
                self.open_element(sink);
                self.state = State::Idle;
            }

            b if b.is_ascii_whitespace() => {
                self.open_element(sink);
                self.state = State::AttrScan;
            }

            _ => self.name.push(byte),
        }
    }

    /// Process byte while scanning for an attribute name.
    fn feed_attr_scan(&mut self, byte: u8, sink: &mut impl TagSink) {
        match byte {
            b'>' => self.state = State::Idle,

            // self-closing tag after attributes; the `>` that follows is
            // ignored by the idle state
            b'/' => {
                self.close_element(sink);
                self.state = State::Idle;
            }

            b if b.is_ascii_whitespace() => {}

            _ => {
                self.name.clear();
                self.name.push(byte);
                self.state = State::AttrName;
            }
        }
    }

    /// Process byte while reading an attribute name.
    fn feed_attr_name(&mut self, byte: u8) {
        match byte {
            b'>' => {
                log::warn!("xml: unexpected '>' inside attribute name");
                self.state = State::Failed;
            }

            b'=' => self.state = State::ValueStart,

            b if b.is_ascii_whitespace() => self.state = State::AttrEq,

            _ => self.name.push(byte),
        }
    }

    /// Scan for the `=` separating attribute name and value.
    fn feed_attr_eq(&mut self, byte: u8) {
        match byte {
            b'=' => self.state = State::ValueStart,

            b if b.is_ascii_whitespace() => {}

            _ => {
                log::warn!("xml: expected '=' after attribute name");
                self.state = State::Failed;
            }
        }
    }

    /// Scan for the quote opening an attribute value.
    fn feed_value_start(&mut self, byte: u8) {
        match byte {
            b'"' => {
                self.value.clear();
                self.state = State::ValueDq;
            }

            b'\'' => {
                self.value.clear();
                self.state = State::ValueSq;
            }

            b if b.is_ascii_whitespace() => {}

            _ => {
                log::warn!("xml: attribute value is not quoted");
                self.state = State::Failed;
            }
        }
    }

    /// Accumulate an attribute value until the matching quote.
    fn feed_value(&mut self, byte: u8, quote: u8, sink: &mut impl TagSink) {
        if byte == quote {
            self.emit_attribute(sink);
            self.state = State::AttrScan;
        } else {
            self.value.push(byte);
            self.unescape_amp();
        }
    }

    /// Process byte inside a closing tag. The tag name is not checked.
    fn feed_close_tag(&mut self, byte: u8, sink: &mut impl TagSink) {
        if byte == b'>' {
            self.close_element(sink);
            self.state = State::Idle;
        }
    }

    /// Deliver an element start, or track it on the skip counter.
    fn open_element(&mut self, sink: &mut impl TagSink) {
        if self.skip == 0 {
            let name = String::from_utf8_lossy(&self.name);
            if sink.element_start(&name) == Verdict::Reject {
                self.skip = 1;
            }
        } else {
            self.skip += 1;
        }
        self.name.clear();
    }

    /// Deliver an element end, or consume one level of skipped subtree.
    fn close_element(&mut self, sink: &mut impl TagSink) {
        if self.skip == 0 {
            sink.element_end();
        } else {
            self.skip -= 1;
        }
    }

    /// Deliver a finished attribute pair unless inside a skipped subtree.
    fn emit_attribute(&mut self, sink: &mut impl TagSink) {
        if self.skip == 0 {
            let name = String::from_utf8_lossy(&self.name);
            let value = String::from_utf8_lossy(&self.value);
            sink.attribute(&name, &value);
        }
        self.name.clear();
        self.value.clear();
    }

    /// Collapse a trailing `&amp;` in the value buffer to `&`.
    fn unescape_amp(&mut self) {
        let n = self.value.len();
        if n >= 5 && self.value[n - 5..].eq_ignore_ascii_case(b"&amp;") {
            self.value.truncate(n - 5);
            self.value.push(b'&');
        }
    }

    /// Get current parser state (for testing).
    #[cfg(test)]
    fn state(&self) -> State {
        self.state
    }
}

impl Default for TagParser {
    fn default() -> Self {
        Self::new()
    }
}
