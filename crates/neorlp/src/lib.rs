//! # Neorlp
//!
//! A small, strict framing layer for self-delimiting byte strings.
//!
//! ## Philosophy
//!
//! - **Canonical**: Every value has exactly one encoding. The decoder rejects all others.
//! - **RLP Strings**: The string half of RLP. List markers are reserved and never produced.
//! - **Bounded**: Decoders are zero-copy, bounds-checked views. Every length is checked
//!   against the remaining buffer before it is sliced.
//!
//! ## Format
//!
//! - **Single byte** `< 0x80`: `[Byte]`
//! - **Short string** (`0..56` bytes): `[0x80 + Len][Data: Len]`
//! - **Long string** (`56..` bytes): `[0xB7 + LenLen][Len: LenLen][Data: Len]`
//!
//! All lengths and integers are Big-Endian with no leading zero bytes.


/// Lead byte of an empty string; short strings add their length.
pub const SHORT_STRING: u8 = 0x80;
/// Lead byte base of a long string; the length-of-length is added.
pub const LONG_STRING: u8 = 0xB7;
/// First lead byte of the (reserved) list forms.
pub const LIST: u8 = 0xC0;
/// Strings at least this long use the long form.
pub const SHORT_LIMIT: usize = 56;

/// Neorlp framing errors.
///
/// Every variant carries the byte offset at which the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer exhausted while reading; `missing` bytes were not available.
    UnexpectedEnd { offset: usize, missing: usize },
    /// A valid but non-minimal encoding was found.
    NonCanonical { offset: usize, reason: &'static str },
    /// A list-form lead byte (`0xC0..=0xFF`) was found.
    ReservedListMarker { offset: usize, byte: u8 },
    /// An integer payload does not fit in the requested width.
    IntegerOverflow { offset: usize, len: usize },
}

impl Error {
    /// The byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            Error::UnexpectedEnd { offset, .. }
            | Error::NonCanonical { offset, .. }
            | Error::ReservedListMarker { offset, .. }
            | Error::IntegerOverflow { offset, .. } => *offset,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnexpectedEnd { offset, missing } => {
                write!(f, "unexpected end of buffer at offset {}: {} more byte(s) needed", offset, missing)
            }
            Error::NonCanonical { offset, reason } => {
                write!(f, "non-canonical encoding at offset {}: {}", offset, reason)
            }
            Error::ReservedListMarker { offset, byte } => {
                write!(f, "reserved list marker {:#04x} at offset {}", byte, offset)
            }
            Error::IntegerOverflow { offset, len } => {
                write!(f, "integer of {} bytes at offset {} overflows", len, offset)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for Neorlp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `0x00..=0x7F`: the byte is its own encoding.
    Single,
    /// `0x80..=0xB7`
    ShortString,
    /// `0xB8..=0xBF`
    LongString,
    /// `0xC0..=0xF7` (reserved)
    ShortList,
    /// `0xF8..=0xFF` (reserved)
    LongList,
}

impl Kind {
    /// Returns the kind announced by a lead byte.
    pub const fn from_lead(b: u8) -> Self {
        match b {
            0x00..=0x7F => Kind::Single,
            0x80..=0xB7 => Kind::ShortString,
            0xB8..=0xBF => Kind::LongString,
            0xC0..=0xF7 => Kind::ShortList,
            _ => Kind::LongList,
        }
    }

    pub const fn is_list(self) -> bool {
        matches!(self, Kind::ShortList | Kind::LongList)
    }
}

/// Number of bytes in the minimal big-endian form of `n` (zero for `0`).
pub const fn unsigned_len(n: u64) -> usize {
    (64 - n.leading_zeros() as usize).div_ceil(8)
}

/// The fewest big-endian bytes representing `n`. `0` maps to the empty sequence.
pub fn minimal_bytes(n: u64) -> Vec<u8> {
    let len = unsigned_len(n);
    n.to_be_bytes()[8 - len..].to_vec()
}

/// Exact size of `frame(data)`.
pub fn framed_len(data: &[u8]) -> usize {
    match data {
        [b] if *b < SHORT_STRING => 1,
        _ => prefix_len(data.len()) + data.len(),
    }
}

/// Exact size of `frame_uint(n)`.
pub const fn framed_uint_len(n: u64) -> usize {
    if n < SHORT_STRING as u64 { 1 } else { 1 + unsigned_len(n) }
}

const fn prefix_len(data_len: usize) -> usize {
    if data_len < SHORT_LIMIT { 1 } else { 1 + unsigned_len(data_len as u64) }
}

fn be_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

/// An append-only writer of framed and raw bytes.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Creates an empty encoder.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates an encoder that will not reallocate before `cap` bytes.
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns a view of the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the encoder and returns the final byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes one unframed byte.
    pub fn byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Writes bytes verbatim, with no framing.
    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes `data` as a self-delimiting string.
    ///
    /// A lone byte below `0x80` is written bare; a lone byte at or above `0x80`
    /// gets the `0x81` prefix so the bare form stays unambiguous.
    pub fn frame(&mut self, data: &[u8]) {
        let len = data.len();
        match data {
            [b] if *b < SHORT_STRING => self.buf.push(*b),
            _ if len < SHORT_LIMIT => {
                self.buf.push(SHORT_STRING + len as u8);
                self.buf.extend_from_slice(data);
            }
            _ => {
                let len_bytes = minimal_bytes(len as u64);
                self.buf.push(LONG_STRING + len_bytes.len() as u8);
                self.buf.extend_from_slice(&len_bytes);
                self.buf.extend_from_slice(data);
            }
        }
    }

    /// Writes `n` as the framed form of its minimal big-endian bytes.
    pub fn frame_uint(&mut self, n: u64) {
        self.frame(&minimal_bytes(n));
    }
}

/// A zero-copy, bounds-checked cursor over a byte slice.
///
/// Reading advances the cursor. A decoder is owned by one decode call and is
/// never shared.
///
/// # Errors
/// All read operations return `Error::UnexpectedEnd` if the buffer is exhausted.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder at the start of the slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn as_slice(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            Err(Error::UnexpectedEnd { offset: self.pos, missing: n - remaining })
        } else {
            Ok(())
        }
    }

    /// Peeks the next byte without advancing.
    pub fn peek_byte(&self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf[self.pos])
    }

    /// Peeks the kind of the next framed item without advancing.
    pub fn peek_kind(&self) -> Result<Kind> {
        Ok(Kind::from_lead(self.peek_byte()?))
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads exactly `n` unframed bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads one self-delimiting string and returns its payload.
    ///
    /// # Errors
    /// - `NonCanonical` for a prefixed byte below `0x80`, a long-form length with a
    ///   leading zero byte, or a long form used for fewer than 56 bytes.
    /// - `ReservedListMarker` for any lead byte `>= 0xC0`.
    /// - `UnexpectedEnd` if the announced length exceeds the buffer.
    pub fn unframe(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let lead = self.peek_byte()?;
        match Kind::from_lead(lead) {
            Kind::Single => self.read_bytes(1),
            Kind::ShortString => {
                self.pos += 1;
                let len = (lead - SHORT_STRING) as usize;
                let data = self.read_bytes(len)?;
                if len == 1 && data[0] < SHORT_STRING {
                    return Err(Error::NonCanonical { offset: start, reason: "single byte below 0x80 carries a prefix" });
                }
                Ok(data)
            }
            Kind::LongString => {
                self.pos += 1;
                let len_of_len = (lead - LONG_STRING) as usize;
                let len_bytes = self.read_bytes(len_of_len)?;
                if len_bytes[0] == 0 {
                    return Err(Error::NonCanonical { offset: start, reason: "long-form length has a leading zero byte" });
                }
                let len = be_u64(len_bytes);
                if len < SHORT_LIMIT as u64 {
                    return Err(Error::NonCanonical { offset: start, reason: "long form used for a short string" });
                }
                let len = usize::try_from(len).unwrap_or(usize::MAX);
                self.read_bytes(len)
            }
            Kind::ShortList | Kind::LongList => Err(Error::ReservedListMarker { offset: start, byte: lead }),
        }
    }

    /// Reads one framed unsigned integer.
    ///
    /// The payload must be minimal (no leading zero byte, so zero is `0x80`) and
    /// at most eight bytes wide.
    pub fn unframe_uint(&mut self) -> Result<u64> {
        let start = self.pos;
        let data = self.unframe()?;
        if data.len() > 8 {
            return Err(Error::IntegerOverflow { offset: start, len: data.len() });
        }
        if data.first() == Some(&0) {
            return Err(Error::NonCanonical { offset: start, reason: "integer has a leading zero byte" });
        }
        Ok(be_u64(data))
    }

    /// Reads one framed unsigned integer that must fit in `usize`.
    pub fn unframe_len(&mut self) -> Result<usize> {
        let start = self.pos;
        let n = self.unframe_uint()?;
        usize::try_from(n).map_err(|_| Error::IntegerOverflow { offset: start, len: unsigned_len(n) })
    }
}
