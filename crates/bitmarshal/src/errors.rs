//! Error types for bit reading, field decoding and layout compilation.

/// Errors produced when reading bits from a [crate::bit_stream::BitStream].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// Requested bit range is beyond the end of the data, or a single read asked
    /// for more than one byte's worth of bits.
    #[error("bit read out of range: requested {requested} bits with {available} available")]
    OutOfRange { requested: usize, available: usize },
    /// More than 64 bits were requested in a single wide read.
    #[error("too many bits in a single read: {0} (max 64)")]
    TooManyBits(usize),
    /// Input data is shorter than the layout's total bit length.
    #[error("packet too short: need {needed} bits, have {available}")]
    PacketTooShort { needed: usize, available: usize },
}

/// Errors produced when compiling a [crate::layout::FieldSpec] list into a [crate::layout::Layout].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Field name is empty or used twice.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
    /// The field's decoder configuration is rejected.
    #[error("field {name:?}: {source}")]
    InvalidDecoder {
        name: String,
        #[source]
        source: DecodeError,
    },
}

/// Errors produced while turning raw bits into a [crate::value::TaggedValue].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Underlying read failed; the record is truncated or malformed.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Field width is 0 or greater than 64 bits.
    #[error("invalid field width: {0} bits")]
    InvalidFieldSize(usize),
    /// Target kind cannot be produced with the configured options.
    #[error("unsupported target kind {0} for this decoder")]
    UnsupportedKind(&'static str),
    /// Float reinterpretation needs exactly 32 (Float) or 64 (Double) bits.
    #[error("float reinterpretation needs {expected} bits, got {actual}")]
    InvalidFloatWidth { expected: usize, actual: usize },
    /// String targets need a whole number of bytes.
    #[error("string field width {0} is not a multiple of 8")]
    UnalignedString(usize),
    /// Scale or offset is non-finite (NaN or infinity).
    #[error("scale and offset must be finite")]
    InvalidScaleOffset,
    /// Byte sequence is not valid for the chosen encoding (e.g. invalid UTF-8).
    #[error("invalid string encoding")]
    InvalidEncoding,
    /// An ASCII-encoded byte is outside 0..=0x7F.
    #[error("byte {0:#04x} is not ASCII")]
    InvalidAsciiByte(u8),
    /// Element count of zero for a sequence field.
    #[error("sequence fields need at least one element")]
    InvalidCount,
}
