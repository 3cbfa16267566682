//! A [`FieldDecoder`] describes how one packed field becomes a [`TaggedValue`]:
//! - **Target kind**: which [`ValueKind`] the field produces, and how many bits it spans.
//! - **Raw read**: signedness and bit order of the raw integer taken from the stream.
//! - **Numeric modifiers**: Optional `scale` and `offset` applied as `value * scale + offset`
//!   (float and double targets only).
//! - **String decoding**: UTF-8 or ASCII decoding with zero-termination and trim.
//! - **Null sentinel**: a raw value that marks the field as null.
//!
//! ## Decode order
//!
//! 1. Raw read (bit order applied, then sign extension)
//! 2. Null sentinel check
//! 3. Reinterpretation or numeric modifiers
//! 4. String decoding

use crate::{
    bit_stream::BitStream,
    bits::{reverse_bits_n, sign_extend},
    errors::{DecodeError, ReadError},
    value::{TaggedValue, Value, ValueKind},
};

/// Bit order of a raw field as it sits in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// Character encoding for decoding byte fields to strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8. Any valid UTF-8 byte sequence is accepted.
    Utf8,
    /// ASCII. Every byte must be in 0..=0x7F.
    Ascii,
}

/// Configuration for decoding one field from a [`BitStream`].
///
/// Use the builder-style setters (`set_scale`, `set_encoding`, etc.) to configure,
/// then call [`decode`](FieldDecoder::decode) on a stream.
///
/// # Example
///
/// ```
/// use bitmarshal::bit_stream::BitStream;
/// use bitmarshal::decode::FieldDecoder;
/// use bitmarshal::value::ValueKind;
///
/// let mut decoder = FieldDecoder::new(ValueKind::Double, 12);
/// decoder.set_scale(0.5).set_offset(-10.0).set_unit("degC");
///
/// let mut stream = BitStream::new(&[0x06, 0x40]);
/// let value = decoder.decode(&mut stream).unwrap();
/// assert_eq!(value.as_f64(), 40.0);
/// assert_eq!(value.unit(), Some("degC"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecoder {
    /// Scalar kind produced per element.
    pub kind: ValueKind,
    /// Width of one element in bits.
    pub bits: usize,
    /// If true, the raw integer is sign-extended from `bits`.
    pub signed: bool,
    pub bit_order: BitOrder,
    /// If set, decode this many consecutive elements into the sequence kind.
    pub count: Option<usize>,

    /// If set, multiply numeric value by this before adding offset.
    pub scale: Option<f64>,
    /// If set, add this to the (possibly scaled) numeric value.
    pub offset: Option<f64>,

    /// Encoding for string and date targets. Defaults to UTF-8.
    pub encoding: Option<Encoding>,
    /// If true, truncate at the first null byte before decoding.
    pub zero_terminated: Option<bool>,
    /// If true, trim leading/trailing whitespace from decoded strings.
    pub trim: Option<bool>,

    /// Raw value meaning "no data". Only consulted for scalar fields.
    pub null_value: Option<u64>,
    /// Unit attached to every decoded value.
    pub unit: Option<String>,
}

impl FieldDecoder {
    /// Creates a decoder for a `bits`-wide field of `kind` with default options.
    pub fn new(kind: ValueKind, bits: usize) -> Self {
        Self {
            kind,
            bits,
            signed: false,
            bit_order: BitOrder::default(),
            count: None,
            scale: None,
            offset: None,
            encoding: None,
            zero_terminated: None,
            trim: None,
            null_value: None,
            unit: None,
        }
    }

    pub fn set_signed(&mut self, signed: bool) -> &mut Self {
        self.signed = signed;
        self
    }

    pub fn set_bit_order(&mut self, bit_order: BitOrder) -> &mut Self {
        self.bit_order = bit_order;
        self
    }

    /// Decodes `count` elements into the sequence form of the target kind.
    pub fn set_count(&mut self, count: usize) -> &mut Self {
        self.count = Some(count);
        self
    }

    /// Sets the scale factor: result = value * scale + offset.
    pub fn set_scale(&mut self, scale: f64) -> &mut Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the offset: result = value * scale + offset.
    pub fn set_offset(&mut self, offset: f64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn set_zero_terminated(&mut self, zero_terminated: bool) -> &mut Self {
        self.zero_terminated = Some(zero_terminated);
        self
    }

    pub fn set_trim(&mut self, trim: bool) -> &mut Self {
        self.trim = Some(trim);
        self
    }

    pub fn set_null_value(&mut self, raw: u64) -> &mut Self {
        self.null_value = Some(raw);
        self
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) -> &mut Self {
        self.unit = Some(unit.into());
        self
    }

    /// Total bits consumed by one call to [`decode`](FieldDecoder::decode).
    /// Saturates for decoders that fail [`validate`](FieldDecoder::validate).
    pub fn total_bits(&self) -> usize {
        self.checked_total_bits().unwrap_or(usize::MAX)
    }

    fn checked_total_bits(&self) -> Option<usize> {
        self.bits.checked_mul(self.count.unwrap_or(1))
    }

    fn has_modifiers(&self) -> bool {
        self.scale.is_some() || self.offset.is_some()
    }

    /// Checks that width, kind and option combinations are valid.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let unsupported = Err(DecodeError::UnsupportedKind(self.kind.name()));

        if self.count == Some(0) {
            return Err(DecodeError::InvalidCount);
        }
        if self.checked_total_bits().is_none() {
            return Err(DecodeError::InvalidFieldSize(self.bits));
        }
        if self.count.is_some() && self.kind.sequence_of().is_none() {
            return unsupported;
        }

        if [self.scale, self.offset]
            .iter()
            .flatten()
            .any(|v| !v.is_finite())
        {
            return Err(DecodeError::InvalidScaleOffset);
        }
        if self.has_modifiers() && !matches!(self.kind, ValueKind::Float | ValueKind::Double) {
            return unsupported;
        }
        if self.encoding.is_some() && !self.kind.is_string_like() {
            return unsupported;
        }

        let max_bits = match self.kind {
            ValueKind::Boolean | ValueKind::Long | ValueKind::Enum => 64,
            ValueKind::Byte => 8,
            ValueKind::Short => 16,
            ValueKind::Int => 32,
            ValueKind::Float | ValueKind::Double if self.has_modifiers() => 64,
            ValueKind::Float => {
                return match self.bits {
                    32 => Ok(()),
                    actual => Err(DecodeError::InvalidFloatWidth {
                        expected: 32,
                        actual,
                    }),
                };
            }
            ValueKind::Double => {
                return match self.bits {
                    64 => Ok(()),
                    actual => Err(DecodeError::InvalidFloatWidth {
                        expected: 64,
                        actual,
                    }),
                };
            }
            ValueKind::String | ValueKind::Date => {
                if self.bits == 0 {
                    return Err(DecodeError::InvalidFieldSize(0));
                }
                if self.bits % 8 != 0 {
                    return Err(DecodeError::UnalignedString(self.bits));
                }
                return Ok(());
            }
            ValueKind::ByteString | ValueKind::Blob => usize::MAX,
            _ => return unsupported,
        };

        if self.bits == 0 || self.bits > max_bits {
            return Err(DecodeError::InvalidFieldSize(self.bits));
        }

        Ok(())
    }

    /// Decodes one field (or `count` elements) from the stream's cursor.
    pub fn decode(&self, stream: &mut BitStream<'_>) -> Result<TaggedValue, DecodeError> {
        self.validate()?;

        let needed = self.total_bits();
        if needed > stream.available() {
            return Err(ReadError::OutOfRange {
                requested: needed,
                available: stream.available(),
            }
            .into());
        }

        let value = match self.count {
            Some(count) => {
                let mut elements = Vec::with_capacity(count);
                for _ in 0..count {
                    elements.push(self.decode_element(stream)?.0);
                }
                TaggedValue::new(into_sequence(self.kind, elements))
            }
            None => match self.decode_element(stream)? {
                (value, true) => TaggedValue::new(value),
                (_, false) => TaggedValue::null(self.kind),
            },
        };

        Ok(match &self.unit {
            Some(unit) => value.with_unit(unit.clone()),
            None => value,
        })
    }

    /// Decodes one element, returning its payload and validity.
    fn decode_element(&self, stream: &mut BitStream<'_>) -> Result<(Value, bool), DecodeError> {
        match self.kind {
            ValueKind::ByteString => Ok((Value::ByteString(stream.read_byte_array(self.bits)?), true)),
            ValueKind::Blob => Ok((Value::Blob(stream.read_byte_array(self.bits)?), true)),
            ValueKind::String | ValueKind::Date => {
                let bytes = stream.read_byte_array(self.bits)?;
                let s = apply_string(
                    bytes,
                    self.encoding.unwrap_or(Encoding::Utf8),
                    self.zero_terminated,
                    self.trim,
                )?;
                let valid = !s.is_empty();
                let value = if self.kind == ValueKind::Date {
                    Value::Date(s)
                } else {
                    Value::String(s)
                };
                Ok((value, valid))
            }
            _ => {
                let mut raw = stream.read_bits(self.bits)?;
                if self.bit_order == BitOrder::LsbFirst {
                    raw = reverse_bits_n(raw, self.bits);
                }

                let valid = self.null_value != Some(raw);
                Ok((self.reinterpret(raw)?, valid))
            }
        }
    }

    /// Interprets a raw integer according to the target kind.
    fn reinterpret(&self, raw: u64) -> Result<Value, DecodeError> {
        let int = if self.signed {
            sign_extend(raw, self.bits)
        } else {
            raw as i64
        };

        Ok(match self.kind {
            ValueKind::Boolean => Value::Boolean(raw != 0),
            ValueKind::Byte => Value::Byte(raw as u8),
            ValueKind::Short => Value::Short(int as i16),
            ValueKind::Int => Value::Int(int as i32),
            ValueKind::Long => Value::Long(int),
            ValueKind::Enum => Value::Enum(int as i32),
            ValueKind::Float if self.has_modifiers() => {
                Value::Float(apply_numeric_modifiers(int, self.scale, self.offset) as f32)
            }
            ValueKind::Float => Value::Float(f32::from_bits(raw as u32)),
            ValueKind::Double if self.has_modifiers() => {
                Value::Double(apply_numeric_modifiers(int, self.scale, self.offset))
            }
            ValueKind::Double => Value::Double(f64::from_bits(raw)),
            other => return Err(DecodeError::UnsupportedKind(other.name())),
        })
    }
}

/// Applies scale and offset: value * scale + offset.
fn apply_numeric_modifiers(value: i64, scale: Option<f64>, offset: Option<f64>) -> f64 {
    value as f64 * scale.unwrap_or(1.0) + offset.unwrap_or(0.0)
}

/// Decodes bytes to a string (UTF-8 or ASCII), optionally zero-terminated and trimmed.
fn apply_string(
    mut bytes: Vec<u8>,
    encoding: Encoding,
    zero_terminated: Option<bool>,
    trim: Option<bool>,
) -> Result<String, DecodeError> {
    if zero_terminated.unwrap_or(false) {
        if let Some(pos) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(pos);
        }
    }

    if encoding == Encoding::Ascii {
        if let Some(b) = bytes.iter().find(|b| **b > 0x7F) {
            return Err(DecodeError::InvalidAsciiByte(*b));
        }
    }

    let mut s = String::from_utf8(bytes).map_err(|_| DecodeError::InvalidEncoding)?;

    if trim.unwrap_or(false) {
        s = s.trim().to_string();
    }

    Ok(s)
}

macro_rules! collect_sequence {
    ($kind:expr, $elements:expr; $($scalar:ident => $seq:ident),* $(,)?) => {
        match $kind {
            $(ValueKind::$scalar => Value::$seq(
                $elements
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::$scalar(x) => Some(x),
                        _ => None,
                    })
                    .collect(),
            ),)*
            other => other.filler(),
        }
    };
}

/// Packs decoded scalar elements into the sequence value of `kind`.
fn into_sequence(kind: ValueKind, elements: Vec<Value>) -> Value {
    collect_sequence!(kind, elements;
        Boolean => BooleanSeq,
        Byte => ByteSeq,
        Short => ShortSeq,
        Int => IntSeq,
        Long => LongSeq,
        Float => FloatSeq,
        Double => DoubleSeq,
        String => StringSeq,
        Date => DateSeq,
        Enum => EnumSeq,
        ByteString => ByteStringSeq,
    )
}
