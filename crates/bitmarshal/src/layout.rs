//! Layout: ordered named field decoders describing one packed record.

use std::collections::HashSet;

use crate::{
    bit_stream::BitStream,
    decode::FieldDecoder,
    errors::{DecodeError, LayoutError, ReadError},
    value::TaggedValue,
};

/// One decoded record, fields in layout order.
pub type Record = Vec<(String, TaggedValue)>;

/// A single named field of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Name used as the attribute name of the decoded value.
    pub name: String,
    /// Padding bits skipped before the field starts.
    pub skip_before: usize,
    pub decoder: FieldDecoder,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, decoder: FieldDecoder) -> Self {
        Self {
            name: name.into(),
            skip_before: 0,
            decoder,
        }
    }

    pub fn with_skip(mut self, bits: usize) -> Self {
        self.skip_before = bits;
        self
    }
}

/// A compiled record layout. Use [Layout::compile] to build from [FieldSpec]s, then
/// [Layout::decode] to decode bytes.
#[derive(Debug, Clone)]
pub struct Layout {
    total_bits: usize,
    /// Fields in definition order.
    pub fields: Vec<FieldSpec>,
}

impl Layout {
    /// Validates every field. Fails on an empty or duplicate name, or an invalid decoder.
    pub fn compile(fields: &[FieldSpec]) -> Result<Self, LayoutError> {
        let mut names = HashSet::with_capacity(fields.len());
        let mut total_bits = 0;

        for field in fields {
            if field.name.is_empty() || !names.insert(field.name.as_str()) {
                return Err(LayoutError::InvalidFieldName(field.name.clone()));
            }

            field
                .decoder
                .validate()
                .map_err(|source| LayoutError::InvalidDecoder {
                    name: field.name.clone(),
                    source,
                })?;

            total_bits = field
                .skip_before
                .checked_add(field.decoder.total_bits())
                .and_then(|bits| bits.checked_add(total_bits))
                .ok_or_else(|| LayoutError::InvalidDecoder {
                    name: field.name.clone(),
                    source: DecodeError::InvalidFieldSize(field.decoder.bits),
                })?;
        }

        Ok(Self {
            fields: fields.to_vec(),
            total_bits,
        })
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Decodes one record from the start of `data`. Fails if `data` is too short.
    pub fn decode(&self, data: &[u8]) -> Result<Record, DecodeError> {
        let mut stream = BitStream::new(data);
        self.decode_stream(&mut stream)
    }

    /// Decodes one record at the stream's cursor, leaving it after the last field.
    pub fn decode_stream(&self, stream: &mut BitStream<'_>) -> Result<Record, DecodeError> {
        if stream.available() < self.total_bits {
            return Err(ReadError::PacketTooShort {
                needed: self.total_bits,
                available: stream.available(),
            }
            .into());
        }

        let mut record = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            stream.skip(field.skip_before)?;
            record.push((field.name.clone(), field.decoder.decode(stream)?));
        }

        tracing::trace!(
            fields = record.len(),
            position = stream.position(),
            "decoded record"
        );

        Ok(record)
    }
}
