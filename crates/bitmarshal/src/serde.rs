//! JSON-deserializable layout description.
//!
//! These types describe the *shape* of a packed record. They are intended to be
//! loaded from a layout file shipped with an importer and then compiled into a
//! [crate::layout::Layout] with `Layout::try_from(def)`.

use serde::{Deserialize, Serialize};

use crate::{
    decode::{BitOrder, Encoding, FieldDecoder},
    errors::LayoutError,
    layout::{FieldSpec, Layout},
    value::ValueKind,
};

/// Bit order to use when reading a raw field.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum BitOrderDef {
    #[default]
    /// Most-significant bit first.
    MsbFirst,
    /// Least-significant bit first.
    LsbFirst,
}

/// Character encoding for string fields.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum EncodingDef {
    Utf8,
    Ascii,
}

/// Top-level layout definition consisting of a list of fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutDef {
    /// All fields of the record, in stream order.
    pub fields: Vec<FieldDef>,
}

/// Description of a single decoded field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Attribute name the decoded value is stored under.
    pub name: String,
    /// Padding bits skipped before this field.
    #[serde(default)]
    pub skip_before: usize,
    #[serde(flatten)]
    pub decoder: DecoderDef,
}

/// How the field's bits become a value. Mirrors [FieldDecoder].
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DecoderDef {
    pub kind: ValueKind,
    pub bits: usize,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub bit_order: BitOrderDef,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default)]
    pub encoding: Option<EncodingDef>,
    #[serde(default)]
    pub zero_terminated: Option<bool>,
    #[serde(default)]
    pub trim: Option<bool>,
    #[serde(default)]
    pub null_value: Option<u64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl From<BitOrderDef> for BitOrder {
    fn from(value: BitOrderDef) -> Self {
        match value {
            BitOrderDef::MsbFirst => BitOrder::MsbFirst,
            BitOrderDef::LsbFirst => BitOrder::LsbFirst,
        }
    }
}

impl From<EncodingDef> for Encoding {
    fn from(value: EncodingDef) -> Self {
        match value {
            EncodingDef::Utf8 => Encoding::Utf8,
            EncodingDef::Ascii => Encoding::Ascii,
        }
    }
}

impl From<DecoderDef> for FieldDecoder {
    fn from(value: DecoderDef) -> Self {
        FieldDecoder {
            kind: value.kind,
            bits: value.bits,
            signed: value.signed,
            bit_order: value.bit_order.into(),
            count: value.count,
            scale: value.scale,
            offset: value.offset,
            encoding: value.encoding.map(Into::into),
            zero_terminated: value.zero_terminated,
            trim: value.trim,
            null_value: value.null_value,
            unit: value.unit,
        }
    }
}

impl From<FieldDef> for FieldSpec {
    fn from(value: FieldDef) -> Self {
        FieldSpec::new(value.name, value.decoder.into()).with_skip(value.skip_before)
    }
}

impl TryFrom<LayoutDef> for Layout {
    type Error = LayoutError;

    fn try_from(value: LayoutDef) -> Result<Self, Self::Error> {
        let fields: Vec<FieldSpec> = value.fields.into_iter().map(Into::into).collect();
        Layout::compile(&fields)
    }
}
