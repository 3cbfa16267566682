//! Nullable typed values and their homogeneous column form.
//!
//! [Value] is the closed set of payloads an attribute can carry, [ValueKind] is
//! its discriminator, and [TaggedValue] pairs a payload with a validity flag and
//! an optional unit. [ColumnValues] is the column-major array of one kind used
//! when rows are transposed for submission.

use std::fmt;

/// Single precision complex pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

/// Double precision complex pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

/// Reference to data held outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalReference {
    pub description: String,
    pub mime_type: String,
    pub location: String,
}

impl ExternalReference {
    pub fn new(
        description: impl Into<String>,
        mime_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            mime_type: mime_type.into(),
            location: location.into(),
        }
    }
}

static EMPTY_REFERENCE: ExternalReference = ExternalReference {
    description: String::new(),
    mime_type: String::new(),
    location: String::new(),
};

macro_rules! value_kinds {
    ($($variant:ident($ty:ty) => $name:literal),* $(,)?) => {
        /// Discriminator of a [Value].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ValueKind {
            $($variant),*
        }

        /// Payload of one attribute value.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Value {
            $($variant($ty)),*
        }

        /// One attribute's values for every row of a batch, all of one kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ColumnValues {
            $($variant(Vec<$ty>)),*
        }

        impl ValueKind {
            pub const ALL: &'static [ValueKind] = &[$(ValueKind::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ValueKind::$variant => $name),*
                }
            }

            /// Zero/empty payload used for null cells of this kind.
            pub fn filler(self) -> Value {
                match self {
                    $(ValueKind::$variant => Value::$variant(<$ty>::default())),*
                }
            }
        }

        impl Value {
            pub fn kind(&self) -> ValueKind {
                match self {
                    $(Value::$variant(_) => ValueKind::$variant),*
                }
            }
        }

        impl ColumnValues {
            pub fn with_capacity(kind: ValueKind, capacity: usize) -> Self {
                match kind {
                    $(ValueKind::$variant => ColumnValues::$variant(Vec::with_capacity(capacity))),*
                }
            }

            pub fn kind(&self) -> ValueKind {
                match self {
                    $(ColumnValues::$variant(_) => ValueKind::$variant),*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(ColumnValues::$variant(values) => values.len()),*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Appends `value`; hands it back if its kind differs from the column's.
            pub fn push(&mut self, value: Value) -> Result<(), Value> {
                match (self, value) {
                    $((ColumnValues::$variant(values), Value::$variant(v)) => {
                        values.push(v);
                        Ok(())
                    })*
                    (_, other) => Err(other),
                }
            }

            pub fn push_filler(&mut self) {
                match self {
                    $(ColumnValues::$variant(values) => values.push(<$ty>::default())),*
                }
            }
        }
    };
}

value_kinds! {
    Boolean(bool) => "boolean",
    Byte(u8) => "byte",
    Short(i16) => "short",
    Int(i32) => "int",
    Long(i64) => "long",
    Float(f32) => "float",
    Double(f64) => "double",
    String(String) => "string",
    Date(String) => "date",
    Enum(i32) => "enum",
    ByteString(Vec<u8>) => "bytestr",
    Complex(Complex32) => "complex",
    DoubleComplex(Complex64) => "dcomplex",
    ExternalReference(ExternalReference) => "external_reference",
    Blob(Vec<u8>) => "blob",
    BooleanSeq(Vec<bool>) => "boolean_seq",
    ByteSeq(Vec<u8>) => "byte_seq",
    ShortSeq(Vec<i16>) => "short_seq",
    IntSeq(Vec<i32>) => "int_seq",
    LongSeq(Vec<i64>) => "long_seq",
    FloatSeq(Vec<f32>) => "float_seq",
    DoubleSeq(Vec<f64>) => "double_seq",
    StringSeq(Vec<String>) => "string_seq",
    DateSeq(Vec<String>) => "date_seq",
    EnumSeq(Vec<i32>) => "enum_seq",
    ByteStringSeq(Vec<Vec<u8>>) => "bytestr_seq",
    ComplexSeq(Vec<Complex32>) => "complex_seq",
    DoubleComplexSeq(Vec<Complex64>) => "dcomplex_seq",
    ExternalReferenceSeq(Vec<ExternalReference>) => "external_reference_seq",
}

impl ValueKind {
    pub fn is_sequence(self) -> bool {
        self.element_kind().is_some()
    }

    /// Scalar kind held by a sequence kind.
    pub fn element_kind(self) -> Option<ValueKind> {
        use ValueKind as K;
        Some(match self {
            K::BooleanSeq => K::Boolean,
            K::ByteSeq => K::Byte,
            K::ShortSeq => K::Short,
            K::IntSeq => K::Int,
            K::LongSeq => K::Long,
            K::FloatSeq => K::Float,
            K::DoubleSeq => K::Double,
            K::StringSeq => K::String,
            K::DateSeq => K::Date,
            K::EnumSeq => K::Enum,
            K::ByteStringSeq => K::ByteString,
            K::ComplexSeq => K::Complex,
            K::DoubleComplexSeq => K::DoubleComplex,
            K::ExternalReferenceSeq => K::ExternalReference,
            _ => return None,
        })
    }

    /// Sequence kind of a scalar kind. Blobs have no sequence form.
    pub fn sequence_of(self) -> Option<ValueKind> {
        use ValueKind as K;
        Some(match self {
            K::Boolean => K::BooleanSeq,
            K::Byte => K::ByteSeq,
            K::Short => K::ShortSeq,
            K::Int => K::IntSeq,
            K::Long => K::LongSeq,
            K::Float => K::FloatSeq,
            K::Double => K::DoubleSeq,
            K::String => K::StringSeq,
            K::Date => K::DateSeq,
            K::Enum => K::EnumSeq,
            K::ByteString => K::ByteStringSeq,
            K::Complex => K::ComplexSeq,
            K::DoubleComplex => K::DoubleComplexSeq,
            K::ExternalReference => K::ExternalReferenceSeq,
            _ => return None,
        })
    }

    pub fn is_string_like(self) -> bool {
        matches!(self, ValueKind::String | ValueKind::Date)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust types that map onto exactly one [ValueKind].
///
/// Kinds sharing a Rust representation (dates, enumeration codes, byte strings,
/// blobs) have dedicated constructors on [TaggedValue] instead.
pub trait Nullable: Into<Value> {
    const KIND: ValueKind;

    /// Whether the input counts as null even though it is present.
    fn is_null_input(&self) -> bool {
        false
    }
}

macro_rules! nullable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl Nullable for $ty {
                const KIND: ValueKind = ValueKind::$variant;
            }
        )*
    };
}

nullable! {
    bool => Boolean,
    u8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Complex32 => Complex,
    Complex64 => DoubleComplex,
    ExternalReference => ExternalReference,
    Vec<bool> => BooleanSeq,
    Vec<u8> => ByteSeq,
    Vec<i16> => ShortSeq,
    Vec<i32> => IntSeq,
    Vec<i64> => LongSeq,
    Vec<f32> => FloatSeq,
    Vec<f64> => DoubleSeq,
    Vec<String> => StringSeq,
    Vec<Complex32> => ComplexSeq,
    Vec<Complex64> => DoubleComplexSeq,
    Vec<ExternalReference> => ExternalReferenceSeq,
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl Nullable for String {
    const KIND: ValueKind = ValueKind::String;

    fn is_null_input(&self) -> bool {
        self.is_empty()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl Nullable for &str {
    const KIND: ValueKind = ValueKind::String;

    fn is_null_input(&self) -> bool {
        self.is_empty()
    }
}

/// One attribute's value for one row: a payload, a validity flag and an
/// optional unit.
///
/// The kind is fixed at construction. Accessors never fail: an invalid value,
/// or a request for a different kind, yields that accessor's zero/empty filler.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    value: Value,
    valid: bool,
    unit: Option<String>,
}

impl TaggedValue {
    /// A valid value carrying `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_validity(value, true)
    }

    pub fn with_validity(value: impl Into<Value>, valid: bool) -> Self {
        Self {
            value: value.into(),
            valid,
            unit: None,
        }
    }

    /// An invalid value of `kind` holding the kind's filler.
    pub fn null(kind: ValueKind) -> Self {
        Self::with_validity(kind.filler(), false)
    }

    /// Valid for a present, non-empty input; null filler of `T::KIND` otherwise.
    pub fn nullable<T: Nullable>(input: Option<T>) -> Self {
        match input {
            Some(v) if !v.is_null_input() => Self::new(v),
            _ => Self::null(T::KIND),
        }
    }

    /// Date/time in its fixed-pattern string form. An empty string is null.
    pub fn date(date: impl Into<String>) -> Self {
        Self::nullable_date(Some(date))
    }

    pub fn nullable_date<S: Into<String>>(date: Option<S>) -> Self {
        match date.map(Into::into) {
            Some(s) if !s.is_empty() => Self::new(Value::Date(s)),
            _ => Self::null(ValueKind::Date),
        }
    }

    pub fn enumeration(code: i32) -> Self {
        Self::new(Value::Enum(code))
    }

    pub fn nullable_enumeration(code: Option<i32>) -> Self {
        code.map_or_else(|| Self::null(ValueKind::Enum), Self::enumeration)
    }

    pub fn byte_string(bytes: Vec<u8>) -> Self {
        Self::new(Value::ByteString(bytes))
    }

    /// An empty byte string is null.
    pub fn nullable_byte_string(bytes: Option<Vec<u8>>) -> Self {
        match bytes {
            Some(b) if !b.is_empty() => Self::byte_string(b),
            _ => Self::null(ValueKind::ByteString),
        }
    }

    pub fn blob(bytes: Vec<u8>) -> Self {
        Self::new(Value::Blob(bytes))
    }

    /// An empty blob is null.
    pub fn nullable_blob(bytes: Option<Vec<u8>>) -> Self {
        match bytes {
            Some(b) if !b.is_empty() => Self::blob(b),
            _ => Self::null(ValueKind::Blob),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Raw payload, regardless of validity.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_parts(self) -> (Value, bool, Option<String>) {
        (self.value, self.valid, self.unit)
    }

    fn payload(&self) -> Option<&Value> {
        self.valid.then_some(&self.value)
    }

    pub fn as_str(&self) -> &str {
        match self.payload() {
            Some(Value::String(s)) | Some(Value::Date(s)) => s.as_str(),
            _ => "",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self.payload() {
            Some(Value::ByteString(b)) | Some(Value::Blob(b)) => b.as_slice(),
            _ => &[],
        }
    }

    pub fn as_external_reference(&self) -> &ExternalReference {
        match self.payload() {
            Some(Value::ExternalReference(r)) => r,
            _ => &EMPTY_REFERENCE,
        }
    }

    pub fn as_str_seq(&self) -> &[String] {
        match self.payload() {
            Some(Value::StringSeq(s)) | Some(Value::DateSeq(s)) => s.as_slice(),
            _ => &[],
        }
    }
}

macro_rules! scalar_accessors {
    ($($fn:ident: $variant:ident -> $ty:ty),* $(,)?) => {
        impl TaggedValue {
            $(
                pub fn $fn(&self) -> $ty {
                    match self.payload() {
                        Some(Value::$variant(v)) => *v,
                        _ => <$ty>::default(),
                    }
                }
            )*
        }
    };
}

scalar_accessors! {
    as_bool: Boolean -> bool,
    as_u8: Byte -> u8,
    as_i16: Short -> i16,
    as_i32: Int -> i32,
    as_i64: Long -> i64,
    as_f32: Float -> f32,
    as_f64: Double -> f64,
    as_enum: Enum -> i32,
    as_complex: Complex -> Complex32,
    as_double_complex: DoubleComplex -> Complex64,
}

macro_rules! sequence_accessors {
    ($($fn:ident: $variant:ident -> $ty:ty),* $(,)?) => {
        impl TaggedValue {
            $(
                pub fn $fn(&self) -> &[$ty] {
                    match self.payload() {
                        Some(Value::$variant(v)) => v.as_slice(),
                        _ => &[],
                    }
                }
            )*
        }
    };
}

sequence_accessors! {
    as_bool_seq: BooleanSeq -> bool,
    as_u8_seq: ByteSeq -> u8,
    as_i16_seq: ShortSeq -> i16,
    as_i32_seq: IntSeq -> i32,
    as_i64_seq: LongSeq -> i64,
    as_f32_seq: FloatSeq -> f32,
    as_f64_seq: DoubleSeq -> f64,
    as_enum_seq: EnumSeq -> i32,
    as_byte_string_seq: ByteStringSeq -> Vec<u8>,
    as_complex_seq: ComplexSeq -> Complex32,
    as_double_complex_seq: DoubleComplexSeq -> Complex64,
    as_external_reference_seq: ExternalReferenceSeq -> ExternalReference,
}
