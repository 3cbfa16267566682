//! # bitmarshal
//!
//! Bit-precision decoding of packed binary records into nullable typed values.
//!
//! A [bit_stream::BitStream] pulls fields of any width (at most one byte per
//! read) from a byte slice in MSB-first order. [decode::FieldDecoder]s turn
//! those bits into [value::TaggedValue]s, and a [layout::Layout] strings
//! decoders together to decode whole records.
//!
//! ## Example
//!
//! ```
//! use bitmarshal::bit_stream::BitStream;
//! use bitmarshal::decode::FieldDecoder;
//! use bitmarshal::layout::{FieldSpec, Layout};
//! use bitmarshal::value::{TaggedValue, ValueKind};
//!
//! let mut stream = BitStream::new(&[0xB4, 0x2F]);
//! assert_eq!(stream.read(4).unwrap(), 0b1011);
//! assert_eq!(stream.available(), 12);
//!
//! let layout = Layout::compile(&[
//!     FieldSpec::new("channel", FieldDecoder::new(ValueKind::Byte, 4)),
//!     FieldSpec::new("reading", FieldDecoder::new(ValueKind::Int, 12)),
//! ])
//! .unwrap();
//! let record = layout.decode(&[0xB4, 0x2F]).unwrap();
//! assert_eq!(record[0], ("channel".to_string(), TaggedValue::new(11u8)));
//! assert_eq!(record[1].1.as_i32(), 0x42F);
//! ```

pub mod bit_stream;
pub mod bits;
pub mod decode;
pub mod errors;
pub mod layout;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;
