use crate::{bits, errors::ReadError};

/// Widest field a single [BitStream::read] may return.
pub const MAX_READ_BITS: usize = 8;

/// Sequential MSB-first bit reader over an immutable byte slice.
///
/// The cursor only moves forward by exactly the number of bits consumed, and
/// never past `len_bits()`. Failed reads leave the cursor untouched.
#[derive(Debug, Clone)]
pub struct BitStream<'a> {
    data: &'a [u8],
    position: usize,
    end: usize,
}

impl<'a> BitStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            end: data.len() * 8,
        }
    }

    /// Bits remaining between the cursor and the end of the buffer.
    pub fn available(&self) -> usize {
        self.end - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len_bits(&self) -> usize {
        self.end
    }

    fn check(&self, bits: usize) -> Result<(), ReadError> {
        if bits > self.available() {
            return Err(ReadError::OutOfRange {
                requested: bits,
                available: self.available(),
            });
        }

        Ok(())
    }

    /// Reads the next `bits` (0..=8) bits, right-justified.
    pub fn read(&mut self, bits: usize) -> Result<u8, ReadError> {
        if bits > MAX_READ_BITS {
            return Err(ReadError::OutOfRange {
                requested: bits,
                available: self.available(),
            });
        }
        self.check(bits)?;

        let value = bits::window_read(self.data, self.position, bits);
        self.position += bits;

        Ok(value)
    }

    /// Reads `bits` bits into `ceil(bits / 8)` bytes. Each byte holds one chunk
    /// left-justified, so a trailing partial byte is zero-filled at the bottom.
    pub fn read_byte_array(&mut self, bits: usize) -> Result<Vec<u8>, ReadError> {
        self.check(bits)?;

        let mut out = Vec::with_capacity(bits.div_ceil(8));
        let mut remaining = bits;
        while remaining > 0 {
            let chunk = remaining.min(MAX_READ_BITS);
            let value = self.read(chunk)?;
            out.push(value << (MAX_READ_BITS - chunk));
            remaining -= chunk;
        }

        Ok(out)
    }

    /// Reads up to 64 bits as one MSB-first unsigned value, one byte-sized
    /// chunk at a time.
    pub fn read_bits(&mut self, bits: usize) -> Result<u64, ReadError> {
        if bits > 64 {
            return Err(ReadError::TooManyBits(bits));
        }
        self.check(bits)?;

        let mut value = 0u64;
        let mut remaining = bits;
        while remaining > 0 {
            let chunk = remaining.min(MAX_READ_BITS);
            value = (value << chunk) | self.read(chunk)? as u64;
            remaining -= chunk;
        }

        Ok(value)
    }

    pub fn skip(&mut self, bits: usize) -> Result<(), ReadError> {
        self.check(bits)?;
        self.position += bits;
        Ok(())
    }

    /// Advances the cursor to the next multiple of `bits`.
    pub fn align_to(&mut self, bits: usize) -> Result<(), ReadError> {
        if bits == 0 {
            return Ok(());
        }

        let rem = self.position % bits;
        if rem != 0 {
            self.skip(bits - rem)?;
        }

        Ok(())
    }
}
