//! Low-level bit manipulation helpers shared by the stream and the decoders.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.

/// Reads up to 8 bits starting at `bit_pos` through a 16-bit window over the
/// byte at `bit_pos >> 3` and the byte after it. Caller guarantees bounds.
pub(crate) fn window_read(data: &[u8], bit_pos: usize, bits: usize) -> u8 {
    debug_assert!(bits <= 8);
    if bits == 0 {
        return 0;
    }

    let byte_index = bit_pos >> 3;
    let consumed = bit_pos & 7;

    let mut window = (data[byte_index] as u16) << 8;
    if consumed + bits > 8 {
        window |= data[byte_index + 1] as u16;
    }

    let value = window >> (16 - consumed - bits);
    (value & ((1u16 << bits) - 1)) as u8
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }

    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Reverses the low `n` bits of `x` (LSB becomes MSB of the result).
pub fn reverse_bits_n(mut x: u64, n: usize) -> u64 {
    let mut r = 0u64;
    for _ in 0..n {
        r = (r << 1) | (x & 1);
        x >>= 1;
    }

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_read_within_byte() {
        let data = [0b1011_0100];
        assert_eq!(window_read(&data, 0, 4), 0b1011);
        assert_eq!(window_read(&data, 4, 4), 0b0100);
        assert_eq!(window_read(&data, 2, 3), 0b110);
    }

    #[test]
    fn test_window_read_straddles_bytes() {
        let data = [0b0000_0111, 0b1100_0000];
        assert_eq!(window_read(&data, 5, 5), 0b11111);
        assert_eq!(window_read(&data, 4, 8), 0b0111_1100);
    }

    #[test]
    fn test_window_read_zero_bits() {
        assert_eq!(window_read(&[0xFF], 3, 0), 0);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b11111111, 8), -1);
        assert_eq!(sign_extend(0b0111, 4), 7);
        assert_eq!(sign_extend(0b1000, 4), -8);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }

    #[test]
    fn test_reverse_bits_n() {
        assert_eq!(reverse_bits_n(0b10101010, 8), 0b01010101);
        assert_eq!(reverse_bits_n(0b001, 3), 0b100);
    }
}
