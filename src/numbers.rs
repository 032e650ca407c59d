//! 16-bit word primitives: sign extension and two's complement conversion.

/// Converts the two's complement representation of a word into its signed value.
pub const fn twos_complement_to_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}

/// Inverse of [`twos_complement_to_decimal`].
pub const fn decimal_to_twos_complement(value: i16) -> u16 {
    value.cast_unsigned()
}

/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// The low `valid_bits` bits of `bits` are treated as a signed number; bit `valid_bits - 1` is
/// copied into every higher bit. Bits above the field in the input are discarded.
///
/// # Panics
/// - `valid_bits` is not in `1..=16` (debug builds only)
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits >= 1 && valid_bits <= 16, "invalid bit width");
    if valid_bits >= 16 {
        return bits;
    }
    let field = bits & ((1 << valid_bits) - 1);
    if (field >> (valid_bits - 1)) & 1 == 1 {
        // negative: 1-extend
        field | (0xFFFF << valid_bits)
    } else {
        // positive: 0-extend
        field
    }
}
