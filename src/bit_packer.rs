//! Bit sequence to byte packing.
//!
//! Every full group of 8 bits becomes one byte, most significant bit first.
//! A trailing group of 1 to 7 bits is read as a short binary number and
//! written as its own byte *without* padding: `11` becomes `0b0000_0011`,
//! not `0b1100_0000`. The packed bytes therefore do not say how many bits the
//! last byte holds; [`unpack`] needs the original bit count.

use bitvec::prelude::*;

use crate::error::{HuffmanError, Result};

/// Codes and encoded bitstreams.
pub type Bits = BitVec<u8, Msb0>;

pub fn pack(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            group
                .iter()
                .by_vals()
                .fold(0u8, |acc, bit| (acc << 1) | u8::from(bit))
        })
        .collect()
}

/// Inverse of [`pack`] given the number of bits that were packed.
pub fn unpack(bytes: &[u8], bit_count: usize) -> Result<Bits> {
    let expected = bit_count.div_ceil(8);
    if bytes.len() != expected {
        return Err(HuffmanError::malformed(format!(
            "{bit_count} bits need {expected} bytes, got {}",
            bytes.len()
        )));
    }

    let mut bits = Bits::with_capacity(bit_count);
    for (i, &byte) in bytes.iter().enumerate() {
        let width = (bit_count - i * 8).min(8);
        if width < 8 && byte >> width != 0 {
            return Err(HuffmanError::malformed(format!(
                "final byte {byte:#04x} does not fit in {width} bits"
            )));
        }
        for shift in (0..width).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    Ok(bits)
}

/// Parses a string of `0`/`1` digits.
pub fn parse_digits(digits: &[u8]) -> Result<Bits> {
    digits
        .iter()
        .map(|&d| match d {
            b'0' => Ok(false),
            b'1' => Ok(true),
            other => Err(HuffmanError::malformed(format!(
                "unexpected digit {:?} in bit string",
                other as char
            ))),
        })
        .collect()
}

pub fn to_digits(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}
