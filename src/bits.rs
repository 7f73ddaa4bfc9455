//! MSB-first bit packing over byte buffers.
//!
//! Bits are written from the most significant end of each byte towards the
//! least significant one; a value wider than the bits left on the current
//! byte continues on the following bytes.
//!
//! A value that exactly fills a byte leaves the cursor at zero free bits
//! rather than on a fresh byte. The next value then takes the spanning path,
//! which emits an empty byte first; the reader mirrors this by skipping that
//! byte.

use bytes::{BufMut, BytesMut};

/// An unsigned value that can be sliced into groups of at most 8 bits.
pub trait Word {
    /// Returns the low `count` bits (`count <= 8`) of the value shifted right by `shift`.
    fn window(&self, shift: usize, count: usize) -> u8;
}

fn low_mask(count: usize) -> u64 {
    if count >= 64 {
        u64::MAX
    } else {
        (1 << count) - 1
    }
}

impl Word for u64 {
    fn window(&self, shift: usize, count: usize) -> u8 {
        let v = u32::try_from(shift)
            .ok()
            .and_then(|shift| self.checked_shr(shift))
            .unwrap_or(0);
        (v & low_mask(count)) as u8
    }
}

/// Big-endian byte strings, bit 0 being the lowest bit of the last byte.
impl Word for [u8] {
    fn window(&self, shift: usize, count: usize) -> u8 {
        (0..count).rev().fold(0, |acc, i| {
            let pos = shift + i;
            let bit = self
                .len()
                .checked_sub(pos / 8 + 1)
                .map_or(0, |byte| (self[byte] >> (pos % 8)) & 1);
            (acc << 1) | bit
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Writer {
    bytes: BytesMut,
    last_byte: u8,
    free_bits_left: usize,
}

impl Writer {
    pub fn new(bytes: BytesMut) -> Self {
        Self {
            bytes,
            last_byte: 0,
            free_bits_left: 8,
        }
    }

    fn push_last_byte(&mut self) {
        self.bytes.put_u8(self.last_byte);
        self.last_byte = 0;
    }

    /// Appends the low `bits` bits of `v`.
    pub fn write<W: Word + ?Sized>(&mut self, bits: usize, v: &W) {
        if bits <= self.free_bits_left {
            let shift = self.free_bits_left - bits;
            self.last_byte |= v.window(0, bits) << shift;
            self.free_bits_left = shift;
            if shift == 0 {
                self.push_last_byte();
            }
        } else {
            // the value spans the current byte boundary
            let shift = bits - self.free_bits_left;
            self.last_byte |= v.window(shift, self.free_bits_left);
            self.push_last_byte();
            self.free_bits_left = 8;

            let (full_bytes, remaining_bits) = (shift / 8, shift % 8);
            for i in (0..full_bytes).rev() {
                self.bytes.put_u8(v.window(remaining_bits + 8 * i, 8));
            }
            if remaining_bits != 0 {
                self.last_byte = v.window(0, remaining_bits) << (8 - remaining_bits);
                self.free_bits_left = 8 - remaining_bits;
            }
        }
    }

    /// Completed bytes, without the partially filled one.
    pub fn view_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Flushes the partially filled byte, leaving its unused low bits zero.
    pub fn finish(mut self) -> BytesMut {
        if 0 < self.free_bits_left && self.free_bits_left < 8 {
            self.push_last_byte();
        }
        self.bytes
    }
}

/// Attempt to read past the end of the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    /// Number of bytes the read needed.
    pub needed: usize,
    pub len: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    byte_number: usize,
    bits_on_byte_left: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            byte_number: 0,
            bits_on_byte_left: 8,
        }
    }

    /// Reads the next `bits` bits, right-aligned into `ceil(bits / 8)` big-endian bytes.
    pub fn read(&mut self, bits: usize) -> Result<Vec<u8>, OutOfBounds> {
        let start = self.byte_number;
        let (end, mut next, bits_on_byte_left) = if bits > self.bits_on_byte_left {
            let rest = bits - self.bits_on_byte_left;
            let (add_bytes, last_bits_used) = (rest / 8, rest % 8);
            (
                start + add_bytes + usize::from(last_bits_used != 0),
                start + add_bytes + 1,
                8 - last_bits_used,
            )
        } else {
            (start, start, self.bits_on_byte_left - bits)
        };
        if bits_on_byte_left == 0 {
            next += 1;
        }

        let slice = self.bytes.get(start..=end).ok_or(OutOfBounds {
            needed: end + 1,
            len: self.bytes.len(),
        })?;
        self.byte_number = next;
        self.bits_on_byte_left = bits_on_byte_left;

        Ok(take_low_bits(slice, bits_on_byte_left % 8, bits))
    }

    pub fn read_u64(&mut self, bits: usize) -> Result<u64, OutOfBounds> {
        self.read(bits).map(|bytes| be_to_u64(&bytes))
    }

    /// Number of bytes not yet touched by a read.
    pub fn non_read_bytes(&self) -> usize {
        self.bytes.len().saturating_sub(self.byte_number)
    }
}

/// Shifts the big-endian `slice` right by `shift` (< 8) bits and keeps its low `bits` bits.
fn take_low_bits(slice: &[u8], shift: usize, bits: usize) -> Vec<u8> {
    let shifted = slice
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let carry = match (shift, i) {
                (0, _) | (_, 0) => 0,
                _ => slice[i - 1] << (8 - shift),
            };
            (b >> shift) | carry
        })
        .collect::<Vec<_>>();

    let n = bits.div_ceil(8);
    let mut out = shifted[shifted.len().saturating_sub(n)..].to_vec();
    if out.len() < n {
        out.splice(0..0, std::iter::repeat(0).take(n - out.len()));
    }
    if bits % 8 != 0 {
        out[0] &= (1 << (bits % 8)) - 1;
    }
    out
}

pub(crate) fn be_to_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}
