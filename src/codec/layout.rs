use crate::types::signal::ByteOrder;

/// Elementary step for moving a bit field between a payload and a raw value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Step {
    /// Source byte index.
    pub(crate) byte_index: u8,
    /// LSB within the source byte (0..7).
    pub(crate) src_lsb: u8,
    /// Number of bits to take (1..8).
    pub(crate) width: u8,
    /// Destination LSB in the final value (LSB-first).
    pub(crate) dst_lsb: u16,
}

impl Step {
    #[inline]
    fn mask(&self) -> u8 {
        if self.width == 8 {
            0xFF
        } else {
            ((1u16 << self.width) - 1) as u8
        }
    }
}

/// Byte-wise steps of one signal, compiled once when the database is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct BitLayout {
    steps: Vec<Step>,
    bit_length: u16,
}

impl BitLayout {
    /// Precomputes bit → value steps. The field must already fit the frame.
    pub(crate) fn compile(start_bit: u16, bit_length: u16, byte_order: ByteOrder) -> BitLayout {
        // ceil((bit_len + (bit_start % 8)) / 8)
        let n_steps: usize = (bit_length as usize + (start_bit as usize & 7))
            .div_ceil(8)
            .max(1);
        let mut layout = BitLayout {
            steps: Vec::with_capacity(n_steps),
            bit_length,
        };
        match byte_order {
            ByteOrder::LittleEndian => layout.compile_intel(start_bit),
            ByteOrder::BigEndian => layout.compile_motorola(start_bit),
        }
        layout
    }

    /// Step compilation for little-endian (Intel) signals.
    fn compile_intel(&mut self, start_bit: u16) {
        let mut remaining: u16 = self.bit_length;
        let mut bit: u16 = start_bit;
        let mut dst: u16 = 0;

        while remaining > 0 {
            let bit_off: u8 = (bit % 8) as u8;
            let take: u8 = remaining.min((8 - bit_off) as u16) as u8;

            self.steps.push(Step {
                byte_index: (bit / 8) as u8,
                src_lsb: bit_off,
                width: take,
                dst_lsb: dst,
            });

            bit += take as u16;
            dst += take as u16;
            remaining -= take as u16;
        }
    }

    /// Step compilation for big-endian (Motorola) signals.
    fn compile_motorola(&mut self, start_bit: u16) {
        // @0: the start bit is the MSB of the signal; walk MSB-first and wrap
        // to bit 7 of the next byte.
        let mut remaining: u16 = self.bit_length;
        let mut byte: usize = (start_bit / 8) as usize;
        let mut bit_msb: u8 = (start_bit % 8) as u8;

        while remaining > 0 {
            let can_take: u16 = (bit_msb as u16 + 1).min(remaining);
            let src_lsb: u8 = bit_msb + 1 - can_take as u8;

            self.steps.push(Step {
                byte_index: byte as u8,
                src_lsb,
                width: can_take as u8,
                dst_lsb: remaining - can_take,
            });

            remaining -= can_take;
            byte += 1;
            bit_msb = 7;
        }
    }

    /// Extracts the unsigned raw value (LSB-first accumulation) from the payload.
    #[inline]
    pub(crate) fn extract(&self, bytes: &[u8]) -> u64 {
        let mut out: u64 = 0;
        for st in &self.steps {
            if let Some(&b) = bytes.get(st.byte_index as usize) {
                let chunk: u64 = ((b >> st.src_lsb) & st.mask()) as u64;
                out |= chunk << st.dst_lsb;
            }
        }
        out
    }

    /// Writes the low `bit_length` bits of `raw` into the payload, leaving
    /// bits outside the field untouched.
    #[inline]
    pub(crate) fn insert(&self, bytes: &mut [u8], raw: u64) {
        for st in &self.steps {
            if let Some(b) = bytes.get_mut(st.byte_index as usize) {
                let mask: u8 = st.mask();
                let chunk: u8 = ((raw >> st.dst_lsb) as u8) & mask;
                *b = (*b & !(mask << st.src_lsb)) | (chunk << st.src_lsb);
            }
        }
    }

    pub(crate) fn bit_length(&self) -> u16 {
        self.bit_length
    }
}

/// Sign-extends the low `bits` bits of `raw`.
#[inline]
pub(crate) fn sign_extend(raw: u64, bits: u16) -> i64 {
    if bits == 0 || bits >= 64 {
        return raw as i64;
    }
    let shift: u32 = 64 - bits as u32;
    ((raw << shift) as i64) >> shift
}
