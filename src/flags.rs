/// CPU status flags for the Intel 8080.
///
/// The processor status byte lays these out as S Z - AC - P - CY with bit 1
/// hardwired to 1 and bits 3 and 5 hardwired to 0, which makes `0x02` the
/// power-on value.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flags {
    pub sign: bool,
    pub zero: bool,
    pub aux_carry: bool,
    pub parity: bool,
    pub carry: bool,
}

impl Flags {
    /// Pack the flags into the status byte (as pushed by PUSH PSW).
    pub fn to_byte(self) -> u8 {
        let mut f = 0u8;
        if self.sign {
            f |= 0x80;
        }
        if self.zero {
            f |= 0x40;
        }
        if self.aux_carry {
            f |= 0x10;
        }
        if self.parity {
            f |= 0x04;
        }
        // Bit 1 is always set.
        f |= 0x02;
        if self.carry {
            f |= 0x01;
        }
        f
    }

    /// Load the flags from a status byte (as popped by POP PSW).
    ///
    /// The unused bits are ignored; they keep their hardwired values the
    /// next time the byte is packed.
    pub fn set_from_byte(&mut self, value: u8) {
        self.sign = (value & 0x80) != 0;
        self.zero = (value & 0x40) != 0;
        self.aux_carry = (value & 0x10) != 0;
        self.parity = (value & 0x04) != 0;
        self.carry = (value & 0x01) != 0;
    }

    /// Derive sign, zero and parity from an 8-bit result.
    ///
    /// Carry and auxiliary carry are left alone; the ALU primitives that own
    /// them set them separately.
    #[inline]
    pub fn set_szp(&mut self, value: u8) {
        self.sign = (value & 0x80) != 0;
        self.zero = value == 0;
        self.parity = parity(value);
    }
}

/// Even parity of a byte: true when the number of set bits is even.
#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}
