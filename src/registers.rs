/// Register file for the Intel 8080.
///
/// Seven 8-bit working registers plus the 16-bit stack pointer and program
/// counter. The BC/DE/HL pairs are never stored as 16-bit values; they are
/// composed on demand through the accessors below, so every write is
/// truncated to the register's width by the field type itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Create a register file in its power-on state (all zero).
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }
}

#[cfg(test)]
mod tests {
    use super::Registers;

    #[test]
    fn pairs_compose_high_byte_first() {
        let mut regs = Registers::new();
        regs.b = 0x12;
        regs.c = 0x34;
        assert_eq!(regs.bc(), 0x1234);

        regs.set_de(0xBEEF);
        assert_eq!(regs.d, 0xBE);
        assert_eq!(regs.e, 0xEF);

        regs.set_hl(0x00FF);
        assert_eq!((regs.h, regs.l), (0x00, 0xFF));
        assert_eq!(regs.hl(), 0x00FF);
    }

    #[test]
    fn power_on_state_is_zeroed() {
        let regs = Registers::new();
        assert_eq!(regs, Registers::default());
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.sp, 0);
    }
}
