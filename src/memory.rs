/// Number of addressable bytes in a 16-bit address space.
pub const ADDRESS_SPACE_SIZE: usize = 0x10000;

/// A flat 64K byte image.
///
/// The engine owns two of these: the program/data memory and the stack
/// image. Addresses travel as `u16`, so indexing is reduced modulo 65536 by
/// construction and an unmasked address can never fault the host.
pub struct AddressSpace {
    bytes: [u8; ADDRESS_SPACE_SIZE],
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self {
            bytes: [0; ADDRESS_SPACE_SIZE],
        }
    }
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    /// Read a little-endian word; the second byte wraps at the top of the
    /// address space.
    #[inline]
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    /// Write a little-endian word; the second byte wraps at the top of the
    /// address space.
    #[inline]
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Copy `data` into the image starting at `origin`, wrapping around the
    /// top of the address space if it runs past 0xFFFF. Input beyond the
    /// 64K capacity is ignored rather than wrapping over bytes already
    /// written.
    pub fn load(&mut self, origin: u16, data: &[u8]) {
        let start = origin as usize;
        let len = data.len().min(ADDRESS_SPACE_SIZE);
        let tail = (ADDRESS_SPACE_SIZE - start).min(len);
        self.bytes[start..start + tail].copy_from_slice(&data[..tail]);
        if tail < len {
            self.bytes[..len - tail].copy_from_slice(&data[tail..len]);
        }
    }
}
