/// Byte-addressed guest memory bus.
///
/// Addresses are 32-bit linear addresses. Reads take `&mut self` because a
/// backend may have read side effects (MMIO). Multi-byte accessors are
/// little-endian and are composed from the byte accessors; implementations
/// may override them with wider native accesses.
pub trait MemoryBus {
    fn read_u8(&mut self, addr: u32) -> u8;
    fn write_u8(&mut self, addr: u32, value: u8);

    fn read_u16(&mut self, addr: u32) -> u16 {
        let lo = self.read_u8(addr) as u16;
        let hi = self.read_u8(addr.wrapping_add(1)) as u16;
        lo | (hi << 8)
    }

    fn read_u32(&mut self, addr: u32) -> u32 {
        let lo = self.read_u16(addr) as u32;
        let hi = self.read_u16(addr.wrapping_add(2)) as u32;
        lo | (hi << 16)
    }

    fn write_u16(&mut self, addr: u32, value: u16) {
        self.write_u8(addr, value as u8);
        self.write_u8(addr.wrapping_add(1), (value >> 8) as u8);
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        self.write_u16(addr, value as u16);
        self.write_u16(addr.wrapping_add(2), (value >> 16) as u16);
    }

    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_u8(addr.wrapping_add(i as u32));
        }
    }

    fn write_bytes(&mut self, addr: u32, buf: &[u8]) {
        for (i, b) in buf.iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u32), *b);
        }
    }
}

impl<T: MemoryBus + ?Sized> MemoryBus for &mut T {
    fn read_u8(&mut self, addr: u32) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        (**self).write_u8(addr, value);
    }
}
