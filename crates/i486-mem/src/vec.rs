use crate::MemoryBus;

/// Flat RAM backed by a `Vec<u8>`.
///
/// Out-of-range reads return open-bus `0xFF`; out-of-range writes are
/// dropped. Suitable for tests and simple hosts without MMIO.
pub struct VecMemory {
    data: Vec<u8>,
}

impl VecMemory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl MemoryBus for VecMemory {
    fn read_u8(&mut self, addr: u32) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        if let Some(b) = self.data.get_mut(addr as usize) {
            *b = value;
        }
    }
}
