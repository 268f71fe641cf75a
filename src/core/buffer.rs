use crate::error::{Error, Result};

/// How the shader consumes a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Uniform,
    Storage,
}

impl BufferKind {
    /// Usage flags for a buffer of this kind that is rewritten through the queue
    pub fn usages(self) -> wgpu::BufferUsages {
        let base = match self {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
            BufferKind::Storage => wgpu::BufferUsages::STORAGE,
        };
        base | wgpu::BufferUsages::COPY_DST
    }
}

/// A GPU buffer together with the capacity it was allocated with
///
/// The capacity never changes after creation. Contents are overwritten in
/// place, so every write is checked against it before reaching the queue.
#[derive(Debug)]
pub struct GpuBuffer<B> {
    pub label: &'static str,
    pub kind: BufferKind,
    pub capacity: u64,
    pub raw: B,
}

impl<B> GpuBuffer<B> {
    pub fn new(label: &'static str, kind: BufferKind, capacity: u64, raw: B) -> Self {
        Self {
            label,
            kind,
            capacity,
            raw,
        }
    }

    /// Fails if `len` bytes written at `offset` would run past the end
    pub fn check_write(&self, offset: u64, len: usize) -> Result<()> {
        let needed = offset + len as u64;
        if needed > self.capacity {
            return Err(Error::CapacityExceeded {
                buffer: self.label.to_string(),
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_within_capacity() {
        let buffer = GpuBuffer::new("hittables", BufferKind::Storage, 256, ());
        assert!(buffer.check_write(0, 256).is_ok());
        assert!(buffer.check_write(128, 128).is_ok());
        assert!(buffer.check_write(0, 0).is_ok());
    }

    #[test]
    fn test_write_past_capacity() {
        let buffer = GpuBuffer::new("hittables", BufferKind::Storage, 256, ());
        match buffer.check_write(0, 320) {
            Err(Error::CapacityExceeded { buffer, needed, capacity }) => {
                assert_eq!(buffer, "hittables");
                assert_eq!(needed, 320);
                assert_eq!(capacity, 256);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_counts_against_capacity() {
        let buffer = GpuBuffer::new("frame", BufferKind::Uniform, 16, ());
        assert!(buffer.check_write(8, 4).is_ok());
        assert!(buffer.check_write(12, 8).is_err());
    }

    #[test]
    fn test_usages_include_copy_dst() {
        for kind in [BufferKind::Vertex, BufferKind::Uniform, BufferKind::Storage] {
            assert!(kind.usages().contains(wgpu::BufferUsages::COPY_DST));
        }
        assert!(BufferKind::Storage.usages().contains(wgpu::BufferUsages::STORAGE));
        assert!(!BufferKind::Uniform.usages().contains(wgpu::BufferUsages::STORAGE));
    }
}
