use glam::Vec3;

use super::sphere::{Hittable, HittableField};
use crate::error::{Error, Result};

/// Ordered list of spheres, authoritative on the CPU side
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    primitives: Vec<Hittable>,
}

impl Scene {
    pub fn new(primitives: Vec<Hittable>) -> Self {
        Self { primitives }
    }

    pub fn primitives(&self) -> &[Hittable] {
        &self.primitives
    }

    pub fn get(&self, index: usize) -> Option<&Hittable> {
        self.primitives.get(index)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Value written to the count uniform next to the storage array
    pub fn count(&self) -> u32 {
        self.primitives.len() as u32
    }

    pub fn push(&mut self, hittable: Hittable) {
        self.primitives.push(hittable);
    }

    /// Encoded size in bytes
    pub fn encoded_len(&self) -> u64 {
        (self.primitives.len() * Hittable::STRIDE_BYTES) as u64
    }

    /// View the scene as the bytes uploaded to the storage buffer
    ///
    /// Fails before producing anything when the encoding would not fit in
    /// `capacity` bytes.
    pub fn serialize(&self, capacity: u64) -> Result<&[u8]> {
        let needed = self.encoded_len();
        if needed > capacity {
            return Err(Error::CapacityExceeded {
                buffer: "scene".to_string(),
                needed,
                capacity,
            });
        }
        Ok(bytemuck::cast_slice(&self.primitives))
    }

    /// Update one field of one primitive in place
    pub fn mutate(&mut self, index: usize, field: HittableField, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteValue(value));
        }
        let len = self.primitives.len();
        let hittable = self
            .primitives
            .get_mut(index)
            .ok_or(Error::PrimitiveIndex { index, len })?;
        hittable.set_field(field, value);
        Ok(())
    }
}

impl Default for Scene {
    /// Gold, silver and blue spheres resting on a large ground sphere
    fn default() -> Self {
        Self::new(vec![
            Hittable::new(Vec3::new(0.0, 0.0, -6.0), 1.0, 1.0, [1.0, 0.6, 0.2], 0.03),
            Hittable::new(Vec3::new(2.0, 0.0, -7.0), 0.5, 1.0, [1.0, 1.0, 1.0], 0.3),
            Hittable::new(Vec3::new(-2.0, 0.0, -8.0), 0.5, 1.0, [0.8, 0.8, 1.0], 0.1),
            Hittable::new(Vec3::new(0.0, 100.5, -6.0), 100.0, 2.0, [0.5, 0.8, 0.3], 0.0),
        ])
    }
}
