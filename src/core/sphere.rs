use std::mem::{offset_of, size_of};
use std::ops::Range;

use glam::Vec3;

use crate::error::{Error, Result};

/// Sphere primitive as laid out in the shader's storage array
///
/// Mirrors the WGSL struct member by member: `vec4` members are 16-byte
/// aligned, so the explicit padding keeps albedo at byte 32 and rounds the
/// stride up to 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Hittable {
    pub center: [f32; 4],
    pub radius: f32,
    /// Opaque discriminant, interpreted only by the shader
    pub material: f32,
    pub _pad0: [f32; 2],
    pub albedo: [f32; 4],
    pub fuzz: f32,
    pub _pad1: [f32; 3],
}

/// One scalar field of a [`Hittable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HittableField {
    CenterX,
    CenterY,
    CenterZ,
    Radius,
    Material,
    AlbedoR,
    AlbedoG,
    AlbedoB,
    Fuzz,
}

impl HittableField {
    pub const ALL: [HittableField; 9] = [
        HittableField::CenterX,
        HittableField::CenterY,
        HittableField::CenterZ,
        HittableField::Radius,
        HittableField::Material,
        HittableField::AlbedoR,
        HittableField::AlbedoG,
        HittableField::AlbedoB,
        HittableField::Fuzz,
    ];

    /// Short name used by the control panel
    pub fn label(self) -> &'static str {
        match self {
            HittableField::CenterX => "x",
            HittableField::CenterY => "y",
            HittableField::CenterZ => "z",
            HittableField::Radius => "radius",
            HittableField::Material => "material",
            HittableField::AlbedoR => "red",
            HittableField::AlbedoG => "green",
            HittableField::AlbedoB => "blue",
            HittableField::Fuzz => "fuzz",
        }
    }
}

impl Hittable {
    pub const STRIDE_BYTES: usize = size_of::<Hittable>();

    pub fn new(center: Vec3, radius: f32, material: f32, albedo: [f32; 3], fuzz: f32) -> Self {
        Self {
            center: center.extend(0.0).to_array(),
            radius,
            material,
            _pad0: [0.0; 2],
            albedo: [albedo[0], albedo[1], albedo[2], 0.0],
            fuzz,
            _pad1: [0.0; 3],
        }
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(self.center[0], self.center[1], self.center[2])
    }

    pub fn field(&self, field: HittableField) -> f32 {
        match field {
            HittableField::CenterX => self.center[0],
            HittableField::CenterY => self.center[1],
            HittableField::CenterZ => self.center[2],
            HittableField::Radius => self.radius,
            HittableField::Material => self.material,
            HittableField::AlbedoR => self.albedo[0],
            HittableField::AlbedoG => self.albedo[1],
            HittableField::AlbedoB => self.albedo[2],
            HittableField::Fuzz => self.fuzz,
        }
    }

    pub fn set_field(&mut self, field: HittableField, value: f32) {
        let slot = match field {
            HittableField::CenterX => &mut self.center[0],
            HittableField::CenterY => &mut self.center[1],
            HittableField::CenterZ => &mut self.center[2],
            HittableField::Radius => &mut self.radius,
            HittableField::Material => &mut self.material,
            HittableField::AlbedoR => &mut self.albedo[0],
            HittableField::AlbedoG => &mut self.albedo[1],
            HittableField::AlbedoB => &mut self.albedo[2],
            HittableField::Fuzz => &mut self.fuzz,
        };
        *slot = value;
    }

    /// Byte range of `field` within one encoded primitive
    pub fn field_range(field: HittableField) -> Range<usize> {
        let start = match field {
            HittableField::CenterX => offset_of!(Hittable, center),
            HittableField::CenterY => offset_of!(Hittable, center) + 4,
            HittableField::CenterZ => offset_of!(Hittable, center) + 8,
            HittableField::Radius => offset_of!(Hittable, radius),
            HittableField::Material => offset_of!(Hittable, material),
            HittableField::AlbedoR => offset_of!(Hittable, albedo),
            HittableField::AlbedoG => offset_of!(Hittable, albedo) + 4,
            HittableField::AlbedoB => offset_of!(Hittable, albedo) + 8,
            HittableField::Fuzz => offset_of!(Hittable, fuzz),
        };
        start..start + size_of::<f32>()
    }

    /// Decode a tightly packed array of primitives
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Hittable>> {
        if bytes.len() % Self::STRIDE_BYTES != 0 {
            return Err(Error::MalformedPayload {
                len: bytes.len(),
                stride: Self::STRIDE_BYTES,
            });
        }
        // Source bytes may not be 4-byte aligned, so copy instead of casting in place.
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }
}
