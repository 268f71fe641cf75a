use crate::core::sphere::HittableField;

/// One control-surface change: set `field` of primitive `primitive_index`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    pub primitive_index: usize,
    pub field: HittableField,
    pub value: f32,
}

impl ControlEvent {
    pub fn new(primitive_index: usize, field: HittableField, value: f32) -> Self {
        Self {
            primitive_index,
            field,
            value,
        }
    }
}

/// Slider bounds for a panel-controlled field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ControlRange {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Fields shown for every controlled sphere, in panel order
pub const PANEL_FIELDS: [HittableField; 5] = [
    HittableField::AlbedoR,
    HittableField::AlbedoG,
    HittableField::AlbedoB,
    HittableField::Fuzz,
    HittableField::Radius,
];

/// Spheres exposed on the panel; the ground sphere is left alone
pub const PANEL_FOLDERS: [(usize, &str); 3] = [
    (0, "Sphere 1 (Gold)"),
    (1, "Sphere 2 (Silver)"),
    (2, "Sphere 3 (Blue)"),
];

impl HittableField {
    /// Range of the panel slider bound to this field, if it has one
    pub fn control_range(self) -> Option<ControlRange> {
        match self {
            HittableField::AlbedoR
            | HittableField::AlbedoG
            | HittableField::AlbedoB
            | HittableField::Fuzz => Some(ControlRange {
                min: 0.0,
                max: 1.0,
                step: 0.01,
            }),
            HittableField::Radius => Some(ControlRange {
                min: 0.1,
                max: 2.0,
                step: 0.1,
            }),
            _ => None,
        }
    }
}
