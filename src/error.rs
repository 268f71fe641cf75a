use std::fmt;

use thiserror::Error;

use crate::core::frame_driver::Trigger;

pub type Result<T> = std::result::Result<T, Error>;

/// Required pipeline configuration that was never supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    ShaderModule,
    VertexLayout,
    TargetFormat,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::ShaderModule => "shader module",
            MissingField::VertexLayout => "vertex buffer layout",
            MissingField::TargetFormat => "target format",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to find a compatible GPU adapter: {0}")]
    AdapterUnavailable(String),

    #[error("failed to create GPU device: {0}")]
    DeviceUnavailable(String),

    #[error("failed to create presentation surface: {0}")]
    SurfaceUnavailable(String),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("missing pipeline configuration: {0}")]
    MissingConfiguration(MissingField),

    #[error("pipeline creation failed: {0}")]
    PipelineCreation(String),

    #[error("{buffer}: write of {needed} bytes exceeds capacity of {capacity} bytes")]
    CapacityExceeded {
        buffer: String,
        needed: u64,
        capacity: u64,
    },

    #[error("payload of {len} bytes is not a multiple of the {stride}-byte stride")]
    MalformedPayload { len: usize, stride: usize },

    #[error("bind group does not match shader bindings: {0}")]
    BindingMismatch(String),

    #[error("primitive index {index} out of range (scene has {len})")]
    PrimitiveIndex { index: usize, len: usize },

    #[error("non-finite value {0} rejected")]
    NonFiniteValue(f32),

    #[error("operation requires the {expected:?} trigger but the driver runs {actual:?}")]
    TriggerMismatch { expected: Trigger, actual: Trigger },

    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
