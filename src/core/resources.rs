use std::mem::{offset_of, size_of};

use super::binding::ShaderContract;
use super::buffer::{BufferKind, GpuBuffer};
use super::gpu_context::ContextHandle;
use super::quad::{quad_layout, QUAD_VERTEX_COUNT, QUAD_VERTICES};
use super::render_pipeline::{PipelineConfig, ShaderSource};
use crate::error::Result;
use crate::traits::RenderContext;

/// Storage reserved for hittables; four spheres at the 64-byte stride
pub const HITTABLE_CAPACITY_BYTES: u64 = 256;

/// Count uniform: one i32, padded to a full uniform slot
pub const COUNT_BUFFER_BYTES: u64 = 16;

pub const FRAME_UNIFORM_BYTES: u64 = size_of::<FrameUniform>() as u64;

pub const SCENE_SHADER: &str = include_str!("../ray_tracer.wgsl");

/// Per-session uniform: canvas size, then elapsed time
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub canvas_size: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

impl FrameUniform {
    pub const CANVAS_SIZE_OFFSET: u64 = offset_of!(FrameUniform, canvas_size) as u64;
    pub const TIME_OFFSET: u64 = offset_of!(FrameUniform, time) as u64;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_size: [width as f32, height as f32],
            time: 0.0,
            _pad: 0.0,
        }
    }
}

/// Everything the frame driver binds and writes, created once per session
pub struct SceneResources<C: RenderContext> {
    pub pipeline: C::Pipeline,
    pub vertex_buffer: GpuBuffer<C::Buffer>,
    pub vertex_count: u32,
    pub frame_uniform: GpuBuffer<C::Buffer>,
    pub hittables: GpuBuffer<C::Buffer>,
    pub hittable_count: GpuBuffer<C::Buffer>,
    pub bind_group: C::BindGroup,
}

/// Pipeline configuration for the sphere tracing shader
pub fn scene_pipeline_config(format: wgpu::TextureFormat) -> PipelineConfig {
    PipelineConfig::new()
        .with_shader(ShaderSource::wgsl("Ray Tracer Shader", SCENE_SHADER))
        .with_vertex_layouts(vec![quad_layout()])
        .with_target_formats(vec![format])
        .with_topology(wgpu::PrimitiveTopology::TriangleList)
}

impl SceneResources<ContextHandle> {
    /// Build the pipeline and allocate every session buffer
    pub fn create(context: &ContextHandle) -> Result<Self> {
        let pipeline = scene_pipeline_config(context.format()).build(context.device())?;

        let vertex_buffer = context.create_buffer_init(
            "Quad Vertices",
            BufferKind::Vertex,
            bytemuck::cast_slice(&QUAD_VERTICES),
        );

        let (width, height) = context.size();
        let frame_uniform = context.create_buffer_init(
            "Frame Uniform",
            BufferKind::Uniform,
            bytemuck::bytes_of(&FrameUniform::new(width, height)),
        );
        let hittables =
            context.create_buffer("Hittables", BufferKind::Storage, HITTABLE_CAPACITY_BYTES);
        let hittable_count =
            context.create_buffer("Hittable Count", BufferKind::Uniform, COUNT_BUFFER_BYTES);

        let bind_group = context.create_bind_group(
            &pipeline,
            &ShaderContract::scene(),
            &[(0, &frame_uniform), (1, &hittables), (2, &hittable_count)],
        )?;

        log::info!(
            "scene resources ready: {}x{} canvas, {} bytes of hittable storage",
            width,
            height,
            HITTABLE_CAPACITY_BYTES
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            vertex_count: QUAD_VERTEX_COUNT,
            frame_uniform,
            hittables,
            hittable_count,
            bind_group,
        })
    }
}
