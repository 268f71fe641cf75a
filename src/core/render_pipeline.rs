use std::borrow::Cow;

use crate::error::{Error, MissingField, Result};

/// Stride and attributes of one vertex buffer slot
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub array_stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// WGSL program text with a debug label
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub label: &'static str,
    pub wgsl: Cow<'static, str>,
}

impl ShaderSource {
    pub fn wgsl(label: &'static str, wgsl: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            wgsl: wgsl.into(),
        }
    }
}

/// Everything needed to create a render pipeline
///
/// Shader, at least one vertex layout and at least one target format are
/// required. Topology defaults to a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    shader: Option<ShaderSource>,
    vertex_layouts: Vec<VertexLayout>,
    target_formats: Vec<wgpu::TextureFormat>,
    topology: wgpu::PrimitiveTopology,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shader(mut self, shader: ShaderSource) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_vertex_layouts(mut self, layouts: Vec<VertexLayout>) -> Self {
        self.vertex_layouts = layouts;
        self
    }

    pub fn with_target_formats(mut self, formats: Vec<wgpu::TextureFormat>) -> Self {
        self.target_formats = formats;
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    /// Check required fields without touching a device
    pub fn validate(&self) -> Result<&ShaderSource> {
        let shader = self
            .shader
            .as_ref()
            .ok_or(Error::MissingConfiguration(MissingField::ShaderModule))?;
        if self.vertex_layouts.is_empty() {
            return Err(Error::MissingConfiguration(MissingField::VertexLayout));
        }
        if self.target_formats.is_empty() {
            return Err(Error::MissingConfiguration(MissingField::TargetFormat));
        }
        Ok(shader)
    }

    /// Compile the shader and create the pipeline
    ///
    /// The pipeline layout is derived from the shader's declared bindings.
    /// Validation errors raised by the device are returned instead of
    /// reaching the uncaptured error handler.
    pub fn build(&self, device: &wgpu::Device) -> Result<Pipeline> {
        let shader = self.validate()?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label),
            source: wgpu::ShaderSource::Wgsl(shader.wgsl.clone()),
        });

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> =
            self.vertex_layouts.iter().map(VertexLayout::as_wgpu).collect();

        let targets: Vec<Option<wgpu::ColorTargetState>> = self
            .target_formats
            .iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format: *format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let raw = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.label),
            layout: None,
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: None,
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: None,
                targets: &targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });
        let bind_group_layout = raw.get_bind_group_layout(0);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::PipelineCreation(err.to_string()));
        }

        log::debug!(
            "built pipeline '{}' ({:?}, {} target(s))",
            shader.label,
            self.topology,
            self.target_formats.len()
        );

        Ok(Pipeline {
            raw,
            bind_group_layout,
            topology: self.topology,
            target_formats: self.target_formats.clone(),
        })
    }
}

/// Immutable render pipeline with the bind group layout the shader implies
#[derive(Debug)]
pub struct Pipeline {
    raw: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    topology: wgpu::PrimitiveTopology,
    target_formats: Vec<wgpu::TextureFormat>,
}

impl Pipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.raw
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    pub fn target_formats(&self) -> &[wgpu::TextureFormat] {
        &self.target_formats
    }
}
