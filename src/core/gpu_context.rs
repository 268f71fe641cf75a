use std::cell::RefCell;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};
use winit::window::Window;

use super::binding::{BindingSlot, ShaderContract};
use super::buffer::{BufferKind, GpuBuffer};
use super::render_pipeline::Pipeline;
use crate::error::{Error, Result};
use crate::traits::{record_draw, OverlayPass, RenderContext};

/// Where encoded passes draw to
enum RenderTarget {
    Surface {
        surface: Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

/// A finished command buffer plus the surface texture it draws into
pub struct EncodedFrame {
    commands: wgpu::CommandBuffer,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

/// Device, queue and presentation target for one rendering session
///
/// All buffer writes and submissions go through the single queue held here,
/// so their issuance order is the order the GPU observes.
pub struct ContextHandle {
    device: Device,
    queue: Queue,
    target: RenderTarget,
    format: wgpu::TextureFormat,
    overlay: RefCell<Option<Box<dyn OverlayPass>>>,
}

impl ContextHandle {
    /// Acquire a device that can present to `window`
    ///
    /// There is no fallback: a missing adapter, device or surface is fatal.
    pub async fn initialize(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = Self::create_instance();

        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::SurfaceUnavailable(e.to_string()))?;
        let adapter = Self::request_adapter(&instance, Some(&surface)).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = preferred_format(&caps.formats)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "GPU context ready: {} ({:?}), surface format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format
        );

        Ok(Self {
            device,
            queue,
            target: RenderTarget::Surface { surface, config },
            format,
            overlay: RefCell::new(None),
        })
    }

    /// Acquire a device rendering into an offscreen texture
    pub async fn headless(width: u32, height: u32, format: wgpu::TextureFormat) -> Result<Self> {
        let instance = Self::create_instance();
        let adapter = Self::request_adapter(&instance, None).await?;
        let (device, queue) = Self::request_device(&adapter).await?;
        let texture = Self::create_offscreen_texture(&device, width, height, format);

        log::info!("headless GPU context ready: {}", adapter.get_info().name);

        Ok(Self {
            device,
            queue,
            target: RenderTarget::Offscreen { texture },
            format,
            overlay: RefCell::new(None),
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Negotiated output format of the render target
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Current render target size in physical pixels
    pub fn size(&self) -> (u32, u32) {
        match &self.target {
            RenderTarget::Surface { config, .. } => (config.width, config.height),
            RenderTarget::Offscreen { texture } => (texture.width(), texture.height()),
        }
    }

    /// Install a pass drawn on top of every scene pass
    pub fn set_overlay(&mut self, overlay: Box<dyn OverlayPass>) {
        *self.overlay.get_mut() = Some(overlay);
    }

    /// Reconfigure the target for a new size; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match &mut self.target {
            RenderTarget::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            RenderTarget::Offscreen { texture } => {
                *texture = Self::create_offscreen_texture(&self.device, width, height, self.format);
            }
        }
        log::debug!("render target resized to {}x{}", width, height);
    }

    /// Allocate an empty buffer whose capacity is fixed for its lifetime
    pub fn create_buffer(
        &self,
        label: &'static str,
        kind: BufferKind,
        capacity: u64,
    ) -> GpuBuffer<wgpu::Buffer> {
        let raw = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: kind.usages(),
            mapped_at_creation: false,
        });
        GpuBuffer::new(label, kind, capacity, raw)
    }

    /// Allocate a buffer sized to and filled with `contents`
    pub fn create_buffer_init(
        &self,
        label: &'static str,
        kind: BufferKind,
        contents: &[u8],
    ) -> GpuBuffer<wgpu::Buffer> {
        let raw = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: kind.usages(),
        });
        GpuBuffer::new(label, kind, contents.len() as u64, raw)
    }

    /// Bind `entries` to the pipeline's group 0
    ///
    /// Entries are checked against `contract` first; anything the device
    /// still rejects is reported as a binding mismatch.
    pub fn create_bind_group(
        &self,
        pipeline: &Pipeline,
        contract: &ShaderContract,
        entries: &[(u32, &GpuBuffer<wgpu::Buffer>)],
    ) -> Result<wgpu::BindGroup> {
        let slots: Vec<BindingSlot> = entries
            .iter()
            .map(|(binding, buffer)| BindingSlot {
                binding: *binding,
                kind: buffer.kind,
            })
            .collect();
        contract.validate(&slots)?;

        let wgpu_entries: Vec<wgpu::BindGroupEntry<'_>> = entries
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.raw.as_entire_binding(),
            })
            .collect();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: pipeline.bind_group_layout(),
            entries: &wgpu_entries,
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(Error::BindingMismatch(err.to_string()));
        }

        Ok(bind_group)
    }

    fn create_instance() -> Instance {
        Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        })
    }

    fn create_offscreen_texture(
        device: &Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    async fn request_adapter(instance: &Instance, surface: Option<&Surface<'_>>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::AdapterUnavailable(e.to_string()))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Sphere Tracer Device"),
                required_features: Features::empty(),
                required_limits: Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))
    }
}

impl RenderContext for ContextHandle {
    type Buffer = wgpu::Buffer;
    type Pipeline = Pipeline;
    type BindGroup = wgpu::BindGroup;
    type Command = EncodedFrame;

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn encode_render_pass(
        &self,
        vertex_count: u32,
        pipeline: &Pipeline,
        vertex_buffer: &wgpu::Buffer,
        bind_group: &wgpu::BindGroup,
    ) -> Result<EncodedFrame> {
        let (view, surface_texture) = match &self.target {
            RenderTarget::Surface { surface, .. } => {
                let texture = surface.get_current_texture()?;
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (view, Some(texture))
            }
            RenderTarget::Offscreen { texture } => {
                (texture.create_view(&wgpu::TextureViewDescriptor::default()), None)
            }
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            record_draw(
                &mut render_pass,
                vertex_count,
                pipeline.raw(),
                vertex_buffer,
                bind_group,
            );
        }

        if let Some(overlay) = self.overlay.borrow_mut().as_mut() {
            overlay.encode(&self.device, &self.queue, &mut encoder, &view);
        }

        Ok(EncodedFrame {
            commands: encoder.finish(),
            surface_texture,
        })
    }

    fn submit_command(&self, frame: EncodedFrame) {
        self.queue.submit(std::iter::once(frame.commands));
        if let Some(texture) = frame.surface_texture {
            texture.present();
        }
    }
}

/// Pick the output format: the first sRGB format offered, else the first one
pub fn preferred_format(formats: &[wgpu::TextureFormat]) -> Result<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
        .ok_or(Error::NoSurfaceFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_prefers_srgb_format() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(preferred_format(&formats).unwrap(), TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba16Float, TextureFormat::Bgra8Unorm];
        assert_eq!(preferred_format(&formats).unwrap(), TextureFormat::Rgba16Float);
    }

    #[test]
    fn test_no_formats_is_an_error() {
        assert!(matches!(preferred_format(&[]), Err(Error::NoSurfaceFormat)));
    }
}
