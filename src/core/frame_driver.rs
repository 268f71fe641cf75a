use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::buffer::GpuBuffer;
use super::resources::{FrameUniform, SceneResources};
use super::scene::Scene;
use crate::error::{Error, Result};
use crate::frame::FrameInfo;
use crate::traits::RenderContext;

/// What causes a new frame to be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every scene change re-renders immediately
    OnChange,
    /// The display refresh drives rendering; scene changes wait for the next tick
    OnTick,
}

/// Whether a continuous driver wants another refresh callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Next,
    Stop,
}

/// Stop flag for continuous rendering, checked before each re-schedule
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Writes scene and frame data, then encodes and submits the scene pass
///
/// Every submission is preceded, on the same queue, by the writes it
/// depends on. There is exactly one producer, so no further synchronization
/// is needed.
pub struct FrameDriver<C: RenderContext> {
    context: C,
    resources: SceneResources<C>,
    trigger: Trigger,
    uploaded_count: Option<u32>,
    last_time: f32,
    frames_submitted: u64,
    cancel: CancelHandle,
}

impl<C: RenderContext> FrameDriver<C> {
    pub fn new(context: C, resources: SceneResources<C>, trigger: Trigger) -> Self {
        Self {
            context,
            resources,
            trigger,
            uploaded_count: None,
            last_time: 0.0,
            frames_submitted: 0,
            cancel: CancelHandle::default(),
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn resources(&self) -> &SceneResources<C> {
        &self.resources
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Last time value written to the frame uniform
    pub fn last_time(&self) -> f32 {
        self.last_time
    }

    /// Upload the full scene; in change-driven mode also render it
    ///
    /// Storage bytes and count are validated together before either write
    /// is issued, so the count on the GPU never disagrees with the array.
    pub fn on_change(&mut self, scene: &Scene) -> Result<()> {
        let payload = scene.serialize(self.resources.hittables.capacity)?;
        let count = scene.count();
        let count_bytes = (count as i32).to_ne_bytes();

        self.resources.hittables.check_write(0, payload.len())?;
        self.resources
            .hittable_count
            .check_write(0, count_bytes.len())?;

        self.context
            .write_buffer(&self.resources.hittables.raw, 0, payload);
        if self.uploaded_count != Some(count) {
            self.context
                .write_buffer(&self.resources.hittable_count.raw, 0, &count_bytes);
            self.uploaded_count = Some(count);
        }
        log::trace!("uploaded {} hittables ({} bytes)", count, payload.len());

        match self.trigger {
            Trigger::OnChange => self.present(),
            Trigger::OnTick => Ok(()),
        }
    }

    /// Advance continuous rendering by one refresh callback
    ///
    /// The written time never decreases, even if `frame.time` does.
    pub fn tick(&mut self, frame: FrameInfo) -> Result<Schedule> {
        if self.trigger != Trigger::OnTick {
            return Err(Error::TriggerMismatch {
                expected: Trigger::OnTick,
                actual: self.trigger,
            });
        }
        if self.cancel.is_cancelled() {
            return Ok(Schedule::Stop);
        }

        let time = frame.time.max(self.last_time);
        Self::write(
            &self.context,
            &self.resources.frame_uniform,
            FrameUniform::TIME_OFFSET,
            bytemuck::bytes_of(&time),
        )?;
        self.last_time = time;

        self.present()?;

        if self.cancel.is_cancelled() {
            log::debug!("continuous rendering stopped after frame {}", frame.number);
            Ok(Schedule::Stop)
        } else {
            Ok(Schedule::Next)
        }
    }

    /// Rewrite the canvas size stored in the frame uniform
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> Result<()> {
        let size = FrameUniform::new(width, height).canvas_size;
        Self::write(
            &self.context,
            &self.resources.frame_uniform,
            FrameUniform::CANVAS_SIZE_OFFSET,
            bytemuck::cast_slice(&size),
        )
    }

    /// Submit the scene pass again without writing anything
    pub fn redraw(&mut self) -> Result<()> {
        self.present()
    }

    fn present(&mut self) -> Result<()> {
        let command = self.context.encode_render_pass(
            self.resources.vertex_count,
            &self.resources.pipeline,
            &self.resources.vertex_buffer.raw,
            &self.resources.bind_group,
        )?;
        self.context.submit_command(command);
        self.frames_submitted += 1;
        Ok(())
    }

    fn write(context: &C, buffer: &GpuBuffer<C::Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        buffer.check_write(offset, data.len())?;
        context.write_buffer(&buffer.raw, offset, data);
        Ok(())
    }
}
