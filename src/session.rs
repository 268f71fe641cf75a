use std::sync::Arc;

use winit::window::Window;

use crate::controls::ControlEvent;
use crate::core::frame_driver::{CancelHandle, FrameDriver, Schedule, Trigger};
use crate::core::gpu_context::ContextHandle;
use crate::core::resources::SceneResources;
use crate::core::scene::Scene;
use crate::error::Result;
use crate::frame::FrameInfo;
use crate::traits::RenderContext;

/// One rendering session: the scene and the driver that shows it
pub struct Session<C: RenderContext> {
    scene: Scene,
    driver: FrameDriver<C>,
}

impl<C: RenderContext> Session<C> {
    pub fn new(scene: Scene, driver: FrameDriver<C>) -> Self {
        Self { scene, driver }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn driver(&self) -> &FrameDriver<C> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut FrameDriver<C> {
        &mut self.driver
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.driver.cancel_handle()
    }

    /// Initial upload, and first frame in change-driven mode
    pub fn start(&mut self) -> Result<()> {
        self.driver.on_change(&self.scene)
    }

    /// Apply a control change and push the updated scene
    ///
    /// Values of panel-controlled fields are clamped to the slider range.
    pub fn apply(&mut self, event: ControlEvent) -> Result<()> {
        let value = match event.field.control_range() {
            Some(range) if event.value.is_finite() => range.clamp(event.value),
            _ => event.value,
        };
        self.scene.mutate(event.primitive_index, event.field, value)?;
        log::debug!(
            "sphere {} {} = {}",
            event.primitive_index,
            event.field.label(),
            value
        );
        self.driver.on_change(&self.scene)
    }

    pub fn tick(&mut self, frame: FrameInfo) -> Result<Schedule> {
        self.driver.tick(frame)
    }

    pub fn redraw(&mut self) -> Result<()> {
        self.driver.redraw()
    }
}

impl Session<ContextHandle> {
    /// Acquire the GPU for `window` and set up every session resource
    pub async fn for_window(window: Arc<Window>, scene: Scene, trigger: Trigger) -> Result<Self> {
        let context = ContextHandle::initialize(window).await?;
        let resources = SceneResources::create(&context)?;
        let driver = FrameDriver::new(context, resources, trigger);
        Ok(Self::new(scene, driver))
    }

    /// Follow a window resize: reconfigure the surface and the canvas uniform
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.driver.context_mut().resize(width, height);
        self.driver.set_canvas_size(width, height)
    }
}
