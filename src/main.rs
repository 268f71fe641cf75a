use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sphere_tracer::cli::Cli;
use sphere_tracer::core::{ContextHandle, Schedule, Scene, Trigger};
use sphere_tracer::frame::FrameClock;
use sphere_tracer::logging::init_logging;
use sphere_tracer::panel::ControlPanel;
use sphere_tracer::Session;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    session: Option<Session<ContextHandle>>,
    panel: Option<ControlPanel>,
    clock: FrameClock,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            session: None,
            panel: None,
            clock: FrameClock::new(),
        }
    }

    fn setup(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let mut session = pollster::block_on(Session::for_window(
            window.clone(),
            Scene::default(),
            self.cli.trigger(),
        ))
        .context("failed to initialize renderer")?;

        if !self.cli.no_ui {
            let context = session.driver_mut().context_mut();
            let (panel, overlay) = ControlPanel::new(&window, context.device(), context.format());
            context.set_overlay(Box::new(overlay));
            self.panel = Some(panel);
        }

        session.start().context("failed to upload initial scene")?;

        self.session = Some(session);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = &self.session {
            session.cancel_handle().cancel();
        }
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let (Some(session), Some(window)) = (&mut self.session, &self.window) else {
            return;
        };

        let events = match &mut self.panel {
            Some(panel) => panel.run(window, session.scene()),
            None => Vec::new(),
        };
        let changed = !events.is_empty();
        for event in events {
            if let Err(e) = session.apply(event) {
                log::error!("update rejected: {}", e);
            }
        }

        match session.driver().trigger() {
            Trigger::OnChange => {
                // Panel-only repaints still need the scene underneath.
                if !changed {
                    if let Err(e) = session.redraw() {
                        log::error!("render error: {}", e);
                    }
                }
            }
            Trigger::OnTick => {
                let frame = self.clock.next_frame();
                match session.tick(frame) {
                    Ok(Schedule::Next) => window.request_redraw(),
                    Ok(Schedule::Stop) => {
                        log::info!("continuous rendering stopped at frame {}", frame.number)
                    }
                    Err(e) => log::error!("render error: {}", e),
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Sphere Tracer")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.setup(window.clone()) {
            log::error!("{:#}", e);
            event_loop.exit();
            return;
        }
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(panel), Some(window)) = (&mut self.panel, &self.window) {
            let response = panel.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(session) = &mut self.session {
                    if let Err(e) = session.resize(size.width, size.height) {
                        log::error!("resize failed: {}", e);
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter.as_deref());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    log::info!("Sphere Tracer - drag the sliders to edit spheres, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
