use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use winit::window::Window;

use crate::controls::{ControlEvent, PANEL_FIELDS, PANEL_FOLDERS};
use crate::core::scene::Scene;
use crate::traits::OverlayPass;

/// Tessellated panel output waiting to be drawn
struct PanelFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

type SharedFrame = Rc<RefCell<Option<PanelFrame>>>;

/// Slider panel editing sphere albedo, fuzz and radius
pub struct ControlPanel {
    ctx: egui::Context,
    state: egui_winit::State,
    frame: SharedFrame,
}

/// Draws the latest panel output on top of the scene pass
pub struct PanelOverlay {
    renderer: egui_wgpu::Renderer,
    frame: SharedFrame,
}

impl ControlPanel {
    /// Create the panel and the overlay that renders it into `format` targets
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> (Self, PanelOverlay) {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        let frame: SharedFrame = Rc::new(RefCell::new(None));

        let panel = Self {
            ctx,
            state,
            frame: frame.clone(),
        };
        (panel, PanelOverlay { renderer, frame })
    }

    /// Feed a window event to egui
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.state.on_window_event(window, event)
    }

    /// Lay out the panel for `scene` and return the edits made this frame
    pub fn run(&mut self, window: &Window, scene: &Scene) -> Vec<ControlEvent> {
        let raw_input = self.state.take_egui_input(window);
        let mut events = Vec::new();

        let full_output = self.ctx.run(raw_input, |ctx| {
            // egui may run this closure more than once per frame; keep the last pass
            events.clear();
            egui::Window::new("Spheres")
                .resizable(false)
                .default_pos(egui::pos2(10.0, 10.0))
                .show(ctx, |ui| {
                    for (index, title) in PANEL_FOLDERS {
                        let Some(sphere) = scene.get(index) else {
                            continue;
                        };
                        egui::CollapsingHeader::new(title)
                            .default_open(index == 0)
                            .show(ui, |ui| {
                                for field in PANEL_FIELDS {
                                    let Some(range) = field.control_range() else {
                                        continue;
                                    };
                                    let mut value = sphere.field(field);
                                    let slider = egui::Slider::new(&mut value, range.min..=range.max)
                                        .step_by(range.step as f64)
                                        .text(field.label());
                                    if ui.add(slider).changed() {
                                        events.push(ControlEvent::new(index, field, value));
                                    }
                                }
                            });
                    }
                });
        });

        // Animations such as a folder opening ask for the next frame right away.
        let repaint_delay = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|viewport| viewport.repaint_delay);
        if repaint_now(repaint_delay) {
            window.request_redraw();
        }

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let size = window.inner_size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut slot = self.frame.borrow_mut();
        let mut textures_delta = full_output.textures_delta;
        if let Some(previous) = slot.take() {
            // Texture uploads not yet drawn must still reach the renderer.
            let mut pending = previous.textures_delta;
            pending.append(textures_delta);
            textures_delta = pending;
        }
        *slot = Some(PanelFrame {
            primitives,
            textures_delta,
            screen,
        });

        events
    }
}

/// Whether egui wants another frame without waiting for input
fn repaint_now(delay: Option<Duration>) -> bool {
    delay.is_some_and(|delay| delay.is_zero())
}

impl OverlayPass for PanelOverlay {
    fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let mut slot = self.frame.borrow_mut();
        let Some(frame) = slot.as_mut() else {
            return;
        };

        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &frame.primitives, &frame.screen);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Panel Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &frame.primitives, &frame.screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
        frame.textures_delta = egui::TexturesDelta::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_requests_repaint() {
        assert!(repaint_now(Some(Duration::ZERO)));
    }

    #[test]
    fn test_idle_panel_waits_for_input() {
        assert!(!repaint_now(Some(Duration::MAX)));
        assert!(!repaint_now(Some(Duration::from_millis(500))));
        assert!(!repaint_now(None));
    }
}
