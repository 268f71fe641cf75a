/// Extra drawing appended after the scene pass, in the same encoder
pub trait OverlayPass {
    fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    );
}
