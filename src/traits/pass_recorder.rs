use std::ops::Range;

/// The subset of render pass commands a scene draw uses
pub trait PassRecorder {
    type Pipeline;
    type Buffer;
    type BindGroup;

    fn set_pipeline(&mut self, pipeline: &Self::Pipeline);

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &Self::Buffer);

    fn set_bind_group(&mut self, index: u32, bind_group: &Self::BindGroup);

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);
}

/// Bind everything at slot/group 0 and issue a single non-instanced draw
pub fn record_draw<R: PassRecorder>(
    pass: &mut R,
    vertex_count: u32,
    pipeline: &R::Pipeline,
    vertex_buffer: &R::Buffer,
    bind_group: &R::BindGroup,
) {
    pass.set_pipeline(pipeline);
    pass.set_vertex_buffer(0, vertex_buffer);
    pass.set_bind_group(0, bind_group);
    pass.draw(0..vertex_count, 0..1);
}

impl PassRecorder for wgpu::RenderPass<'_> {
    type Pipeline = wgpu::RenderPipeline;
    type Buffer = wgpu::Buffer;
    type BindGroup = wgpu::BindGroup;

    fn set_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        wgpu::RenderPass::set_pipeline(self, pipeline);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer) {
        wgpu::RenderPass::set_vertex_buffer(self, slot, buffer.slice(..));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: &wgpu::BindGroup) {
        wgpu::RenderPass::set_bind_group(self, index, bind_group, &[]);
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        wgpu::RenderPass::draw(self, vertices, instances);
    }
}
