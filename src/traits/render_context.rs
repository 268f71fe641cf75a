use crate::error::Result;

/// Queue-side operations the frame driver issues, in issuance order
///
/// Implementations own a single queue, so a write issued before a submit is
/// visible to the work in that submit.
pub trait RenderContext {
    type Buffer;
    type Pipeline;
    type BindGroup;
    type Command;

    /// Enqueue a write of `data` at `offset` into `buffer`
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    /// Record one render pass drawing `vertex_count` vertices; nothing is submitted
    fn encode_render_pass(
        &self,
        vertex_count: u32,
        pipeline: &Self::Pipeline,
        vertex_buffer: &Self::Buffer,
        bind_group: &Self::BindGroup,
    ) -> Result<Self::Command>;

    /// Submit a previously encoded command to the queue
    fn submit_command(&self, command: Self::Command);
}
