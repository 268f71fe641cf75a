pub mod binding;
pub mod buffer;
pub mod frame_driver;
pub mod gpu_context;
pub mod quad;
pub mod render_pipeline;
pub mod resources;
pub mod scene;
pub mod sphere;

pub use binding::{BindingSlot, ShaderContract};
pub use buffer::{BufferKind, GpuBuffer};
pub use frame_driver::{CancelHandle, FrameDriver, Schedule, Trigger};
pub use gpu_context::{ContextHandle, EncodedFrame};
pub use render_pipeline::{Pipeline, PipelineConfig, ShaderSource, VertexLayout};
pub use resources::{FrameUniform, SceneResources};
pub use scene::Scene;
pub use sphere::{Hittable, HittableField};
