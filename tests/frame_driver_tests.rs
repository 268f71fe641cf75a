use std::cell::RefCell;

use sphere_tracer::controls::ControlEvent;
use sphere_tracer::core::resources::{
    FrameUniform, COUNT_BUFFER_BYTES, FRAME_UNIFORM_BYTES, HITTABLE_CAPACITY_BYTES,
};
use sphere_tracer::core::{
    BufferKind, FrameDriver, GpuBuffer, Hittable, HittableField, Schedule, Scene,
    SceneResources, Trigger,
};
use sphere_tracer::frame::FrameInfo;
use sphere_tracer::traits::RenderContext;
use sphere_tracer::{Error, Result, Session};

/// Everything the driver asked the queue to do, in order
#[derive(Debug, Clone, PartialEq)]
enum Op {
    Write {
        buffer: &'static str,
        offset: u64,
        data: Vec<u8>,
    },
    Encode(u32),
    Submit(u64),
}

/// Records queue operations instead of talking to a GPU
#[derive(Default)]
struct RecordingContext {
    ops: RefCell<Vec<Op>>,
    encoded: RefCell<u64>,
}

impl RecordingContext {
    fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn writes_to(&self, name: &str) -> Vec<(u64, Vec<u8>)> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Write { buffer, offset, data } if *buffer == name => {
                    Some((*offset, data.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn submits(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::Submit(_)))
            .count()
    }

    fn clear(&self) {
        self.ops.borrow_mut().clear();
    }
}

impl RenderContext for RecordingContext {
    type Buffer = &'static str;
    type Pipeline = ();
    type BindGroup = ();
    type Command = u64;

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        self.ops.borrow_mut().push(Op::Write {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn encode_render_pass(
        &self,
        vertex_count: u32,
        _pipeline: &Self::Pipeline,
        _vertex_buffer: &Self::Buffer,
        _bind_group: &Self::BindGroup,
    ) -> Result<Self::Command> {
        self.ops.borrow_mut().push(Op::Encode(vertex_count));
        let mut encoded = self.encoded.borrow_mut();
        *encoded += 1;
        Ok(*encoded)
    }

    fn submit_command(&self, command: Self::Command) {
        self.ops.borrow_mut().push(Op::Submit(command));
    }
}

fn resources() -> SceneResources<RecordingContext> {
    SceneResources {
        pipeline: (),
        vertex_buffer: GpuBuffer::new("quad", BufferKind::Vertex, 48, "quad"),
        vertex_count: 6,
        frame_uniform: GpuBuffer::new("frame", BufferKind::Uniform, FRAME_UNIFORM_BYTES, "frame"),
        hittables: GpuBuffer::new(
            "hittables",
            BufferKind::Storage,
            HITTABLE_CAPACITY_BYTES,
            "hittables",
        ),
        hittable_count: GpuBuffer::new("count", BufferKind::Uniform, COUNT_BUFFER_BYTES, "count"),
        bind_group: (),
    }
}

fn driver(trigger: Trigger) -> FrameDriver<RecordingContext> {
    FrameDriver::new(RecordingContext::default(), resources(), trigger)
}

fn frame(number: u64, time: f32) -> FrameInfo {
    FrameInfo::new(number, time)
}

fn f32_at(data: &[u8]) -> f32 {
    f32::from_ne_bytes([data[0], data[1], data[2], data[3]])
}

// ============================================================================
// Change-driven rendering
// ============================================================================

#[test]
fn test_on_change_writes_before_submit() {
    let mut driver = driver(Trigger::OnChange);
    let scene = Scene::default();

    driver.on_change(&scene).unwrap();

    let ops = driver.context().ops();
    assert_eq!(ops.len(), 4);
    assert!(matches!(&ops[0], Op::Write { buffer: "hittables", offset: 0, .. }));
    assert!(matches!(&ops[1], Op::Write { buffer: "count", offset: 0, .. }));
    assert_eq!(ops[2], Op::Encode(6));
    assert_eq!(ops[3], Op::Submit(1));
    assert_eq!(driver.frames_submitted(), 1);
}

#[test]
fn test_on_change_uploads_full_scene_and_count() {
    let mut driver = driver(Trigger::OnChange);
    let scene = Scene::default();

    driver.on_change(&scene).unwrap();

    let hittables = driver.context().writes_to("hittables");
    assert_eq!(hittables.len(), 1);
    assert_eq!(hittables[0].1, scene.serialize(256).unwrap());

    let count = driver.context().writes_to("count");
    assert_eq!(count, vec![(0, 4i32.to_ne_bytes().to_vec())]);
}

#[test]
fn test_count_is_written_only_when_it_changes() {
    let mut driver = driver(Trigger::OnChange);
    let mut scene = Scene::new(vec![Hittable::new(
        glam::Vec3::new(0.0, 0.0, -3.0),
        1.0,
        1.0,
        [0.5; 3],
        0.1,
    )]);

    driver.on_change(&scene).unwrap();
    scene.mutate(0, HittableField::AlbedoR, 0.9).unwrap();
    driver.on_change(&scene).unwrap();
    assert_eq!(driver.context().writes_to("count").len(), 1);
    assert_eq!(driver.context().writes_to("hittables").len(), 2);

    scene.push(Hittable::new(glam::Vec3::ZERO, 0.5, 2.0, [0.2; 3], 0.0));
    driver.on_change(&scene).unwrap();

    let count = driver.context().writes_to("count");
    assert_eq!(count.len(), 2);
    assert_eq!(count[1].1, 2i32.to_ne_bytes().to_vec());
}

#[test]
fn test_oversized_scene_aborts_without_writes() {
    let mut driver = driver(Trigger::OnChange);
    let mut scene = Scene::default();
    scene.push(Hittable::new(glam::Vec3::ZERO, 1.0, 1.0, [1.0; 3], 0.0));

    let result = driver.on_change(&scene);

    assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
    assert!(driver.context().ops().is_empty());
    assert_eq!(driver.frames_submitted(), 0);
}

#[test]
fn test_redraw_submits_without_writing() {
    let mut driver = driver(Trigger::OnChange);
    driver.on_change(&Scene::default()).unwrap();
    driver.context().clear();

    driver.redraw().unwrap();

    assert_eq!(driver.context().ops(), vec![Op::Encode(6), Op::Submit(2)]);
}

#[test]
fn test_canvas_size_written_at_start_of_uniform() {
    let mut driver = driver(Trigger::OnChange);

    driver.set_canvas_size(800, 600).unwrap();

    let writes = driver.context().writes_to("frame");
    assert_eq!(writes.len(), 1);
    let (offset, data) = &writes[0];
    assert_eq!(*offset, FrameUniform::CANVAS_SIZE_OFFSET);
    assert_eq!(data.len(), 8);
    assert_eq!(f32_at(&data[0..4]), 800.0);
    assert_eq!(f32_at(&data[4..8]), 600.0);
}

// ============================================================================
// Tick-driven rendering
// ============================================================================

#[test]
fn test_on_change_defers_render_in_tick_mode() {
    let mut driver = driver(Trigger::OnTick);

    driver.on_change(&Scene::default()).unwrap();

    assert_eq!(driver.context().submits(), 0);
    assert_eq!(driver.context().writes_to("hittables").len(), 1);
}

#[test]
fn test_tick_writes_time_then_submits() {
    let mut driver = driver(Trigger::OnTick);

    let schedule = driver.tick(frame(0, 0.5)).unwrap();

    assert_eq!(schedule, Schedule::Next);
    let ops = driver.context().ops();
    assert_eq!(ops.len(), 3);
    match &ops[0] {
        Op::Write { buffer, offset, data } => {
            assert_eq!(*buffer, "frame");
            assert_eq!(*offset, FrameUniform::TIME_OFFSET);
            assert_eq!(f32_at(data), 0.5);
        }
        other => panic!("expected time write, got {:?}", other),
    }
    assert_eq!(ops[1], Op::Encode(6));
    assert_eq!(ops[2], Op::Submit(1));
}

#[test]
fn test_tick_time_never_decreases() {
    let mut driver = driver(Trigger::OnTick);

    for (number, time) in [(0, 1.0), (1, 2.0), (2, 1.5), (3, 3.0)] {
        driver.tick(frame(number, time)).unwrap();
    }

    let times: Vec<f32> = driver
        .context()
        .writes_to("frame")
        .iter()
        .map(|(_, data)| f32_at(data))
        .collect();
    assert_eq!(times, vec![1.0, 2.0, 2.0, 3.0]);
    assert_eq!(driver.last_time(), 3.0);
}

#[test]
fn test_tick_rejected_in_change_mode() {
    let mut driver = driver(Trigger::OnChange);

    match driver.tick(frame(0, 0.0)) {
        Err(Error::TriggerMismatch { expected, actual }) => {
            assert_eq!(expected, Trigger::OnTick);
            assert_eq!(actual, Trigger::OnChange);
        }
        other => panic!("expected TriggerMismatch, got {:?}", other),
    }
    assert!(driver.context().ops().is_empty());
}

#[test]
fn test_cancel_stops_ticks() {
    let mut driver = driver(Trigger::OnTick);
    let cancel = driver.cancel_handle();

    assert_eq!(driver.tick(frame(0, 0.1)).unwrap(), Schedule::Next);
    cancel.cancel();
    assert_eq!(driver.tick(frame(1, 0.2)).unwrap(), Schedule::Stop);

    assert_eq!(driver.frames_submitted(), 1);
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_session_apply_updates_scene_and_uploads() {
    let mut session = Session::new(Scene::default(), driver(Trigger::OnChange));
    session.start().unwrap();

    session
        .apply(ControlEvent::new(0, HittableField::AlbedoR, 0.25))
        .unwrap();

    assert_eq!(session.scene().get(0).unwrap().albedo[0], 0.25);
    let uploads = session.driver().context().writes_to("hittables");
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[1].1, session.scene().serialize(256).unwrap());
    assert_eq!(session.driver().frames_submitted(), 2);
}

#[test]
fn test_session_apply_clamps_to_slider_range() {
    let mut session = Session::new(Scene::default(), driver(Trigger::OnChange));

    session
        .apply(ControlEvent::new(1, HittableField::Radius, 5.0))
        .unwrap();
    session
        .apply(ControlEvent::new(1, HittableField::Fuzz, -1.0))
        .unwrap();

    let sphere = session.scene().get(1).unwrap();
    assert_eq!(sphere.radius, 2.0);
    assert_eq!(sphere.fuzz, 0.0);
}

#[test]
fn test_session_apply_rejects_bad_index() {
    let mut session = Session::new(Scene::default(), driver(Trigger::OnChange));

    let result = session.apply(ControlEvent::new(9, HittableField::Fuzz, 0.5));

    assert!(matches!(result, Err(Error::PrimitiveIndex { index: 9, len: 4 })));
    assert!(session.driver().context().ops().is_empty());
}
