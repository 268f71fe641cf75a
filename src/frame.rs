use std::time::Instant;

/// One refresh of continuous rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the clock started; never smaller than the previous frame's
    pub time: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32) -> Self {
        Self { number, time }
    }
}

/// Elapsed-time source for `FrameDriver::tick`
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    next_number: u64,
    last_time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            next_number: 0,
            last_time: 0.0,
        }
    }

    /// Stamp the next frame with the time elapsed since `new`
    pub fn next_frame(&mut self) -> FrameInfo {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.advance(elapsed)
    }

    fn advance(&mut self, elapsed: f32) -> FrameInfo {
        self.last_time = elapsed.max(self.last_time);
        let frame = FrameInfo::new(self.next_number, self.last_time);
        self.next_number += 1;
        frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
