// THEORY:
// The `aim_loop` drives the engine against its collaborators, one cycle at a time:
//
//   capture → detect → select → (inject if engaged) → (render overlay) → repeat
//
// Everything a cycle touches is local to it: the frame is dropped at the end and no
// target identity carries over. The loop is single-threaded and synchronous; only the
// capture call and the display may block. There is no retry logic. Any collaborator
// error ends the loop and is handed back to the caller. The loop stops on its own only
// when the debug display reports the termination key.

use crate::collaborators::{
    ActivationProvider, CaptureRegion, DebugDisplay, DisplayControl, FrameSource, InputSink,
};
use crate::core_modules::observer::OverlayRenderer;
use crate::error::VisionResult;
use crate::pipeline::{AimPipeline, Movement, SelectionResult};
use std::time::Duration;
use tracing::info;

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Pause between cycles.
    pub cycle_delay: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycle_delay: Duration::from_millis(25),
        }
    }
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Candidates that survived filtering.
    pub candidates: usize,
    pub selection: Option<SelectionResult>,
    /// Movement handed to the input sink, if the activation key was engaged.
    pub emitted: Option<Movement>,
    pub control: DisplayControl,
}

/// Running totals over a loop's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    pub cycles: u64,
    pub selections: u64,
    pub movements: u64,
}

pub struct AimLoop<S, A, I> {
    pipeline: AimPipeline,
    region: CaptureRegion,
    source: S,
    activation: A,
    input: I,
    display: Option<Box<dyn DebugDisplay>>,
    config: LoopConfig,
    stats: CycleStats,
}

impl<S, A, I> AimLoop<S, A, I>
where
    S: FrameSource,
    A: ActivationProvider,
    I: InputSink,
{
    pub fn new(pipeline: AimPipeline, region: CaptureRegion, source: S, activation: A, input: I) -> Self {
        Self {
            pipeline,
            region,
            source,
            activation,
            input,
            display: None,
            config: LoopConfig::default(),
            stats: CycleStats::default(),
        }
    }

    pub fn with_display(mut self, display: Box<dyn DebugDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Runs one capture-to-injection cycle.
    pub fn step(&mut self) -> VisionResult<CycleOutcome> {
        let frame = self.source.capture(&self.region)?;
        let config = self.pipeline.config();

        let (report, overlay) = match self.display {
            Some(_) => {
                let mut renderer = OverlayRenderer::new(&frame, config.square_size, config.target_size);
                let report = self.pipeline.analyze_observed(&frame, &mut renderer)?;
                (report, Some(renderer.into_image()))
            }
            None => (self.pipeline.analyze(&frame)?, None),
        };
        drop(frame);

        // Activation is polled only when there is something to aim at.
        let emitted = match &report.selection {
            Some(selection) if self.activation.is_engaged() => {
                let movement = selection.movement;
                self.input.move_relative(movement.dx, movement.dy)?;
                info!(dx = movement.dx, dy = movement.dy, "movement emitted");
                Some(movement)
            }
            _ => None,
        };

        let control = match (self.display.as_mut(), overlay) {
            (Some(display), Some(overlay)) => display.show(&overlay)?,
            _ => DisplayControl::Continue,
        };

        self.stats.cycles += 1;
        if report.selection.is_some() {
            self.stats.selections += 1;
        }
        if emitted.is_some() {
            self.stats.movements += 1;
        }

        Ok(CycleOutcome {
            candidates: report.candidates.len(),
            selection: report.selection,
            emitted,
            control,
        })
    }

    /// Cycles until the display reports `Stop` or a collaborator fails.
    ///
    /// This is the blocking variant: it sleeps the calling thread for `cycle_delay`
    /// between cycles. Callers that pace cycles themselves, or need to stop on other
    /// events, drive `step` directly and read the delay from `config`.
    pub fn run(&mut self) -> VisionResult<CycleStats> {
        loop {
            let outcome = self.step()?;
            if outcome.control == DisplayControl::Stop {
                info!(cycles = self.stats.cycles, "termination requested");
                return Ok(self.stats);
            }
            if !self.config.cycle_delay.is_zero() {
                std::thread::sleep(self.config.cycle_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::Frame;
    use crate::error::VisionError;
    use crate::pipeline::DetectionConfig;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;
    use std::rc::Rc;

    const MARKER: Rgba<u8> = Rgba([200, 60, 200, 255]);

    fn target_frame() -> Frame {
        let mut image = RgbaImage::from_pixel(600, 600, Rgba([0, 0, 0, 255]));
        for y in 260..300 {
            for x in 300..340 {
                image.put_pixel(x, y, MARKER);
            }
        }
        Frame::from_rgba_image(image)
    }

    /// Serves the same frame a fixed number of times, then fails.
    struct RepeatSource {
        frame: Frame,
        remaining: u64,
    }

    impl FrameSource for RepeatSource {
        fn capture(&mut self, region: &CaptureRegion) -> VisionResult<Frame> {
            assert_eq!(region.size, 600);
            if self.remaining == 0 {
                return Err(VisionError::capture("device lost"));
            }
            self.remaining -= 1;
            Ok(self.frame.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        moves: Vec<(i32, i32)>,
    }

    impl InputSink for RecordingSink {
        fn move_relative(&mut self, dx: i32, dy: i32) -> VisionResult<()> {
            self.moves.push((dx, dy));
            Ok(())
        }
    }

    /// Asks to stop after a number of frames.
    struct CountdownDisplay {
        shown: Rc<Cell<u32>>,
        stop_after: u32,
    }

    impl DebugDisplay for CountdownDisplay {
        fn show(&mut self, overlay: &RgbaImage) -> VisionResult<DisplayControl> {
            assert_eq!(overlay.dimensions(), (600, 600));
            self.shown.set(self.shown.get() + 1);
            if self.shown.get() >= self.stop_after {
                Ok(DisplayControl::Stop)
            } else {
                Ok(DisplayControl::Continue)
            }
        }
    }

    fn aim_loop<A: ActivationProvider>(remaining: u64, activation: A) -> AimLoop<RepeatSource, A, RecordingSink> {
        let pipeline = AimPipeline::new(DetectionConfig::default()).unwrap();
        let source = RepeatSource {
            frame: target_frame(),
            remaining,
        };
        AimLoop::new(
            pipeline,
            CaptureRegion::centered(1920, 1080, 600),
            source,
            activation,
            RecordingSink::default(),
        )
        .with_config(LoopConfig {
            cycle_delay: Duration::ZERO,
        })
    }

    #[test]
    fn engaged_cycles_emit_the_selected_movement() {
        let mut aim = aim_loop(1, || true);
        let outcome = aim.step().unwrap();
        assert_eq!(outcome.candidates, 1);
        assert_eq!(outcome.emitted, Some(Movement { dx: 9, dy: -10 }));
        assert_eq!(aim.input().moves, vec![(9, -10)]);
    }

    #[test]
    fn disengaged_cycles_compute_but_do_not_emit() {
        let mut aim = aim_loop(1, || false);
        let outcome = aim.step().unwrap();
        assert!(outcome.selection.is_some());
        assert_eq!(outcome.emitted, None);
        assert!(aim.input().moves.is_empty());
    }

    #[test]
    fn activation_is_not_polled_without_a_target() {
        let polls = Rc::new(Cell::new(0));
        let counter = polls.clone();
        let mut aim = aim_loop(1, move || {
            counter.set(counter.get() + 1);
            true
        });
        aim.source.frame = Frame::from_rgba_image(RgbaImage::new(600, 600));
        let outcome = aim.step().unwrap();
        assert_eq!(outcome.selection, None);
        assert_eq!(polls.get(), 0);
    }

    #[test]
    fn run_stops_when_the_display_says_so() {
        let shown = Rc::new(Cell::new(0));
        let display = CountdownDisplay {
            shown: shown.clone(),
            stop_after: 3,
        };
        let mut aim = aim_loop(10, || true).with_display(Box::new(display));
        let stats = aim.run().unwrap();
        assert_eq!(shown.get(), 3);
        assert_eq!(
            stats,
            CycleStats {
                cycles: 3,
                selections: 3,
                movements: 3
            }
        );
    }

    #[test]
    fn frames_that_do_not_match_the_region_end_the_loop() {
        let mut aim = aim_loop(3, || true);
        aim.source.frame = Frame::from_rgba_image(RgbaImage::new(400, 400));
        let error = aim.run().unwrap_err();
        assert!(matches!(error, VisionError::InvalidFrame { .. }));
        assert_eq!(aim.stats().cycles, 0);
        assert!(aim.input().moves.is_empty());
    }

    #[test]
    fn capture_failures_end_the_loop() {
        let mut aim = aim_loop(2, || true);
        let error = aim.run().unwrap_err();
        assert!(matches!(error, VisionError::Capture { .. }));
        assert_eq!(aim.stats().cycles, 2);
    }
}
