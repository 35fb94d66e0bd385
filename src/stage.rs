use crate::features::{
    cup::Cup,
    thermometer::{Scale, Thermometer, TUBE_HEIGHT},
    Item, ItemEvent,
};
use crate::gfx::{
    anim::Easing,
    draw::DrawContext,
    math::{Color, Vec2},
};
use crate::physics::{format_readout, make_easing, Body, TemperatureModel};
use crate::report::{trial::Trial, TrialReporter};
use log::{debug, info};
use std::rc::Rc;

pub const VIEWPORT: [f64; 2] = [330.0, 200.0];

/// The item whose transfer cues drive the shared clock.
const CLOCK_BODY: Body = Body::Hot;

const CUP_ORIGINS: [Vec2; 2] = [Vec2 { x: 40.0, y: 60.0 }, Vec2 { x: 130.0, y: 60.0 }];
const THERMOMETER_ORIGINS: [Vec2; 2] = [Vec2 { x: 220.0, y: 70.0 }, Vec2 { x: 295.0, y: 70.0 }];
const SCALE_MARKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// The clock advanced to this time and the samples were reported.
    Tick(u32),
    /// Every body finished. Emitted once per run.
    Completed,
}

/// One finished flag per body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Completion {
    finished: [bool; 2],
}

impl Completion {
    fn mark(&mut self, body: Body) {
        self.finished[body.index()] = true;
    }

    fn all(&self) -> bool {
        self.finished.iter().all(|f| *f)
    }

    fn clear(&mut self) {
        self.finished = [false; 2];
    }
}

/// Owns the cups and thermometers, the simulation clock and the trial.
pub struct Stage {
    model: Rc<TemperatureModel>,
    cups: [Cup; 2],
    thermometers: [Thermometer; 2],
    reporter: TrialReporter,
    scale: Scale,
    offset: Vec2,
    lowering_seconds: f64,
    transfer_seconds: f64,
    clock: u32,
    completion: Completion,
    completed: bool,
    done_visible: bool,
    started: bool,
}

impl Stage {
    pub fn new(
        model: Rc<TemperatureModel>,
        lowering_seconds: f64,
        transfer_seconds: f64,
        reporter: TrialReporter,
    ) -> Self {
        let scale = Scale::covering(&Body::ALL.map(|b| model.params(b)));
        let easing = |body: Body| Easing::curve(make_easing(model.clone(), body));

        let cups = Body::ALL.map(|body| {
            let readout = format_readout(model.temperature(body, 0.0));
            Cup::new(body, CUP_ORIGINS[body.index()], easing(body), readout)
        });
        let thermometers = Body::ALL.map(|body| {
            Thermometer::new(
                body,
                THERMOMETER_ORIGINS[body.index()],
                scale,
                model.params(body),
                easing(body),
            )
        });

        Self {
            model,
            cups,
            thermometers,
            reporter,
            scale,
            offset: Vec2::new(0.0, 0.0),
            lowering_seconds,
            transfer_seconds,
            clock: 0,
            completion: Completion::default(),
            completed: false,
            done_visible: false,
            started: false,
        }
    }

    /// Shift the whole scene, e.g. by the page's `top`/`left` parameters.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn clock(&self) -> u32 {
        self.clock
    }

    pub fn trial(&self) -> &Trial {
        self.reporter.trial()
    }

    #[cfg(test)]
    pub fn is_done_visible(&self) -> bool {
        self.done_visible
    }

    #[cfg(test)]
    pub fn cup(&self, body: Body) -> &Cup {
        &self.cups[body.index()]
    }

    #[cfg(test)]
    pub fn thermometer(&self, body: Body) -> &Thermometer {
        &self.thermometers[body.index()]
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut dyn Item> + '_ {
        self.cups
            .iter_mut()
            .map(|c| c as &mut dyn Item)
            .chain(self.thermometers.iter_mut().map(|t| t as &mut dyn Item))
    }

    fn items(&self) -> impl Iterator<Item = &dyn Item> + '_ {
        self.cups
            .iter()
            .map(|c| c as &dyn Item)
            .chain(self.thermometers.iter().map(|t| t as &dyn Item))
    }

    /// Clear the trial, report `t = 0` and set both cups going.
    /// Ignored until `reset` once a run has started.
    pub fn start_animation(&mut self, now: f64) -> bool {
        if self.started {
            debug!("Stage already started, ignoring start");
            return false;
        }
        self.started = true;

        self.reporter.initialize();
        self.report_current();

        let ticks = self.model.max_time();
        for cup in &mut self.cups {
            cup.start_animation(now, self.lowering_seconds, self.transfer_seconds, ticks);
        }
        info!(
            "Stage started: {} ticks over {}s after {}s lowering",
            ticks, self.transfer_seconds, self.lowering_seconds
        );
        true
    }

    /// Advance every item to wall-clock `now` and act on what they report.
    pub fn update(&mut self, now: f64) -> Vec<StageEvent> {
        let mut events = Vec::new();
        for i in 0..self.cups.len() {
            for event in self.cups[i].update(now) {
                self.handle_item_event(event, &mut events);
            }
        }
        for thermometer in &mut self.thermometers {
            thermometer.update(now);
        }
        events
    }

    fn handle_item_event(&mut self, event: ItemEvent, events: &mut Vec<StageEvent>) {
        match event {
            ItemEvent::TransferStarted { body, at } => {
                self.thermometers[body.index()].start_animation(at, self.transfer_seconds);
            }
            ItemEvent::Tick { body, index } => {
                // Cue 0 is the t = 0 sample, reported when the run started.
                if body != CLOCK_BODY || index == 0 {
                    return;
                }
                if self.on_tick() {
                    events.push(StageEvent::Tick(self.clock));
                }
            }
            ItemEvent::Finished(body) => {
                if self.on_item_finished(body) {
                    events.push(StageEvent::Completed);
                }
            }
        }
    }

    fn on_tick(&mut self) -> bool {
        if self.clock >= self.model.max_time() {
            debug!("Tick past max_time={} ignored", self.model.max_time());
            return false;
        }
        self.clock += 1;
        self.report_current();
        true
    }

    /// Read both bodies at the current clock, refresh the readouts and
    /// report, in that order and in one step.
    fn report_current(&mut self) {
        let readings = self.readings();
        self.refresh_readouts(readings);
        self.reporter.record(self.clock, readings);
    }

    fn readings(&self) -> [f64; 2] {
        Body::ALL.map(|body| self.model.temperature(body, self.clock as f64))
    }

    fn refresh_readouts(&mut self, readings: [f64; 2]) {
        for cup in &mut self.cups {
            let body = cup.body();
            cup.set_readout(format_readout(readings[body.index()]));
        }
    }

    /// Returns true exactly once, when the last body finishes.
    fn on_item_finished(&mut self, body: Body) -> bool {
        self.completion.mark(body);
        if self.completed || !self.completion.all() {
            return false;
        }
        self.completed = true;
        self.done_visible = true;
        info!("All bodies finished at t={}", self.clock);
        true
    }

    pub fn pause(&mut self, now: f64) {
        self.items_mut().for_each(|item| item.pause(now));
    }

    pub fn resume(&mut self, now: f64) {
        self.items_mut().for_each(|item| item.resume(now));
    }

    pub fn stop(&mut self) {
        self.items_mut().for_each(|item| item.stop());
    }

    pub fn reset(&mut self) {
        self.clock = 0;
        for item in self.items_mut() {
            debug!("Resetting {:?} {}", item.body(), item.name());
            item.reset();
        }
        self.completion.clear();
        self.completed = false;
        self.done_visible = false;
        self.started = false;
        let readings = self.readings();
        self.refresh_readouts(readings);
        info!("Stage reset");
    }

    pub fn render(&self, draw: &mut DrawContext) {
        draw.set_origin(self.offset);
        draw.rect(0.0, 0.0, VIEWPORT[0], VIEWPORT[1], Color::rgba(255, 255, 255, 255));
        for item in self.items() {
            item.render(draw);
        }

        let black = Color::rgba(0, 0, 0, 255);
        let marks = self.scale.marks(SCALE_MARKS);
        let step = TUBE_HEIGHT / (SCALE_MARKS - 1) as f64;
        let x = THERMOMETER_ORIGINS[0].x + 16.0;
        for (i, degrees) in marks.iter().enumerate() {
            let y = THERMOMETER_ORIGINS[0].y + step * i as f64 + 4.0;
            draw.text(x, y, &format!("- {}\u{00B0}C -", degrees.round()), 12.0, black);
        }

        if self.done_visible {
            draw.text(150.0, 30.0, "Done!", 16.0, black);
        }
    }
}
