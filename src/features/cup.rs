use super::{Item, ItemEvent};
use crate::gfx::{
    anim::{lerp, Easing, PlayState, Timeline},
    draw::DrawContext,
    math::{Color, Rect, Vec2},
};
use crate::physics::Body;
use log::{debug, info};

pub const CUP_WIDTH: f64 = 62.0;
pub const CUP_HEIGHT: f64 = 44.0;
/// How far the cup travels when set down.
const LOWER_BY: f64 = 12.0;

#[derive(Debug, Clone)]
pub enum CupPhase {
    Idle,
    Lowering(Timeline),
    Transferring(Timeline),
    Finished,
}

/// A vessel of liquid that is set down and then changes color as its
/// temperature approaches ambient.
pub struct Cup {
    body: Body,
    origin: Vec2,
    phase: CupPhase,
    easing: Easing,
    transfer_seconds: f64,
    ticks: u32,
    readout: String,
    start_color: Color,
    end_color: Color,
}

impl Cup {
    pub fn new(body: Body, origin: Vec2, easing: Easing, readout: String) -> Self {
        let start_color = match body {
            Body::Hot => Color::rgba(214, 48, 39, 255),
            Body::Cold => Color::rgba(49, 110, 214, 255),
        };
        Self {
            body,
            origin,
            phase: CupPhase::Idle,
            easing,
            transfer_seconds: 0.0,
            ticks: 1,
            readout,
            start_color,
            end_color: Color::rgba(236, 168, 84, 255),
        }
    }

    #[cfg(test)]
    pub fn readout(&self) -> &str {
        &self.readout
    }

    pub fn set_readout(&mut self, text: String) {
        self.readout = text;
    }

    /// Lower the cup, then run the transfer with `ticks + 1` cues.
    /// Returns false, doing nothing, unless the cup is idle.
    pub fn start_animation(
        &mut self,
        now: f64,
        lowering_seconds: f64,
        transfer_seconds: f64,
        ticks: u32,
    ) -> bool {
        if !matches!(self.phase, CupPhase::Idle) {
            debug!("{:?} cup already animating, ignoring start", self.body);
            return false;
        }
        self.transfer_seconds = transfer_seconds;
        self.ticks = ticks;

        let mut tl = Timeline::new(lowering_seconds).with_easing(Easing::InOut);
        tl.start(now);
        self.phase = CupPhase::Lowering(tl);
        info!("{:?} cup lowering for {}s", self.body, lowering_seconds);
        true
    }

    pub fn update(&mut self, now: f64) -> Vec<ItemEvent> {
        let body = self.body;
        let mut events = Vec::new();

        let lowered_at = match &mut self.phase {
            CupPhase::Lowering(tl) => {
                tl.update(now);
                (tl.state() == PlayState::Finished).then(|| tl.end_time())
            }
            _ => None,
        };
        if let Some(at) = lowered_at {
            // Chain from the exact end of the lowering, not from this frame.
            let mut transfer = Timeline::new(self.transfer_seconds)
                .with_easing(self.easing.clone())
                .with_cues(self.ticks);
            transfer.start(at);
            self.phase = CupPhase::Transferring(transfer);
            events.push(ItemEvent::TransferStarted { body, at });
        }

        let finished = match &mut self.phase {
            CupPhase::Transferring(tl) => {
                events.extend(
                    tl.update(now)
                        .into_iter()
                        .map(|index| ItemEvent::Tick { body, index }),
                );
                tl.state() == PlayState::Finished
            }
            _ => false,
        };
        if finished {
            self.phase = CupPhase::Finished;
            events.push(ItemEvent::Finished(body));
            info!("{:?} cup finished", body);
        }

        events
    }

    fn timeline_mut(&mut self) -> Option<&mut Timeline> {
        match &mut self.phase {
            CupPhase::Lowering(tl) | CupPhase::Transferring(tl) => Some(tl),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        match &self.phase {
            CupPhase::Lowering(tl) | CupPhase::Transferring(tl) => tl.is_paused(),
            _ => false,
        }
    }

    /// Vertical offset from the resting position.
    fn drop_offset(&self) -> f64 {
        match &self.phase {
            CupPhase::Idle => 0.0,
            CupPhase::Lowering(tl) => lerp(0.0, LOWER_BY, tl.eased_progress()),
            CupPhase::Transferring(_) | CupPhase::Finished => LOWER_BY,
        }
    }

    /// Share of the start color already wiped away.
    pub fn wipe_fraction(&self) -> f64 {
        match &self.phase {
            CupPhase::Idle | CupPhase::Lowering(_) => 0.0,
            CupPhase::Transferring(tl) => tl.eased_progress(),
            CupPhase::Finished => 1.0,
        }
    }
}

impl Item for Cup {
    fn name(&self) -> &'static str {
        "cup"
    }

    fn body(&self) -> Body {
        self.body
    }

    fn pause(&mut self, now: f64) {
        let body = self.body;
        if let Some(tl) = self.timeline_mut() {
            if tl.pause(now) {
                debug!("{:?} cup paused", body);
            }
        }
    }

    fn resume(&mut self, now: f64) {
        let body = self.body;
        if let Some(tl) = self.timeline_mut() {
            if tl.resume(now) {
                debug!("{:?} cup resumed", body);
            }
        }
    }

    fn stop(&mut self) {
        if let Some(tl) = self.timeline_mut() {
            tl.stop();
        }
    }

    fn reset(&mut self) {
        // Clear any pause before the handle is dropped.
        if let Some(tl) = self.timeline_mut() {
            tl.stop();
        }
        self.phase = CupPhase::Idle;
    }

    fn render(&self, draw: &mut DrawContext) {
        let pos = self.origin.offset(0.0, self.drop_offset());
        let vessel = Rect::new(pos.x, pos.y, CUP_WIDTH, CUP_HEIGHT);

        // Handle
        draw.round_rect(pos.x - 22.0, pos.y + 3.0, 26.0, 30.0, 10.0, Color::rgba(90, 90, 90, 255));
        draw.round_rect(vessel.x, vessel.y, vessel.width, vessel.height, 6.0, self.end_color);

        let wiped = self.wipe_fraction() * CUP_HEIGHT;
        let window = Rect::new(vessel.x, vessel.y + wiped, vessel.width, vessel.height - wiped);
        draw.masked_rect(vessel, window, self.start_color);

        draw.text(pos.x + 12.0, pos.y + 26.0, &self.readout, 16.0, Color::rgba(0, 0, 0, 255));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cup() -> Cup {
        Cup::new(Body::Hot, Vec2::new(30.0, 60.0), Easing::Linear, "100°C".to_string())
    }

    fn ticks(events: &[ItemEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                ItemEvent::Tick { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lowering_then_transfer_emits_every_cue() {
        let mut cup = cup();
        assert!(cup.start_animation(0.0, 1.0, 4.0, 4));
        assert!(cup.update(0.5).is_empty());
        assert!(matches!(&cup.phase, CupPhase::Lowering(_)));

        let events = cup.update(1.2);
        assert_eq!(events[0], ItemEvent::TransferStarted { body: Body::Hot, at: 1.0 });
        assert_eq!(ticks(&events), vec![0]);

        let events = cup.update(3.0);
        assert_eq!(ticks(&events), vec![1, 2]);

        let events = cup.update(100.0);
        assert_eq!(ticks(&events), vec![3, 4]);
        assert_eq!(events.last(), Some(&ItemEvent::Finished(Body::Hot)));
        assert!(cup.update(200.0).is_empty());
        assert_eq!(cup.wipe_fraction(), 1.0);
    }

    #[test]
    fn test_one_long_frame_runs_both_phases() {
        let mut cup = cup();
        cup.start_animation(0.0, 1.0, 3.0, 3);
        let events = cup.update(60.0);
        assert_eq!(ticks(&events), vec![0, 1, 2, 3]);
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_double_start_is_ignored() {
        let mut cup = cup();
        assert!(cup.start_animation(0.0, 1.0, 4.0, 4));
        cup.update(0.5);
        assert!(!cup.start_animation(0.5, 1.0, 4.0, 4));
        let events = cup.update(1.0);
        assert_eq!(events.len(), 2, "events: {:?}", events);
    }

    #[test]
    fn test_pause_after_finish_is_noop() {
        let mut cup = cup();
        cup.start_animation(0.0, 0.5, 1.0, 1);
        cup.update(10.0);
        cup.pause(10.0);
        cup.resume(11.0);
        assert!(matches!(&cup.phase, CupPhase::Finished));
        assert!(!cup.is_paused());
    }

    #[test]
    fn test_pause_holds_cues_until_resume() {
        let mut cup = cup();
        cup.start_animation(0.0, 1.0, 4.0, 4);
        cup.update(1.0);
        cup.pause(1.5);
        assert!(cup.is_paused());
        assert!(cup.update(50.0).is_empty());

        cup.resume(50.0);
        // 0.5s of transfer had elapsed before the pause.
        assert_eq!(ticks(&cup.update(50.5)), vec![1]);
    }

    #[test]
    fn test_stop_silences_item() {
        let mut cup = cup();
        cup.stop();
        cup.start_animation(0.0, 1.0, 4.0, 4);
        cup.update(2.0);
        cup.stop();
        assert!(cup.update(10.0).is_empty());
        cup.resume(10.0);
        assert!(cup.update(20.0).is_empty());
    }

    #[test]
    fn test_reset_restores_idle_geometry() {
        let mut cup = cup();
        cup.start_animation(0.0, 1.0, 4.0, 4);
        cup.update(2.0);
        cup.pause(2.0);
        cup.reset();
        assert!(matches!(&cup.phase, CupPhase::Idle));
        assert!(!cup.is_paused());
        assert_eq!(cup.drop_offset(), 0.0);
        assert_eq!(cup.wipe_fraction(), 0.0);
        cup.resume(3.0);
        assert!(cup.update(4.0).is_empty());
        assert!(cup.start_animation(5.0, 1.0, 4.0, 4));
    }

    #[test]
    fn test_render_draws_readout() {
        let mut cup = cup();
        cup.set_readout("42°C".to_string());
        let mut draw = DrawContext::new();
        draw.begin([200.0, 200.0]);
        cup.render(&mut draw);
        let svg = draw.flush();
        assert!(svg.contains("42°C"));
        assert!(svg.contains("mask="));
    }
}
