use super::Item;
use crate::gfx::{
    anim::{lerp, Easing, Timeline},
    draw::DrawContext,
    math::{Color, Rect, Vec2},
};
use crate::physics::{Body, BodyParams};
use log::debug;

pub const TUBE_WIDTH: f64 = 9.0;
pub const TUBE_HEIGHT: f64 = 70.0;

/// Temperatures at the bottom and top of the tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// Smallest range on 10-degree boundaries containing every start and end.
    pub fn covering(params: &[BodyParams]) -> Self {
        let lo = params
            .iter()
            .flat_map(|p| [p.start, p.end])
            .fold(f64::INFINITY, f64::min);
        let hi = params
            .iter()
            .flat_map(|p| [p.start, p.end])
            .fold(f64::NEG_INFINITY, f64::max);
        let min = (lo / 10.0).floor() * 10.0;
        let mut max = (hi / 10.0).ceil() * 10.0;
        if max <= min {
            max = min + 10.0;
        }
        Self { min, max }
    }

    /// Height of `temperature` as a fraction of the tube.
    pub fn level(&self, temperature: f64) -> f64 {
        ((temperature - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// `count` evenly spaced marks from top to bottom.
    pub fn marks(&self, count: usize) -> Vec<f64> {
        if count < 2 {
            return vec![self.max];
        }
        let step = (self.max - self.min) / (count - 1) as f64;
        (0..count).map(|i| self.max - step * i as f64).collect()
    }
}

/// Mercury column that follows one body's temperature curve.
pub struct Thermometer {
    body: Body,
    origin: Vec2,
    scale: Scale,
    params: BodyParams,
    easing: Easing,
    animation: Option<Timeline>,
}

impl Thermometer {
    pub fn new(body: Body, origin: Vec2, scale: Scale, params: BodyParams, easing: Easing) -> Self {
        Self {
            body,
            origin,
            scale,
            params,
            easing,
            animation: None,
        }
    }

    /// Start moving the mercury at wall-clock `at`. Ignored while an
    /// animation handle is still held; `reset` clears it.
    pub fn start_animation(&mut self, at: f64, duration: f64) -> bool {
        if self.animation.is_some() {
            debug!("{:?} thermometer already animating, ignoring start", self.body);
            return false;
        }
        let mut tl = Timeline::new(duration).with_easing(self.easing.clone());
        tl.start(at);
        self.animation = Some(tl);
        true
    }

    pub fn update(&mut self, now: f64) {
        if let Some(tl) = &mut self.animation {
            tl.update(now);
        }
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.animation.as_ref().is_some_and(|tl| tl.is_paused())
    }

    #[cfg(test)]
    pub fn has_animation(&self) -> bool {
        self.animation.is_some()
    }

    /// Mercury height as a fraction of the tube.
    pub fn mercury_level(&self) -> f64 {
        let eased = self.animation.as_ref().map_or(0.0, |tl| tl.eased_progress());
        lerp(
            self.scale.level(self.params.start),
            self.scale.level(self.params.end),
            eased,
        )
    }
}

impl Item for Thermometer {
    fn name(&self) -> &'static str {
        "thermometer"
    }

    fn body(&self) -> Body {
        self.body
    }

    fn pause(&mut self, now: f64) {
        if let Some(tl) = &mut self.animation {
            tl.pause(now);
        }
    }

    fn resume(&mut self, now: f64) {
        if let Some(tl) = &mut self.animation {
            tl.resume(now);
        }
    }

    fn stop(&mut self) {
        if let Some(tl) = &mut self.animation {
            tl.stop();
        }
    }

    fn reset(&mut self) {
        if let Some(tl) = &mut self.animation {
            tl.stop();
        }
        self.animation = None;
    }

    fn render(&self, draw: &mut DrawContext) {
        let Vec2 { x, y } = self.origin;
        draw.text(x - 4.0, y - 6.0, self.body.name(), 14.0, Color::rgba(0, 0, 0, 255));

        // Glass
        draw.round_rect(x - 3.0, y - 3.0, TUBE_WIDTH + 6.0, TUBE_HEIGHT + 6.0, 7.0, Color::rgba(200, 200, 200, 255));
        draw.round_rect(x - 5.0, y + TUBE_HEIGHT - 2.0, TUBE_WIDTH + 10.0, TUBE_WIDTH + 10.0, 9.5, Color::rgba(214, 48, 39, 255));

        let tube = Rect::new(x, y, TUBE_WIDTH, TUBE_HEIGHT);
        let filled = self.mercury_level() * TUBE_HEIGHT;
        let window = Rect::new(x, y + TUBE_HEIGHT - filled, TUBE_WIDTH, filled);
        draw.masked_rect(tube, window, Color::rgba(214, 48, 39, 255));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot() -> Thermometer {
        let params = BodyParams::new(60.0, 30.0, 0.0);
        let scale = Scale { min: 20.0, max: 60.0 };
        Thermometer::new(Body::Hot, Vec2::new(210.0, 70.0), scale, params, Easing::Linear)
    }

    #[test]
    fn test_scale_covers_both_bodies() {
        let scale = Scale::covering(&[
            BodyParams::new(100.0, 20.0, 0.1),
            BodyParams::new(5.0, 20.0, 0.1),
        ]);
        assert_eq!(scale, Scale { min: 0.0, max: 100.0 });
        assert_eq!(scale.level(50.0), 0.5);
        assert_eq!(scale.level(150.0), 1.0);
        assert_eq!(Scale { min: 20.0, max: 60.0 }.marks(5), vec![60.0, 50.0, 40.0, 30.0, 20.0]);
    }

    #[test]
    fn test_mercury_tracks_animation() {
        let mut t = hot();
        assert_eq!(t.mercury_level(), 1.0);
        assert!(t.start_animation(1.0, 4.0));
        assert!(!t.start_animation(1.0, 4.0));
        t.update(3.0);
        assert!((t.mercury_level() - 0.625).abs() < 1e-12, "level={}", t.mercury_level());
        t.update(9.0);
        assert!((t.mercury_level() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_pause_resume_and_reset() {
        let mut t = hot();
        t.pause(0.0);
        t.resume(0.0);
        assert!(!t.is_paused());

        t.start_animation(0.0, 4.0);
        t.update(1.0);
        t.pause(1.0);
        assert!(t.is_paused());
        t.update(3.0);
        assert!((t.mercury_level() - 0.8125).abs() < 1e-12);

        t.reset();
        assert!(!t.has_animation());
        assert!(!t.is_paused());
        assert_eq!(t.mercury_level(), 1.0);
    }
}
