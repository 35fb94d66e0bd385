pub mod cup;
pub mod thermometer;

use crate::gfx::draw::DrawContext;
use crate::physics::Body;

/// What an item reports back to its owner while it animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemEvent {
    /// The lowering finished and the transfer began at wall-clock `at`.
    TransferStarted { body: Body, at: f64 },
    /// Transfer cue `index` of `0..=N` was reached.
    Tick { body: Body, index: usize },
    Finished(Body),
}

/// Controls shared by every animated entity on the stage.
pub trait Item {
    fn name(&self) -> &'static str;
    fn body(&self) -> Body;
    fn pause(&mut self, now: f64);
    fn resume(&mut self, now: f64);
    fn stop(&mut self);
    fn reset(&mut self);
    fn render(&self, draw: &mut DrawContext);
}
