use super::temperature::{Body, TemperatureModel};
use std::rc::Rc;

/// Build the easing curve for `body`: linear progress in, fraction of the
/// body's temperature change covered so far out.
pub fn make_easing(model: Rc<TemperatureModel>, body: Body) -> impl Fn(f64) -> f64 {
    move |pos| scaled_position(&model, body, pos)
}

/// Map linear progress `pos` onto the temperature curve, normalized so that
/// 0 is the start temperature and 1 the ambient one.
pub fn scaled_position(model: &TemperatureModel, body: Body, pos: f64) -> f64 {
    if pos.is_nan() || pos <= 0.0 {
        return 0.0;
    }
    if pos >= 1.0 {
        return 1.0;
    }

    let p = model.params(body);
    if p.start == p.end {
        return pos;
    }

    let temp = model.temperature(body, pos * model.max_time() as f64);
    let scaled = if p.is_cooling() {
        1.0 - (temp - p.end) / (p.start - p.end)
    } else {
        (temp - p.start) / (p.end - p.start)
    };
    scaled.clamp(0.0, 1.0)
}
