mod easing;
mod temperature;

pub use easing::make_easing;
pub use temperature::{format_readout, Body, BodyParams, TemperatureModel};
