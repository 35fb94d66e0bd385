use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

/// How close to ambient a body must be at `max_time` to count as settled.
pub const SETTLE_TOLERANCE: f64 = 0.5;

/// One of the two liquids being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Hot,
    Cold,
}

impl Body {
    /// Fixed order used for items, series and completion flags.
    pub const ALL: [Body; 2] = [Body::Hot, Body::Cold];

    pub fn index(self) -> usize {
        match self {
            Body::Hot => 0,
            Body::Cold => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Body::Hot => "Hot",
            Body::Cold => "Cold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub start: f64,
    pub end: f64,
    /// Magnitude of the logistic steepness; the sign follows the direction of approach.
    #[serde(default = "default_curvature")]
    pub curvature: f64,
}

fn default_curvature() -> f64 {
    0.08
}

impl BodyParams {
    pub fn new(start: f64, end: f64, curvature: f64) -> Self {
        Self { start, end, curvature }
    }

    pub fn is_cooling(&self) -> bool {
        self.start > self.end
    }
}

pub trait TemperatureSource {
    /// Temperature of `body` at `time`. Callers pass a time already clamped
    /// to the simulated span.
    fn sample(&self, body: Body, time: f64) -> f64;
}

/// Closed-form logistic approach toward ambient.
///
/// `f(t) = y_min + (y_max - y_min) / (1 + exp(-k t))`. The asymptotes are
/// mirrored around `start` so that `f(0) == start` and only the monotonic half
/// of the S-curve is ever sampled.
#[derive(Debug, Clone)]
pub struct LogisticCurve {
    hot: BodyParams,
    cold: BodyParams,
}

impl LogisticCurve {
    pub fn new(hot: BodyParams, cold: BodyParams) -> Self {
        Self { hot, cold }
    }

    fn evaluate(p: &BodyParams, t: f64) -> f64 {
        let (k, y_min, y_max) = if p.is_cooling() {
            (-p.curvature.abs(), p.end, p.start + (p.start - p.end))
        } else {
            (p.curvature.abs(), p.start - (p.end - p.start), p.end)
        };
        y_min + (y_max - y_min) / (1.0 + (-k * t).exp())
    }
}

impl TemperatureSource for LogisticCurve {
    fn sample(&self, body: Body, time: f64) -> f64 {
        match body {
            Body::Hot => Self::evaluate(&self.hot, time),
            Body::Cold => Self::evaluate(&self.cold, time),
        }
    }
}

/// Integer-time samples with linear interpolation in between.
#[derive(Debug, Clone)]
pub struct LookupTable {
    hot: Vec<f64>,
    cold: Vec<f64>,
}

impl LookupTable {
    pub fn new(hot: Vec<f64>, cold: Vec<f64>) -> Result<Self> {
        if hot.len() < 2 || cold.len() < 2 {
            anyhow::bail!("Lookup tables need at least two samples per body");
        }
        if hot.len() != cold.len() {
            anyhow::bail!(
                "Lookup tables differ in length: hot={} cold={}",
                hot.len(),
                cold.len()
            );
        }
        Ok(Self { hot, cold })
    }

    /// Cup cooling 60 -> 30 and counter warming 20 -> 30 over 15 ticks.
    pub fn legacy() -> Self {
        Self {
            hot: vec![
                60.0, 53.0, 48.0, 44.0, 41.0, 39.0, 37.0, 35.5, 34.0, 32.8, 31.8, 31.2, 30.8,
                30.5, 30.2, 30.0,
            ],
            cold: vec![
                20.0, 23.0, 25.0, 26.5, 27.3, 27.8, 28.2, 28.5, 28.8, 29.1, 29.3, 29.5, 29.7,
                29.8, 29.9, 30.0,
            ],
        }
    }

    pub fn span(&self) -> u32 {
        (self.hot.len() - 1) as u32
    }

    fn samples(&self, body: Body) -> &[f64] {
        match body {
            Body::Hot => &self.hot,
            Body::Cold => &self.cold,
        }
    }

    pub fn params(&self, body: Body) -> BodyParams {
        let s = self.samples(body);
        BodyParams::new(s[0], s[s.len() - 1], 0.0)
    }
}

impl TemperatureSource for LookupTable {
    fn sample(&self, body: Body, time: f64) -> f64 {
        let s = self.samples(body);
        let last = s.len() - 1;
        let t = time.clamp(0.0, last as f64);
        let i = (t.floor() as usize).min(last - 1);
        let frac = t - i as f64;
        s[i] + (s[i + 1] - s[i]) * frac
    }
}

/// The temperature source plus the per-body parameters and simulated span.
pub struct TemperatureModel {
    source: Box<dyn TemperatureSource>,
    hot: BodyParams,
    cold: BodyParams,
    max_time: u32,
}

impl TemperatureModel {
    pub fn logistic(hot: BodyParams, cold: BodyParams, max_time: u32) -> Self {
        Self {
            source: Box::new(LogisticCurve::new(hot, cold)),
            hot,
            cold,
            max_time: max_time.max(1),
        }
    }

    pub fn table(table: LookupTable) -> Self {
        Self {
            hot: table.params(Body::Hot),
            cold: table.params(Body::Cold),
            max_time: table.span(),
            source: Box::new(table),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        use crate::config::ModelKind;

        let sim = &config.simulation;
        let model = match sim.model {
            ModelKind::Logistic => Self::logistic(config.hot, config.cold, sim.max_time),
            ModelKind::Table => {
                let table = match &sim.table {
                    Some(t) => LookupTable::new(t.hot.clone(), t.cold.clone())?,
                    None => LookupTable::legacy(),
                };
                if table.span() != sim.max_time {
                    warn!(
                        "Lookup table spans {} ticks, overriding max_time={}",
                        table.span(),
                        sim.max_time
                    );
                }
                Self::table(table)
            }
        };

        for body in model.unsettled_bodies() {
            let p = model.params(body);
            warn!(
                "{:?} ends at {:.1} after {} ticks, not within {} of {}; the last frame will jump",
                body,
                model.temperature(body, model.max_time as f64),
                model.max_time,
                SETTLE_TOLERANCE,
                p.end
            );
        }
        Ok(model)
    }

    /// Bodies still `SETTLE_TOLERANCE` or more away from their end
    /// temperature at `max_time`.
    pub fn unsettled_bodies(&self) -> Vec<Body> {
        Body::ALL
            .into_iter()
            .filter(|&body| {
                let end = self.params(body).end;
                (self.temperature(body, self.max_time as f64) - end).abs() >= SETTLE_TOLERANCE
            })
            .collect()
    }

    /// Temperature at `time`, clamped to `[0, max_time]`.
    pub fn temperature(&self, body: Body, time: f64) -> f64 {
        let t = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.max_time as f64)
        };
        self.source.sample(body, t)
    }

    pub fn params(&self, body: Body) -> BodyParams {
        match body {
            Body::Hot => self.hot,
            Body::Cold => self.cold,
        }
    }

    pub fn max_time(&self) -> u32 {
        self.max_time
    }
}

/// On-screen readout, e.g. `59°C`.
pub fn format_readout(temperature: f64) -> String {
    format!("{}\u{00B0}C", (temperature + 1e-9).floor() as i64)
}
