use crate::physics::Body;
use serde::Serialize;
use time::OffsetDateTime;

pub const TRIAL_NAME: &str = "Hot and Cold Liquid Temperatures";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: u32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub marker: Marker,
    pub data: Vec<DataPoint>,
}

impl Series {
    fn new(name: &str, color: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            marker: Marker {
                symbol: symbol.to_string(),
            },
            data: Vec::new(),
        }
    }

    fn for_body(body: Body) -> Self {
        match body {
            Body::Hot => Self::new(body.name(), "red", "circle"),
            Body::Cold => Self::new(body.name(), "blue", "circle"),
        }
    }
}

/// One recording session. The id stays fixed across runs so the host
/// replaces the previous run's data instead of appending a new trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    id: i64,
    name: String,
    series: [Series; 2],
}

impl Trial {
    /// Identified by the current time in milliseconds.
    pub fn new() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self::with_id(millis as i64)
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: TRIAL_NAME.to_string(),
            series: Body::ALL.map(Series::for_body),
        }
    }

    /// Drop all samples; the id is kept.
    pub fn initialize(&mut self) {
        self.name = TRIAL_NAME.to_string();
        self.series = Body::ALL.map(Series::for_body);
    }

    pub fn add_point(&mut self, body: Body, time: u32, temperature: f64) {
        self.series[body.index()].data.push(DataPoint {
            x: time,
            y: temperature,
        });
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn series(&self, body: Body) -> &Series {
        &self.series[body.index()]
    }
}

impl Default for Trial {
    fn default() -> Self {
        Self::new()
    }
}
