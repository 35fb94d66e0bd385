use crate::physics::BodyParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_simulation")]
    pub simulation: Simulation,

    #[serde(default = "default_hot")]
    pub hot: BodyParams,

    #[serde(default = "default_cold")]
    pub cold: BodyParams,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    /// Write an SVG frame here on every simulated tick.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Logistic,
    Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Simulated span in ticks; one sample per tick.
    pub max_time: u32,
    pub lowering_seconds: f64,
    pub transfer_seconds: f64,
    pub model: ModelKind,
    #[serde(default)]
    pub table: Option<TableSamples>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSamples {
    pub hot: Vec<f64>,
    pub cold: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: default_simulation(),
            hot: default_hot(),
            cold: default_cold(),
            layout: Layout::default(),
            fps_cap: default_fps_cap(),
            snapshot_dir: None,
        }
    }
}

fn default_simulation() -> Simulation {
    Simulation {
        max_time: 120,
        lowering_seconds: 1.0,
        transfer_seconds: 15.0,
        model: ModelKind::Logistic,
        table: None,
    }
}

fn default_hot() -> BodyParams {
    BodyParams::new(100.0, 20.0, 0.08)
}

fn default_cold() -> BodyParams {
    BodyParams::new(5.0, 20.0, 0.08)
}

fn default_fps_cap() -> u32 {
    60
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("thermocup").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.simulation.max_time == 0 {
            anyhow::bail!("simulation.max_time must be at least 1");
        }
        if config.simulation.transfer_seconds <= 0.0 || config.simulation.lowering_seconds < 0.0 {
            anyhow::bail!("Animation durations must be positive");
        }
        Ok(config)
    }

    /// Let page parameters override the placement offsets.
    pub fn apply_parameters(&mut self, params: &Parameters) {
        if let Some(top) = params.number("top") {
            self.layout.top = top;
        }
        if let Some(left) = params.number("left") {
            self.layout.left = left;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    fn coerce(raw: &str) -> Self {
        match raw {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            _ => match leading_float(raw) {
                Some(n) => ParamValue::Number(n),
                None => ParamValue::Text(raw.to_string()),
            },
        }
    }
}

/// Key/value pairs decoded from a page query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
}

impl Parameters {
    /// Parse `?a=1&b=true&c=text`. The leading `?` is optional, a pair
    /// without `=` gets an empty text value, and later keys win.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut values = BTreeMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, raw) = pair.split_once('=').unwrap_or((pair, ""));
            values.insert(name.to_string(), ParamValue::coerce(raw));
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(ParamValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Longest numeric prefix, so `"12px"` reads as 12 the way a browser's
/// `parseFloat` would.
fn leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let numeric_len = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());
    (1..=numeric_len)
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_coerce_values() {
        let params = Parameters::parse("?top=20&left=35.5&showGraph=false&mode=experiment2b&flag=true");
        assert_eq!(params.len(), 5);
        assert_eq!(params.get("top"), Some(&ParamValue::Number(20.0)));
        assert_eq!(params.number("left"), Some(35.5));
        assert_eq!(params.get("showGraph"), Some(&ParamValue::Bool(false)));
        assert_eq!(params.get("flag"), Some(&ParamValue::Bool(true)));
        assert_eq!(
            params.get("mode"),
            Some(&ParamValue::Text("experiment2b".to_string()))
        );
    }

    #[test]
    fn test_parameters_numeric_prefix_and_empty() {
        let params = Parameters::parse("top=12px&bare&&left=");
        assert_eq!(params.number("top"), Some(12.0));
        assert_eq!(params.get("bare"), Some(&ParamValue::Text(String::new())));
        assert_eq!(params.get("left"), Some(&ParamValue::Text(String::new())));
        assert!(Parameters::parse("").is_empty());
    }

    #[test]
    fn test_apply_parameters_sets_layout() {
        let mut config = Config::default();
        config.apply_parameters(&Parameters::parse("top=40&left=abc"));
        assert_eq!(config.layout.top, 40.0);
        assert_eq!(config.layout.left, 0.0);
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = Config::from_toml(
            r#"
            fps_cap = 30

            [hot]
            start = 90.0
            end = 25.0
            "#,
        )
        .unwrap();
        assert_eq!(config.fps_cap, 30);
        assert_eq!(config.hot, BodyParams::new(90.0, 25.0, 0.08));
        assert_eq!(config.cold, default_cold());
        assert_eq!(config.simulation.max_time, 120);
        assert_eq!(config.simulation.model, ModelKind::Logistic);
    }

    #[test]
    fn test_toml_rejects_zero_span() {
        let err = Config::from_toml(
            r#"
            [simulation]
            max_time = 0
            lowering_seconds = 1.0
            transfer_seconds = 15.0
            model = "table"
            "#,
        );
        assert!(err.is_err());
    }
}
