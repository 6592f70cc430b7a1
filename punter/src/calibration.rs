//! Per-source weights and the calibration temperature, and their persisted form.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::backtest::Metrics;
use crate::file;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed calibration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid temperature {0}")]
    InvalidTemperature(f64),

    #[error("invalid weight {weight} for {name}")]
    InvalidWeight { name: String, weight: f64 },
}

/// Per-source ensemble weights. Weights need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights(BTreeMap<String, f64>);
impl Weights {
    /// The weight of a source; zero for an unknown source.
    pub fn get(&self, source: &str) -> f64 {
        self.0.get(source).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, source: impl Into<String>, weight: f64) {
        self.0.insert(source.into(), weight);
    }

    pub fn contains(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(source, &weight)| (source.as_str(), weight))
    }

    pub fn sources(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}
impl<S: Into<String>> FromIterator<(S, f64)> for Weights {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(source, weight)| (source.into(), weight))
                .collect(),
        )
    }
}

fn validate_weight(name: &str, weight: f64) -> Result<(), CalibrationError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(CalibrationError::InvalidWeight {
            name: name.to_string(),
            weight,
        });
    }
    Ok(())
}

fn validate_temperature(temperature: f64) -> Result<(), CalibrationError> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(CalibrationError::InvalidTemperature(temperature));
    }
    Ok(())
}

/// The tunable parameters of a scoring model.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub weights: Weights,
    pub temperature: f64,
}
impl Calibration {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, weight) in self.weights.iter() {
            validate_weight(name, weight)?;
        }
        validate_temperature(self.temperature)
    }

    /// Overlays the values of a saved artifact onto `defaults`. Only sources known to the defaults
    /// are taken; an absent temperature keeps the default.
    pub fn merge(defaults: &Calibration, artifact: &CalibrationArtifact) -> Result<Calibration, CalibrationError> {
        let mut weights = defaults.weights.clone();
        for (name, &weight) in &artifact.weights {
            if !weights.contains(name) {
                debug!("ignoring weight for unknown source {name}");
                continue;
            }
            validate_weight(name, weight)?;
            weights.set(name.as_str(), weight);
        }
        let temperature = match artifact.temperature {
            Some(temperature) => {
                validate_temperature(temperature)?;
                temperature
            }
            None => defaults.temperature,
        };
        Ok(Calibration {
            weights,
            temperature,
        })
    }

    /// Loads a calibration artifact from `path` and overlays it onto `defaults`.
    pub fn load(path: impl AsRef<Path>, defaults: &Calibration) -> Result<Calibration, CalibrationError> {
        let file = File::open(path)?;
        let artifact: CalibrationArtifact = serde_json::from_reader(BufReader::new(file))?;
        Self::merge(defaults, &artifact)
    }

    /// As [`Calibration::load`], but falls back to `defaults` if the artifact is absent, unreadable
    /// or invalid.
    pub fn load_or_default(path: impl AsRef<Path>, defaults: &Calibration) -> Calibration {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no calibration at {}, using defaults", path.display());
            return defaults.clone();
        }
        match Self::load(path, defaults) {
            Ok(calibration) => {
                debug!("loaded calibration from {}: {calibration:?}", path.display());
                calibration
            }
            Err(err) => {
                warn!("rejected calibration at {}: {err}; using defaults", path.display());
                defaults.clone()
            }
        }
    }
}

/// The persisted form of a calibration, along with the metrics that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationArtifact {
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub calibrated_at: Option<DateTime<Utc>>,
}

/// Persists `calibration` to `path`, replacing any existing artifact atomically.
pub fn save_calibration(
    path: impl AsRef<Path>,
    calibration: &Calibration,
    metrics: &Metrics,
) -> Result<CalibrationArtifact, CalibrationError> {
    calibration.validate()?;
    let artifact = CalibrationArtifact {
        weights: calibration
            .weights
            .iter()
            .map(|(source, weight)| (source.to_string(), weight))
            .collect(),
        temperature: Some(calibration.temperature),
        metrics: Some(metrics.clone()),
        calibrated_at: Some(Utc::now()),
    };
    file::write_json_atomic(path.as_ref(), &artifact)?;
    debug!("saved calibration to {}", path.as_ref().display());
    Ok(artifact)
}
