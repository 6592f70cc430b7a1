//! The match record consumed by the scoring engine.
//!
//! Records arrive as loosely typed JSON. Every field is optional and parsed leniently; a value of
//! the wrong shape is treated as missing, never as an error. Where several keys may carry the same
//! datum, each key is retained separately and the accessors resolve precedence.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::lenient;
use crate::lenient::de;
use crate::outcome::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}
impl FormResult {
    /// Parses a form token by its first character: `W`, `D` or `L`, case-insensitive.
    pub fn parse(token: &str) -> Option<FormResult> {
        match token.trim().chars().next()?.to_ascii_uppercase() {
            'W' => Some(FormResult::Win),
            'D' => Some(FormResult::Draw),
            'L' => Some(FormResult::Loss),
            _ => None,
        }
    }
}

/// A prior meeting between the two contestants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encounter {
    pub date: Option<String>,
    pub home: Option<String>,
    pub away: Option<String>,
    pub score: Option<String>,
}
impl Encounter {
    pub fn from_value(value: &Value) -> Option<Encounter> {
        let entries = value.as_object()?;
        let field = |key: &str| entries.get(key).and_then(lenient::text);
        Some(Encounter {
            date: field("date"),
            home: field("home").or_else(|| field("home_team")),
            away: field("away").or_else(|| field("away_team")),
            score: field("score"),
        })
    }

    /// The goals (or sets) scored by the home and away sides, if the score is legible.
    pub fn goals(&self) -> Option<(u32, u32)> {
        self.score.as_deref().and_then(lenient::score)
    }
}

/// A third-party prediction: the favoured outcome label and a confidence percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    pub high: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchRecord {
    #[serde(deserialize_with = "de::text")]
    pub home_team: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub away_team: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub sport: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub focus_team: Option<String>,

    #[serde(deserialize_with = "de::encounters")]
    pub h2h_last5: Option<Vec<Encounter>>,
    #[serde(deserialize_with = "de::number")]
    pub home_wins_in_h2h_last5: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub away_wins_in_h2h_last5: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub home_wins_in_h2h: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub away_wins_in_h2h: Option<f64>,

    #[serde(deserialize_with = "de::form")]
    pub home_form_overall: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub home_form: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub away_form_overall: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub away_form: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub form_a: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub form_b: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub home_form_home: Vec<FormResult>,
    #[serde(deserialize_with = "de::form")]
    pub away_form_away: Vec<FormResult>,

    #[serde(deserialize_with = "de::number")]
    pub home_odds: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub draw_odds: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub away_odds: Option<f64>,

    #[serde(deserialize_with = "de::text")]
    pub forebet_prediction: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub forebet_probability: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub gemini_prediction: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub gemini_confidence: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub gemini_recommendation: Option<String>,

    #[serde(deserialize_with = "de::number")]
    pub sofascore_home_win_prob: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub sofascore_home: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub sofascore_draw_prob: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub sofascore_draw: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub sofascore_away_win_prob: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub sofascore_away: Option<f64>,

    #[serde(deserialize_with = "de::positive_integer")]
    pub ranking_a: Option<u32>,
    #[serde(deserialize_with = "de::positive_integer")]
    pub ranking_b: Option<u32>,
    #[serde(deserialize_with = "de::text")]
    pub surface: Option<String>,
    #[serde(deserialize_with = "de::rates")]
    pub surface_stats_a: Option<FxHashMap<String, f64>>,
    #[serde(deserialize_with = "de::rates")]
    pub surface_stats_b: Option<FxHashMap<String, f64>>,

    #[serde(deserialize_with = "de::text")]
    pub actual_result: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub result: Option<String>,
}

impl MatchRecord {
    /// Builds a record from an arbitrary JSON value. Only a non-object is rejected.
    pub fn from_value(value: &Value) -> Option<MatchRecord> {
        if !value.is_object() {
            return None;
        }
        MatchRecord::deserialize(value).ok()
    }

    pub fn team(&self, side: Side) -> Option<&str> {
        match side {
            Side::Home => self.home_team.as_deref(),
            Side::Away => self.away_team.as_deref(),
        }
    }

    /// The side whose perspective head-to-head evidence is read from. Defaults to home.
    pub fn focus(&self) -> Side {
        self.focus_team
            .as_deref()
            .and_then(Side::parse)
            .unwrap_or_default()
    }

    /// Recent form of a side. The contestant-specific keys take precedence over the overall keys,
    /// which in turn take precedence over the plain keys.
    pub fn form(&self, side: Side) -> &[FormResult] {
        let candidates = match side {
            Side::Home => [&self.form_a, &self.home_form_overall, &self.home_form],
            Side::Away => [&self.form_b, &self.away_form_overall, &self.away_form],
        };
        candidates
            .into_iter()
            .find(|form| !form.is_empty())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn venue_form(&self, side: Side) -> &[FormResult] {
        match side {
            Side::Home => &self.home_form_home,
            Side::Away => &self.away_form_away,
        }
    }

    /// Raw head-to-head win counts, used when no encounter list is supplied.
    pub fn h2h_wins(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_wins_in_h2h_last5.or(self.home_wins_in_h2h),
            Side::Away => self.away_wins_in_h2h_last5.or(self.away_wins_in_h2h),
        }
    }

    pub fn forebet(&self) -> Option<Prediction> {
        prediction(
            self.forebet_prediction.as_deref(),
            self.forebet_probability,
            false,
        )
    }

    pub fn gemini(&self) -> Option<Prediction> {
        let high = self
            .gemini_recommendation
            .as_deref()
            .map(|recommendation| recommendation.eq_ignore_ascii_case("HIGH"))
            .unwrap_or(false);
        prediction(self.gemini_prediction.as_deref(), self.gemini_confidence, high)
    }

    /// Community vote shares for the home win, draw and away win, in that order.
    pub fn community_vote(&self) -> [Option<f64>; 3] {
        [
            self.sofascore_home_win_prob.or(self.sofascore_home),
            self.sofascore_draw_prob.or(self.sofascore_draw),
            self.sofascore_away_win_prob.or(self.sofascore_away),
        ]
    }

    pub fn surface_rate(&self, side: Side) -> Option<f64> {
        let surface = self.surface.as_deref()?.trim().to_lowercase();
        let stats = match side {
            Side::Home => self.surface_stats_a.as_ref()?,
            Side::Away => self.surface_stats_b.as_ref()?,
        };
        Some(stats.get(&surface).copied().unwrap_or(0.5))
    }

    pub fn ranking(&self, side: Side) -> Option<u32> {
        match side {
            Side::Home => self.ranking_a,
            Side::Away => self.ranking_b,
        }
    }

    /// The settled outcome label, if the match has been played.
    pub fn settled_label(&self) -> Option<&str> {
        self.actual_result
            .as_deref()
            .or(self.result.as_deref())
    }
}

fn prediction(label: Option<&str>, confidence: Option<f64>, high: bool) -> Option<Prediction> {
    let label = label?;
    let confidence = confidence.filter(|&confidence| confidence > 0.0)?;
    Some(Prediction {
        label: label.to_string(),
        confidence,
        high,
    })
}
