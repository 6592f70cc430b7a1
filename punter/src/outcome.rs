//! Mutually exclusive match outcomes and the contestant sides they refer to.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

/// Position of a fieldless enum variant, used to index per-variant vectors.
pub trait AsIndex {
    fn as_index(&self) -> usize;
}

/// An outcome of a contest. Implementors are fieldless enums whose ordinals index the
/// per-outcome probability vectors used throughout the engine. The default outcome is the one
/// picked when nothing else distinguishes the outcomes.
pub trait Outcome:
    Copy
    + Eq
    + Hash
    + Default
    + Debug
    + Display
    + AsIndex
    + EnumCount
    + IntoEnumIterator
    + Send
    + Sync
    + 'static
{
    /// The label used on the wire, e.g. `"1"`, `"X"`, `"2"`.
    fn label(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::iter().find(|outcome| outcome.label().eq_ignore_ascii_case(label))
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::iter().find(|outcome| outcome.as_index() == ordinal)
    }

    /// The uninformed prior assigned to every outcome.
    fn neutral_prior() -> f64 {
        1.0 / Self::COUNT as f64
    }
}

#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Home,
    Away,
}
impl Side {
    pub fn flip(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_lowercase().as_str() {
            "home" | "a" | "1" => Some(Side::Home),
            "away" | "b" | "2" => Some(Side::Away),
            _ => None,
        }
    }
}
