use ordinalizer::Ordinal;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use punter::outcome::{AsIndex, Outcome};

/// The winner of a match between player A (listed as the home contestant) and player B.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr,
)]
pub enum Player {
    #[default]
    A,
    B,
}
impl AsIndex for Player {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}
impl Outcome for Player {
    fn label(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Source {
    H2h,
    Form,
    SurfaceForm,
    Ranking,
    Odds,
}
impl Source {
    pub fn key(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount)]
pub enum Group {
    H2h,
    FormA,
    FormB,
    Surface,
    Ranking,
    Odds,
}
impl AsIndex for Group {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}
