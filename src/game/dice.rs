use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const FACE_GLYPHS: [char; 6] = ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'];

/// 单次掷骰结果，取值范围 1..=6。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;
    pub const ONE: DieFace = DieFace(1);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn points(self) -> u32 {
        u32::from(self.0)
    }

    pub fn is_bust(self) -> bool {
        self.0 == 1
    }

    pub fn glyph(self) -> char {
        FACE_GLYPHS[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for DieFace {
    type Error = InvalidDieFace;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DieFace::new(value).ok_or(InvalidDieFace(value))
    }
}

impl From<DieFace> for u8 {
    fn from(face: DieFace) -> Self {
        face.0
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("die face must be between 1 and 6, got {0}")]
pub struct InvalidDieFace(pub u8);

/// 骰子来源，引擎通过它获得随机结果。
pub trait DiceSource {
    fn roll(&mut self) -> DieFace;
}

impl<D: DiceSource + ?Sized> DiceSource for Box<D> {
    fn roll(&mut self) -> DieFace {
        (**self).roll()
    }
}

pub struct RandomDice {
    rng: SmallRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for RandomDice {
    fn roll(&mut self) -> DieFace {
        DieFace(self.rng.gen_range(DieFace::MIN..=DieFace::MAX))
    }
}

/// Replays a fixed sequence of faces, wrapping around at the end.
/// An empty script rolls ones.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: Vec<DieFace>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = DieFace>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Builds a script from raw values, rejecting anything outside 1..=6.
    pub fn from_values(values: &[u8]) -> Result<Self, InvalidDieFace> {
        let faces = values
            .iter()
            .map(|value| DieFace::try_from(*value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(faces))
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self) -> DieFace {
        if self.faces.is_empty() {
            return DieFace::ONE;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor = (self.cursor + 1) % self.faces.len();
        face
    }
}
