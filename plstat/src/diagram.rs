//! Persistence diagrams in a single homological degree.
//!
//! Diagrams are produced elsewhere (e.g. by a cubical or Rips reduction) and only consumed here,
//! so the representation is a plain list of pairs.

use ordered_float::NotNan;

use crate::{PlstatError, Result};

/// Death value used by Perseus-style output for features that never die.
pub const PERSEUS_ESSENTIAL: i64 = -1;

/// A single `(birth, death)` pair. An infinite death marks an essential class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersistencePair {
    pub birth: NotNan<f64>,
    pub death: NotNan<f64>,
}

impl PersistencePair {
    pub fn new(birth: f64, death: f64) -> Result<Self> {
        let invalid = || PlstatError::InvalidPair { birth, death };
        let birth_nn = NotNan::new(birth).map_err(|_| invalid())?;
        let death_nn = NotNan::new(death).map_err(|_| invalid())?;
        if !birth.is_finite() || birth_nn > death_nn {
            return Err(invalid());
        }
        Ok(Self {
            birth: birth_nn,
            death: death_nn,
        })
    }

    pub fn essential(birth: f64) -> Result<Self> {
        Self::new(birth, f64::INFINITY)
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_infinite()
    }

    pub fn lifetime(&self) -> f64 {
        (self.death - self.birth).into_inner()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceDiagram {
    pairs: Vec<PersistencePair>,
}

impl PersistenceDiagram {
    pub fn new(pairs: Vec<PersistencePair>) -> Self {
        Self { pairs }
    }

    /// Builds a diagram from raw `(birth, death)` floats, `f64::INFINITY` marking essential pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        let pairs = pairs
            .into_iter()
            .map(|(birth, death)| PersistencePair::new(birth, death))
            .collect::<Result<_>>()?;
        Ok(Self { pairs })
    }

    /// Builds a diagram from integer filtration values as written by Perseus,
    /// where a death of [`PERSEUS_ESSENTIAL`] means the class never dies.
    pub fn from_perseus_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> Result<Self> {
        Self::from_pairs(pairs.into_iter().map(|(birth, death)| {
            let death = if death == PERSEUS_ESSENTIAL {
                f64::INFINITY
            } else {
                death as f64
            };
            (birth as f64, death)
        }))
    }

    pub fn pairs(&self) -> &[PersistencePair] {
        &self.pairs
    }

    pub fn finite_pairs(&self) -> impl Iterator<Item = &PersistencePair> + '_ {
        self.pairs.iter().filter(|pair| !pair.is_essential())
    }

    pub fn essential_pairs(&self) -> impl Iterator<Item = &PersistencePair> + '_ {
        self.pairs.iter().filter(|pair| pair.is_essential())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn push(&mut self, pair: PersistencePair) {
        self.pairs.push(pair);
    }
}

impl FromIterator<PersistencePair> for PersistenceDiagram {
    fn from_iter<T: IntoIterator<Item = PersistencePair>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
