use std::collections::HashMap;

use crate::model::{TrueParticleId, Track, TruthParticle};

/// Resolves truth particle references to the particles themselves.
pub trait TruthLookup {
    fn particle(&self, id: &TrueParticleId) -> Option<&TruthParticle>;
}

/// The truth particle contributing the largest overlap fraction to `track`.
/// `None` when the track carries no truth references.
pub fn dominant_particle(track: &Track) -> Option<TrueParticleId> {
    track
        .truth
        .iter()
        .filter(|t| !t.overlap.is_nan())
        .max_by(|a, b| a.overlap.total_cmp(&b.overlap))
        .map(|t| t.particle)
}

/// In-memory truth table keyed by particle id.
#[derive(Debug, Clone, Default)]
pub struct TruthTable {
    particles: HashMap<TrueParticleId, TruthParticle>,
}

impl TruthTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, particle: TruthParticle) {
        self.particles.insert(particle.id, particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl FromIterator<TruthParticle> for TruthTable {
    fn from_iter<I: IntoIterator<Item = TruthParticle>>(iter: I) -> Self {
        let mut table = Self::new();
        for particle in iter {
            table.insert(particle);
        }
        table
    }
}

impl TruthLookup for TruthTable {
    fn particle(&self, id: &TrueParticleId) -> Option<&TruthParticle> {
        self.particles.get(id)
    }
}

/// Lookup that never resolves anything; for runs without simulation truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTruth;

impl TruthLookup for NoTruth {
    fn particle(&self, _id: &TrueParticleId) -> Option<&TruthParticle> {
        None
    }
}
