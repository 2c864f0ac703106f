//! Trajectory domain model: the per-user ordered history plus derived rates.

use serde::{Deserialize, Serialize};

use super::experience::Experience;
use super::vector::VectorSnapshot;

/// The per-user ordered history of experiences plus derived aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub user_id: String,
    /// Insertion order == event order.
    pub experiences: Vec<Experience>,
    pub current_vector: VectorSnapshot,
    /// Append-only history of aggregate snapshots.
    pub vector_history: Vec<VectorSnapshot>,
    pub creation_rate: f64,
    pub propagation_rate: f64,
    /// First finite difference of the last two aggregate directions.
    pub compounding_direction: f64,
}

impl Trajectory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            experiences: Vec::new(),
            current_vector: VectorSnapshot::cold_start(),
            vector_history: Vec::new(),
            creation_rate: 0.0,
            propagation_rate: 0.0,
            compounding_direction: 0.0,
        }
    }

    pub fn experience(&self, id: uuid::Uuid) -> Option<&Experience> {
        self.experiences.iter().find(|e| e.id == id)
    }

    pub fn experience_mut(&mut self, id: uuid::Uuid) -> Option<&mut Experience> {
        self.experiences.iter_mut().find(|e| e.id == id)
    }

    pub fn experience_index(&self, id: uuid::Uuid) -> Option<usize> {
        self.experiences.iter().position(|e| e.id == id)
    }

    /// Append a new aggregate snapshot to history and make it current.
    pub fn push_aggregate(&mut self, snapshot: VectorSnapshot) {
        self.current_vector = snapshot.clone();
        self.vector_history.push(snapshot);
        self.recompute_compounding_direction();
    }

    fn recompute_compounding_direction(&mut self) {
        self.compounding_direction = if self.vector_history.len() >= 2 {
            let n = self.vector_history.len();
            self.vector_history[n - 1].direction - self.vector_history[n - 2].direction
        } else {
            0.0
        };
    }

    pub fn recompute_creation_rate(&mut self) {
        if self.experiences.is_empty() {
            self.creation_rate = 0.0;
            return;
        }
        let propagated = self.experiences.iter().filter(|e| e.propagated).count();
        self.creation_rate = propagated as f64 / self.experiences.len() as f64;
    }
}
