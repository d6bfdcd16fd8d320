//! Monitor de liveness – varredura periódica que desativa slots sem update.

use crate::registry::Registry;
use std::time::{Duration, Instant};
use tracing::info;

/// Intervalo padrão entre varreduras.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Tempo padrão sem leitura antes de considerar o nó offline.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(10);

/// Resultado de uma varredura.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Slots desativados nesta passada, em ordem de índice
    pub deactivated: Vec<usize>,
}

impl SweepReport {
    pub fn changed(&self) -> bool {
        !self.deactivated.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LivenessMonitor {
    stale_after: Duration,
}

impl LivenessMonitor {
    pub fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Um slot ativo é considerado velho quando `now - last_update` excede o limite.
    fn is_stale(&self, last_update: Option<Instant>, now: Instant) -> bool {
        match last_update {
            Some(t) => now.saturating_duration_since(t) > self.stale_after,
            None => true,
        }
    }

    /// Marca como inativos os slots velhos. Identidade e leituras ficam intactas.
    pub fn sweep(&self, registry: &mut Registry, now: Instant) -> SweepReport {
        let mut report = SweepReport::default();

        for (index, slot) in registry.slots_mut().iter_mut().enumerate() {
            if slot.active && self.is_stale(slot.last_update, now) {
                slot.active = false;
                info!("Nó '{}' (slot {index}) offline – sem dados", slot.node_id);
                report.deactivated.push(index);
            }
        }

        report
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}
