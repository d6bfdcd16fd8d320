//! Motor de agregação – dono único do registro.
//!
//! Dois gatilhos mutam o estado: [`Aggregator::ingest`] para cada payload
//! recebido e [`Aggregator::tick`] a cada período de varredura. Ambos
//! exigem `&mut self`, então o chamador serializa as mutações e cada uma
//! roda até o fim antes da próxima.

use crate::admission::{self, AdmissionError, SlotChoice};
use crate::broadcast::{BroadcastGate, SnapshotSink};
use crate::config::HubConfig;
use crate::liveness::LivenessMonitor;
use crate::protocol::{DecodeError, decode_reading};
use crate::registry::Registry;
use crate::snapshot;
use crate::types::Snapshot;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Motivo pelo qual um payload foi descartado.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Contadores de operação.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub accepted: u64,
    pub decode_failures: u64,
    pub capacity_rejections: u64,
    pub deactivations: u64,
    pub broadcasts: u64,
}

pub struct Aggregator<S> {
    registry: Registry,
    monitor: LivenessMonitor,
    gate: BroadcastGate<S>,
    stats: EngineStats,
}

impl<S: SnapshotSink> Aggregator<S> {
    pub fn new(capacity: usize, stale_after: Duration, sink: S) -> Self {
        Self {
            registry: Registry::new(capacity),
            monitor: LivenessMonitor::new(stale_after),
            gate: BroadcastGate::new(sink),
            stats: EngineStats::default(),
        }
    }

    pub fn from_config(config: &HubConfig, sink: S) -> Self {
        Self::new(config.capacity, config.stale_after(), sink)
    }

    /// Processa um payload de nó: decode → admissão → snapshot → broadcast.
    ///
    /// Toda admissão bem-sucedida publica, mesmo sem mudança de valores.
    /// Em erro nada é alterado e nada é publicado.
    pub fn ingest(&mut self, payload: &[u8], now: Instant) -> Result<usize, IngestError> {
        debug!("Payload recebido: {}", String::from_utf8_lossy(payload));

        let reading = decode_reading(payload).inspect_err(|e| {
            self.stats.decode_failures += 1;
            warn!("Payload descartado: {e}");
        })?;

        let choice = admission::admit(&mut self.registry, &reading, now).inspect_err(|e| {
            self.stats.capacity_rejections += 1;
            warn!("Leitura descartada: {e}");
        })?;

        match choice {
            SlotChoice::Refresh(i) => debug!("Nó '{}' atualizado no slot {i}", reading.node_id),
            SlotChoice::Bind(i) => debug!("Nó '{}' ativo no slot {i}", reading.node_id),
        }
        self.stats.accepted += 1;
        self.publish();

        Ok(choice.index())
    }

    /// Varredura de liveness. Publica exatamente um snapshot se algum slot
    /// mudou; retorna `true` nesse caso.
    pub fn tick(&mut self, now: Instant) -> bool {
        let report = self.monitor.sweep(&mut self.registry, now);
        if !report.changed() {
            return false;
        }
        self.stats.deactivations += report.deactivated.len() as u64;
        self.publish();
        true
    }

    /// Snapshot somente-leitura do estado atual (mesmo formato do broadcast).
    pub fn snapshot(&self) -> Snapshot {
        snapshot::encode(&self.registry)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        self.gate.sink()
    }

    fn publish(&mut self) {
        let snap = snapshot::encode(&self.registry);
        self.gate.publish(&snap);
        self.stats.broadcasts += 1;
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
