//! Broadcast gate – entrega o snapshot codificado ao transporte.
//!
//! Sem fila, sem retry, sem confirmação. Falhas por assinante ficam dentro
//! do [`SnapshotSink`] e nunca voltam para o núcleo.

use crate::protocol::encode_snapshot;
use crate::types::Snapshot;
use tracing::debug;

/// Transporte externo que espalha um frame para todos os assinantes.
pub trait SnapshotSink {
    /// Entrega best-effort; não pode bloquear nem falhar para o chamador.
    fn deliver(&mut self, frame: &str);
}

/// Coleta frames em memória (útil para inspeção e testes).
impl SnapshotSink for Vec<String> {
    fn deliver(&mut self, frame: &str) {
        self.push(frame.to_owned());
    }
}

/// Pass-through do snapshot para o [`SnapshotSink`].
#[derive(Debug)]
pub struct BroadcastGate<S> {
    sink: S,
}

impl<S: SnapshotSink> BroadcastGate<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Codifica e entrega o snapshot. Chamadas sucessivas preservam a ordem.
    pub fn publish(&mut self, snapshot: &Snapshot) {
        let frame = encode_snapshot(snapshot);
        debug!("Broadcast {} bytes", frame.len());
        self.sink.deliver(&frame);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
