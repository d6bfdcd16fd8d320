//! Registro de nós – tabela de slots de tamanho fixo.
//!
//! O índice do slot é estável: slots nunca são reordenados nem compactados.
//! O registro é a única fonte de estado mutável do hub.

use crate::types::NodeRecord;

/// Capacidade padrão (nós simultâneos).
pub const DEFAULT_CAPACITY: usize = 2;

/// Tabela de slots, endereçada por índice.
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<NodeRecord>,
    /// Chaves de saída (`node1`, `node2`, …) calculadas uma única vez.
    keys: Vec<String>,
}

impl Registry {
    /// Cria um registro com `capacity` slots inativos.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![NodeRecord::default(); capacity],
            keys: (1..=capacity).map(|i| format!("node{i}")).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[NodeRecord] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&NodeRecord> {
        self.slots.get(index)
    }

    /// Chave de saída de cada slot, na mesma ordem de [`Registry::slots`].
    pub fn slot_keys(&self) -> &[String] {
        &self.keys
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Índice do slot ativo ligado a `node_id`, se houver.
    pub fn find_active(&self, node_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.active && s.node_id == node_id)
    }

    /// Primeiro slot inativo, independente da identidade antiga.
    pub fn first_inactive(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.active)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut NodeRecord> {
        self.slots.get_mut(index)
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [NodeRecord] {
        &mut self.slots
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
