//! Política de admissão – escolhe o slot que recebe uma leitura.
//!
//! 1. Slot ativo com a mesma identidade → atualiza no lugar.
//! 2. Senão, o primeiro slot inativo é religado à nova identidade, mesmo que
//!    guarde a identidade antiga de outro nó.
//! 3. Senão, registro cheio: a leitura é descartada sem mutação.
//!
//! Campos ausentes na leitura mantêm o valor anterior do slot.

use crate::registry::Registry;
use crate::types::Reading;
use std::time::Instant;
use tracing::debug;

/// Erro de admissão.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Sem slot livre para o nó '{node_id}' (capacidade {capacity}, todos ativos)")]
    CapacityExceeded { node_id: String, capacity: usize },
}

/// Como o slot foi obtido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChoice {
    /// Nó já ativo neste slot.
    Refresh(usize),
    /// Slot inativo religado à nova identidade.
    Bind(usize),
}

impl SlotChoice {
    pub fn index(&self) -> usize {
        match self {
            SlotChoice::Refresh(i) | SlotChoice::Bind(i) => *i,
        }
    }
}

/// Decide o slot para `node_id` sem alterar o registro.
pub fn select_slot(registry: &Registry, node_id: &str) -> Option<SlotChoice> {
    registry
        .find_active(node_id)
        .map(SlotChoice::Refresh)
        .or_else(|| registry.first_inactive().map(SlotChoice::Bind))
}

/// Admite a leitura no registro e retorna o slot atualizado.
pub fn admit(
    registry: &mut Registry,
    reading: &Reading,
    now: Instant,
) -> Result<SlotChoice, AdmissionError> {
    let capacity = registry.capacity();
    let choice = select_slot(registry, &reading.node_id).ok_or_else(|| {
        AdmissionError::CapacityExceeded {
            node_id: reading.node_id.clone(),
            capacity,
        }
    })?;

    let index = choice.index();
    let Some(slot) = registry.slot_mut(index) else {
        // select_slot só devolve índices existentes
        return Err(AdmissionError::CapacityExceeded {
            node_id: reading.node_id.clone(),
            capacity,
        });
    };

    if let SlotChoice::Bind(_) = choice {
        if slot.node_id != reading.node_id {
            debug!(
                "Slot {index} religado: '{}' → '{}'",
                slot.node_id, reading.node_id
            );
        }
        slot.node_id = reading.node_id.clone();
        slot.active = true;
    }
    slot.apply(reading, now);

    Ok(choice)
}
