//! Encoder de snapshot – leitura pura do registro.

use crate::registry::Registry;
use crate::types::Snapshot;

/// Renderiza o registro em ordem de slot. Slots inativos expõem apenas
/// `isActive: false`.
pub fn encode(registry: &Registry) -> Snapshot {
    let entries = registry
        .slot_keys()
        .iter()
        .zip(registry.slots())
        .map(|(key, slot)| (key.clone(), slot.view()))
        .collect();
    Snapshot::new(entries)
}
