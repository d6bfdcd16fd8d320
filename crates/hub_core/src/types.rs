//! Tipos de dados do hub: leitura recebida, registro por slot e snapshot.
//!
//! O formato JSON segue o contrato com os nós sensores e com os viewers:
//! chaves em camelCase (`nodeId`, `isActive`).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Instant;

/// Identidade atribuída a slots que nunca receberam leitura.
pub const UNKNOWN_NODE_ID: &str = "Unknown";

// ──────────────────────────────────────────────
// Leitura
// ──────────────────────────────────────────────

/// Leitura validada vinda de um nó sensor.
///
/// Campos numéricos ausentes no payload ficam `None` e não alteram o valor
/// armazenado no slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<i32>,
}

impl Reading {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, value: f32) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn with_humidity(mut self, value: f32) -> Self {
        self.humidity = Some(value);
        self
    }

    pub fn with_light(mut self, value: i32) -> Self {
        self.light = Some(value);
        self
    }
}

// ──────────────────────────────────────────────
// Registro de nó
// ──────────────────────────────────────────────

/// Estado de um slot do registro.
///
/// Ao ficar inativo o slot mantém identidade e leituras antigas; elas só
/// deixam de ser expostas no snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub node_id: String,
    pub temperature: f32,
    pub humidity: f32,
    pub light: i32,
    pub active: bool,
    /// Instante da última leitura aceita (`None` = nunca atualizado)
    pub last_update: Option<Instant>,
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self {
            node_id: UNKNOWN_NODE_ID.into(),
            temperature: 0.0,
            humidity: 0.0,
            light: 0,
            active: false,
            last_update: None,
        }
    }
}

impl NodeRecord {
    /// Aplica apenas os campos presentes na leitura e marca o instante.
    pub fn apply(&mut self, reading: &Reading, now: Instant) {
        if let Some(t) = reading.temperature {
            self.temperature = t;
        }
        if let Some(h) = reading.humidity {
            self.humidity = h;
        }
        if let Some(l) = reading.light {
            self.light = l;
        }
        self.last_update = Some(now);
    }

    /// Visão pública do slot (sem dados antigos quando inativo).
    pub fn view(&self) -> SlotView {
        if self.active {
            SlotView::Active {
                node_id: self.node_id.clone(),
                temperature: self.temperature,
                humidity: self.humidity,
                light: self.light,
            }
        } else {
            SlotView::Inactive
        }
    }
}

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// Entrada de um slot no snapshot publicado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireSlot", try_from = "WireSlot")]
pub enum SlotView {
    Active {
        node_id: String,
        temperature: f32,
        humidity: f32,
        light: i32,
    },
    Inactive,
}

impl SlotView {
    pub fn is_active(&self) -> bool {
        matches!(self, SlotView::Active { .. })
    }
}

/// Forma do slot no fio: `{nodeId, temperature, humidity, light, isActive: true}`
/// ou apenas `{isActive: false}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    humidity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    light: Option<i32>,
    is_active: bool,
}

impl From<SlotView> for WireSlot {
    fn from(view: SlotView) -> Self {
        match view {
            SlotView::Active {
                node_id,
                temperature,
                humidity,
                light,
            } => WireSlot {
                node_id: Some(node_id),
                temperature: Some(temperature),
                humidity: Some(humidity),
                light: Some(light),
                is_active: true,
            },
            SlotView::Inactive => WireSlot {
                node_id: None,
                temperature: None,
                humidity: None,
                light: None,
                is_active: false,
            },
        }
    }
}

impl TryFrom<WireSlot> for SlotView {
    type Error = String;

    fn try_from(wire: WireSlot) -> Result<Self, Self::Error> {
        if !wire.is_active {
            return Ok(SlotView::Inactive);
        }
        let node_id = wire
            .node_id
            .ok_or_else(|| "slot ativo sem nodeId".to_string())?;
        Ok(SlotView::Active {
            node_id,
            temperature: wire.temperature.unwrap_or_default(),
            humidity: wire.humidity.unwrap_or_default(),
            light: wire.light.unwrap_or_default(),
        })
    }
}

/// Visão consolidada de todos os slots, em ordem de índice.
///
/// Serializa como objeto JSON `{"node1": {...}, "node2": {...}}` preservando
/// a ordem dos slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(String, SlotView)>,
}

impl Snapshot {
    pub fn new(entries: Vec<(String, SlotView)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, SlotView)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&SlotView> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, view)| view)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_active()).count()
    }
}

/// Número do slot extraído da chave (`"node2"` → 2). Chaves fora do padrão
/// vão para o fim.
fn slot_number(key: &str) -> usize {
    key.strip_prefix("node")
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, view) in &self.entries {
            map.serialize_entry(key, view)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = Snapshot;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("um objeto com entradas nodeN")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Snapshot, A::Error> {
                let mut entries: Vec<(String, SlotView)> = Vec::new();
                while let Some((key, view)) = access.next_entry::<String, SlotView>()? {
                    entries.push((key, view));
                }
                entries.sort_by_key(|(key, _)| slot_number(key));
                Ok(Snapshot { entries })
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_record_is_unknown_and_inactive() {
        let r = NodeRecord::default();
        assert_eq!(r.node_id, UNKNOWN_NODE_ID);
        assert!(!r.active);
        assert_eq!(r.light, 0);
        assert!(r.last_update.is_none());
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let t0 = Instant::now();
        let mut r = NodeRecord::default();
        r.apply(&Reading::new("n1").with_temperature(21.5).with_light(300), t0);
        r.apply(&Reading::new("n1").with_humidity(55.0), t0 + Duration::from_secs(1));

        assert_eq!(r.temperature, 21.5);
        assert_eq!(r.humidity, 55.0);
        assert_eq!(r.light, 300);
        assert_eq!(r.last_update, Some(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn inactive_view_hides_stale_data() {
        let mut r = NodeRecord::default();
        r.apply(&Reading::new("n1").with_temperature(30.0), Instant::now());
        r.node_id = "n1".into();
        assert_eq!(r.view(), SlotView::Inactive);

        r.active = true;
        assert!(r.view().is_active());
    }

    #[test]
    fn inactive_slot_serializes_flag_only() {
        let json = serde_json::to_string(&SlotView::Inactive).unwrap();
        assert_eq!(json, r#"{"isActive":false}"#);
    }

    #[test]
    fn active_slot_serializes_all_fields() {
        let view = SlotView::Active {
            node_id: "n1".into(),
            temperature: 21.5,
            humidity: 40.0,
            light: 512,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(
            json,
            r#"{"nodeId":"n1","temperature":21.5,"humidity":40.0,"light":512,"isActive":true}"#
        );
    }

    #[test]
    fn snapshot_keeps_slot_order() {
        let snap = Snapshot::new(
            (1..=11)
                .map(|i| (format!("node{i}"), SlotView::Inactive))
                .collect(),
        );
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.starts_with(r#"{"node1":"#));
        assert!(json.find("\"node2\"").unwrap() < json.find("\"node10\"").unwrap());
    }

    #[test]
    fn snapshot_deserialize_sorts_by_slot_number() {
        let json = r#"{"node2":{"isActive":false},"node1":{"nodeId":"a","temperature":1.0,"humidity":2.0,"light":3,"isActive":true}}"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.entries()[0].0, "node1");
        assert_eq!(snap.entries()[1].0, "node2");
        assert_eq!(snap.active_count(), 1);
    }

    #[test]
    fn active_slot_without_node_id_is_rejected() {
        let json = r#"{"node1":{"isActive":true}}"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }
}
