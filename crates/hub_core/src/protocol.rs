//! Protocolo de fio entre nós, hub e viewers.
//!
//! Tudo trafega como JSON em texto UTF-8, um objeto por datagrama:
//!
//! ```text
//! nó     → hub     {"nodeId":"n1","temperature":21.5,"humidity":55,"light":512}
//! hub    → viewer  {"node1":{...,"isActive":true},"node2":{"isActive":false}}
//! ```
//!
//! O payload de um nó é tratado como não confiável: campos desconhecidos são
//! ignorados, numéricos são aceitos sem validação de faixa.

use crate::types::{Reading, Snapshot};
use serde_json::{Map, Value};
use tracing::debug;

/// Tamanho máximo de datagrama UDP seguro (sem fragmentação).
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Erros de decodificação de payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("JSON inválido: {0}")]
    Json(String),

    #[error("Payload não é um objeto JSON")]
    NotAnObject,

    #[error("Mensagem sem campo nodeId")]
    MissingNodeId,
}

/// Identidade como texto: strings são usadas como estão, qualquer outro
/// valor (número, bool, null) vira sua forma JSON (`5`, `true`, `null`).
fn node_id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Campo numérico opcional. Ausente, `null` ou de tipo errado → `None`
/// (o slot mantém o valor anterior).
fn number_field(msg: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = msg.get(key)?;
    let number = value.as_f64();
    if number.is_none() && !value.is_null() {
        debug!("Campo '{key}' ignorado: não numérico ({value})");
    }
    number
}

/// Decodifica o payload de um nó em [`Reading`].
///
/// Falha se o payload não for um objeto JSON bem formado ou se não tiver
/// `nodeId`. Campos numéricos de tipo errado são ignorados individualmente;
/// `light` é inteiro no nó e números fracionários são truncados em direção a
/// zero. Nenhum efeito colateral em caso de erro.
pub fn decode_reading(data: &[u8]) -> Result<Reading, DecodeError> {
    let value: Value =
        serde_json::from_slice(data).map_err(|e| DecodeError::Json(e.to_string()))?;
    let Value::Object(msg) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let node_id = msg
        .get("nodeId")
        .map(node_id_text)
        .ok_or(DecodeError::MissingNodeId)?;

    Ok(Reading {
        node_id,
        temperature: number_field(&msg, "temperature").map(|v| v as f32),
        humidity: number_field(&msg, "humidity").map(|v| v as f32),
        light: number_field(&msg, "light").map(|v| v.trunc() as i32),
    })
}

/// Codifica uma leitura para envio ao hub (usado pelo simulador de nó).
pub fn encode_reading(reading: &Reading) -> String {
    // Reading só tem strings e números: serialização não falha
    serde_json::to_string(reading).unwrap_or_default()
}

/// Codifica o snapshot no frame JSON compacto enviado aos viewers.
pub fn encode_snapshot(snapshot: &Snapshot) -> String {
    // Chaves são strings e f32 não finitos viram null: serialização não falha
    serde_json::to_string(snapshot).unwrap_or_default()
}

/// Decodifica um frame de snapshot (lado do viewer).
pub fn decode_snapshot(data: &[u8]) -> Result<Snapshot, DecodeError> {
    serde_json::from_slice(data).map_err(|e| DecodeError::Json(e.to_string()))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotView;

    #[test]
    fn decodes_full_reading() {
        let r = decode_reading(br#"{"nodeId":"n1","temperature":21.5,"humidity":55,"light":512}"#)
            .unwrap();
        assert_eq!(r.node_id, "n1");
        assert_eq!(r.temperature, Some(21.5));
        assert_eq!(r.humidity, Some(55.0));
        assert_eq!(r.light, Some(512));
    }

    #[test]
    fn absent_fields_are_none() {
        let r = decode_reading(br#"{"nodeId":"n2","humidity":40.5}"#).unwrap();
        assert_eq!(r.temperature, None);
        assert_eq!(r.humidity, Some(40.5));
        assert_eq!(r.light, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let r = decode_reading(br#"{"nodeId":"n1","rssi":-60,"fw":"1.2"}"#).unwrap();
        assert_eq!(r, Reading::new("n1"));
    }

    #[test]
    fn rejects_missing_node_id() {
        assert_eq!(
            decode_reading(br#"{"temperature":21.5}"#),
            Err(DecodeError::MissingNodeId)
        );
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            decode_reading(b"{\"nodeId\":"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(decode_reading(b"hello"), Err(DecodeError::Json(_))));
        assert_eq!(decode_reading(b"[1,2]"), Err(DecodeError::NotAnObject));
        assert_eq!(decode_reading(b"42"), Err(DecodeError::NotAnObject));
    }

    #[test]
    fn non_numeric_field_is_skipped_not_fatal() {
        let r = decode_reading(br#"{"nodeId":"n1","temperature":"hot","humidity":40}"#).unwrap();
        assert_eq!(r.node_id, "n1");
        assert_eq!(r.temperature, None);
        assert_eq!(r.humidity, Some(40.0));

        let r = decode_reading(br#"{"nodeId":"n1","light":true,"humidity":null}"#).unwrap();
        assert_eq!(r.light, None);
        assert_eq!(r.humidity, None);
    }

    #[test]
    fn non_string_node_id_is_converted_to_text() {
        let r = decode_reading(br#"{"nodeId":5,"temperature":20}"#).unwrap();
        assert_eq!(r.node_id, "5");
        assert_eq!(r.temperature, Some(20.0));

        let r = decode_reading(br#"{"nodeId":null}"#).unwrap();
        assert_eq!(r.node_id, "null");
    }

    #[test]
    fn fractional_light_is_truncated() {
        let r = decode_reading(br#"{"nodeId":"n1","light":512.9}"#).unwrap();
        assert_eq!(r.light, Some(512));
        let r = decode_reading(br#"{"nodeId":"n1","light":-3.7}"#).unwrap();
        assert_eq!(r.light, Some(-3));
    }

    #[test]
    fn values_are_taken_verbatim() {
        let r = decode_reading(br#"{"nodeId":"n1","temperature":-400,"humidity":250}"#).unwrap();
        assert_eq!(r.temperature, Some(-400.0));
        assert_eq!(r.humidity, Some(250.0));
    }

    #[test]
    fn encoded_reading_skips_absent_fields() {
        let json = encode_reading(&Reading::new("n1").with_temperature(21.5));
        assert_eq!(json, r#"{"nodeId":"n1","temperature":21.5}"#);
        assert_eq!(
            decode_reading(json.as_bytes()).unwrap().temperature,
            Some(21.5)
        );
    }

    #[test]
    fn snapshot_frame_is_compact_json() {
        let snap = Snapshot::new(vec![
            ("node1".into(), SlotView::Inactive),
            ("node2".into(), SlotView::Inactive),
        ]);
        let frame = encode_snapshot(&snap);
        assert_eq!(frame, r#"{"node1":{"isActive":false},"node2":{"isActive":false}}"#);
        assert_eq!(decode_snapshot(frame.as_bytes()).unwrap(), snap);
    }
}
