//! # Hub Core
//!
//! Núcleo de agregação do hub de sensores: mantém o registro de nós em
//! slots fixos, decide a admissão de cada identidade, detecta nós offline
//! e gera o snapshot consolidado publicado para os viewers.
//!
//! Nenhum módulo faz I/O; o transporte fica nos binários.
//!
//! ## Módulos
//! - [`types`] – Leitura, registro por slot e snapshot
//! - [`protocol`] – Decode/encode JSON do fio
//! - [`registry`] – Tabela de slots de tamanho fixo
//! - [`admission`] – Política de escolha de slot
//! - [`liveness`] – Varredura de inatividade
//! - [`snapshot`] – Renderização do registro
//! - [`broadcast`] – Entrega do snapshot ao transporte
//! - [`engine`] – Motor que une tudo
//! - [`config`] – Configuração unificada via TOML

pub mod types;
pub mod protocol;
pub mod registry;
pub mod admission;
pub mod liveness;
pub mod snapshot;
pub mod broadcast;
pub mod engine;
pub mod config;

// Re-exports convenientes
pub use types::{NodeRecord, Reading, SlotView, Snapshot};
pub use protocol::{decode_reading, decode_snapshot, encode_snapshot, DecodeError};
pub use broadcast::SnapshotSink;
pub use engine::{Aggregator, EngineStats, IngestError};
pub use config::{AppConfig, HubConfig, NodeConfig, ViewerConfig};
