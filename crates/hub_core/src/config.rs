//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável configura hub, simulador
//! de nó e viewer.

use crate::liveness::{DEFAULT_STALE_AFTER, DEFAULT_SWEEP_INTERVAL};
use crate::registry::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Capacidade máxima aceita na configuração.
pub const MAX_CAPACITY: usize = 16;

/// Maior intervalo aceito em qualquer campo `*_secs` (um dia).
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;

/// `true` se `secs` é um intervalo positivo, finito e até [`MAX_INTERVAL_SECS`].
fn interval_in_range(secs: f64) -> bool {
    secs > 0.0 && secs <= MAX_INTERVAL_SECS
}

/// Configuração do Hub (agregador).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// IP local para bind (vazio = 0.0.0.0)
    pub bind_ip: String,
    /// Porta UDP onde os nós enviam leituras
    pub port: u16,
    /// Número fixo de slots
    pub capacity: usize,
    /// Intervalo da varredura de liveness (segundos)
    pub sweep_interval_secs: f64,
    /// Tempo sem leitura até o nó ficar offline (segundos)
    pub stale_after_secs: f64,
    /// Viewers que recebem os snapshots (`ip:porta`)
    pub viewers: Vec<String>,
    /// Também envia broadcast na LAN para `viewer_port`
    pub broadcast: bool,
    /// Porta dos viewers usada no modo broadcast
    pub viewer_port: u16,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_ip: String::new(),
            port: 5005,
            capacity: DEFAULT_CAPACITY,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs_f64(),
            stale_after_secs: DEFAULT_STALE_AFTER.as_secs_f64(),
            viewers: vec!["127.0.0.1:5006".into()],
            broadcast: false,
            viewer_port: 5006,
        }
    }
}

impl HubConfig {
    /// Intervalo de varredura; valores fora do representável voltam ao padrão.
    pub fn sweep_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.sweep_interval_secs).unwrap_or(DEFAULT_SWEEP_INTERVAL)
    }

    /// Limite de inatividade; valores fora do representável voltam ao padrão.
    pub fn stale_after(&self) -> Duration {
        Duration::try_from_secs_f64(self.stale_after_secs).unwrap_or(DEFAULT_STALE_AFTER)
    }

    pub fn bind_addr(&self) -> String {
        let ip = if self.bind_ip.is_empty() {
            "0.0.0.0"
        } else {
            &self.bind_ip
        };
        format!("{ip}:{}", self.port)
    }
}

/// Configuração do simulador de nó.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Identidade declarada pelo nó
    pub node_id: String,
    /// Endereço do hub (`ip:porta`)
    pub hub_addr: String,
    /// Intervalo de envio em segundos
    pub interval_secs: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "node-a".into(),
            hub_addr: "127.0.0.1:5005".into(),
            interval_secs: 2.0,
        }
    }
}

/// Configuração do viewer de console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Porta UDP para escutar snapshots
    pub port: u16,
    /// Aviso de "sem dados" após este tempo (segundos)
    pub idle_warning_secs: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            port: 5006,
            idle_warning_secs: 15.0,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hub: HubConfig,
    pub node: NodeConfig,
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Carrega `[hub]`, `[node]` e `[viewer]` de um arquivo TOML.
    ///
    /// Seções ou campos ausentes ficam com o padrão; arquivo ilegível ou
    /// inválido resulta na configuração padrão inteira.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Grava as três seções em TOML (usado para criar o arquivo na primeira execução).
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// `config.toml` no diretório do executável, compartilhado por hub, nó e viewer.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida as três seções e retorna lista de erros (vazia = ok).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let hub = &self.hub;

        if hub.port == 0 {
            errors.push("Porta do hub não pode ser 0".into());
        }
        if hub.capacity == 0 || hub.capacity > MAX_CAPACITY {
            errors.push(format!(
                "Capacidade inválida: {} (1–{MAX_CAPACITY})",
                hub.capacity
            ));
        }
        if !interval_in_range(hub.sweep_interval_secs) {
            errors.push(format!(
                "Intervalo de varredura inválido: {} (0–{MAX_INTERVAL_SECS})",
                hub.sweep_interval_secs
            ));
        }
        if !interval_in_range(hub.stale_after_secs) {
            errors.push(format!(
                "Limite de inatividade inválido: {} (0–{MAX_INTERVAL_SECS})",
                hub.stale_after_secs
            ));
        } else if hub.sweep_interval_secs > hub.stale_after_secs {
            errors.push(format!(
                "Varredura ({}s) maior que o limite de inatividade ({}s)",
                hub.sweep_interval_secs, hub.stale_after_secs
            ));
        }
        if hub.broadcast && hub.viewer_port == 0 {
            errors.push("Porta dos viewers não pode ser 0 em modo broadcast".into());
        }
        if self.node.node_id.trim().is_empty() {
            errors.push("node_id do simulador não pode ser vazio".into());
        }
        if !(0.1..=60.0).contains(&self.node.interval_secs) {
            errors.push(format!(
                "Intervalo do nó inválido: {} (0.1–60.0)",
                self.node.interval_secs
            ));
        }
        if self.viewer.port == 0 {
            errors.push("Porta do viewer não pode ser 0".into());
        }
        if !(1.0..=MAX_INTERVAL_SECS).contains(&self.viewer.idle_warning_secs) {
            errors.push(format!(
                "Aviso de inatividade do viewer inválido: {} (1–{MAX_INTERVAL_SECS})",
                self.viewer.idle_warning_secs
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn defaults_match_reference_timing() {
        let hub = HubConfig::default();
        assert_eq!(hub.capacity, 2);
        assert_eq!(hub.sweep_interval(), Duration::from_secs(1));
        assert_eq!(hub.stale_after(), Duration::from_secs(10));
        assert_eq!(hub.bind_addr(), "0.0.0.0:5005");
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.hub.port, parsed.hub.port);
        assert_eq!(config.hub.viewers, parsed.hub.viewers);
        assert_eq!(config.node.node_id, parsed.node.node_id);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[hub]
capacity = 4
stale_after_secs = 30.0
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.hub.capacity, 4);
        assert_eq!(config.hub.stale_after(), Duration::from_secs(30));
        // Outros campos devem ter valor padrão
        assert_eq!(config.hub.port, 5005);
        assert_eq!(config.viewer.port, 5006);
    }

    #[test]
    fn rejects_bad_hub_settings() {
        let mut config = AppConfig::default();
        config.hub.capacity = 0;
        config.hub.sweep_interval_secs = 20.0;
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "Erros: {:?}", errors);
    }

    #[test]
    fn rejects_non_finite_intervals() {
        let mut config = AppConfig::default();
        config.hub.sweep_interval_secs = f64::NAN;
        config.hub.stale_after_secs = f64::INFINITY;
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn rejects_intervals_beyond_duration_range() {
        let mut config = AppConfig::default();
        config.hub.stale_after_secs = 1e30;
        config.hub.sweep_interval_secs = 1e30;
        config.node.interval_secs = f64::NAN;
        config.viewer.idle_warning_secs = f64::NAN;
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "Erros: {:?}", errors);
    }

    #[test]
    fn oversized_intervals_do_not_panic() {
        let hub = HubConfig {
            sweep_interval_secs: 1e30,
            stale_after_secs: f64::NAN,
            ..HubConfig::default()
        };
        assert_eq!(hub.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
        assert_eq!(hub.stale_after(), DEFAULT_STALE_AFTER);

        let _ = crate::engine::Aggregator::from_config(&hub, Vec::<String>::new());
    }

    #[test]
    fn load_missing_file_falls_back_to_default() {
        let config = AppConfig::load(Path::new("/nonexistent/hub/config.toml"));
        assert_eq!(config.hub.capacity, DEFAULT_CAPACITY);
    }
}
