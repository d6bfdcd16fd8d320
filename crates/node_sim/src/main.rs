//! # Node Simulator
//!
//! Nó sensor de bancada: envia leituras JSON ao hub via UDP em intervalo
//! fixo. Substitui o dispositivo real durante testes do hub.
//!
//! ## Uso
//! ```bash
//! node_sim                     # identidade do config.toml
//! node_sim --node-id sala-2    # sobrescreve a identidade
//! ```

mod sensor;

use hub_core::config::AppConfig;
use hub_core::protocol::encode_reading;
use sensor::SensorSource;
use std::net::UdpSocket;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let node_cfg = &config.node;
    let node_id = node_id_override(std::env::args()).unwrap_or_else(|| node_cfg.node_id.clone());
    let hub_addr = &node_cfg.hub_addr;
    let interval_secs = if node_cfg.interval_secs.is_finite() {
        node_cfg.interval_secs.clamp(0.1, 60.0)
    } else {
        2.0
    };
    let interval = Duration::from_secs_f64(interval_secs);

    // ── Socket UDP ──
    let sock = match UdpSocket::bind("0.0.0.0:0") {
        Ok(s) => s,
        Err(e) => {
            error!("Falha ao criar socket UDP: {e}");
            std::process::exit(1);
        }
    };

    let mut source = SensorSource::new(node_id.clone());

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ NODE SIMULATOR – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Nó:        {node_id}");
    println!("  Hub:       {hub_addr}");
    println!("  Intervalo: {:.1}s", interval.as_secs_f64());
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    loop {
        let cycle_start = Instant::now();

        let reading = source.sample();
        let frame = encode_reading(&reading);
        match sock.send_to(frame.as_bytes(), hub_addr) {
            Ok(sent) => {
                info!(
                    "→ {} bytes para {} | {:.1}°C | {:.1}% | luz {}",
                    sent,
                    hub_addr,
                    reading.temperature.unwrap_or_default(),
                    reading.humidity.unwrap_or_default(),
                    reading.light.unwrap_or_default()
                );
            }
            Err(e) => error!("Erro ao enviar UDP: {e}"),
        }

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}

/// Valor de `--node-id <id>` ou `--node-id=<id>`, se presente.
fn node_id_override(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--node-id" {
            return args.next().filter(|id| !id.trim().is_empty());
        }
        if let Some(id) = arg.strip_prefix("--node-id=") {
            return Some(id.to_string()).filter(|id| !id.trim().is_empty());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn node_id_from_args() {
        assert_eq!(
            node_id_override(args(&["node_sim", "--node-id", "sala-2"])),
            Some("sala-2".into())
        );
        assert_eq!(
            node_id_override(args(&["node_sim", "--node-id=lab"])),
            Some("lab".into())
        );
        assert_eq!(node_id_override(args(&["node_sim"])), None);
        assert_eq!(node_id_override(args(&["node_sim", "--node-id"])), None);
    }
}
