//! # Hub Viewer
//!
//! Viewer de console: recebe os snapshots publicados pelo hub e imprime o
//! estado de cada slot a cada atualização.

mod net_thread;

use hub_core::config::{AppConfig, MAX_INTERVAL_SECS};
use hub_core::types::{SlotView, Snapshot};
use net_thread::ViewerMessage;
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

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }

    let rx = match net_thread::spawn_receiver_thread(config.viewer.port) {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao criar thread de rede: {e}");
            std::process::exit(1);
        }
    };

    let idle_warning_secs = if config.viewer.idle_warning_secs.is_finite() {
        config.viewer.idle_warning_secs.clamp(1.0, MAX_INTERVAL_SECS)
    } else {
        warn!("idle_warning_secs inválido, usando 15s");
        15.0
    };
    let idle_warning = Duration::from_secs_f64(idle_warning_secs);
    let mut last_data = Instant::now();
    let mut warned = false;

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(ViewerMessage {
                snapshot,
                source_addr,
                raw_size,
            }) => {
                if warned {
                    info!("Hub {source_addr} voltou a publicar");
                    warned = false;
                }
                last_data = Instant::now();
                println!("── {source_addr} ({raw_size} bytes) ──");
                for line in render(&snapshot) {
                    println!("{line}");
                }
            }
            Err(e) if e.is_timeout() => {
                if !warned && last_data.elapsed() > idle_warning {
                    warn!(
                        "Sem snapshots há {:.0}s – hub desconectado?",
                        last_data.elapsed().as_secs_f64()
                    );
                    warned = true;
                }
            }
            Err(_) => {
                error!("Thread de rede encerrada");
                return;
            }
        }
    }
}

/// Uma linha por slot, em ordem de slot.
fn render(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .entries()
        .iter()
        .map(|(key, view)| match view {
            SlotView::Active {
                node_id,
                temperature,
                humidity,
                light,
            } => format!(
                "{key:<7} {node_id:<16} {temperature:>6.1} °C {humidity:>6.1} % luz {light}"
            ),
            SlotView::Inactive => format!("{key:<7} offline"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_active_and_offline_slots() {
        let snap = Snapshot::new(vec![
            (
                "node1".into(),
                SlotView::Active {
                    node_id: "n1".into(),
                    temperature: 21.5,
                    humidity: 55.0,
                    light: 512,
                },
            ),
            ("node2".into(), SlotView::Inactive),
        ]);
        let lines = render(&snap);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("node1"));
        assert!(lines[0].contains("n1"));
        assert!(lines[0].contains("21.5 °C"));
        assert!(lines[0].contains("luz 512"));
        assert_eq!(lines[1], "node2   offline");
    }
}
