//! # Sensor Hub
//!
//! Recebe leituras dos nós sensores via UDP (JSON), mantém o registro de
//! nós em slots fixos e publica o snapshot consolidado para os viewers a
//! cada mudança.
//!
//! ## Uso
//! ```bash
//! sensor_hub                       # config.toml ao lado do executável
//! RUST_LOG=debug sensor_hub        # mostra cada payload recebido
//! ```

mod fanout;
mod net_thread;
mod scheduler;

use fanout::UdpFanout;
use hub_core::config::AppConfig;
use hub_core::engine::Aggregator;
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

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        std::process::exit(2);
    }

    let hub_cfg = &config.hub;

    // ── Transporte de saída ──
    let fanout = match UdpFanout::from_config(hub_cfg) {
        Ok(f) => f,
        Err(e) => {
            error!("Falha ao criar socket de saída: {e}");
            std::process::exit(1);
        }
    };
    if fanout.targets().is_empty() {
        warn!("Nenhum viewer configurado – snapshots não serão enviados");
    }
    let viewers = fanout
        .targets()
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    // ── Thread de entrada ──
    let inbound = match net_thread::spawn_listener_thread(hub_cfg.bind_addr()) {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao criar thread de rede: {e}");
            std::process::exit(1);
        }
    };

    let mut aggregator = Aggregator::from_config(hub_cfg, fanout);
    info!("Registro inicializado com {} slots", hub_cfg.capacity);

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ SENSOR HUB – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Nós:       {}", hub_cfg.bind_addr());
    println!("  Viewers:   {viewers}");
    println!("  Slots:     {}", hub_cfg.capacity);
    println!(
        "  Offline:   >{:.1}s (varredura {:.1}s)",
        hub_cfg.stale_after_secs, hub_cfg.sweep_interval_secs
    );
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    scheduler::run(&mut aggregator, &inbound, hub_cfg.sweep_interval());

    let stats = aggregator.stats();
    info!(
        "Hub encerrado | aceitas {} | inválidas {} | sem slot {} | broadcasts {}",
        stats.accepted, stats.decode_failures, stats.capacity_rejections, stats.broadcasts
    );
}
