//! Loop principal do hub – único escritor do registro.
//!
//! Alterna entre drenar datagramas dos nós e o tick de varredura. Cada
//! braço do `select!` roda até o fim antes do próximo, então o registro
//! nunca é observado no meio de uma mutação.

use crate::net_thread::InboundDatagram;
use crossbeam_channel::{Receiver, select, tick};
use hub_core::broadcast::SnapshotSink;
use hub_core::engine::Aggregator;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Executa até o channel de entrada ser fechado.
pub fn run<S: SnapshotSink>(
    aggregator: &mut Aggregator<S>,
    inbound: &Receiver<InboundDatagram>,
    sweep_interval: Duration,
) {
    let ticker = tick(sweep_interval);

    loop {
        select! {
            recv(inbound) -> msg => match msg {
                Ok(datagram) => {
                    if let Err(e) = aggregator.ingest(&datagram.payload, Instant::now()) {
                        debug!("Origem do descarte: {} ({e})", datagram.source_addr);
                    }
                }
                Err(_) => {
                    info!("Canal de entrada fechado, encerrando loop");
                    return;
                }
            },
            recv(ticker) -> at => {
                aggregator.tick(at.unwrap_or_else(|_| Instant::now()));
            }
        }
    }
}
