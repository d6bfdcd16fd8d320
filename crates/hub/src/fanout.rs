//! Transporte de saída: espalha cada snapshot para os viewers via UDP.

use hub_core::broadcast::SnapshotSink;
use hub_core::config::HubConfig;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::{info, warn};

/// Fan-out UDP best-effort. Falha em um viewer não afeta os demais nem o hub.
pub struct UdpFanout {
    socket: UdpSocket,
    targets: Vec<SocketAddr>,
}

impl UdpFanout {
    /// Cria o socket de saída e resolve os viewers configurados.
    pub fn from_config(config: &HubConfig) -> std::io::Result<Self> {
        let bind_ip = if config.bind_ip.is_empty() {
            "0.0.0.0"
        } else {
            &config.bind_ip
        };
        let socket = UdpSocket::bind(format!("{bind_ip}:0"))?;

        let mut targets = resolve_viewers(&config.viewers);
        if config.broadcast {
            socket.set_broadcast(true)?;
            targets.push(SocketAddr::from((Ipv4Addr::BROADCAST, config.viewer_port)));
            info!("Modo BROADCAST ativado → porta {}", config.viewer_port);
        }

        Self::new(socket, targets)
    }

    pub fn new(socket: UdpSocket, targets: Vec<SocketAddr>) -> std::io::Result<Self> {
        // O envio nunca pode segurar o loop principal
        socket.set_nonblocking(true)?;
        Ok(Self { socket, targets })
    }

    pub fn targets(&self) -> &[SocketAddr] {
        &self.targets
    }
}

fn resolve_viewers(viewers: &[String]) -> Vec<SocketAddr> {
    let mut targets = Vec::new();
    for viewer in viewers {
        match viewer.to_socket_addrs() {
            Ok(addrs) => targets.extend(addrs.take(1)),
            Err(e) => warn!("Viewer inválido '{viewer}': {e}"),
        }
    }
    targets
}

impl SnapshotSink for UdpFanout {
    fn deliver(&mut self, frame: &str) {
        for target in &self.targets {
            if let Err(e) = self.socket.send_to(frame.as_bytes(), target) {
                warn!("Falha ao enviar snapshot para {target}: {e}");
            }
        }
    }
}
