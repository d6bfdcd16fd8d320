//! Thread de rede que escuta UDP e envia snapshots para o loop de exibição
//! via channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use hub_core::protocol::{MAX_UDP_PAYLOAD, decode_snapshot};
use hub_core::types::Snapshot;
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Mensagem enviada da thread de rede para o loop de exibição.
#[derive(Debug, Clone)]
pub struct ViewerMessage {
    pub snapshot: Snapshot,
    pub source_addr: String,
    pub raw_size: usize,
}

/// Inicia a thread de rede. Retorna o receiver do channel.
pub fn spawn_receiver_thread(port: u16) -> std::io::Result<Receiver<ViewerMessage>> {
    let (tx, rx) = bounded::<ViewerMessage>(64); // Buffer de 64 mensagens

    std::thread::Builder::new()
        .name("udp-receiver".into())
        .spawn(move || receiver_loop(&tx, port))?;

    Ok(rx)
}

fn receiver_loop(tx: &Sender<ViewerMessage>, port: u16) {
    loop {
        match UdpSocket::bind(format!("0.0.0.0:{port}")) {
            Ok(sock) => {
                info!("Viewer escutando em 0.0.0.0:{port}");
                serve(&sock, tx);
                return;
            }
            Err(e) => {
                error!("Falha ao bind porta {port}: {e}. Tentando novamente em 2s...");
                std::thread::sleep(Duration::from_secs(2));
            }
        }
    }
}

pub(crate) fn serve(sock: &UdpSocket, tx: &Sender<ViewerMessage>) {
    sock.set_read_timeout(Some(Duration::from_secs(1))).ok();

    let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
    loop {
        match sock.recv_from(&mut buf) {
            Ok((size, addr)) => {
                let source = addr.ip().to_string();
                match decode_snapshot(&buf[..size]) {
                    Ok(snapshot) => {
                        let msg = ViewerMessage {
                            snapshot,
                            source_addr: source,
                            raw_size: size,
                        };
                        // Non-blocking send: se a exibição está lenta, descarta
                        if let Err(e) = tx.try_send(msg) {
                            if e.is_disconnected() {
                                return;
                            }
                            debug!("Channel cheio, descartando snapshot");
                        }
                    }
                    Err(e) => {
                        debug!("Frame inválido de {source}: {e}");
                    }
                }
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                // Timeout normal, continua
            }
            Err(e) => {
                warn!("Erro ao receber UDP: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::types::SlotView;

    #[test]
    fn decodes_snapshot_frames_and_skips_garbage() {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = sock.local_addr().unwrap();
        let (tx, rx) = bounded(4);
        std::thread::spawn(move || serve(&sock, &tx));

        let hub = UdpSocket::bind("127.0.0.1:0").unwrap();
        hub.send_to(b"lixo", addr).unwrap();
        hub.send_to(br#"{"node1":{"isActive":false}}"#, addr).unwrap();

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.snapshot.get("node1"), Some(&SlotView::Inactive));
        assert_eq!(msg.source_addr, "127.0.0.1");
        assert_eq!(msg.raw_size, 28);
    }
}
