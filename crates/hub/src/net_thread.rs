//! Thread de rede que escuta UDP e envia os payloads dos nós para o loop
//! principal via channel.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use hub_core::protocol::MAX_UDP_PAYLOAD;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Datagrama recebido de um nó, ainda não decodificado.
#[derive(Debug, Clone)]
pub struct InboundDatagram {
    pub payload: Vec<u8>,
    pub source_addr: SocketAddr,
}

/// Inicia a thread de rede. Retorna o receiver do channel.
pub fn spawn_listener_thread(bind_addr: String) -> std::io::Result<Receiver<InboundDatagram>> {
    let (tx, rx) = bounded::<InboundDatagram>(256);

    std::thread::Builder::new()
        .name("udp-listener".into())
        .spawn(move || listener_loop(&tx, &bind_addr))?;

    Ok(rx)
}

fn listener_loop(tx: &Sender<InboundDatagram>, bind_addr: &str) {
    loop {
        match UdpSocket::bind(bind_addr) {
            Ok(sock) => {
                info!("Hub escutando nós em {bind_addr}");
                serve(&sock, tx);
                // serve só retorna quando o loop principal encerrou
                return;
            }
            Err(e) => {
                error!("Falha ao bind {bind_addr}: {e}. Tentando novamente em 2s...");
                std::thread::sleep(Duration::from_secs(2));
            }
        }
    }
}

/// Recebe datagramas até o receiver do channel ser descartado.
///
/// O descarte só é percebido no próximo datagrama recebido.
pub(crate) fn serve(sock: &UdpSocket, tx: &Sender<InboundDatagram>) {
    sock.set_read_timeout(Some(Duration::from_secs(1))).ok();

    let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
    loop {
        match sock.recv_from(&mut buf) {
            Ok((size, addr)) => {
                let datagram = InboundDatagram {
                    payload: buf[..size].to_vec(),
                    source_addr: addr,
                };
                match tx.try_send(datagram) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!("Channel cheio, descartando datagrama de {addr}");
                    }
                    Err(TrySendError::Disconnected(_)) => return,
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

    #[test]
    fn forwards_datagrams_to_channel() {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = sock.local_addr().unwrap();
        let (tx, rx) = bounded(4);
        let handle = std::thread::spawn(move || serve(&sock, &tx));

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.send_to(br#"{"nodeId":"n1"}"#, addr).unwrap();

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.payload, br#"{"nodeId":"n1"}"#);
        assert_eq!(msg.source_addr, client.local_addr().unwrap());

        // Com o receiver descartado o próximo datagrama encerra a thread
        drop(rx);
        client.send_to(b"{}", addr).unwrap();
        handle.join().unwrap();
    }
}
