use ferrous_doh_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{error, info};

const RECV_BUF_LEN: usize = 4096;

pub async fn start_dns_server(bind_addr: String, handler: DnsServerHandler) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let socket = Arc::new(create_udp_socket(socket_addr)?);

    info!(bind_address = %socket.local_addr()?, "DNS server listening on UDP");

    run_udp_worker(socket, handler).await;
    Ok(())
}

/// Receives datagrams forever, one task per datagram. Only the task that
/// owns a query ever writes its response.
pub async fn run_udp_worker(socket: Arc<UdpSocket>, handler: DnsServerHandler) {
    let mut recv_buf = [0u8; RECV_BUF_LEN];

    loop {
        let (n, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // ICMP port-unreachable from an earlier reply surfaces here on some platforms.
                error!(error = %e, "UDP recv error");
                continue;
            }
        };

        let owned_buf: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        let handler = handler.clone();
        let socket = socket.clone();

        tokio::spawn(async move {
            let Some(response) = handler.handle_datagram(&owned_buf, from).await else {
                return;
            };
            if let Err(e) = socket.send_to(&response, from).await {
                error!(client = %from, error = %e, "Failed to send response");
            }
        });
    }
}

pub fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}
