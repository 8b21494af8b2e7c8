//! Printer adapters for sending ESC/POS data
//!
//! Network printers only (raw TCP, usually port 9100).

use crate::error::{PrintError, PrintResult};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

/// Default budget for one delivery (connect + write)
pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default budget for a liveness probe (connect only)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
    probe_timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer from an IP literal and port
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}:{}", host, port)))?;

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            timeout: DEFAULT_PRINT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }


    /// Set delivery timeout (covers connect and write)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set liveness probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        debug!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;
        stream.flush().await?;
        stream.shutdown().await?;
        Ok(())
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        tokio::time::timeout(self.timeout, self.send(data))
            .await
            .map_err(|_| {
                PrintError::Timeout(format!("{} after {}ms", self.addr, self.timeout.as_millis()))
            })??;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.probe_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => {
                debug!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new("192.168.1.100", 9100).unwrap();
        assert_eq!(printer.addr.to_string(), "192.168.1.100:9100");
        assert_eq!(printer.timeout, DEFAULT_PRINT_TIMEOUT);

        let printer = NetworkPrinter::new(" 10.0.0.1 ", 9101).unwrap();
        assert_eq!(printer.addr.port(), 9101);
    }

    #[test]
    fn test_invalid_address() {
        assert!(NetworkPrinter::new("invalid", 9100).is_err());
        assert!(NetworkPrinter::new("300.1.1.1", 9100).is_err());
    }

    #[tokio::test]
    async fn test_print_writes_all_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let printer = NetworkPrinter::new("127.0.0.1", addr.port()).unwrap();
        printer.print(&[0x1B, 0x40, b'h', b'i']).await.unwrap();

        assert_eq!(reader.await.unwrap(), vec![0x1B, 0x40, b'h', b'i']);
    }

    #[tokio::test]
    async fn test_print_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let printer = NetworkPrinter::new("127.0.0.1", addr.port())
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = printer.print(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::Connection(_)));
        assert!(!printer.is_online().await);
    }

    #[tokio::test]
    async fn test_is_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let printer = NetworkPrinter::new("127.0.0.1", addr.port()).unwrap();
        assert!(printer.is_online().await);
    }
}
