use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, instrument, warn};

/// Sends one request over a fresh connection and reads until the gateway closes it.
///
/// The whole exchange (connect, write and read) must finish within `timeout`. The
/// socket is dropped when the exchange ends, whether it succeeded, failed or timed out.
#[instrument(skip(request), fields(request_bytes = request.len()))]
pub async fn send(address: &str, port: u16, request: &[u8], timeout: Duration) -> Result<String, ConnectionError> {
    debug!("📤 Sending request to {}:{}...", address, port);

    let bytes = time::timeout(timeout, exchange(address, port, request))
        .await
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::TimedOut, format!("no response within {:?}", timeout))))
        .map_err(|source| {
            let error = ConnectionError {
                address: address.to_string(),
                port,
                source,
            };
            if error.is_timeout() {
                warn!("⏳ No response from {}:{} within {:?}", address, port, timeout);
            } else {
                warn!("⚠️ Exchange with {}:{} failed: {}", address, port, error.source);
            }
            error
        })?;

    debug!("📥 Sending request to {}:{}... OK, {} bytes received", address, port, bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn exchange(address: &str, port: u16, request: &[u8]) -> io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect((address, port)).await?;
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(response)
}

#[derive(Error, Debug)]
#[error("unable to connect to {address}:{port}. {source}")]
pub struct ConnectionError {
    pub address: String,
    pub port: u16,
    #[source]
    pub source: io::Error,
}

impl ConnectionError {
    pub fn is_timeout(&self) -> bool {
        self.source.kind() == io::ErrorKind::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock_gateway::MockGateway;
    use pretty_assertions::assert_eq;
    use test_log::test;
    use tokio::net::TcpListener;

    #[test(tokio::test)]
    async fn sends_the_request_and_reads_until_the_gateway_closes() -> Result<(), ConnectionError> {
        let gateway = MockGateway::start(vec!["<DeviceInfo>\n</DeviceInfo>\n<NetworkInfo/>".to_string()]).await;

        let response = send("127.0.0.1", gateway.port(), b"<LocalCommand></LocalCommand>", Duration::from_secs(5)).await?;

        assert_eq!(response, "<DeviceInfo>\n</DeviceInfo>\n<NetworkInfo/>");
        assert_eq!(gateway.requests().await, vec!["<LocalCommand></LocalCommand>".to_string()]);
        Ok(())
    }

    #[test(tokio::test)]
    async fn replaces_invalid_utf8() -> Result<(), ConnectionError> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"<A>\xff</A>").await.unwrap();
        });

        let response = send("127.0.0.1", port, b"", Duration::from_secs(5)).await?;

        assert_eq!(response, "<A>\u{fffd}</A>");
        Ok(())
    }

    #[test(tokio::test)]
    async fn fails_with_the_address_when_the_connection_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = send("127.0.0.1", port, b"<LocalCommand/>", Duration::from_secs(5)).await;

        let error = result.unwrap_err();
        assert_eq!(error.address, "127.0.0.1");
        assert_eq!(error.port, port);
        assert!(!error.is_timeout());
        assert!(error.to_string().starts_with(&format!("unable to connect to 127.0.0.1:{}.", port)));
    }

    #[test(tokio::test)]
    async fn times_out_and_closes_the_socket_when_the_gateway_never_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain until the client goes away; never answer.
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.map(|_| received)
        });

        let result = send("127.0.0.1", port, b"<LocalCommand/>", Duration::from_millis(200)).await;

        let error = result.unwrap_err();
        assert!(error.is_timeout());
        assert_eq!(error.address, "127.0.0.1");
        assert_eq!(error.port, port);

        // The server only sees end-of-stream once the client dropped its socket.
        let received = time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"<LocalCommand/>".to_vec());
    }
}
