use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const END_OF_REQUEST: &str = "</LocalCommand>";

/// Serves canned responses, one per connection, and records what it was sent.
pub struct MockGateway {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockGateway {
    pub async fn start(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buffer = [0u8; 1024];
                loop {
                    match socket.read(&mut buffer).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buffer[..n]);
                            if String::from_utf8_lossy(&request).contains(END_OF_REQUEST) {
                                break;
                            }
                        }
                    }
                }
                recorded.lock().await.push(String::from_utf8_lossy(&request).into_owned());

                let _ = socket.write_all(response.as_bytes()).await;
                // Closing the socket ends the response.
            }
        });

        MockGateway { port, requests, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
