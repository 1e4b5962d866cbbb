use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use warden_protocol::{Request, Response};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("le daemon n'est pas en cours d'exécution")]
    DaemonNotRunning,
    #[error("timeout lors de la communication avec le daemon")]
    Timeout,
    #[error("erreur de connexion: {0}")]
    Connection(String),
    #[error("erreur de sérialisation: {0}")]
    Serialization(String),
    #[error("erreur d'entrée/sortie: {0}")]
    InputOutput(String),
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new() -> Self {
        Self {
            socket_path: default_socket_path(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let stream = self.connect().await?;
        self.send_request(stream, request).await
    }

    async fn connect(&self) -> Result<Stream, ClientError> {
        let connect_future = Stream::connect(
            self.socket_path
                .as_os_str()
                .to_fs_name::<GenericFilePath>()
                .map_err(|error| ClientError::Connection(error.to_string()))?,
        );

        match timeout(self.timeout, connect_future).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(_)) => Err(ClientError::DaemonNotRunning),
            Err(_) => Err(ClientError::Timeout),
        }
    }

    async fn send_request(
        &self,
        mut stream: Stream,
        request: Request,
    ) -> Result<Response, ClientError> {
        let request_bytes = bincode::serialize(&request)
            .map_err(|error| ClientError::Serialization(error.to_string()))?;

        let request_length = (request_bytes.len() as u32).to_le_bytes();

        let write_future = async {
            stream.write_all(&request_length).await?;
            stream.write_all(&request_bytes).await?;
            stream.flush().await?;
            Ok::<_, std::io::Error>(())
        };

        timeout(self.timeout, write_future)
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|error| ClientError::InputOutput(error.to_string()))?;

        let read_future = async {
            let mut length_buffer = [0u8; 4];
            stream.read_exact(&mut length_buffer).await?;
            let length = u32::from_le_bytes(length_buffer) as usize;

            let mut payload = vec![0u8; length];
            stream.read_exact(&mut payload).await?;
            Ok::<_, std::io::Error>(payload)
        };

        let response_bytes = timeout(self.timeout, read_future)
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|error| ClientError::InputOutput(error.to_string()))?;

        bincode::deserialize(&response_bytes)
            .map_err(|error| ClientError::Serialization(error.to_string()))
    }
}

impl Default for DaemonClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
pub fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/warden.sock", uid))
}

#[cfg(windows)]
pub fn default_socket_path() -> PathBuf {
    let local_app_data = std::env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(format!(r"{}\warden\warden.sock", local_app_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use interprocess::local_socket::{GenericFilePath, ListenerOptions};
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use warden_protocol::TimerPhase;

    fn test_socket_path(tag: &str) -> PathBuf {
        PathBuf::from(format!("/tmp/warden-test-{}-{}.sock", std::process::id(), tag))
    }

    fn cleanup_socket(path: &PathBuf) {
        let _ = fs::remove_file(path);
    }

    async fn serve_once(path: PathBuf, response: Response) {
        let listener = ListenerOptions::new()
            .name(path.as_os_str().to_fs_name::<GenericFilePath>().unwrap())
            .create_tokio()
            .unwrap();

        let mut stream = listener.accept().await.unwrap();

        let mut length_buffer = [0u8; 4];
        stream.read_exact(&mut length_buffer).await.unwrap();
        let length = u32::from_le_bytes(length_buffer) as usize;

        let mut payload = vec![0u8; length];
        stream.read_exact(&mut payload).await.unwrap();
        let _request: Request = bincode::deserialize(&payload).unwrap();

        let response_bytes = bincode::serialize(&response).unwrap();
        let response_length = (response_bytes.len() as u32).to_le_bytes();

        stream.write_all(&response_length).await.unwrap();
        stream.write_all(&response_bytes).await.unwrap();
        stream.flush().await.unwrap();
    }

    #[test]
    fn client_uses_default_timeout() {
        let client = DaemonClient::new();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn send_returns_error_when_daemon_not_running() {
        let mut client = DaemonClient::new();
        client.socket_path = PathBuf::from("/tmp/warden-nonexistent-socket-12345.sock");

        let result = client.send(Request::Ping).await;

        assert!(
            matches!(result, Err(ClientError::DaemonNotRunning)),
            "expected DaemonNotRunning, got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn send_ping_receives_pong() {
        let socket_path = test_socket_path("ping");
        cleanup_socket(&socket_path);

        let server_handle = tokio::spawn(serve_once(socket_path.clone(), Response::Pong));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut client = DaemonClient::new();
        client.socket_path = socket_path.clone();

        let result = client.send(Request::Ping).await;
        assert!(matches!(result, Ok(Response::Pong)));

        server_handle.await.unwrap();
        cleanup_socket(&socket_path);
    }

    #[tokio::test]
    async fn send_get_status_receives_timer_status() {
        let socket_path = test_socket_path("status");
        cleanup_socket(&socket_path);

        let response = Response::TimerStatus {
            phase: TimerPhase::Focus,
            current_seconds: 1500,
            total_seconds: 1500,
            break_seconds: 300,
        };
        let server_handle = tokio::spawn(serve_once(socket_path.clone(), response));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut client = DaemonClient::new();
        client.socket_path = socket_path.clone();

        match client.send(Request::GetStatus).await {
            Ok(Response::TimerStatus {
                phase,
                current_seconds,
                ..
            }) => {
                assert_eq!(phase, TimerPhase::Focus);
                assert_eq!(current_seconds, 1500);
            }
            other => panic!("expected TimerStatus, got {:?}", other),
        }

        server_handle.await.unwrap();
        cleanup_socket(&socket_path);
    }
}
