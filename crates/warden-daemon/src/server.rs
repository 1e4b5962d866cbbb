use crate::actors::{BlockerHandle, TimerHandle};
use anyhow::{Context, Result};
use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath, ListenerOptions,
};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, instrument};
use warden_protocol::{Request, Response};

pub struct Server {
    socket_path: PathBuf,
    timer_handle: TimerHandle,
    blocker_handle: BlockerHandle,
}

impl Server {
    pub fn new(timer_handle: TimerHandle, blocker_handle: BlockerHandle) -> Result<Self> {
        let uid = unsafe { libc::getuid() };
        let socket_path = PathBuf::from(format!("/run/user/{}/warden.sock", uid));
        Ok(Self {
            socket_path,
            timer_handle,
            blocker_handle,
        })
    }

    fn cleanup_stale_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .context("impossible de supprimer l'ancien socket")?;
            debug!("removed stale socket file");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        self.cleanup_stale_socket()?;

        let listener = ListenerOptions::new()
            .name(self.socket_path.as_os_str().to_fs_name::<GenericFilePath>()?)
            .create_tokio()?;

        info!(path = %self.socket_path.display(), "server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            let timer_handle = self.timer_handle.clone();
                            let blocker_handle = self.blocker_handle.clone();
                            tokio::spawn(async move {
                                if let Err(error) =
                                    handle_connection(stream, timer_handle, blocker_handle).await
                                {
                                    error!(%error, "connection handler failed");
                                }
                            });
                        }
                        Err(error) => {
                            error!(%error, "failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if let Err(error) = std::fs::remove_file(&self.socket_path) {
            debug!(%error, "socket file already removed");
        } else {
            debug!("socket file cleaned up");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup_socket();
    }
}

async fn handle_connection(
    mut stream: Stream,
    timer_handle: TimerHandle,
    blocker_handle: BlockerHandle,
) -> Result<()> {
    debug!("new connection accepted");

    let mut length_buffer = [0u8; 4];
    stream.read_exact(&mut length_buffer).await?;
    let length = u32::from_le_bytes(length_buffer) as usize;

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await?;

    let request: Request =
        bincode::deserialize(&payload).context("failed to deserialize request")?;

    debug!(?request, "received request");

    let response = handle_request(request, &timer_handle, &blocker_handle).await;

    debug!(?response, "sending response");

    let response_bytes = bincode::serialize(&response)?;
    let response_length = (response_bytes.len() as u32).to_le_bytes();

    stream.write_all(&response_length).await?;
    stream.write_all(&response_bytes).await?;
    stream.flush().await?;

    Ok(())
}

async fn handle_request(
    request: Request,
    timer_handle: &TimerHandle,
    blocker_handle: &BlockerHandle,
) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::GetStatus => match timer_handle.get_status().await {
            Some(status) => Response::TimerStatus {
                phase: status.phase,
                current_seconds: status.current_seconds,
                total_seconds: status.total_seconds,
                break_seconds: status.break_seconds,
            },
            None => Response::Error {
                message: "impossible de récupérer le statut".to_string(),
            },
        },

        Request::GetBlocking => match blocker_handle.snapshot().await {
            Some(snapshot) => Response::Blocking {
                active: snapshot.active,
                sites: snapshot.sites,
            },
            None => Response::Error {
                message: "impossible de récupérer l'état du blocage".to_string(),
            },
        },

        Request::StartTimer {
            focus_seconds,
            break_seconds,
        } => match timer_handle.start(focus_seconds, break_seconds).await {
            Some(Ok(())) => Response::Ok,
            Some(Err(error)) => Response::Error {
                message: error.to_string(),
            },
            None => Response::Error {
                message: "le minuteur ne répond pas".to_string(),
            },
        },

        Request::PauseTimer => match timer_handle.pause().await {
            Some(Ok(())) => Response::Ok,
            Some(Err(error)) => Response::Error {
                message: error.to_string(),
            },
            None => Response::Error {
                message: "le minuteur ne répond pas".to_string(),
            },
        },

        Request::ResumeTimer => match timer_handle.resume().await {
            Some(Ok(())) => Response::Ok,
            Some(Err(error)) => Response::Error {
                message: error.to_string(),
            },
            None => Response::Error {
                message: "le minuteur ne répond pas".to_string(),
            },
        },

        // all three reach idle unconditionally
        Request::StopTimer | Request::CancelTimer | Request::ResetTimer => {
            match timer_handle.reset().await {
                Some(()) => Response::Ok,
                None => Response::Error {
                    message: "le minuteur ne répond pas".to_string(),
                },
            }
        }

        Request::RefreshSettings => match timer_handle.refresh_settings().await {
            Some(()) => Response::Ok,
            None => Response::Error {
                message: "le minuteur ne répond pas".to_string(),
            },
        },

        Request::AddBlockingRule { domain } => match blocker_handle.add_site(domain).await {
            Ok(()) => Response::Ok,
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },

        Request::RemoveBlockingRule { domain } => {
            match blocker_handle.remove_site(domain).await {
                Ok(()) => Response::Ok,
                Err(error) => Response::Error {
                    message: error.to_string(),
                },
            }
        }

        Request::ActivateFocusMode => match blocker_handle.activate().await {
            Ok(()) => Response::Ok,
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },

        Request::DeactivateFocusMode => match blocker_handle.deactivate().await {
            Ok(()) => Response::Ok,
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },
    }
}
