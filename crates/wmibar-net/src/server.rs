//! Unix socket server for the control namespace.
//!
//! Every connection gets its own I/O thread. Connection threads never touch
//! bar state: each parsed request is handed to a [`RequestSink`] together
//! with a reply channel, and the thread blocks until the owner of the bar
//! answers.

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use wmibar_types::error::{BarError, Result};

use crate::protocol::{MAX_LINE_LEN, Request, Response};

/// A request waiting for its reply.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request,
    pub reply: mpsc::Sender<Response>,
}

/// Delivers requests to whoever owns the bar.
pub trait RequestSink: Send + Sync {
    /// Queue `exchange`. Fails once the owner has gone away.
    fn submit(&self, exchange: Exchange) -> Result<()>;
}

impl RequestSink for mpsc::Sender<Exchange> {
    fn submit(&self, exchange: Exchange) -> Result<()> {
        self.send(exchange)
            .map_err(|_| BarError::Protocol("bar is shutting down".to_string()))
    }
}

/// Bound control socket, not yet accepting.
pub struct SocketServer {
    path: PathBuf,
    listener: UnixListener,
}

impl SocketServer {
    /// Bind `path`. A leftover socket file nobody listens on is removed
    /// first; a live socket or any other kind of file is an error.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Ok(meta) = std::fs::symlink_metadata(path) {
            if !meta.file_type().is_socket() {
                return Err(BarError::Protocol(format!(
                    "{} exists and is not a socket",
                    path.display()
                )));
            }
            if UnixStream::connect(path).is_ok() {
                return Err(BarError::Protocol(format!(
                    "{} is already served by another process",
                    path.display()
                )));
            }
            log::info!("removing stale socket {}", path.display());
            std::fs::remove_file(path)?;
        }
        let listener = UnixListener::bind(path)?;
        log::info!("listening on {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start the accept thread.
    pub fn spawn(self, sink: Arc<dyn RequestSink>) -> Result<ServerHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let listener = self.listener;
        let thread = std::thread::Builder::new()
            .name("wmibar-accept".to_string())
            .spawn(move || accept_loop(&listener, &sink, &thread_stop))?;
        Ok(ServerHandle {
            path: self.path,
            stop,
            thread: Some(thread),
        })
    }
}

fn accept_loop(listener: &UnixListener, sink: &Arc<dyn RequestSink>, stop: &AtomicBool) {
    for stream in listener.incoming() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        match stream {
            Ok(stream) => {
                let sink = Arc::clone(sink);
                let spawned = std::thread::Builder::new()
                    .name("wmibar-conn".to_string())
                    .spawn(move || {
                        let reader = match stream.try_clone() {
                            Ok(s) => BufReader::new(s),
                            Err(e) => {
                                log::warn!("failed to clone connection: {e}");
                                return;
                            },
                        };
                        serve(reader, stream, sink.as_ref());
                    });
                if let Err(e) = spawned {
                    log::warn!("failed to start connection thread: {e}");
                }
            },
            Err(e) => log::warn!("accept error: {e}"),
        }
    }
    log::debug!("accept loop finished");
}

/// Serve one connection until EOF or a write failure.
pub fn serve(mut reader: impl BufRead, mut writer: impl Write, sink: &dyn RequestSink) {
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader
            .by_ref()
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', &mut line)
        {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => {
                log::debug!("connection read error: {e}");
                break;
            },
        }

        let response = if line.len() > MAX_LINE_LEN && line.last() != Some(&b'\n') {
            // Skip the rest of the overlong line.
            let mut rest = Vec::new();
            if reader.read_until(b'\n', &mut rest).is_err() {
                break;
            }
            Response::Error("line too long".to_string())
        } else {
            let text = String::from_utf8_lossy(&line);
            if text.trim().is_empty() {
                continue;
            }
            match Request::parse(&text) {
                Ok(request) => {
                    log::debug!("request: {request:?}");
                    match forward(sink, request) {
                        Some(response) => response,
                        None => Response::Error("bar is shutting down".to_string()),
                    }
                },
                Err(e) => Response::Error(e.to_string()),
            }
        };

        if writeln!(writer, "{}", response.encode())
            .and_then(|()| writer.flush())
            .is_err()
        {
            break;
        }
    }
}

fn forward(sink: &dyn RequestSink, request: Request) -> Option<Response> {
    let (reply, rx) = mpsc::channel();
    sink.submit(Exchange { request, reply }).ok()?;
    rx.recv().ok()
}

/// Running server. Removes its socket file when shut down or dropped.
pub struct ServerHandle {
    path: PathBuf,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop accepting and remove the socket file. Open connections keep
    /// their threads until the client hangs up or the process exits.
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        // Wake the blocking accept.
        if let Err(e) = UnixStream::connect(&self.path) {
            log::debug!("failed to wake accept loop: {e}");
        }
        if thread.join().is_err() {
            log::warn!("accept thread panicked");
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::debug!("failed to remove {}: {e}", self.path.display());
        }
        log::info!("closed {}", self.path.display());
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
