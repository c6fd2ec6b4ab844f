//! Blocking client for the control socket.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use wmibar_types::error::{BarError, Result};

use crate::protocol::{Request, Response};

/// A connection to a running bar.
pub struct Client {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl Client {
    /// Connect to the socket at `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let writer = UnixStream::connect(path.as_ref())?;
        let reader = BufReader::new(writer.try_clone()?);
        Ok(Self { reader, writer })
    }

    /// Send one request and wait for its response.
    pub fn request(&mut self, request: &Request) -> Result<Response> {
        writeln!(self.writer, "{}", request.encode())?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(BarError::Protocol("connection closed by bar".to_string()));
        }
        Response::parse(&line)
    }

    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        self.request(&Request::Read(path.to_string()))?.into_result()
    }

    pub fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.request(&Request::Write(path.to_string(), data.to_vec()))?
            .into_result()
            .map(|_| ())
    }

    pub fn create(&mut self, path: &str) -> Result<()> {
        self.request(&Request::Create(path.to_string()))?
            .into_result()
            .map(|_| ())
    }

    pub fn remove(&mut self, path: &str) -> Result<()> {
        self.request(&Request::Remove(path.to_string()))?
            .into_result()
            .map(|_| ())
    }

    pub fn list(&mut self, path: &str) -> Result<Vec<String>> {
        let payload = self.request(&Request::List(path.to_string()))?.into_result()?;
        Ok(String::from_utf8_lossy(&payload)
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}
