//! Control socket for wmibar.
//!
//! Scripts drive the bar by reading and writing namespace files over a
//! Unix domain socket. [`server`] runs the socket and hands requests to the
//! thread that owns the bar; [`client`] is the other end.

pub mod client;
pub mod protocol;
pub mod server;

use wmibar_core::Bar;
use wmibar_core::backend::BarBackend;
use wmibar_core::spawn::Spawner;
use wmibar_types::error::Result;

pub use client::Client;
pub use protocol::{NamespaceService, Request, Response};
pub use server::{Exchange, RequestSink, ServerHandle, SocketServer};

impl<B: BarBackend, S: Spawner> NamespaceService for Bar<B, S> {
    fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        Bar::read(self, path)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        Bar::write(self, path, data)
    }

    fn create(&mut self, path: &str) -> Result<()> {
        Bar::create(self, path)
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        Bar::remove(self, path)
    }

    fn list(&self, path: &str) -> Result<Vec<String>> {
        Bar::list(self, path)
    }
}
