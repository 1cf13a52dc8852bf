//! Service runtime: hyper HTTP/1 server on tokio.

mod server;

pub use server::{shutdown_signal, DemoServer};
