//! Host and process introspection for `/demo/info`.

use serde::{Deserialize, Serialize};
use sysinfo::{ProcessesToUpdate, System};

/// Identification of the runtime the service was built with.
pub const RUNTIME_VERSION: &str = concat!("rust-", env!("CARGO_PKG_RUST_VERSION"));

/// Snapshot of processor and memory figures, all memory values in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub available_processors: usize,
    /// Physical memory installed on the host.
    pub max_memory: u64,
    /// Resident memory of this process.
    pub total_memory: u64,
    /// Memory the host can still hand out.
    pub free_memory: u64,
}

impl SystemSnapshot {
    /// Take a fresh snapshot.
    pub fn capture() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let resident = match sysinfo::get_current_pid() {
            Ok(pid) => {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            Err(e) => {
                tracing::debug!("Cannot resolve own pid: {}", e);
                0
            }
        };

        Self {
            available_processors: available_processors(),
            max_memory: system.total_memory(),
            total_memory: resident,
            free_memory: system.available_memory(),
        }
    }
}

/// Processors available to this process, never less than one.
pub fn available_processors() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
