//! Process-table lookup of short command names.
//!
//! The entry point is `lookup_process_name`, which asks the kernel of the
//! target OS for the process-table entry of a pid and copies its command name
//! out. The OS-specific part lives behind [`ProcessTableQuery`]; exactly one
//! implementation is compiled in as `NativeQuery`:
//!
//! - FreeBSD: `KinfoQuery`, a wrapper around `kinfo_getproc(3)`
//! - OpenBSD: `SysctlQuery`, the two-step `sysctl(2)` protocol
//! - Linux: `ProcfsQuery`, `/proc/<pid>/stat` and the thread-group id

use nix::unistd::Pid;
use thiserror::Error;
use tracing::trace;

use crate::process::ProcessName;

#[cfg(target_os = "freebsd")]
mod freebsd;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "openbsd")]
mod openbsd;

#[cfg(target_os = "freebsd")]
pub use freebsd::{KinfoProc, KinfoQuery};
#[cfg(target_os = "linux")]
pub use linux::{ProcfsQuery, ProcfsRecord};
#[cfg(target_os = "openbsd")]
pub use openbsd::{SysctlQuery, SysctlRecord};

/// Backend compiled in for the target OS.
#[cfg(target_os = "freebsd")]
pub type NativeQuery = KinfoQuery;
#[cfg(target_os = "openbsd")]
pub type NativeQuery = SysctlQuery;
#[cfg(target_os = "linux")]
pub type NativeQuery = ProcfsQuery;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("no process-table entry for pid {0}")]
    NotFound(Pid),

    #[error("process {0} has an empty command name")]
    EmptyName(Pid),

    #[error("failed to allocate memory while looking up pid {0}")]
    AllocationFailure(Pid),
}

impl LookupError {
    pub fn pid(&self) -> Pid {
        match *self {
            LookupError::NotFound(pid)
            | LookupError::EmptyName(pid)
            | LookupError::AllocationFailure(pid) => pid,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }

    pub fn is_empty_name(&self) -> bool {
        matches!(self, LookupError::EmptyName(_))
    }
}

/// One process-table entry, owned by the lookup for the duration of a call.
///
/// Whatever the record holds is released when it is dropped.
pub trait ProcessInfoRecord {
    /// Pid embedded in the entry itself.
    fn pid(&self) -> Pid;

    /// Raw command-name field. May be NUL-padded like a C array; everything
    /// from the first NUL on is ignored.
    fn command_name(&self) -> &[u8];
}

/// Source of process-table entries.
pub trait ProcessTableQuery {
    type Record: ProcessInfoRecord;

    /// Fetch the entry for `pid`.
    ///
    /// Every flavor of "no such process" (missing entry, short read, failed
    /// syscall) is `Ok(None)`. `Err` is reserved for allocation failure.
    fn query(&self, pid: Pid) -> Result<Option<Self::Record>, LookupError>;
}

/// Looks up command names through a [`ProcessTableQuery`] backend.
#[derive(Debug, Clone, Default)]
pub struct ProcessNameLookup<Q> {
    query: Q,
}

impl<Q: ProcessTableQuery> ProcessNameLookup<Q> {
    pub fn new(query: Q) -> Self {
        ProcessNameLookup { query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Look up the short command name of `pid`.
    ///
    /// The record returned by the backend must carry `pid` itself; an entry
    /// for some other process counts as not found.
    pub fn lookup(&self, pid: Pid) -> Result<ProcessName, LookupError> {
        let result = self.lookup_inner(pid);
        match &result {
            Ok(name) => trace!(%pid, %name, "process name found"),
            Err(e) => trace!(%pid, error = %e, "process name lookup failed"),
        }
        result
    }

    /// Look up the command name of the calling process.
    pub fn lookup_self(&self) -> Result<ProcessName, LookupError> {
        self.lookup(Pid::this())
    }

    fn lookup_inner(&self, pid: Pid) -> Result<ProcessName, LookupError> {
        let record = self.query.query(pid)?.ok_or(LookupError::NotFound(pid))?;

        if record.pid() != pid {
            trace!(%pid, record_pid = %record.pid(), "process-table entry belongs to another pid");
            return Err(LookupError::NotFound(pid));
        }

        let name = until_nul(record.command_name());
        if name.is_empty() {
            return Err(LookupError::EmptyName(pid));
        }

        ProcessName::try_copy(name).map_err(|_| LookupError::AllocationFailure(pid))
    }
}

/// Look up the short command name of `pid` with the backend for this OS.
#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]
pub fn lookup_process_name(pid: Pid) -> Result<ProcessName, LookupError> {
    ProcessNameLookup::new(NativeQuery::default()).lookup(pid)
}

fn until_nul(field: &[u8]) -> &[u8] {
    match field.iter().position(|&b| b == 0) {
        Some(end) => &field[..end],
        None => field,
    }
}
