use std::path::{Path, PathBuf};

use nix::unistd::Pid;
use procfs::ProcError;
use procfs::process::Process as ProcfsProcess;
use tracing::debug;

use super::{LookupError, ProcessInfoRecord, ProcessTableQuery};

/// Reads process-table entries from `/proc/<pid>/stat`.
#[derive(Debug, Clone)]
pub struct ProcfsQuery {
    root: PathBuf,
}

impl ProcfsQuery {
    /// Query a procfs mounted somewhere other than `/proc`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ProcfsQuery { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for ProcfsQuery {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

/// Thread-group id and `comm` of one `/proc/<pid>`.
#[derive(Debug, Clone)]
pub struct ProcfsRecord {
    pid: Pid,
    comm: String,
}

impl ProcessInfoRecord for ProcfsRecord {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn command_name(&self) -> &[u8] {
        self.comm.as_bytes()
    }
}

impl ProcessTableQuery for ProcfsQuery {
    type Record = ProcfsRecord;

    fn query(&self, pid: Pid) -> Result<Option<ProcfsRecord>, LookupError> {
        let dir = self.root.join(pid.as_raw().to_string());

        // `/proc/<tid>` resolves for every thread too; the process-table
        // entry of a thread is its thread group, so the record carries Tgid.
        let read = ProcfsProcess::new_with_root(dir)
            .and_then(|p| Ok((p.stat()?, p.status()?)));

        let (stat, status) = match read {
            Ok(read) => read,
            //The process does not exist or vanished between open and read
            Err(ProcError::NotFound(_)) => return Ok(None),
            Err(e) => {
                debug!(%pid, error = %e, "could not read process stat, treating as not found");
                return Ok(None);
            }
        };

        Ok(Some(ProcfsRecord {
            pid: Pid::from_raw(status.tgid),
            comm: stat.comm,
        }))
    }
}
