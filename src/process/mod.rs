use std::str::Utf8Error;

use nix::unistd::Pid;
use thiserror::Error;

use crate::lookup::{LookupError, ProcessNameLookup, ProcessTableQuery};

mod name;

pub use name::ProcessName;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("command name of pid {pid} is not valid UTF-8")]
    NonUtf8Name {
        pid: Pid,
        #[source]
        source: Utf8Error,
    },
}

/// A running process and its short command name, as seen at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
}

impl Process {
    /// Snapshot `pid` with the backend for this OS.
    #[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]
    pub fn new(pid: Pid) -> Result<Self, ProcessError> {
        let name = crate::lookup::lookup_process_name(pid)?;
        Self::from_name(pid, name)
    }

    /// Snapshot `pid` through an explicit lookup backend.
    pub fn with_lookup<Q: ProcessTableQuery>(
        lookup: &ProcessNameLookup<Q>,
        pid: Pid,
    ) -> Result<Self, ProcessError> {
        let name = lookup.lookup(pid)?;
        Self::from_name(pid, name)
    }

    fn from_name(pid: Pid, name: ProcessName) -> Result<Self, ProcessError> {
        let name = name
            .into_c_string()
            .into_string()
            .map_err(|e| ProcessError::NonUtf8Name {
                pid,
                source: e.utf8_error(),
            })?;
        Ok(Process { pid, name })
    }
}

#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]
impl TryFrom<Pid> for Process {
    type Error = ProcessError;

    fn try_from(pid: Pid) -> Result<Self, Self::Error> {
        Process::new(pid)
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::lookup::ProcessInfoRecord;

    struct OneEntry(&'static [u8]);

    impl ProcessInfoRecord for OneEntry {
        fn pid(&self) -> Pid {
            Pid::from_raw(9)
        }

        fn command_name(&self) -> &[u8] {
            self.0
        }
    }

    struct OneEntryTable(&'static [u8]);

    impl ProcessTableQuery for OneEntryTable {
        type Record = OneEntry;

        fn query(&self, pid: Pid) -> Result<Option<OneEntry>, LookupError> {
            Ok((pid == Pid::from_raw(9)).then(|| OneEntry(self.0)))
        }
    }

    #[test]
    fn snapshot_decodes_name() {
        let lookup = ProcessNameLookup::new(OneEntryTable(b"nginx"));

        let process = Process::with_lookup(&lookup, Pid::from_raw(9)).expect("pid 9 exists");

        assert_eq!(
            process,
            Process {
                pid: Pid::from_raw(9),
                name: "nginx".to_string(),
            }
        );
    }

    #[test]
    fn non_utf8_name_is_rejected() {
        let lookup = ProcessNameLookup::new(OneEntryTable(&[0xc3, 0x28]));

        let err = Process::with_lookup(&lookup, Pid::from_raw(9)).unwrap_err();

        assert!(matches!(err, ProcessError::NonUtf8Name { pid, .. } if pid == Pid::from_raw(9)));
    }

    #[test]
    fn lookup_errors_pass_through() {
        let lookup = ProcessNameLookup::new(OneEntryTable(b""));

        assert_eq!(
            Process::with_lookup(&lookup, Pid::from_raw(9)).unwrap_err(),
            ProcessError::Lookup(LookupError::EmptyName(Pid::from_raw(9)))
        );
        assert_eq!(
            Process::with_lookup(&lookup, Pid::from_raw(8)).unwrap_err(),
            ProcessError::Lookup(LookupError::NotFound(Pid::from_raw(8)))
        );
    }

    #[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]
    #[test]
    fn own_process_snapshot() {
        let me = Pid::this();

        let process = Process::try_from(me).expect("own pid is always present");

        assert_eq!(process.pid, me);
        assert!(!process.name.is_empty());
    }
}
