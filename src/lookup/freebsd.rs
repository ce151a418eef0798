use std::ptr::NonNull;
use std::slice;

use nix::errno::Errno;
use nix::unistd::Pid;
use tracing::debug;

use super::{LookupError, ProcessInfoRecord, ProcessTableQuery};

/// Fetches process-table entries with `kinfo_getproc(3)` from libutil.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinfoQuery;

/// A `struct kinfo_proc` allocated by `kinfo_getproc`, freed on drop.
#[derive(Debug)]
pub struct KinfoProc {
    ptr: NonNull<libc::kinfo_proc>,
}

impl KinfoProc {
    fn get(&self) -> &libc::kinfo_proc {
        // SAFETY: `ptr` came from a successful `kinfo_getproc` and stays valid
        // until `drop` frees it.
        unsafe { self.ptr.as_ref() }
    }
}

impl Drop for KinfoProc {
    fn drop(&mut self) {
        // SAFETY: `kinfo_getproc` allocates with malloc and hands ownership to us.
        unsafe { libc::free(self.ptr.as_ptr().cast()) }
    }
}

impl ProcessInfoRecord for KinfoProc {
    fn pid(&self) -> Pid {
        Pid::from_raw(self.get().ki_pid)
    }

    fn command_name(&self) -> &[u8] {
        let comm = &self.get().ki_comm;
        // SAFETY: c_char and u8 have the same size and layout.
        unsafe { slice::from_raw_parts(comm.as_ptr().cast::<u8>(), comm.len()) }
    }
}

impl ProcessTableQuery for KinfoQuery {
    type Record = KinfoProc;

    fn query(&self, pid: Pid) -> Result<Option<KinfoProc>, LookupError> {
        // Some NULL returns leave errno untouched, a stale value must not leak in.
        Errno::clear();
        // SAFETY: plain FFI call; a non-null result is a malloc'd kinfo_proc.
        let ptr = unsafe { libc::kinfo_getproc(pid.as_raw()) };

        match NonNull::new(ptr) {
            Some(ptr) => Ok(Some(KinfoProc { ptr })),
            None => {
                let errno = Errno::last();
                if errno == Errno::ENOMEM {
                    return Err(LookupError::AllocationFailure(pid));
                }
                debug!(%pid, %errno, "kinfo_getproc failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn stale_enomem_does_not_turn_into_allocation_failure() {
        let pid = Pid::from_raw(i32::MAX);
        // SAFETY: __error returns the calling thread's errno slot.
        unsafe { *libc::__error() = libc::ENOMEM };

        let record = KinfoQuery.query(pid);

        assert_eq!(record.map(|r| r.is_none()), Ok(true));
    }

    #[test]
    fn reads_own_entry() {
        let me = Pid::this();

        let record = KinfoQuery.query(me).expect("no allocation failure").expect("own pid exists");

        assert_eq!(record.pid(), me);
        assert!(!record.command_name().starts_with(&[0]));
    }
}
