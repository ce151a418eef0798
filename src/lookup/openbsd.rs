use std::io;
use std::mem;
use std::ptr;
use std::slice;

use libc::{c_int, c_uint, c_void};
use nix::unistd::Pid;
use tracing::debug;

use super::{LookupError, ProcessInfoRecord, ProcessTableQuery};

const KINFO_PROC_SIZE: usize = mem::size_of::<libc::kinfo_proc>();

/// Fetches process-table entries with the two-step `sysctl(2)` protocol.
///
/// The first call with a null buffer reports the size needed, the second
/// fills a buffer of exactly that size. Anything other than one whole
/// `kinfo_proc` coming back is treated as no such process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysctlQuery;

/// A copy of the `struct kinfo_proc` returned by `sysctl`.
#[derive(Clone, Copy)]
pub struct SysctlRecord {
    proc: libc::kinfo_proc,
}

impl ProcessInfoRecord for SysctlRecord {
    fn pid(&self) -> Pid {
        Pid::from_raw(self.proc.p_pid)
    }

    fn command_name(&self) -> &[u8] {
        let comm = &self.proc.p_comm;
        // SAFETY: c_char and u8 have the same size and layout.
        unsafe { slice::from_raw_parts(comm.as_ptr().cast::<u8>(), comm.len()) }
    }
}

impl ProcessTableQuery for SysctlQuery {
    type Record = SysctlRecord;

    fn query(&self, pid: Pid) -> Result<Option<SysctlRecord>, LookupError> {
        let mib: [c_int; 6] = [
            libc::CTL_KERN,
            libc::KERN_PROC,
            libc::KERN_PROC_PID,
            pid.as_raw(),
            KINFO_PROC_SIZE as c_int,
            1,
        ];

        let mut size: libc::size_t = 0;
        // SAFETY: null output buffer, so the kernel only writes `size`.
        let code = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as c_uint,
                ptr::null_mut(),
                &mut size,
                ptr::null_mut(),
                0,
            )
        };
        if code == -1 {
            debug!(%pid, error = %io::Error::last_os_error(), "sysctl size query failed");
            return Ok(None);
        }

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| LookupError::AllocationFailure(pid))?;

        // SAFETY: `buf` has room for `size` bytes and the kernel writes at most
        // that many, storing the written length back into `size`.
        let code = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as c_uint,
                buf.as_mut_ptr().cast::<c_void>(),
                &mut size,
                ptr::null_mut(),
                0,
            )
        };
        if code == -1 {
            debug!(%pid, error = %io::Error::last_os_error(), "sysctl fill query failed");
            return Ok(None);
        }
        if size != KINFO_PROC_SIZE {
            debug!(%pid, size, expected = KINFO_PROC_SIZE, "sysctl returned a short record");
            return Ok(None);
        }

        // SAFETY: the kernel filled exactly one kinfo_proc into `buf`; the
        // buffer is not aligned for it, hence the unaligned read.
        let proc = unsafe { ptr::read_unaligned(buf.as_ptr().cast::<libc::kinfo_proc>()) };

        Ok(Some(SysctlRecord { proc }))
    }
}
