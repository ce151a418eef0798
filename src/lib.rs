//! Short command-name lookup for running processes.
//!
//! ```no_run
//! use nix::unistd::Pid;
//! use proc_name::{lookup_process_name, LookupError};
//!
//! match lookup_process_name(Pid::from_raw(1)) {
//!     Ok(name) => println!("pid 1 is {name}"),
//!     Err(LookupError::NotFound(pid)) => println!("{pid} is not running"),
//!     Err(e) => println!("{e}"),
//! }
//! ```

pub mod lookup;
pub mod process;

#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]
pub use lookup::{NativeQuery, lookup_process_name};
pub use lookup::{LookupError, ProcessInfoRecord, ProcessNameLookup, ProcessTableQuery};
pub use process::{Process, ProcessError, ProcessName};
