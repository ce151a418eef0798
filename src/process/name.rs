use std::collections::TryReserveError;
use std::ffi::{CStr, CString};
use std::fmt;
use std::str::Utf8Error;

/// Short command name of a process, copied out of the kernel's process table.
///
/// The name owns its own NUL-terminated buffer; it never borrows from the
/// record it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessName(CString);

impl ProcessName {
    /// Copy `name` into a fresh buffer of exactly `name.len() + 1` bytes.
    ///
    /// `name` must not contain a NUL byte; the lookup truncates the raw field
    /// at its first NUL before calling this.
    pub(crate) fn try_copy(name: &[u8]) -> Result<Self, TryReserveError> {
        debug_assert!(!name.contains(&0));

        let mut buf = Vec::new();
        buf.try_reserve_exact(name.len() + 1)?;
        buf.extend_from_slice(name);
        buf.push(0);

        // SAFETY: `name` holds no NUL and exactly one terminator was appended.
        Ok(Self(unsafe { CString::from_vec_with_nul_unchecked(buf) }))
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }

    /// Name bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.as_bytes().len()
    }

    /// Always false for names handed out by a lookup.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        self.0.to_str()
    }

    pub fn to_string_lossy(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    pub fn into_c_string(self) -> CString {
        self.0
    }
}

impl AsRef<CStr> for ProcessName {
    fn as_ref(&self) -> &CStr {
        &self.0
    }
}

impl From<ProcessName> for CString {
    fn from(name: ProcessName) -> Self {
        name.0
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn copy_appends_single_terminator() {
        let name = ProcessName::try_copy(b"sshd").expect("copy should succeed");

        assert_eq!(name.as_bytes(), b"sshd");
        assert_eq!(name.as_c_str().to_bytes_with_nul(), b"sshd\0");
        assert_eq!(name.len(), 4);
        assert!(!name.is_empty());
    }

    #[test]
    fn copy_does_not_alias_source() {
        let source = b"init".to_vec();
        let name = ProcessName::try_copy(&source).expect("copy should succeed");

        assert_ne!(name.as_c_str().as_ptr().cast::<u8>(), source.as_ptr());
        assert_eq!(name.as_bytes(), source.as_slice());
    }

    #[test]
    fn non_utf8_names_display_lossily() {
        let name = ProcessName::try_copy(&[b'a', 0xff, b'b']).expect("copy should succeed");

        assert!(name.to_str().is_err());
        assert_eq!(name.to_string(), "a\u{fffd}b");
        assert_eq!(name.to_string_lossy(), "a\u{fffd}b");
    }
}
