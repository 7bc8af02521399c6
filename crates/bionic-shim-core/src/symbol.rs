//! Catalogue of libc symbols the shim can stand in for.

use std::fmt;

/// Header family a replaced symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolFamily {
    /// Descriptor-range and vectored positional I/O (`<unistd.h>`, `<sys/uio.h>`).
    Io,
    /// `<stdlib.h>` system queries.
    Resource,
    /// `<unistd.h>` process execution.
    Process,
    /// `<pwd.h>` password database enumeration.
    Pwd,
    /// `<semaphore.h>` timed waits.
    Semaphore,
}

impl SymbolFamily {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Resource => "resource",
            Self::Process => "process",
            Self::Pwd => "pwd",
            Self::Semaphore => "semaphore",
        }
    }
}

/// A libc symbol that the shim may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShimSymbol {
    CloseRange,
    CopyFileRange,
    Preadv2,
    Pwritev2,
    Getloadavg,
    Fexecve,
    Setpwent,
    Endpwent,
    Getpwent,
    SemClockwait,
}

impl ShimSymbol {
    /// Every replaceable symbol, in catalogue order.
    pub const ALL: [ShimSymbol; 10] = [
        Self::CloseRange,
        Self::CopyFileRange,
        Self::Preadv2,
        Self::Pwritev2,
        Self::Getloadavg,
        Self::Fexecve,
        Self::Setpwent,
        Self::Endpwent,
        Self::Getpwent,
        Self::SemClockwait,
    ];

    /// The exact C symbol name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CloseRange => "close_range",
            Self::CopyFileRange => "copy_file_range",
            Self::Preadv2 => "preadv2",
            Self::Pwritev2 => "pwritev2",
            Self::Getloadavg => "getloadavg",
            Self::Fexecve => "fexecve",
            Self::Setpwent => "setpwent",
            Self::Endpwent => "endpwent",
            Self::Getpwent => "getpwent",
            Self::SemClockwait => "sem_clockwait",
        }
    }

    #[must_use]
    pub const fn family(self) -> SymbolFamily {
        match self {
            Self::CloseRange | Self::CopyFileRange | Self::Preadv2 | Self::Pwritev2 => {
                SymbolFamily::Io
            }
            Self::Getloadavg => SymbolFamily::Resource,
            Self::Fexecve => SymbolFamily::Process,
            Self::Setpwent | Self::Endpwent | Self::Getpwent => SymbolFamily::Pwd,
            Self::SemClockwait => SymbolFamily::Semaphore,
        }
    }

    /// C prototype as declared by glibc, for reports and diagnostics.
    #[must_use]
    pub const fn prototype(self) -> &'static str {
        match self {
            Self::CloseRange => "int close_range(unsigned int first, unsigned int last, int flags)",
            Self::CopyFileRange => {
                "ssize_t copy_file_range(int fd_in, off64_t *off_in, int fd_out, off64_t *off_out, size_t len, unsigned int flags)"
            }
            Self::Preadv2 => {
                "ssize_t preadv2(int fd, const struct iovec *iov, int iovcnt, off_t offset, int flags)"
            }
            Self::Pwritev2 => {
                "ssize_t pwritev2(int fd, const struct iovec *iov, int iovcnt, off_t offset, int flags)"
            }
            Self::Getloadavg => "int getloadavg(double loadavg[], int nelem)",
            Self::Fexecve => "int fexecve(int fd, char *const argv[], char *const envp[])",
            Self::Setpwent => "void setpwent(void)",
            Self::Endpwent => "void endpwent(void)",
            Self::Getpwent => "struct passwd *getpwent(void)",
            Self::SemClockwait => {
                "int sem_clockwait(sem_t *sem, clockid_t clockid, const struct timespec *abstime)"
            }
        }
    }

    /// Look a symbol up by its C name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ShimSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_round_trip() {
        for sym in ShimSymbol::ALL {
            assert_eq!(ShimSymbol::from_name(sym.name()), Some(sym));
        }
        let mut names: Vec<_> = ShimSymbol::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ShimSymbol::ALL.len());
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(ShimSymbol::from_name("close"), None);
        assert_eq!(ShimSymbol::from_name(""), None);
    }

    #[test]
    fn prototypes_mention_symbol_name() {
        for sym in ShimSymbol::ALL {
            assert!(
                sym.prototype().contains(sym.name()),
                "prototype for {sym} does not name it"
            );
        }
    }

    #[test]
    fn password_group_is_pwd_family() {
        assert_eq!(ShimSymbol::Setpwent.family(), SymbolFamily::Pwd);
        assert_eq!(ShimSymbol::Endpwent.family(), SymbolFamily::Pwd);
        assert_eq!(ShimSymbol::Getpwent.family(), SymbolFamily::Pwd);
        assert_eq!(ShimSymbol::SemClockwait.family(), SymbolFamily::Semaphore);
    }
}
