//! Known standard-library module sets, keyed by target Python version.
//!
//! Classification consults these sets by top-level module component only.
//! The tables are built lazily once per process and shared read-only.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::config::PythonVersion;

/// Top-level modules present in every supported version's baseline.
///
/// Version-specific additions and removals are applied on top of this list.
const BASE: &[&str] = &[
    "__main__",
    "_thread",
    "abc",
    "aifc",
    "argparse",
    "array",
    "ast",
    "asynchat",
    "asyncio",
    "asyncore",
    "atexit",
    "audioop",
    "base64",
    "bdb",
    "binascii",
    "bisect",
    "builtins",
    "bz2",
    "cProfile",
    "calendar",
    "cgi",
    "cgitb",
    "chunk",
    "cmath",
    "cmd",
    "code",
    "codecs",
    "codeop",
    "collections",
    "colorsys",
    "compileall",
    "concurrent",
    "configparser",
    "contextlib",
    "contextvars",
    "copy",
    "copyreg",
    "crypt",
    "csv",
    "ctypes",
    "curses",
    "dataclasses",
    "datetime",
    "dbm",
    "decimal",
    "difflib",
    "dis",
    "distutils",
    "doctest",
    "email",
    "encodings",
    "ensurepip",
    "enum",
    "errno",
    "faulthandler",
    "fcntl",
    "filecmp",
    "fileinput",
    "fnmatch",
    "fractions",
    "ftplib",
    "functools",
    "gc",
    "getopt",
    "getpass",
    "gettext",
    "glob",
    "grp",
    "gzip",
    "hashlib",
    "heapq",
    "hmac",
    "html",
    "http",
    "idlelib",
    "imaplib",
    "imghdr",
    "imp",
    "importlib",
    "inspect",
    "io",
    "ipaddress",
    "itertools",
    "json",
    "keyword",
    "lib2to3",
    "linecache",
    "locale",
    "logging",
    "lzma",
    "mailbox",
    "mailcap",
    "marshal",
    "math",
    "mimetypes",
    "mmap",
    "modulefinder",
    "msilib",
    "msvcrt",
    "multiprocessing",
    "netrc",
    "nis",
    "nntplib",
    "ntpath",
    "numbers",
    "operator",
    "optparse",
    "os",
    "ossaudiodev",
    "pathlib",
    "pdb",
    "pickle",
    "pickletools",
    "pipes",
    "pkgutil",
    "platform",
    "plistlib",
    "poplib",
    "posix",
    "posixpath",
    "pprint",
    "profile",
    "pstats",
    "pty",
    "pwd",
    "py_compile",
    "pyclbr",
    "pydoc",
    "queue",
    "quopri",
    "random",
    "re",
    "readline",
    "reprlib",
    "resource",
    "rlcompleter",
    "runpy",
    "sched",
    "secrets",
    "select",
    "selectors",
    "shelve",
    "shlex",
    "shutil",
    "signal",
    "site",
    "smtpd",
    "smtplib",
    "sndhdr",
    "socket",
    "socketserver",
    "spwd",
    "sqlite3",
    "ssl",
    "stat",
    "statistics",
    "string",
    "stringprep",
    "struct",
    "subprocess",
    "sunau",
    "symtable",
    "sys",
    "sysconfig",
    "syslog",
    "tabnanny",
    "tarfile",
    "telnetlib",
    "tempfile",
    "termios",
    "test",
    "textwrap",
    "threading",
    "time",
    "timeit",
    "tkinter",
    "token",
    "tokenize",
    "trace",
    "traceback",
    "tracemalloc",
    "tty",
    "turtle",
    "turtledemo",
    "types",
    "typing",
    "unicodedata",
    "unittest",
    "urllib",
    "uu",
    "uuid",
    "venv",
    "warnings",
    "wave",
    "weakref",
    "webbrowser",
    "winreg",
    "winsound",
    "wsgiref",
    "xdrlib",
    "xml",
    "xmlrpc",
    "zipapp",
    "zipfile",
    "zipimport",
    "zlib",
];

/// Modules added in 3.9.
const ADDED_PY39: &[&str] = &["graphlib", "zoneinfo"];

/// Modules added in 3.11.
const ADDED_PY311: &[&str] = &["tomllib"];

/// Modules removed in 3.12.
const REMOVED_PY312: &[&str] = &["asynchat", "asyncore", "distutils", "imp", "smtpd"];

/// The PEP 594 "dead batteries", removed in 3.13.
const REMOVED_PY313: &[&str] = &[
    "aifc",
    "audioop",
    "cgi",
    "cgitb",
    "chunk",
    "crypt",
    "imghdr",
    "lib2to3",
    "mailcap",
    "msilib",
    "nis",
    "nntplib",
    "ossaudiodev",
    "pipes",
    "sndhdr",
    "spwd",
    "sunau",
    "telnetlib",
    "uu",
    "xdrlib",
];

fn table() -> &'static BTreeMap<PythonVersion, BTreeSet<&'static str>> {
    static TABLE: OnceLock<BTreeMap<PythonVersion, BTreeSet<&'static str>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let versions = [
            PythonVersion::Py38,
            PythonVersion::Py39,
            PythonVersion::Py310,
            PythonVersion::Py311,
            PythonVersion::Py312,
            PythonVersion::Py313,
        ];
        versions
            .into_iter()
            .map(|version| {
                let mut set: BTreeSet<&'static str> = BASE.iter().copied().collect();
                if version >= PythonVersion::Py39 {
                    set.extend(ADDED_PY39.iter().copied());
                }
                if version >= PythonVersion::Py311 {
                    set.extend(ADDED_PY311.iter().copied());
                }
                if version >= PythonVersion::Py312 {
                    for module in REMOVED_PY312 {
                        set.remove(module);
                    }
                }
                if version >= PythonVersion::Py313 {
                    for module in REMOVED_PY313 {
                        set.remove(module);
                    }
                }
                (version, set)
            })
            .collect()
    })
}

/// The standard-library module set for the given version.
pub fn modules(version: PythonVersion) -> &'static BTreeSet<&'static str> {
    // Every version is populated by `table`.
    &table()[&version]
}

/// True if the top-level module component is standard library for `version`.
pub fn is_standard_library(top_level: &str, version: PythonVersion) -> bool {
    modules(version).contains(top_level)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_is_stdlib_everywhere() {
        for version in [PythonVersion::Py38, PythonVersion::Py311, PythonVersion::Py313] {
            assert!(is_standard_library("os", version));
        }
    }

    #[test]
    fn tomllib_added_in_py311() {
        assert!(!is_standard_library("tomllib", PythonVersion::Py310));
        assert!(is_standard_library("tomllib", PythonVersion::Py311));
    }

    #[test]
    fn zoneinfo_added_in_py39() {
        assert!(!is_standard_library("zoneinfo", PythonVersion::Py38));
        assert!(is_standard_library("zoneinfo", PythonVersion::Py39));
    }

    #[test]
    fn distutils_removed_in_py312() {
        assert!(is_standard_library("distutils", PythonVersion::Py311));
        assert!(!is_standard_library("distutils", PythonVersion::Py312));
    }

    #[test]
    fn dead_batteries_removed_in_py313() {
        assert!(is_standard_library("telnetlib", PythonVersion::Py312));
        assert!(!is_standard_library("telnetlib", PythonVersion::Py313));
        assert!(!is_standard_library("xdrlib", PythonVersion::Py313));
    }

    #[test]
    fn third_party_names_absent() {
        assert!(!is_standard_library("numpy", PythonVersion::Py311));
        assert!(!is_standard_library("requests", PythonVersion::Py311));
    }

    #[test]
    fn future_is_not_in_the_stdlib_table() {
        // __future__ classifies through its own rule, not this table.
        assert!(!is_standard_library("__future__", PythonVersion::Py311));
    }
}
