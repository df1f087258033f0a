//! Canonical Windows system command paths.
//!
//! Absolute system paths avoid PATH-search hijacking.

pub const POWERSHELL_EXE: &str = r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";
pub const REG_EXE: &str = r"C:\Windows\System32\reg.exe";
