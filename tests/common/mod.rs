#![allow(dead_code)]

pub use cmdstage_test_utils::builders;
pub use cmdstage_test_utils::{init_tracing, with_timeout};

use std::ffi::OsString;

use cmdstage::exec::resolve_shell;
use cmdstage::fs::RealFileSystem;

/// True if `name` resolves to a real interpreter on this machine's `PATH`.
pub fn shell_available(name: &str) -> bool {
    let path = std::env::var_os("PATH");
    !resolve_shell(Some(name), path.as_deref(), &RealFileSystem).fell_back
}

/// True if the default `sh` is really bash, which accepts process
/// substitution.
pub fn default_sh_is_bash() -> bool {
    let path: Option<OsString> = std::env::var_os("PATH");
    let sh = resolve_shell(None, path.as_deref(), &RealFileSystem).program;
    std::fs::canonicalize(&sh)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().contains("bash")))
        .unwrap_or(false)
}
