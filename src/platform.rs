//! Process-wide host facts, detected once on first use.

use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

/// Read-only description of the host, shared by the path helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub is_windows: bool,
    pub case_sensitive_fs: bool,
}

static CURRENT: Lazy<Platform> = Lazy::new(|| {
    let p = Platform {
        is_windows: cfg!(windows),
        case_sensitive_fs: probe_case_sensitivity(&std::env::temp_dir())
            .unwrap_or_else(default_case_sensitivity),
    };
    log::debug!("detected platform: {:?}", p);
    p
});

/// The host description, computed on first call.
pub fn current() -> &'static Platform {
    &CURRENT
}

fn default_case_sensitivity() -> bool {
    !(cfg!(windows) || cfg!(target_os = "macos"))
}

/// Create a lowercase marker in `dir` and test whether its uppercase name
/// resolves to it. `None` if the probe could not be carried out.
pub(crate) fn probe_case_sensitivity(dir: &Path) -> Option<bool> {
    let name = format!(".grouped-metadata-case-probe-{}", std::process::id());
    let lower = dir.join(&name);
    let upper = dir.join(name.to_uppercase());

    if let Err(e) = fs::write(&lower, b"") {
        log::debug!("case-sensitivity probe in {} failed: {}", dir.display(), e);
        return None;
    }
    let sensitive = !upper.exists();
    if let Err(e) = fs::remove_file(&lower) {
        log::debug!("could not remove probe {}: {}", lower.display(), e);
    }
    Some(sensitive)
}
