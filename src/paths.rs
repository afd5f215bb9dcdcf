//! Path helpers for startup and configuration code.
//!
//! Pure helpers (normalization, comparison) never touch the filesystem.
//! The filesystem helpers follow one policy: a failure in a known OS
//! category is logged with that category and reported as `Ok(false)`;
//! anything else is returned as the underlying `io::Error`.

use crate::platform;
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    /// How the host filesystem compares names.
    pub fn host() -> Self {
        if platform::current().case_sensitive_fs {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        }
    }

    fn names_equal(self, a: &OsStr, b: &OsStr) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => {
                a == b || a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
            }
        }
    }
}

/// Make `path` absolute against the current directory and remove `.`,
/// `..` and trailing separators.
pub fn normalize_dir(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(&std::env::current_dir()?.join(path)))
    }
}

/// Lexical cleanup; `..` never climbs above the root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path that leads from directory `from` to `to`, using `..` as needed.
///
/// `None` if either path is relative or they live under different roots.
pub fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    if !from.is_absolute() || !to.is_absolute() {
        return None;
    }
    let (from, to) = (clean(from), clean(to));
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // Different prefix or root: no relative path exists.
    if from.iter().take_while(|c| !matches!(c, Component::Normal(_))).count() > common {
        return None;
    }

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for c in &to[common..] {
        out.push(c.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}

/// Compare two paths component-wise after lexical cleanup.
pub fn paths_equal(a: &Path, b: &Path, case: CaseSensitivity) -> bool {
    let (a, b) = (clean(a), clean(b));
    let (mut ia, mut ib) = (a.components(), b.components());
    loop {
        match (ia.next(), ib.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if case.names_equal(x.as_os_str(), y.as_os_str()) => {}
            _ => return false,
        }
    }
}

/// True if `child` lies strictly below `parent`.
pub fn is_parent_of(parent: &Path, child: &Path, case: CaseSensitivity) -> bool {
    let (parent, child) = (clean(parent), clean(child));
    let mut ic = child.components();
    for p in parent.components() {
        match ic.next() {
            Some(c) if case.names_equal(p.as_os_str(), c.as_os_str()) => {}
            _ => return false,
        }
    }
    ic.next().is_some()
}

/// Move `src` to `dst`, replacing `dst` if it exists.
///
/// Falls back to copy-then-delete when a plain rename is refused, e.g.
/// across filesystems. Once the copy has replaced `dst` the move counts as
/// done: a source that cannot be deleted afterwards is logged and left in
/// place, and the call still returns `Ok(true)`.
pub fn move_overwrite(src: &Path, dst: &Path) -> io::Result<bool> {
    match fs::metadata(src) {
        Ok(m) if m.is_file() => {}
        Ok(_) => return Ok(reject("move", src, "not a regular file")),
        Err(e) => return report("move", src, e),
    }
    if let Err(e) = fs::rename(src, dst) {
        log::debug!(
            "rename {} -> {} failed ({}), copying instead",
            src.display(),
            dst.display(),
            e
        );
        if let Err(e) = fs::copy(src, dst) {
            return report("move", dst, e);
        }
        return finish_copy(src, dst, fs::remove_file(src));
    }
    Ok(true)
}

/// Outcome of a copy-based move whose copy already replaced `dst`.
fn finish_copy(src: &Path, dst: &Path, removed: io::Result<()>) -> io::Result<bool> {
    match removed {
        Ok(()) => Ok(true),
        Err(e) => match category(e.kind()) {
            Some(cat) => {
                log::warn!(
                    "move {}: {} replaced, but source was left behind: {}: {}",
                    src.display(),
                    dst.display(),
                    cat,
                    e
                );
                Ok(true)
            }
            None => Err(e),
        },
    }
}

/// Check that `path` is a readable and writable directory, creating it
/// (and its parents) first when `create` is set.
pub fn validate_dir(path: &Path, create: bool) -> io::Result<bool> {
    if path.as_os_str().is_empty() {
        return Ok(reject("validate directory", path, "empty path"));
    }
    match fs::metadata(path) {
        Ok(m) if m.is_dir() => {}
        Ok(_) => return Ok(reject("validate directory", path, "not a directory")),
        Err(e) if e.kind() == ErrorKind::NotFound && create => {
            if let Err(e) = fs::create_dir_all(path) {
                return report("create directory", path, e);
            }
            log::debug!("created directory {}", path.display());
        }
        Err(e) => return report("validate directory", path, e),
    }

    if let Err(e) = fs::read_dir(path) {
        return report("read directory", path, e);
    }
    let probe = path.join(format!(".grouped-metadata-write-probe-{}", std::process::id()));
    if let Err(e) = fs::write(&probe, b"").and_then(|_| fs::remove_file(&probe)) {
        return report("write directory", path, e);
    }
    Ok(true)
}

/// Check that `path` is a readable and writable file, or that it could be
/// created inside a writable parent directory.
///
/// Missing parent directories are created only when `create` is set.
pub fn validate_file(path: &Path, create: bool) -> io::Result<bool> {
    if path.file_name().is_none() {
        return Ok(reject("validate file", path, "no file name"));
    }
    match fs::metadata(path) {
        Ok(m) if m.is_file() => {}
        Ok(_) => return Ok(reject("validate file", path, "not a regular file")),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => validate_dir(dir, create),
                _ => validate_dir(Path::new("."), false),
            };
        }
        Err(e) => return report("validate file", path, e),
    }
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) => report("open file", path, e),
    }
}

/// Regular files directly inside `dir` whose name equals `name` ignoring
/// case, sorted by path.
pub fn find_files_ignore_case(dir: &Path, name: &str) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) => {
            report("list directory", dir, e)?;
            return Ok(Vec::new());
        }
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if CaseSensitivity::Insensitive.names_equal(&entry.file_name(), OsStr::new(name)) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

fn category(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::NotFound => Some("missing"),
        ErrorKind::PermissionDenied => Some("permission denied"),
        ErrorKind::AlreadyExists => Some("already exists"),
        ErrorKind::InvalidInput => Some("malformed path"),
        ErrorKind::Unsupported => Some("unsupported"),
        _ => None,
    }
}

fn report(op: &str, path: &Path, err: io::Error) -> io::Result<bool> {
    match category(err.kind()) {
        Some(cat) => {
            log::warn!("{} {}: {}: {}", op, path.display(), cat, err);
            Ok(false)
        }
        None => Err(err),
    }
}

fn reject(op: &str, path: &Path, why: &str) -> bool {
    log::warn!("{} {}: {}", op, path.display(), why);
    false
}
