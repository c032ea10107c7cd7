//! Remote path handling
//!
//! Remote filesystem paths are POSIX-style strings regardless of the host
//! platform, so everything here works on `/`-separated `str`s instead of
//! `std::path::Path`.

use crate::error::{Error, Result};

/// Replace Windows separators with `/`
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Collapse `.`, `..` and repeated separators lexically
///
/// `..` never climbs above `/` for absolute paths; leading `..` segments of
/// relative paths are kept.
pub fn normalize(path: &str) -> String {
    let path = to_slash(path);
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Make `path` absolute against the process working directory and normalize it
pub fn absolutize(path: &str) -> Result<String> {
    let path = to_slash(path);
    if path.starts_with('/') {
        return Ok(normalize(&path));
    }

    let cwd = std::env::current_dir()?;
    let cwd = to_slash(&cwd.to_string_lossy());
    Ok(normalize(&join(&[&cwd, &path])))
}

/// Join path parts; an absolute part discards everything before it
pub fn join(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        if part.starts_with('/') {
            out = part.to_string();
        } else if out.is_empty() || out.ends_with('/') {
            out.push_str(part);
        } else {
            out.push('/');
            out.push_str(part);
        }
    }
    out
}

/// Split into `(directory, file)` at the last `/`
///
/// Trailing separators are stripped from the directory unless it is made of
/// separators only.
pub fn split(path: &str) -> (&str, &str) {
    let index = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (head, tail) = path.split_at(index);
    let trimmed = head.trim_end_matches('/');
    if trimmed.is_empty() {
        (head, tail)
    } else {
        (trimmed, tail)
    }
}

/// Split a file name into `(stem, extension)`
///
/// The extension starts at the last `.`; leading dots belong to the stem, so
/// `.bashrc` has no extension.
pub fn split_ext(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => file_name.split_at(dot),
        _ => (file_name, ""),
    }
}

/// Join `name` onto `root` and fail if the result escapes `root`
///
/// Separators are normalized and `.`/`..` collapsed before the check. An
/// absolute `name` is accepted only when it already lies beneath `root`.
pub fn safe_join(root: &str, name: &str) -> Result<String> {
    let base = normalize(root);
    let joined = normalize(&join(&[&base, &to_slash(name)]));

    let inside = joined == base
        || base == "/"
        || joined
            .strip_prefix(base.as_str())
            .is_some_and(|rest| rest.starts_with('/'));

    if inside {
        Ok(joined)
    } else {
        Err(Error::SuspiciousOperation {
            name: name.to_string(),
            root: base,
        })
    }
}
