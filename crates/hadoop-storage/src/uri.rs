//! Public URL construction

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in file paths
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b'\'')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-');

/// Escape a stored name for use in a URL path
///
/// Backslashes become `/`; reserved characters such as `?`, `#`, `%` and
/// spaces are percent-encoded.
pub fn filepath_to_uri(path: &str) -> String {
    utf8_percent_encode(&path.replace('\\', "/"), PATH_SAFE).to_string()
}

/// Resolve a relative, already escaped path against `base`
///
/// `base` may be absolute (`https://host/media/`) or host-relative
/// (`/media/`). Dot segments in `relative` are resolved against the base
/// path and never climb above its root.
pub fn url_join(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }

    let path_start = match base.find("://") {
        Some(scheme_end) => {
            let authority = scheme_end + 3;
            base[authority..]
                .find('/')
                .map(|i| authority + i)
                .unwrap_or(base.len())
        }
        None => 0,
    };
    let (origin, base_path) = base.split_at(path_start);

    // Everything up to the last '/' of the base path is the directory
    let directory = match base_path.rfind('/') {
        Some(i) => &base_path[..i],
        None => "",
    };
    let mut segments: Vec<&str> = directory.split('/').collect();

    let last = relative.split('/').count() - 1;
    let mut trailing_slash = false;
    for (i, segment) in relative.split('/').enumerate() {
        match segment {
            "." => trailing_slash = i == last,
            ".." => {
                if segments.len() > 1 {
                    segments.pop();
                }
                trailing_slash = i == last;
            }
            _ => {
                segments.push(segment);
                trailing_slash = false;
            }
        }
    }

    let mut joined = segments.join("/");
    if trailing_slash {
        joined.push('/');
    }
    if !joined.starts_with('/') && !origin.is_empty() {
        joined.insert(0, '/');
    }
    format!("{}{}", origin, joined)
}
