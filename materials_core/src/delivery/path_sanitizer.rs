//! Safe, collision-free destination paths for delivered materials.
//!
//! Suggested filenames come from the endpoint side (`"<id>.pdf"`), so they
//! are treated as untrusted: leading path components are dropped, unsafe
//! characters become `_`, and an existing file is never overwritten.

use std::path::{Path, PathBuf};

use uuid::Uuid;

const FALLBACK_STEM: &str = "material";
const MAX_STEM_BYTES: usize = 180;
const MAX_EXT_CHARS: usize = 10;

/// `dir` joined with a sanitised form of `suggested` that does not exist yet.
pub fn safe_output_path(dir: &Path, suggested: &str) -> PathBuf {
    unique_path(dir, &sanitise_filename(suggested))
}

/// Platform download directory, or `~/Downloads`, or the working directory.
pub fn default_download_dir() -> PathBuf {
    dirs_next::download_dir().unwrap_or_else(|| {
        dirs_next::home_dir()
            .map(|home| home.join("Downloads"))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

fn is_safe_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')' | '[' | ']' | '+' | ',')
}

pub fn sanitise_filename(suggested: &str) -> String {
    // Only the last component survives; "../../x.pdf" becomes "x.pdf".
    let last = suggested
        .rsplit(['/', '\\'])
        .find(|s| !s.trim().is_empty())
        .unwrap_or("")
        .trim();

    let (stem, ext) = split_stem_ext(last);

    let stem: String = stem
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();
    let stem = collapse_underscores(&stem);
    let stem = stem.trim_matches(|c| c == '_' || c == '.');
    let stem = if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        truncate_to_bytes(stem, MAX_STEM_BYTES)
    };

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXT_CHARS)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    }
}

fn split_stem_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) => (&name[..i], &name[i + 1..]),
    }
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

fn truncate_to_bytes(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Appends `_2`, `_3`, … to the stem until the path is free.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = split_stem_ext(name);
    for n in 2u32..=9999 {
        let numbered = if ext.is_empty() {
            format!("{}_{}", stem, n)
        } else {
            format!("{}_{}.{}", stem, n, ext)
        };
        let candidate = dir.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
    }

    dir.join(format!("{}_{}.{}", FALLBACK_STEM, Uuid::new_v4().simple(), ext_or_bin(ext)))
}

fn ext_or_bin(ext: &str) -> &str {
    if ext.is_empty() {
        "bin"
    } else {
        ext
    }
}
