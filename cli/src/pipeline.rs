//! The five batch pipeline tools: scan, remove-v1, remove-v2,
//! convert-v24-to-v10, and full-process. Each walks the immediate
//! (non-recursive) entries of a source directory, copies non-MP3s
//! through unchanged, and prints one status line per MP3 considered. A
//! per-file failure is logged and the batch continues with the next
//! file.

use id3kit::MpegFile;
use log::error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::args::OpError;
use crate::{print_entry, print_header};

const SUFFIX_NO_V1: &str = " - No ID3v1";
const SUFFIX_NO_V2: &str = " - No ID3v2";
const SUFFIX_V10: &str = " - v2.4 to v1.0";
const KNOWN_SUFFIXES: &[&str] = &[SUFFIX_NO_V1, SUFFIX_NO_V2, SUFFIX_V10];

fn validate_source_dir(source: &str) -> Result<PathBuf, OpError> {
    let path = PathBuf::from(source);
    if !path.is_dir() {
        return Err(OpError::InvalidSourceDir(path));
    }
    Ok(path)
}

/// A sibling of `source` named `<source-name><suffix>`, with any
/// already-known suffix stripped from `source`'s own name first so
/// rerunning a tool against its own output doesn't stack suffixes.
fn output_dir_for(source: &Path, suffix: &str) -> PathBuf {
    let name = source.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    let mut base = name;
    for known in KNOWN_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(known) {
            base = stripped;
            break;
        }
    }

    let sibling = source.parent().unwrap_or_else(|| Path::new("."));
    sibling.join(format!("{}{}", base, suffix))
}

fn prepare_output_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// The immediate entries of `dir`, sorted for deterministic sequence
/// numbering. Does not recurse into subdirectories.
fn entries_sorted(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_mp3(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.len() >= 4 && name[name.len() - 4..].eq_ignore_ascii_case(".mp3"))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string()
}

fn sequence_width(entries: &[PathBuf]) -> usize {
    entries.iter().filter(|p| is_mp3(p)).count().to_string().len().max(1)
}

pub fn scan(source: &str) -> Result<(), OpError> {
    let dir = validate_source_dir(source)?;
    scan_dir(&dir)
}

fn scan_dir(dir: &Path) -> Result<(), OpError> {
    print_header!("Scanning {}:", dir.display());

    let entries = entries_sorted(dir)?;
    let width = sequence_width(&entries);
    let mut seq = 0usize;

    for path in &entries {
        if !is_mp3(path) {
            continue;
        }
        seq += 1;

        let status = match MpegFile::load(path) {
            Ok(file) => describe_versions(&file),
            Err(err) => {
                error!("failed to load {}: {}", path.display(), err);
                String::from("Failed to load")
            }
        };

        print_entry!("[{:0width$}] {}: {}", seq, file_name(path), status, width = width);
    }

    Ok(())
}

fn describe_versions(file: &MpegFile) -> String {
    let mut found = Vec::new();
    if file.has_v10() {
        found.push("ID3v1.0");
    }
    if file.has_v11() {
        found.push("ID3v1.1");
    }
    if file.has_v20() {
        found.push("ID3v2.0");
    }
    if file.has_v23() {
        found.push("ID3v2.3");
    }
    if file.has_v24() {
        found.push("ID3v2.4");
    }

    if found.is_empty() {
        String::from("No ID3 tags found")
    } else {
        found.join(", ")
    }
}

pub fn remove_v1(source: &str) -> Result<(), OpError> {
    let dir = validate_source_dir(source)?;
    remove_v1_dir(&dir)?;
    Ok(())
}

fn remove_v1_dir(dir: &Path) -> Result<PathBuf, OpError> {
    let out = output_dir_for(dir, SUFFIX_NO_V1);
    prepare_output_dir(&out)?;
    print_header!("Removing ID3v1 tags from {}:", dir.display());

    let entries = entries_sorted(dir)?;
    let width = sequence_width(&entries);
    let mut seq = 0usize;

    for path in &entries {
        let dest = out.join(path.file_name().unwrap());

        if !is_mp3(path) {
            fs::copy(path, &dest)?;
            continue;
        }

        seq += 1;
        let status = strip_v1_one(path, &dest);
        print_entry!("[{:0width$}] {}: {}", seq, file_name(path), status, width = width);
    }

    Ok(out)
}

fn strip_v1_one(path: &Path, dest: &Path) -> &'static str {
    let mut file = match MpegFile::load(path) {
        Ok(f) => f,
        Err(err) => {
            error!("failed to load {}: {}", path.display(), err);
            return "Failed to load";
        }
    };

    let had_v1 = file.strip_v1();

    if let Err(err) = file.save(dest) {
        error!("failed to save {}: {}", dest.display(), err);
        return "Failed to save";
    }

    if had_v1 {
        "ID3v1 removed"
    } else {
        "No ID3v1 tag (copied)"
    }
}

pub fn remove_v2(source: &str) -> Result<(), OpError> {
    let dir = validate_source_dir(source)?;
    remove_v2_dir(&dir)?;
    Ok(())
}

fn remove_v2_dir(dir: &Path) -> Result<PathBuf, OpError> {
    let out = output_dir_for(dir, SUFFIX_NO_V2);
    prepare_output_dir(&out)?;
    print_header!("Removing ID3v2 tags from {}:", dir.display());

    let entries = entries_sorted(dir)?;
    let width = sequence_width(&entries);
    let mut seq = 0usize;

    for path in &entries {
        let dest = out.join(path.file_name().unwrap());

        if !is_mp3(path) {
            fs::copy(path, &dest)?;
            continue;
        }

        seq += 1;
        let status = strip_v2_one(path, &dest);
        print_entry!("[{:0width$}] {}: {}", seq, file_name(path), status, width = width);
    }

    Ok(out)
}

fn strip_v2_one(path: &Path, dest: &Path) -> &'static str {
    let mut file = match MpegFile::load(path) {
        Ok(f) => f,
        Err(err) => {
            error!("failed to load {}: {}", path.display(), err);
            return "Failed to load";
        }
    };

    let had_v2 = file.strip_v2();

    if let Err(err) = file.save(dest) {
        error!("failed to save {}: {}", dest.display(), err);
        return "Failed to save";
    }

    if had_v2 {
        "ID3v2 removed"
    } else {
        "No ID3v2 tag (copied)"
    }
}

pub fn convert_v24_to_v10(source: &str) -> Result<(), OpError> {
    let dir = validate_source_dir(source)?;
    convert_dir(&dir)?;
    Ok(())
}

fn convert_dir(dir: &Path) -> Result<PathBuf, OpError> {
    let out = output_dir_for(dir, SUFFIX_V10);
    prepare_output_dir(&out)?;
    print_header!("Converting ID3v2.4 tags to ID3v1.0 in {}:", dir.display());

    let entries = entries_sorted(dir)?;
    let width = sequence_width(&entries);
    let mut seq = 0usize;

    for path in &entries {
        let dest = out.join(path.file_name().unwrap());

        if !is_mp3(path) {
            fs::copy(path, &dest)?;
            continue;
        }

        seq += 1;
        let status = convert_one(path, &dest);
        print_entry!("[{:0width$}] {}: {}", seq, file_name(path), status, width = width);
    }

    Ok(out)
}

fn convert_one(path: &Path, dest: &Path) -> &'static str {
    let mut file = match MpegFile::load(path) {
        Ok(f) => f,
        Err(err) => {
            error!("failed to load {}: {}", path.display(), err);
            return "Failed to load";
        }
    };

    if !file.has_v24() {
        if let Err(err) = file.save(dest) {
            error!("failed to save {}: {}", dest.display(), err);
            return "Failed to save";
        }
        return "No ID3v2.4 tag (copied)";
    }

    let mut tags = match file.get_tags() {
        Ok(t) => t,
        Err(err) => {
            error!("failed to parse tags in {}: {}", path.display(), err);
            return "Malformed metadata";
        }
    };

    tags.convert_v24_to_v10();

    if let Err(err) = file.set_tags(&tags) {
        error!("failed to render tags for {}: {}", path.display(), err);
        return "Failed to convert";
    }

    if let Err(err) = file.save(dest) {
        error!("failed to save {}: {}", dest.display(), err);
        return "Failed to save";
    }

    "Converted to ID3v1.0"
}

/// `scan -> remove-v1 -> scan -> remove-v2 -> scan`. The two removal
/// phases both run against the original source directory (remove-v2 is
/// not chained off remove-v1's output); each scan reports on the
/// directory its preceding phase just produced.
pub fn full_process(source: &str) -> Result<(), OpError> {
    let dir = validate_source_dir(source)?;

    scan_dir(&dir)?;
    let no_v1_dir = remove_v1_dir(&dir)?;
    scan_dir(&no_v1_dir)?;
    let no_v2_dir = remove_v2_dir(&dir)?;
    scan_dir(&no_v2_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_appends_suffix() {
        let source = Path::new("/music/Album");
        let out = output_dir_for(source, SUFFIX_NO_V1);
        assert_eq!(out, Path::new("/music/Album - No ID3v1"));
    }

    #[test]
    fn output_dir_strips_known_suffix_before_reapplying() {
        let source = Path::new("/music/Album - No ID3v1");
        let out = output_dir_for(source, SUFFIX_NO_V1);
        assert_eq!(out, Path::new("/music/Album - No ID3v1"));
    }

    #[test]
    fn is_mp3_is_case_insensitive_and_checks_suffix_only() {
        assert!(is_mp3(Path::new("song.MP3")));
        assert!(is_mp3(Path::new("song.mp3")));
        assert!(!is_mp3(Path::new("song.flac")));
        assert!(!is_mp3(Path::new("mp3")));
    }
}
