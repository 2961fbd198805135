//! Recursive, format-aware comparison of a candidate tree against a golden
//! reference tree.
//!
//! Structure is checked per directory level before any content comparison:
//! a level with one-sided or type-mismatched entries fails once and is not
//! descended further. Content comparison is byte-exact except for the
//! structured-text case formats, which are diffed line by line with the
//! volatile header lines filtered out.

use crate::error::Result;
use crate::result::CheckResult;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Extensions compared as structured text with the volatile header filter.
pub const TEXT_EXTENSIONS: &[&str] = &["fds", "ge1"];

/// Literal prefixes of the volatile header lines (generation timestamp,
/// generating tool, source file path) excluded from text diffs. This is a
/// line-prefix convention shared with the reference fixtures, not a parse.
pub const VOLATILE_LINE_PREFIXES: &[&str] = &["! Gene", "! Date", "! File"];

/// Compare `cand_root` against `ref_root`, recursively.
///
/// Emits one structural result per directory level, one content result per
/// common file. A missing root lists as empty and therefore surfaces as a
/// structural mismatch at the first level rather than an error. Traversal
/// is lexicographic, so repeated runs over unchanged trees produce
/// identical result sequences.
pub fn compare_trees(package: &str, ref_root: &Path, cand_root: &Path) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();
    compare_level(package, ref_root, cand_root, &mut results)?;
    Ok(results)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Other,
}

fn list_entries(path: &Path) -> Result<BTreeMap<String, EntryKind>> {
    let mut entries = BTreeMap::new();
    if !path.exists() {
        return Ok(entries);
    }
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        // follow symlinks; anything that is neither a regular file nor a
        // directory is uncomparable
        let kind = match entry.path().metadata() {
            Ok(meta) if meta.is_dir() => EntryKind::Dir,
            Ok(meta) if meta.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        };
        entries.insert(entry.file_name().to_string_lossy().into_owned(), kind);
    }
    Ok(entries)
}

fn compare_level(
    package: &str,
    ref_dir: &Path,
    cand_dir: &Path,
    results: &mut Vec<CheckResult>,
) -> Result<()> {
    let ref_entries = list_entries(ref_dir)?;
    let cand_entries = list_entries(cand_dir)?;

    let mut ref_only = Vec::new();
    let mut funny = Vec::new();
    let mut common_files = Vec::new();
    let mut common_dirs = Vec::new();
    let cand_only: Vec<&String> = cand_entries
        .keys()
        .filter(|name| !ref_entries.contains_key(*name))
        .collect();

    for (name, kind) in &ref_entries {
        match cand_entries.get(name) {
            None => ref_only.push(name),
            Some(EntryKind::File) if *kind == EntryKind::File => common_files.push(name),
            Some(EntryKind::Dir) if *kind == EntryKind::Dir => common_dirs.push(name),
            Some(_) => funny.push(name),
        }
    }

    let level_name = format!(
        "structure of <{}> vs <{}>",
        ref_dir.display(),
        cand_dir.display()
    );
    if !ref_only.is_empty() || !cand_only.is_empty() || !funny.is_empty() {
        let mut log = String::new();
        if !ref_only.is_empty() {
            log.push_str(&format!("only in reference: {}\n", join(&ref_only)));
        }
        if !cand_only.is_empty() {
            log.push_str(&format!("only in candidate: {}\n", join(&cand_only)));
        }
        if !funny.is_empty() {
            log.push_str(&format!("uncomparable entries: {}\n", join(&funny)));
        }
        // a structural mismatch invalidates deeper content comparison here
        results.push(CheckResult::fail(package, level_name, log.trim_end()));
        return Ok(());
    }
    results.push(CheckResult::ok(package, level_name));

    for name in &common_files {
        results.push(compare_file(
            package,
            &ref_dir.join(name.as_str()),
            &cand_dir.join(name.as_str()),
        )?);
    }
    for name in &common_dirs {
        compare_level(
            package,
            &ref_dir.join(name.as_str()),
            &cand_dir.join(name.as_str()),
            results,
        )?;
    }
    Ok(())
}

fn join(names: &[&String]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn compare_file(package: &str, ref_path: &Path, cand_path: &Path) -> Result<CheckResult> {
    let name = format!("compare <{}> with reference", cand_path.display());
    let ref_bytes = fs::read(ref_path)?;
    let cand_bytes = fs::read(cand_path)?;
    if ref_bytes == cand_bytes {
        return Ok(CheckResult::ok(package, name));
    }

    if is_text_extension(ref_path) {
        let ref_text = String::from_utf8_lossy(&ref_bytes);
        let cand_text = String::from_utf8_lossy(&cand_bytes);
        let diff = filtered_diff(&ref_text, &cand_text);
        if diff.is_empty() {
            // only volatile header lines changed
            Ok(CheckResult::ok(package, name))
        } else {
            Ok(CheckResult::fail(package, name, diff))
        }
    } else {
        Ok(CheckResult::fail(
            package,
            name,
            format!(
                "binary files differ:\nreference: {}\ncandidate: {}",
                ref_path.display(),
                cand_path.display()
            ),
        ))
    }
}

fn is_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.contains(&e))
}

/// Zero-context line diff from reference to candidate, with volatile
/// header lines removed. An empty return value means the files are equal
/// up to their headers.
pub fn filtered_diff(reference: &str, candidate: &str) -> String {
    let diff = TextDiff::from_lines(reference, candidate);
    let mut log = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Equal => continue,
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
        };
        let line = change.value();
        if VOLATILE_LINE_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }
        log.push(sign);
        log.push_str(line);
        if !line.ends_with('\n') {
            log.push('\n');
        }
    }
    log
}

/// "Set reference" mode: replace the reference tree with a copy of the
/// candidate tree instead of comparing.
pub fn refresh_reference(ref_root: &Path, cand_root: &Path) -> Result<()> {
    if ref_root.exists() {
        fs::remove_dir_all(ref_root)?;
    }
    copy_tree(cand_root, ref_root)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
