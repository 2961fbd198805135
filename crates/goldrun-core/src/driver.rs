//! Generic converter-driving helpers: case roundtrips, document exports,
//! reference verification, and optional solver runs.
//!
//! These helpers encode the common shape of a suite: sweep a fixture tree,
//! push each case through the converter into scratch space, then verify
//! the produced artifacts against the golden reference (or refresh the
//! reference in set-reference mode). Scratch directories live exactly as
//! long as the case that created them.

use crate::command::{run_command_tree, CommandConfig, TreeSweep};
use crate::compare::{compare_trees, refresh_reference};
use crate::convert::Converter;
use crate::expect::{check_expected, ExpectedFailure};
use crate::suite::SuiteContext;
use std::path::Path;
use tracing::debug;

/// Per-case behavior for roundtrip and export drives.
#[derive(Default)]
pub struct CaseOptions<'a> {
    /// Expected import failure for negative cases. When set, the case ends
    /// at the import check.
    pub import_expect: Option<&'a ExpectedFailure>,

    /// Expected export failure for negative cases. When set, the case ends
    /// at the export check.
    pub export_expect: Option<&'a ExpectedFailure>,

    /// Root of the golden reference tree, laid out as
    /// `<ref_root>/<case_file_name>/<unit>/...`.
    pub ref_root: Option<&'a Path>,

    /// Solver configuration, honored when the run options enable the
    /// solver.
    pub solver: Option<&'a CommandConfig>,
}

/// File exclusion sets for tree drives.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
}

impl SweepOptions {
    fn to_tree_sweep(&self, extension: &str) -> TreeSweep {
        TreeSweep {
            extension: extension.to_string(),
            exclude_dirs: self.exclude_dirs.clone(),
            exclude_files: self.exclude_files.clone(),
        }
    }
}

/// Import one interchange case, export the imported unit into scratch
/// space, and verify the produced artifacts.
///
/// A failed import or export (when no failure was expected) records a Fail
/// and skips the remainder of the case.
pub async fn roundtrip_case(
    cx: &mut SuiteContext,
    converter: &mut dyn Converter,
    filepath: &Path,
    opts: &CaseOptions<'_>,
) -> anyhow::Result<()> {
    let package = cx.package().to_string();
    debug!(case = %filepath.display(), "roundtrip");

    let import_name = format!("import <{}>", filepath.display());
    let imported = converter.import_case(filepath);
    if let Some(expected) = opts.import_expect {
        cx.record(check_expected(&package, import_name, imported, expected));
        return Ok(());
    }
    let unit = match imported {
        Ok(unit) => {
            cx.ok(import_name);
            unit
        }
        Err(err) => {
            cx.fail(import_name, err.to_string());
            return Ok(());
        }
    };

    let scratch = tempfile::tempdir()?;
    let export_name = format!("export imported <{}>", filepath.display());
    let exported = converter.export_unit(&unit, scratch.path());
    if let Some(expected) = opts.export_expect {
        cx.record(check_expected(&package, export_name, exported, expected));
        return Ok(());
    }
    match exported {
        Ok(()) => cx.ok(export_name),
        Err(err) => {
            cx.fail(export_name, err.to_string());
            return Ok(());
        }
    }

    if let Some(ref_root) = opts.ref_root {
        let case_name = file_name(filepath);
        let ref_dir = ref_root.join(&case_name).join(&unit);
        verify_against_reference(cx, &ref_dir, scratch.path())?;
    }

    if cx.options().run_solver {
        if let Some(solver) = opts.solver {
            run_solver(cx, solver, scratch.path(), converter.case_extension()).await?;
        }
    }
    Ok(())
}

/// Drive [`roundtrip_case`] over every case file under `root`, recursively,
/// in lexicographic order.
pub async fn roundtrip_tree(
    cx: &mut SuiteContext,
    converter: &mut dyn Converter,
    root: &Path,
    sweep: &SweepOptions,
    opts: &CaseOptions<'_>,
) -> anyhow::Result<()> {
    let tree_sweep = sweep.to_tree_sweep(converter.case_extension());
    let cases = crate::command::collect_targets(root, &tree_sweep)?;
    for case in cases {
        roundtrip_case(cx, converter, &case, opts).await?;
    }
    Ok(())
}

/// Export every unit of every native document under `root` and verify each
/// against `<ref_root>/<document_file_name>/<unit>/`.
///
/// An export failure fails the document and skips its remaining units; the
/// sweep continues with the next document.
pub async fn export_documents(
    cx: &mut SuiteContext,
    converter: &mut dyn Converter,
    root: &Path,
    sweep: &SweepOptions,
    opts: &CaseOptions<'_>,
) -> anyhow::Result<()> {
    let tree_sweep = sweep.to_tree_sweep(converter.document_extension());
    let documents = crate::command::collect_targets(root, &tree_sweep)?;

    for document in documents {
        let open_name = format!("open <{}>", document.display());
        let units = match converter.open_document(&document) {
            Ok(units) => {
                cx.ok(open_name);
                units
            }
            Err(err) => {
                cx.fail(open_name, err.to_string());
                continue;
            }
        };

        let document_name = file_name(&document);
        for unit in units {
            let scratch = tempfile::tempdir()?;
            let export_name = format!("export <{unit}> from <{}>", document.display());
            match converter.export_unit(&unit, scratch.path()) {
                Ok(()) => cx.ok(export_name),
                Err(err) => {
                    cx.fail(export_name, err.to_string());
                    break;
                }
            }

            if let Some(ref_root) = opts.ref_root {
                let ref_dir = ref_root.join(&document_name).join(&unit);
                verify_against_reference(cx, &ref_dir, scratch.path())?;
            }

            if cx.options().run_solver {
                if let Some(solver) = opts.solver {
                    run_solver(cx, solver, scratch.path(), converter.case_extension()).await?;
                }
            }
        }
    }
    Ok(())
}

fn verify_against_reference(
    cx: &mut SuiteContext,
    ref_dir: &Path,
    produced: &Path,
) -> anyhow::Result<()> {
    if cx.options().set_reference {
        refresh_reference(ref_dir, produced)?;
        cx.ok(format!("set reference <{}>", ref_dir.display()));
    } else {
        let results = compare_trees(cx.package(), ref_dir, produced)?;
        cx.record_all(results);
    }
    Ok(())
}

async fn run_solver(
    cx: &mut SuiteContext,
    config: &CommandConfig,
    dir: &Path,
    extension: &str,
) -> anyhow::Result<()> {
    let package = cx.package().to_string();
    let sweep = TreeSweep {
        extension: extension.to_string(),
        ..Default::default()
    };
    for (path, outcome) in run_command_tree(config, dir, &sweep).await? {
        let name = format!("{} <{}>", config.command, path.display());
        cx.record(outcome.into_check(&package, name));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
