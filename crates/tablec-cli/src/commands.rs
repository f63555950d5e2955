use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::Table;
use tracing::{info, info_span, warn};

use tablec_cli::config::{ConfigOverrides, load_options};
use tablec_cli::report::{ReportFormat, default_report_path, write_report};
use tablec_core::{NoProgress, ProgressObserver, RunContext, RunOutcome, Selection, run};
use tablec_ingest::load_workbooks;
use tablec_model::{Catalog, CompilerOptions};

use crate::cli::{BuildArgs, ListArgs, ReportFormatArg};
use crate::progress::BarProgress;
use crate::summary::apply_table_style;

/// Everything `print_summary` needs about a finished build.
#[derive(Debug)]
pub struct BuildResult {
    pub outcome: RunOutcome,
    pub options: CompilerOptions,
    pub dry_run: bool,
    /// Selected names that matched nothing.
    pub unknown: Vec<String>,
    /// Diagnostic report, written only when the run had diagnostics.
    pub report: Option<PathBuf>,
}

impl BuildResult {
    pub fn has_errors(&self) -> bool {
        !self.outcome.succeeded() || !self.unknown.is_empty()
    }
}

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let input_dir = &args.input_dir;
    let build_span = info_span!("build", input = %input_dir.display());
    let _build_guard = build_span.enter();
    let started = Instant::now();

    // =========================================================================
    // Stage 0: Configuration
    // =========================================================================
    let overrides = ConfigOverrides {
        output_dir: args.output_dir.clone(),
        namespace: args.namespace.clone(),
        jobs: args.jobs,
    };
    let options = overrides.apply(
        load_options(args.config.as_deref(), input_dir).context("load configuration")?,
    );

    // =========================================================================
    // Stage 1: Discover and read workbooks
    // =========================================================================
    let workbooks = load_workbooks(input_dir)
        .with_context(|| format!("read workbooks in {}", input_dir.display()))?;

    // =========================================================================
    // Stage 2: Selection
    // =========================================================================
    let selection = if args.all || args.select.is_empty() {
        Selection::All
    } else {
        Selection::Named(args.select.clone())
    };
    let ctx = RunContext::new(options.clone(), workbooks, &selection).with_dry_run(args.dry_run);
    for name in &ctx.unknown {
        warn!(name = %name, "selection matched no workbook or table sheet");
    }
    info!(
        workbooks = ctx.workbooks.len(),
        selected = ctx.selected.len(),
        workers = options.worker_cap(),
        "selection complete"
    );

    // =========================================================================
    // Stage 3: Compile
    // =========================================================================
    let bars = BarProgress::new();
    let observer: &dyn ProgressObserver = if io::stderr().is_terminal() {
        &bars
    } else {
        &NoProgress
    };
    let outcome = run(&ctx, observer).context("compile run")?;

    // =========================================================================
    // Stage 4: Diagnostic report
    // =========================================================================
    let report = if outcome.succeeded() {
        None
    } else {
        let (path, format) = report_target(args);
        write_report(&outcome.diagnostics, &path, format)?;
        Some(path)
    };

    info!(
        stage = %outcome.stage,
        diagnostics = outcome.diagnostics.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "build complete"
    );
    Ok(BuildResult {
        outcome,
        options,
        dry_run: args.dry_run,
        unknown: ctx.unknown.clone(),
        report,
    })
}

/// Explicit format, else the format of an explicit path, else xlsx.
fn report_target(args: &BuildArgs) -> (PathBuf, ReportFormat) {
    let explicit = args.report_format.map(|format| match format {
        ReportFormatArg::Xlsx => ReportFormat::Xlsx,
        ReportFormatArg::Csv => ReportFormat::Csv,
        ReportFormatArg::Json => ReportFormat::Json,
    });
    match &args.report {
        Some(path) => {
            let format = explicit
                .or_else(|| ReportFormat::from_path(path))
                .unwrap_or_default();
            (path.clone(), format)
        }
        None => {
            let format = explicit.unwrap_or_default();
            (default_report_path(Local::now().naive_local(), format), format)
        }
    }
}

pub fn run_list(args: &ListArgs) -> Result<()> {
    let workbooks = load_workbooks(&args.input_dir)
        .with_context(|| format!("read workbooks in {}", args.input_dir.display()))?;
    let catalog = Catalog::from_workbooks(&workbooks);
    print_catalog(&catalog, &args.input_dir);
    Ok(())
}

fn print_catalog(catalog: &Catalog, input_dir: &Path) {
    println!("Input: {}", input_dir.display());
    let mut table = Table::new();
    table.set_header(vec!["Workbook", "Kind", "Tables", "Merge Group"]);
    apply_table_style(&mut table);
    for entry in catalog.entries() {
        table.add_row(vec![
            entry.name.clone(),
            entry.kind.map_or("-", |kind| kind.tag()).to_string(),
            if entry.tables.is_empty() {
                "-".to_string()
            } else {
                entry.tables.join(", ")
            },
            entry.merge_group.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
}
