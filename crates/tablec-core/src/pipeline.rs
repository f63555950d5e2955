//! The compile run: ingest, load references, merge, validate, emit.
//!
//! Each stage runs only when every earlier stage finished without a
//! diagnostic. A run therefore either writes the complete output tree or
//! writes nothing and returns every problem it found.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use tablec_emit::{EmitInput, EmitTable, EmittedFile, emit_all};
use tablec_ingest::header::PARAM_ROW;
use tablec_ingest::{IngestedSheet, ingest_sheet, sheet_origin};
use tablec_model::{Diagnostic, DiagnosticCode, Result, Schema, SheetKind, ValueOverlay};
use tablec_validate::{ValidationContext, ValidationTarget, validate_table};

use crate::context::RunContext;
use crate::merge::{MergeOutcome, merge_group};
use crate::pool::{Phase, ProgressObserver, WorkerPool};
use crate::shard::partition;
use crate::state::CompileState;

/// Last stage a run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Ingest,
    References,
    Merge,
    Validate,
    Emit,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::References => "references",
            Stage::Merge => "merge",
            Stage::Validate => "validate",
            Stage::Emit => "emit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loaded table as shown in run summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub name: String,
    pub kind: SheetKind,
    /// Workbook, or the merge group's first workbook.
    pub file: String,
    pub rows: usize,
    pub exported_columns: usize,
    /// Shard files, zero for unsharded tables.
    pub shards: usize,
    pub reference_only: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub tables: Vec<TableReport>,
    pub files: Vec<EmittedFile>,
    /// The stage the run ended in.
    pub stage: Stage,
    pub enum_groups: usize,
    pub localization_keys: usize,
    pub duration: Duration,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

type ChangedColumns = HashMap<String, BTreeSet<usize>>;

/// A sheet of a workbook, the unit of ingestion work.
#[derive(Debug, Clone, Copy)]
struct SheetTask {
    workbook: usize,
    sheet: usize,
}

/// Runs every stage of a compile.
///
/// Returns `Err` only for failures of the compiler itself; problems in
/// the workbooks come back as diagnostics in the outcome.
pub fn run(ctx: &RunContext, observer: &dyn ProgressObserver) -> Result<RunOutcome> {
    let started = Instant::now();
    let span = info_span!(
        "run",
        workbooks = ctx.workbooks.len(),
        selected = ctx.selected.len(),
        dry_run = ctx.dry_run
    );
    let _guard = span.enter();

    let coordinator = Coordinator {
        ctx,
        pool: WorkerPool::new(ctx.options.worker_cap()),
        merge_groups: ctx.catalog.merge_group_names(),
        observer,
    };
    let mut state = CompileState::new();

    coordinator.ingest_round(Phase::Ingest, &ctx.selected, false, &mut state)?;
    if state.has_diagnostics() {
        return Ok(finish(state, Vec::new(), Stage::Ingest, started));
    }

    let extra = reference_workbooks(ctx, &mut state);
    if state.has_diagnostics() {
        return Ok(finish(state, Vec::new(), Stage::References, started));
    }
    coordinator.ingest_round(Phase::References, &extra, true, &mut state)?;
    if state.has_diagnostics() {
        return Ok(finish(state, Vec::new(), Stage::References, started));
    }

    build_merges(&mut state);
    if state.has_diagnostics() {
        return Ok(finish(state, Vec::new(), Stage::Merge, started));
    }

    let (overlay, changed) = coordinator.validate(&mut state)?;
    if state.has_diagnostics() {
        return Ok(finish(state, Vec::new(), Stage::Validate, started));
    }

    let files = if ctx.dry_run {
        info!("dry run, skipping emission");
        Vec::new()
    } else {
        emit(ctx, &state, &overlay, &changed)?
    };
    Ok(finish(state, files, Stage::Emit, started))
}

/// Owns the worker pool and fans each parallel phase out over it.
struct Coordinator<'a> {
    ctx: &'a RunContext,
    pool: WorkerPool,
    merge_groups: HashSet<String>,
    observer: &'a dyn ProgressObserver,
}

impl Coordinator<'_> {
    /// Ingests every sheet of `workbooks` and folds the results in order.
    fn ingest_round(
        &self,
        phase: Phase,
        workbooks: &[String],
        reference_only: bool,
        state: &mut CompileState,
    ) -> Result<()> {
        let span = info_span!("phase", phase = phase.as_str());
        let _guard = span.enter();
        let started = Instant::now();
        let ctx = self.ctx;
        let merge_groups = &self.merge_groups;

        let mut tasks = Vec::new();
        for name in workbooks {
            let Some(workbook) = ctx.workbook_index(name) else {
                continue;
            };
            state.mark_loaded(name);
            for sheet in 0..ctx.workbooks[workbook].sheets.len() {
                tasks.push(SheetTask { workbook, sheet });
            }
        }

        let results = self.pool.run(phase, &tasks, self.observer, |task| {
            let workbook = &ctx.workbooks[task.workbook];
            let sheet = &workbook.sheets[task.sheet];
            ingest_sheet(sheet, sheet_origin(workbook, &sheet.name), merge_groups)
        })?;

        let mut tables = 0;
        for ingested in results.into_iter().flatten() {
            state.absorb(ingested, reference_only);
            tables += 1;
        }
        info!(
            phase = phase.as_str(),
            workbooks = workbooks.len(),
            sheets = tasks.len(),
            tables,
            diagnostics = state.diagnostics.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "phase complete"
        );
        Ok(())
    }

    /// Validates every selected data table and merge table.
    fn validate(&self, state: &mut CompileState) -> Result<(ValueOverlay, ChangedColumns)> {
        let span = info_span!("phase", phase = Phase::Validate.as_str());
        let _guard = span.enter();
        let started = Instant::now();

        let targets: Vec<ValidationTarget<'_>> = state
            .tables
            .iter()
            .filter(|table| !table.reference_only && table.schema.kind == SheetKind::Data)
            .map(|table| ValidationTarget::Sheet {
                schema: &table.schema,
                table: &table.table,
            })
            .chain(
                state
                    .merges
                    .iter()
                    .filter(|merge| !merge.reference_only)
                    .map(ValidationTarget::Merge),
            )
            .collect();
        let context = ValidationContext {
            enums: &state.enums,
            localization: &state.localization,
            references: &state.references,
            array_sizes: &state.array_sizes,
        };
        let results = self.pool.run(Phase::Validate, &targets, self.observer, |target| {
            validate_table(*target, context)
        })?;

        let mut overlay = ValueOverlay::new();
        let mut changed = ChangedColumns::new();
        let mut diagnostics = Vec::new();
        for result in results {
            diagnostics.extend(result.diagnostics);
            overlay.merge_from(result.overlay);
            changed.insert(result.table, result.changed);
        }
        info!(
            tables = targets.len(),
            diagnostics = diagnostics.len(),
            overrides = overlay.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "phase complete"
        );
        state.diagnostics.extend(diagnostics);
        Ok((overlay, changed))
    }
}

/// Workbooks the loaded tables reference but the selection left out.
///
/// Check targets naming no known sheet are reported on the state.
fn reference_workbooks(ctx: &RunContext, state: &mut CompileState) -> Vec<String> {
    let mut wanted: Vec<String> = Vec::new();
    let mut found = Vec::new();
    {
        let mut want = |name: &str| {
            if !state.is_loaded(name) && !wanted.iter().any(|known| known == name) {
                wanted.push(name.to_string());
            }
        };
        let schemas: Vec<&Schema> = state
            .tables
            .iter()
            .map(|table| &table.schema)
            .chain(state.merge_sheets.iter().map(|pending| &pending.sheet.schema))
            .collect();

        if schemas.iter().any(|schema| schema.needs.enums) && !state.has_kind(SheetKind::Type) {
            ctx.catalog.workbooks_of_kind(SheetKind::Type).into_iter().for_each(&mut want);
        }
        if schemas.iter().any(|schema| schema.needs.localtext)
            && !state.has_kind(SheetKind::LocalText)
        {
            ctx.catalog
                .workbooks_of_kind(SheetKind::LocalText)
                .into_iter()
                .for_each(&mut want);
        }
        for schema in &schemas {
            for group in &schema.needs.merges {
                if !state.has_merge_group(group) {
                    ctx.catalog.workbooks_in_group(group).into_iter().for_each(&mut want);
                }
            }
            for table in &schema.needs.tables {
                if state.has_table(table) {
                    continue;
                }
                match ctx.catalog.workbook_of_sheet(table) {
                    Some(workbook) => want(workbook),
                    None => found.push(unknown_reference(schema, table)),
                }
            }
        }
    }
    state.diagnostics.extend(found);
    wanted
}

fn unknown_reference(schema: &Schema, table: &str) -> Diagnostic {
    let column = schema
        .columns
        .iter()
        .find(|column| column.check.as_ref().is_some_and(|target| target.table == table));
    Diagnostic::at(
        DiagnosticCode::UnknownTableReference,
        &schema.origin,
        column.map_or("", |column| column.title.as_str()),
        PARAM_ROW,
        column.map_or(0, |column| column.grid_column),
        format!("check target {table} is not a known table"),
    )
}

fn build_merges(state: &mut CompileState) {
    let span = info_span!("phase", phase = "merge");
    let _guard = span.enter();
    let started = Instant::now();

    for group in state.merge_group_order() {
        let pending = state.sheets_of_group(&group);
        let reference_only = pending.iter().all(|sheet| sheet.reference_only);
        let sheets: Vec<&IngestedSheet> = pending.iter().map(|sheet| &sheet.sheet).collect();
        let Some(outcome) = merge_group(&group, &sheets, reference_only) else {
            continue;
        };
        let MergeOutcome {
            mut merge,
            diagnostics,
            array_sizes,
            origins,
        } = outcome;
        state.diagnostics.extend(diagnostics);
        if merge.shard_size > 0 && !merge.reference_only {
            match partition(&merge) {
                Ok(plan) => merge.shards = Some(plan),
                Err(found) => state.diagnostics.extend(found),
            }
        }
        state.references.merge_from(origins);
        state.array_sizes.merge_from(array_sizes);
        state.merges.push(merge);
    }
    info!(
        merges = state.merges.len(),
        diagnostics = state.diagnostics.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "phase complete"
    );
}

fn emit(
    ctx: &RunContext,
    state: &CompileState,
    overlay: &ValueOverlay,
    changed: &ChangedColumns,
) -> Result<Vec<EmittedFile>> {
    let unchanged = BTreeSet::new();
    let changed_of = |name: &str| changed.get(name).unwrap_or(&unchanged);
    let tables = state
        .tables
        .iter()
        .filter(|table| {
            !table.reference_only && matches!(table.schema.kind, SheetKind::Data | SheetKind::Type)
        })
        .map(|table| EmitTable::new(&table.schema, &table.table, changed_of(&table.schema.name)))
        .chain(
            state
                .merges
                .iter()
                .filter(|merge| !merge.reference_only)
                .map(|merge| EmitTable::merged(merge, changed_of(&merge.name))),
        )
        .collect();
    let input = EmitInput {
        tables,
        overlay,
        enums: &state.enums,
        localization: &state.localization,
    };
    emit_all(&input, &ctx.options)
}

fn finish(state: CompileState, files: Vec<EmittedFile>, stage: Stage, started: Instant) -> RunOutcome {
    let mut tables: Vec<TableReport> = state
        .tables
        .iter()
        .map(|table| TableReport {
            name: table.schema.name.clone(),
            kind: table.schema.kind,
            file: table.schema.origin.file.clone(),
            rows: table.table.len(),
            exported_columns: table.schema.exported_slots().count(),
            shards: 0,
            reference_only: table.reference_only,
        })
        .collect();
    tables.extend(state.merges.iter().map(|merge| TableReport {
        name: merge.name.clone(),
        kind: SheetKind::Merge,
        file: merge.schema.origin.file.clone(),
        rows: merge.table.len(),
        exported_columns: merge.schema.exported_slots().count(),
        shards: merge.shards.as_ref().map_or(0, |plan| plan.shards.len()),
        reference_only: merge.reference_only,
    }));

    let duration = started.elapsed();
    if state.diagnostics.is_empty() {
        info!(
            %stage,
            tables = tables.len(),
            files = files.len(),
            duration_ms = duration.as_millis() as u64,
            "run complete"
        );
    } else {
        warn!(
            %stage,
            diagnostics = state.diagnostics.len(),
            duration_ms = duration.as_millis() as u64,
            "run stopped with diagnostics"
        );
    }
    RunOutcome {
        enum_groups: state.enums.groups().len(),
        localization_keys: state.localization.key_count(),
        diagnostics: state.diagnostics,
        tables,
        files,
        stage,
        duration,
    }
}
