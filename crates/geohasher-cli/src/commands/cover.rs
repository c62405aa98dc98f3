//! Cover command implementation

use crate::cli::CoverArgs;
use crate::config_loader::{load_config, load_config_with_overrides};
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::errors;
use crate::interactive::interactive_cover;
use crate::output::OutputWriter;
use crate::output_types::CoverOutput;
use crate::progress::CoverProgress;
use anyhow::{Context, Result};
use geohasher_core::config::CliConfigOverrides;
use geohasher_core::formats::FormatRegistry;
use geohasher_core::sink::CsvSink;
use geohasher_pipeline::{BatchOptions, BatchProcessor, BatchReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::Tabled;

pub async fn execute(
    args: CoverArgs,
    output: &OutputWriter,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<ExitCode> {
    if !args.input.exists() {
        return Err(errors::input_not_found(&args.input.display().to_string()).into());
    }

    let mut overrides = CliConfigOverrides {
        precision: args.precision,
        policy: args.policy,
        max_cells: args.max_cells,
        dedup: args.dedup.then_some(true),
        stop_on_error: args.stop_on_error.then_some(true),
        parallel: args.sequential.then_some(false),
    };
    let mut output_path = args.output.clone().unwrap_or_else(|| default_output(&args.input));

    if args.interactive {
        let current = load_config(config_path)?;
        let default_output = output_path.display().to_string();
        match interactive_cover(current.precision.value, current.policy.value, &default_output)? {
            Some(choice) => {
                overrides.precision = Some(choice.precision);
                overrides.policy = Some(choice.policy);
                output_path = choice.output;
            }
            None => {
                output.info("Cancelled");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    let config = load_config_with_overrides(config_path, overrides)?;
    let options = BatchOptions::from_config(&config);

    let mut progress = CoverProgress::new(!output.is_json());
    let input_display = args.input.display().to_string();

    progress.start_read(&input_display);
    let registry = FormatRegistry::with_defaults();
    let layer = match registry.read_layer(&args.input).await {
        Ok(layer) => layer,
        Err(e) => {
            progress.abandon();
            return Err(anyhow::Error::from(e)
                .context(format!("Failed to read layer {}", input_display)));
        }
    };
    progress.finish_read(layer.len(), layer.fields.len());

    if dry_run {
        let actions = plan(&args.input, &output_path, layer.len(), &options);
        display_planned_actions(output, &actions)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Coverage is CPU bound and fans out over rayon
    let bar = progress.start_cover(layer.len());
    let processor = BatchProcessor::new(options.clone());
    let report = tokio::task::spawn_blocking(move || {
        processor.run_with_progress(&layer, |_| {
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        })
    })
    .await
    .context("Coverage worker panicked")??;
    progress.finish_cover(report.summary.total_cells, report.summary.failed);

    if options.stop_on_error {
        if let Some(first) = report.first_failure() {
            if let Some(err) = first.error() {
                let message = format!(
                    "Stopped at feature {} (index {}): {}",
                    first.feature_id, first.index, err
                );
                if output.is_json() {
                    output.result(summary_output(&args.input, None, &options, &report, 0))?;
                }
                errors::from_geohasher(err).with_context(message).display();
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let output_display = output_path.display().to_string();
    progress.start_write(&output_display);
    let written = match write_report(&report, &output_path) {
        Ok(written) => written,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };
    progress.finish_write(written);

    if output.is_json() {
        output.result(summary_output(&args.input, Some(&output_path), &options, &report, written))?;
    } else {
        print_summary(output, &report, &output_path, written);
    }

    Ok(ExitCode::SUCCESS)
}

/// `<input stem>.csv` next to the input
fn default_output(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

fn write_report(report: &BatchReport, path: &Path) -> Result<usize> {
    let mut sink = CsvSink::create(path)?;
    let written = report.write_to(&mut sink)?;
    Ok(written)
}

fn plan(
    input: &Path,
    output_path: &Path,
    features: usize,
    options: &BatchOptions,
) -> Vec<PlannedAction> {
    vec![
        PlannedAction::new(ActionType::ReadLayer, format!("Read {}", input.display()))
            .with_detail(format!("Features: {}", features)),
        PlannedAction::new(ActionType::CoverFeatures, format!("Cover {} features", features))
            .with_detail(format!("Precision: {}", options.precision))
            .with_detail(format!("Policy: {}", options.policy))
            .with_detail(format!("Max cells per feature: {}", options.max_cells))
            .with_detail(format!("Dedup: {}", options.dedup))
            .with_detail(format!("Parallel: {}", options.parallel)),
        PlannedAction::new(ActionType::WriteFile, format!("Write {}", output_path.display())),
    ]
}

fn summary_output(
    input: &Path,
    output_path: Option<&Path>,
    options: &BatchOptions,
    report: &BatchReport,
    written: usize,
) -> CoverOutput {
    CoverOutput {
        input: input.display().to_string(),
        output: output_path.map(|p| p.display().to_string()),
        precision: options.precision,
        policy: options.policy,
        rows_written: written,
        summary: report.summary.clone(),
        failures: report.failures(),
    }
}

fn print_summary(output: &OutputWriter, report: &BatchReport, output_path: &Path, written: usize) {
    let summary = &report.summary;

    output.section("Coverage Summary");
    output.kv("Features", summary.total_features);
    output.kv("Succeeded", summary.succeeded);
    output.kv("Failed", summary.failed);
    if summary.cancelled > 0 {
        output.kv("Cancelled", summary.cancelled);
    }
    output.kv("Cells", summary.total_cells);
    output.kv("Cells visited", summary.cells_visited);
    if summary.duplicates_removed > 0 {
        output.kv("Duplicates removed", summary.duplicates_removed);
    }

    let failures = report.failures();
    if !failures.is_empty() {
        output.section("Failed Features");

        #[derive(Tabled)]
        struct FailureRow {
            #[tabled(rename = "Feature")]
            feature_id: String,
            #[tabled(rename = "Kind")]
            kind: String,
            #[tabled(rename = "Message")]
            message: String,
        }

        let rows: Vec<FailureRow> = failures
            .into_iter()
            .map(|f| FailureRow {
                feature_id: f.feature_id,
                kind: f.kind.to_string(),
                message: f.message,
            })
            .collect();
        output.table(rows);
    }

    if written == 0 {
        output.warning(format!("No cells matched; {} is empty", output_path.display()));
    } else {
        output.success(format!("Wrote {} rows to {}", written, output_path.display()));
    }
}
