//! Chart Path Classification Runner
//!
//! Classifies the raw vector paths of one or more chart regions from a
//! JSON dump and prints a per-chart summary of the reconstruction.
//!
//! Usage:
//!   cargo run --bin classify_paths -- input.json
//!   cargo run --bin classify_paths -- input.json --output result.json
//!   cargo run --bin classify_paths -- input.json --verbose

use chart_oxide::geometry::{Line, RawPath, Rect};
use chart_oxide::{Chart, ChartType, ClassifierConfig, Legend, PathClassifier, PathKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// One chart region of the input dump: the page-decomposition output the
/// engine consumes.
#[derive(Debug, Deserialize)]
struct ChartInput {
    area: Rect,
    #[serde(default)]
    h_axis: Option<Line>,
    #[serde(default)]
    lv_axis: Option<Line>,
    #[serde(default)]
    rv_axis: Option<Line>,
    #[serde(default)]
    legends: Vec<Legend>,
    #[serde(default)]
    text_boxes: Vec<Rect>,
    paths: Vec<RawPath>,
}

#[derive(Debug, Serialize)]
struct ChartResult {
    kind: ChartType,
    records: usize,
    pies: usize,
    classify_time_ms: u128,
    chart: Chart,
}

struct RunnerConfig {
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    verbose: bool,
}

impl RunnerConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut input_file = None;
        let mut output_file = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" => {
                    i += 1;
                    if i < args.len() {
                        output_file = Some(PathBuf::from(&args[i]));
                    }
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                other => {
                    if input_file.is_none() {
                        input_file = Some(PathBuf::from(other));
                    }
                }
            }
            i += 1;
        }

        Self {
            input_file,
            output_file,
            verbose,
        }
    }
}

fn classify_input(input: ChartInput, classifier: &PathClassifier) -> ChartResult {
    let mut chart = Chart::new(input.area);
    chart.h_axis = input.h_axis;
    chart.lv_axis = input.lv_axis;
    chart.rv_axis = input.rv_axis;
    chart.legends = input.legends;
    chart.text_boxes = input.text_boxes;

    let start = Instant::now();
    classifier.classify_chart(&mut chart, &input.paths);
    let classify_time_ms = start.elapsed().as_millis();

    ChartResult {
        kind: chart.kind,
        records: chart.path_infos.len(),
        pies: chart.pies.len(),
        classify_time_ms,
        chart,
    }
}

fn kind_counts(chart: &Chart) -> Vec<(PathKind, usize)> {
    let mut counts: Vec<(PathKind, usize)> = Vec::new();
    for info in &chart.path_infos {
        match counts.iter_mut().find(|(k, _)| *k == info.kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((info.kind, 1)),
        }
    }
    counts
}

fn main() -> ExitCode {
    env_logger::init();
    let config = RunnerConfig::from_args();

    let input_path = match &config.input_file {
        Some(p) => p.clone(),
        None => {
            eprintln!("usage: classify_paths <input.json> [--output result.json] [--verbose]");
            return ExitCode::FAILURE;
        }
    };

    let text = match fs::read_to_string(&input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("failed to read {}: {}", input_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // accept a single chart object or an array of them
    let inputs: Vec<ChartInput> = match serde_json::from_str::<Vec<ChartInput>>(&text) {
        Ok(list) => list,
        Err(_) => match serde_json::from_str::<ChartInput>(&text) {
            Ok(single) => vec![single],
            Err(e) => {
                eprintln!("failed to parse {}: {}", input_path.display(), e);
                return ExitCode::FAILURE;
            }
        },
    };

    let classifier = PathClassifier::new(ClassifierConfig::new());
    let mut results = Vec::with_capacity(inputs.len());

    println!("Classifying {} chart region(s)", inputs.len());
    println!("{}", "=".repeat(60));
    for (i, input) in inputs.into_iter().enumerate() {
        let n_paths = input.paths.len();
        let result = classify_input(input, &classifier);
        println!(
            "chart {:3}: {:?} | {} paths in -> {} records, {} pies ({} ms)",
            i, result.kind, n_paths, result.records, result.pies, result.classify_time_ms
        );
        if config.verbose {
            for (kind, n) in kind_counts(&result.chart) {
                println!("           {:?} x{}", kind, n);
            }
            for info in &result.chart.path_infos {
                if !info.label.is_empty() {
                    println!("           label {:?} ({:?})", info.label, info.side_y);
                }
            }
        }
        results.push(result);
    }
    println!("{}", "=".repeat(60));
    let typed = results
        .iter()
        .filter(|r| r.kind != ChartType::Unknown)
        .count();
    println!("{}/{} regions reconstructed", typed, results.len());

    if let Some(output) = &config.output_file {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => {
                if let Err(e) = fs::write(output, json) {
                    eprintln!("failed to write {}: {}", output.display(), e);
                    return ExitCode::FAILURE;
                }
                println!("results written to {}", output.display());
            }
            Err(e) => {
                eprintln!("failed to serialize results: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
