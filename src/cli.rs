//! Command-line interface for training and prediction

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::data::{load_csv, FeatureVector, FEATURE_COLUMNS};
use crate::inference::HybridPredictor;
use crate::training::{TrainingConfig, TrainingPipeline};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gradecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Student result prediction with a hybrid model ensemble")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train all catalog models and persist the artifact set
    Train {
        /// Student dataset (CSV with the five standard columns)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory to write the artifact set into
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,

        /// Fraction of rows used for training
        #[arg(long, default_value = "0.8")]
        split_ratio: f64,

        /// Seed for the train/test shuffle
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict a student's final marks from a trained artifact set
    Predict {
        /// Directory holding a saved artifact set
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Daily study hours (0-12)
        #[arg(long)]
        study_hours: f64,

        /// Attendance percentage (0-100)
        #[arg(long)]
        attendance: f64,

        /// Internal marks (0-50)
        #[arg(long)]
        internal: f64,

        /// Assignment score (0-20)
        #[arg(long)]
        assignment: f64,
    },

    /// Show dataset shape and column summary
    Info {
        /// Student dataset (CSV)
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &PathBuf,
    output: &PathBuf,
    split_ratio: f64,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = load_csv(data_path)?;
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.n_rows(),
        dataset.n_features(),
        start.elapsed()
    ));

    let config = TrainingConfig::new()
        .with_split_ratio(split_ratio)
        .with_seed(seed);
    let pipeline = TrainingPipeline::new(config);

    step_run("Training model catalog");
    let start = Instant::now();
    let artifacts = pipeline.train(&dataset)?;
    step_done(&format!("{} models in {:?}", artifacts.models().len(), start.elapsed()));

    println!();
    println!(
        "  {:<20} {}",
        muted("Model").to_string(),
        muted("R²")
    );
    let mut ranked: Vec<(&String, f64)> = artifacts
        .models()
        .iter()
        .map(|(name, _)| (name, artifacts.score(name).unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, score) in ranked {
        let marker = if artifacts.top_models().iter().any(|n| n == name) {
            ok("●").to_string()
        } else {
            dim("○").to_string()
        };
        println!("  {marker} {:<18} {:.4}", name, score);
    }

    println!();
    println!(
        "  {} ensemble: {}",
        ok("✓"),
        artifacts.top_models().join(", ").cyan()
    );

    step_run("Saving artifacts");
    artifacts.save(output)?;
    step_done(&format!("{}", output.display()));
    println!();

    Ok(())
}

pub fn cmd_predict(
    artifact_dir: &PathBuf,
    study_hours: f64,
    attendance: f64,
    internal: f64,
    assignment: f64,
) -> anyhow::Result<()> {
    section("Predict");

    let predictor = HybridPredictor::load(artifact_dir)?;
    let request = FeatureVector::new(study_hours, attendance, internal, assignment);

    let records = predictor.predict_all(&request)?;
    let hybrid = predictor.predict_hybrid(&request)?;

    println!();
    println!(
        "  {:<20} {:>10} {:>8} {:>8}",
        muted("Model"),
        muted("Marks"),
        muted("Result"),
        muted("R²")
    );
    for record in &records {
        let result = if record.pass {
            ok("PASS").to_string()
        } else {
            "FAIL".red().to_string()
        };
        println!(
            "  {:<20} {:>10.2} {:>8} {:>8.4}",
            record.model, record.predicted_marks, result, record.r2
        );
    }

    println!();
    println!(
        "  {} hybrid score (top {} ensemble): {}",
        ok("✓"),
        predictor.artifacts().top_models().len(),
        format!("{hybrid:.2}").white().bold()
    );
    println!();

    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Info");

    let dataset = load_csv(data_path)?;
    println!();
    println!("  {:<16} {}", muted("Rows"), dataset.n_rows());
    println!("  {:<16} {}", muted("Features"), dataset.n_features());
    println!();

    println!(
        "  {:<24} {:>10} {:>10} {:>10}",
        muted("Column"),
        muted("Min"),
        muted("Mean"),
        muted("Max")
    );
    for (idx, name) in FEATURE_COLUMNS.into_iter().enumerate() {
        let col = dataset.features().column(idx);
        print_summary(name, col.iter().copied());
    }
    print_summary("Final_Marks", dataset.targets().iter().copied());
    println!();

    Ok(())
}

fn print_summary(name: &str, values: impl Iterator<Item = f64>) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    println!("  {name:<24} {min:>10.2} {mean:>10.2} {max:>10.2}");
}
