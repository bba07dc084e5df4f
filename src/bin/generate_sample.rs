//! Writes a small PEtab problem (conditions, measurements, simulation and a
//! visualization table) for trying out `petab-plot`.
//!
//! Usage: `generate_sample [output-dir]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Two-state conversion A -> B with rate `k * dose`.
fn model(observable: &str, dose: f64, t: f64) -> f64 {
    let a = (-0.3 * dose * t).exp();
    match observable {
        "obs_a" => 10.0 * a,
        _ => 10.0 * (1.0 - a),
    }
}

struct MeasurementRow {
    observable: String,
    condition: String,
    time: f64,
    measurement: f64,
    simulation: f64,
    noise: f64,
    dataset: String,
}

fn write_tsv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[MeasurementRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("observableId", DataType::Utf8, false),
        Field::new("simulationConditionId", DataType::Utf8, false),
        Field::new("time", DataType::Float64, false),
        Field::new("measurement", DataType::Float64, false),
        Field::new("noiseParameters", DataType::Float64, false),
        Field::new("datasetId", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.observable.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.condition.as_str()))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.time))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.measurement))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.noise))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.dataset.as_str()))),
        ],
    )
    .context("building measurement batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_petab"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let conditions = [("low", 0.5), ("mid", 1.0), ("high", 2.0)];
    let observables = ["obs_a", "obs_b"];
    let times = [0.0, 1.0, 2.0, 4.0, 8.0];
    let replicates = 3;
    let noise = 0.4;

    let mut rows = Vec::new();
    for &(condition, dose) in &conditions {
        for observable in observables {
            let dataset = format!("{observable}_{condition}");
            for &t in &times {
                let simulation = model(observable, dose, t);
                for _ in 0..replicates {
                    rows.push(MeasurementRow {
                        observable: observable.to_string(),
                        condition: condition.to_string(),
                        time: t,
                        measurement: simulation + rng.gauss(0.0, noise),
                        simulation,
                        noise,
                        dataset: dataset.clone(),
                    });
                }
            }
        }
    }

    let condition_rows: Vec<Vec<String>> = conditions
        .iter()
        .map(|(id, dose)| vec![id.to_string(), dose.to_string()])
        .collect();
    write_tsv(&out_dir.join("conditions.tsv"), &["conditionId", "dose"], &condition_rows)?;

    let measurement_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.observable.clone(),
                r.condition.clone(),
                r.time.to_string(),
                r.measurement.to_string(),
                r.noise.to_string(),
                r.dataset.clone(),
            ]
        })
        .collect();
    write_tsv(
        &out_dir.join("measurements.tsv"),
        &["observableId", "simulationConditionId", "time", "measurement", "noiseParameters", "datasetId"],
        &measurement_rows,
    )?;

    let simulation_rows: Vec<Vec<String>> = rows
        .iter()
        .step_by(replicates)
        .map(|r| {
            vec![
                r.observable.clone(),
                r.condition.clone(),
                r.time.to_string(),
                r.simulation.to_string(),
                r.dataset.clone(),
            ]
        })
        .collect();
    write_tsv(
        &out_dir.join("simulation.tsv"),
        &["observableId", "simulationConditionId", "time", "simulation", "datasetId"],
        &simulation_rows,
    )?;

    let vis_header = [
        "plotId", "plotName", "plotTypeSimulation", "plotTypeData", "datasetId", "xValues",
        "xScale", "yScale", "legendEntry",
    ];
    let mut vis_rows: Vec<Vec<String>> = Vec::new();
    for &(condition, _) in &conditions {
        vis_rows.push(
            ["time_course", "Time course of A", "LinePlot", "MeanAndSD"]
                .iter()
                .map(|s| s.to_string())
                .chain([
                    format!("obs_a_{condition}"),
                    "time".to_string(),
                    "lin".to_string(),
                    "log10".to_string(),
                    format!("A, {condition} dose"),
                ])
                .collect(),
        );
        vis_rows.push(
            ["replicates_b", "Replicates of B", "LinePlot", "replicate"]
                .iter()
                .map(|s| s.to_string())
                .chain([
                    format!("obs_b_{condition}"),
                    "time".to_string(),
                    "lin".to_string(),
                    "lin".to_string(),
                    format!("B, {condition} dose"),
                ])
                .collect(),
        );
        vis_rows.push(
            ["fit", "Data vs. simulation", "ScatterPlot", "MeanAndSD"]
                .iter()
                .map(|s| s.to_string())
                .chain([
                    format!("obs_a_{condition}"),
                    "time".to_string(),
                    "lin".to_string(),
                    "lin".to_string(),
                    format!("A, {condition} dose"),
                ])
                .collect(),
        );
    }
    write_tsv(&out_dir.join("visualization.tsv"), &vis_header, &vis_rows)?;

    write_parquet(&out_dir.join("measurements.parquet"), &rows)?;

    println!(
        "Wrote {} measurements for {} conditions to {}",
        rows.len(),
        conditions.len(),
        out_dir.display()
    );
    Ok(())
}
