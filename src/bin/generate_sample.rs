use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic production dataset as Parquet and CSV.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of records to generate
    #[arg(long, default_value_t = 365)]
    rows: usize,

    /// PRNG seed; the same seed always yields the same files
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory receiving production.parquet and production.csv
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
}

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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

/// Column-wise buffers in record field order.
#[derive(Default)]
struct Columns {
    date: Vec<NaiveDate>,
    production: Vec<f64>,
    cost: Vec<f64>,
    energy: Vec<f64>,
    employees: Vec<i64>,
    equipment: Vec<String>,
    hours: Vec<f64>,
    sales: Vec<f64>,
    revenue: Vec<f64>,
    profit: Vec<f64>,
    quality: Vec<i64>,
    satisfaction: Vec<i64>,
    id: Vec<i64>,
}

const EQUIPMENT: [&str; 4] = ["Press", "Lathe", "Furnace", "Conveyor"];
const EMPLOYEES: [i64; 4] = [8, 12, 16, 20];

fn generate(rows: usize, rng: &mut SimpleRng) -> Result<Columns> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let mut cols = Columns::default();

    for i in 0..rows {
        let equipment = EQUIPMENT[rng.range(0, EQUIPMENT.len() as i64 - 1) as usize];
        let employees = EMPLOYEES[rng.range(0, EMPLOYEES.len() as i64 - 1) as usize];
        let hours = rng.gauss(8.0, 1.0).clamp(4.0, 12.0);
        let quality = rng.range(1, 5);

        // Output scales with head count and hours; quality nudges it up.
        let production =
            (employees as f64 * hours * rng.gauss(1000.0, 120.0) * (0.9 + 0.05 * quality as f64))
                .max(0.0)
                .round();
        let cost = (production * rng.gauss(0.6, 0.05)).round();
        let energy = (production * rng.gauss(0.02, 0.003)).max(0.0).round();
        let sales = (production * rng.gauss(0.95, 0.03)).round();
        let revenue = (sales * 1.4).round();
        let satisfaction = (quality + rng.range(-1, 1)).clamp(1, 5);

        cols.date.push(start + Duration::days(i as i64));
        cols.production.push(production);
        cols.cost.push(cost);
        cols.energy.push(energy);
        cols.employees.push(employees);
        cols.equipment.push(equipment.to_string());
        cols.hours.push((hours * 10.0).round() / 10.0);
        cols.sales.push(sales);
        cols.revenue.push(revenue);
        cols.profit.push(revenue - cost);
        cols.quality.push(quality);
        cols.satisfaction.push(satisfaction);
        cols.id.push(i as i64 + 1);
    }
    Ok(cols)
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let days: Vec<i32> = cols
        .date
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("Date", Arc::new(Date32Array::from(days))),
        ("Production", Arc::new(Float64Array::from(cols.production.clone()))),
        ("Cost", Arc::new(Float64Array::from(cols.cost.clone()))),
        ("Energy", Arc::new(Float64Array::from(cols.energy.clone()))),
        ("Nemploye", Arc::new(Int64Array::from(cols.employees.clone()))),
        (
            "Equipment",
            Arc::new(StringArray::from(
                cols.equipment.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        ),
        ("Hours", Arc::new(Float64Array::from(cols.hours.clone()))),
        ("Sales", Arc::new(Float64Array::from(cols.sales.clone()))),
        ("Revenue", Arc::new(Float64Array::from(cols.revenue.clone()))),
        ("Profit", Arc::new(Float64Array::from(cols.profit.clone()))),
        ("Quality", Arc::new(Int64Array::from(cols.quality.clone()))),
        ("Satisfaction", Arc::new(Int64Array::from(cols.satisfaction.clone()))),
        ("id", Arc::new(Int64Array::from(cols.id.clone()))),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    RecordBatch::try_new(schema, columns.into_iter().map(|(_, a)| a).collect())
        .context("Failed to create RecordBatch")
}

fn write_csv(path: &std::path::Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).context("Failed to create CSV file")?;
    // arrow's CSV writer renders Date32 as YYYY-MM-DD and floats without exponents.
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(batch).context("Failed to write CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let cols = generate(args.rows, &mut rng)?;
    let batch = to_batch(&cols)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    // Write Parquet
    let parquet_path = args.out_dir.join("production.parquet");
    let file = std::fs::File::create(&parquet_path).context("Failed to create output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    // Write CSV
    let csv_path = args.out_dir.join("production.csv");
    write_csv(&csv_path, &batch)?;

    log::info!("Generated {} records with seed {}", args.rows, args.seed);
    println!(
        "Wrote {} records to {} and {}",
        args.rows,
        parquet_path.display(),
        csv_path.display()
    );
    Ok(())
}
