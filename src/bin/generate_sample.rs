use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 120;
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

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

    /// `Some(value)` except for roughly `missing_rate` of the calls.
    fn sometimes(&mut self, value: f64, missing_rate: f64) -> Option<f64> {
        (self.next_f64() >= missing_rate).then_some(value)
    }
}

/// One generated record.
struct Record {
    label: String,
    region: &'static str,
    sales: Option<f64>,
    visitors: Option<f64>,
    returns: Option<f64>,
    temperature: Option<f64>,
    baseline: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Record> {
    (0..ROWS)
        .map(|i| {
            let visitors = rng.gauss(1000.0, 200.0).max(0.0);
            // Sales follow visitors, returns move against sales.
            let sales = 12.0 * visitors + rng.gauss(0.0, 800.0);
            let returns = 5000.0 - 0.2 * sales + rng.gauss(0.0, 300.0);
            let temperature = rng.gauss(15.0, 8.0);
            Record {
                label: format!("Week {}", i + 1),
                region: REGIONS[i % REGIONS.len()],
                sales: rng.sometimes(sales.round(), 0.05),
                visitors: rng.sometimes(visitors.round(), 0.05),
                returns: rng.sometimes(returns.round(), 0.1),
                temperature: rng.sometimes((temperature * 10.0).round() / 10.0, 0.02),
                baseline: 100.0,
            }
        })
        .collect()
}

fn write_csv(records: &[Record], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Week", "Region", "Sales", "Visitors", "Returns", "Temperature", "Baseline",
    ])?;
    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for (i, r) in records.iter().enumerate() {
        // A few hand-typed annotations where numbers are expected.
        let visitors = if i % 37 == 5 {
            "n/a".to_string()
        } else {
            cell(r.visitors)
        };
        wtr.write_record([
            r.label.clone(),
            r.region.to_string(),
            cell(r.sales),
            visitors,
            cell(r.returns),
            cell(r.temperature),
            r.baseline.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(records: &[Record], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Week", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Sales", DataType::Float64, true),
        Field::new("Visitors", DataType::Float64, true),
        Field::new("Returns", DataType::Float64, true),
        Field::new("Temperature", DataType::Float64, true),
        Field::new("Baseline", DataType::Float64, false),
    ]));

    let floats = |f: fn(&Record) -> Option<f64>| -> ArrayRef {
        Arc::new(records.iter().map(f).collect::<Float64Array>())
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.label.as_str()))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.region))),
        floats(|r| r.sales),
        floats(|r| r.visitors),
        floats(|r| r.returns),
        floats(|r| r.temperature),
        floats(|r| Some(r.baseline)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    write_csv(&records, "sample_correlation.csv")?;
    write_parquet(&records, "sample_correlation.parquet")?;

    println!(
        "Wrote {} rows to sample_correlation.csv and sample_correlation.parquet",
        records.len()
    );
    Ok(())
}
