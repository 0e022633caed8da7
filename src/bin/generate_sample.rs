use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use deorbit_report::data::model::{
    DeorbitRecord, ALTITUDE_KM, DECAY_TIME_YEARS, DELTA_V_MS, ESA_COMPLIANT,
};
use deorbit_report::render::scene::ESA_LIMIT_YEARS;

/// Representative LEO deorbit results (solar-mean drag, 1 m²/100 kg ballistic class).
const SAMPLE: &[(f64, f64, f64)] = &[
    (300.0, 72.3, 0.1),
    (400.0, 99.8, 1.2),
    (500.0, 126.9, 8.5),
    (600.0, 153.6, 30.4),
    (700.0, 179.8, 91.0),
    (800.0, 205.6, 247.0),
    (900.0, 231.0, 610.0),
    (1000.0, 255.9, 1480.0),
];

fn sample_records() -> Vec<DeorbitRecord> {
    SAMPLE
        .iter()
        .map(|&(alt, dv, decay)| DeorbitRecord::new(alt, dv, decay, decay <= ESA_LIMIT_YEARS))
        .collect()
}

fn write_csv(path: &Path, records: &[DeorbitRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([ALTITUDE_KM, DELTA_V_MS, DECAY_TIME_YEARS, ESA_COMPLIANT])?;
    for r in records {
        writer.write_record([
            r.altitude_km.to_string(),
            r.delta_v_ms.to_string(),
            r.decay_time_years.to_string(),
            r.esa_compliant.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[DeorbitRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(ALTITUDE_KM, DataType::Float64, false),
        Field::new(DELTA_V_MS, DataType::Float64, false),
        Field::new(DECAY_TIME_YEARS, DataType::Float64, false),
        Field::new(ESA_COMPLIANT, DataType::Boolean, false),
    ]));

    let column = |f: fn(&DeorbitRecord) -> f64| Float64Array::from_iter_values(records.iter().map(f));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(column(|r| r.altitude_km)),
            Arc::new(column(|r| r.delta_v_ms)),
            Arc::new(column(|r| r.decay_time_years)),
            Arc::new(BooleanArray::from(
                records.iter().map(|r| r.esa_compliant).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Writes `data/deorbit_analysis.{csv,parquet}` and creates `plots/` so the
/// default configuration runs out of the box.
fn main() -> Result<()> {
    let data_dir = Path::new("data");
    fs::create_dir_all(data_dir).context("creating data/")?;
    fs::create_dir_all("plots").context("creating plots/")?;

    let records = sample_records();
    let csv_path = data_dir.join("deorbit_analysis.csv");
    let parquet_path = data_dir.join("deorbit_analysis.parquet");

    write_csv(&csv_path, &records)?;
    write_parquet(&parquet_path, &records)?;

    println!(
        "Wrote {} rows to {} and {}",
        records.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
