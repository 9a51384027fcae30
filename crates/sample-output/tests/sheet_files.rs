use std::time::Duration;

use sample_model::{SampleId, SampleRecord, SampleSet};
use sample_output::{OtuOptions, OutputFormat, generate, write_sheet_named};
use tempfile::TempDir;

fn sample_set() -> SampleSet {
    let samples = ["first", "second", "third"]
        .iter()
        .enumerate()
        .map(|(idx, name)| SampleRecord::new(SampleId::new(format!("id-{idx}")).unwrap(), *name))
        .collect();
    SampleSet::new("site", "three wells", samples)
}

#[test]
fn rows_follow_set_order_after_json_round_trip() {
    let json = serde_json::to_string(&sample_set()).unwrap();
    let set: SampleSet = serde_json::from_str(&json).unwrap();
    let sheet = generate(&set, &OtuOptions::default());
    assert_eq!(sheet.len(), set.len());
    for (row, sample) in sheet.rows.iter().zip(&set.samples) {
        assert_eq!(row[0], sample.id.as_str());
        assert_eq!(row[1], sample.name);
        assert_eq!(row.len(), sheet.columns.len());
    }
}

#[test]
fn xls_output_reads_back() {
    let dir = TempDir::new().unwrap();
    let sheet = generate(&sample_set(), &OtuOptions::default());
    let path = write_sheet_named(&sheet, dir.path(), "site_OTUs", OutputFormat::Xls).unwrap();
    assert_eq!(path.file_name().unwrap(), "site_OTUs.xls");

    let table = sample_ingest::read_table(&path, 0, Duration::from_secs(10)).unwrap();
    assert_eq!(table.headers, sheet.columns);
    let names: Vec<_> = table.rows.iter().map(|row| row.cell(1)).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn csv_output_reads_back() {
    let dir = TempDir::new().unwrap();
    let sheet = generate(&sample_set(), &OtuOptions::default());
    let path = write_sheet_named(&sheet, dir.path(), "site_OTUs", OutputFormat::Csv).unwrap();
    let table = sample_ingest::read_table(&path, 0, Duration::from_secs(10)).unwrap();
    assert_eq!(table.headers.len(), 12);
    assert_eq!(table.rows.len(), 3);
}
