//! End-to-end tests from CSV uploads on disk to trees and comparisons
//!
//! Each test writes realistic bill-of-materials uploads into a temporary
//! directory and drives the public API the way the `bom` binary does.

use bom_processor::cli::input_discovery::resolve_inputs;
use bom_processor::compare::{item_cost, row_difference};
use bom_processor::constants::PRODUCT_TYPE;
use bom_processor::export::{ExportFormat, export_comparison};
use bom_processor::models::CostTrend;
use bom_processor::{BomConfig, UploadProcessor, subtree_cost, total_cost};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = "Name,Type,Quantity,Price ($),Failure rate (1/year),Description,Parent";

const EPSILON: f64 = 1e-9;

/// Pump bill of materials; `impeller_price` varies between revisions
fn pump_upload(description: &str, impeller_price: &str, with_seal: bool) -> String {
    let mut contents = format!(
        "{HEADER}\n\
         Pump,Product,1,,,{description},\n\
         Motor,Assembly,1,\"$1,200.00\",0.05,Drive motor,Pump\n\
         Bearing,Part,2,$15.00,0.5,Motor bearing,Motor\n\
         Hydraulics,Assembly,1,,,,Pump\n\
         Impeller,Part,1,{impeller_price},0.2,,Hydraulics\n"
    );
    if with_seal {
        contents.push_str("Seal,Part,4,,1,\"Shaft\nseal\",Hydraulics\n");
    }
    contents
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn processor() -> UploadProcessor {
    UploadProcessor::new(BomConfig::default().without_progress())
}

#[tokio::test]
async fn test_tree_from_upload() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(&temp_dir, "pump.csv", &pump_upload("Pump A", "$80.00", true));

    let (uploads, stats) = processor().load(&[path]).await.unwrap();
    assert_eq!(stats.files_loaded, 1);
    assert_eq!(stats.total_records, 6);

    let forest = uploads.forest();
    assert_eq!(forest.len(), 1);

    let pump = &forest[0];
    assert_eq!(pump.description, "Pump A");
    let children: Vec<&str> = pump.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(children, vec!["Motor", "Hydraulics"]);

    // Motor 1 x 1200 x 0.05 = 60, bearings 2 x 15 x 0.5 = 15, impeller 80 x 0.2 = 16
    let motor = pump.find("Motor").unwrap();
    assert!((motor.own_cost() - 60.0).abs() < EPSILON);
    assert!((total_cost(motor) - 75.0).abs() < EPSILON);
    assert!((total_cost(pump) - 91.0).abs() < EPSILON);

    // Seal has no price: present, costs nothing, description line break removed
    let seal = pump.find("Seal").unwrap();
    assert_eq!(seal.own_cost(), 0.0);
    assert_eq!(seal.description, "Shaftseal");
}

#[tokio::test]
async fn test_flat_chase_agrees_with_tree() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(&temp_dir, "pump.csv", &pump_upload("Pump A", "$80.00", true));

    let (uploads, _) = processor().load(&[path]).await.unwrap();
    let upload = uploads.get(0).unwrap();
    let forest = uploads.forest();

    for record in &upload.records {
        let node = forest[0].find(&record.name).unwrap();
        let flat = subtree_cost(&upload.records, &record.name);
        assert!(
            (total_cost(node) - flat).abs() < EPSILON,
            "{}: tree {} vs flat {}",
            record.name,
            total_cost(node),
            flat
        );
    }
}

#[tokio::test]
async fn test_compare_two_revisions() {
    let temp_dir = TempDir::new().unwrap();
    let old = write(&temp_dir, "a-old.csv", &pump_upload("Pump A", "$80.00", true));
    let new = write(&temp_dir, "b-new.csv", &pump_upload("Pump B", "$92.50", false));

    let paths = resolve_inputs(&[temp_dir.path().to_string_lossy().into_owned()]).unwrap();
    assert_eq!(paths, vec![old, new]);

    let (uploads, _) = processor().load(&paths).await.unwrap();
    let report = uploads.compare(PRODUCT_TYPE).unwrap();

    assert_eq!(report.labels, vec!["Pump A", "Pump B"]);
    assert!((report.totals[0] - 91.0).abs() < EPSILON);
    assert!((report.totals[1] - 93.5).abs() < EPSILON);

    let difference = report.total_difference().unwrap();
    assert_eq!(difference.to_string(), "+2.50");
    assert_eq!(difference.trend(), CostTrend::Higher);

    // Present with zero cost in the first upload, absent from the second
    let seal = report.rows.iter().find(|r| r.name == "Seal").unwrap();
    assert_eq!(item_cost(seal.record(0)), Some(0.0));
    assert_eq!(item_cost(seal.record(1)), None);

    let impeller = report.rows.iter().find(|r| r.name == "Impeller").unwrap();
    assert_eq!(
        row_difference(impeller).unwrap().trend(),
        CostTrend::Higher
    );
}

#[tokio::test]
async fn test_malformed_upload_leaves_others_usable() {
    let temp_dir = TempDir::new().unwrap();
    let first = write(&temp_dir, "first.csv", &pump_upload("Pump A", "$80.00", true));
    let broken = write(&temp_dir, "broken.csv", "Part;Qty\nBolt;4\n");
    let second = write(&temp_dir, "second.csv", &pump_upload("Pump B", "$80.00", true));

    let (uploads, stats) = processor()
        .load(&[first, broken.clone(), second])
        .await
        .unwrap();

    assert_eq!(uploads.len(), 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.failures[0].0, broken);

    let report = uploads.compare(PRODUCT_TYPE).unwrap();
    assert_eq!(report.total_difference().unwrap().to_string(), "=");
}

#[tokio::test]
async fn test_export_complete_comparison() {
    let temp_dir = TempDir::new().unwrap();
    let old = write(&temp_dir, "old.csv", &pump_upload("Pump A", "$80.00", true));
    let new = write(&temp_dir, "new.csv", &pump_upload("Pump B", "$92.50", false));

    let (uploads, _) = processor().load(&[old, new]).await.unwrap();
    let report = uploads.compare(PRODUCT_TYPE).unwrap();

    let out = temp_dir.path().join("out").join("pumps.csv");
    export_comparison(&report, &out, ExportFormat::Csv, &BomConfig::default()).unwrap();

    let contents = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1 + report.rows.len());
    assert!(lines[0].ends_with("difference"));
}
