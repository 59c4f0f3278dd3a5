mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use common::TestWorkspace;

fn binary() -> Command {
    Command::cargo_bin("country-reconcile").expect("binary under test")
}

const TEST_MANIFEST: &str = "\
base:
  name: economy
  file: eco.csv
  shape: keyed
  country: Country
  year: Year
families:
  - name: standard_of_living
    sources:
      - name: sol
        file: sol.csv
        shape: year_suffixed
        country: country
        groups:
          - year: 2020
            columns:
              - source: HDI_2020
                rename: HDI
  - name: cost_of_living
    sources:
      - name: col
        file: col.csv
        shape: constant_year
        country: country
        year: 2020
        columns:
          - source: RentIdx
            rename: RentIdx
";

#[test]
fn merge_reconciles_three_sources_end_to_end() {
    let workspace = TestWorkspace::new();
    workspace.write("eco.csv", "Country,Year,GDP\nUS,2020,21000000000000\n");
    workspace.write("sol.csv", "country,HDI_2020\nUS,0.92\nFR,0.90\n");
    workspace.write("col.csv", "country,RentIdx\nUS,50\n");
    let manifest = workspace.write("manifest.yml", TEST_MANIFEST);
    let output = workspace.path().join("merged.csv");

    binary()
        .arg("merge")
        .arg("--data-dir")
        .arg(workspace.path())
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("merged output");
    let mut reader = csv::Reader::from_reader(written.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .expect("headers")
        .iter()
        .map(|h| h.to_string())
        .collect();
    assert_eq!(headers, vec!["Country", "Year", "GDP", "HDI", "RentIdx"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("row")
                .iter()
                .map(|cell| cell.to_string())
                .collect()
        })
        .collect();
    // Sorted by (Country, Year): FR before US; absent cells are empty.
    assert_eq!(
        rows,
        vec![
            vec!["FR", "2020", "", "0.9", ""],
            vec!["US", "2020", "21000000000000", "0.92", "50"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect::<Vec<_>>())
        .collect::<Vec<_>>()
    );
}

#[test]
fn merge_fails_and_writes_nothing_when_base_is_missing() {
    let workspace = TestWorkspace::new();
    // Optional sources present, base absent.
    workspace.write("sol.csv", "country,HDI_2020\nUS,0.92\n");
    workspace.write("col.csv", "country,RentIdx\nUS,50\n");
    let manifest = workspace.write("manifest.yml", TEST_MANIFEST);
    let output = workspace.path().join("merged.csv");

    binary()
        .arg("merge")
        .arg("--data-dir")
        .arg(workspace.path())
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("economy"));

    assert!(!output.exists(), "fatal run must not produce an output file");
}

#[test]
fn merge_tolerates_missing_optional_sources() {
    let workspace = TestWorkspace::new();
    workspace.write("eco.csv", "Country,Year,GDP\nUS,2020,21\n");
    let manifest = workspace.write("manifest.yml", TEST_MANIFEST);
    let output = workspace.path().join("merged.csv");

    binary()
        .arg("merge")
        .arg("--data-dir")
        .arg(workspace.path())
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("merged output");
    assert!(written.contains("US"));
    assert!(written.lines().count() >= 2);
}

#[test]
fn manifest_template_lists_default_sources() {
    binary()
        .arg("manifest")
        .assert()
        .success()
        .stdout(predicate::str::contains("Global Economy Indicators.csv"))
        .stdout(predicate::str::contains("cost-of-living_v2.csv"));
}

#[test]
fn preview_renders_an_aligned_table() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("merged.csv", "Country,Year\nFR,2020\nUS,2021\n");

    binary()
        .arg("preview")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Country  Year"))
        .stdout(predicate::str::contains("FR"));
}
