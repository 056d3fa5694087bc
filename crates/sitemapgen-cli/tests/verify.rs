#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{Site, record};
use predicates::prelude::*;

fn generated(site: &Site) -> std::path::PathBuf {
    let out = site.dir.path().join("out");
    site.write_catalog(&[
        &record(1, 0, "Alpha"),
        &record(2, 0, "Beta"),
        &record(3, 0, "Gamma"),
    ]);
    site.cmd()
        .args(["generate", "--catalog"])
        .arg(&site.catalog)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();
    out
}

#[test]
fn verify_accepts_generated_output() {
    let site = Site::new("[limits]\nmax_entries = 2\n");
    let out = generated(&site);

    site.cmd()
        .arg("verify")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found"))
        .stdout(predicate::str::contains("NS_0-1.xml"));
}

#[test]
fn verify_reports_tighter_limit() -> anyhow::Result<()> {
    let site = Site::new("[limits]\nmax_entries = 2\n");
    let out = generated(&site);

    let output = site
        .cmd()
        .args(["verify", "--max-entries", "1", "--format", "json"])
        .arg(&out)
        .output()?;
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let problems = report["problems"].as_array().unwrap();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].as_str().unwrap().contains("NS_0-0.xml: 2 entries"));
    Ok(())
}

#[test]
fn verify_missing_index_fails() {
    let site = Site::new("");
    site.cmd()
        .arg("verify")
        .arg(site.dir.path())
        .assert()
        .failure();
}
