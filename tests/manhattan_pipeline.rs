//! End-to-end tests for the two-pass Manhattan summary.
//!
//! Each test writes an EPACTS fixture (plain or gzip) into a temporary
//! directory, runs the command against it and inspects the JSON on disk.

use flate2::write::GzEncoder;
use flate2::Compression;
use manhattan_bins::commands::ManhattanCommand;
use manhattan_bins::config::BinningConfig;
use manhattan_bins::streaming::ManhattanResult;
use manhattan_bins::{ErrorCategory, VariantError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "#CHROM\tBEGIN\tEND\tMARKER_ID\tNS\tAC\tCALLRATE\tMAF\tPVALUE\tBETA\tSEBETA";

fn row(chrom: &str, pos: u64, pval: f64) -> String {
    format!(
        "{c}\t{p}\t{p}\t{c}:{p}_C/T\t1000\t40\t0.99\t0.0213\t{pv:e}\t-0.1234\t0.0456\n",
        c = chrom,
        p = pos,
        pv = pval
    )
}

fn epacts_text(header: &str, rows: &[(&str, u64, f64)]) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for (chrom, pos, pval) in rows {
        out.push_str(&row(chrom, *pos, *pval));
    }
    out
}

fn write_plain(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_gzip(dir: &TempDir, name: &str, members: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut bytes = Vec::new();
    // Each member is compressed separately, as bgzip does.
    for member in members {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(member.as_bytes()).unwrap();
        bytes.extend(encoder.finish().unwrap());
    }
    fs::write(&path, bytes).unwrap();
    path
}

fn read_result(path: &Path) -> ManhattanResult {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn command(config: BinningConfig) -> ManhattanCommand {
    ManhattanCommand::new().with_config(config)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_two_significant_variants_unbinned() {
    let dir = TempDir::new().unwrap();
    let input = write_plain(
        &dir,
        "two.epacts",
        &epacts_text(HEADER, &[("1", 1000, 1e-8), ("1", 1000, 5e-9)]),
    );
    let output = dir.path().join("out.json");

    let config = BinningConfig::new()
        .with_bin_threshold(1e-4)
        .with_max_unbinned(2);
    command(config).run(&input, &output).unwrap();

    let result = read_result(&output);
    assert!(result.variant_bins.is_empty());
    let pvals: Vec<f64> = result.unbinned_variants.iter().map(|v| v.pval).collect();
    assert_eq!(pvals, vec![1e-8, 5e-9]);

    let first = &result.unbinned_variants[0];
    assert_eq!(first.chrom, "1");
    assert_eq!(first.pos, 1000);
    assert_eq!(first.ref_allele, "C");
    assert_eq!(first.alt, "T");
    assert_eq!(first.maf, 0.0213);
    assert_eq!(first.beta, -0.12);
    assert_eq!(first.sebeta, 0.046);
}

#[test]
fn test_ten_variants_single_bin() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<(&str, u64, f64)> = (0..10).map(|i| ("1", 100 + i * 10, 0.5)).collect();
    let input = write_plain(&dir, "ten.epacts", &epacts_text(HEADER, &rows));
    let output = dir.path().join("out.json");

    let config = BinningConfig::new()
        .with_bin_length(100)
        .with_max_unbinned(0)
        .with_bin_threshold(1e-4);
    command(config).run(&input, &output).unwrap();

    let result = read_result(&output);
    assert!(result.unbinned_variants.is_empty());
    assert_eq!(result.variant_bins.len(), 1);
    assert_eq!(result.variant_bins[0].pos, 150);
    assert_eq!(result.variant_bins[0].neglog10_pvals, vec![0.3]);
    assert!(result.variant_bins[0].neglog10_pval_extents.is_empty());
}

#[test]
fn test_json_layout() {
    let dir = TempDir::new().unwrap();
    let input = write_plain(
        &dir,
        "layout.epacts",
        &epacts_text(HEADER, &[("1", 10, 0.5), ("1", 20, 1e-9)]),
    );
    let output = dir.path().join("out.json");
    command(BinningConfig::new()).run(&input, &output).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let top: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(top, vec!["unbinned_variants", "variant_bins"]);

    let bin: Vec<&String> = doc["variant_bins"][0].as_object().unwrap().keys().collect();
    assert_eq!(
        bin,
        vec!["chrom", "neglog10_pval_extents", "neglog10_pvals", "pos"]
    );

    let point = doc["unbinned_variants"][0].as_object().unwrap();
    assert!(point.contains_key("ref"));
    assert!(!point.contains_key("ref_allele"));
    assert_eq!(point.len(), 8);
}

// =============================================================================
// Input formats
// =============================================================================

#[test]
fn test_gzip_matches_plain() {
    let dir = TempDir::new().unwrap();
    let rows = [
        ("1", 100, 0.5),
        ("1", 200, 0.009),
        ("1", 5_000_000, 2e-7),
        ("2", 300, 0.04),
    ];
    let text = epacts_text(HEADER, &rows);
    let plain = write_plain(&dir, "in.epacts", &text);
    let gz = write_gzip(&dir, "in.epacts.gz", &[text.as_str()]);

    let out_plain = dir.path().join("plain.json");
    let out_gz = dir.path().join("gz.json");
    let cmd = command(BinningConfig::new());
    let stats_plain = cmd.run(&plain, &out_plain).unwrap();
    let stats_gz = cmd.run(&gz, &out_gz).unwrap();

    assert_eq!(stats_plain, stats_gz);
    assert_eq!(
        fs::read_to_string(&out_plain).unwrap(),
        fs::read_to_string(&out_gz).unwrap()
    );
}

#[test]
fn test_multi_member_gzip() {
    let dir = TempDir::new().unwrap();
    let header = format!("{}\n", HEADER);
    let rows = format!("{}{}", row("1", 100, 0.5), row("1", 200, 0.5));
    let input = write_gzip(&dir, "in.epacts.gz", &[header.as_str(), rows.as_str()]);
    let output = dir.path().join("out.json");

    let stats = command(BinningConfig::new()).run(&input, &output).unwrap();
    assert_eq!(stats.records_pass1, 2);
    assert_eq!(stats.records_pass2, 2);
}

#[test]
fn test_legacy_beg_header() {
    let dir = TempDir::new().unwrap();
    let header = HEADER.replace("BEGIN", "BEG");
    let input = write_plain(&dir, "old.epacts", &epacts_text(&header, &[("X", 42, 0.5)]));
    let output = dir.path().join("out.json");

    command(BinningConfig::new()).run(&input, &output).unwrap();
    let result = read_result(&output);
    assert_eq!(result.variant_bins[0].chrom, "X");
}

#[test]
fn test_na_rows_dropped() {
    let dir = TempDir::new().unwrap();
    let text = format!(
        "{}\n{}1\t150\t150\t1:150_A/G\t1000\t0\t0.99\t0\tNA\tNA\tNA\n{}",
        HEADER,
        row("1", 100, 0.5),
        row("1", 200, 0.5)
    );
    let input = write_plain(&dir, "na.epacts", &text);
    let output = dir.path().join("out.json");

    let stats = command(BinningConfig::new()).run(&input, &output).unwrap();
    assert_eq!(stats.records_pass2, 2);
    assert_eq!(stats.dropped_na, 1);
}

// =============================================================================
// Failures leave no output
// =============================================================================

fn assert_fails_without_output(content: &str) -> VariantError {
    let dir = TempDir::new().unwrap();
    let input = write_plain(&dir, "bad.epacts", content);
    let output = dir.path().join("out.json");

    let err = command(BinningConfig::new()).run(&input, &output).unwrap_err();
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    err
}

#[test]
fn test_unsorted_positions_fail() {
    let err = assert_fails_without_output(&epacts_text(HEADER, &[("1", 100, 0.5), ("1", 90, 0.5)]));
    assert_eq!(err.category(), ErrorCategory::Ordering);
}

#[test]
fn test_interleaved_chromosomes_fail() {
    let err = assert_fails_without_output(&epacts_text(
        HEADER,
        &[("2", 10, 0.5), ("1", 10, 0.5), ("2", 20, 0.5)],
    ));
    assert!(err.is_ordering());
}

#[test]
fn test_missing_column_fails() {
    let header = HEADER.replace("\tSEBETA", "");
    let err = assert_fails_without_output(&format!("{}\n", header));
    assert!(matches!(err, VariantError::MissingColumn("SEBETA")));
    assert_eq!(err.category(), ErrorCategory::Schema);
}

#[test]
fn test_marker_mismatch_fails() {
    let text = format!(
        "{}\n1\t100\t100\t1:101_A/G\t1000\t40\t0.99\t0.02\t0.5\t0.1\t0.05\n",
        HEADER
    );
    let err = assert_fails_without_output(&text);
    assert!(matches!(err, VariantError::MarkerMismatch { line: 2, .. }));
}

#[test]
fn test_empty_input_fails() {
    let err = assert_fails_without_output(&format!("{}\n", HEADER));
    assert!(matches!(err, VariantError::EmptyInput));
}

#[test]
fn test_position_overflow_fails() {
    let err = assert_fails_without_output(&epacts_text(
        HEADER,
        &[("1", u64::MAX - 10, 0.5), ("1", u64::MAX - 10, 0.5)],
    ));
    assert!(matches!(err, VariantError::PositionOverflow { .. }));
    assert_eq!(err.category(), ErrorCategory::Data);
}

#[test]
fn test_existing_output_untouched_on_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_plain(
        &dir,
        "bad.epacts",
        &epacts_text(HEADER, &[("1", 100, 0.5), ("1", 90, 0.5)]),
    );
    let output = write_plain(&dir, "out.json", "previous");

    assert!(command(BinningConfig::new()).run(&input, &output).is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = command(BinningConfig::new())
        .run(dir.path().join("nope.epacts"), dir.path().join("out.json"))
        .unwrap_err();
    assert!(matches!(err, VariantError::NotFound(_)));
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_directory_as_input() {
    let dir = TempDir::new().unwrap();
    let err = command(BinningConfig::new())
        .run(dir.path(), dir.path().join("out.json"))
        .unwrap_err();
    assert!(matches!(err, VariantError::NotAFile(_)));
    assert!(!err.to_string().contains("does not exist"));
}

#[test]
fn test_missing_output_directory() {
    let dir = TempDir::new().unwrap();
    let input = write_plain(&dir, "in.epacts", &epacts_text(HEADER, &[("1", 100, 0.5)]));
    let err = command(BinningConfig::new())
        .run(&input, dir.path().join("missing").join("out.json"))
        .unwrap_err();
    assert!(matches!(err, VariantError::NotFound(_)));
}

// =============================================================================
// Properties over generated data
// =============================================================================

#[test]
fn test_generated_genome_properties() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let mut rows: Vec<(&str, u64, f64)> = Vec::new();
    for chrom in ["1", "2", "10", "X"] {
        let mut pos = rng.gen_range(1..10_000);
        for _ in 0..600 {
            pos += rng.gen_range(0..40_000);
            rows.push((chrom, pos, 10f64.powf(-rng.gen_range(0.0..9.0))));
        }
    }

    let dir = TempDir::new().unwrap();
    let input = write_gzip(&dir, "gen.epacts.gz", &[epacts_text(HEADER, &rows).as_str()]);
    let output = dir.path().join("out.json");

    let bin_length = 1_000_000;
    let max_unbinned = 40;
    let config = BinningConfig::new()
        .with_bin_length(bin_length)
        .with_max_unbinned(max_unbinned);
    let stats = command(config).run(&input, &output).unwrap();
    let result = read_result(&output);

    assert_eq!(stats.records_pass1, rows.len());
    assert_eq!(stats.chromosomes, 4);
    assert!(stats.threshold <= 1e-4);
    assert!(result.unbinned_variants.len() <= max_unbinned + 1);
    assert!(result
        .unbinned_variants
        .iter()
        .all(|v| v.pval <= 1e-4));

    // Consecutive bins on one chromosome are exactly one window apart.
    for pair in result.variant_bins.windows(2) {
        if pair[0].chrom == pair[1].chrom {
            assert_eq!(pair[1].pos, pair[0].pos + bin_length);
        }
    }

    // Values and extents within a bin are ascending and disjoint.
    for bin in &result.variant_bins {
        assert!(!bin.neglog10_pvals.is_empty() || !bin.neglog10_pval_extents.is_empty());
        assert!(bin.neglog10_pvals.windows(2).all(|w| w[0] < w[1]));
        assert!(bin.neglog10_pval_extents.iter().all(|[lo, hi]| lo < hi));
        for v in &bin.neglog10_pvals {
            assert!(!bin
                .neglog10_pval_extents
                .iter()
                .any(|[lo, hi]| lo <= v && v <= hi));
        }
    }
}
