//! Integration tests: universes read from jars, classpath directories and
//! manifests, analyzed through the same entry point the CLI uses.

use indoc::indoc;
use oometrics::commands::{run_analysis, AnalyzeArgs, AnalyzeConfig};
use oometrics::config::OoMetricsConfig;
use oometrics::provider::classfile::{ACC_ABSTRACT, ACC_PRIVATE, ACC_PUBLIC};
use oometrics::testkit::{write_archive, ClassFileBuilder};
use oometrics::{assert_ratio_eq, assert_result_ok, AnalysisReport, SourceKind};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn chain_class_files() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        (
            "demo/A.class",
            ClassFileBuilder::new("demo/A")
                .method(ACC_PUBLIC, "<init>", "()V")
                .method(ACC_PUBLIC, "m1", "()V")
                .method(ACC_PRIVATE, "m2", "()V")
                .field(ACC_PRIVATE, "state", "I")
                .build(),
        ),
        (
            "demo/B.class",
            ClassFileBuilder::new("demo/B")
                .superclass("demo/A")
                .method(ACC_PUBLIC, "m1", "()V")
                .build(),
        ),
        (
            "demo/C.class",
            ClassFileBuilder::new("demo/C").superclass("demo/B").build(),
        ),
        (
            "demo/Shape.class",
            ClassFileBuilder::new("demo/Shape")
                .access(ACC_PUBLIC | ACC_ABSTRACT)
                .method(ACC_PUBLIC | ACC_ABSTRACT, "area", "()D")
                .build(),
        ),
    ]
}

fn analyze(path: &Path, source: Option<SourceKind>, package: Option<&str>) -> AnalysisReport {
    let config = AnalyzeConfig::resolve(
        AnalyzeArgs {
            path: path.to_path_buf(),
            source,
            package: package.map(str::to_string),
            no_parallel: true,
            ..Default::default()
        },
        &OoMetricsConfig::default(),
    );
    assert_result_ok!(run_analysis(&config))
}

fn class_names(report: &AnalysisReport) -> Vec<&str> {
    report.metrics.classes.iter().map(|c| c.class()).collect()
}

fn write_jar(dir: &TempDir) -> PathBuf {
    let jar = dir.path().join("app.jar");
    let mut entries = chain_class_files();
    entries.push(("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()));
    entries.push(("demo/Corrupt.class", vec![0xCA, 0xFE]));
    write_archive(&jar, &entries).unwrap();
    jar
}

#[test]
fn test_jar_universe() {
    let dir = TempDir::new().unwrap();
    let report = analyze(&write_jar(&dir), None, None);

    assert_eq!(
        class_names(&report),
        vec!["demo.A", "demo.B", "demo.C", "demo.Shape"]
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].entry, "demo/Corrupt.class");

    let dits: Vec<_> = report.metrics.evaluated().map(|m| m.dit).collect();
    // java.lang.Object lies outside the jar and counts as one hop
    assert_eq!(dits, vec![1, 2, 3, 1]);

    let a = report.metrics.evaluated().next().unwrap();
    assert_eq!(a.members.declared_methods, 2);
    assert_ratio_eq!(a.mhf, 0.5);
    assert_ratio_eq!(a.ahf, 1.0);
    assert_ratio_eq!(a.pof, 0.5);
}

#[test]
fn test_package_filter_keeps_concrete_types() {
    let dir = TempDir::new().unwrap();
    let report = analyze(&write_jar(&dir), Some(SourceKind::Archive), Some("demo"));

    assert_eq!(class_names(&report), vec!["demo.A", "demo.B", "demo.C"]);
}

#[test]
fn test_classpath_directory_matches_jar() {
    let dir = TempDir::new().unwrap();
    let jar_report = analyze(&write_jar(&dir), None, None);

    let classes = dir.path().join("classes");
    for (entry, bytes) in chain_class_files() {
        let path = classes.join(entry);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }
    let dir_report = analyze(&classes, None, None);

    assert!(dir_report.warnings.is_empty());
    assert_eq!(dir_report.metrics, jar_report.metrics);
}

#[test]
fn test_manifest_universe() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("universe.json");
    fs::write(
        &manifest,
        indoc! {r#"
            {
              "classes": [
                {
                  "name": "demo.A",
                  "methods": [
                    { "name": "m1", "visibility": "public" },
                    { "name": "m2", "visibility": "private" }
                  ]
                },
                {
                  "name": "demo.B",
                  "superclass": "demo.A",
                  "methods": [ { "name": "m1", "visibility": "public" } ]
                },
                { "name": "demo.C", "superclass": "demo.B" }
              ]
            }
        "#},
    )
    .unwrap();

    let report = analyze(&manifest, None, None);
    let dits: Vec<_> = report.metrics.evaluated().map(|m| m.dit).collect();
    assert_eq!(dits, vec![0, 1, 2]);

    let aggregate = report.metrics.aggregate.as_ref().unwrap();
    assert_eq!(aggregate.total_noc, 2);
    assert_ratio_eq!(aggregate.pof, 1.0 / 3.0);
}
