use assert_cmd::Command;
use image::{DynamicImage, ImageBuffer, Luma};
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("certscore").unwrap()
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn score_certificate_example() {
    let output = cmd()
        .args(["score", "--verified", "--projects", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["certification"], 40);
    assert_eq!(json["projects"], 20);
    assert_eq!(json["repository"], 0);
    assert_eq!(json["total"], 60);
}

#[test]
fn score_ceiling_and_bad_repo() {
    cmd()
        .args([
            "score",
            "--verified",
            "--projects",
            "12",
            "--repo",
            "https://github.com/alice/proj1",
        ])
        .assert()
        .success()
        .stdout(contains("\"total\": 100"));

    cmd()
        .args(["score", "--repo", "not-a-url"])
        .assert()
        .success()
        .stdout(contains("\"total\": 0"));
}

#[test]
fn verify_undecodable_image_is_fail_soft() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("cert.png");
    fs::write(&image, b"this is not a png").unwrap();

    let output = cmd()
        .arg("verify")
        .arg("--image")
        .arg(&image)
        .args(["--skill", "python", "--projects", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["verification"]["verified"], false);
    assert!(json["verification"]["details"]["error"]
        .as_str()
        .unwrap()
        .starts_with("Image decode failed"));
    assert_eq!(json["score"]["total"], 30);
}

#[test]
fn verify_rejects_empty_skill() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("cert.png");
    fs::write(&image, b"irrelevant").unwrap();

    cmd()
        .arg("verify")
        .arg("--image")
        .arg(&image)
        .args(["--skill", ""])
        .assert()
        .failure()
        .stderr(contains("Invalid input"));
}

#[test]
fn verify_missing_image_fails() {
    cmd()
        .args(["verify", "--image", "/nonexistent/certscore/cert.png", "--skill", "go"])
        .assert()
        .failure()
        .stderr(contains("Failed to read image"));
}

#[test]
fn submit_emits_record() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("cert.jpg");
    fs::write(&image, b"garbage").unwrap();

    let output = cmd()
        .arg("submit")
        .arg("--image")
        .arg(&image)
        .args([
            "--skill",
            "React",
            "--level",
            "Advanced",
            "--projects",
            "1",
            "--repo",
            "https://github.com/stu/site",
            "--student",
            "stu-9",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["studentId"], "stu-9");
    assert_eq!(json["name"], "React");
    assert_eq!(json["level"], "Advanced");
    assert_eq!(json["verified"], false);
    assert_eq!(json["score"], 40);
}

#[test]
fn submit_requires_level() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("cert.png");
    fs::write(&image, b"garbage").unwrap();

    cmd()
        .arg("submit")
        .arg("--image")
        .arg(&image)
        .args(["--skill", "React", "--level", ""])
        .assert()
        .failure()
        .stderr(contains("skill level is required"));
}

#[test]
fn preprocess_writes_binary_image() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out.png");

    DynamicImage::ImageLuma8(ImageBuffer::from_fn(10, 6, |x, _| {
        if x < 3 { Luma([40]) } else { Luma([210]) }
    }))
    .save(&input)
    .unwrap();

    cmd()
        .arg("preprocess")
        .arg("--image")
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .assert()
        .success();

    let binary = image::open(&output).unwrap().to_luma8();
    assert_eq!(binary.dimensions(), (10, 6));
    assert_eq!(binary.get_pixel(0, 0)[0], 0);
    assert_eq!(binary.get_pixel(9, 5)[0], 255);
}

#[test]
fn batch_writes_report() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.png"), b"nope").unwrap();
    let manifest = tmp.path().join("manifest.json");
    fs::write(
        &manifest,
        r#"[
            { "student": "a", "image": "bad.png", "skill": "Python", "projects": 2 },
            { "student": "b", "image": "absent.png", "skill": "Rust", "projects": 1 }
        ]"#,
    )
    .unwrap();
    let report = tmp.path().join("report.csv");

    let output = cmd()
        .arg("batch")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--out")
        .arg(&report)
        .args(["--workers", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["processed"], 2);
    assert_eq!(json["verified"], 0);
    assert_eq!(json["failed"], 2);

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.starts_with("student,skill,level,projects,repo,verified,confidence,score,error"));
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn verify_accepts_timeout_override() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("cert.png");
    fs::write(&image, b"still not a png").unwrap();

    let output = cmd()
        .arg("verify")
        .arg("--image")
        .arg(&image)
        .args(["--skill", "python", "--projects", "1", "--timeout-ms", "100"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["verification"]["verified"], false);
    assert_eq!(json["score"]["total"], 10);
}

#[test]
fn verify_rejects_non_numeric_timeout() {
    cmd()
        .args(["verify", "--image", "x.png", "--skill", "go", "--timeout-ms", "soon"])
        .assert()
        .failure()
        .stderr(contains("--timeout-ms"));
}
