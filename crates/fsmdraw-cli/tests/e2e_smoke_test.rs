use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use fsmdraw_cli::{Args, Format, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &Path, output: PathBuf, format: Option<Format>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        format,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_json_files(demos_path());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let stem = demo_path.file_stem().unwrap().to_string_lossy().to_string();
        for extension in ["svg", "tex", "png"] {
            let output_path = temp_dir.path().join(format!("{stem}.{extension}"));
            let args = args(demo_path, output_path.clone(), None);

            match run(&args) {
                Ok(()) => {
                    let written = fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
                    assert!(written > 0, "{} produced an empty file", output_path.display());
                }
                Err(e) => failed_demos.push((demo_path.clone(), extension, e)),
            }
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, extension, err) in &failed_demos {
            eprintln!("  - {} ({extension}): {}", path.display(), err);
        }
        panic!("{} valid demo render(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_json_files(demos_path().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let args = args(demo_path, temp_dir.path().join(output_filename), None);

        if run(&args).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("✅ All {} error demos failed as expected", error_demos.len());
}

#[test]
fn e2e_explicit_format_overrides_extension() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("even_zeros.json");
    let output = temp_dir.path().join("machine.out");

    run(&args(&input, output.clone(), Some(Format::Tex))).expect("Failed to render");

    let tex = fs::read_to_string(&output).expect("Failed to read output");
    assert!(tex.starts_with("\\documentclass"), "Output should be a LaTeX document");
    assert!(tex.contains("edge[loop above]"));
}

#[test]
fn e2e_explicit_config_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[canvas]\nwidth = 640\nheight = 480\n").unwrap();

    let input = demos_path().join("legacy_record.json");
    let output = temp_dir.path().join("legacy.svg");
    let mut args = args(&input, output.clone(), None);
    args.config = Some(config_path.to_string_lossy().to_string());

    run(&args).expect("Failed to render");

    let svg = fs::read_to_string(&output).expect("Failed to read output");
    assert!(svg.contains("width=\"640\""));
    assert!(svg.contains("B &amp; C"), "Labels should be XML-escaped");
}
