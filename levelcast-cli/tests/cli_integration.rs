use assert_cmd::Command;
use clap::Parser;
use levelcast_cli::{Cli, Commands};
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn levelcast_cmd() -> Command {
    Command::cargo_bin("levelcast").expect("Failed to find levelcast binary")
}

/// Writes a levels log with `seconds` of samples at 60 fps.
fn write_levels_log(path: &Path, seconds: usize) {
    let mut log = String::new();
    for i in 0..seconds * 60 {
        let t = i as f64 / 60.0;
        log.push_str(&format!("frame:{i}    pts:{i}    pts_time:{t}\n"));
        let phase = (i % 60) as f64 / 60.0;
        log.push_str(&format!("lavfi.astats.Overall.Min_level={}\n", -40.0 + phase));
        log.push_str(&format!("lavfi.astats.Overall.Max_level={}\n", phase));
        log.push_str(&format!("lavfi.astats.Overall.Peak_level={}\n", -30.0 + 20.0 * phase));
        log.push_str(&format!("lavfi.astats.Overall.RMS_level={}\n", -35.0 + 10.0 * phase));
    }
    std::fs::write(path, log).expect("Failed to write levels log");
}

#[test]
fn test_parse_render_flags() {
    let cli = Cli::try_parse_from([
        "levelcast",
        "--verbose",
        "render",
        "--audio",
        "a.wav",
        "--background",
        "bg.png",
        "--ball",
        "ball.png",
        "--art",
        "art.png",
        "-o",
        "out.mp4",
        "--chunk-length",
        "10",
        "--seed",
        "3",
        "--json",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.audio.as_deref(), Some(Path::new("a.wav")));
            assert_eq!(args.mapping.chunk_length, Some(10.0));
            assert_eq!(args.mapping.seed, Some(3));
            assert!(args.mapping.json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_analyze_prints_json_report() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let levels = dir.path().join("levels.log");
    write_levels_log(&levels, 5);

    let output = levelcast_cmd()
        .args(["analyze", "--chunk-length", "2", "--json"])
        .arg(&levels)
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["categories"].as_array().unwrap().len(), 4);
    assert_eq!(report["frames_per_chunk"], 120);
    let chunks = report["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1]["time_offset"], 2.0);
    Ok(())
}

#[test]
fn test_emit_writes_command_streams() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let levels = dir.path().join("levels.log");
    let out = dir.path().join("streams");
    write_levels_log(&levels, 3);

    levelcast_cmd()
        .args(["emit", "--chunk-length", "1", "--seed", "9", "-o"])
        .arg(&out)
        .arg(&levels)
        .assert()
        .success()
        .stdout(contains("chunk_0002"));

    for chunk in 0..3 {
        let chunk_dir = out.join(format!("chunk_{chunk:04}"));
        let ball = std::fs::read_to_string(chunk_dir.join("sendcmd_b.txt"))?;
        assert!(ball.lines().next().unwrap().starts_with("0 scale@b width '"));
        assert!(chunk_dir.join("sendcmd_all.txt").is_file());
        assert!(chunk_dir.join("sendcmd_dx.txt").is_file());
        assert!(chunk_dir.join("sendcmd_dy.txt").is_file());
    }
    Ok(())
}

#[test]
fn test_seeded_emit_is_reproducible() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let levels = dir.path().join("levels.log");
    write_levels_log(&levels, 2);

    for run in ["a", "b"] {
        levelcast_cmd()
            .args(["emit", "--seed", "42", "-o"])
            .arg(dir.path().join(run))
            .arg(&levels)
            .assert()
            .success();
    }
    let a = std::fs::read_to_string(dir.path().join("a/chunk_0000/sendcmd_all.txt"))?;
    let b = std::fs::read_to_string(dir.path().join("b/chunk_0000/sendcmd_all.txt"))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_render_without_inputs_fails() {
    levelcast_cmd()
        .args(["render", "--audio", "a.wav"])
        .assert()
        .failure()
        .stderr(contains("--background"));
}

#[test]
fn test_analyze_malformed_log_fails_with_line() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let levels = dir.path().join("levels.log");
    std::fs::write(
        &levels,
        "frame:0 pts:0 pts_time:0\nlavfi.astats.Overall.Peak_level=loud\n",
    )?;

    levelcast_cmd()
        .arg("analyze")
        .arg(&levels)
        .assert()
        .failure()
        .stderr(contains("line 2"));
    Ok(())
}

#[test]
fn test_log_dir_creates_log_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let levels = dir.path().join("levels.log");
    let logs = dir.path().join("logs");
    write_levels_log(&levels, 1);

    levelcast_cmd()
        .arg("--log-dir")
        .arg(&logs)
        .arg("analyze")
        .arg(&levels)
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(&logs)?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("levelcast_analyze_"));
    Ok(())
}
