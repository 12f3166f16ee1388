use std::fs;

use uniqline::{Driver, PipelineConfig};

fn write_input(dir: &std::path::Path, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join("input.txt");
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

#[test]
fn finds_earliest_line_with_many_workers() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(
        tmp.path(),
        &["one", "two", "three", "two", "one", "four", "five", "three"],
    );
    let shard_dir = tmp.path().join("shards");
    fs::create_dir_all(&shard_dir).unwrap();

    let config = PipelineConfig::new(&input, &shard_dir)
        .with_worker_count(4)
        .with_max_shard_bytes(1 << 20)
        .with_progress(false);

    let result = Driver::new(&config).run().unwrap();
    let answer = result.answer.unwrap();
    assert_eq!(answer.text, b"four");
    assert_eq!(answer.pos, 6);
}

#[test]
fn single_worker_forces_multiple_rounds_and_still_converges() {
    let tmp = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..200).map(|i| format!("item-{i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let input = write_input(tmp.path(), &refs);
    let shard_dir = tmp.path().join("shards");
    fs::create_dir_all(&shard_dir).unwrap();

    // A tiny byte budget with a single worker forces every round's single
    // shard to stay oversized until MemCollapse resolves it in round 2.
    let config = PipelineConfig::new(&input, &shard_dir)
        .with_worker_count(1)
        .with_max_shard_bytes(16)
        .with_progress(false);

    let result = Driver::new(&config).run().unwrap();
    assert!(result.map_outcome.completed);
    let answer = result.answer.unwrap();
    assert_eq!(answer.text, b"item-0");
    assert_eq!(answer.pos, 1);
}

#[test]
fn empty_input_yields_no_answer() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.txt");
    fs::write(&input, "").unwrap();
    let shard_dir = tmp.path().join("shards");
    fs::create_dir_all(&shard_dir).unwrap();

    let config = PipelineConfig::new(&input, &shard_dir)
        .with_worker_count(3)
        .with_max_shard_bytes(1 << 20)
        .with_progress(false);

    let result = Driver::new(&config).run().unwrap();
    assert!(result.answer.is_none());
}

#[test]
fn invalid_config_is_rejected_before_any_io() {
    let config = PipelineConfig::new("", "");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("input_path"));
}

#[test]
fn missing_shard_dir_is_reported_before_any_io() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), &["one", "two"]);
    let shard_dir = tmp.path().join("does-not-exist");

    let config = PipelineConfig::new(&input, &shard_dir).with_progress(false);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, uniqline::PipelineError::PathMissing(_)));
}

#[test]
fn repeated_runs_on_the_same_input_agree() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(
        tmp.path(),
        &["one", "two", "three", "two", "one", "four", "five", "three"],
    );

    let shard_dir_a = tmp.path().join("shards-a");
    fs::create_dir_all(&shard_dir_a).unwrap();
    let config_a = PipelineConfig::new(&input, &shard_dir_a)
        .with_worker_count(4)
        .with_max_shard_bytes(1 << 20)
        .with_progress(false);
    let result_a = Driver::new(&config_a).run().unwrap();

    let shard_dir_b = tmp.path().join("shards-b");
    fs::create_dir_all(&shard_dir_b).unwrap();
    let config_b = PipelineConfig::new(&input, &shard_dir_b)
        .with_worker_count(4)
        .with_max_shard_bytes(1 << 20)
        .with_progress(false);
    let result_b = Driver::new(&config_b).run().unwrap();

    assert_eq!(result_a.answer, result_b.answer);
}
