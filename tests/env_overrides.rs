// Re-runs this test binary with different environments, since the global
// configuration is read once per process.
use std::process::Command;

use scifftpack::FftConfig;

#[test]
fn print_global_config() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = FftConfig::global();
    println!(
        "config {} {} {}",
        config.enable_nd_planning, config.plan_cache_size, config.max_elements
    );
}

fn global_config_with(vars: &[(&str, &str)]) -> (bool, usize, usize) {
    let exe = std::env::current_exe().unwrap();
    let mut command = Command::new(&exe);
    command
        .env_remove("SCIFFTPACK_ENABLE_ND_PLANNING")
        .env_remove("SCIFFTPACK_PLAN_CACHE_SIZE")
        .env_remove("SCIFFTPACK_MAX_ELEMENTS")
        .args(["--exact", "print_global_config", "--nocapture", "-q"]);
    for (key, value) in vars {
        command.env(key, value);
    }
    let output = command.output().expect("run config test");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("config "))
        .map(str::to_string)
        .unwrap();
    let fields: Vec<&str> = line.split_whitespace().collect();
    (
        fields[0].parse().unwrap(),
        fields[1].parse().unwrap(),
        fields[2].parse().unwrap(),
    )
}

#[test]
fn env_overrides_reach_the_global_config() {
    let (planning, cache, max) = global_config_with(&[
        ("SCIFFTPACK_ENABLE_ND_PLANNING", "false"),
        ("SCIFFTPACK_PLAN_CACHE_SIZE", "3"),
        ("SCIFFTPACK_MAX_ELEMENTS", "4096"),
    ]);
    assert!(!planning);
    assert_eq!(cache, 3);
    assert_eq!(max, 4096);
}

#[test]
fn invalid_env_value_falls_back_to_defaults() {
    let defaults = FftConfig::default();
    let (planning, cache, max) =
        global_config_with(&[("SCIFFTPACK_PLAN_CACHE_SIZE", "not-a-number")]);
    assert_eq!(planning, defaults.enable_nd_planning);
    assert_eq!(cache, defaults.plan_cache_size);
    assert_eq!(max, defaults.max_elements);
}

#[test]
fn from_env_reports_the_offending_variable() {
    let err = FftConfig::from_lookup(|key| {
        (key == "SCIFFTPACK_MAX_ELEMENTS").then(|| "-1".to_string())
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "invalid value \"-1\" for SCIFFTPACK_MAX_ELEMENTS");
}
