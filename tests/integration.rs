use solar_noon::{estimator::Method, types::Results};
use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> bool {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_solar-noon"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    if !output.status.success() {
        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");
        eprintln!("binary failed with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n");
    }

    output.status.success()
}

fn make_test_dir(name: &str, config_contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    fs::write(test_dir.join("config.toml"), config_contents)
        .expect("failed to write config file");

    test_dir
}

#[test]
fn basic_workflow() {
    let config_contents = String::new()
        + "[estimator]\n"
        + "methods = [ \"energy-com\", \"sunrise-sunset\",]\n"
        + "threshold = 0.005\n"
        + "\n"
        + "[synth]\n"
        + "n_days = 20\n"
        + "samples_per_day = 288\n"
        + "peak_power = 4.5\n"
        + "noon_hour = 12.75\n"
        + "noon_swing = 0.25\n"
        + "daylight_hours = 13.0\n"
        + "prob_cloud = 0.05\n"
        + "prob_missing = 0.01\n"
        + "std_dev_noise = 0.005\n"
        + "seed = 42\n";
    let test_dir = make_test_dir("basic_workflow", &config_contents);

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(run_bin(&["--data-dir", test_dir_str, "synth"]));
    assert!(run_bin(&["--data-dir", test_dir_str, "synth"]));
    assert!(test_dir.join("matrix-0000.msgpack").is_file());
    assert!(test_dir.join("matrix-0001.msgpack").is_file());

    assert!(run_bin(&["--data-dir", test_dir_str, "estimate"]));
    for file_idx in 0..2 {
        let results_file = test_dir.join(format!("noon-{file_idx:04}.msgpack"));
        let results = Results::load(&results_file).expect("failed to load results");

        let methods: Vec<_> = results.estimates.iter().map(|est| est.method).collect();
        assert_eq!(methods, vec![Method::EnergyCom, Method::SunriseSunset]);

        for est in &results.estimates {
            assert_eq!(est.solar_noon.len(), 20);
            assert!(
                est.solar_noon
                    .iter()
                    .all(|noon| noon.is_nan() || (0.0..=24.0).contains(noon))
            );
            let error = est.report.error.as_ref().expect("missing error report");
            assert!(error.mean.abs() < 0.5, "{:?}: {error:?}", est.method);
        }
    }

    assert!(run_bin(&["--data-dir", test_dir_str, "clean"]));
    assert!(!test_dir.join("noon-0000.msgpack").exists());
    assert!(!test_dir.join("noon-0001.msgpack").exists());
    assert!(test_dir.join("matrix-0000.msgpack").is_file());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn synth_requires_section() {
    let test_dir = make_test_dir("synth_requires_section", "[estimator]\nthreshold = 0.01\n");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(!run_bin(&["--data-dir", test_dir_str, "synth"]));
    assert!(run_bin(&["--data-dir", test_dir_str, "estimate"]));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails() {
    let test_dir = make_test_dir("invalid_config_fails", "[estimator]\nthreshold = -1.0\n");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(!run_bin(&["--data-dir", test_dir_str, "estimate"]));

    fs::remove_dir_all(&test_dir).ok();
}
