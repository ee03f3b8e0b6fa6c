use std::fs;
use std::io::Write;

use blocking_exchange::exchange::config::{CommandLineArgs, Config};
use blocking_exchange::exchange::controller::local_controller::run_channel;
use blocking_exchange::exchange::controller::{outcome_line, try_join};
use serial_test::serial;

#[test]
#[serial]
fn channel_run_from_config_file_logs_per_rank() {
    let output = tempfile::tempdir().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "modules:\n  exchange:\n    message_size: 100000\n  transport:\n    eager_limit_bytes: 1024\n  output:\n    output_dir: {}\n    logging: Info",
        output.path().display()
    )
    .unwrap();

    let args = CommandLineArgs {
        config_path: Some(file.path().to_str().unwrap().to_string()),
        ..Default::default()
    };
    let config = Config::from_args(&args).unwrap();

    let results = try_join(run_channel(config).unwrap());
    let initiator = results[&0].as_ref().unwrap();
    assert_eq!(
        Some("Y now has the value 1".to_string()),
        outcome_line(initiator)
    );

    let log_0 = fs::read_to_string(output.path().join("log_process_0.txt")).unwrap();
    let log_1 = fs::read_to_string(output.path().join("log_process_1.txt")).unwrap();
    assert!(log_0.contains("Process 0 sending to process 1"));
    assert!(log_0.contains("Message size is 400000 bytes"));
    assert!(log_1.contains("Process 1 receiving from process 0"));
}

#[test]
#[serial]
fn channel_run_with_three_participants_aborts_every_rank() {
    let args = CommandLineArgs {
        num_parts: Some(3),
        message_size: Some(16),
        ..Default::default()
    };
    let config = Config::from_args(&args).unwrap();

    let results = try_join(run_channel(config).unwrap());
    assert_eq!(3, results.len());
    assert!(results
        .values()
        .all(|r| matches!(r, Err(e) if e.is_wrong_group_size())));
}
