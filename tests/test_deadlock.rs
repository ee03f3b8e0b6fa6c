use std::time::Duration;

use crate::exchange_test_utils::ExchangeHarnessBuilder;
use blocking_exchange::exchange::config::Schedule;


// Both ranks send first with messages the transport cannot buffer. Neither send can return, so
// the harness must not see the exchange finish. The blocked threads are abandoned.
#[test]
fn symmetric_schedule_above_threshold_hangs() {
    let outcome = ExchangeHarnessBuilder::default()
        .message_size(262144)
        .eager_limit_bytes(64 * 1024)
        .schedule(Schedule::Symmetric)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
        .run();

    assert!(outcome.timed_out());
}

// Below the threshold the transport buffers both sends, which hides the ordering problem.
#[test]
fn symmetric_schedule_below_threshold_completes() {
    let outcomes = ExchangeHarnessBuilder::default()
        .message_size(16)
        .eager_limit_bytes(64 * 1024)
        .schedule(Schedule::Symmetric)
        .build()
        .unwrap()
        .run()
        .finished();

    assert!(outcomes[0].endpoint.receive_buffer().all_equal(1));
    assert!(outcomes[1].endpoint.receive_buffer().all_equal(12345));
}

#[test]
fn safe_schedule_with_same_sizes_completes() {
    let outcome = ExchangeHarnessBuilder::default()
        .message_size(262144)
        .eager_limit_bytes(64 * 1024)
        .schedule(Schedule::Safe)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
        .run();

    assert!(!outcome.timed_out());
}
