use crate::exchange_test_utils::ExchangeHarnessBuilder;
use blocking_exchange::exchange::error::ExchangeError;


fn assert_aborts_without_transfer(num_parts: u32) {
    let outcomes = ExchangeHarnessBuilder::default()
        .num_parts(num_parts)
        .message_size(262144)
        .build()
        .unwrap()
        .run()
        .finished();

    assert_eq!(num_parts as usize, outcomes.len());
    for outcome in outcomes {
        assert!(matches!(
            outcome.result,
            Err(ExchangeError::WrongGroupSize { size }) if size == num_parts
        ));
        assert_eq!(0, outcome.sent_messages);
        assert_eq!(0, outcome.received_messages);
        assert_eq!(outcome.initial_send, outcome.endpoint.send_buffer().as_slice());
        assert_eq!(
            outcome.initial_receive,
            outcome.endpoint.receive_buffer().as_slice()
        );
    }
}

#[test]
fn single_participant() {
    assert_aborts_without_transfer(1);
}

#[test]
fn three_participants() {
    assert_aborts_without_transfer(3);
}
