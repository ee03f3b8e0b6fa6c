use blocking_exchange::exchange::communication::local_communicator::ChannelCommunicator;
use blocking_exchange::exchange::communication::{ExchangeCommunicator, EXCHANGE_TAG};
use blocking_exchange::exchange::error::ExchangeError;
use std::thread;

#[test]
fn oversize_message_is_rejected_without_partial_write() {
    let mut comms = ChannelCommunicator::create_n_2_n(2, 0);
    let receiver = comms.pop().unwrap();
    let sender = comms.pop().unwrap();

    let sending = thread::spawn(move || {
        sender.send(&[7; 1000], 1, EXCHANGE_TAG).unwrap();
        sender.sent_messages()
    });

    let mut small = vec![-1; 999];
    let err = receiver
        .receive_into(&mut small, 0, EXCHANGE_TAG)
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::SizeMismatch {
            expected: 999,
            received: 1000
        }
    ));
    assert!(small.iter().all(|e| *e == -1));

    // the rendezvous send is only released once a fitting receive drains it
    let mut fitting = vec![0; 1000];
    assert_eq!(
        1000,
        receiver
            .receive_into(&mut fitting, 0, EXCHANGE_TAG)
            .unwrap()
    );
    assert!(fitting.iter().all(|e| *e == 7));
    assert_eq!(1, sending.join().unwrap());
}
