/// Slave-side timeouts and malformed frames

use std::thread;
use std::time::Duration;

use dgr_relay::{DgrContext, DgrError, RelayConfig};
use dgr_shared::{encode, CodecError, TableError, VariableTable};
use dgr_test::{fast_relay_config, init_logger, slave_config, LocalNetwork};

fn frame_with_score(value: u8) -> Vec<u8> {
    let mut table = VariableTable::new();
    table.set("score", &[value]).unwrap();
    encode(&table)
}

#[test]
fn slave_gives_up_without_first_frame() {
    init_logger();
    let network = LocalNetwork::new();
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());

    let result = slave.init(&slave_config(8000));

    assert_eq!(
        result,
        Err(DgrError::ReceiveTimeout {
            waited: fast_relay_config().initial_timeout,
            first_receive: true,
        })
    );
    assert!(result.unwrap_err().is_fatal());
}

#[test]
fn silence_within_window_is_tolerated() {
    let network = LocalNetwork::new();
    network.inject(8100, &frame_with_score(1));
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());
    slave.init(&slave_config(8100)).unwrap();

    for _ in 0..3 {
        assert!(slave.post_swap().is_ok());
    }
    assert_eq!(slave.table().get_bytes("score"), Some(&[1u8][..]));
}

#[test]
fn silence_beyond_window_declares_master_dead() {
    let network = LocalNetwork::new();
    network.inject(8200, &frame_with_score(1));
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());
    slave.init(&slave_config(8200)).unwrap();

    thread::sleep(fast_relay_config().staleness_window + Duration::from_millis(50));

    assert!(matches!(
        slave.post_swap(),
        Err(DgrError::ReceiveTimeout {
            first_receive: false,
            ..
        })
    ));
}

#[test]
fn fresh_frame_resets_the_window() {
    let network = LocalNetwork::new();
    network.inject(8300, &frame_with_score(1));
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());
    slave.init(&slave_config(8300)).unwrap();

    for value in 2..5 {
        thread::sleep(fast_relay_config().staleness_window / 2);
        network.inject(8300, &frame_with_score(value));
        slave.post_swap().unwrap();
    }
    assert_eq!(slave.table().get_bytes("score"), Some(&[4u8][..]));
}

#[test]
fn malformed_frame_is_survivable() {
    let network = LocalNetwork::new();
    network.inject(8400, &frame_with_score(1));
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());
    slave.init(&slave_config(8400)).unwrap();

    let mut truncated = frame_with_score(2);
    truncated.pop();
    network.inject(8400, &truncated);

    let error = slave.post_swap().unwrap_err();
    assert!(matches!(
        error,
        DgrError::Decode(CodecError::TruncatedPayload { .. })
    ));
    assert!(!error.is_fatal());
    assert_eq!(slave.table().get_bytes("score"), Some(&[1u8][..]));

    network.inject(8400, &frame_with_score(3));
    slave.post_swap().unwrap();
    assert_eq!(slave.table().get_bytes("score"), Some(&[3u8][..]));
}

#[test]
fn garbage_name_without_terminator_is_rejected() {
    let network = LocalNetwork::new();
    network.inject(8500, &frame_with_score(1));
    let mut slave = DgrContext::with_transport(fast_relay_config(), network.transport());
    slave.init(&slave_config(8500)).unwrap();

    network.inject(8500, &vec![b'A'; 4096]);

    assert!(matches!(
        slave.post_swap(),
        Err(DgrError::Decode(CodecError::NameTooLong { offset: 0, .. }))
    ));
}

#[test]
fn overflowing_frame_still_counts_as_heard_from_master() {
    let config = RelayConfig {
        max_variables: 1,
        ..fast_relay_config()
    };
    let mut source = VariableTable::new();
    source.set("a", &[1]).unwrap();
    source.set("b", &[2]).unwrap();

    let network = LocalNetwork::new();
    network.inject(8600, &encode(&source));
    let mut slave = DgrContext::with_transport(config, network.transport());

    let error = slave.init(&slave_config(8600)).unwrap_err();
    assert!(matches!(
        error,
        DgrError::Decode(CodecError::Table(TableError::CapacityExceeded { .. }))
    ));
    assert!(!error.is_fatal());
    assert_eq!(slave.table().get_bytes("a"), Some(&[1u8][..]));

    // the window is running, so an empty poll within it is not a timeout
    assert_eq!(slave.post_swap(), Ok(()));
}
