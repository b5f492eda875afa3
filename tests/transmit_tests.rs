use rn2483::{
    device::Rn2483,
    dispatcher::{DEFAULT_TIMEOUT_MS, EXTENDED_TIMEOUT_MS},
    hex::{HexError, Payload},
    response::ResponseKind,
    transmit::{Downlink, Transmission},
    Error,
};

mod mock;
use mock::{MockDelay, MockTransport};

const TX_TTN: &str = "mac tx uncnf 1 54544e";

fn module(transport: MockTransport) -> Rn2483<MockTransport, MockDelay> {
    Rn2483::new(transport, MockDelay::new())
}

#[test]
fn test_transmit_text() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["ok", "mac_tx_ok"]));

    let transmission = module.transmit_unconfirmed("TTN").unwrap();
    assert_eq!(transmission, Transmission::Sent);
    assert_eq!(transmission.downlink(), None);

    let (transport, delay) = module.release();
    assert!(transport.is_exhausted());
    assert_eq!(
        transport.read_timeouts(),
        &[DEFAULT_TIMEOUT_MS, EXTENDED_TIMEOUT_MS]
    );
    assert!(delay.waits.is_empty());
}

#[test]
fn test_transmit_with_downlink() {
    let mut module = module(
        MockTransport::new().expect(TX_TTN, &["ok", "mac_rx 1 48656c6c6f"]),
    );

    let transmission = module.transmit_unconfirmed("TTN").unwrap();
    let downlink = transmission.downlink().unwrap();
    assert_eq!(downlink.port, 1);
    assert_eq!(&downlink.payload[..], b"Hello");
}

#[test]
fn test_transmit_retries_while_busy() {
    let mut module = module(
        MockTransport::new()
            .expect(TX_TTN, &["busy"])
            .expect(TX_TTN, &["busy"])
            .expect(TX_TTN, &["busy"])
            .expect(TX_TTN, &["ok", "mac_tx_ok"]),
    );

    assert_eq!(module.transmit_unconfirmed("TTN"), Ok(Transmission::Sent));

    let (transport, delay) = module.release();
    assert_eq!(transport.count(TX_TTN), 4);
    assert_eq!(delay.waits, vec![1_000, 1_000, 1_000]);
}

#[test]
fn test_transmit_busy_exhausted() {
    let mut transport = MockTransport::new();
    for _ in 0..10 {
        transport = transport.expect(TX_TTN, &["busy"]);
    }
    let mut module = module(transport);

    assert_eq!(
        module.transmit_unconfirmed("TTN"),
        Err(Error::TransmitFailure(None))
    );

    let (transport, delay) = module.release();
    assert_eq!(transport.count(TX_TTN), 10);
    assert_eq!(delay.waits.len(), 9);
}

#[test]
fn test_transmit_rejected_is_not_retried() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["not_joined"]));

    assert_eq!(
        module.transmit_unconfirmed("TTN"),
        Err(Error::TransmitFailure(Some(ResponseKind::Error)))
    );

    let (transport, delay) = module.release();
    assert_eq!(transport.count(TX_TTN), 1);
    assert!(delay.waits.is_empty());
}

#[test]
fn test_transmit_mac_error_after_ack() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["ok", "mac_err"]));

    assert_eq!(
        module.transmit_unconfirmed("TTN"),
        Err(Error::TransmitFailure(Some(ResponseKind::Error)))
    );
}

#[test]
fn test_transmit_completion_timeout() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["ok"]));

    assert_eq!(
        module.transmit_unconfirmed("TTN"),
        Err(Error::TransmitFailure(Some(ResponseKind::Timeout)))
    );
}

#[test]
fn test_transmit_confirmed_bytes() {
    let mut module = module(
        MockTransport::new().expect("mac tx cnf 1 01ab", &["ok", "mac_tx_ok"]),
    );

    let payload: &[u8] = &[0x01, 0xab];
    assert_eq!(module.transmit_confirmed(payload), Ok(Transmission::Sent));
}

#[test]
fn test_transmit_payload_too_large() {
    let mut module = module(MockTransport::new());

    let payload = [0u8; 223];
    assert_eq!(
        module.transmit_unconfirmed(Payload::Bytes(&payload)),
        Err(Error::PayloadTooLarge(223))
    );

    let (transport, _) = module.release();
    assert!(transport.written().is_empty());
}

#[test]
fn test_transmit_largest_payload() {
    let payload = [0xffu8; 222];
    let command = format!("mac tx uncnf 1 {}", "ff".repeat(222));
    let mut module = module(MockTransport::new().expect(&command, &["ok", "mac_tx_ok"]));

    assert_eq!(
        module.transmit_unconfirmed(&payload[..]),
        Ok(Transmission::Sent)
    );
}

#[test]
fn test_transmit_malformed_downlink() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["ok", "mac_rx 2 4g"]));

    assert_eq!(
        module.transmit_unconfirmed("TTN"),
        Err(Error::MalformedEncoding(HexError::InvalidDigit { index: 1 }))
    );
}

#[test]
fn test_transmit_empty_downlink() {
    let mut module = module(MockTransport::new().expect(TX_TTN, &["ok", "mac_rx 3"]));

    let transmission = module.transmit_unconfirmed("TTN").unwrap();
    assert_eq!(
        transmission,
        Transmission::Received(Downlink {
            port: 3,
            payload: heapless::Vec::new(),
        })
    );
}
