//! Inbound frame routing

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, trace};

use zkevents_core::{Command, EventKind, Frame, PendingRequest, PendingTable};
use zkevents_types::AttendanceRecord;

use crate::error::{Error, Result};
use crate::events::EventSink;

/// Completion handle stored with each in-flight command
pub(crate) type AckSender = oneshot::Sender<Result<Frame>>;

/// Routes each decoded inbound frame to acknowledgement resolution,
/// event decoding, or the error channel
///
/// Holds no per-frame state; every frame is processed independently
/// against the pending table.
pub(crate) struct Dispatcher {
    pub(crate) pending: PendingTable<AckSender>,
    pub(crate) sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub(crate) fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            pending: PendingTable::new(),
            sink,
        }
    }

    /// Route one frame
    ///
    /// Returns the command of the pending request an ACK_OK resolved,
    /// so the caller can react to the DISCONNECT acknowledgement.
    pub(crate) fn dispatch(&self, frame: Frame) -> Option<Command> {
        match frame.command_kind() {
            Some(Command::AckOk) => match self.pending.resolve(frame.reply_id) {
                Some(request) => {
                    let command = request.command;
                    let _ = request.completion.send(Ok(frame));
                    Some(command)
                }
                None => {
                    self.sink.error(Error::UnmatchedReply(frame.reply_id));
                    None
                }
            },

            // The device reuses ENABLE_EVENTS as the tag on every
            // unsolicited push, with the session-id field carrying the
            // event kind
            Some(Command::EnableEvents) => {
                self.dispatch_event(frame);
                None
            }

            Some(Command::AckError) => {
                match self.pending.resolve(frame.reply_id) {
                    Some(PendingRequest {
                        command,
                        frame: original,
                        completion,
                    }) => {
                        let _ = completion.send(Err(Error::CommandRejected {
                            command,
                            reply_id: frame.reply_id,
                        }));
                        self.sink.error(Error::PacketSendErr {
                            reply_id: frame.reply_id,
                            request: Some(original),
                        });
                    }
                    None => self.sink.error(Error::PacketSendErr {
                        reply_id: frame.reply_id,
                        request: None,
                    }),
                }
                None
            }

            _ => {
                self.sink.error(Error::PacketTypeUnk { frame });
                None
            }
        }
    }

    fn dispatch_event(&self, frame: Frame) {
        match EventKind::try_from(frame.session_id) {
            Ok(EventKind::Transaction) => match AttendanceRecord::parse(&frame.payload) {
                Ok(record) => {
                    debug!(%record, "Attendance transaction");
                    self.sink.transaction(record);
                }
                Err(e) => self.sink.error(Error::Event(e)),
            },

            // Only the transaction payload layout is known; every other
            // event kind is dropped without notification
            _ => trace!(
                kind = frame.session_id,
                "Ignoring unrecognized real-time event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    use crate::events::DeviceEvent;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<DeviceEvent>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<DeviceEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl EventSink for RecordingSink {
        fn connected(&self) {
            self.events.lock().unwrap().push(DeviceEvent::Connected);
        }

        fn disconnected(&self) {
            self.events.lock().unwrap().push(DeviceEvent::Disconnected);
        }

        fn transaction(&self, record: AttendanceRecord) {
            self.events
                .lock()
                .unwrap()
                .push(DeviceEvent::Transaction(record));
        }

        fn error(&self, error: Error) {
            self.events.lock().unwrap().push(DeviceEvent::Error(error));
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (Dispatcher::new(sink.clone()), sink)
    }

    fn register(dispatcher: &Dispatcher, reply_id: u16, command: Command) -> oneshot::Receiver<Result<Frame>> {
        let (tx, rx) = oneshot::channel();
        let frame = Frame::outbound(command, 0x55AA, reply_id, Bytes::new());
        dispatcher
            .pending
            .register(reply_id, command, frame.encode().freeze(), tx);
        rx
    }

    fn transaction_payload() -> Vec<u8> {
        let mut data = vec![0u8; 32];
        data[0] = b'4';
        data[1] = b'2';
        data[25] = 0x01;
        data[26] = 0x17;
        data[27] = 0x06;
        data[28] = 0x0F;
        data[29] = 0x08;
        data[30] = 0x1E;
        data
    }

    #[test]
    fn test_ack_ok_completes_matching_waiter() {
        let (dispatcher, sink) = dispatcher();
        let mut rx = register(&dispatcher, 1, Command::EnableEvents);

        let resolved =
            dispatcher.dispatch(Frame::outbound(Command::AckOk, 0x55AA, 1, Bytes::new()));

        assert_eq!(resolved, Some(Command::EnableEvents));
        let ack = rx.try_recv().unwrap().unwrap();
        assert_eq!(ack.command_kind(), Some(Command::AckOk));
        assert!(sink.take().is_empty());
        assert!(dispatcher.pending.is_empty());
    }

    #[test]
    fn test_ack_ok_unmatched_is_correlation_fault() {
        let (dispatcher, sink) = dispatcher();

        let resolved =
            dispatcher.dispatch(Frame::outbound(Command::AckOk, 0x55AA, 7, Bytes::new()));

        assert_eq!(resolved, None);
        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DeviceEvent::Error(Error::UnmatchedReply(7))
        ));
    }

    #[test]
    fn test_disconnect_ack_reports_resolved_command() {
        let (dispatcher, _sink) = dispatcher();
        let _rx = register(&dispatcher, 2, Command::Disconnect);

        let resolved =
            dispatcher.dispatch(Frame::outbound(Command::AckOk, 0x55AA, 2, Bytes::new()));

        assert_eq!(resolved, Some(Command::Disconnect));
    }

    #[test]
    fn test_ack_error_rejects_waiter_and_publishes_fault() {
        let (dispatcher, sink) = dispatcher();
        let mut rx = register(&dispatcher, 3, Command::UnlockDoor);

        dispatcher.dispatch(Frame::outbound(Command::AckError, 0x55AA, 3, Bytes::new()));

        let rejection = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(
            rejection,
            Error::CommandRejected {
                command: Command::UnlockDoor,
                reply_id: 3
            }
        ));

        let events = sink.take();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::Error(err @ Error::PacketSendErr { reply_id: 3, request }) => {
                assert_eq!(err.code(), Some("PACKETSENDERR"));
                // Carries the frame bytes as they went out
                assert_eq!(&request.as_ref().unwrap()[0..4], &[0x50, 0x50, 0x82, 0x7D]);
            }
            other => panic!("Expected PACKETSENDERR, got {:?}", other),
        }
        assert!(dispatcher.pending.is_empty());
    }

    #[test]
    fn test_ack_error_without_pending_entry() {
        let (dispatcher, sink) = dispatcher();

        dispatcher.dispatch(Frame::outbound(Command::AckError, 0x55AA, 9, Bytes::new()));

        let events = sink.take();
        assert!(matches!(
            events[0],
            DeviceEvent::Error(Error::PacketSendErr {
                reply_id: 9,
                request: None
            })
        ));
    }

    #[test]
    fn test_unknown_command_is_packet_type_fault() {
        let (dispatcher, sink) = dispatcher();

        let mut frame = Frame::outbound(Command::Connect, 0, 0, Bytes::new());
        frame.command = 0x0BB8;
        dispatcher.dispatch(frame);

        let events = sink.take();
        match &events[0] {
            DeviceEvent::Error(err @ Error::PacketTypeUnk { frame }) => {
                assert_eq!(err.code(), Some("PACKETTYPEUNK"));
                assert_eq!(frame.command, 0x0BB8);
            }
            other => panic!("Expected PACKETTYPEUNK, got {:?}", other),
        }
    }

    #[test]
    fn test_inbound_request_command_is_packet_type_fault() {
        // A known code that is not an ack and not an event push is
        // still unexpected inbound
        let (dispatcher, sink) = dispatcher();

        dispatcher.dispatch(Frame::outbound(Command::Connect, 0, 0, Bytes::new()));

        assert!(matches!(
            sink.take()[0],
            DeviceEvent::Error(Error::PacketTypeUnk { .. })
        ));
    }

    #[test]
    fn test_transaction_event_decodes_and_publishes() {
        let (dispatcher, sink) = dispatcher();

        // Session-id field carries the event kind on unsolicited frames
        dispatcher.dispatch(Frame::outbound(
            Command::EnableEvents,
            u16::from(EventKind::Transaction),
            0,
            transaction_payload(),
        ));

        let events = sink.take();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DeviceEvent::Transaction(record) => {
                assert_eq!(record.enroll_number, "42");
                assert_eq!(record.year, 2023);
            }
            other => panic!("Expected transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_kind_is_silent() {
        let (dispatcher, sink) = dispatcher();

        dispatcher.dispatch(Frame::outbound(
            Command::EnableEvents,
            0x0002,
            0,
            transaction_payload(),
        ));

        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_short_event_payload_is_fault() {
        let (dispatcher, sink) = dispatcher();

        dispatcher.dispatch(Frame::outbound(
            Command::EnableEvents,
            u16::from(EventKind::Transaction),
            0,
            vec![0u8; 8],
        ));

        assert!(matches!(
            sink.take()[0],
            DeviceEvent::Error(Error::Event(zkevents_types::Error::PayloadTooShort { .. }))
        ));
    }
}
