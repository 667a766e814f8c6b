use super::*;

#[test]
fn subscribe_serializes_verbatim() {
    let json = Envelope::subscribe("call_created").to_json().expect("serialize");
    assert_eq!(json, r#"{"op":"subscribe","data":{"event_name":"call_created"}}"#);
}

#[test]
fn start_omits_data_entirely() {
    let json = Envelope::start().to_json().expect("serialize");
    assert_eq!(json, r#"{"op":"start"}"#);
}

#[test]
fn token_serializes_verbatim() {
    let json = Envelope::token("secret").to_json().expect("serialize");
    assert_eq!(json, r#"{"op":"token","data":{"token":"secret"}}"#);
}

#[test]
fn ping_serializes_verbatim() {
    let json = Envelope::ping("hello").to_json().expect("serialize");
    assert_eq!(json, r#"{"op":"ping","data":{"payload":"hello"}}"#);
}

#[test]
fn inbound_event_exposes_name() {
    let envelope = Envelope::from_json(r#"{"op":"event","data":{"name":"call_created","foo":1}}"#)
        .expect("decode");
    assert_eq!(envelope.op, OP_EVENT);
    assert_eq!(envelope.event_name(), Some("call_created"));
}

#[test]
fn inbound_without_data_has_no_event_name() {
    let envelope = Envelope::from_json(r#"{"op":"init"}"#).expect("decode");
    assert_eq!(envelope.op, OP_INIT);
    assert!(envelope.data.is_none());
    assert!(envelope.event_name().is_none());
}

#[test]
fn event_name_requires_string_name_field() {
    let envelope = Envelope::from_json(r#"{"op":"event","data":{"name":7}}"#).expect("decode");
    assert!(envelope.event_name().is_none());

    let envelope = Envelope::from_json(r#"{"op":"event","data":{"foo":1}}"#).expect("decode");
    assert!(envelope.event_name().is_none());
}

#[test]
fn unknown_op_is_representable() {
    let envelope = Envelope::from_json(r#"{"op":"resumed","data":{}}"#).expect("decode");
    assert_eq!(envelope.op, "resumed");
}

#[test]
fn malformed_frame_is_a_decode_error() {
    assert!(Envelope::from_json("not json").is_err());
    assert!(Envelope::from_json(r#"{"data":{}}"#).is_err());
    assert!(Envelope::from_json(r#"{"op":7}"#).is_err());
}

#[test]
fn json_round_trip() {
    let original = Envelope::subscribe("call_ended");
    let restored = Envelope::from_json(&original.to_json().expect("serialize")).expect("decode");
    assert_eq!(restored, original);
}
