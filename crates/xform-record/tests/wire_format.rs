use chrono::DateTime;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use xform_record::{
    json, MetadataBody, MetadataRecord, Record, RecordBody, RecordHeader, RequestInfoBody,
    RequestInfoRecord, TransformationBody, TransformationRecord, ABSENT_LENGTH,
};

fn request_info(id: &str) -> RequestInfoRecord {
    Record::new(RequestInfoBody {
        header: RecordHeader::current::<RequestInfoBody>(id),
        metacard_location: Some("http://localhost/metacard".into()),
        current_location: Some("http://localhost/current".into()),
        final_location: Some("http://localhost/final".into()),
    })
}

fn metadata(id: &str, kind: &str) -> MetadataRecord {
    Record::new(MetadataBody {
        header: RecordHeader::current::<MetadataBody>(id),
        transform_id: Some("t-1".into()),
        metadata_type: Some(kind.into()),
        request_info: Some(request_info("r-1")),
        state: Some("SUCCESSFUL".into()),
        start_time: DateTime::from_timestamp(1_704_067_200, 0),
        completion_time: DateTime::from_timestamp(1_704_067_205, 250_000_000),
        content_type: Some("text/plain".into()),
        content_length: 2,
        failure_reason: None,
        failure_message: None,
    })
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle} not found in {haystack}"))
}

#[test]
fn request_info_field_order() {
    let text = json::to_string(&request_info("r-1")).unwrap();

    let order = [
        "\"clazz\"",
        "\"id\"",
        "\"version\"",
        "\"metacard_location\"",
        "\"current_location\"",
        "\"final_location\"",
    ];
    let positions: Vec<_> = order.iter().map(|f| position(&text, f)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
}

#[test]
fn metadata_field_order_and_omitted_optionals() {
    let text = json::to_string(&metadata("m-1", "idx")).unwrap();

    let order = [
        "\"clazz\":\"metadata\"",
        "\"id\":\"m-1\"",
        "\"version\":1",
        "\"transform_id\"",
        "\"type\":\"idx\"",
        "\"request_info\"",
        "\"state\"",
        "\"start_time\"",
        "\"completion_time\"",
        "\"content_type\"",
        "\"content_length\":2",
    ];
    let positions: Vec<_> = order.iter().map(|f| position(&text, f)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");

    assert!(!text.contains("failure_reason"));
    assert!(!text.contains("failure_message"));
    assert!(!text.contains("null"));
}

#[test]
fn absent_length_is_written() {
    let record = MetadataRecord::new(MetadataBody {
        header: RecordHeader::current::<MetadataBody>("m-2"),
        ..MetadataBody::default()
    });

    let value: Value = serde_json::from_str(&json::to_string(&record).unwrap()).unwrap();
    assert_eq!(value["content_length"], json!(ABSENT_LENGTH));
}

#[test]
fn missing_length_decodes_as_absent() {
    let record: MetadataRecord =
        json::from_str(r#"{"clazz":"metadata","id":"m","version":1}"#).unwrap();
    assert_eq!(record.body().content_length, ABSENT_LENGTH);
}

#[test]
fn timestamps_are_decimal_epoch_seconds() {
    let text = json::to_string(&metadata("m-1", "idx")).unwrap();
    assert!(text.contains("\"start_time\":1704067200.000000000,"), "{text}");
    assert!(text.contains("\"completion_time\":1704067205.250000000,"), "{text}");
}

#[test]
fn reads_epoch_seconds_records() {
    let text = r#"{
        "clazz": "metadata",
        "id": "1234",
        "version": 1,
        "transform_id": "9991234",
        "request_info": {
            "clazz": "request",
            "id": "1234",
            "version": 1,
            "metacard_location": "http://localhost/metcard",
            "current_location": "http://localhost/current",
            "final_location": "http://localhost/final"
        },
        "start_time": 1577836800.123456789,
        "completion_time": 1577836830.123456789,
        "state": "IN_PROGRESS",
        "type": "irm",
        "content_type": "application/xml",
        "content_length": 1024
    }"#;

    let record: MetadataRecord = json::from_str(text).unwrap();
    let body = record.body();
    assert!(!record.is_unknown());
    assert_eq!(record.id(), Some("1234"));
    assert_eq!(body.start_time, DateTime::from_timestamp(1_577_836_800, 123_456_789));
    assert_eq!(body.completion_time, DateTime::from_timestamp(1_577_836_830, 123_456_789));
    assert_eq!(body.content_length, 1024);

    let written = json::to_string(&record).unwrap();
    assert!(written.contains("\"start_time\":1577836800.123456789,"), "{written}");
    assert!(written.contains("\"completion_time\":1577836830.123456789,"), "{written}");

    let back: MetadataRecord = json::from_str(&written).unwrap();
    assert_eq!(back, record);
}

#[test]
fn reads_whole_seconds_and_rfc3339() {
    let whole: TransformationRecord =
        json::from_str(r#"{"clazz":"transformation","id":"t","version":1,"start_time":1577836800}"#)
            .unwrap();
    let text: TransformationRecord = json::from_str(
        r#"{"clazz":"transformation","id":"t","version":1,"start_time":"2020-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    assert_eq!(whole.body().start_time, DateTime::from_timestamp(1_577_836_800, 0));
    assert_eq!(whole, text);
}

#[test]
fn invalid_timestamp_is_malformed() {
    let err = json::from_str::<TransformationRecord>(
        r#"{"clazz":"transformation","id":"t","version":1,"start_time":true}"#,
    )
    .unwrap_err();
    assert!(matches!(err, xform_record::CodecError::Malformed(_)));
}

#[test]
fn nested_records_keep_their_tags() {
    let record = TransformationRecord::new(TransformationBody {
        header: RecordHeader::current::<TransformationBody>("t-1"),
        request_info: Some(request_info("r-1")),
        start_time: DateTime::from_timestamp(1_704_067_200, 0),
        metadatas: vec![metadata("m-1", "a"), metadata("m-2", "b")],
    });

    let text = json::to_string(&record).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["clazz"], json!("transformation"));
    assert_eq!(value["request_info"]["clazz"], json!("request"));
    assert_eq!(value["metadatas"][1]["clazz"], json!("metadata"));
    assert_eq!(value["metadatas"][1]["type"], json!("b"));

    let back: TransformationRecord = json::from_str(&text).unwrap();
    assert_eq!(back, record);
}

#[test]
fn unrecognized_nested_tag_degrades() {
    let text = r#"{
        "clazz": "metadata",
        "id": "m-1",
        "version": 1,
        "request_info": {"clazz": "request-v7", "id": "r-1", "version": 7}
    }"#;

    let record: MetadataRecord = json::from_str(text).unwrap();
    assert!(!record.is_unknown());

    let nested = record.body().request_info.as_ref().unwrap();
    assert!(nested.is_unknown());
    assert_eq!(nested.clazz(), Some("request-v7"));
    assert_eq!(nested.id(), Some("r-1"));
}

#[test]
fn non_string_tag_degrades() {
    let text = r#"{
        "clazz": "metadata",
        "id": "m-1",
        "version": 1,
        "request_info": {"clazz": 5, "id": "r-1", "version": 1}
    }"#;

    let record: MetadataRecord = json::from_str(text).unwrap();
    let nested = record.body().request_info.as_ref().unwrap();
    assert!(nested.is_unknown());
    assert_eq!(nested.clazz(), None);
    assert_eq!(nested.id(), Some("r-1"));

    let top: RequestInfoRecord =
        json::from_str(r#"{"clazz":{"name":"request"},"id":"r-2","version":1}"#).unwrap();
    assert!(top.is_unknown());
    assert_eq!(top.version(), 1);
}

#[test]
fn future_fields_are_ignored() {
    let text = r#"{
        "clazz": "request",
        "id": "r-9",
        "version": 1001,
        "metacard_location": "http://localhost/m",
        "priority": 5,
        "labels": ["x"]
    }"#;

    let record: RequestInfoRecord = json::from_str(text).unwrap();
    assert!(record.is_supported_version());
    assert_eq!(record.version(), 1001);
    assert_eq!(
        record.body().metacard_location.as_deref(),
        Some("http://localhost/m")
    );
}

#[test]
fn missing_version_is_below_minimum() {
    let record: RequestInfoRecord = json::from_str(r#"{"clazz":"request","id":"r"}"#).unwrap();
    assert_eq!(record.version(), 0);
    assert!(record.version() < RequestInfoBody::MINIMUM_VERSION);
    assert!(!record.is_supported_version());
}

#[test]
fn buffer_and_stream_are_byte_identical() {
    let record = metadata("m-1", "idx");

    let mut sink = Vec::new();
    json::to_writer(&mut sink, &record).unwrap();

    assert_eq!(sink, json::to_vec(&record).unwrap());

    let back: MetadataRecord = json::from_reader(sink.as_slice()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn malformed_payload_is_reported() {
    let err = json::from_str::<MetadataRecord>(r#"{"clazz":"metadata","version":"one"}"#)
        .unwrap_err();
    assert!(matches!(err, xform_record::CodecError::Malformed(_)));
    assert!(err.to_string().starts_with("malformed record"));
}
