//! Host configuration and decoder tables loaded from JSON.

mod common;

use std::sync::Arc;

use dplinkcheck::constants::{EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, SYMBOL_BE, SYMBOL_FS};
use dplinkcheck::{
    CheckerKind, ConfigError, EventClassifier, EventCodeTable, FieldLayout, LinkConfig, LinkSpeed,
    LinkWidth, StateRecord, TestGroup, ValidationEngine,
};

fn with_event(record: StateRecord, code: u32) -> StateRecord {
    record
        .with_bits(EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, code)
        .unwrap()
}

#[test]
fn host_config_from_json_drives_the_engine() {
    let json = r#"{ "width": 2, "speed": "5.4G", "max_reported_errors": 25 }"#;
    let config: LinkConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.width, LinkWidth::Two);
    assert_eq!(config.speed, Some(LinkSpeed::Gbps5_4));
    assert_eq!(config.max_reported_errors, 25);

    let mut engine = ValidationEngine::new(config);
    engine.register_group(TestGroup::Audio).unwrap();
    assert_eq!(
        engine.registered(),
        vec![CheckerKind::AudioTimestampVariance, CheckerKind::AudioSampleRate]
    );

    let back: LinkConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn host_parameters_match_json_config() {
    let from_params = LinkConfig::from_params(&["width=2", "Speed: 5.4G"], 25).unwrap();
    let from_json: LinkConfig =
        serde_json::from_str(r#"{ "width": 2, "speed": "5.4G", "max_reported_errors": 25 }"#)
            .unwrap();
    assert_eq!(from_params, from_json);

    assert_eq!(
        LinkConfig::from_params(&["WIDTH:2", "SPEED:3.2G"], 10),
        Err(ConfigError::InvalidSpeed("3.2G".into()))
    );
}

#[test]
fn missing_speed_only_blocks_the_rate_rule() {
    let config: LinkConfig = serde_json::from_str(r#"{ "width": 4 }"#).unwrap();
    assert_eq!(config.speed, None);
    assert_eq!(config.max_reported_errors, 10);

    let mut engine = ValidationEngine::new(config);
    engine.register(CheckerKind::AudioTimestampVariance).unwrap();
    assert!(engine.register(CheckerKind::AudioSampleRate).is_err());
}

#[test]
fn custom_event_table_from_json() {
    let table: EventCodeTable =
        serde_json::from_str(r#"{ "names": { "33": "Hor. BE", "34": "F0 Stuff" } }"#).unwrap();
    let events = Arc::new(EventClassifier::new(&table));
    assert_eq!(events.name(33), "Hor. BE");
    assert_eq!(events.name(35), "Event 0x23");

    let width = LinkWidth::One;
    let mut engine = ValidationEngine::with_decoders(
        LinkConfig::new(width),
        Arc::new(FieldLayout::sst()),
        events,
    );
    engine.register(CheckerKind::FirstPixelPlacement).unwrap();

    let blanking_end = with_event(common::all_lanes(SYMBOL_BE, width, ""), 33);
    let stuffing = with_event(common::all_lanes(SYMBOL_FS, width, ""), 34);
    assert!(engine.process_state(&blanking_end).is_empty());
    let findings = engine.process_state(&stuffing);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "Lane0 - Invalid Start-of Active Video Segment");
}
