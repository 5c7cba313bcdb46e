//! MST event-code rules run through the engine with the MST event table.

use std::sync::Arc;

use dplinkcheck::constants::{EVENT_CODE_OFFSET, EVENT_CODE_WIDTH};
use dplinkcheck::{
    CheckerKind, EventClassifier, EventCodeTable, FieldLayout, LinkConfig, LinkWidth,
    StateRecord, TestGroup, ValidationEngine,
};

fn mst_records(events: &[&str]) -> Vec<StateRecord> {
    let table = EventCodeTable::mst();
    events
        .iter()
        .map(|event| {
            let code = table.code_of(event).expect("event is in the MST table");
            StateRecord::default()
                .with_bits(EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, code)
                .unwrap()
        })
        .collect()
}

fn mst_engine(width: LinkWidth) -> ValidationEngine {
    let mut engine = ValidationEngine::with_decoders(
        LinkConfig::new(width),
        Arc::new(FieldLayout::sst()),
        Arc::new(EventClassifier::mst()),
    );
    engine.register_group(TestGroup::Mst).unwrap();
    engine
}

const GOOD_LINE: &[&str] = &[
    "BS", "BS", "BS", "BS", "VBID", "MVID", "MAUD", "MSA", "MSA", "Stream Fill", "BE", "Pixel",
    "Pixel", "VCPF", "Pixel",
];

#[test]
fn mst_group_registers_three_rules() {
    let engine = mst_engine(LinkWidth::Four);
    assert_eq!(
        engine.registered(),
        vec![
            CheckerKind::StateSequence,
            CheckerKind::SymbolGrouping,
            CheckerKind::PixelFollowsBe,
        ]
    );
}

#[test]
fn well_formed_mst_lines_pass_every_rule() {
    let mut engine = mst_engine(LinkWidth::Four);
    let mut events = vec!["Pixel"];
    for _ in 0..3 {
        events.extend(GOOD_LINE);
    }
    let findings: Vec<_> = mst_records(&events)
        .iter()
        .flat_map(|record| engine.process_state(record))
        .collect();
    assert!(findings.is_empty(), "{findings:?}");
    assert!(engine.all_passed());
}

#[test]
fn broken_line_is_reported_by_each_rule() {
    let mut engine = mst_engine(LinkWidth::Four);
    let mut events = vec!["Pixel"];
    events.extend(GOOD_LINE);
    events.extend([
        "BS", "BS", "BS", "BS", "BS", "VBID", "MVID", "MAUD", "BE", "Stream Fill",
    ]);
    let findings: Vec<_> = mst_records(&events)
        .iter()
        .flat_map(|record| engine.process_state(record))
        .map(|finding| (finding.kind, finding.message))
        .collect();
    assert_eq!(
        findings,
        vec![
            (CheckerKind::SymbolGrouping, "BS Symbol Grouping Error.".to_string()),
            (
                CheckerKind::StateSequence,
                "Invalid Blanking Section Stuff Packet location.".to_string()
            ),
            (
                CheckerKind::PixelFollowsBe,
                "Pixel Does Not Immediately Follow BE Symbol.".to_string()
            ),
        ]
    );
}
