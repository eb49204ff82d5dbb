use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use vtodo::codec::{TzMap, timestamp};
use vtodo::model::{Container, ContainerItem, Todo};
use vtodo::parse::{find_components, parse_components, parse_todo, serialize_components};

fn read_fixture(fixture_name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture_name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", fixture_name, e))
}

fn paris() -> TzMap {
    let mut tz = TzMap::new();
    tz.insert(
        "Europe/Paris".to_string(),
        timestamp::parse_offset("+01:00").unwrap(),
    );
    tz
}

/// Rewrite every VTODO in the tree through extraction and output
fn normalize(container: &mut Container, tz: &TzMap) {
    for item in &mut container.items {
        if let ContainerItem::Component(child) = item {
            if child.name == "VTODO" {
                *child = parse_todo(child, tz).unwrap().to_container();
            } else {
                normalize(child, tz);
            }
        }
    }
}

fn normalize_text(source: &str, tz: &TzMap) -> String {
    let mut roots = parse_components(source).unwrap();
    for root in &mut roots {
        normalize(root, tz);
    }
    serialize_components(&roots)
}

fn todos(source: &str, tz: &TzMap) -> Vec<Todo> {
    let roots = parse_components(source).unwrap();
    find_components(&roots, "VTODO")
        .into_iter()
        .map(|c| parse_todo(c, tz).unwrap())
        .collect()
}

fn tags(todo: &Todo) -> Vec<String> {
    todo.to_container()
        .items
        .iter()
        .map(|i| i.tag().to_string())
        .collect()
}

// ============================================================================
// Byte-for-byte round trips
// ============================================================================

#[test]
fn round_trip_canonical_calendar() {
    let source = read_fixture("canonical.ics");
    let output = normalize_text(&source, &TzMap::new());
    assert_eq!(output, source, "Round-trip failed for fixture: canonical.ics");
}

#[test]
fn normalize_is_idempotent() {
    let source = read_fixture("messy.ics");
    let once = normalize_text(&source, &paris());
    let twice = normalize_text(&once, &paris());
    assert_eq!(once, twice);
}

// ============================================================================
// Semantic round trips
// ============================================================================

#[test]
fn messy_calendar_keeps_every_field() {
    let source = read_fixture("messy.ics");
    let before = todos(&source, &paris());
    let after = todos(&normalize_text(&source, &paris()), &TzMap::new());

    assert_eq!(before.len(), 3);
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.uid(), b.uid());
        assert_eq!(a.name, b.name);
        assert_eq!(a.created, b.created);
        assert_eq!(a.priority(), b.priority());
        assert_eq!(a.begin(), b.begin());
        assert_eq!(a.due(), b.due());
        assert_eq!(a.duration(), b.duration());
        assert_eq!(a.alarms, b.alarms);
        assert_eq!(a.unused(), b.unused());
    }
}

#[test]
fn messy_calendar_resolves_tzid() {
    let source = read_fixture("messy.ics");
    let groceries = &todos(&source, &paris())[0];
    let at = |h| Utc.with_ymd_and_hms(2024, 3, 2, h, 0, 0).unwrap().fixed_offset();

    assert_eq!(groceries.name.as_deref(), Some("Buy groceries, milk"));
    assert_eq!(groceries.begin(), Some(at(9)));
    assert_eq!(groceries.due(), Some(at(17)));

    let out = groceries.to_container();
    assert_eq!(out.line("DTSTART").unwrap().value, "20240302T090000Z");
    assert_eq!(out.line("DUE").unwrap().value, "20240302T170000Z");
}

#[test]
fn messy_calendar_output_order() {
    let source = read_fixture("messy.ics");
    let all = todos(&source, &paris());

    assert_eq!(
        tags(&all[0]),
        vec![
            "UID",
            "COMPLETED",
            "DTSTAMP",
            "DTSTART",
            "PRIORITY",
            "SUMMARY",
            "DUE",
            "VALARM",
            "X-FIRST",
            "CATEGORIES",
            "X-LAST",
        ]
    );
    assert_eq!(
        tags(&all[1]),
        vec!["UID", "COMPLETED", "DTSTAMP", "DTSTART", "SUMMARY", "DURATION"]
    );
}

#[test]
fn non_todo_components_are_untouched() {
    let source = read_fixture("messy.ics");
    let output = normalize_text(&source, &paris());
    let roots = parse_components(&output).unwrap();
    let events = find_components(&roots, "VEVENT");
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].to_lines(),
        vec!["BEGIN:VEVENT", "UID:event-1", "DTSTART:20240301T100000Z", "END:VEVENT"]
    );
}

#[test]
fn overlapping_windows_in_fixture() {
    let source = read_fixture("messy.ics");
    let all = todos(&source, &paris());
    let (groceries, laundry, someday) = (&all[0], &all[1], &all[2]);

    assert!(groceries ^ laundry);
    assert!(!(groceries ^ someday));

    let mut sorted = all.clone();
    sorted.sort_by(|a, b| a.schedule_cmp(b));
    let uids: Vec<&str> = sorted.iter().map(|t| t.uid()).collect();
    assert_eq!(
        uids,
        vec!["someday@home.org", "laundry@home.org", "groceries@home.org"]
    );
}
