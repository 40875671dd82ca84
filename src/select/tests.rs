use super::*;
use crate::feed::Departure;

use chrono::NaiveDate;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(7, 30, 0)
        .unwrap()
}

fn inbound(offset_secs: i64) -> Departure {
    Departure::new(
        JourneyDirection::Inbound,
        None,
        now() + chrono::Duration::seconds(offset_secs),
    )
}

fn inbound_line(line: &str, offset_secs: i64) -> Departure {
    Departure::new(
        JourneyDirection::Inbound,
        Some(line.to_string()),
        now() + chrono::Duration::seconds(offset_secs),
    )
}

fn outbound(offset_secs: i64) -> Departure {
    Departure::new(
        JourneyDirection::Outbound,
        None,
        now() + chrono::Duration::seconds(offset_secs),
    )
}

fn snapshot(departures: Vec<Departure>) -> FeedSnapshot {
    FeedSnapshot::new(departures, now())
}

fn selector() -> DepartureSelector {
    DepartureSelector::new(SelectorConfig::new(JourneyDirection::Inbound))
}

#[test]
fn single_relevant_departure_returns_its_elapsed_time() {
    let snapshot = snapshot(vec![inbound(840)]);
    assert_eq!(selector().select(&snapshot, now()), Some(840));
}

#[test]
fn wrong_direction_departures_are_ignored() {
    let snapshot = snapshot(vec![outbound(60), inbound(840), outbound(120)]);
    assert_eq!(selector().select(&snapshot, now()), Some(840));
}

#[test]
fn empty_snapshot_returns_none() {
    let snapshot = snapshot(Vec::new());
    assert_eq!(selector().select(&snapshot, now()), None);
}

#[test]
fn only_irrelevant_departures_returns_none() {
    let snapshot = snapshot(vec![outbound(300), outbound(900)]);
    assert_eq!(selector().select(&snapshot, now()), None);
}

#[test]
fn close_pair_skips_the_first_departure() {
    // 300s apart, below the 720s threshold: show the second one.
    let snapshot = snapshot(vec![inbound(120), inbound(420)]);
    assert_eq!(selector().select(&snapshot, now()), Some(420));
}

#[test]
fn distant_pair_keeps_the_first_departure() {
    // 900s apart, at or above the threshold: no skip.
    let snapshot = snapshot(vec![inbound(120), inbound(1020)]);
    assert_eq!(selector().select(&snapshot, now()), Some(120));
}

#[test]
fn gap_exactly_at_threshold_keeps_the_first_departure() {
    let snapshot = snapshot(vec![inbound(100), inbound(820)]);
    assert_eq!(selector().select(&snapshot, now()), Some(100));
}

#[test]
fn only_the_first_two_candidates_decide_the_skip() {
    // Third departure never substitutes for the second.
    let snapshot = snapshot(vec![inbound(60), inbound(300), inbound(360)]);
    assert_eq!(selector().select(&snapshot, now()), Some(300));
}

#[test]
fn already_due_departure_yields_negative_seconds() {
    let snapshot = snapshot(vec![inbound(-45)]);
    assert_eq!(selector().select(&snapshot, now()), Some(-45));
}

#[test]
fn proximity_applies_to_an_already_due_first_departure() {
    // -30 and 600 are 630s apart: the departed train is skipped.
    let snapshot = snapshot(vec![inbound(-30), inbound(600)]);
    assert_eq!(selector().select(&snapshot, now()), Some(600));
}

#[test]
fn line_filter_restricts_candidates() {
    let config = SelectorConfig::new(JourneyDirection::Inbound).with_line("43");
    let selector = DepartureSelector::new(config);

    let snapshot = snapshot(vec![
        inbound_line("36", 60),
        inbound_line("43", 840),
        inbound(900),
    ]);
    assert_eq!(selector.select(&snapshot, now()), Some(840));
}

#[test]
fn line_filter_with_no_match_returns_none() {
    let config = SelectorConfig::new(JourneyDirection::Inbound).with_line("43");
    let selector = DepartureSelector::new(config);

    let snapshot = snapshot(vec![inbound_line("36", 60), inbound(900)]);
    assert_eq!(selector.select(&snapshot, now()), None);
}

#[test]
fn custom_proximity_threshold_is_honored() {
    let config =
        SelectorConfig::new(JourneyDirection::Inbound).with_proximity_threshold_secs(200);
    let selector = DepartureSelector::new(config);

    // 300s apart: no skip under a 200s threshold.
    let snapshot = snapshot(vec![inbound(120), inbound(420)]);
    assert_eq!(selector.select(&snapshot, now()), Some(120));
}
