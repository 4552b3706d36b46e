use chrono::NaiveDate;

use nightgrid::model::*;
use nightgrid::replay::{self, Scenario};

// ── Test infrastructure ──────────────────────────────────────

fn d(day: u32) -> Night {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

fn load(json: &str) -> Scenario {
    serde_json::from_str(json).unwrap()
}

fn demo() -> Scenario {
    load(include_str!("../demos/two_rooms.json"))
}

// ── Scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn demo_scenario_commits_and_reconciles() {
    let report = replay::run(demo()).await.unwrap();

    assert_eq!(
        report.committed,
        vec![
            CommittedNight {
                room_id: RoomId(1),
                date: d(1),
                price: Price::from_cents(12_050),
            },
            CommittedNight {
                room_id: RoomId(2),
                date: d(1),
                price: Price::from_units(80),
            },
        ]
    );
    assert_eq!(report.total_price, Price::from_cents(20_050));
    assert_eq!(report.uncovered_nights, vec![d(2), d(3)]);

    let failed: Vec<&str> = report.steps.iter().filter(|s| !s.ok).map(|s| s.op).collect();
    assert_eq!(failed, vec!["submit_price"]);
    assert_eq!(report.steps[5].detail, "committed 2");
    assert_eq!(report.steps[7].detail, "removed 1, stale pending 0");
}

#[tokio::test]
async fn edit_mode_keeps_own_nights_across_range_change() {
    let scenario = load(
        r#"{
            "rooms": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }],
            "existing": [
                { "room_id": 1, "date": "2024-04-02", "booking_id": "BKN-5", "price": "100.00" },
                { "room_id": 1, "date": "2024-04-03", "booking_id": "BKN-5", "price": "100.00" },
                { "room_id": 2, "date": "2024-04-03", "booking_id": "BKN-6", "price": "70.00" }
            ],
            "start": "2024-04-01",
            "end": "2024-04-05",
            "current_booking_id": "BKN-5",
            "steps": [
                { "op": "toggle_cell", "room_id": 2, "date": "2024-04-03" },
                { "op": "set_range", "start": "2024-04-03", "end": "2024-04-06" }
            ]
        }"#,
    );
    let report = replay::run(scenario).await.unwrap();

    assert_eq!(report.steps[0].detail, "Ignored");
    assert_eq!(report.steps[1].detail, "removed 1");
    assert_eq!(
        report.committed,
        vec![CommittedNight {
            room_id: RoomId(1),
            date: d(3),
            price: Price::from_units(100),
        }]
    );
}

#[tokio::test]
async fn clear_all_needs_confirmation() {
    let scenario = load(
        r#"{
            "rooms": [{ "id": 1, "name": "A" }],
            "start": "2024-04-01",
            "end": "2024-04-03",
            "steps": [
                { "op": "toggle_room_column", "room_id": 1 },
                { "op": "open_price_prompt" },
                { "op": "submit_price", "input": "50" },
                { "op": "clear_all" },
                { "op": "dismiss" },
                { "op": "clear_all" },
                { "op": "confirm" },
                { "op": "confirm" }
            ]
        }"#,
    );
    let report = replay::run(scenario).await.unwrap();

    assert!(report.committed.is_empty());
    assert_eq!(report.total_price, Price::ZERO);
    assert_eq!(report.steps[6].detail, "removed 2");
    assert!(!report.steps[7].ok);
}

#[tokio::test]
async fn invalid_range_fails_before_any_step() {
    let scenario = load(
        r#"{
            "rooms": [{ "id": 1, "name": "A" }],
            "start": "2024-04-05",
            "end": "2024-04-05",
            "steps": [{ "op": "clear_all" }]
        }"#,
    );
    assert!(replay::run(scenario).await.is_err());
}
