//! Integration tests for the `slots` binary.
//!
//! Every command is driven through stdin with a fixed `--now`, so the
//! output does not depend on the machine's clock or timezone.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn slots() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slots"))
}

/// Run `slots <args>` with `input` on stdin and parse stdout as JSON.
fn run_json(args: &[&str], input: Value) -> Value {
    let output = slots()
        .args(args)
        .write_stdin(input.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

fn occupant(date: &str, start: &str, end: &str) -> Value {
    json!({
        "occupantId": 7,
        "occupantName": "Dept. of Physics",
        "scheduledDate": date,
        "startTime": start,
        "endTime": end,
    })
}

// ── help ────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_commands() {
    slots()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("expand"))
        .stdout(predicate::str::contains("vacancy"))
        .stdout(predicate::str::contains("resolve"));
}

// ── expand ──────────────────────────────────────────────────────────────────

#[test]
fn test_expand_week_from_wednesday() {
    let out = run_json(
        &["expand"],
        json!({
            "startDate": "2025-08-13",
            "kind": "week",
            "weekdays": ["Mon", "Wed", "Fri"],
            "startTime": "09:00",
            "endTime": "10:00",
        }),
    );
    let dates: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2025-08-13", "2025-08-15", "2025-08-18"]);
    assert_eq!(out[0]["id"], "20250813-0");
    assert_eq!(out[0]["start"], "09:00");
    assert_eq!(out[0]["end"], "10:00");
}

#[test]
fn test_expand_single_day_ignores_weekdays() {
    let out = run_json(
        &["expand"],
        json!({
            "startDate": "2025-08-16",
            "kind": "day",
            "startTime": "14:00",
            "endTime": "15:30",
        }),
    );
    assert_eq!(out.as_array().unwrap().len(), 1);
    assert_eq!(out[0]["date"], "2025-08-16");
}

#[test]
fn test_expand_respects_configured_limit() {
    let dir = std::env::temp_dir().join(format!("slots-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = dir.join("config.json");
    std::fs::write(&config, r#"{"maxExpansionDays": 3}"#).unwrap();

    let output = slots()
        .arg("--config")
        .arg(&config)
        .arg("expand")
        .write_stdin(
            json!({
                "startDate": "2025-08-11",
                "kind": "custom",
                "endDate": "2025-08-31",
                "weekdays": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
                "startTime": "09:00",
                "endTime": "10:00",
            })
            .to_string(),
        )
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(out.as_array().unwrap().len(), 3);
    assert_eq!(out[2]["date"], "2025-08-13");

    std::fs::remove_dir_all(&dir).ok();
}

// ── vacancy ─────────────────────────────────────────────────────────────────

#[test]
fn test_vacancy_without_now() {
    let out = run_json(
        &["vacancy"],
        json!({
            "weekStart": "2025-08-11",
            "occupants": [occupant("2025-08-13", "10:00", "11:00")],
        }),
    );
    let days = out.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["weekday"], "Mon");
    assert_eq!(days[0]["freeMinutes"], 540);
    assert_eq!(days[2]["date"], "2025-08-13");
    assert_eq!(
        days[2]["free"],
        json!([{"start": "09:00", "end": "10:00"}, {"start": "11:00", "end": "18:00"}])
    );
    assert_eq!(days[2]["freeMinutes"], 480);
}

#[test]
fn test_vacancy_clamps_to_now() {
    // 06:30 UTC is 12:00 in Asia/Kolkata
    let out = run_json(
        &["--now", "2025-08-13T06:30:00Z", "vacancy"],
        json!({
            "weekStart": "2025-08-11",
            "occupants": [occupant("2025-08-13", "10:00", "11:00")],
        }),
    );
    let days = out.as_array().unwrap();
    assert_eq!(days[0]["free"], json!([]));
    assert_eq!(days[1]["freeMinutes"], 0);
    assert_eq!(days[2]["free"], json!([{"start": "12:00", "end": "18:00"}]));
    assert_eq!(days[3]["freeMinutes"], 540);
}

#[test]
fn test_vacancy_custom_window() {
    let out = run_json(
        &["--work-start", "08:00", "--work-end", "12:00", "vacancy"],
        json!({"weekStart": "2025-08-11", "occupants": []}),
    );
    assert_eq!(out[0]["free"], json!([{"start": "08:00", "end": "12:00"}]));
    assert_eq!(out[0]["freeMinutes"], 240);
}

// ── weekly ──────────────────────────────────────────────────────────────────

#[test]
fn test_weekly_totals_and_utilization() {
    let out = run_json(
        &["weekly"],
        json!({
            "occupants": [
                occupant("2025-08-11", "09:00", "18:00"),
                occupant("2025-08-13", "23:00", "01:00"),
                occupant("not a date", "09:00", "10:00"),
            ]
        }),
    );
    assert_eq!(out["totals"]["Mon"].as_f64(), Some(540.0));
    assert_eq!(out["totals"]["Wed"].as_f64(), Some(120.0));
    assert_eq!(out["totals"]["Weekly"].as_f64(), Some(660.0));
    assert_eq!(out["totals"]["skipped"], 1);
    assert_eq!(out["utilization"]["Mon"].as_f64(), Some(100.0));
    assert_eq!(out["utilization"]["Sun"].as_f64(), Some(0.0));
}

#[test]
fn test_weekly_accepts_bare_array() {
    let out = run_json(
        &["weekly"],
        json!([occupant("2025-08-15", "09:00", "10:30")]),
    );
    assert_eq!(out["totals"]["Fri"].as_f64(), Some(90.0));
}

// ── conflicts ───────────────────────────────────────────────────────────────

#[test]
fn test_conflicts_against_occupancy_and_maintenance() {
    let out = run_json(
        &["conflicts"],
        json!({
            "request": {
                "startDate": "2025-08-11",
                "kind": "week",
                "weekdays": ["Mon", "Wed", "Fri"],
                "startTime": "09:00",
                "endTime": "10:00",
            },
            "occupants": [occupant("2025-08-13", "09:30", "10:30")],
            "maintenance": [{
                "buildingId": "B-2",
                "roomid": "R-1",
                "maintanceDate": "2025-08-11T00:00:00",
                "startTime": "2025-08-11T09:00:00",
                "endTime": "2025-08-11T09:30:00",
                "isMainteneceActive": true,
            }],
        }),
    );
    let hits = out.as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["slot"]["date"], "2025-08-11");
    assert_eq!(
        hits[0]["conflictingExisting"][0]["id"],
        "maintenance-R-1-2025-08-11"
    );
    assert_eq!(hits[1]["slot"]["id"], "20250813-1");
}

#[test]
fn test_conflicts_requires_one_source() {
    slots()
        .arg("conflicts")
        .write_stdin(json!({"occupants": []}).to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one"));
}

// ── resolve ─────────────────────────────────────────────────────────────────

fn resolution_batch(edits: Value) -> Value {
    json!({
        "candidates": [
            {"id": "a", "date": "2025-08-13", "start": "09:00", "end": "10:00"},
            {"id": "b", "date": "2025-08-14", "start": "11:00", "end": "12:00"},
        ],
        "occupants": [occupant("2025-08-13", "09:30", "10:30")],
        "edits": edits,
    })
}

const NOON_AUG_12: &str = "2025-08-12T06:30:00Z";

#[test]
fn test_resolve_without_edits_needs_confirmation() {
    let out = run_json(
        &["--now", NOON_AUG_12, "resolve"],
        resolution_batch(json!([])),
    );
    assert_eq!(out["status"], "needsConfirmation");
    assert_eq!(out["resolved"][0]["id"], "b");
    assert_eq!(out["unresolved"][0]["id"], "a");
}

#[test]
fn test_resolve_with_day_shift_is_ready() {
    let out = run_json(
        &["--now", NOON_AUG_12, "resolve"],
        resolution_batch(json!([{"id": "a", "edit": {"field": "shiftDays", "value": 1}}])),
    );
    assert_eq!(out["status"], "ready");
    let ids: Vec<&str> = out["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    // a moved to the 14th at 09:00, ahead of b at 11:00
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(out["slots"][0]["date"], "2025-08-14");
}

#[test]
fn test_resolve_discard_unresolved() {
    let out = run_json(
        &["--now", NOON_AUG_12, "resolve", "--discard-unresolved"],
        resolution_batch(json!([])),
    );
    assert_eq!(out["status"], "ready");
    assert_eq!(out["slots"].as_array().unwrap().len(), 1);
    assert_eq!(out["slots"][0]["id"], "b");
}

#[test]
fn test_resolve_edit_into_the_past_stays_unresolved() {
    let out = run_json(
        &["--now", NOON_AUG_12, "resolve"],
        resolution_batch(json!([{"id": "a", "edit": {"field": "setDate", "value": "2025-08-10"}}])),
    );
    assert_eq!(out["status"], "needsConfirmation");
    assert_eq!(out["unresolved"][0]["date"], "2025-08-10");
}

#[test]
fn test_resolve_unknown_slot_fails() {
    slots()
        .args(["--now", NOON_AUG_12, "resolve"])
        .write_stdin(
            resolution_batch(json!([{"id": "zz", "edit": {"field": "shiftDays", "value": 1}}]))
                .to_string(),
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown slot: zz"));
}

#[test]
fn test_resolve_rejects_duplicate_candidate_ids() {
    let batch = json!({
        "candidates": [
            {"id": "c", "date": "2025-08-13", "start": "09:00", "end": "10:00"},
            {"id": "c", "date": "2025-08-13", "start": "09:30", "end": "10:30"},
        ],
        "occupants": [occupant("2025-08-13", "09:30", "10:30")],
    });
    slots()
        .args(["--now", NOON_AUG_12, "resolve"])
        .write_stdin(batch.to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate slot id: c"));
}

// ── allocate ────────────────────────────────────────────────────────────────

#[test]
fn test_allocate_records() {
    let out = run_json(
        &["allocate"],
        json!({
            "slots": [{"id": "20250813-0", "date": "2025-08-13", "start": "09:00", "end": "10:30"}],
            "template": {
                "allocatedRoomID": "R-1",
                "buildingId": "B-2",
                "academicSession": "Monsoon",
                "academicYear": "2025-26",
                "allocatedTo": "CS101",
                "purpose": "Lecture",
            },
        }),
    );
    assert_eq!(out[0]["allocationDate"], "2025-08-13");
    assert_eq!(out[0]["startTime"], "09:00:00");
    assert_eq!(out[0]["endTime"], "10:30:00");
    assert_eq!(out[0]["allocatedRoomID"], "R-1");
    assert_eq!(out[0]["isAllocationActive"], true);
    assert_eq!(out[0]["keyAssigned"], false);
}

// ── errors ──────────────────────────────────────────────────────────────────

#[test]
fn test_inverted_work_window_is_rejected() {
    slots()
        .args(["--work-start", "18:00", "--work-end", "09:00", "vacancy"])
        .write_stdin(json!({"weekStart": "2025-08-11"}).to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_unknown_timezone_is_rejected() {
    slots()
        .args(["--tz", "Mars/Olympus", "expand"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn test_malformed_input_is_reported() {
    slots()
        .arg("expand")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: invalid booking request"));
}
