mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::json;

use common::{BRANDS, RECEIPTS, TestWorkspace, USERS, fixture_dir, fixture_path};

fn docaudit() -> Command {
    Command::cargo_bin("docaudit").expect("binary exists")
}

#[test]
fn preview_unwraps_ids_and_dates() {
    let input = fixture_path(RECEIPTS);
    docaudit()
        .args(["preview", "-i", input.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(contains("5ff1e1eb0a720f0523000575"))
        .stdout(contains("2021-01-03 15:25:31"))
        .stdout(contains("$oid").not())
        .stdout(contains("[5 rows x 15 columns]"));
}

#[test]
fn preview_joined_view_keeps_receipts_without_items() {
    let input = fixture_path(RECEIPTS);
    docaudit()
        .args(["preview", "-i", input.to_str().unwrap(), "--view", "joined"])
        .assert()
        .success()
        .stdout(contains("[8 rows x 27 columns]"));
}

#[test]
fn preview_items_view_carries_receipt_id() {
    let input = fixture_path(RECEIPTS);
    docaudit()
        .args(["preview", "-i", input.to_str().unwrap(), "--view", "items"])
        .assert()
        .success()
        .stdout(contains("receiptId"))
        .stdout(contains("[6 rows x 14 columns]"));
}

#[test]
fn info_lists_column_types() {
    let input = fixture_path(USERS);
    docaudit()
        .args(["info", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("5 entries, 7 columns"))
        .stdout(contains("datetime"))
        .stdout(contains("signUpSource"));
}

#[test]
fn describe_reports_coerced_amounts() {
    let input = fixture_path(RECEIPTS);
    docaudit()
        .args([
            "describe",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "totalSpent,createDate",
        ])
        .assert()
        .success()
        .stdout(contains("totalSpent"))
        .stdout(contains("createDate"))
        .stdout(contains("seconds"));
}

#[test]
fn describe_rejects_text_columns() {
    let input = fixture_path(USERS);
    docaudit()
        .args(["describe", "-i", input.to_str().unwrap(), "-C", "role"])
        .assert()
        .failure()
        .stderr(contains("cannot be profiled"));
}

#[test]
fn duplicates_counts_redundant_rows() {
    let input = fixture_path(USERS);
    docaudit()
        .args(["duplicates", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("duplicated"))
        .stdout(contains("40.00%"))
        .stdout(contains("repeated keys"));
}

#[test]
fn duplicates_rejects_unknown_key_column() {
    let input = fixture_path(USERS);
    docaudit()
        .args(["duplicates", "-i", input.to_str().unwrap(), "-k", "nope"])
        .assert()
        .failure()
        .stderr(contains("Column 'nope' not found"));
}

#[test]
fn distinct_defaults_to_profile_categories() {
    let input = fixture_path(BRANDS);
    docaudit()
        .args(["distinct", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Candy & Sweets"))
        .stdout(contains("categoryCode"))
        .stdout(contains("<null>"));
}

#[test]
fn distinct_by_count_limits_output() {
    let input = fixture_path(BRANDS);
    docaudit()
        .args([
            "distinct",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "category",
            "--by-count",
            "--top",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains("Baking"))
        .stdout(contains("50.00%"))
        .stdout(contains("Beverages").not());
}

#[test]
fn audit_directory_reports_every_dataset() {
    let dir = fixture_dir();
    docaudit()
        .args(["audit", "--dir", dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("== receipts: preview"))
        .stdout(contains("== receipts: rewardsReceiptItemList items"))
        .stdout(contains("receipt without items"))
        .stdout(contains("== users: duplicate _id"))
        .stdout(contains("missing lastLogin"))
        .stdout(contains("== brands: findings"))
        .stdout(contains("topBrand not boolean"));
}

#[test]
fn audit_directory_requires_every_export() {
    let workspace = TestWorkspace::new();
    workspace.write_documents(RECEIPTS, &[json!({"_id": {"$oid": "r1"}})]);
    docaudit()
        .args(["audit", "--dir", workspace.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("users.json"))
        .stdout(contains("receipts: preview").not());
}

#[test]
fn audit_directory_tolerates_sparse_exports() {
    let workspace = TestWorkspace::new();
    workspace.write_documents(
        RECEIPTS,
        &[json!({"_id": {"$oid": "r1"}, "rewardsReceiptItemList": [{"barcode": "1"}]})],
    );
    workspace.write_documents(USERS, &[json!({"_id": {"$oid": "u1"}})]);
    workspace.write_documents(BRANDS, &[json!({"_id": {"$oid": "b1"}, "category": "Baking"})]);
    docaudit()
        .args(["audit", "--dir", workspace.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("== receipts: rewardsReceiptItemList items"))
        .stdout(contains("== brands: distinct values"))
        .stdout(contains("== users: findings"));
}

#[test]
fn distinct_skips_profile_fields_missing_from_export() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_documents(
        BRANDS,
        &[json!({"_id": {"$oid": "b1"}, "category": "Baking"})],
    );
    docaudit()
        .args(["distinct", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Baking"))
        .stdout(contains("categoryCode").not());
}

#[test]
fn audit_single_file_detects_wrapped_fields() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_documents(
        "orders.json",
        &[
            json!({"_id": {"$oid": "o1"}, "placed": {"$date": 1609687531000i64}, "status": "open"}),
            json!({"_id": {"$oid": "o2"}, "placed": {"$date": 1609687541000i64}, "status": "closed"}),
        ],
    );
    docaudit()
        .args(["audit", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("== orders: preview"))
        .stdout(contains("2021-01-03 15:25:41"))
        .stdout(contains("findings").not());
}

#[test]
fn profile_prints_preset_as_yaml() {
    docaudit()
        .args(["profile", "--dataset", "brands"])
        .assert()
        .success()
        .stdout(contains("reference_fields"))
        .stdout(contains("cpg"));
}

#[test]
fn profile_detected_from_input_round_trips_through_profile_flag() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_documents(
        "events.json",
        &[json!({"_id": {"$oid": "e1"}, "seen": {"$date": 1609687531000i64}, "kind": "click"})],
    );
    let output = docaudit()
        .args(["profile", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let yaml = String::from_utf8(output).expect("utf-8 profile");
    assert!(yaml.contains("seen"));
    let profile_path = workspace.write("events.yaml", &yaml);

    docaudit()
        .args([
            "preview",
            "-i",
            input.to_str().unwrap(),
            "-p",
            profile_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("e1"))
        .stdout(contains("2021-01-03 15:25:31"));
}

#[test]
fn stdin_input_uses_named_dataset() {
    let contents = std::fs::read_to_string(fixture_path(USERS)).expect("read fixture");
    docaudit()
        .args(["duplicates", "-i", "-", "--dataset", "users"])
        .write_stdin(contents)
        .assert()
        .success()
        .stdout(contains("40.00%"));
}

#[test]
fn input_encoding_decodes_legacy_exports() {
    let workspace = TestWorkspace::new();
    let mut bytes = b"{\"_id\":\"u1\",\"state\":\"Qu".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"bec\"}\n");
    let input = workspace.write_bytes("users.json", &bytes);
    docaudit()
        .args([
            "distinct",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "state",
            "--input-encoding",
            "windows-1252",
        ])
        .assert()
        .success()
        .stdout(contains("Québec"));
}

#[test]
fn missing_input_file_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.path().join("absent.json");
    docaudit()
        .args(["info", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Opening input file"));
}

#[test]
fn invalid_json_reports_line_number() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("broken.json", "{\"_id\":\"a\"}\n{\"_id\":\n");
    docaudit()
        .args(["info", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Line 2: invalid JSON"));
}

#[test]
fn non_object_line_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("array.json", "{\"_id\":\"a\"}\n[1,2]\n");
    docaudit()
        .args(["preview", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Line 2: expected a JSON object but found an array"));
}

#[test]
fn flattening_users_fails_cleanly() {
    let input = fixture_path(USERS);
    docaudit()
        .args(["preview", "-i", input.to_str().unwrap(), "--view", "joined"])
        .assert()
        .failure()
        .stderr(contains("does not define a list column"));
}
