use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wordsync_core::{
    reconcile, DiffResult, ReconcileOptions, Record, RemoteRecord, UpdateEntry, UpdatePolicy,
    WriteOp,
};

fn rec(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn remote(id: &str, value: Value) -> RemoteRecord {
    RemoteRecord::new(id, rec(value))
}

fn opts() -> ReconcileOptions {
    ReconcileOptions::default()
}

// ── Basic scenarios ─────────────────────────────────────────────

#[test]
fn new_local_record_is_created() {
    let diff = reconcile(vec![rec(json!({"name": "cat"}))], &[], &opts());
    assert_eq!(
        diff,
        DiffResult {
            to_create: vec![rec(json!({"name": "cat"}))],
            ..Default::default()
        }
    );
}

#[test]
fn changed_record_is_updated() {
    let diff = reconcile(
        vec![rec(json!({"name": "cat", "tr": "x"}))],
        &[remote("1", json!({"name": "cat", "tr": "y"}))],
        &opts(),
    );
    assert_eq!(
        diff,
        DiffResult {
            to_update: vec![UpdateEntry {
                id: "1".to_string(),
                data: rec(json!({"name": "cat", "tr": "x"})),
            }],
            ..Default::default()
        }
    );
}

#[test]
fn orphan_remote_record_is_deleted() {
    let diff = reconcile(vec![], &[remote("1", json!({"name": "cat"}))], &opts());
    assert_eq!(
        diff,
        DiffResult {
            to_delete: vec!["1".to_string()],
            ..Default::default()
        }
    );
}

#[test]
fn empty_inputs_give_empty_diff() {
    let diff = reconcile(vec![], &[], &opts());
    assert!(diff.is_empty());
    assert_eq!(diff.op_count(), 0);
}

// ── Update policy ───────────────────────────────────────────────

#[test]
fn identical_record_is_unchanged_by_default() {
    let diff = reconcile(
        vec![rec(json!({"name": "cat", "tr": "kot"}))],
        &[remote("1", json!({"tr": "kot", "name": "cat"}))],
        &opts(),
    );
    assert!(diff.is_empty());
    assert_eq!(diff.unchanged, vec!["1".to_string()]);
}

#[test]
fn always_policy_updates_identical_record() {
    let options = ReconcileOptions {
        update_policy: UpdatePolicy::Always,
        ..opts()
    };
    let diff = reconcile(
        vec![rec(json!({"name": "cat"}))],
        &[remote("1", json!({"name": "cat"}))],
        &options,
    );
    assert_eq!(diff.to_update.len(), 1);
    assert!(diff.unchanged.is_empty());
}

#[test]
fn extra_remote_field_counts_as_change() {
    let diff = reconcile(
        vec![rec(json!({"name": "cat"}))],
        &[remote("1", json!({"name": "cat", "stale": true}))],
        &opts(),
    );
    assert_eq!(diff.to_update.len(), 1);
}

#[test]
fn nested_difference_counts_as_change() {
    let diff = reconcile(
        vec![rec(json!({"name": "cat", "meta": {"tags": ["a", "b"]}}))],
        &[remote("1", json!({"name": "cat", "meta": {"tags": ["b", "a"]}}))],
        &opts(),
    );
    assert_eq!(diff.to_update.len(), 1);
}

// ── Key matching ────────────────────────────────────────────────

#[test]
fn custom_key_field_is_used() {
    let options = ReconcileOptions {
        key_field: "word".to_string(),
        ..opts()
    };
    let diff = reconcile(
        vec![rec(json!({"word": "cat", "name": "other"}))],
        &[remote("1", json!({"word": "cat", "name": "x"}))],
        &options,
    );
    assert_eq!(diff.to_update.len(), 1);
    assert_eq!(diff.to_update[0].id, "1");
    assert!(diff.to_create.is_empty());
}

#[test]
fn key_match_is_strict() {
    let diff = reconcile(
        vec![rec(json!({"name": 1}))],
        &[remote("1", json!({"name": "1"}))],
        &opts(),
    );
    assert_eq!(diff.to_delete, vec!["1".to_string()]);
    assert_eq!(diff.to_create.len(), 1);
}

#[test]
fn remote_without_key_is_deleted() {
    let diff = reconcile(
        vec![rec(json!({"name": "cat"}))],
        &[remote("1", json!({"word": "cat"}))],
        &opts(),
    );
    assert_eq!(diff.to_delete, vec!["1".to_string()]);
    assert_eq!(diff.to_create.len(), 1);
}

#[test]
fn first_duplicate_wins_and_rest_are_created() {
    let local = vec![
        rec(json!({"name": "cat", "n": 0})),
        rec(json!({"name": "cat", "n": 1})),
        rec(json!({"name": "cat", "n": 2})),
    ];
    let diff = reconcile(local, &[remote("1", json!({"name": "cat", "n": 9}))], &opts());

    assert_eq!(diff.to_update.len(), 1);
    assert_eq!(diff.to_update[0].data["n"], 0);
    assert_eq!(
        diff.to_create,
        vec![rec(json!({"name": "cat", "n": 1})), rec(json!({"name": "cat", "n": 2}))]
    );
}

#[test]
fn duplicate_remote_keys_consume_successive_locals() {
    let local = vec![rec(json!({"name": "cat", "n": 0})), rec(json!({"name": "cat", "n": 1}))];
    let remotes = [
        remote("a", json!({"name": "cat", "n": 0})),
        remote("b", json!({"name": "cat", "n": 5})),
        remote("c", json!({"name": "cat"})),
    ];
    let diff = reconcile(local, &remotes, &opts());

    assert_eq!(diff.unchanged, vec!["a".to_string()]);
    assert_eq!(diff.to_update[0].id, "b");
    assert_eq!(diff.to_update[0].data["n"], 1);
    assert_eq!(diff.to_delete, vec!["c".to_string()]);
    assert!(diff.to_create.is_empty());
}

// ── Ordering ────────────────────────────────────────────────────

#[test]
fn outputs_follow_input_order() {
    let local = vec![
        rec(json!({"name": "d"})),
        rec(json!({"name": "b", "v": 1})),
        rec(json!({"name": "e"})),
        rec(json!({"name": "a", "v": 1})),
    ];
    let remotes = [
        remote("1", json!({"name": "a"})),
        remote("2", json!({"name": "x"})),
        remote("3", json!({"name": "b"})),
        remote("4", json!({"name": "y"})),
    ];
    let diff = reconcile(local, &remotes, &opts());

    let updated: Vec<&str> = diff.to_update.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(updated, vec!["1", "3"]);
    assert_eq!(diff.to_delete, vec!["2".to_string(), "4".to_string()]);
    let created: Vec<&Value> = diff.to_create.iter().map(|r| &r["name"]).collect();
    assert_eq!(created, vec![&json!("d"), &json!("e")]);
}

#[test]
fn into_ops_orders_create_update_delete() {
    let diff = reconcile(
        vec![rec(json!({"name": "new"})), rec(json!({"name": "cat", "v": 2}))],
        &[remote("9", json!({"name": "gone"})), remote("1", json!({"name": "cat"}))],
        &opts(),
    );
    let ops = diff.into_ops();
    assert_eq!(
        ops,
        vec![
            WriteOp::Create {
                data: rec(json!({"name": "new"}))
            },
            WriteOp::Update {
                id: "1".to_string(),
                data: rec(json!({"name": "cat", "v": 2}))
            },
            WriteOp::Delete {
                id: "9".to_string()
            },
        ]
    );
}

#[test]
fn counts_match_sets() {
    let diff = reconcile(
        vec![rec(json!({"name": "a"})), rec(json!({"name": "b", "v": 1})), rec(json!({"name": "c"}))],
        &[
            remote("1", json!({"name": "a"})),
            remote("2", json!({"name": "b"})),
            remote("3", json!({"name": "z"})),
        ],
        &opts(),
    );
    let counts = diff.counts();
    assert_eq!(counts.create, 1);
    assert_eq!(counts.update, 1);
    assert_eq!(counts.delete, 1);
    assert_eq!(counts.unchanged, 1);
    assert_eq!(diff.op_count(), 3);
}
