//! JSON summary generation.
//!
//! Key order is insertion order (`serde_json` is built with `preserve_order`):
//! labels follow report order, products follow numeric id order, users are
//! sorted by id.

use crate::analysis::{percentage, Aggregate, Tally};
use chrono::{DateTime, Local};
use serde_json::{json, Map as JsonMap, Value};

/// Build the machine-readable summary.
pub fn generate_json_summary(agg: &Aggregate, generated_at: DateTime<Local>) -> Value {
    let mut root = obj();

    root.insert(
        "generated_at".into(),
        Value::String(iso_timestamp(generated_at)),
    );
    root.insert("total_users".into(), json!(agg.total_voters));
    root.insert("total_evaluations".into(), json!(agg.total_evaluations));
    root.insert("version_summary".into(), tally_json(&agg.version_counts));
    root.insert(
        "version_percentages".into(),
        percentages_json(&agg.version_counts, agg.total_evaluations),
    );

    let mut products = obj();
    for (product_id, tally) in agg.sorted_products() {
        products.insert(format!("商品{}", product_id), tally_json(tally));
    }
    root.insert("product_stats".into(), Value::Object(products));

    let mut users = obj();
    for (user_id, tally) in &agg.user_counts {
        users.insert(user_id.clone(), tally_json(tally));
    }
    root.insert("user_stats".into(), Value::Object(users));

    Value::Object(root)
}

/// Pretty-printed summary, non-ASCII kept as-is.
pub fn generate_json_report(agg: &Aggregate, generated_at: DateTime<Local>) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&generate_json_summary(agg, generated_at)).map_err(Into::into)
}

/// Display name to count, for labels with at least one vote.
fn tally_json(tally: &Tally) -> Value {
    let mut o = obj();
    for (label, count) in tally.iter() {
        o.insert(label.display_name().to_string(), json!(count));
    }
    Value::Object(o)
}

/// Display name to share of `total`, rounded to two decimals.
fn percentages_json(tally: &Tally, total: u64) -> Value {
    let mut o = obj();
    for (label, count) in tally.iter() {
        o.insert(
            label.display_name().to_string(),
            json!(round2(percentage(count, total))),
        );
    }
    Value::Object(o)
}

/// Local ISO 8601 time; microseconds are shown only when non-zero.
fn iso_timestamp(t: DateTime<Local>) -> String {
    if t.timestamp_subsec_micros() == 0 {
        t.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Two decimals, exact halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
