//! CSV export of detailed records.
//!
//! Fields are joined with commas and list values with `|`. Values are not
//! quoted, so a comma inside a product name shifts the columns of that row.

use crate::analysis::{Aggregate, DetailedRecord};

pub const CSV_HEADER: &str = "用户ID,商品ID,商品名称,选择版本,选择版本名称,是否都不满意,显示顺序,时间戳";

/// Generate the CSV document, one row per decisive ballot.
pub fn generate_csv(agg: &Aggregate) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(agg.records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(agg.records.iter().map(csv_row));
    lines.join("\n")
}

fn csv_row(record: &DetailedRecord) -> String {
    let selections = record
        .vote
        .selections()
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let selection_names = record.vote.selection_names();
    let is_none = if record.vote.is_none() { "是" } else { "否" };
    let display_order = record.display_order.join("|");

    [
        record.user_id.as_str(),
        record.product_id.as_str(),
        record.product_name.as_str(),
        selections.as_str(),
        selection_names.as_str(),
        is_none,
        display_order.as_str(),
        record.timestamp.as_str(),
    ]
    .join(",")
}
