//! Rebuild the per-product view of a persisted dispatch.
//!
//! The persistence service stores one detail row per debited batch. Grouping
//! walks those rows once, keyed by product code, and recomputes every total
//! from the rows themselves; totals precomputed by the server are never read.

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{BatchLine, DispatchRecord, DispatchSummary};
use crate::types::ProductCode;

/// Group batch-level records into per-product summaries sorted by name.
///
/// Batch lines keep record order within a product and are never merged, even
/// when two records share an inventory id.
#[must_use]
pub fn group(records: &[DispatchRecord]) -> Vec<DispatchSummary> {
    let mut index: HashMap<ProductCode, usize> = HashMap::new();
    let mut summaries: Vec<DispatchSummary> = Vec::new();

    for record in records {
        let slot = *index.entry(record.product_code).or_insert_with(|| {
            summaries.push(DispatchSummary {
                product_code: record.product_code,
                product_name: record.product_name.clone(),
                features: record.features.clone(),
                presentation: record.presentation.clone(),
                unit: record.unit.clone(),
                total_qty: 0,
                total_line_value: Decimal::ZERO,
                batch_lines: Vec::new(),
            });
            summaries.len() - 1
        });

        if let Some(summary) = summaries.get_mut(slot) {
            summary.total_qty += record.qty;
            summary.total_line_value += record.line_total;
            summary.batch_lines.push(BatchLine::from(record));
        }
    }

    summaries.sort_by(compare_by_name);
    summaries
}

/// Totals across all summaries: `(units, value)`.
#[must_use]
pub fn grand_total(summaries: &[DispatchSummary]) -> (i64, Decimal) {
    summaries.iter().fold((0, Decimal::ZERO), |(qty, value), s| {
        (qty + s.total_qty, value + s.total_line_value)
    })
}

fn compare_by_name(a: &DispatchSummary, b: &DispatchSummary) -> Ordering {
    collation_key(&a.product_name)
        .cmp(&collation_key(&b.product_name))
        .then_with(|| a.product_name.cmp(&b.product_name))
        .then_with(|| a.product_code.cmp(&b.product_code))
}

/// Case- and accent-insensitive sort key.
///
/// Lowercases and folds Latin diacritics to their base letter, so "Ácido"
/// sorts next to "acido" rather than after "z".
fn collation_key(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

const fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}
