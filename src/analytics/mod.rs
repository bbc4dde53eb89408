//! Derived views over the expense list. Everything here is pure.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Category, Expense};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub(crate) category: Category,
    pub(crate) total: i64,
}

/// Saturates at `i64::MAX` rather than wrapping.
pub(crate) fn total_spend(expenses: &[Expense]) -> i64 {
    sum_amounts(expenses.iter())
}

/// Per-category totals, largest first, zero totals dropped.
///
/// `categories` fixes the tie order: the sort is stable, so equal totals keep
/// the order they were given in.
pub(crate) fn category_breakdown(
    expenses: &[Expense],
    categories: &[Category],
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = categories
        .iter()
        .map(|&category| CategoryTotal {
            category,
            total: sum_amounts(expenses.iter().filter(|e| e.category == category)),
        })
        .filter(|c| c.total > 0)
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

/// `round(total / limit * 100)`, capped at 100. Returns 0 for a non-positive limit.
pub(crate) fn budget_utilization(total: i64, limit: i64) -> u8 {
    if limit <= 0 {
        return 0;
    }
    rounded_percent(total, limit).clamp(0, 100) as u8
}

pub(crate) fn budget_is_configured(limit: i64) -> bool {
    limit > 0
}

/// A category's share of total spend, in whole percent.
pub(crate) fn category_share(category_total: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    rounded_percent(category_total, total).clamp(0, 100) as u8
}

/// What is left of the budget. Negative once overspent.
pub(crate) fn remaining_budget(total: i64, limit: i64) -> i64 {
    limit.saturating_sub(total)
}

pub(crate) fn ratio_percent(part: i64, whole: i64) -> Decimal {
    Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)
}

fn sum_amounts<'a>(expenses: impl Iterator<Item = &'a Expense>) -> i64 {
    expenses.fold(0i64, |acc, e| acc.saturating_add(e.amount))
}

fn rounded_percent(part: i64, whole: i64) -> i64 {
    ratio_percent(part, whole)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}
