//! Budget document model and the arithmetic the tables are built from.
//!
//! All helpers are pure functions over [`Decimal`] amounts. Arithmetic is
//! checked: a result outside the `Decimal` range comes back as `None`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AutosaveError, Result};
use crate::saveable::Saveable;

/// One budgeted line with its actual spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub category: String,
    pub label: String,
    pub budget: Decimal,
    pub actual: Decimal,
}

impl LineItem {
    pub fn new(
        category: impl Into<String>,
        label: impl Into<String>,
        budget: Decimal,
        actual: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
            budget,
            actual,
        }
    }

    pub fn variance(&self) -> Option<Variance> {
        variance(self.budget, self.actual)
    }
}

/// The whole document persisted to the budget file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BudgetDocument {
    pub name: String,
    pub items: Vec<LineItem>,
}

impl BudgetDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| AutosaveError::Decode(e.to_string()))
    }
}

impl Saveable for BudgetDocument {
    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| AutosaveError::Encode(e.to_string()))
    }
}

/// Difference between actual and budgeted amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variance {
    /// `actual - budget`; positive means overspent.
    pub amount: Decimal,
    /// `amount` as a percentage of `budget`, rounded to two places. `None`
    /// when nothing was budgeted.
    pub percent: Option<Decimal>,
    pub over_budget: bool,
}

/// `None` if `actual - budget` overflows.
pub fn variance(budget: Decimal, actual: Decimal) -> Option<Variance> {
    let amount = actual.checked_sub(budget)?;
    let percent = amount
        .checked_div(budget)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2));
    Some(Variance {
        amount,
        percent,
        over_budget: amount > Decimal::ZERO,
    })
}

fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, x| acc.checked_add(x))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
    Flat,
}

/// Least-squares linear trend over equally spaced periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trend {
    /// Change per period.
    pub slope: Decimal,
    /// Fitted value of the first period.
    pub intercept: Decimal,
    periods: usize,
}

impl Trend {
    /// Fit a line through `history`, oldest first. `None` for an empty
    /// history or on overflow; a single point yields a flat trend.
    pub fn fit(history: &[Decimal]) -> Option<Self> {
        let n = history.len();
        if n == 0 {
            return None;
        }
        let count = Decimal::from(n as u64);
        let mean_y = checked_sum(history.iter().copied())?.checked_div(count)?;
        let mean_x = Decimal::from((n - 1) as u64) / Decimal::TWO;

        let (num, den) = history.iter().enumerate().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(num, den), (i, y)| {
                let dx = Decimal::from(i as u64) - mean_x;
                let num = num.checked_add(dx.checked_mul(y.checked_sub(mean_y)?)?)?;
                let den = den.checked_add(dx.checked_mul(dx)?)?;
                Some((num, den))
            },
        )?;
        let slope = num.checked_div(den).unwrap_or(Decimal::ZERO);

        Some(Self {
            slope,
            intercept: mean_y.checked_sub(slope.checked_mul(mean_x)?)?,
            periods: n,
        })
    }

    /// Projected value `periods_ahead` periods after the last observation.
    pub fn project(&self, periods_ahead: usize) -> Option<Decimal> {
        let x = Decimal::from((self.periods - 1 + periods_ahead) as u64);
        self.intercept.checked_add(self.slope.checked_mul(x)?)
    }

    /// Sum of the projections for the next `periods` periods.
    pub fn project_total(&self, periods: usize) -> Option<Decimal> {
        (1..=periods).try_fold(Decimal::ZERO, |acc, ahead| {
            acc.checked_add(self.project(ahead)?)
        })
    }

    pub fn direction(&self) -> Direction {
        if self.slope > Decimal::ZERO {
            Direction::Rising
        } else if self.slope < Decimal::ZERO {
            Direction::Falling
        } else {
            Direction::Flat
        }
    }
}

/// Budget and actual totals for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub budget: Decimal,
    pub actual: Decimal,
    pub items: usize,
}

impl CategoryTotal {
    pub fn variance(&self) -> Option<Variance> {
        variance(self.budget, self.actual)
    }
}

/// Group `items` by category, sorted by category name. `None` if any
/// category total overflows.
pub fn aggregate(items: &[LineItem]) -> Option<Vec<CategoryTotal>> {
    let mut groups: BTreeMap<&str, CategoryTotal> = BTreeMap::new();
    for item in items {
        let total = groups
            .entry(item.category.as_str())
            .or_insert_with(|| CategoryTotal {
                category: item.category.clone(),
                budget: Decimal::ZERO,
                actual: Decimal::ZERO,
                items: 0,
            });
        total.budget = total.budget.checked_add(item.budget)?;
        total.actual = total.actual.checked_add(item.actual)?;
        total.items += 1;
    }
    Some(groups.into_values().collect())
}

/// Grand total across all items, under the category name `"Total"`.
pub fn totals(items: &[LineItem]) -> Option<CategoryTotal> {
    Some(CategoryTotal {
        category: "Total".to_string(),
        budget: checked_sum(items.iter().map(|i| i.budget))?,
        actual: checked_sum(items.iter().map(|i| i.actual))?,
        items: items.len(),
    })
}
