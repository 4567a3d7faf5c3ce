//! Weighted category table.
//!
//! The category mix is data, not code: a [`CategoryTable`] lists each
//! category with its sampling weight and the priority it is dispatched at.
//! The default table matches the reference mix; custom tables can be
//! deserialized from configuration and checked with
//! [`CategoryTable::validate`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IncidentCategory, Priority};

/// Allowed deviation of the weight total from 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised when validating a [`CategoryTable`].
#[derive(Debug, Error)]
pub enum CategoryTableError {
    /// The table has no entries.
    #[error("Category table is empty")]
    Empty,

    /// A category appears more than once.
    #[error("Category {category} appears more than once")]
    DuplicateCategory {
        /// The duplicated category.
        category: IncidentCategory,
    },

    /// A weight is negative, NaN, or infinite.
    #[error("Invalid weight {weight} for category {category}")]
    InvalidWeight {
        /// The category with the bad weight.
        category: IncidentCategory,
        /// The offending weight.
        weight: f64,
    },

    /// The weights do not sum to 1.
    #[error("Category weights sum to {total}, expected 1")]
    WeightSum {
        /// Actual weight total.
        total: f64,
    },
}

/// One row of the category table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    /// The category.
    pub category: IncidentCategory,
    /// Sampling probability (the table's weights sum to 1).
    pub weight: f64,
    /// Priority every incident of this category is dispatched at.
    pub priority: Priority,
}

impl CategoryWeight {
    /// Creates a row using the category's default priority.
    #[must_use]
    pub const fn new(category: IncidentCategory, weight: f64) -> Self {
        Self {
            category,
            weight,
            priority: category.default_priority(),
        }
    }
}

/// Ordered list of categories with sampling weights and priorities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    entries: Vec<CategoryWeight>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        use IncidentCategory as C;

        Self {
            entries: vec![
                CategoryWeight::new(C::Theft, 0.25),
                CategoryWeight::new(C::Robbery, 0.15),
                CategoryWeight::new(C::TrafficAccident, 0.20),
                CategoryWeight::new(C::Disturbance, 0.12),
                CategoryWeight::new(C::Vandalism, 0.08),
                CategoryWeight::new(C::SuspiciousActivity, 0.05),
                CategoryWeight::new(C::DomesticViolence, 0.07),
                CategoryWeight::new(C::DrugTrafficking, 0.05),
                CategoryWeight::new(C::Assault, 0.03),
            ],
        }
    }
}

impl CategoryTable {
    /// Builds and validates a table.
    ///
    /// # Errors
    ///
    /// Returns a [`CategoryTableError`] if the entries fail
    /// [`Self::validate`].
    pub fn new(entries: Vec<CategoryWeight>) -> Result<Self, CategoryTableError> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Checks that the table is non-empty, has no duplicate categories, and
    /// has finite non-negative weights summing to 1.
    ///
    /// # Errors
    ///
    /// Returns the first [`CategoryTableError`] found.
    pub fn validate(&self) -> Result<(), CategoryTableError> {
        if self.entries.is_empty() {
            return Err(CategoryTableError::Empty);
        }

        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.category) {
                return Err(CategoryTableError::DuplicateCategory {
                    category: entry.category,
                });
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(CategoryTableError::InvalidWeight {
                    category: entry.category,
                    weight: entry.weight,
                });
            }
        }

        let total = self.total_weight();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CategoryTableError::WeightSum { total });
        }

        Ok(())
    }

    /// Returns the table rows in order.
    #[must_use]
    pub fn entries(&self) -> &[CategoryWeight] {
        &self.entries
    }

    /// Sum of every weight.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Priority of `category` in this table, if the category is listed.
    #[must_use]
    pub fn priority_of(&self, category: IncidentCategory) -> Option<Priority> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let table = CategoryTable::default();
        table.validate().unwrap();
        assert_eq!(table.entries().len(), IncidentCategory::all().len());
    }

    #[test]
    fn default_table_covers_every_category_with_its_priority() {
        let table = CategoryTable::default();
        for category in IncidentCategory::all() {
            assert_eq!(
                table.priority_of(*category),
                Some(category.default_priority()),
                "{category:?} missing or has the wrong priority"
            );
        }
    }

    #[test]
    fn default_table_uses_every_priority() {
        let table = CategoryTable::default();
        for priority in Priority::all() {
            assert!(
                table.entries().iter().any(|e| e.priority == *priority),
                "no category dispatched at {priority}"
            );
        }
        for entry in table.entries() {
            assert!(Priority::all().contains(&entry.priority));
        }
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = CategoryTable::new(vec![
            CategoryWeight::new(IncidentCategory::Theft, 0.5),
            CategoryWeight::new(IncidentCategory::Robbery, 0.3),
        ])
        .unwrap_err();
        assert!(matches!(err, CategoryTableError::WeightSum { .. }));
    }

    #[test]
    fn rejects_duplicates_negatives_and_empty() {
        assert!(matches!(
            CategoryTable::new(vec![]),
            Err(CategoryTableError::Empty)
        ));
        assert!(matches!(
            CategoryTable::new(vec![
                CategoryWeight::new(IncidentCategory::Theft, 0.5),
                CategoryWeight::new(IncidentCategory::Theft, 0.5),
            ]),
            Err(CategoryTableError::DuplicateCategory { .. })
        ));
        assert!(matches!(
            CategoryTable::new(vec![
                CategoryWeight::new(IncidentCategory::Theft, 1.5),
                CategoryWeight::new(IncidentCategory::Assault, -0.5),
            ]),
            Err(CategoryTableError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn custom_priorities_are_respected() {
        let table = CategoryTable::new(vec![CategoryWeight {
            category: IncidentCategory::Vandalism,
            weight: 1.0,
            priority: Priority::High,
        }])
        .unwrap();
        assert_eq!(
            table.priority_of(IncidentCategory::Vandalism),
            Some(Priority::High)
        );
        assert_eq!(table.priority_of(IncidentCategory::Theft), None);
    }
}
