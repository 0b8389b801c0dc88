//! Employee model and roster.
//!
//! Only `regular` employees take part in aggregate statistics. Support staff
//! and employees explicitly excluded from statistics are filtered out by the
//! roster before any aggregation runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How an employee participates in statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeCategory {
    /// Counted in every aggregate. Employees with no category are regular.
    #[default]
    Regular,
    /// Staff lent from another site; never counted.
    Support,
    /// Explicitly excluded from statistics.
    Excluded,
}

impl EmployeeCategory {
    /// Stable lowercase name, used in cache fingerprints.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeCategory::Regular => "regular",
            EmployeeCategory::Support => "support",
            EmployeeCategory::Excluded => "excluded",
        }
    }
}

/// An employee known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier, matching the keys used in schedules.
    pub id: String,
    /// Name shown in reports.
    pub display_name: String,
    /// Statistics participation.
    #[serde(default)]
    pub category: EmployeeCategory,
}

impl Employee {
    /// Returns true if the employee is counted in aggregates.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_stats::models::{Employee, EmployeeCategory};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     display_name: "Mei".to_string(),
    ///     category: EmployeeCategory::Support,
    /// };
    /// assert!(!employee.is_regular());
    /// ```
    pub fn is_regular(&self) -> bool {
        self.category == EmployeeCategory::Regular
    }
}

/// The set of employees the engine knows about, keyed by id.
///
/// Employees that appear in schedules but not in the roster are treated as
/// regular and displayed by their id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRoster {
    employees: HashMap<String, Employee>,
}

impl EmployeeRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn insert(&mut self, employee: Employee) {
        self.employees.insert(employee.id.clone(), employee);
    }

    /// Builds a roster from a bare `id -> category` map, using ids as display names.
    pub fn from_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = (S, EmployeeCategory)>,
        S: Into<String>,
    {
        let mut roster = Self::new();
        for (id, category) in categories {
            let id = id.into();
            roster.insert(Employee {
                display_name: id.clone(),
                id,
                category,
            });
        }
        roster
    }

    /// Looks up an employee.
    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id)
    }

    /// The employee's category, defaulting to regular.
    pub fn category_of(&self, id: &str) -> EmployeeCategory {
        self.employees
            .get(id)
            .map(|e| e.category)
            .unwrap_or_default()
    }

    /// Returns true if the employee is counted in aggregates.
    pub fn is_regular(&self, id: &str) -> bool {
        self.category_of(id) == EmployeeCategory::Regular
    }

    /// The display name, falling back to the id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.employees
            .get(id)
            .map(|e| e.display_name.as_str())
            .unwrap_or(id)
    }

    /// Every `(id, category)` pair that is not the regular default, sorted by id.
    ///
    /// These are the category overrides that change aggregation results.
    pub fn category_overrides(&self) -> Vec<(&str, EmployeeCategory)> {
        let mut overrides: Vec<(&str, EmployeeCategory)> = self
            .employees
            .values()
            .filter(|e| !e.is_regular())
            .map(|e| (e.id.as_str(), e.category))
            .collect();
        overrides.sort_by(|a, b| a.0.cmp(b.0));
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: &str, category: EmployeeCategory) -> Employee {
        Employee {
            id: id.to_string(),
            display_name: format!("Name {id}"),
            category,
        }
    }

    #[test]
    fn test_deserialize_employee_without_category_is_regular() {
        let json = r#"{ "id": "emp_001", "display_name": "Mei" }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.category, EmployeeCategory::Regular);
        assert!(employee.is_regular());
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeCategory::Support).unwrap(),
            "\"support\""
        );
        let excluded: EmployeeCategory = serde_json::from_str("\"excluded\"").unwrap();
        assert_eq!(excluded, EmployeeCategory::Excluded);
    }

    #[test]
    fn test_unknown_employee_defaults_to_regular() {
        let roster = EmployeeRoster::new();
        assert!(roster.is_regular("stranger"));
        assert_eq!(roster.display_name("stranger"), "stranger");
    }

    #[test]
    fn test_roster_filters_support_and_excluded() {
        let mut roster = EmployeeRoster::new();
        roster.insert(employee("a", EmployeeCategory::Regular));
        roster.insert(employee("b", EmployeeCategory::Support));
        roster.insert(employee("c", EmployeeCategory::Excluded));

        assert!(roster.is_regular("a"));
        assert!(!roster.is_regular("b"));
        assert!(!roster.is_regular("c"));
        assert_eq!(roster.display_name("a"), "Name a");
    }

    #[test]
    fn test_category_overrides_are_sorted_and_skip_regular() {
        let roster = EmployeeRoster::from_categories([
            ("zed", EmployeeCategory::Support),
            ("amy", EmployeeCategory::Excluded),
            ("bob", EmployeeCategory::Regular),
        ]);
        assert_eq!(
            roster.category_overrides(),
            vec![
                ("amy", EmployeeCategory::Excluded),
                ("zed", EmployeeCategory::Support)
            ]
        );
    }
}
