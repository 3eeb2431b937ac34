use std::collections::HashMap;

use serde::Serialize;

use super::domain::CategoricalField;

/// Label lookup for one categorical field with its reserved fallback code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalMapping {
    codes: HashMap<String, i64>,
    fallback: i64,
}

/// Result of a lookup. `known` is false when the fallback code was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCode {
    pub code: i64,
    pub known: bool,
}

impl CategoricalMapping {
    pub fn new(entries: &[(&str, i64)], fallback: i64) -> Self {
        let codes = entries
            .iter()
            .map(|(label, code)| ((*label).to_string(), *code))
            .collect();
        Self { codes, fallback }
    }

    /// Exact, case-sensitive match; unseen labels take the fallback code.
    pub fn encode(&self, label: &str) -> CategoryCode {
        match self.codes.get(label) {
            Some(code) => CategoryCode {
                code: *code,
                known: true,
            },
            None => CategoryCode {
                code: self.fallback,
                known: false,
            },
        }
    }

    pub fn fallback(&self) -> i64 {
        self.fallback
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, i64)> {
        self.codes.iter().map(|(label, code)| (label.as_str(), *code))
    }
}

/// Full set of lookup tables, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalMappings {
    gender: CategoricalMapping,
    education: CategoricalMapping,
    marital_status: CategoricalMapping,
    loan_purpose: CategoricalMapping,
    employment_status: CategoricalMapping,
    payment_history: CategoricalMapping,
}

impl CategoricalMappings {
    /// Codes the shipped classifier was trained against.
    pub fn standard() -> Self {
        Self {
            gender: CategoricalMapping::new(&[("Male", 0), ("Female", 1), ("Non-binary", 2)], 3),
            education: CategoricalMapping::new(
                &[("Bachelor's", 0), ("High school", 1), ("PhD", 2)],
                3,
            ),
            marital_status: CategoricalMapping::new(
                &[("Widowed", 0), ("Divorced", 1), ("Single", 2), ("Married", 3)],
                4,
            ),
            loan_purpose: CategoricalMapping::new(
                &[("Home", 0), ("Auto", 1), ("Personal", 2), ("Business", 3)],
                4,
            ),
            employment_status: CategoricalMapping::new(
                &[("Employed", 0), ("Unemployed", 1), ("Self-employed", 2)],
                3,
            ),
            payment_history: CategoricalMapping::new(
                &[("Excellent", 0), ("Good", 1), ("Fair", 2), ("Poor", 3)],
                4,
            ),
        }
    }

    pub fn mapping(&self, field: CategoricalField) -> &CategoricalMapping {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Education => &self.education,
            CategoricalField::MaritalStatus => &self.marital_status,
            CategoricalField::LoanPurpose => &self.loan_purpose,
            CategoricalField::EmploymentStatus => &self.employment_status,
            CategoricalField::PaymentHistory => &self.payment_history,
        }
    }

    pub fn encode(&self, field: CategoricalField, label: &str) -> CategoryCode {
        self.mapping(field).encode(label)
    }
}

impl Default for CategoricalMappings {
    fn default() -> Self {
        Self::standard()
    }
}
