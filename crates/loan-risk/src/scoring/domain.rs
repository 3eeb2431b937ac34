use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of columns the classifier was trained on.
pub const FEATURE_COUNT: usize = 19;

/// Model input columns in training order. Reordering variants silently corrupts predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureColumn {
    Age,
    Gender,
    EducationLevel,
    MaritalStatus,
    Income,
    CreditScore,
    LoanAmount,
    LoanPurpose,
    EmploymentStatus,
    YearsAtCurrentJob,
    PaymentHistory,
    DebtToIncomeRatio,
    AssetsValue,
    NumberOfDependents,
    City,
    State,
    Country,
    PreviousDefaults,
    MaritalStatusChange,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::Age,
        FeatureColumn::Gender,
        FeatureColumn::EducationLevel,
        FeatureColumn::MaritalStatus,
        FeatureColumn::Income,
        FeatureColumn::CreditScore,
        FeatureColumn::LoanAmount,
        FeatureColumn::LoanPurpose,
        FeatureColumn::EmploymentStatus,
        FeatureColumn::YearsAtCurrentJob,
        FeatureColumn::PaymentHistory,
        FeatureColumn::DebtToIncomeRatio,
        FeatureColumn::AssetsValue,
        FeatureColumn::NumberOfDependents,
        FeatureColumn::City,
        FeatureColumn::State,
        FeatureColumn::Country,
        FeatureColumn::PreviousDefaults,
        FeatureColumn::MaritalStatusChange,
    ];

    /// Column name as declared by the training data frame.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Age => "Age",
            FeatureColumn::Gender => "Gender",
            FeatureColumn::EducationLevel => "Education_level",
            FeatureColumn::MaritalStatus => "Marital_status",
            FeatureColumn::Income => "Income",
            FeatureColumn::CreditScore => "Credit_score",
            FeatureColumn::LoanAmount => "Loan_Amount",
            FeatureColumn::LoanPurpose => "Loan_purpose",
            FeatureColumn::EmploymentStatus => "Employment_Status",
            FeatureColumn::YearsAtCurrentJob => "Years_at_current_job",
            FeatureColumn::PaymentHistory => "Payment_history",
            FeatureColumn::DebtToIncomeRatio => "Debt_to_Income_Ratio",
            FeatureColumn::AssetsValue => "Assets_value",
            FeatureColumn::NumberOfDependents => "Number_of_dependents",
            FeatureColumn::City => "City",
            FeatureColumn::State => "State",
            FeatureColumn::Country => "Country",
            FeatureColumn::PreviousDefaults => "Previous_defaults",
            FeatureColumn::MaritalStatusChange => "Marital_Status_change",
        }
    }

    /// Form field that feeds this column.
    pub fn source_field(self) -> &'static str {
        match self {
            FeatureColumn::Age => "age",
            FeatureColumn::Gender => "gender",
            FeatureColumn::EducationLevel => "education",
            FeatureColumn::MaritalStatus => "marital_status",
            FeatureColumn::Income => "income",
            FeatureColumn::CreditScore => "credit_score",
            FeatureColumn::LoanAmount => "loan_amount",
            FeatureColumn::LoanPurpose => "loan_purpose",
            FeatureColumn::EmploymentStatus => "employment_status",
            FeatureColumn::YearsAtCurrentJob => "years_at_job",
            FeatureColumn::PaymentHistory => "payment_history",
            FeatureColumn::DebtToIncomeRatio => "dti_ratio",
            FeatureColumn::AssetsValue => "assets_value",
            FeatureColumn::NumberOfDependents => "dependents",
            FeatureColumn::City => "city",
            FeatureColumn::State => "state",
            FeatureColumn::Country => "country",
            FeatureColumn::PreviousDefaults => "previous_defaults",
            FeatureColumn::MaritalStatusChange => "marital_status_change",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields that pass through the categorical lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Gender,
    Education,
    MaritalStatus,
    LoanPurpose,
    EmploymentStatus,
    PaymentHistory,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::Gender,
        CategoricalField::Education,
        CategoricalField::MaritalStatus,
        CategoricalField::LoanPurpose,
        CategoricalField::EmploymentStatus,
        CategoricalField::PaymentHistory,
    ];

    pub fn column(self) -> FeatureColumn {
        match self {
            CategoricalField::Gender => FeatureColumn::Gender,
            CategoricalField::Education => FeatureColumn::EducationLevel,
            CategoricalField::MaritalStatus => FeatureColumn::MaritalStatus,
            CategoricalField::LoanPurpose => FeatureColumn::LoanPurpose,
            CategoricalField::EmploymentStatus => FeatureColumn::EmploymentStatus,
            CategoricalField::PaymentHistory => FeatureColumn::PaymentHistory,
        }
    }

    pub fn field_name(self) -> &'static str {
        self.column().source_field()
    }
}

/// User-submitted form values keyed by field name, prior to any coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawApplication {
    fields: HashMap<String, String>,
}

impl RawApplication {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for RawApplication {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::new(fields)
    }
}

/// Fixed-order numeric row handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedFeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl EncodedFeatureVector {
    pub(crate) fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, column: FeatureColumn) -> f64 {
        self.values[column.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pairs each value with its column, in training order.
    pub fn named(&self) -> impl Iterator<Item = (FeatureColumn, f64)> + '_ {
        FeatureColumn::ALL
            .iter()
            .map(move |column| (*column, self.values[column.index()]))
    }
}

/// Risk tier surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 4] = [
        RiskLabel::Low,
        RiskLabel::Medium,
        RiskLabel::High,
        RiskLabel::Unknown,
    ];

    pub fn from_class_index(index: i64) -> Self {
        match index {
            0 => RiskLabel::Low,
            1 => RiskLabel::Medium,
            2 => RiskLabel::High,
            _ => RiskLabel::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
            RiskLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejection raised while coercing a raw application. Aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' expects an integer, got '{value}'")]
    InvalidInteger { field: &'static str, value: String },
    #[error("field '{field}' expects a finite number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field '{field}' must be a string or number")]
    UnsupportedValue { field: String },
}
