use std::sync::Arc;

use super::domain::{
    CategoricalField, EncodedFeatureVector, FeatureColumn, InputError, RawApplication,
    FEATURE_COUNT,
};
use super::mapping::CategoricalMappings;

/// Modulus bounding the geography codes.
pub const GEO_BUCKETS: u64 = 1000;

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// How a raw field is turned into its numeric column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Integer,
    Number,
    Categorical(CategoricalField),
    Geographic,
}

pub(crate) fn column_kind(column: FeatureColumn) -> ColumnKind {
    match column {
        FeatureColumn::Age
        | FeatureColumn::CreditScore
        | FeatureColumn::YearsAtCurrentJob
        | FeatureColumn::NumberOfDependents
        | FeatureColumn::PreviousDefaults
        | FeatureColumn::MaritalStatusChange => ColumnKind::Integer,
        FeatureColumn::Income
        | FeatureColumn::LoanAmount
        | FeatureColumn::DebtToIncomeRatio
        | FeatureColumn::AssetsValue => ColumnKind::Number,
        FeatureColumn::Gender => ColumnKind::Categorical(CategoricalField::Gender),
        FeatureColumn::EducationLevel => ColumnKind::Categorical(CategoricalField::Education),
        FeatureColumn::MaritalStatus => ColumnKind::Categorical(CategoricalField::MaritalStatus),
        FeatureColumn::LoanPurpose => ColumnKind::Categorical(CategoricalField::LoanPurpose),
        FeatureColumn::EmploymentStatus => {
            ColumnKind::Categorical(CategoricalField::EmploymentStatus)
        }
        FeatureColumn::PaymentHistory => ColumnKind::Categorical(CategoricalField::PaymentHistory),
        FeatureColumn::City | FeatureColumn::State | FeatureColumn::Country => {
            ColumnKind::Geographic
        }
    }
}

/// Encoder output: the model row plus the categorical fields that fell back.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedApplication {
    pub features: EncodedFeatureVector,
    pub fallbacks: Vec<CategoricalField>,
}

/// Pure transformation from submitted form values to the classifier's input row.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    mappings: Arc<CategoricalMappings>,
}

impl FeatureEncoder {
    pub fn new(mappings: Arc<CategoricalMappings>) -> Self {
        Self { mappings }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(CategoricalMappings::standard()))
    }

    pub fn mappings(&self) -> &CategoricalMappings {
        &self.mappings
    }

    /// Every field must be present before any value is coerced, so a failure never
    /// yields a partially populated row.
    pub fn encode(&self, raw: &RawApplication) -> Result<EncodedApplication, InputError> {
        let mut submitted = [""; FEATURE_COUNT];
        for column in FeatureColumn::ALL {
            let field = column.source_field();
            submitted[column.index()] = raw.get(field).ok_or(InputError::MissingField { field })?;
        }

        let mut values = [0.0; FEATURE_COUNT];
        let mut fallbacks = Vec::new();
        for column in FeatureColumn::ALL {
            let value = submitted[column.index()];
            values[column.index()] = match column_kind(column) {
                ColumnKind::Integer => parse_integer(column.source_field(), value)? as f64,
                ColumnKind::Number => parse_number(column.source_field(), value)?,
                ColumnKind::Categorical(field) => {
                    let encoded = self.mappings.encode(field, value);
                    if !encoded.known {
                        fallbacks.push(field);
                    }
                    encoded.code as f64
                }
                ColumnKind::Geographic => geo_code(value) as f64,
            };
        }

        Ok(EncodedApplication {
            features: EncodedFeatureVector::from_values(values),
            fallbacks,
        })
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::standard()
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, InputError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| InputError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, InputError> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(InputError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// 64-bit FNV-1a over the UTF-8 bytes, stable across processes and platforms.
pub fn fnv1a_64(value: &str) -> u64 {
    let mut hash = FNV64_OFFSET_BASIS;
    for byte in value.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

/// Bounded code for city, state, and country text, always in `0..1000`.
pub fn geo_code(value: &str) -> u16 {
    (fnv1a_64(value) % GEO_BUCKETS) as u16
}
