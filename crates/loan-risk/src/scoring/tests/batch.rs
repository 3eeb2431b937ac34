use super::common::*;
use crate::scoring::batch::{score_csv, BatchError};

const HEADER: &str = "age,gender,education,marital_status,income,credit_score,loan_amount,loan_purpose,employment_status,years_at_job,payment_history,dti_ratio,assets_value,dependents,city,state,country,previous_defaults,marital_status_change";

#[test]
fn batch_scores_rows_and_reports_rejections() {
    let input = format!(
        "{HEADER}\n\
35,Female,PhD,Married,75000,700,20000,Home,Employed,5,Good,0.3,150000,2,Austin,Texas,USA,0,0\n\
52,Male,High school,Divorced,41000,580,12000,Auto,Unemployed,0,Poor,0.61,9000,3,Dayton,Ohio,USA,2,1\n\
forty,Male,PhD,Single,50000,650,10000,Personal,Employed,2,Fair,0.2,1000,0,Boise,Idaho,USA,0,0\n"
    );
    let mut output = Vec::new();

    let summary = score_csv(&forest_service(), input.as_bytes(), &mut output).expect("batch runs");

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.risk_counts.get("Low"), Some(&1));
    assert_eq!(summary.risk_counts.get("High"), Some(&1));

    let written = String::from_utf8(output).expect("utf-8 output");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "row,risk,class_index,error");
    assert_eq!(lines[1], "1,Low,0,");
    assert_eq!(lines[2], "2,High,2,");
    assert_eq!(
        lines[3],
        "3,Error,,\"field 'age' expects an integer, got 'forty'\""
    );
}

#[test]
fn batch_reports_missing_columns_per_row() {
    let input = "age,gender\n35,Female\n";
    let mut output = Vec::new();

    let summary = score_csv(&fixed_service(0), input.as_bytes(), &mut output).expect("batch runs");

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.rejected, 1);
    let written = String::from_utf8(output).expect("utf-8 output");
    assert!(written.contains("missing required field 'education'"));
}

#[test]
fn ragged_csv_aborts_the_batch() {
    let input = format!("{HEADER}\n35,Female\n");
    let mut output = Vec::new();
    assert!(matches!(
        score_csv(&fixed_service(0), input.as_bytes(), &mut output),
        Err(BatchError::Csv(_))
    ));
}
