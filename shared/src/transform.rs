//! Form record → scoring service request.
//!
//! Pure and deterministic. Numeric text is coerced here, never earlier, and a
//! value that does not coerce to a finite number is rejected instead of being
//! sent to the service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::{FormData, FormField};

/// Body of `POST /predict`. Field names are the service's wire names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub checking_status: String,
    pub duration: i64,
    pub credit_history: String,
    pub purpose: String,
    pub credit_amount: f64,
    pub savings: String,
    pub employment: String,
    pub installment_rate: i64,
    pub personal_status: String,
    pub other_debtors: String,
    pub residence_since: i64,
    pub property: String,
    pub age: i64,
    pub other_installment: String,
    pub housing: String,
    pub existing_credits: i64,
    pub job: String,
    pub people_liable: i64,
    pub telephone: String,
    pub foreign_worker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("{field} is not a finite number")]
    NotANumber { field: FormField },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::NotANumber { field } => *field,
        }
    }
}

pub fn to_request(form: &FormData) -> Result<ServiceRequest, ValidationError> {
    let text = |field: FormField| form.get(field).to_string();

    Ok(ServiceRequest {
        checking_status: text(FormField::CheckingStatus),
        duration: integer(form, FormField::Duration)?,
        credit_history: text(FormField::CreditHistory),
        purpose: text(FormField::Purpose),
        credit_amount: decimal(form, FormField::CreditAmount)?,
        savings: text(FormField::Savings),
        employment: text(FormField::Employment),
        installment_rate: integer(form, FormField::InstallmentRate)?,
        personal_status: text(FormField::PersonalStatus),
        other_debtors: text(FormField::OtherDebtors),
        residence_since: integer(form, FormField::ResidenceSince)?,
        property: text(FormField::Property),
        age: integer(form, FormField::Age)?,
        other_installment: text(FormField::OtherInstallment),
        housing: text(FormField::Housing),
        existing_credits: integer(form, FormField::ExistingCredits)?,
        job: text(FormField::Job),
        people_liable: integer(form, FormField::PeopleLiable)?,
        telephone: text(FormField::Telephone),
        foreign_worker: text(FormField::ForeignWorker),
    })
}

fn integer(form: &FormData, field: FormField) -> Result<i64, ValidationError> {
    parse_integer(form.get(field)).ok_or(ValidationError::NotANumber { field })
}

fn decimal(form: &FormData, field: FormField) -> Result<f64, ValidationError> {
    parse_decimal(form.get(field)).ok_or(ValidationError::NotANumber { field })
}

/// Splits an optional leading sign off `s`.
fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn digit_run(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Integer read from the longest leading `[sign]digits` prefix, after leading
/// whitespace. Trailing text is ignored, so `"12abc"` is 12, `"3.7"` is 3 and
/// `"1e3"` is 1. No leading digit means no number.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let (negative, rest) = split_sign(raw.trim_start());
    let end = digit_run(rest);
    if end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Finite decimal read from the longest leading
/// `[sign]digits[.digits][e[sign]digits]` prefix. `"12abc"` is 12.0 and
/// `".5"` is 0.5. `Infinity` and `NaN` are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let (_, unsigned) = split_sign(s);
    let sign_len = s.len() - unsigned.len();

    let whole = digit_run(unsigned);
    let mut end = whole;
    let mut mantissa_digits = whole;
    if unsigned[end..].starts_with('.') {
        let fraction = digit_run(&unsigned[end + 1..]);
        mantissa_digits += fraction;
        end += 1 + fraction;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(unsigned.as_bytes().get(end), Some(b'e' | b'E')) {
        let (_, exponent) = split_sign(&unsigned[end + 1..]);
        let exponent_digits = digit_run(exponent);
        if exponent_digits > 0 {
            end = unsigned.len() - exponent.len() + exponent_digits;
        }
    }

    s[..sign_len + end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn service_keys() -> Vec<&'static str> {
        let mut keys: Vec<_> = FormField::ALL.iter().map(|f| f.service_key()).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn default_form_transforms() {
        let request = to_request(&FormData::default()).unwrap();
        assert_eq!(request.checking_status, "no_account");
        assert_eq!(request.credit_history, "existing_paid_back");
        assert_eq!(request.duration, 24);
        assert_eq!(request.age, 35);
        assert!((request.credit_amount - 5000.0).abs() < f64::EPSILON);
        assert_eq!(request.installment_rate, 3);
        assert_eq!(request.residence_since, 2);
        assert_eq!(request.existing_credits, 1);
        assert_eq!(request.people_liable, 1);
        assert_eq!(request.purpose, "radio_tv");
        assert_eq!(request.foreign_worker, "yes");
    }

    #[test]
    fn wire_keys_match_service_schema() {
        let json = serde_json::to_value(to_request(&FormData::default()).unwrap()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, service_keys());
        assert_eq!(keys.len(), 20);
        assert_eq!(json["checking_status"], "no_account");
        assert_eq!(json["duration"], 24);
        assert!(json["credit_amount"].is_f64());
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(parse_integer("24"), Some(24));
        assert_eq!(parse_integer(" 24 "), Some(24));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("-3"), Some(-3));
        assert_eq!(parse_integer("3.7"), Some(3));
        assert_eq!(parse_integer("-3.7"), Some(-3));
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("   "), None);
        assert_eq!(parse_integer("twelve"), None);
        assert_eq!(parse_integer("NaN"), None);
        assert_eq!(parse_integer("inf"), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer(".5"), None);
    }

    #[test]
    fn integer_coercion_stops_at_first_non_digit() {
        assert_eq!(parse_integer("1e3"), Some(1));
        assert_eq!(parse_integer("12abc"), Some(12));
        assert_eq!(parse_integer("36 months"), Some(36));
        assert_eq!(parse_integer("1,000"), Some(1));
        assert_eq!(parse_integer("abc12"), None);
    }

    #[test]
    fn decimal_coercion() {
        assert_eq!(parse_decimal("5000"), Some(5000.0));
        assert_eq!(parse_decimal("1234.5"), Some(1234.5));
        assert_eq!(parse_decimal(" 1e3 "), Some(1000.0));
        assert_eq!(parse_decimal("-2.5E-1"), Some(-0.25));
        assert_eq!(parse_decimal(".5"), Some(0.5));
        assert_eq!(parse_decimal("7."), Some(7.0));
        assert_eq!(parse_decimal("infinity"), None);
        assert_eq!(parse_decimal("Infinity"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("."), None);
        assert_eq!(parse_decimal("1e999"), None);
    }

    #[test]
    fn decimal_coercion_reads_the_leading_number() {
        assert_eq!(parse_decimal("12abc"), Some(12.0));
        assert_eq!(parse_decimal("1234.5 EUR"), Some(1234.5));
        assert_eq!(parse_decimal("3e"), Some(3.0));
        assert_eq!(parse_decimal("3e+"), Some(3.0));
        assert_eq!(parse_decimal("2.5.1"), Some(2.5));
        assert_eq!(parse_decimal("EUR 12"), None);
    }

    #[test]
    fn trailing_text_in_numeric_field_still_submits() {
        let form = FormData::default()
            .update(FormField::Duration, "1e3")
            .update(FormField::CreditAmount, "12abc");
        let request = to_request(&form).unwrap();
        assert_eq!(request.duration, 1);
        assert!((request.credit_amount - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_field_is_rejected_with_its_name() {
        let form = FormData::default().update(FormField::PeopleLiable, "a few");
        assert_eq!(
            to_request(&form),
            Err(ValidationError::NotANumber {
                field: FormField::PeopleLiable
            })
        );

        let form = FormData::default().update(FormField::CreditAmount, "NaN");
        let err = to_request(&form).unwrap_err();
        assert_eq!(err.field(), FormField::CreditAmount);
    }

    #[test]
    fn unlisted_checking_status_is_forwarded_verbatim() {
        let form = FormData::default()
            .update(FormField::CheckingStatus, "A14")
            .update(FormField::CreditHistory, "A34");
        let request = to_request(&form).unwrap();
        assert_eq!(request.checking_status, "A14");
        assert_eq!(request.credit_history, "A34");
    }

    #[test]
    fn open_vocabularies_are_forwarded_verbatim() {
        let form = FormData::default().update(FormField::Purpose, "boat");
        assert_eq!(to_request(&form).unwrap().purpose, "boat");
    }

    fn integer_text() -> impl Strategy<Value = String> {
        prop_oneof![
            (0i64..10_000).prop_map(|v| v.to_string()),
            (0i64..10_000, 0u8..100).prop_map(|(w, f)| format!(" {w}.{f} ")),
        ]
    }

    fn numeric_fields() -> impl Strategy<Value = FormField> {
        prop::sample::select(
            FormField::ALL
                .into_iter()
                .filter(|f| f.is_numeric())
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        #[test]
        fn valid_forms_yield_finite_numbers_and_exact_keys(
            amount in 0.01f64..1_000_000.0,
            duration in integer_text(),
            age in integer_text(),
            rate in integer_text(),
            residence in integer_text(),
            credits in integer_text(),
            liable in integer_text(),
        ) {
            let form = FormData::default()
                .update(FormField::CreditAmount, amount.to_string())
                .update(FormField::Duration, duration)
                .update(FormField::Age, age)
                .update(FormField::InstallmentRate, rate)
                .update(FormField::ResidenceSince, residence)
                .update(FormField::ExistingCredits, credits)
                .update(FormField::PeopleLiable, liable);

            let request = to_request(&form).unwrap();
            prop_assert!(request.credit_amount.is_finite());

            let json = serde_json::to_value(&request).unwrap();
            let object = json.as_object().unwrap();
            let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
            keys.sort_unstable();
            prop_assert_eq!(keys, service_keys());
            for field in FormField::ALL.into_iter().filter(|f| f.is_numeric()) {
                let value = &object[field.service_key()];
                prop_assert!(value.as_f64().is_some_and(f64::is_finite), "{} not finite", field);
            }
        }

        #[test]
        fn alphabetic_text_in_any_numeric_field_is_rejected(
            field in numeric_fields(),
            junk in "[a-zA-Z]{1,12}",
        ) {
            let form = FormData::default().update(field, junk);
            prop_assert_eq!(to_request(&form), Err(ValidationError::NotANumber { field }));
        }
    }
}
