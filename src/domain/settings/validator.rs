//! Hard gates on the anthropometric fields.

use std::ops::RangeInclusive;

use crate::domain::foundation::{UserId, ValidationError};

use super::edit::{parse_finite, CoercedProfile, ProfileEdit};

/// The gated fields, parsed and range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryFields {
    pub weight_lb: f64,
    pub height_cm: f64,
    pub age: i32,
    pub decimal_places: i32,
}

/// Validates a [`ProfileEdit`].
///
/// Rules run in a fixed order and the first failure is returned:
///
/// 1. `weight`: finite number, > 0
/// 2. `height`: finite number in `120..=220`
/// 3. `age`: number truncated to an integer in `15..=100`
/// 4. `decimal_places`: number truncated to an integer
///
/// Secondary fields are never rejected here; see [`ProfileEdit::into_profile`].
pub struct ProfileValidator;

impl ProfileValidator {
    pub const HEIGHT_CM: RangeInclusive<f64> = 120.0..=220.0;
    pub const AGE: RangeInclusive<i32> = 15..=100;

    /// Checks the gated fields only.
    pub fn validate_primary(edit: &ProfileEdit) -> Result<PrimaryFields, ValidationError> {
        let weight_lb = number("weight", &edit.weight_lb)?;
        if weight_lb <= 0.0 {
            return Err(ValidationError::not_positive("weight", weight_lb));
        }

        let height_cm = number("height", &edit.height_cm)?;
        if !Self::HEIGHT_CM.contains(&height_cm) {
            return Err(ValidationError::out_of_range(
                "height",
                *Self::HEIGHT_CM.start(),
                *Self::HEIGHT_CM.end(),
                height_cm,
            ));
        }

        let age = integer("age", &edit.age)?;
        if !Self::AGE.contains(&age) {
            return Err(ValidationError::out_of_range(
                "age",
                f64::from(*Self::AGE.start()),
                f64::from(*Self::AGE.end()),
                f64::from(age),
            ));
        }

        let decimal_places = integer("decimal_places", &edit.decimal_places)?;

        Ok(PrimaryFields {
            weight_lb,
            height_cm,
            age,
            decimal_places,
        })
    }

    /// Gates the primary fields, then coerces the rest into a full record.
    pub fn validate(user_id: UserId, edit: ProfileEdit) -> Result<CoercedProfile, ValidationError> {
        let primary = Self::validate_primary(&edit)?;
        Ok(edit.into_profile(user_id, primary))
    }
}

fn number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    parse_finite(raw).ok_or_else(|| ValidationError::not_a_number(field, raw.trim()))
}

/// Whole-number read of form text: a fractional value is truncated toward
/// zero, so `"30.5"` reads as 30 and `"2.0"` as 2.
fn integer(field: &str, raw: &str) -> Result<i32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let whole = parse_finite(raw)
        .ok_or_else(|| ValidationError::not_an_integer(field, raw))?
        .trunc();
    if whole < f64::from(i32::MIN) || whole > f64::from(i32::MAX) {
        return Err(ValidationError::out_of_range(
            field,
            f64::from(i32::MIN),
            f64::from(i32::MAX),
            whole,
        ));
    }
    Ok(whole as i32)
}
