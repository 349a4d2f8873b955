use hourglass_rs::SafeTimeProvider;
use rand::Rng;

use crate::errors::{PaymentError, Result};

/// prefix for payment references
pub const PAYMENT_REFERENCE_PREFIX: &str = "RC";

/// generates checksum-protected reference numbers such as
/// `RC-1519-9028-1909-3890`: 13 digits of epoch millis, 2 filler digits and
/// a Luhn check digit, grouped in fours.
pub struct ReferenceGenerator;

impl ReferenceGenerator {
    pub fn next(prefix: &str, time: &SafeTimeProvider) -> String {
        let millis = time.now().timestamp_millis();
        let filler: u32 = rand::thread_rng().gen_range(10..100);
        let payload = format!("{millis:013}{filler:02}");
        let check = luhn_check_digit(&payload);
        let digits = format!("{payload}{check}");
        format!(
            "{prefix}-{}-{}-{}-{}",
            &digits[0..4],
            &digits[4..8],
            &digits[8..12],
            &digits[12..16]
        )
    }

    /// next payment reference
    pub fn next_payment_reference(time: &SafeTimeProvider) -> String {
        Self::next(PAYMENT_REFERENCE_PREFIX, time)
    }
}

/// check a reference's shape and Luhn check digit
pub fn is_valid_reference(reference: &str) -> bool {
    let Some((_prefix, body)) = reference.split_once('-') else {
        return false;
    };
    let digits: String = body.chars().filter(|c| *c != '-').collect();
    if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    luhn_valid(&digits)
}

/// validate or fail with InvalidReference
pub fn require_valid_reference(reference: &str) -> Result<()> {
    if is_valid_reference(reference) {
        Ok(())
    } else {
        Err(PaymentError::InvalidReference {
            reference: reference.to_string(),
        })
    }
}

/// Luhn check digit for a payload of ascii digits
fn luhn_check_digit(payload: &str) -> u32 {
    let sum = luhn_sum(payload);
    (10 - sum % 10) % 10
}

/// Luhn validation over digits whose last character is the check digit
fn luhn_valid(digits: &str) -> bool {
    let (payload, check) = digits.split_at(digits.len() - 1);
    match check.chars().next().and_then(|c| c.to_digit(10)) {
        Some(check) => luhn_check_digit(payload) == check,
        None => false,
    }
}

/// sum over the payload with every second digit doubled, walking right to
/// left from where the check digit will sit
fn luhn_sum(payload: &str) -> u32 {
    payload
        .chars()
        .rev()
        .enumerate()
        .filter_map(|(index, c)| c.to_digit(10).map(|d| (index, d)))
        .map(|(index, digit)| {
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2021, 3, 15, 10, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_generated_reference_is_valid() {
        let time = test_time();
        let reference = ReferenceGenerator::next_payment_reference(&time);
        assert!(reference.starts_with("RC-"));
        assert_eq!(reference.len(), "RC-1519-9028-1909-3890".len());
        assert!(is_valid_reference(&reference));
    }

    #[test]
    fn test_corrupting_any_digit_fails_validation() {
        let time = test_time();
        let reference = ReferenceGenerator::next_payment_reference(&time);

        for (position, c) in reference.char_indices() {
            let Some(digit) = c.to_digit(10) else { continue };
            let corrupted_digit = char::from_digit((digit + 1) % 10, 10).unwrap();
            let mut corrupted: Vec<char> = reference.chars().collect();
            corrupted[position] = corrupted_digit;
            let corrupted: String = corrupted.into_iter().collect();
            assert!(
                !is_valid_reference(&corrupted),
                "corruption at {position} slipped through: {corrupted}"
            );
        }
    }

    #[test]
    fn test_known_luhn_sequence() {
        // canonical Luhn example: 7992739871 has check digit 3
        assert_eq!(luhn_check_digit("7992739871"), 3);
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid("79927398710"));
    }

    #[test]
    fn test_malformed_references_rejected() {
        assert!(!is_valid_reference("RC-1234"));
        assert!(!is_valid_reference("no digits here"));
        assert!(!is_valid_reference(""));
        assert!(!is_valid_reference("RC-1519-9028-1909-38XX"));
    }

    #[test]
    fn test_require_valid_reference_error() {
        assert!(matches!(
            require_valid_reference("RC-0000"),
            Err(PaymentError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_custom_prefix() {
        let time = test_time();
        let reference = ReferenceGenerator::next("MOJ", &time);
        assert!(reference.starts_with("MOJ-"));
        assert!(is_valid_reference(&reference));
    }
}
