// ⌨️ Input Parsing - text fields to amounts
//
// Strict: the whole (trimmed) field must be a number. "12abc" is rejected
// rather than read as 12.

use crate::error::SavingsError;

/// Fixed-split deposit: any finite number greater than zero
pub fn parse_deposit(input: &str) -> Result<f64, SavingsError> {
    let trimmed = input.trim();

    let value: f64 = trimmed
        .parse()
        .map_err(|_| SavingsError::invalid_amount(input))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SavingsError::invalid_amount(input));
    }

    Ok(value)
}

/// Whole number >= 0 (goal amount edits)
pub fn parse_whole(input: &str) -> Result<u64, SavingsError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SavingsError::invalid_amount(input));
    }

    // Only overflow can fail here
    digits
        .parse::<u64>()
        .map_err(|_| SavingsError::invalid_amount(input))
}

/// Whole number > 0 (goal deposits)
pub fn parse_positive_whole(input: &str) -> Result<u64, SavingsError> {
    match parse_whole(input)? {
        0 => Err(SavingsError::invalid_amount(input)),
        n => Ok(n),
    }
}

/// Goal target: empty is a missing field, anything else must be a whole number > 0
pub fn parse_target(input: &str) -> Result<u64, SavingsError> {
    if input.trim().is_empty() {
        return Err(SavingsError::MissingRequiredField { field: "target" });
    }
    parse_positive_whole(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deposit() {
        assert_eq!(parse_deposit("50").unwrap(), 50.0);
        assert_eq!(parse_deposit(" 12.5 ").unwrap(), 12.5);

        for bad in ["", "   ", "-5", "0", "abc", "12abc", "NaN", "inf"] {
            assert_eq!(
                parse_deposit(bad),
                Err(SavingsError::invalid_amount(bad)),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_whole() {
        assert_eq!(parse_whole("0").unwrap(), 0);
        assert_eq!(parse_whole("+42").unwrap(), 42);
        assert_eq!(parse_whole(" 7 ").unwrap(), 7);

        assert!(parse_whole("-5").is_err());
        assert!(parse_whole("1.5").is_err());
        assert!(parse_whole("abc").is_err());
        assert!(parse_whole("").is_err());
        assert!(parse_whole("99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_positive_whole_rejects_zero() {
        assert_eq!(parse_positive_whole("10").unwrap(), 10);
        assert_eq!(parse_positive_whole("0"), Err(SavingsError::invalid_amount("0")));
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("500").unwrap(), 500);
        assert_eq!(
            parse_target("  "),
            Err(SavingsError::MissingRequiredField { field: "target" })
        );
        assert_eq!(parse_target("-5"), Err(SavingsError::invalid_amount("-5")));
    }
}
