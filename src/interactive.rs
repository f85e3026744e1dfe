//! Manual entry of the eleven feature values, bypassing extraction.

use crate::error::InputError;
use crate::features::{FEATURE_COUNT, Feature, FeatureKind, FeatureVector};
use std::io::{self, BufRead, Write};

fn prompt(feature: Feature) -> &'static str {
    match feature {
        Feature::ProfilePic => "Has Profile Picture (1 for Yes, 0 for No)",
        Feature::NumsLengthUsername => "Ratio of numbers to length of username (e.g., 0.33)",
        Feature::FullnameWords => "Number of words in full name (e.g., 2)",
        Feature::NumsLengthFullname => "Ratio of numbers to length of full name (e.g., 0.0)",
        Feature::NameEqualsUsername => "Is name similar to username (1 for Yes, 0 for No)",
        Feature::DescriptionLength => "Length of bio/description (e.g., 150)",
        Feature::ExternalUrl => "Has an external URL (1 for Yes, 0 for No)",
        Feature::Private => "Is the account private (1 for Yes, 0 for No)",
        Feature::Posts => "Number of posts",
        Feature::Followers => "Number of followers",
        Feature::Follows => "Number of following",
    }
}

/// Parses one answer: ratios accept decimals, every other slot must be an integer.
pub fn parse_value(feature: Feature, raw: &str) -> Result<f64, InputError> {
    let raw = raw.trim();
    let parsed = match feature.kind() {
        FeatureKind::Ratio => raw.parse::<f64>().ok().filter(|v| v.is_finite()),
        FeatureKind::Flag | FeatureKind::Count => raw.parse::<i64>().ok().map(|v| v as f64),
    };
    parsed.ok_or_else(|| InputError::InvalidValue {
        field: feature.name(),
        value: raw.to_string(),
        expected: match feature.kind() {
            FeatureKind::Ratio => "a decimal number",
            FeatureKind::Flag | FeatureKind::Count => "a whole number",
        },
    })
}

/// Prompts for every feature in order, re-asking until each answer parses.
pub fn read_features<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<FeatureVector, InputError> {
    writeln!(output, "\nPlease enter the following details for the account:").ok();
    writeln!(output, "----------------------------------------------------------").ok();

    let mut values = [0.0; FEATURE_COUNT];
    for feature in Feature::ALL {
        values[feature.index()] = loop {
            write!(output, "- {}: ", prompt(feature)).ok();
            output.flush().ok();

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => return Err(InputError::EndOfInput),
                Ok(_) => {}
            }
            match parse_value(feature, &line) {
                Ok(value) => break value,
                Err(_) => {
                    let kind = match feature.kind() {
                        FeatureKind::Ratio => "decimal number",
                        FeatureKind::Flag | FeatureKind::Count => "number",
                    };
                    writeln!(output, "  Invalid input. Please enter a valid {kind}.").ok();
                }
            }
        };
    }
    Ok(FeatureVector::new(values))
}

/// Reads features from the terminal.
pub fn read_features_from_stdin() -> Result<FeatureVector, InputError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    read_features(&mut input, &mut output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_all_values() {
        let answers = "1\n0.33\n2\n0.0\n0\n150\n1\n0\n12\n340\n200\n";
        let mut output = Vec::new();
        let features = read_features(&mut answers.as_bytes(), &mut output).unwrap();
        assert_eq!(
            features.as_array(),
            &[1.0, 0.33, 2.0, 0.0, 0.0, 150.0, 1.0, 0.0, 12.0, 340.0, 200.0]
        );
        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Number of following"));
        assert!(!transcript.contains("Invalid input"));
    }

    #[test]
    fn test_reprompts_on_bad_input() {
        let answers = "yes\n1.5\n1\nabc\n0.5\n2\n0\n0\n5\n0\n0\n3\n4\n5\n";
        let mut output = Vec::new();
        let features = read_features(&mut answers.as_bytes(), &mut output).unwrap();
        assert_eq!(features.get(Feature::ProfilePic), 1.0);
        assert_eq!(features.get(Feature::NumsLengthUsername), 0.5);
        assert_eq!(features.get(Feature::Follows), 5.0);
        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Please enter a valid number.").count(), 2);
        assert_eq!(transcript.matches("Please enter a valid decimal number.").count(), 1);
    }

    #[test]
    fn test_end_of_input() {
        let mut output = Vec::new();
        assert_eq!(
            read_features(&mut "1\n0.2\n".as_bytes(), &mut output),
            Err(InputError::EndOfInput)
        );
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(Feature::Posts, " 42 "), Ok(42.0));
        assert_eq!(parse_value(Feature::NumsLengthFullname, "0.25"), Ok(0.25));
        assert!(parse_value(Feature::Posts, "4.2").is_err());
        assert!(parse_value(Feature::NumsLengthFullname, "NaN").is_err());
    }
}
