use std::fmt;

use thiserror::Error;

/// How raw input is reduced to digits before validation.
///
/// Two policies exist because users paste postal codes in both ASCII and
/// fullwidth forms ("１００-０００１"). `FoldFullwidth` converts fullwidth
/// digits to ASCII before stripping; `AsciiOnly` strips everything that is
/// not an ASCII digit, silently discarding fullwidth digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizePolicy {
    #[default]
    FoldFullwidth,
    AsciiOnly,
}

impl NormalizePolicy {
    /// Parse a policy selector as accepted by the CLI and server API
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fullwidth" => Some(Self::FoldFullwidth),
            "ascii" => Some(Self::AsciiOnly),
            _ => None,
        }
    }
}

/// Fold fullwidth digits (U+FF10..=U+FF19) to their ASCII equivalents,
/// leaving every other character untouched.
pub fn fold_fullwidth_digits(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Reduce raw input to ASCII digits under the given policy.
///
/// The blanket non-digit strip subsumes hyphen, space, and ideographic-space
/// separators, so "100-0001" and "１００　０００１" both normalize cleanly.
pub fn normalize(raw: &str, policy: NormalizePolicy) -> String {
    let folded;
    let source = match policy {
        NormalizePolicy::FoldFullwidth => {
            folded = fold_fullwidth_digits(raw);
            folded.as_str()
        }
        NormalizePolicy::AsciiOnly => raw,
    };
    source.chars().filter(char::is_ascii_digit).collect()
}

/// Validation failure: input did not normalize to exactly 7 digits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("postal code must be exactly 7 digits, got {got} after normalization")]
pub struct InvalidPostalCode {
    pub got: usize,
}

/// A validated 7-digit Japanese postal code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Normalize and validate raw user input.
    pub fn parse(raw: &str, policy: NormalizePolicy) -> Result<Self, InvalidPostalCode> {
        let digits = normalize(raw, policy);
        if digits.len() != 7 {
            return Err(InvalidPostalCode { got: digits.len() });
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
