//! Checks applied to free-text answers before they reach the store.

use crate::database::models::{AgeGroup, MAX_OPTIONS, MIN_OPTIONS};
use crate::error::ValidationError;

pub const MAX_INPUT_CHARS: usize = 500;
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 50;
pub const MIN_PLACE_CHARS: usize = 2;
pub const MIN_FEEDBACK_CHARS: usize = 10;
pub const MIN_QUESTION_CHARS: usize = 10;

const APOSTROPHES: [char; 4] = ['\'', 'ʻ', '’', '‘'];

/// Trims, collapses runs of whitespace, drops markup characters and caps the length.
pub fn sanitize_input(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"'))
        .take(MAX_INPUT_CHARS)
        .collect()
}

pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = sanitize_input(input);
    let len = name.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty("name"));
    }
    if len < MIN_NAME_CHARS {
        return Err(ValidationError::TooShort {
            field: "name",
            min: MIN_NAME_CHARS,
        });
    }
    if len > MAX_NAME_CHARS {
        return Err(ValidationError::TooLong {
            field: "name",
            max: MAX_NAME_CHARS,
        });
    }
    let allowed = |c: char| c.is_alphabetic() || c == ' ' || c == '-' || APOSTROPHES.contains(&c);
    if !name.chars().all(allowed) {
        return Err(ValidationError::InvalidName);
    }

    Ok(name)
}

pub fn validate_place(input: &str) -> Result<String, ValidationError> {
    let place = sanitize_input(input);
    if place.chars().count() < MIN_PLACE_CHARS {
        return Err(ValidationError::TooShort {
            field: "place",
            min: MIN_PLACE_CHARS,
        });
    }
    Ok(place)
}

pub fn validate_age(input: &str) -> Result<(u8, AgeGroup), ValidationError> {
    let age: u8 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAge)?;
    let group = AgeGroup::from_age(age).ok_or(ValidationError::InvalidAge)?;
    Ok((age, group))
}

/// Normalizes a Uzbek mobile number to `998XXXXXXXXX`.
pub fn normalize_phone(input: &str) -> Result<String, ValidationError> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let local = match digits.len() {
        12 if digits.starts_with("998") => &digits[3..],
        10 if digits.starts_with('8') => &digits[1..],
        9 => digits.as_str(),
        _ => return Err(ValidationError::InvalidPhone),
    };

    Ok(format!("998{local}"))
}

pub fn validate_feedback(input: &str) -> Result<String, ValidationError> {
    let text = input.trim();
    if text.chars().count() < MIN_FEEDBACK_CHARS {
        return Err(ValidationError::TooShort {
            field: "feedback",
            min: MIN_FEEDBACK_CHARS,
        });
    }
    Ok(text.to_owned())
}

pub fn validate_question_text(input: &str) -> Result<String, ValidationError> {
    let text = input.trim();
    if text.chars().count() < MIN_QUESTION_CHARS {
        return Err(ValidationError::TooShort {
            field: "question",
            min: MIN_QUESTION_CHARS,
        });
    }
    Ok(text.to_owned())
}

/// One option per line. Blank lines are ignored.
pub fn parse_options(input: &str) -> Result<Vec<String>, ValidationError> {
    let options: Vec<String> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();

    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
        return Err(ValidationError::OptionCount(options.len()));
    }
    Ok(options)
}

/// Parses a 1-based option number and returns the 0-based index.
pub fn parse_option_number(input: &str, option_count: usize) -> Result<usize, ValidationError> {
    let number: usize = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber)?;
    if number == 0 || number > option_count {
        return Err(ValidationError::CorrectOutOfRange {
            index: number,
            len: option_count,
        });
    }
    Ok(number - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_whitespace_and_strips_markup() {
        assert_eq!(sanitize_input("  Ali   <b>Valiyev</b> \n"), "Ali bValiyev/b");
        assert_eq!(sanitize_input(&"a".repeat(600)).len(), MAX_INPUT_CHARS);
    }

    #[test]
    fn names_accept_uzbek_spellings() {
        assert_eq!(validate_name("  Gʻulom  ").unwrap(), "Gʻulom");
        assert!(validate_name("O'tkir Hoshimov").is_ok());
        assert!(validate_name("Анна-Мария").is_ok());
    }

    #[test]
    fn names_reject_digits_and_bad_lengths() {
        assert_eq!(validate_name("R2D2"), Err(ValidationError::InvalidName));
        assert!(matches!(
            validate_name("A"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_name(&"a".repeat(51)),
            Err(ValidationError::TooLong { .. })
        ));
        assert_eq!(validate_name("   "), Err(ValidationError::Empty("name")));
    }

    #[test]
    fn age_maps_to_group() {
        assert_eq!(validate_age("7").unwrap(), (7, AgeGroup::SevenToTen));
        assert_eq!(validate_age(" 14 ").unwrap(), (14, AgeGroup::ElevenToFourteen));
        assert_eq!(validate_age("6"), Err(ValidationError::InvalidAge));
        assert_eq!(validate_age("15"), Err(ValidationError::InvalidAge));
        assert_eq!(validate_age("ten"), Err(ValidationError::InvalidAge));
    }

    #[test]
    fn phone_forms_normalize_to_international() {
        assert_eq!(normalize_phone("+998 90 123 45 67").unwrap(), "998901234567");
        assert_eq!(normalize_phone("998901234567").unwrap(), "998901234567");
        assert_eq!(normalize_phone("90-123-45-67").unwrap(), "998901234567");
        assert_eq!(normalize_phone("8901234567").unwrap(), "998901234567");
        assert_eq!(normalize_phone("12345"), Err(ValidationError::InvalidPhone));
        assert_eq!(
            normalize_phone("+7 901 234 56 78"),
            Err(ValidationError::InvalidPhone)
        );
    }

    #[test]
    fn feedback_needs_ten_characters() {
        assert!(validate_feedback("zo'r").is_err());
        assert_eq!(
            validate_feedback("  Juda yaxshi loyiha  ").unwrap(),
            "Juda yaxshi loyiha"
        );
    }

    #[test]
    fn options_are_one_per_line() {
        let options = parse_options("Toshkent\n\n Samarqand \nBuxoro").unwrap();
        assert_eq!(options, vec!["Toshkent", "Samarqand", "Buxoro"]);
        assert_eq!(parse_options("faqat bitta"), Err(ValidationError::OptionCount(1)));
        assert_eq!(parse_options("a\nb\nc\nd\ne"), Err(ValidationError::OptionCount(5)));
    }

    #[test]
    fn option_number_is_one_based() {
        assert_eq!(parse_option_number("1", 3).unwrap(), 0);
        assert_eq!(parse_option_number("3", 3).unwrap(), 2);
        assert!(parse_option_number("0", 3).is_err());
        assert!(parse_option_number("4", 3).is_err());
        assert_eq!(parse_option_number("x", 3), Err(ValidationError::NotANumber));
    }
}
