//! Parser for questions pasted as text or uploaded as a `.txt` file.
//!
//! Accepted layouts:
//!
//! ```text
//! 1. Qaysi shahar poytaxt? A) Samarqand B) Toshkent C) Buxoro D) Xiva Javob: B
//!
//! 2. Kitob muallifi kim?
//! A) Navoiy
//! B. Qodiriy
//! C: Cho'lpon
//! Javob: a
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::models::{AgeGroup, NewQuestion, MAX_OPTIONS, MIN_OPTIONS};
use crate::error::ValidationError;

pub const MAX_FILE_BYTES: u32 = 20 * 1024 * 1024;

static INLINE_OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([A-Da-d])\)[ \t]+").expect("inline option regex"));
static INLINE_ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[ \t]+(javob|answer|ответ)[ \t]*[:=]").expect("inline answer regex")
});
static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:savol\s*)?\d+\s*[.):]\s*(.*)$").expect("numbered regex"));
static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Da-d])\s*[).:]\s*(.+)$").expect("option regex"));
static ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:javob|answer|ответ)\s*[:=]?\s*([a-d])\b").expect("answer regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

impl ParsedQuestion {
    pub fn into_new(self, age_group: AgeGroup) -> Result<NewQuestion, ValidationError> {
        NewQuestion::new(self.text, self.options, self.correct_option, age_group)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub questions: Vec<ParsedQuestion>,
    /// Blocks that looked like questions but were incomplete.
    pub failed: usize,
}

#[derive(Default)]
struct Draft {
    text: String,
    options: Vec<String>,
    broken: bool,
}

impl Draft {
    fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_owned(),
            ..Default::default()
        }
    }
}

fn letter_index(letter: &str) -> usize {
    match letter.to_ascii_lowercase().as_str() {
        "a" => 0,
        "b" => 1,
        "c" => 2,
        _ => 3,
    }
}

pub fn parse_questions(input: &str) -> ImportReport {
    let normalized = INLINE_OPTION_RE.replace_all(input, "\n$1) ");
    let normalized = INLINE_ANSWER_RE.replace_all(&normalized, "\n$1:");

    let mut report = ImportReport::default();
    let mut current: Option<Draft> = None;

    for line in normalized.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = ANSWER_RE.captures(line) {
            match current.take() {
                Some(draft) => finalize(&mut report, draft, Some(letter_index(&caps[1]))),
                None => report.failed += 1,
            }
            continue;
        }

        if let Some(caps) = OPTION_RE.captures(line) {
            if let Some(draft) = current.as_mut() {
                if letter_index(&caps[1]) != draft.options.len() {
                    draft.broken = true;
                }
                draft.options.push(caps[2].trim().to_owned());
                continue;
            }
        }

        if let Some(caps) = NUMBERED_RE.captures(line) {
            if let Some(draft) = current.take() {
                finalize(&mut report, draft, None);
            }
            current = Some(Draft::new(&caps[1]));
            continue;
        }

        match current.as_mut() {
            Some(draft) if draft.options.is_empty() => {
                if !draft.text.is_empty() {
                    draft.text.push(' ');
                }
                draft.text.push_str(line);
            }
            Some(_) => {
                if let Some(draft) = current.take() {
                    finalize(&mut report, draft, None);
                }
                current = Some(Draft::new(line));
            }
            None => current = Some(Draft::new(line)),
        }
    }

    if let Some(draft) = current.take() {
        finalize(&mut report, draft, None);
    }

    report
}

fn finalize(report: &mut ImportReport, draft: Draft, answer: Option<usize>) {
    let complete = !draft.broken
        && !draft.text.is_empty()
        && (MIN_OPTIONS..=MAX_OPTIONS).contains(&draft.options.len());

    match answer {
        Some(correct_option) if complete && correct_option < draft.options.len() => {
            report.questions.push(ParsedQuestion {
                text: draft.text,
                options: draft.options,
                correct_option,
            })
        }
        _ => report.failed += 1,
    }
}

/// Only plain text files are accepted for upload.
pub fn is_supported_file(file_name: Option<&str>) -> bool {
    file_name.is_some_and(|name| name.to_lowercase().ends_with(".txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inline_question() {
        let report =
            parse_questions("1. Qaysi shahar poytaxt? A) Samarqand B) Toshkent C) Buxoro D) Xiva Javob: B");

        assert_eq!(report.failed, 0);
        assert_eq!(
            report.questions,
            vec![ParsedQuestion {
                text: "Qaysi shahar poytaxt?".into(),
                options: vec!["Samarqand".into(), "Toshkent".into(), "Buxoro".into(), "Xiva".into()],
                correct_option: 1,
            }]
        );
    }

    #[test]
    fn parses_line_layout_with_mixed_markers() {
        let text = "2. Kitob muallifi kim?\nA) Navoiy\nB. Qodiriy\nC: Cho'lpon\njavob: a\n\n\
                    3. Ikkinchi savol matni\nA) ha\nB) yo'q\nAnswer: b\n";
        let report = parse_questions(text);

        assert_eq!(report.failed, 0);
        assert_eq!(report.questions.len(), 2);
        assert_eq!(report.questions[0].options.len(), 3);
        assert_eq!(report.questions[0].correct_option, 0);
        assert_eq!(report.questions[1].correct_option, 1);
    }

    #[test]
    fn unnumbered_blocks_are_split_by_content() {
        let text = "Birinchi savol?\nA) bir\nB) ikki\nJavob: A\n\nIkkinchi savol?\nA) uch\nB) to'rt\nJavob: B";
        let report = parse_questions(text);
        assert_eq!(report.questions.len(), 2);
        assert_eq!(report.questions[1].text, "Ikkinchi savol?");
    }

    #[test]
    fn incomplete_blocks_are_counted_as_failed() {
        let text = "1. Javobsiz savol\nA) bir\nB) ikki\n\n\
                    2. Javobi yo'q variant\nA) bir\nB) ikki\nJavob: D\n\n\
                    3. Yaxshi savol\nA) bir\nB) ikki\nJavob: A";
        let report = parse_questions(text);

        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "Yaxshi savol");
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn parsed_question_converts_to_new_question() {
        let report = parse_questions("1. Savol matni shu yerda? A) x B) y Javob: B");
        let question = report.questions[0]
            .clone()
            .into_new(AgeGroup::ElevenToFourteen)
            .unwrap();
        assert_eq!(question.correct_option(), 1);
        assert_eq!(question.age_group(), AgeGroup::ElevenToFourteen);
    }

    #[test]
    fn only_txt_uploads_are_supported() {
        assert!(is_supported_file(Some("savollar.TXT")));
        assert!(!is_supported_file(Some("savollar.docx")));
        assert!(!is_supported_file(None));
    }
}
