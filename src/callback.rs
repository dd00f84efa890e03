//! Inline keyboard payloads. Telegram limits callback data to 64 bytes.

use crate::database::models::AgeGroup;
use crate::export::ExportFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionAction {
    Add,
    Bulk,
    View,
    Delete,
    Clear,
}

impl QuestionAction {
    fn code(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Bulk => "bulk",
            Self::View => "view",
            Self::Delete => "del",
            Self::Clear => "clear",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "add" => Some(Self::Add),
            "bulk" => Some(Self::Bulk),
            "view" => Some(Self::View),
            "del" => Some(Self::Delete),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Drops whatever the user was doing and shows the main menu.
    BackToMenu,
    Reregister,
    StartTest,
    Answer { index: usize, option: usize },
    Skip { index: usize },
    /// Top-level question management button; asks for an age group next.
    Questions(QuestionAction),
    QuestionsFor(QuestionAction, AgeGroup),
    UploadFile,
    FileAgeGroup(AgeGroup),
    ConfirmClear(AgeGroup),
    CancelClear,
    Export(ExportFormat),
    AddAdmin,
    RemoveAdmin,
    ToggleAgeGroup(i64),
    DeleteUser(i64),
    ConfirmDeleteUser(i64),
}

impl CallbackAction {
    pub fn to_data(&self) -> String {
        match self {
            Self::BackToMenu => "menu:back".to_owned(),
            Self::Reregister => "reg:again".to_owned(),
            Self::StartTest => "test:start".to_owned(),
            Self::Answer { index, option } => format!("ans:{index}:{option}"),
            Self::Skip { index } => format!("skip:{index}"),
            Self::Questions(action) => format!("q:{}", action.code()),
            Self::QuestionsFor(action, group) => format!("qa:{}:{}", action.code(), group),
            Self::UploadFile => "q:file".to_owned(),
            Self::FileAgeGroup(group) => format!("fage:{group}"),
            Self::ConfirmClear(group) => format!("qclr:{group}"),
            Self::CancelClear => "qclr:no".to_owned(),
            Self::Export(format) => format!("exp:{}", format.extension()),
            Self::AddAdmin => "adm:add".to_owned(),
            Self::RemoveAdmin => "adm:rm".to_owned(),
            Self::ToggleAgeGroup(id) => format!("u:age:{id}"),
            Self::DeleteUser(id) => format!("u:del:{id}"),
            Self::ConfirmDeleteUser(id) => format!("u:delok:{id}"),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.split(':').collect();
        let action = match parts.as_slice() {
            ["menu", "back"] => Self::BackToMenu,
            ["reg", "again"] => Self::Reregister,
            ["test", "start"] => Self::StartTest,
            ["ans", index, option] => Self::Answer {
                index: index.parse().ok()?,
                option: option.parse().ok()?,
            },
            ["skip", index] => Self::Skip {
                index: index.parse().ok()?,
            },
            ["q", "file"] => Self::UploadFile,
            ["q", code] => Self::Questions(QuestionAction::from_code(code)?),
            ["qa", code, group] => {
                Self::QuestionsFor(QuestionAction::from_code(code)?, group.parse().ok()?)
            }
            ["fage", group] => Self::FileAgeGroup(group.parse().ok()?),
            ["qclr", "no"] => Self::CancelClear,
            ["qclr", group] => Self::ConfirmClear(group.parse().ok()?),
            ["exp", "xlsx"] => Self::Export(ExportFormat::Xlsx),
            ["exp", "pdf"] => Self::Export(ExportFormat::Pdf),
            ["adm", "add"] => Self::AddAdmin,
            ["adm", "rm"] => Self::RemoveAdmin,
            ["u", "age", id] => Self::ToggleAgeGroup(id.parse().ok()?),
            ["u", "del", id] => Self::DeleteUser(id.parse().ok()?),
            ["u", "delok", id] => Self::ConfirmDeleteUser(id.parse().ok()?),
            _ => return None,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_carry_question_index() {
        assert_eq!(
            CallbackAction::parse("ans:12:3"),
            Some(CallbackAction::Answer { index: 12, option: 3 })
        );
        assert_eq!(CallbackAction::parse("skip:0"), Some(CallbackAction::Skip { index: 0 }));
        assert_eq!(CallbackAction::parse("ans:x:3"), None);
    }

    #[test]
    fn back_to_menu_round_trips() {
        assert_eq!(CallbackAction::BackToMenu.to_data(), "menu:back");
        assert_eq!(CallbackAction::parse("menu:back"), Some(CallbackAction::BackToMenu));
        assert_eq!(CallbackAction::parse("menu:forward"), None);
    }

    #[test]
    fn age_groups_survive_the_colon_split() {
        let action = CallbackAction::QuestionsFor(QuestionAction::Delete, AgeGroup::ElevenToFourteen);
        assert_eq!(action.to_data(), "qa:del:11-14");
        assert_eq!(CallbackAction::parse("qa:del:11-14"), Some(action));
        assert_eq!(
            CallbackAction::parse("qclr:7-10"),
            Some(CallbackAction::ConfirmClear(AgeGroup::SevenToTen))
        );
        assert_eq!(CallbackAction::parse("qclr:no"), Some(CallbackAction::CancelClear));
    }

    #[test]
    fn user_actions_parse_negative_ids() {
        assert_eq!(
            CallbackAction::parse("u:age:-100200"),
            Some(CallbackAction::ToggleAgeGroup(-100200))
        );
    }

    #[test]
    fn every_action_fits_telegram_limit() {
        let actions = [
            CallbackAction::Reregister,
            CallbackAction::StartTest,
            CallbackAction::Answer { index: 24, option: 3 },
            CallbackAction::UploadFile,
            CallbackAction::Questions(QuestionAction::Clear),
            CallbackAction::FileAgeGroup(AgeGroup::SevenToTen),
            CallbackAction::Export(ExportFormat::Pdf),
            CallbackAction::AddAdmin,
            CallbackAction::RemoveAdmin,
            CallbackAction::ConfirmDeleteUser(i64::MIN),
        ];
        for action in actions {
            let data = action.to_data();
            assert!(data.len() <= 64, "{data}");
            assert_eq!(CallbackAction::parse(&data), Some(action));
        }
        assert_eq!(CallbackAction::parse("garbage"), None);
    }
}
