use crate::{
    database::models::AgeGroup, question_import::ParsedQuestion, quiz::QuizSession,
};

/// Registration answers collected so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationDraft {
    pub child_name: String,
    pub parent_name: String,
    pub region: String,
    pub district: String,
    pub mahalla: String,
    pub age: u8,
    pub age_group: Option<AgeGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub age_group: AgeGroup,
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub enum BotState {
    #[default]
    Start,

    // PART FOR --- REGISTRATION ---
    ReceiveChildName {
        draft: RegistrationDraft,
    },
    ReceiveParentName {
        draft: RegistrationDraft,
    },
    ReceiveRegion {
        draft: RegistrationDraft,
    },
    ReceiveManualRegion {
        draft: RegistrationDraft,
    },
    ReceiveDistrict {
        draft: RegistrationDraft,
    },
    ReceiveManualDistrict {
        draft: RegistrationDraft,
    },
    ReceiveMahalla {
        draft: RegistrationDraft,
    },
    ReceiveAge {
        draft: RegistrationDraft,
    },
    ReceivePhone {
        draft: RegistrationDraft,
    },

    // PART FOR --- RUNNING QUIZ ---
    TakingQuiz {
        session: QuizSession,
    },

    ReceiveFeedback,

    // PART FOR --- ADMIN ---
    ReceiveBroadcast,
    ReceiveQuestionText {
        age_group: AgeGroup,
    },
    ReceiveQuestionOptions {
        question_draft: QuestionDraft,
    },
    ReceiveCorrectOption {
        question_draft: QuestionDraft,
    },
    ReceiveBulkQuestions {
        age_group: AgeGroup,
    },
    ReceiveQuestionFile,
    ReceiveFileAgeGroup {
        parsed: Vec<ParsedQuestion>,
    },
    ReceiveDeleteQuestion {
        age_group: AgeGroup,
    },
    ReceiveNewAdmin,
    ReceiveRemoveAdmin,
}
