use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::{
    callback::{CallbackAction, QuestionAction},
    database::models::{AgeGroup, Question},
    export::ExportFormat,
    regions,
};

pub(crate) const REGISTER: &str = "📝 Ro'yxatdan o'tish";
pub(crate) const ABOUT: &str = "📚 Loyiha haqida";
pub(crate) const TAKE_TEST: &str = "📋 Test topshirish";
pub(crate) const FEEDBACK: &str = "💬 Fikr bildirish";
pub(crate) const MY_RESULTS: &str = "📊 Natijalarim";
pub(crate) const ADMIN_PANEL: &str = "🔧 Admin paneli";

pub(crate) const ADMIN_USERS: &str = "👥 Foydalanuvchilar ro'yxati";
pub(crate) const ADMIN_STATS: &str = "📊 Statistika";
pub(crate) const ADMIN_QUESTIONS: &str = "❓ Savollarni boshqarish";
pub(crate) const ADMIN_BROADCAST: &str = "📢 Xabar yuborish";
pub(crate) const ADMIN_EXPORT: &str = "📤 Ma'lumotlarni eksport qilish";
pub(crate) const ADMIN_MANAGE: &str = "👑 Adminlarni boshqarish";
pub(crate) const BACK_TO_USER: &str = "🔙 Oddiy foydalanuvchi rejimiga qaytish";

pub(crate) const BACK: &str = "🔙 Orqaga";

pub(crate) const MANUAL_ENTRY: &str = "📝 Qo'lda kiritish";
pub(crate) const SHARE_CONTACT: &str = "📱 Telefon raqamni yuborish";

fn callback(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.to_data())
}

fn with_back_row(mut keyboard: Vec<Vec<InlineKeyboardButton>>) -> InlineKeyboardMarkup {
    keyboard.push(vec![callback(BACK, CallbackAction::BackToMenu)]);
    InlineKeyboardMarkup::new(keyboard)
}

/// Lays `labels` out `per_row` buttons wide.
fn grid<'a>(labels: impl IntoIterator<Item = &'a str>, per_row: usize) -> Vec<Vec<KeyboardButton>> {
    let buttons: Vec<KeyboardButton> = labels.into_iter().map(KeyboardButton::new).collect();
    buttons.chunks(per_row).map(<[KeyboardButton]>::to_vec).collect()
}

pub(crate) fn main_keyboard(is_admin: bool) -> KeyboardMarkup {
    let mut keyboard = vec![
        vec![KeyboardButton::new(REGISTER), KeyboardButton::new(ABOUT)],
        vec![KeyboardButton::new(TAKE_TEST)],
        vec![KeyboardButton::new(FEEDBACK), KeyboardButton::new(MY_RESULTS)],
    ];

    if is_admin {
        keyboard.push(vec![KeyboardButton::new(ADMIN_PANEL)]);
    }

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn admin_keyboard(is_super_admin: bool) -> KeyboardMarkup {
    let mut keyboard = vec![
        vec![KeyboardButton::new(ADMIN_USERS), KeyboardButton::new(ADMIN_STATS)],
        vec![KeyboardButton::new(ADMIN_QUESTIONS), KeyboardButton::new(ADMIN_BROADCAST)],
        vec![KeyboardButton::new(ADMIN_EXPORT)],
    ];

    if is_super_admin {
        keyboard.push(vec![KeyboardButton::new(ADMIN_MANAGE)]);
    }
    keyboard.push(vec![KeyboardButton::new(BACK_TO_USER)]);

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn region_keyboard() -> KeyboardMarkup {
    let mut keyboard = grid(regions::region_names(), 2);
    keyboard.push(vec![KeyboardButton::new(MANUAL_ENTRY)]);

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn district_keyboard(region: &str) -> KeyboardMarkup {
    let mut keyboard = grid(regions::districts(region), 2);
    keyboard.push(vec![KeyboardButton::new(MANUAL_ENTRY)]);

    KeyboardMarkup::new(keyboard)
}

/// Known mahallas, if any. The user may also type one.
pub(crate) fn mahalla_keyboard(region: &str, district: &str) -> Option<KeyboardMarkup> {
    let mahallas = regions::mahallas(region, district);
    if mahallas.is_empty() {
        return None;
    }

    Some(KeyboardMarkup::new(grid(mahallas.iter().copied(), 2)))
}

pub(crate) fn age_keyboard() -> KeyboardMarkup {
    let ages: Vec<String> = (7..=14).map(|age: u8| age.to_string()).collect();

    KeyboardMarkup::new(grid(ages.iter().map(String::as_str), 4))
}

pub(crate) fn contact_keyboard() -> KeyboardMarkup {
    let keyboard = vec![vec![
        KeyboardButton::new(SHARE_CONTACT).request(ButtonRequest::Contact)
    ]];

    KeyboardMarkup::new(keyboard).one_time_keyboard()
}

pub(crate) fn reregister_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback(
        "🔄 Qayta ro'yxatdan o'tish",
        CallbackAction::Reregister,
    )]])
}

pub(crate) fn start_test_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback(
        "▶️ Testni boshlash",
        CallbackAction::StartTest,
    )]])
}

pub(crate) fn answers_keyboard(question: &Question, index: usize) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = question
        .options
        .iter()
        .enumerate()
        .map(|(option, text)| {
            vec![callback(
                format!("{}) {}", option_letter(option), text),
                CallbackAction::Answer { index, option },
            )]
        })
        .collect();
    keyboard.push(vec![callback("⏭ O'tkazib yuborish", CallbackAction::Skip { index })]);

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn option_letter(option: usize) -> char {
    (b'A' + option as u8) as char
}

pub(crate) fn question_management_keyboard() -> InlineKeyboardMarkup {
    let keyboard = vec![
        vec![
            callback("➕ Savol qo'shish", CallbackAction::Questions(QuestionAction::Add)),
            callback("📋 Ko'plab qo'shish", CallbackAction::Questions(QuestionAction::Bulk)),
        ],
        vec![
            callback("📁 Fayl yuklash", CallbackAction::UploadFile),
            callback("👁 Savollarni ko'rish", CallbackAction::Questions(QuestionAction::View)),
        ],
        vec![
            callback("🗑 Savolni o'chirish", CallbackAction::Questions(QuestionAction::Delete)),
            callback("🧹 Hammasini o'chirish", CallbackAction::Questions(QuestionAction::Clear)),
        ],
    ];

    with_back_row(keyboard)
}

pub(crate) fn question_age_keyboard(action: QuestionAction) -> InlineKeyboardMarkup {
    with_back_row(vec![AgeGroup::ALL
        .iter()
        .map(|group| callback(group.label(), CallbackAction::QuestionsFor(action, *group)))
        .collect::<Vec<_>>()])
}

pub(crate) fn file_age_keyboard() -> InlineKeyboardMarkup {
    with_back_row(vec![AgeGroup::ALL
        .iter()
        .map(|group| callback(group.label(), CallbackAction::FileAgeGroup(*group)))
        .collect::<Vec<_>>()])
}

pub(crate) fn confirm_clear_keyboard(age_group: AgeGroup) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        callback("✅ Ha, o'chirish", CallbackAction::ConfirmClear(age_group)),
        callback("❌ Bekor qilish", CallbackAction::CancelClear),
    ]])
}

pub(crate) fn export_keyboard() -> InlineKeyboardMarkup {
    with_back_row(vec![vec![
        callback("📊 Excel", CallbackAction::Export(ExportFormat::Xlsx)),
        callback("📄 PDF", CallbackAction::Export(ExportFormat::Pdf)),
    ]])
}

pub(crate) fn admin_management_keyboard() -> InlineKeyboardMarkup {
    with_back_row(vec![vec![
        callback("➕ Admin qo'shish", CallbackAction::AddAdmin),
        callback("➖ Adminni olib tashlash", CallbackAction::RemoveAdmin),
    ]])
}

pub(crate) fn user_card_keyboard(user_id: i64) -> InlineKeyboardMarkup {
    with_back_row(vec![vec![
        callback("🔁 Yosh guruhini almashtirish", CallbackAction::ToggleAgeGroup(user_id)),
        callback("🗑 O'chirish", CallbackAction::DeleteUser(user_id)),
    ]])
}

pub(crate) fn confirm_delete_user_keyboard(user_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![callback(
        "⚠️ Ha, o'chirilsin",
        CallbackAction::ConfirmDeleteUser(user_id),
    )]])
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[test]
    fn admin_button_only_for_admins() {
        let flat = |kb: KeyboardMarkup| -> Vec<String> {
            kb.keyboard.into_iter().flatten().map(|b| b.text).collect()
        };
        assert!(!flat(main_keyboard(false)).contains(&ADMIN_PANEL.to_owned()));
        assert!(flat(main_keyboard(true)).contains(&ADMIN_PANEL.to_owned()));
        assert!(!flat(admin_keyboard(false)).contains(&ADMIN_MANAGE.to_owned()));
    }

    #[test]
    fn region_keyboard_lists_regions_and_manual_entry() {
        let buttons: Vec<_> = region_keyboard().keyboard.into_iter().flatten().collect();
        assert_eq!(buttons.len(), 15);
        assert_eq!(buttons.last().map(|b| b.text.as_str()), Some(MANUAL_ENTRY));
    }

    #[test]
    fn admin_tools_offer_a_way_back() {
        let back = CallbackAction::BackToMenu.to_data();
        let last_row_is_back = |kb: InlineKeyboardMarkup| {
            kb.inline_keyboard.last().map(|row| {
                row.iter()
                    .map(|button| (button.text.clone(), button.kind.clone()))
                    .collect::<Vec<_>>()
            }) == Some(vec![(
                BACK.to_owned(),
                InlineKeyboardButtonKind::CallbackData(back.clone()),
            )])
        };

        assert!(last_row_is_back(question_management_keyboard()));
        assert!(last_row_is_back(question_age_keyboard(QuestionAction::View)));
        assert!(last_row_is_back(file_age_keyboard()));
        assert!(last_row_is_back(export_keyboard()));
        assert!(last_row_is_back(admin_management_keyboard()));
        assert!(last_row_is_back(user_card_keyboard(42)));
        assert!(!last_row_is_back(confirm_clear_keyboard(AgeGroup::SevenToTen)));
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
    }
}
