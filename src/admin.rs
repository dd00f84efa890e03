use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use teloxide::{
    dispatching::dialogue::GetChatId,
    net::Download,
    payloads::{AnswerCallbackQuerySetters, SendDocumentSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, InputFile, Message, ParseMode, ReplyMarkup},
    utils::html::escape,
    Bot,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    broadcast::{audience, deliver},
    callback::{CallbackAction, QuestionAction},
    config::Config,
    database::{
        models::{Admin, AdminRole, AgeGroup, BroadcastRecord, NewQuestion, Question},
        repository::{QuestionRepository, Storage},
    },
    error::StoreResult,
    export::{export, export_file_name},
    keyboard::{
        admin_keyboard, admin_management_keyboard, confirm_clear_keyboard,
        confirm_delete_user_keyboard, export_keyboard, file_age_keyboard, main_keyboard,
        option_letter, question_age_keyboard, question_management_keyboard, user_card_keyboard,
        ADMIN_BROADCAST, ADMIN_EXPORT, ADMIN_MANAGE, ADMIN_QUESTIONS, ADMIN_STATS, ADMIN_USERS,
        BACK_TO_USER,
    },
    question_import::{is_supported_file, parse_questions, ParsedQuestion, MAX_FILE_BYTES},
    registration::profile_text,
    state::{BotState, QuestionDraft},
    stats::{
        best_results, render_statistics, render_users_overview, split_message, Statistics,
        MESSAGE_LIMIT,
    },
    validation::{parse_option_number, parse_options, validate_question_text},
    HandlerResult, UserDialogue,
};

const QUESTION_PREVIEW: usize = 5;
const PREVIEW_TEXT_CHARS: usize = 300;
const PREVIEW_OPTION_CHARS: usize = 100;
const DELETE_LIST_LIMIT: usize = 50;
const DELETE_TEXT_CHARS: usize = 60;

pub(crate) async fn is_admin<S: Storage>(
    config: &Config,
    storage: &S,
    user_id: i64,
) -> StoreResult<bool> {
    if config.is_static_admin(user_id) {
        return Ok(true);
    }
    Ok(storage.get_admin(user_id).await?.is_some())
}

pub(crate) async fn is_super_admin<S: Storage>(
    config: &Config,
    storage: &S,
    user_id: i64,
) -> StoreResult<bool> {
    if user_id == config.super_admin_id {
        return Ok(true);
    }
    Ok(storage
        .get_admin(user_id)
        .await?
        .is_some_and(|admin| admin.role == AdminRole::SuperAdmin))
}

/// Every admin id known from configuration and storage, deduplicated.
pub(crate) async fn admin_ids<S: Storage>(config: &Config, storage: &S) -> StoreResult<Vec<i64>> {
    let mut ids = vec![config.super_admin_id];
    ids.extend(&config.admin_ids);
    ids.extend(storage.list_admins().await?.iter().map(|a| a.user_id));
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Sends an HTML notice to every admin. Failures are logged only.
pub(crate) async fn notify_admins<S: Storage>(bot: &Bot, storage: &S, config: &Config, text: &str) {
    let ids = match admin_ids(config, storage).await {
        Ok(ids) => ids,
        Err(e) => {
            log::error!("Failed to load admins for notification: {}", e);
            vec![config.super_admin_id]
        }
    };

    for id in ids {
        if let Err(e) = bot
            .send_message(ChatId(id), text)
            .parse_mode(ParseMode::Html)
            .await
        {
            log::warn!("Failed to notify admin {}: {}", id, e);
        }
    }
}

#[instrument(level = "info", skip(bot, storage, config))]
pub(crate) async fn show_admin_menu<S: Storage>(
    bot: Bot,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let user_id = msg.chat.id.0;
    if !is_admin(&config, storage.as_ref(), user_id).await? {
        log::warn!("{} tried to open the admin panel", user_id);
        bot.send_message(msg.chat.id, "⛔ Sizda admin huquqlari yo'q.")
            .await?;
        return Ok(());
    }

    let super_admin = is_super_admin(&config, storage.as_ref(), user_id).await?;
    bot.send_message(msg.chat.id, "🔧 Admin paneli:")
        .reply_markup(admin_keyboard(super_admin))
        .await?;
    Ok(())
}

/// Admin keyboard buttons pressed from the idle state. The caller has checked the role.
#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn admin_menu<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let user_id = msg.chat.id.0;
    let super_admin = is_super_admin(&config, storage.as_ref(), user_id).await?;

    match msg.text() {
        Some(ADMIN_USERS) => {
            let users = storage.list_users().await?;
            let stats = Statistics::compute(&users, &[], BTreeMap::new());
            bot.send_message(msg.chat.id, render_users_overview(&stats, &users))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Some(ADMIN_STATS) => {
            let users = storage.list_users().await?;
            let results = storage.list_results().await?;
            let mut question_counts = BTreeMap::new();
            for group in AgeGroup::ALL {
                question_counts.insert(group, storage.questions_by_age(group).await?.len());
            }
            let stats = Statistics::compute(&users, &results, question_counts);
            for chunk in split_message(&render_statistics(&stats), MESSAGE_LIMIT) {
                bot.send_message(msg.chat.id, chunk)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
        }
        Some(ADMIN_QUESTIONS) => {
            let mut text = String::from("❓ <b>Savollarni boshqarish</b>\n\n");
            for group in AgeGroup::ALL {
                let n = storage.questions_by_age(group).await?.len();
                text.push_str(&format!("• {}: {} ta savol\n", group.label(), n));
            }
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(question_management_keyboard())
                .await?;
        }
        Some(ADMIN_BROADCAST) => {
            bot.send_message(
                msg.chat.id,
                "📢 Barcha foydalanuvchilarga yuboriladigan xabarni yozing (/cancel - bekor qilish):",
            )
            .reply_markup(ReplyMarkup::kb_remove())
            .await?;
            dialogue.update(BotState::ReceiveBroadcast).await?;
        }
        Some(ADMIN_EXPORT) => {
            bot.send_message(msg.chat.id, "📤 Eksport formatini tanlang:")
                .reply_markup(export_keyboard())
                .await?;
        }
        Some(ADMIN_MANAGE) if super_admin => {
            let mut text = String::from("👑 <b>Adminlar</b>\n\n");
            text.push_str(&format!(
                "• <code>{}</code> (super admin, sozlamalardan)\n",
                config.super_admin_id
            ));
            for id in &config.admin_ids {
                text.push_str(&format!("• <code>{id}</code> (sozlamalardan)\n"));
            }
            for admin in storage.list_admins().await? {
                if admin.user_id == config.super_admin_id {
                    continue;
                }
                text.push_str(&format!(
                    "• <code>{}</code> ({})\n",
                    admin.user_id,
                    admin.role.as_str()
                ));
            }
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(admin_management_keyboard())
                .await?;
        }
        Some(BACK_TO_USER) => {
            bot.send_message(msg.chat.id, "👤 Oddiy foydalanuvchi rejimi.")
                .reply_markup(main_keyboard(true))
                .await?;
        }
        other => {
            log::info!("{}: unknown admin input {:?}", user_id, other);
            bot.send_message(msg.chat.id, "Iltimos, menyudagi tugmalardan foydalaning.")
                .reply_markup(main_keyboard(true))
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_broadcast<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(text) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        bot.send_message(msg.chat.id, "Iltimos, xabar matnini yuboring.")
            .await?;
        return Ok(());
    };
    let text = text.to_owned();
    dialogue.update(BotState::Start).await?;

    let users = storage.list_users().await?;
    let bot_users = storage.list_bot_users().await?;
    let recipients = audience(&users, &bot_users);
    log::info!(
        "{} broadcasts to {} recipients",
        msg.chat.id,
        recipients.len()
    );
    bot.send_message(
        msg.chat.id,
        format!("⏳ {} ta foydalanuvchiga yuborilmoqda...", recipients.len()),
    )
    .await?;

    let report = deliver(&recipients, config.broadcast_delay, |id| {
        let bot = bot.clone();
        let text = text.clone();
        async move { bot.send_message(ChatId(id), text).await.map(|_| ()) }
    })
    .await;

    let record = BroadcastRecord {
        id: Uuid::new_v4(),
        admin_id: msg.chat.id.0,
        text,
        sent: report.sent,
        failed: report.failed,
        created_at: Utc::now(),
    };
    if let Err(e) = storage.save_broadcast(record).await {
        log::error!("Failed to save broadcast record: {}", e);
    }

    let super_admin = is_super_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    bot.send_message(
        msg.chat.id,
        format!(
            "✅ Xabar yuborildi.\n\n📨 Yuborildi: {}\n❌ Xatolik: {}",
            report.sent, report.failed
        ),
    )
    .reply_markup(admin_keyboard(super_admin))
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_question_text(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    age_group: AgeGroup,
) -> HandlerResult {
    match msg.text().map(validate_question_text) {
        Some(Ok(text)) => {
            bot.send_message(
                msg.chat.id,
                "📝 Javob variantlarini har birini yangi qatordan yozing (2-4 ta):",
            )
            .await?;
            dialogue
                .update(BotState::ReceiveQuestionOptions {
                    question_draft: QuestionDraft {
                        age_group,
                        text,
                        options: Vec::new(),
                    },
                })
                .await?;
        }
        _ => {
            bot.send_message(
                msg.chat.id,
                "❌ Savol matni kamida 10 ta belgidan iborat bo'lishi kerak.",
            )
            .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_question_options(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut question_draft: QuestionDraft,
) -> HandlerResult {
    match msg.text().map(parse_options) {
        Some(Ok(options)) => {
            let listing: String = options
                .iter()
                .enumerate()
                .map(|(i, option)| format!("{}. {}\n", i + 1, escape(option)))
                .collect();
            bot.send_message(
                msg.chat.id,
                format!("{listing}\n✅ To'g'ri javob raqamini yuboring (1-{}):", options.len()),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            question_draft.options = options;
            dialogue
                .update(BotState::ReceiveCorrectOption { question_draft })
                .await?;
        }
        _ => {
            bot.send_message(
                msg.chat.id,
                "❌ 2 tadan 4 tagacha variant kiriting, har birini yangi qatordan.",
            )
            .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_correct_option<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    question_draft: QuestionDraft,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let correct = match msg
        .text()
        .map(|t| parse_option_number(t, question_draft.options.len()))
    {
        Some(Ok(correct)) => correct,
        _ => {
            bot.send_message(
                msg.chat.id,
                format!("❌ 1 dan {} gacha raqam kiriting.", question_draft.options.len()),
            )
            .await?;
            return Ok(());
        }
    };

    let question = NewQuestion::new(
        question_draft.text,
        question_draft.options,
        correct,
        question_draft.age_group,
    )?;
    let question = storage.add_question(question).await?;
    log::info!(
        "{} added question {} for {}",
        msg.chat.id,
        question.id,
        question.age_group
    );

    let super_admin = is_super_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    bot.send_message(
        msg.chat.id,
        format!(
            "✅ Savol qo'shildi ({}).\nTo'g'ri javob: {}",
            question.age_group.label(),
            question.correct_text()
        ),
    )
    .reply_markup(admin_keyboard(super_admin))
    .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

/// Outcome of storing a batch of parsed questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ImportOutcome {
    added: usize,
    /// Failed validation.
    rejected: usize,
    /// Valid, but the store refused them.
    unsaved: usize,
}

impl ImportOutcome {
    fn report(&self, age_group: AgeGroup, parse_failed: usize) -> String {
        let mut text = format!(
            "✅ {} ta savol qo'shildi ({}).\n❌ Xato: {}",
            self.added,
            age_group.label(),
            parse_failed + self.rejected
        );
        if self.unsaved > 0 {
            text.push_str(&format!(
                "\n⚠️ Saqlashda xatolik: {} ta savol saqlanmadi.",
                self.unsaved
            ));
        }
        text
    }
}

/// Stores every valid question. Storage errors are logged and counted, so the
/// admin always learns how many questions were saved.
async fn store_questions<S: QuestionRepository>(
    storage: &S,
    parsed: Vec<ParsedQuestion>,
    age_group: AgeGroup,
) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for question in parsed {
        match question.into_new(age_group) {
            Ok(question) => match storage.add_question(question).await {
                Ok(_) => outcome.added += 1,
                Err(e) => {
                    log::error!("Failed to store imported question: {}", e);
                    outcome.unsaved += 1;
                }
            },
            Err(e) => {
                log::info!("Rejected imported question: {}", e);
                outcome.rejected += 1;
            }
        }
    }
    outcome
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_bulk_questions<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    age_group: AgeGroup,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Iltimos, savollarni matn ko'rinishida yuboring.")
            .await?;
        return Ok(());
    };

    let report = parse_questions(text);
    if report.questions.is_empty() {
        bot.send_message(
            msg.chat.id,
            "❌ Birorta ham savol topilmadi. Namuna:\n\n\
             1. Savol matni? A) variant B) variant C) variant D) variant Javob: A",
        )
        .await?;
        return Ok(());
    }

    let outcome = store_questions(storage.as_ref(), report.questions, age_group).await;
    log::info!(
        "{} bulk-added {} questions for {}",
        msg.chat.id,
        outcome.added,
        age_group
    );
    dialogue.update(BotState::Start).await?;

    let super_admin = is_super_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    bot.send_message(msg.chat.id, outcome.report(age_group, report.failed))
        .reply_markup(admin_keyboard(super_admin))
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_question_file(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
) -> HandlerResult {
    let Some(doc) = msg.document() else {
        bot.send_message(msg.chat.id, "📁 Iltimos, .txt faylini yuboring.")
            .await?;
        return Ok(());
    };
    if !is_supported_file(doc.file_name.as_deref()) {
        bot.send_message(msg.chat.id, "❌ Faqat .txt fayllar qabul qilinadi.")
            .await?;
        return Ok(());
    }
    if doc.file.size > MAX_FILE_BYTES {
        bot.send_message(msg.chat.id, "❌ Fayl hajmi 20 MB dan oshmasligi kerak.")
            .await?;
        return Ok(());
    }

    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;
    let report = parse_questions(&String::from_utf8_lossy(&bytes));
    log::info!(
        "{} uploaded {:?}: {} questions, {} failed",
        msg.chat.id,
        doc.file_name,
        report.questions.len(),
        report.failed
    );

    if report.questions.is_empty() {
        bot.send_message(msg.chat.id, "❌ Faylda birorta ham savol topilmadi.")
            .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "📄 {} ta savol topildi ({} ta xato). Qaysi yosh guruhiga qo'shilsin?",
            report.questions.len(),
            report.failed
        ),
    )
    .reply_markup(file_age_keyboard())
    .await?;
    dialogue
        .update(BotState::ReceiveFileAgeGroup {
            parsed: report.questions,
        })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_delete_question<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    age_group: AgeGroup,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let questions = storage.questions_by_age(age_group).await?;
    let index = match msg.text().map(|t| parse_option_number(t, questions.len())) {
        Some(Ok(index)) => index,
        _ => {
            bot.send_message(
                msg.chat.id,
                format!("❌ 1 dan {} gacha raqam kiriting.", questions.len()),
            )
            .await?;
            return Ok(());
        }
    };

    let question = &questions[index];
    let deleted = storage.delete_question(question.id).await?;
    log::info!(
        "{} deleted question {} ({})",
        msg.chat.id,
        question.id,
        deleted
    );

    let super_admin = is_super_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    let text = if deleted {
        format!("🗑 Savol o'chirildi: {}", question.text)
    } else {
        "Savol topilmadi.".to_owned()
    };
    bot.send_message(msg.chat.id, text)
        .reply_markup(admin_keyboard(super_admin))
        .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

fn parse_new_admin(input: &str) -> Option<(i64, AdminRole)> {
    let mut parts = input.split_whitespace();
    let id = parts.next()?.parse().ok()?;
    let role = match parts.next() {
        None => AdminRole::Admin,
        Some(word) if word.eq_ignore_ascii_case("super") => AdminRole::SuperAdmin,
        Some(_) => return None,
    };
    parts.next().is_none().then_some((id, role))
}

#[instrument(level = "info", skip(bot, dialogue, storage))]
pub(crate) async fn receive_new_admin<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
) -> HandlerResult {
    let Some((user_id, role)) = msg.text().and_then(parse_new_admin) else {
        bot.send_message(
            msg.chat.id,
            "❌ Format: <code>ID</code> yoki <code>ID super</code>",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    };

    storage
        .add_admin(Admin {
            user_id,
            role,
            added_by: Some(msg.chat.id.0),
            added_at: Utc::now(),
        })
        .await?;
    log::info!("{} added admin {} as {}", msg.chat.id, user_id, role.as_str());

    bot.send_message(
        msg.chat.id,
        format!("✅ {} admin qilib tayinlandi ({}).", user_id, role.as_str()),
    )
    .reply_markup(admin_keyboard(true))
    .await?;
    dialogue.update(BotState::Start).await?;

    if let Err(e) = bot
        .send_message(ChatId(user_id), "🎉 Sizga admin huquqlari berildi. /admin")
        .await
    {
        log::warn!("Failed to notify new admin {}: {}", user_id, e);
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_remove_admin<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(user_id) = msg.text().and_then(|t| t.trim().parse::<i64>().ok()) else {
        bot.send_message(msg.chat.id, "❌ Admin ID raqamini yuboring.")
            .await?;
        return Ok(());
    };

    let text = if user_id == config.super_admin_id {
        "⛔ Asosiy super adminni olib tashlab bo'lmaydi.".to_owned()
    } else if storage.remove_admin(user_id).await? {
        log::info!("{} removed admin {}", msg.chat.id, user_id);
        format!("✅ {user_id} adminlar ro'yxatidan olib tashlandi.")
    } else if config.admin_ids.contains(&user_id) {
        format!("ℹ️ {user_id} sozlamalarda (ADMIN_IDS) ko'rsatilgan.")
    } else {
        format!("ℹ️ {user_id} admin emas.")
    };

    bot.send_message(msg.chat.id, text)
        .reply_markup(admin_keyboard(true))
        .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

async fn user_card_text<S: Storage>(storage: &S, user_id: i64) -> StoreResult<Option<String>> {
    let Some(user) = storage.get_user(user_id).await? else {
        return Ok(None);
    };
    let results = storage.results_for_user(user_id).await?;
    let best = best_results(&results)
        .get(&user_id)
        .map(|r| format!("{:.0}%", r.percentage))
        .unwrap_or_else(|| "-".to_owned());

    Ok(Some(format!(
        "🆔 <code>{}</code>\n{}\n\n📝 Testlar: {}\n🏆 Eng yaxshi natija: {}",
        user.user_id,
        profile_text(&user),
        results.len(),
        best
    )))
}

#[instrument(level = "info", skip(bot, storage, config))]
pub(crate) async fn user_card<S: Storage>(
    bot: Bot,
    msg: Message,
    user_id: i64,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    if !is_admin(&config, storage.as_ref(), msg.chat.id.0).await? {
        bot.send_message(msg.chat.id, "⛔ Sizda admin huquqlari yo'q.")
            .await?;
        return Ok(());
    }

    match user_card_text(storage.as_ref(), user_id).await? {
        Some(text) => {
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(user_card_keyboard(user_id))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, format!("❌ {user_id} ro'yxatdan o'tmagan."))
                .await?;
        }
    }
    Ok(())
}

/// Inline actions from the admin tools. The caller has checked the role.
#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn handle_callback<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    action: CallbackAction,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(chat_id) = q.chat_id() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let admin_id = q.from.id.0 as i64;

    match action {
        CallbackAction::Questions(action) => {
            bot.answer_callback_query(q.id.clone()).await?;
            bot.send_message(chat_id, "👥 Yosh guruhini tanlang:")
                .reply_markup(question_age_keyboard(action))
                .await?;
        }
        CallbackAction::QuestionsFor(action, age_group) => {
            bot.answer_callback_query(q.id.clone()).await?;
            question_action(&bot, &dialogue, chat_id, action, age_group, storage.as_ref()).await?;
        }
        CallbackAction::UploadFile => {
            bot.answer_callback_query(q.id.clone()).await?;
            bot.send_message(
                chat_id,
                "📁 Savollar yozilgan .txt faylini yuboring (/cancel - bekor qilish).",
            )
            .reply_markup(ReplyMarkup::kb_remove())
            .await?;
            dialogue.update(BotState::ReceiveQuestionFile).await?;
        }
        CallbackAction::FileAgeGroup(age_group) => {
            bot.answer_callback_query(q.id.clone()).await?;
            let Some(BotState::ReceiveFileAgeGroup { parsed }) = dialogue.get().await? else {
                bot.send_message(chat_id, "ℹ️ Avval faylni yuboring.").await?;
                return Ok(());
            };
            let total = parsed.len();
            dialogue.update(BotState::Start).await?;
            let outcome = store_questions(storage.as_ref(), parsed, age_group).await;
            log::info!(
                "{} imported {} of {} questions from file",
                admin_id,
                outcome.added,
                total
            );

            let super_admin = is_super_admin(&config, storage.as_ref(), admin_id).await?;
            bot.send_message(chat_id, outcome.report(age_group, 0))
                .reply_markup(admin_keyboard(super_admin))
                .await?;
        }
        CallbackAction::ConfirmClear(age_group) => {
            let removed = storage.clear_questions(age_group).await?;
            log::warn!("{} cleared {} questions for {}", admin_id, removed, age_group);
            bot.answer_callback_query(q.id.clone()).await?;
            bot.send_message(
                chat_id,
                format!("🧹 {} ta savol o'chirildi ({}).", removed, age_group.label()),
            )
            .await?;
        }
        CallbackAction::CancelClear => {
            bot.answer_callback_query(q.id.clone())
                .text("Bekor qilindi.")
                .await?;
        }
        CallbackAction::Export(format) => {
            bot.answer_callback_query(q.id.clone())
                .text("⏳ Tayyorlanmoqda...")
                .await?;
            let users = storage.list_users().await?;
            let results = storage.list_results().await?;
            let count = users.len();
            let bytes =
                tokio::task::spawn_blocking(move || export(format, &users, &results)).await??;
            let name = export_file_name(format, Utc::now());
            log::info!("{} exported {} users as {}", admin_id, count, name);

            bot.send_document(chat_id, InputFile::memory(bytes).file_name(name))
                .caption(format!("📤 {count} ta foydalanuvchi"))
                .await?;
        }
        CallbackAction::AddAdmin | CallbackAction::RemoveAdmin => {
            if !is_super_admin(&config, storage.as_ref(), admin_id).await? {
                bot.answer_callback_query(q.id.clone())
                    .text("⛔ Faqat super admin uchun.")
                    .await?;
                return Ok(());
            }
            bot.answer_callback_query(q.id.clone()).await?;
            if action == CallbackAction::AddAdmin {
                bot.send_message(
                    chat_id,
                    "➕ Yangi admin ID raqamini yuboring. Super admin uchun: <code>ID super</code>",
                )
                .parse_mode(ParseMode::Html)
                .await?;
                dialogue.update(BotState::ReceiveNewAdmin).await?;
            } else {
                bot.send_message(chat_id, "➖ Olib tashlanadigan admin ID raqamini yuboring:")
                    .await?;
                dialogue.update(BotState::ReceiveRemoveAdmin).await?;
            }
        }
        CallbackAction::ToggleAgeGroup(user_id) => {
            let Some(user) = storage.get_user(user_id).await? else {
                bot.answer_callback_query(q.id.clone())
                    .text("Foydalanuvchi topilmadi.")
                    .await?;
                return Ok(());
            };
            let age_group = user.age_group.other();
            storage.set_age_group(user_id, age_group).await?;
            log::info!("{} moved user {} to {}", admin_id, user_id, age_group);
            bot.answer_callback_query(q.id.clone())
                .text(format!("Yangi guruh: {}", age_group.label()))
                .await?;
            if let Some(text) = user_card_text(storage.as_ref(), user_id).await? {
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(user_card_keyboard(user_id))
                    .await?;
            }
        }
        CallbackAction::DeleteUser(user_id) => {
            bot.answer_callback_query(q.id.clone()).await?;
            bot.send_message(
                chat_id,
                format!("⚠️ {user_id} va uning barcha natijalari o'chirilsinmi?"),
            )
            .reply_markup(confirm_delete_user_keyboard(user_id))
            .await?;
        }
        CallbackAction::ConfirmDeleteUser(user_id) => {
            let deleted = storage.delete_user(user_id).await?;
            log::warn!("{} deleted user {} ({})", admin_id, user_id, deleted);
            bot.answer_callback_query(q.id.clone()).await?;
            let text = if deleted {
                format!("🗑 {user_id} o'chirildi.")
            } else {
                format!("ℹ️ {user_id} topilmadi.")
            };
            bot.send_message(chat_id, text).await?;
        }
        other => {
            log::warn!("Unexpected admin callback {:?}", other);
            bot.answer_callback_query(q.id.clone()).await?;
        }
    }

    Ok(())
}

fn shorten(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_owned(),
    }
}

/// The first few questions of a group with the correct option marked.
fn question_preview(questions: &[Question], age_group: AgeGroup) -> String {
    let mut text = format!(
        "👁 <b>{}</b>: jami {} ta savol\n\n",
        age_group.label(),
        questions.len()
    );
    for (i, question) in questions.iter().take(QUESTION_PREVIEW).enumerate() {
        text.push_str(&format!(
            "<b>{}.</b> {}\n",
            i + 1,
            escape(&shorten(&question.text, PREVIEW_TEXT_CHARS))
        ));
        for (j, option) in question.options.iter().enumerate() {
            let mark = if j == question.correct_option { " ✅" } else { "" };
            text.push_str(&format!(
                "   {}) {}{}\n",
                option_letter(j),
                escape(&shorten(option, PREVIEW_OPTION_CHARS)),
                mark
            ));
        }
        text.push('\n');
    }
    if questions.len() > QUESTION_PREVIEW {
        text.push_str(&format!("... va yana {} ta", questions.len() - QUESTION_PREVIEW));
    }
    text
}

async fn question_action<S: Storage>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    action: QuestionAction,
    age_group: AgeGroup,
    storage: &S,
) -> HandlerResult {
    match action {
        QuestionAction::Add => {
            bot.send_message(
                chat_id,
                format!("✍️ {} uchun savol matnini yozing:", age_group.label()),
            )
            .reply_markup(ReplyMarkup::kb_remove())
            .await?;
            dialogue
                .update(BotState::ReceiveQuestionText { age_group })
                .await?;
        }
        QuestionAction::Bulk => {
            bot.send_message(
                chat_id,
                "📋 Savollarni quyidagi formatda yuboring:\n\n\
                 1. Savol matni? A) variant B) variant C) variant D) variant Javob: A\n\n\
                 2. Keyingi savol?\nA) variant\nB) variant\nJavob: B",
            )
            .reply_markup(ReplyMarkup::kb_remove())
            .await?;
            dialogue
                .update(BotState::ReceiveBulkQuestions { age_group })
                .await?;
        }
        QuestionAction::View => {
            let questions = storage.questions_by_age(age_group).await?;
            if questions.is_empty() {
                bot.send_message(chat_id, format!("📭 {} uchun savollar yo'q.", age_group.label()))
                    .await?;
                return Ok(());
            }
            let text = question_preview(&questions, age_group);
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        QuestionAction::Delete => {
            let questions = storage.questions_by_age(age_group).await?;
            if questions.is_empty() {
                bot.send_message(chat_id, format!("📭 {} uchun savollar yo'q.", age_group.label()))
                    .await?;
                return Ok(());
            }
            let mut text = String::from("🗑 O'chiriladigan savol raqamini yuboring:\n\n");
            for (i, question) in questions.iter().take(DELETE_LIST_LIMIT).enumerate() {
                text.push_str(&format!(
                    "{}. {}\n",
                    i + 1,
                    escape(&shorten(&question.text, DELETE_TEXT_CHARS))
                ));
            }
            if questions.len() > DELETE_LIST_LIMIT {
                text.push_str(&format!("... jami {} ta", questions.len()));
            }
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            dialogue
                .update(BotState::ReceiveDeleteQuestion { age_group })
                .await?;
        }
        QuestionAction::Clear => {
            let n = storage.questions_by_age(age_group).await?.len();
            bot.send_message(
                chat_id,
                format!(
                    "⚠️ {} guruhidagi {} ta savolning barchasi o'chirilsinmi?",
                    age_group.label(),
                    n
                ),
            )
            .reply_markup(confirm_clear_keyboard(age_group))
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{error::StoreError, stats::MESSAGE_LIMIT};

    use super::*;

    /// Accepts `capacity` questions, then fails every write.
    struct FullStore {
        capacity: usize,
        stored: AtomicUsize,
    }

    impl QuestionRepository for FullStore {
        async fn add_question(&self, question: NewQuestion) -> StoreResult<Question> {
            if self.stored.fetch_add(1, Ordering::SeqCst) >= self.capacity {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            Ok(question.into_question(Uuid::new_v4(), Utc::now()))
        }

        async fn get_question(&self, _id: Uuid) -> StoreResult<Option<Question>> {
            Ok(None)
        }

        async fn questions_by_age(&self, _age_group: AgeGroup) -> StoreResult<Vec<Question>> {
            Ok(Vec::new())
        }

        async fn delete_question(&self, _id: Uuid) -> StoreResult<bool> {
            Ok(false)
        }

        async fn clear_questions(&self, _age_group: AgeGroup) -> StoreResult<u64> {
            Ok(0)
        }
    }

    fn parsed(text: &str, correct_option: usize) -> ParsedQuestion {
        ParsedQuestion {
            text: text.to_owned(),
            options: vec!["Ha".to_owned(), "Yo'q".to_owned()],
            correct_option,
        }
    }

    #[tokio::test]
    async fn import_counts_storage_failures() {
        let store = FullStore {
            capacity: 2,
            stored: AtomicUsize::new(0),
        };
        let batch = vec![
            parsed("Birinchi savol?", 0),
            parsed("Noto'g'ri javob raqami?", 5),
            parsed("Ikkinchi savol?", 1),
            parsed("Uchinchi savol?", 0),
            parsed("To'rtinchi savol?", 1),
        ];

        let outcome = store_questions(&store, batch, AgeGroup::SevenToTen).await;
        assert_eq!(
            outcome,
            ImportOutcome {
                added: 2,
                rejected: 1,
                unsaved: 2,
            }
        );

        let report = outcome.report(AgeGroup::SevenToTen, 3);
        assert!(report.contains("2 ta savol qo'shildi"));
        assert!(report.contains("Xato: 4"));
        assert!(report.contains("2 ta savol saqlanmadi"));
    }

    #[test]
    fn preview_of_long_questions_fits_one_message() {
        let questions: Vec<Question> = (0..8)
            .map(|_| {
                NewQuestion::new(
                    "Savol ".repeat(400),
                    vec!["variant ".repeat(100); 4],
                    2,
                    AgeGroup::ElevenToFourteen,
                )
                .unwrap()
                .into_question(Uuid::new_v4(), Utc::now())
            })
            .collect();

        let text = question_preview(&questions, AgeGroup::ElevenToFourteen);
        assert!(text.chars().count() <= MESSAGE_LIMIT, "{} chars", text.chars().count());
        assert!(text.contains("…"));
        assert!(text.contains("... va yana 3 ta"));
    }

    #[test]
    fn shorten_cuts_on_char_boundaries() {
        assert_eq!(shorten("Kitobxon", 20), "Kitobxon");
        assert_eq!(shorten("O‘zbekiston", 3), "O‘z…");
    }

    #[test]
    fn new_admin_input_formats() {
        assert_eq!(parse_new_admin("12345"), Some((12345, AdminRole::Admin)));
        assert_eq!(parse_new_admin(" 12345  SUPER "), Some((12345, AdminRole::SuperAdmin)));
        assert_eq!(parse_new_admin("12345 admin"), None);
        assert_eq!(parse_new_admin("abc"), None);
        assert_eq!(parse_new_admin("1 super extra"), None);
    }
}
