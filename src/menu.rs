use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, ParseMode, ReplyMarkup},
    Bot,
};
use tracing::instrument;

use crate::{
    admin::{self, is_admin, notify_admins},
    callback::CallbackAction,
    config::Config,
    database::{models::NewFeedback, repository::Storage},
    keyboard::{
        main_keyboard, reregister_keyboard, ABOUT, ADMIN_PANEL, FEEDBACK,
        MY_RESULTS, REGISTER, TAKE_TEST,
    },
    quiz::grade,
    registration::{begin_registration, profile_text},
    runner,
    state::BotState,
    stats::format_time,
    validation::validate_feedback,
    HandlerResult, UserDialogue,
};

const ABOUT_TEXT: &str = "📖 <b>Kitobxon Kids loyihasi haqida</b>\n\n\
🎯 Maqsad: bolalarning kitob o'qishga qiziqishini oshirish va bilim darajasini baholash.\n\n\
👥 Ishtirokchilar: 7-14 yoshdagi bolalar.\n\n\
📚 Test tizimi:\n\
• 7-10 va 11-14 yosh guruhlari uchun alohida savollar\n\
• Har bir testda {questions} ta savol\n\
• Har bir savol uchun {seconds} soniya vaqt\n\n\
🏆 Natijalar:\n\
• 80% va undan yuqori - A'lo\n\
• 60-79% - Yaxshi\n\
• 60% dan past - Qo'shimcha o'qish tavsiya etiladi";

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn main_menu<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let user_id = msg.chat.id.0;
    let admin = is_admin(&config, storage.as_ref(), user_id).await?;

    match msg.text() {
        Some(REGISTER) => match storage.get_user(user_id).await? {
            Some(user) => {
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "ℹ️ Siz allaqachon ro'yxatdan o'tgansiz.\n\n{}",
                        profile_text(&user)
                    ),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(reregister_keyboard())
                .await?;
            }
            None => {
                log::info!("{} starts registration", user_id);
                begin_registration(&bot, msg.chat.id, &dialogue).await?;
            }
        },
        Some(ABOUT) => {
            let text = ABOUT_TEXT
                .replace("{questions}", &config.questions_per_test.to_string())
                .replace(
                    "{seconds}",
                    &config.question_time_limit.as_secs().to_string(),
                );
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Some(TAKE_TEST) => {
            runner::offer_test(&bot, msg.chat.id, storage.as_ref(), &config).await?;
        }
        Some(FEEDBACK) => {
            if storage.get_user(user_id).await?.is_none() {
                send_register_first(&bot, msg.chat.id).await?;
            } else {
                bot.send_message(
                    msg.chat.id,
                    "💬 Fikr va takliflaringizni yozing (kamida 10 ta belgi):",
                )
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
                dialogue.update(BotState::ReceiveFeedback).await?;
            }
        }
        Some(MY_RESULTS) => {
            send_results(&bot, msg.chat.id, storage.as_ref()).await?;
        }
        Some(ADMIN_PANEL) => {
            admin::show_admin_menu(bot, msg, storage, config).await?;
        }
        Some(_) if admin => {
            admin::admin_menu(bot, dialogue, msg, storage, config).await?;
        }
        other => {
            log::info!("{}: unknown menu input {:?}", user_id, other);
            bot.send_message(msg.chat.id, "Iltimos, menyudagi tugmalardan foydalaning.")
                .reply_markup(main_keyboard(admin))
                .await?;
        }
    }

    Ok(())
}

pub(crate) async fn send_register_first(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(
        chat_id,
        "❗ Avval ro'yxatdan o'ting. \"📝 Ro'yxatdan o'tish\" tugmasini bosing.",
    )
    .await?;
    Ok(())
}

pub(crate) async fn send_results<S: Storage>(
    bot: &Bot,
    chat_id: ChatId,
    storage: &S,
) -> HandlerResult {
    let results = storage.results_for_user(chat_id.0).await?;
    if results.is_empty() {
        bot.send_message(chat_id, "📭 Siz hali test topshirmagansiz.")
            .await?;
        return Ok(());
    }

    let mut text = format!("📊 <b>Sizning natijalaringiz</b> ({} ta test)\n\n", results.len());
    for (i, result) in results.iter().take(10).enumerate() {
        text.push_str(&format!(
            "{}. {}: {}/{} ({:.0}%)\n   {}\n   🕐 {}\n\n",
            i + 1,
            result.age_group.label(),
            result.correct_answers,
            result.total_questions,
            result.percentage,
            grade(result.percentage).message(),
            format_time(result.completed_at)
        ));
    }
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub(crate) async fn my_results<S: Storage>(
    bot: Bot,
    msg: Message,
    storage: Arc<S>,
) -> HandlerResult {
    send_results(&bot, msg.chat.id, storage.as_ref()).await
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_feedback<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let text = match msg.text().map(validate_feedback) {
        Some(Ok(text)) => text,
        _ => {
            bot.send_message(
                msg.chat.id,
                "❌ Fikr juda qisqa. Kamida 10 ta belgidan iborat matn yozing.",
            )
            .await?;
            return Ok(());
        }
    };

    let user_id = msg.chat.id.0;
    let user = storage.get_user(user_id).await?;
    let admin = is_admin(&config, storage.as_ref(), user_id).await?;
    dialogue.update(BotState::Start).await?;

    let feedback = NewFeedback {
        user_id,
        text,
        phone: user.as_ref().map(|u| u.phone.clone()),
        telegram_username: msg.chat.username().map(str::to_owned),
    };
    let feedback = match storage.save_feedback(feedback).await {
        Ok(feedback) => feedback,
        Err(e) => {
            log::error!("Failed to save feedback from {}: {}", user_id, e);
            bot.send_message(msg.chat.id, "⚠️ Xatolik yuz berdi. Keyinroq urinib ko'ring.")
                .reply_markup(main_keyboard(admin))
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, "✅ Fikringiz uchun rahmat!")
        .reply_markup(main_keyboard(admin))
        .await?;

    let from = match (&user, &feedback.telegram_username) {
        (Some(user), _) => user.child_name.clone(),
        (None, Some(username)) => format!("@{username}"),
        (None, None) => user_id.to_string(),
    };
    notify_admins(
        &bot,
        storage.as_ref(),
        &config,
        &format!(
            "💬 <b>Yangi fikr</b>\n👤 {}\n📱 {}\n\n{}",
            teloxide::utils::html::escape(&from),
            feedback.phone.as_deref().unwrap_or("-"),
            teloxide::utils::html::escape(&feedback.text)
        ),
    )
    .await;

    Ok(())
}

/// Routes inline button presses outside of a running quiz.
#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn dispatch_callback<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        log::warn!("Unknown callback data {:?} from {}", q.data, q.from.id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let Some(chat_id) = q.chat_id() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    match action {
        CallbackAction::BackToMenu => {
            bot.answer_callback_query(q.id.clone()).await?;
            dialogue.update(BotState::Start).await?;
            let admin = is_admin(&config, storage.as_ref(), q.from.id.0 as i64).await?;
            bot.send_message(chat_id, "Bosh menyu:")
                .reply_markup(main_keyboard(admin))
                .await?;
        }
        CallbackAction::Reregister => {
            bot.answer_callback_query(q.id.clone()).await?;
            begin_registration(&bot, chat_id, &dialogue).await?;
        }
        CallbackAction::StartTest => {
            runner::start_test(bot, dialogue, q, storage, config).await?;
        }
        CallbackAction::Answer { .. } | CallbackAction::Skip { .. } => {
            bot.answer_callback_query(q.id.clone())
                .text("Bu test allaqachon yakunlangan.")
                .await?;
        }
        admin_action => {
            if is_admin(&config, storage.as_ref(), q.from.id.0 as i64).await? {
                admin::handle_callback(bot, dialogue, q, admin_action, storage, config).await?;
            } else {
                bot.answer_callback_query(q.id.clone())
                    .text("⛔ Ruxsat yo'q.")
                    .await?;
            }
        }
    }

    Ok(())
}
