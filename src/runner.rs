use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, ParseMode},
    utils::html::escape,
    Bot,
};
use tracing::instrument;

use crate::{
    admin::{is_admin, notify_admins},
    callback::CallbackAction,
    config::Config,
    database::{models::TestResult, repository::Storage},
    keyboard::{answers_keyboard, main_keyboard, start_test_keyboard},
    menu::send_register_first,
    quiz::{grade, sample_questions, AnswerOutcome, QuizSession},
    state::BotState,
    HandlerResult, UserDialogue,
};

/// Shows the test rules with a start button, if the user can take a test.
pub(crate) async fn offer_test<S: Storage>(
    bot: &Bot,
    chat_id: ChatId,
    storage: &S,
    config: &Config,
) -> HandlerResult {
    let Some(user) = storage.get_user(chat_id.0).await? else {
        return send_register_first(bot, chat_id).await;
    };

    let available = storage.questions_by_age(user.age_group).await?.len();
    if available == 0 {
        bot.send_message(
            chat_id,
            format!(
                "😔 {} guruhi uchun hozircha savollar yo'q. Keyinroq urinib ko'ring.",
                user.age_group.label()
            ),
        )
        .await?;
        return Ok(());
    }

    let count = available.min(config.questions_per_test);
    bot.send_message(
        chat_id,
        format!(
            "📋 <b>Test</b>\n\n👥 Yosh guruhi: {}\n❓ Savollar soni: {}\n⏱ Har bir savolga {} soniya\n\n\
             Tayyor bo'lsangiz, boshlang!",
            user.age_group.label(),
            count,
            config.question_time_limit.as_secs()
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(start_test_keyboard())
    .await?;

    Ok(())
}

fn question_text(session: &QuizSession, config: &Config) -> String {
    match session.current_question() {
        Some(question) => {
            let options: String = question
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    format!("{}) {}\n", crate::keyboard::option_letter(i), escape(option))
                })
                .collect();
            format!(
                "❓ <b>Savol {}/{}</b>\n\n{}\n\n{}\n⏱ {} soniya",
                session.current_index() + 1,
                session.total(),
                escape(&question.text),
                options,
                config.question_time_limit.as_secs()
            )
        }
        None => String::new(),
    }
}

fn result_text(result: &TestResult) -> String {
    format!(
        "🎉 <b>Test yakunlandi!</b>\n\n👥 Yosh guruhi: {}\n✅ To'g'ri javoblar: {}/{}\n📊 Foiz: {:.0}%\n⏱ Vaqt: {} daqiqa {} soniya\n\n{}",
        result.age_group.label(),
        result.correct_answers,
        result.total_questions,
        result.percentage,
        result.duration_seconds / 60,
        result.duration_seconds % 60,
        grade(result.percentage).message()
    )
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn start_test<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };

    let Some(user) = storage.get_user(chat_id.0).await? else {
        return send_register_first(&bot, chat_id).await;
    };
    let pool = storage.questions_by_age(user.age_group).await?;
    let questions = sample_questions(&pool, config.questions_per_test, &mut rand::thread_rng());
    if questions.is_empty() {
        bot.send_message(chat_id, "😔 Hozircha savollar yo'q.").await?;
        return Ok(());
    }

    log::info!(
        "{} starts a test with {} questions ({})",
        user.user_id,
        questions.len(),
        user.age_group
    );
    let session = QuizSession::start(user.user_id, user.age_group, questions, Utc::now());
    let text = question_text(&session, &config);
    let keyboard = session
        .current_question()
        .map(|question| answers_keyboard(question, session.current_index()));

    match (&q.message, keyboard) {
        (Some(message), Some(keyboard)) => {
            bot.edit_message_text(chat_id, message.id(), text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        (None, Some(keyboard)) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        (_, None) => return Ok(()),
    }

    dialogue.update(BotState::TakingQuiz { session }).await?;
    Ok(())
}

/// Applies an answer or skip callback. Returns the 1-based number of the
/// question it was aimed at, read before the session moves on.
fn apply_answer(
    session: &mut QuizSession,
    action: CallbackAction,
    now: DateTime<Utc>,
    limit: Duration,
) -> Option<(usize, AnswerOutcome)> {
    let number = session.current_index() + 1;
    let outcome = match action {
        CallbackAction::Answer { index, option } => session.answer(index, option, now, limit),
        CallbackAction::Skip { index } => session.skip(index, now),
        _ => return None,
    };
    Some((number, outcome))
}

#[instrument(level = "info", skip(bot, dialogue, session, storage, config))]
pub(crate) async fn take_answer<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    mut session: QuizSession,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };
    let now = Utc::now();

    let action = q.data.as_deref().and_then(CallbackAction::parse);
    let Some((answered, outcome)) =
        action.and_then(|action| apply_answer(&mut session, action, now, config.question_time_limit))
    else {
        bot.answer_callback_query(q.id.clone())
            .text("Avval testni yakunlang yoki /cancel buyrug'ini yuboring.")
            .await?;
        return Ok(());
    };

    let notice = match outcome {
        AnswerOutcome::Stale | AnswerOutcome::InvalidOption => {
            bot.answer_callback_query(q.id.clone())
                .text("Bu savolga javob berib bo'lingan.")
                .await?;
            return Ok(());
        }
        AnswerOutcome::Correct => "✅ To'g'ri!",
        AnswerOutcome::Incorrect => "❌ Noto'g'ri",
        AnswerOutcome::TimedOut => "⏰ Vaqt tugadi!",
        AnswerOutcome::Skipped => "⏭ O'tkazib yuborildi",
    };
    log::info!(
        "{} answered question #{}: {:?}",
        chat_id,
        answered,
        outcome
    );
    bot.answer_callback_query(q.id.clone()).text(notice).await?;

    if !session.is_finished() {
        let text = question_text(&session, &config);
        if let (Some(message), Some(question)) = (&q.message, session.current_question()) {
            bot.edit_message_text(chat_id, message.id(), text)
                .parse_mode(ParseMode::Html)
                .reply_markup(answers_keyboard(question, session.current_index()))
                .await?;
        }
        dialogue.update(BotState::TakingQuiz { session }).await?;
        return Ok(());
    }

    // Leave the quiz state before saving so a repeated callback cannot store twice.
    dialogue.update(BotState::Start).await?;
    let result = match storage.save_result(session.finish(now)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Failed to save test result of {}: {}", chat_id, e);
            bot.send_message(chat_id, "⚠️ Natijani saqlashda xatolik yuz berdi.")
                .await?;
            return Ok(());
        }
    };
    log::info!(
        "{} completed a test with result {}%",
        result.user_id,
        result.percentage
    );

    let text = result_text(&result);
    match &q.message {
        Some(message) => {
            bot.edit_message_text(chat_id, message.id(), text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }

    let admin = is_admin(&config, storage.as_ref(), chat_id.0).await?;
    bot.send_message(chat_id, "Bosh menyu:")
        .reply_markup(main_keyboard(admin))
        .await?;

    let who = match storage.get_user(result.user_id).await? {
        Some(user) => format!(
            "👤 {}\n📱 +{}\n🌍 {}",
            escape(&user.child_name),
            user.phone,
            escape(&user.address())
        ),
        None => format!("👤 {}", result.user_id),
    };
    notify_admins(
        &bot,
        storage.as_ref(),
        &config,
        &format!(
            "📊 <b>Yangi test natijasi</b>\n\n{}\n👥 {}\n✅ {}/{} ({:.0}%)",
            who,
            result.age_group.label(),
            result.correct_answers,
            result.total_questions,
            result.percentage
        ),
    )
    .await;

    Ok(())
}

#[instrument(level = "info", skip(bot))]
pub(crate) async fn quiz_in_progress(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "📝 Test davom etmoqda. Javobni tugmalar orqali tanlang yoki /cancel bilan to'xtating.",
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use uuid::Uuid;

    use crate::database::models::{AgeGroup, Question};

    use super::*;

    fn question(correct_option: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "Ertakni kim yozgan?".to_owned(),
            options: vec!["Navoiy".into(), "Qodiriy".into(), "Oybek".into()],
            correct_option,
            age_group: AgeGroup::SevenToTen,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn answer_reports_the_question_it_was_aimed_at() {
        let t0 = Utc::now();
        let limit = Duration::from_secs(20);
        let mut session =
            QuizSession::start(5, AgeGroup::SevenToTen, vec![question(1), question(0)], t0);

        let first = apply_answer(
            &mut session,
            CallbackAction::Answer { index: 0, option: 1 },
            t0 + TimeDelta::seconds(2),
            limit,
        );
        assert_eq!(first, Some((1, AnswerOutcome::Correct)));
        assert_eq!(session.current_index(), 1);

        let second = apply_answer(
            &mut session,
            CallbackAction::Skip { index: 1 },
            t0 + TimeDelta::seconds(4),
            limit,
        );
        assert_eq!(second, Some((2, AnswerOutcome::Skipped)));
        assert!(session.is_finished());

        assert_eq!(
            apply_answer(&mut session, CallbackAction::StartTest, t0, limit),
            None
        );
    }
}
