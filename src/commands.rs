use std::sync::Arc;

use chrono::Utc;
use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};
use tracing::instrument;

use crate::{
    admin::is_admin,
    config::Config,
    database::{models::BotUser, repository::Storage},
    keyboard::main_keyboard,
    state::BotState,
    HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "bosh menyu.")]
    Start,
    #[command(description = "yordam.")]
    Help,
    #[command(description = "joriy amalni bekor qilish.")]
    Cancel,
    #[command(description = "admin paneli.")]
    Admin,
    #[command(description = "mening natijalarim.")]
    Results,
    #[command(description = "foydalanuvchi kartasi (admin): /user <id>.")]
    User(i64),
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub(crate) async fn cancel<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let admin = is_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    bot.send_message(msg.chat.id, "❌ Bekor qilindi.")
        .reply_markup(main_keyboard(admin))
        .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn start<S: Storage>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let user_id = msg.chat.id.0;
    let now = Utc::now();
    let seen = BotUser {
        user_id,
        first_name: msg.chat.first_name().map(str::to_owned),
        username: msg.chat.username().map(str::to_owned),
        first_seen: now,
        last_seen: now,
    };
    if let Err(e) = storage.track_bot_user(seen).await {
        log::error!("Failed to track bot user {}: {}", user_id, e);
    }

    log::info!("{} started the bot", msg.chat.username().unwrap_or("unknown"));

    let admin = is_admin(&config, storage.as_ref(), user_id).await?;
    let greeting = match msg.chat.first_name() {
        Some(name) => format!("Assalomu alaykum, {name}! 👋"),
        None => "Assalomu alaykum! 👋".to_owned(),
    };
    bot.send_message(
        msg.chat.id,
        format!(
            "{greeting}\n\n📚 <b>Kitobxon Kids</b> botiga xush kelibsiz!\n\
             Bu yerda farzandingizni ro'yxatdan o'tkazishingiz va kitob bo'yicha test \
             topshirishingiz mumkin."
        ),
    )
    .parse_mode(teloxide::types::ParseMode::Html)
    .reply_markup(main_keyboard(admin))
    .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_command_takes_an_id() {
        let cmd = Command::parse("/user 12345", "kitobxonbot").unwrap();
        assert!(matches!(cmd, Command::User(12345)));
        assert!(Command::parse("/user abc", "kitobxonbot").is_err());
    }

    #[test]
    fn plain_commands_parse() {
        assert!(matches!(
            Command::parse("/results", "kitobxonbot").unwrap(),
            Command::Results
        ));
        assert!(matches!(
            Command::parse("/cancel", "kitobxonbot").unwrap(),
            Command::Cancel
        ));
    }
}
