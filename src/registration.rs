use std::sync::Arc;

use chrono::Utc;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message, ParseMode, ReplyMarkup},
    utils::html::escape,
    Bot,
};
use tracing::instrument;

use crate::{
    admin::{is_admin, notify_admins},
    config::Config,
    database::{models::User, repository::Storage},
    keyboard::{
        age_keyboard, contact_keyboard, district_keyboard, mahalla_keyboard, main_keyboard,
        region_keyboard, MANUAL_ENTRY,
    },
    regions,
    state::{BotState, RegistrationDraft},
    validation::{normalize_phone, validate_age, validate_name, validate_place},
    HandlerResult, UserDialogue,
};

pub(crate) async fn begin_registration(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &UserDialogue,
) -> HandlerResult {
    bot.send_message(chat_id, "👶 Farzandingizning ismini kiriting:")
        .reply_markup(ReplyMarkup::kb_remove())
        .await?;
    dialogue
        .update(BotState::ReceiveChildName {
            draft: RegistrationDraft::default(),
        })
        .await?;
    Ok(())
}

pub(crate) fn profile_text(user: &User) -> String {
    format!(
        "👤 <b>{}</b>\n👨‍👩‍👧 Ota-ona: {}\n🎂 Yosh: {} ({})\n🌍 Manzil: {}\n📱 Telefon: +{}",
        escape(&user.child_name),
        escape(&user.parent_name),
        user.age,
        user.age_group.label(),
        escape(&user.address()),
        user.phone
    )
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_child_name(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_name) {
        Some(Ok(name)) => {
            log::info!("{} registers child '{}'", msg.chat.id, name);
            draft.child_name = name;
            bot.send_message(msg.chat.id, "👨‍👩‍👧 Ota yoki onaning ismini kiriting:")
                .await?;
            dialogue.update(BotState::ReceiveParentName { draft }).await?;
        }
        Some(Err(e)) => {
            log::info!("{} sent an invalid child name: {}", msg.chat.id, e);
            bot.send_message(
                msg.chat.id,
                "❌ Ism noto'g'ri. Faqat harflardan iborat 2-50 belgili ism kiriting.",
            )
            .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Iltimos, ismni matn ko'rinishida yuboring.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_parent_name(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_name) {
        Some(Ok(name)) => {
            draft.parent_name = name;
            bot.send_message(msg.chat.id, "🌍 Viloyatingizni tanlang:")
                .reply_markup(region_keyboard())
                .await?;
            dialogue.update(BotState::ReceiveRegion { draft }).await?;
        }
        Some(Err(_)) => {
            bot.send_message(
                msg.chat.id,
                "❌ Ism noto'g'ri. Faqat harflardan iborat 2-50 belgili ism kiriting.",
            )
            .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Iltimos, ismni matn ko'rinishida yuboring.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_region(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text() {
        Some(MANUAL_ENTRY) => {
            bot.send_message(msg.chat.id, "✍️ Viloyat nomini kiriting:")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            dialogue.update(BotState::ReceiveManualRegion { draft }).await?;
        }
        Some(region) if regions::is_known_region(region) => {
            draft.region = region.to_owned();
            bot.send_message(msg.chat.id, "🏙 Tumaningizni tanlang:")
                .reply_markup(district_keyboard(region))
                .await?;
            dialogue.update(BotState::ReceiveDistrict { draft }).await?;
        }
        other => {
            log::info!("{} sent unknown region {:?}", msg.chat.id, other);
            bot.send_message(
                msg.chat.id,
                "Iltimos, viloyatni ro'yxatdan tanlang yoki qo'lda kiriting.",
            )
            .reply_markup(region_keyboard())
            .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_manual_region(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_place) {
        Some(Ok(region)) => {
            draft.region = region;
            bot.send_message(msg.chat.id, "✍️ Tuman nomini kiriting:")
                .await?;
            dialogue
                .update(BotState::ReceiveManualDistrict { draft })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "❌ Kamida 2 ta belgidan iborat nom kiriting.")
                .await?;
        }
    }

    Ok(())
}

async fn ask_mahalla(
    bot: &Bot,
    msg: &Message,
    dialogue: &UserDialogue,
    draft: RegistrationDraft,
) -> HandlerResult {
    let request = bot.send_message(msg.chat.id, "🏘 Mahallangizni tanlang yoki yozing:");
    match mahalla_keyboard(&draft.region, &draft.district) {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.reply_markup(ReplyMarkup::kb_remove()).await?,
    };
    dialogue.update(BotState::ReceiveMahalla { draft }).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_district(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text() {
        Some(MANUAL_ENTRY) => {
            bot.send_message(msg.chat.id, "✍️ Tuman nomini kiriting:")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            dialogue
                .update(BotState::ReceiveManualDistrict { draft })
                .await?;
        }
        Some(district) if regions::is_known_district(&draft.region, district) => {
            draft.district = district.to_owned();
            ask_mahalla(&bot, &msg, &dialogue, draft).await?;
        }
        _ => {
            bot.send_message(
                msg.chat.id,
                "Iltimos, tumanni ro'yxatdan tanlang yoki qo'lda kiriting.",
            )
            .reply_markup(district_keyboard(&draft.region))
            .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_manual_district(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_place) {
        Some(Ok(district)) => {
            draft.district = district;
            ask_mahalla(&bot, &msg, &dialogue, draft).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "❌ Kamida 2 ta belgidan iborat nom kiriting.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_mahalla(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_place) {
        Some(Ok(mahalla)) => {
            draft.mahalla = mahalla;
            bot.send_message(msg.chat.id, "🎂 Farzandingiz necha yoshda? (7-14)")
                .reply_markup(age_keyboard())
                .await?;
            dialogue.update(BotState::ReceiveAge { draft }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "❌ Kamida 2 ta belgidan iborat nom kiriting.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_age(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut draft: RegistrationDraft,
) -> HandlerResult {
    match msg.text().map(validate_age) {
        Some(Ok((age, age_group))) => {
            draft.age = age;
            draft.age_group = Some(age_group);
            bot.send_message(
                msg.chat.id,
                "📱 Telefon raqamingizni yuboring yoki yozing (masalan, +998901234567):",
            )
            .reply_markup(contact_keyboard())
            .await?;
            dialogue.update(BotState::ReceivePhone { draft }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "❌ Yosh 7 dan 14 gacha bo'lishi kerak.")
                .reply_markup(age_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, storage, config))]
pub(crate) async fn receive_phone<S: Storage>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    draft: RegistrationDraft,
    storage: Arc<S>,
    config: Arc<Config>,
) -> HandlerResult {
    let raw = match (msg.contact(), msg.text()) {
        (Some(contact), _) => contact.phone_number.clone(),
        (None, Some(text)) => text.to_owned(),
        (None, None) => {
            bot.send_message(msg.chat.id, "Iltimos, telefon raqamini yuboring.")
                .await?;
            return Ok(());
        }
    };

    let phone = match normalize_phone(&raw) {
        Ok(phone) => phone,
        Err(_) => {
            bot.send_message(
                msg.chat.id,
                "❌ Telefon raqami noto'g'ri. Namuna: +998901234567",
            )
            .reply_markup(contact_keyboard())
            .await?;
            return Ok(());
        }
    };

    let Some(age_group) = draft.age_group else {
        log::error!("{}: registration reached phone step without age", msg.chat.id);
        dialogue.update(BotState::Start).await?;
        return Ok(());
    };

    let now = Utc::now();
    let user = User {
        user_id: msg.chat.id.0,
        child_name: draft.child_name,
        parent_name: draft.parent_name,
        phone,
        age: draft.age,
        age_group,
        region: draft.region,
        district: draft.district,
        mahalla: draft.mahalla,
        telegram_username: msg.chat.username().map(str::to_owned),
        telegram_name: msg.chat.first_name().map(str::to_owned),
        registered_at: now,
        updated_at: now,
    };

    let admin = is_admin(&config, storage.as_ref(), msg.chat.id.0).await?;
    dialogue.update(BotState::Start).await?;

    let user = match storage.save_user(user).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to save registration of {}: {}", msg.chat.id, e);
            bot.send_message(
                msg.chat.id,
                "⚠️ Ro'yxatdan o'tishda xatolik yuz berdi. Iltimos, keyinroq qayta urinib ko'ring.",
            )
            .reply_markup(main_keyboard(admin))
            .await?;
            return Ok(());
        }
    };
    log::info!("{} completed registration", user.user_id);

    bot.send_message(
        msg.chat.id,
        format!(
            "✅ Ro'yxatdan o'tish muvaffaqiyatli yakunlandi!\n\n{}",
            profile_text(&user)
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(main_keyboard(admin))
    .await?;

    let username = user
        .telegram_username
        .as_deref()
        .map(|u| format!(" (@{u})"))
        .unwrap_or_default();
    notify_admins(
        &bot,
        storage.as_ref(),
        &config,
        &format!(
            "🆕 Yangi ro'yxatdan o'tish{}\n\n{}",
            escape(&username),
            profile_text(&user)
        ),
    )
    .await;

    Ok(())
}
