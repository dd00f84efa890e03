use std::error::Error;

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        DpHandlerDescription, UpdateFilterExt, UpdateHandler,
    },
    dptree::{self, Handler},
    prelude::{DependencyMap, Requester},
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    admin,
    commands::{cancel, help, start, Command},
    database::repository::Storage,
    menu, registration, runner,
    state::BotState,
    HandlerResult,
};

type BotHandler =
    Handler<'static, DependencyMap, Result<(), Box<dyn Error + Send + Sync + 'static>>, DpHandlerDescription>;

pub fn schema<S: Storage>() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start::<S>))
        .branch(case![Command::Cancel].endpoint(cancel::<S>))
        .branch(case![Command::Admin].endpoint(admin::show_admin_menu::<S>))
        .branch(case![Command::Results].endpoint(menu::my_results::<S>))
        .branch(case![Command::User(user_id)].endpoint(admin::user_card::<S>));

    let handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![BotState::Start].endpoint(menu::main_menu::<S>))
        .branch(registration_scheme::<S>())
        .branch(running_scheme::<S>())
        .branch(admin_scheme::<S>())
        .endpoint(invalid_state);

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>()
        .branch(handler)
        .branch(callback_query_scheme::<S>())
}

#[instrument(level = "debug")]
fn registration_scheme<S: Storage>() -> BotHandler {
    use dptree::case;
    log::debug!("Building a dispatch tree for registration");
    Update::filter_message()
        .branch(case![BotState::ReceiveChildName { draft }].endpoint(registration::receive_child_name))
        .branch(
            case![BotState::ReceiveParentName { draft }].endpoint(registration::receive_parent_name),
        )
        .branch(case![BotState::ReceiveRegion { draft }].endpoint(registration::receive_region))
        .branch(
            case![BotState::ReceiveManualRegion { draft }]
                .endpoint(registration::receive_manual_region),
        )
        .branch(case![BotState::ReceiveDistrict { draft }].endpoint(registration::receive_district))
        .branch(
            case![BotState::ReceiveManualDistrict { draft }]
                .endpoint(registration::receive_manual_district),
        )
        .branch(case![BotState::ReceiveMahalla { draft }].endpoint(registration::receive_mahalla))
        .branch(case![BotState::ReceiveAge { draft }].endpoint(registration::receive_age))
        .branch(
            case![BotState::ReceivePhone { draft }].endpoint(registration::receive_phone::<S>),
        )
}

#[instrument(level = "debug")]
fn running_scheme<S: Storage>() -> BotHandler {
    use dptree::case;
    log::debug!("Building a dispatch tree for quiz runner");
    Update::filter_message()
        .branch(case![BotState::TakingQuiz { session }].endpoint(runner::quiz_in_progress))
        .branch(case![BotState::ReceiveFeedback].endpoint(menu::receive_feedback::<S>))
}

#[instrument(level = "debug")]
fn admin_scheme<S: Storage>() -> BotHandler {
    use dptree::case;
    log::debug!("Building a dispatch tree for admin tools");
    Update::filter_message()
        .branch(case![BotState::ReceiveBroadcast].endpoint(admin::receive_broadcast::<S>))
        .branch(
            case![BotState::ReceiveQuestionText { age_group }]
                .endpoint(admin::receive_question_text),
        )
        .branch(
            case![BotState::ReceiveQuestionOptions { question_draft }]
                .endpoint(admin::receive_question_options),
        )
        .branch(
            case![BotState::ReceiveCorrectOption { question_draft }]
                .endpoint(admin::receive_correct_option::<S>),
        )
        .branch(
            case![BotState::ReceiveBulkQuestions { age_group }]
                .endpoint(admin::receive_bulk_questions::<S>),
        )
        .branch(case![BotState::ReceiveQuestionFile].endpoint(admin::receive_question_file))
        .branch(case![BotState::ReceiveFileAgeGroup { parsed }].endpoint(file_age_pending))
        .branch(
            case![BotState::ReceiveDeleteQuestion { age_group }]
                .endpoint(admin::receive_delete_question::<S>),
        )
        .branch(case![BotState::ReceiveNewAdmin].endpoint(admin::receive_new_admin::<S>))
        .branch(case![BotState::ReceiveRemoveAdmin].endpoint(admin::receive_remove_admin::<S>))
}

#[instrument(level = "debug")]
fn callback_query_scheme<S: Storage>() -> BotHandler {
    use dptree::case;
    log::debug!("Building a dispatch tree for callback queries");
    Update::filter_callback_query()
        .branch(case![BotState::TakingQuiz { session }].endpoint(runner::take_answer::<S>))
        .endpoint(menu::dispatch_callback::<S>)
}

async fn file_age_pending(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "👆 Yuqoridagi tugmalar orqali yosh guruhini tanlang yoki /cancel yuboring.",
    )
    .await?;
    Ok(())
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Xabarni tushunmadim. Yordam uchun /help yuboring.",
    )
    .await?;
    Ok(())
}
