use state::BotState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod admin;
pub mod broadcast;
pub mod callback;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod keyboard;
pub mod menu;
pub mod question_import;
pub mod quiz;
pub mod regions;
pub mod registration;
pub mod runner;
pub mod schema;
pub mod state;
pub mod stats;
pub mod validation;

type UserDialogue = Dialogue<BotState, InMemStorage<BotState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
