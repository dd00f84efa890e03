use std::future::Future;

use uuid::Uuid;

use crate::error::StoreResult;

use super::models::{
    Admin, AgeGroup, BotUser, BroadcastRecord, Feedback, NewFeedback, NewQuestion, NewTestResult,
    Question, TestResult, User,
};

pub trait UserRepository {
    fn get_user(&self, user_id: i64) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Inserts or replaces a registration. An existing `registered_at` is kept.
    fn save_user(&self, user: User) -> impl Future<Output = StoreResult<User>> + Send;

    /// Newest registrations first.
    fn list_users(&self) -> impl Future<Output = StoreResult<Vec<User>>> + Send;

    fn delete_user(&self, user_id: i64) -> impl Future<Output = StoreResult<bool>> + Send;

    fn set_age_group(
        &self,
        user_id: i64,
        age_group: AgeGroup,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    fn track_bot_user(&self, user: BotUser) -> impl Future<Output = StoreResult<()>> + Send;

    fn list_bot_users(&self) -> impl Future<Output = StoreResult<Vec<BotUser>>> + Send;
}

pub trait QuestionRepository {
    fn add_question(
        &self,
        question: NewQuestion,
    ) -> impl Future<Output = StoreResult<Question>> + Send;

    fn get_question(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Question>>> + Send;

    /// Oldest first, so listing numbers stay stable while questions are added.
    fn questions_by_age(
        &self,
        age_group: AgeGroup,
    ) -> impl Future<Output = StoreResult<Vec<Question>>> + Send;

    fn delete_question(&self, id: Uuid) -> impl Future<Output = StoreResult<bool>> + Send;

    fn clear_questions(&self, age_group: AgeGroup)
        -> impl Future<Output = StoreResult<u64>> + Send;
}

pub trait ResultRepository {
    fn save_result(
        &self,
        result: NewTestResult,
    ) -> impl Future<Output = StoreResult<TestResult>> + Send;

    /// Newest first.
    fn results_for_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = StoreResult<Vec<TestResult>>> + Send;

    fn list_results(&self) -> impl Future<Output = StoreResult<Vec<TestResult>>> + Send;
}

pub trait AdminRepository {
    fn list_admins(&self) -> impl Future<Output = StoreResult<Vec<Admin>>> + Send;

    fn get_admin(&self, user_id: i64) -> impl Future<Output = StoreResult<Option<Admin>>> + Send;

    fn add_admin(&self, admin: Admin) -> impl Future<Output = StoreResult<()>> + Send;

    fn remove_admin(&self, user_id: i64) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Inserts a `super_admin` entry only if `user_id` has no entry yet.
    /// Returns `true` when an entry was created.
    fn ensure_super_admin(&self, user_id: i64) -> impl Future<Output = StoreResult<bool>> + Send;
}

pub trait FeedbackRepository {
    fn save_feedback(
        &self,
        feedback: NewFeedback,
    ) -> impl Future<Output = StoreResult<Feedback>> + Send;

    fn list_feedback(&self) -> impl Future<Output = StoreResult<Vec<Feedback>>> + Send;
}

pub trait BroadcastRepository {
    fn save_broadcast(
        &self,
        record: BroadcastRecord,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn list_broadcasts(&self) -> impl Future<Output = StoreResult<Vec<BroadcastRecord>>> + Send;
}

/// Everything the bot needs from a backend.
pub trait Storage:
    UserRepository
    + QuestionRepository
    + ResultRepository
    + AdminRepository
    + FeedbackRepository
    + BroadcastRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> Storage for T where
    T: UserRepository
        + QuestionRepository
        + ResultRepository
        + AdminRepository
        + FeedbackRepository
        + BroadcastRepository
        + Send
        + Sync
        + 'static
{
}
