use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreResult;

use super::models::{
    Admin, AdminRole, AgeGroup, BotUser, BroadcastRecord, Feedback, NewFeedback, NewQuestion,
    NewTestResult, Question, TestResult, User,
};
use super::repository::{
    AdminRepository, BroadcastRepository, FeedbackRepository, QuestionRepository,
    ResultRepository, UserRepository,
};

const USERS_FILE: &str = "users.json";
const BOT_USERS_FILE: &str = "bot_users.json";
const QUESTIONS_FILE: &str = "questions.json";
const RESULTS_FILE: &str = "results.json";
const ADMINS_FILE: &str = "admins.json";
const FEEDBACK_FILE: &str = "feedback.json";
const BROADCASTS_FILE: &str = "broadcasts.json";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    bot_users: Vec<BotUser>,
    questions: Vec<Question>,
    results: Vec<TestResult>,
    admins: Vec<Admin>,
    feedback: Vec<Feedback>,
    broadcasts: Vec<BroadcastRecord>,
}

/// File backend used when no database is configured.
///
/// Every collection lives in its own file inside `dir`. Collections are
/// loaded once on open and rewritten in full after each mutation.
pub struct JsonStore {
    dir: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonStore {
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let tables = Tables {
            users: load(&dir, USERS_FILE).await?,
            bot_users: load(&dir, BOT_USERS_FILE).await?,
            questions: load(&dir, QUESTIONS_FILE).await?,
            results: load(&dir, RESULTS_FILE).await?,
            admins: load(&dir, ADMINS_FILE).await?,
            feedback: load(&dir, FEEDBACK_FILE).await?,
            broadcasts: load(&dir, BROADCASTS_FILE).await?,
        };
        log::info!(
            "Opened data directory {} ({} users, {} questions)",
            dir.display(),
            tables.users.len(),
            tables.questions.len()
        );

        Ok(Self {
            dir,
            tables: RwLock::new(tables),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn load<T: DeserializeOwned>(dir: &Path, name: &str) -> StoreResult<Vec<T>> {
    let path = dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Writes `items` next to the target and renames over it.
async fn persist<T: Serialize>(dir: &Path, name: &str, items: &[T]) -> StoreResult<()> {
    let path = dir.join(name);
    let tmp = dir.join(format!("{name}.tmp"));
    let bytes = serde_json::to_vec_pretty(items)?;
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(())
}

// Mutators edit a copy of the table and swap it in only after it is on disk,
// so a failed write leaves memory matching the files.

impl UserRepository for JsonStore {
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn save_user(&self, mut user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let mut users = tables.users.clone();
        match users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => {
                user.registered_at = existing.registered_at;
                *existing = user.clone();
            }
            None => users.push(user.clone()),
        }
        persist(&self.dir, USERS_FILE, &users).await?;
        tables.users = users;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(users)
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Ok(false);
        }
        let mut users = tables.users.clone();
        users.retain(|u| u.user_id != user_id);
        let mut results = tables.results.clone();
        results.retain(|r| r.user_id != user_id);

        persist(&self.dir, USERS_FILE, &users).await?;
        if let Err(e) = persist(&self.dir, RESULTS_FILE, &results).await {
            if let Err(restore) = persist(&self.dir, USERS_FILE, &tables.users).await {
                log::error!("Failed to restore {} after a failed delete: {}", USERS_FILE, restore);
            }
            return Err(e);
        }
        tables.users = users;
        tables.results = results;
        Ok(true)
    }

    async fn set_age_group(&self, user_id: i64, age_group: AgeGroup) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let mut users = tables.users.clone();
        let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(false);
        };
        user.age_group = age_group;
        user.updated_at = Utc::now();
        persist(&self.dir, USERS_FILE, &users).await?;
        tables.users = users;
        Ok(true)
    }

    async fn track_bot_user(&self, user: BotUser) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let mut bot_users = tables.bot_users.clone();
        match bot_users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => {
                existing.first_name = user.first_name;
                existing.username = user.username;
                existing.last_seen = user.last_seen;
            }
            None => bot_users.push(user),
        }
        persist(&self.dir, BOT_USERS_FILE, &bot_users).await?;
        tables.bot_users = bot_users;
        Ok(())
    }

    async fn list_bot_users(&self) -> StoreResult<Vec<BotUser>> {
        Ok(self.tables.read().await.bot_users.clone())
    }
}

impl QuestionRepository for JsonStore {
    async fn add_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let question = question.into_question(Uuid::new_v4(), Utc::now());
        let mut tables = self.tables.write().await;
        let mut questions = tables.questions.clone();
        questions.push(question.clone());
        persist(&self.dir, QUESTIONS_FILE, &questions).await?;
        tables.questions = questions;
        Ok(question)
    }

    async fn get_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn questions_by_age(&self, age_group: AgeGroup) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        // Insertion order is creation order.
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.age_group == age_group)
            .cloned()
            .collect())
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == id) {
            return Ok(false);
        }
        let mut questions = tables.questions.clone();
        questions.retain(|q| q.id != id);
        persist(&self.dir, QUESTIONS_FILE, &questions).await?;
        tables.questions = questions;
        Ok(true)
    }

    async fn clear_questions(&self, age_group: AgeGroup) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut questions = tables.questions.clone();
        questions.retain(|q| q.age_group != age_group);
        let removed = (tables.questions.len() - questions.len()) as u64;
        if removed > 0 {
            persist(&self.dir, QUESTIONS_FILE, &questions).await?;
            tables.questions = questions;
        }
        Ok(removed)
    }
}

impl ResultRepository for JsonStore {
    async fn save_result(&self, result: NewTestResult) -> StoreResult<TestResult> {
        let result = TestResult::from_new(result, Uuid::new_v4(), Utc::now());
        let mut tables = self.tables.write().await;
        let mut results = tables.results.clone();
        results.push(result.clone());
        persist(&self.dir, RESULTS_FILE, &results).await?;
        tables.results = results;
        Ok(result)
    }

    async fn results_for_user(&self, user_id: i64) -> StoreResult<Vec<TestResult>> {
        let tables = self.tables.read().await;
        let mut results: Vec<_> = tables
            .results
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }

    async fn list_results(&self) -> StoreResult<Vec<TestResult>> {
        let tables = self.tables.read().await;
        let mut results = tables.results.clone();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}

impl AdminRepository for JsonStore {
    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        Ok(self.tables.read().await.admins.clone())
    }

    async fn get_admin(&self, user_id: i64) -> StoreResult<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn add_admin(&self, admin: Admin) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let mut admins = tables.admins.clone();
        match admins.iter_mut().find(|a| a.user_id == admin.user_id) {
            Some(existing) => {
                existing.role = admin.role;
                existing.added_by = admin.added_by;
            }
            None => admins.push(admin),
        }
        persist(&self.dir, ADMINS_FILE, &admins).await?;
        tables.admins = admins;
        Ok(())
    }

    async fn remove_admin(&self, user_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.admins.iter().any(|a| a.user_id == user_id) {
            return Ok(false);
        }
        let mut admins = tables.admins.clone();
        admins.retain(|a| a.user_id != user_id);
        persist(&self.dir, ADMINS_FILE, &admins).await?;
        tables.admins = admins;
        Ok(true)
    }

    async fn ensure_super_admin(&self, user_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.admins.iter().any(|a| a.user_id == user_id) {
            return Ok(false);
        }
        let mut admins = tables.admins.clone();
        admins.push(Admin {
            user_id,
            role: AdminRole::SuperAdmin,
            added_by: None,
            added_at: Utc::now(),
        });
        persist(&self.dir, ADMINS_FILE, &admins).await?;
        tables.admins = admins;
        Ok(true)
    }
}

impl FeedbackRepository for JsonStore {
    async fn save_feedback(&self, feedback: NewFeedback) -> StoreResult<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: feedback.user_id,
            text: feedback.text,
            phone: feedback.phone,
            telegram_username: feedback.telegram_username,
            created_at: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        let mut all = tables.feedback.clone();
        all.push(feedback.clone());
        persist(&self.dir, FEEDBACK_FILE, &all).await?;
        tables.feedback = all;
        Ok(feedback)
    }

    async fn list_feedback(&self) -> StoreResult<Vec<Feedback>> {
        let tables = self.tables.read().await;
        let mut feedback = tables.feedback.clone();
        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedback)
    }
}

impl BroadcastRepository for JsonStore {
    async fn save_broadcast(&self, record: BroadcastRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let mut broadcasts = tables.broadcasts.clone();
        broadcasts.push(record);
        persist(&self.dir, BROADCASTS_FILE, &broadcasts).await?;
        tables.broadcasts = broadcasts;
        Ok(())
    }

    async fn list_broadcasts(&self) -> StoreResult<Vec<BroadcastRecord>> {
        let tables = self.tables.read().await;
        let mut broadcasts = tables.broadcasts.clone();
        broadcasts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(broadcasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_file_loads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(USERS_FILE), "  \n").unwrap();

        let store = JsonStore::open(dir.path()).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(QUESTIONS_FILE), "{ not json").unwrap();

        assert!(JsonStore::open(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        store.ensure_super_admin(1).await.unwrap();

        assert!(dir.path().join(ADMINS_FILE).exists());
        assert!(!dir.path().join(format!("{ADMINS_FILE}.tmp")).exists());
    }

    fn user(user_id: i64) -> User {
        let now = Utc::now();
        User {
            user_id,
            child_name: "Ali".to_owned(),
            parent_name: "Vali".to_owned(),
            phone: "998901234567".to_owned(),
            age: 8,
            age_group: AgeGroup::SevenToTen,
            region: "Toshkent shahri".to_owned(),
            district: "Bektemir".to_owned(),
            mahalla: "Kuyluk".to_owned(),
            telegram_username: None,
            telegram_name: None,
            registered_at: now,
            updated_at: now,
        }
    }

    fn block_writes(dir: &Path, name: &str) {
        std::fs::create_dir(dir.join(format!("{name}.tmp"))).unwrap();
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        block_writes(dir.path(), USERS_FILE);

        assert!(store.save_user(user(42)).await.is_err());
        assert!(store.get_user(42).await.unwrap().is_none());
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_user_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        store.save_user(user(7)).await.unwrap();
        store
            .save_result(NewTestResult {
                user_id: 7,
                age_group: AgeGroup::SevenToTen,
                total_questions: 1,
                correct_answers: 1,
                percentage: 100.0,
                duration_seconds: 5,
                answers: Vec::new(),
            })
            .await
            .unwrap();
        block_writes(dir.path(), RESULTS_FILE);

        assert!(store.delete_user(7).await.is_err());
        assert!(store.get_user(7).await.unwrap().is_some());
        assert_eq!(store.results_for_user(7).await.unwrap().len(), 1);

        let reopened = JsonStore::open(dir.path()).await.unwrap();
        assert!(reopened.get_user(7).await.unwrap().is_some());
        assert_eq!(reopened.results_for_user(7).await.unwrap().len(), 1);
    }
}
