use std::borrow::Cow;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, types::Json, FromRow};
use uuid::Uuid;

use crate::error::{StoreResult, ValidationError};

use super::models::{
    Admin, AgeGroup, AnswerRecord, BotUser, BroadcastRecord, Feedback, NewFeedback, NewQuestion,
    NewTestResult, Question, TestResult, User,
};
use super::repository::{
    AdminRepository, BroadcastRepository, FeedbackRepository, QuestionRepository,
    ResultRepository, UserRepository,
};

/// PostgreSQL backend.
pub struct Connection {
    pool: PgPool,
}

impl Connection {
    pub async fn connect(connection_string: Cow<'_, str>) -> StoreResult<Self> {
        let pool = PgPool::connect(&connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        log::debug!("Running migrations");
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct UserRow {
    user_id: i64,
    child_name: String,
    parent_name: String,
    phone: String,
    age: i16,
    age_group: String,
    region: String,
    district: String,
    mahalla: String,
    telegram_username: Option<String>,
    telegram_name: Option<String>,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            user_id: row.user_id,
            child_name: row.child_name,
            parent_name: row.parent_name,
            phone: row.phone,
            age: u8::try_from(row.age).map_err(|_| ValidationError::InvalidAge)?,
            age_group: row.age_group.parse()?,
            region: row.region,
            district: row.district,
            mahalla: row.mahalla,
            telegram_username: row.telegram_username,
            telegram_name: row.telegram_name,
            registered_at: row.registered_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BotUserRow {
    user_id: i64,
    first_name: Option<String>,
    username: Option<String>,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl From<BotUserRow> for BotUser {
    fn from(row: BotUserRow) -> Self {
        BotUser {
            user_id: row.user_id,
            first_name: row.first_name,
            username: row.username,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
        }
    }
}

#[derive(FromRow)]
struct QuestionRow {
    uuid: Uuid,
    text: String,
    options: Json<Vec<String>>,
    correct_option: i16,
    age_group: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = ValidationError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let options = row.options.0;
        let correct_option = usize::try_from(row.correct_option).map_err(|_| {
            ValidationError::CorrectOutOfRange {
                index: 0,
                len: options.len(),
            }
        })?;

        let question =
            NewQuestion::new(row.text, options, correct_option, row.age_group.parse()?)?;
        Ok(question.into_question(row.uuid, row.created_at))
    }
}

#[derive(FromRow)]
struct ResultRow {
    uuid: Uuid,
    user_id: i64,
    age_group: String,
    total_questions: i32,
    correct_answers: i32,
    percentage: f64,
    duration_seconds: i64,
    answers: Json<Vec<AnswerRecord>>,
    completed_at: DateTime<Utc>,
}

impl TryFrom<ResultRow> for TestResult {
    type Error = ValidationError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        Ok(TestResult {
            id: row.uuid,
            user_id: row.user_id,
            age_group: row.age_group.parse()?,
            total_questions: row.total_questions.max(0) as u32,
            correct_answers: row.correct_answers.max(0) as u32,
            percentage: row.percentage,
            duration_seconds: row.duration_seconds,
            answers: row.answers.0,
            completed_at: row.completed_at,
        })
    }
}

#[derive(FromRow)]
struct AdminRow {
    user_id: i64,
    role: String,
    added_by: Option<i64>,
    added_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = ValidationError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        Ok(Admin {
            user_id: row.user_id,
            role: row.role.parse()?,
            added_by: row.added_by,
            added_at: row.added_at,
        })
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    uuid: Uuid,
    user_id: i64,
    text: String,
    phone: Option<String>,
    telegram_username: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct BroadcastRow {
    uuid: Uuid,
    admin_id: i64,
    text: String,
    sent: i32,
    failed: i32,
    created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "user_id, child_name, parent_name, phone, age, age_group, region, \
     district, mahalla, telegram_username, telegram_name, registered_at, updated_at";

const RESULT_COLUMNS: &str = "uuid, user_id, age_group, total_questions, correct_answers, \
     percentage, duration_seconds, answers, completed_at";

impl UserRepository for Connection {
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn save_user(&self, user: User) -> StoreResult<User> {
        log::debug!("Upserting user {}", user.user_id);
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (user_id) DO UPDATE SET \
                child_name = EXCLUDED.child_name, \
                parent_name = EXCLUDED.parent_name, \
                phone = EXCLUDED.phone, \
                age = EXCLUDED.age, \
                age_group = EXCLUDED.age_group, \
                region = EXCLUDED.region, \
                district = EXCLUDED.district, \
                mahalla = EXCLUDED.mahalla, \
                telegram_username = EXCLUDED.telegram_username, \
                telegram_name = EXCLUDED.telegram_name, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.user_id)
        .bind(&user.child_name)
        .bind(&user.parent_name)
        .bind(&user.phone)
        .bind(i16::from(user.age))
        .bind(user.age_group.as_str())
        .bind(&user.region)
        .bind(&user.district)
        .bind(&user.mahalla)
        .bind(&user.telegram_username)
        .bind(&user.telegram_name)
        .bind(user.registered_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(User::try_from(row)?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY registered_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn set_age_group(&self, user_id: i64, age_group: AgeGroup) -> StoreResult<bool> {
        let updated =
            sqlx::query("UPDATE users SET age_group = $1, updated_at = now() WHERE user_id = $2")
                .bind(age_group.as_str())
                .bind(user_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(updated > 0)
    }

    async fn track_bot_user(&self, user: BotUser) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO bot_users (user_id, first_name, username, first_seen, last_seen) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                first_name = EXCLUDED.first_name, \
                username = EXCLUDED.username, \
                last_seen = EXCLUDED.last_seen",
        )
        .bind(user.user_id)
        .bind(&user.first_name)
        .bind(&user.username)
        .bind(user.first_seen)
        .bind(user.last_seen)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_bot_users(&self) -> StoreResult<Vec<BotUser>> {
        let rows = sqlx::query_as::<_, BotUserRow>(
            "SELECT user_id, first_name, username, first_seen, last_seen FROM bot_users",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BotUser::from).collect())
    }
}

impl QuestionRepository for Connection {
    async fn add_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let question = question.into_question(Uuid::new_v4(), Utc::now());
        log::debug!(
            "Adding question {} for age group {}",
            question.id,
            question.age_group
        );

        sqlx::query(
            "INSERT INTO questions (uuid, text, options, correct_option, age_group, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(question.id)
        .bind(&question.text)
        .bind(Json(&question.options))
        .bind(question.correct_option as i16)
        .bind(question.age_group.as_str())
        .bind(question.created_at)
        .execute(&self.pool)
        .await?;

        Ok(question)
    }

    async fn get_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT uuid, text, options, correct_option, age_group, created_at \
             FROM questions WHERE uuid = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Question::try_from).transpose()?)
    }

    async fn questions_by_age(&self, age_group: AgeGroup) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT uuid, text, options, correct_option, age_group, created_at \
             FROM questions WHERE age_group = $1 ORDER BY created_at, uuid",
        )
        .bind(age_group.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM questions WHERE uuid = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn clear_questions(&self, age_group: AgeGroup) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM questions WHERE age_group = $1")
            .bind(age_group.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

impl ResultRepository for Connection {
    async fn save_result(&self, result: NewTestResult) -> StoreResult<TestResult> {
        let result = TestResult::from_new(result, Uuid::new_v4(), Utc::now());

        sqlx::query(&format!(
            "INSERT INTO test_results ({RESULT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(result.id)
        .bind(result.user_id)
        .bind(result.age_group.as_str())
        .bind(result.total_questions as i32)
        .bind(result.correct_answers as i32)
        .bind(result.percentage)
        .bind(result.duration_seconds)
        .bind(Json(&result.answers))
        .bind(result.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(result)
    }

    async fn results_for_user(&self, user_id: i64) -> StoreResult<Vec<TestResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM test_results WHERE user_id = $1 ORDER BY completed_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TestResult::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn list_results(&self) -> StoreResult<Vec<TestResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM test_results ORDER BY completed_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TestResult::try_from)
            .collect::<Result<_, _>>()?)
    }
}

impl AdminRepository for Connection {
    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        let rows = sqlx::query_as::<_, AdminRow>(
            "SELECT user_id, role, added_by, added_at FROM admins ORDER BY added_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(Admin::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn get_admin(&self, user_id: i64) -> StoreResult<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT user_id, role, added_by, added_at FROM admins WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Admin::try_from).transpose()?)
    }

    async fn add_admin(&self, admin: Admin) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO admins (user_id, role, added_by, added_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, added_by = EXCLUDED.added_by",
        )
        .bind(admin.user_id)
        .bind(admin.role.as_str())
        .bind(admin.added_by)
        .bind(admin.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_admin(&self, user_id: i64) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM admins WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn ensure_super_admin(&self, user_id: i64) -> StoreResult<bool> {
        let inserted = sqlx::query(
            "INSERT INTO admins (user_id, role, added_by, added_at) \
             VALUES ($1, 'super_admin', NULL, now()) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }
}

impl FeedbackRepository for Connection {
    async fn save_feedback(&self, feedback: NewFeedback) -> StoreResult<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: feedback.user_id,
            text: feedback.text,
            phone: feedback.phone,
            telegram_username: feedback.telegram_username,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO feedback (uuid, user_id, text, phone, telegram_username, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(&feedback.text)
        .bind(&feedback.phone)
        .bind(&feedback.telegram_username)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        Ok(feedback)
    }

    async fn list_feedback(&self) -> StoreResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            "SELECT uuid, user_id, text, phone, telegram_username, created_at \
             FROM feedback ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Feedback {
                id: row.uuid,
                user_id: row.user_id,
                text: row.text,
                phone: row.phone,
                telegram_username: row.telegram_username,
                created_at: row.created_at,
            })
            .collect())
    }
}

impl BroadcastRepository for Connection {
    async fn save_broadcast(&self, record: BroadcastRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO broadcasts (uuid, admin_id, text, sent, failed, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(record.admin_id)
        .bind(&record.text)
        .bind(record.sent as i32)
        .bind(record.failed as i32)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_broadcasts(&self) -> StoreResult<Vec<BroadcastRecord>> {
        let rows = sqlx::query_as::<_, BroadcastRow>(
            "SELECT uuid, admin_id, text, sent, failed, created_at \
             FROM broadcasts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BroadcastRecord {
                id: row.uuid,
                admin_id: row.admin_id,
                text: row.text,
                sent: row.sent.max(0) as u32,
                failed: row.failed.max(0) as u32,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(options: &[&str], correct_option: i16) -> QuestionRow {
        QuestionRow {
            uuid: Uuid::new_v4(),
            text: "Kitobning bosh qahramoni kim?".to_owned(),
            options: Json(options.iter().map(|o| o.to_string()).collect()),
            correct_option,
            age_group: "7-10".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn question_rows_are_validated_on_read() {
        let question = Question::try_from(row(&["Ali", "Vali"], 1)).unwrap();
        assert_eq!(question.correct_text(), "Vali");

        assert_eq!(
            Question::try_from(row(&["Ali", "Vali"], 2)).unwrap_err(),
            ValidationError::CorrectOutOfRange { index: 2, len: 2 }
        );
        assert!(Question::try_from(row(&["Ali", "Vali"], -1)).is_err());
        assert_eq!(
            Question::try_from(row(&["Ali"], 0)).unwrap_err(),
            ValidationError::OptionCount(1)
        );
    }
}
