use std::time::Duration;

use chrono::{TimeZone, Utc};
use kitobxonbot::database::{
    json_store::JsonStore,
    models::{
        Admin, AdminRole, AgeGroup, AnswerRecord, BotUser, BroadcastRecord, NewFeedback,
        NewQuestion, NewTestResult, User,
    },
    repository::{
        AdminRepository, BroadcastRepository, FeedbackRepository, QuestionRepository,
        ResultRepository, UserRepository,
    },
};
use uuid::Uuid;

fn user(user_id: i64, child_name: &str) -> User {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    User {
        user_id,
        child_name: child_name.to_owned(),
        parent_name: "Karimov Anvar".to_owned(),
        phone: "998901234567".to_owned(),
        age: 9,
        age_group: AgeGroup::SevenToTen,
        region: "Toshkent shahri".to_owned(),
        district: "Bektemir".to_owned(),
        mahalla: "Kuyluk".to_owned(),
        telegram_username: Some("anvar".to_owned()),
        telegram_name: None,
        registered_at: at,
        updated_at: at,
    }
}

fn question(text: &str, age_group: AgeGroup) -> NewQuestion {
    NewQuestion::new(
        text,
        vec!["Bir".to_owned(), "Ikki".to_owned(), "Uch".to_owned()],
        1,
        age_group,
    )
    .unwrap()
}

fn result(user_id: i64, correct: u32) -> NewTestResult {
    NewTestResult {
        user_id,
        age_group: AgeGroup::SevenToTen,
        total_questions: 2,
        correct_answers: correct,
        percentage: f64::from(correct) * 50.0,
        duration_seconds: 31,
        answers: vec![AnswerRecord {
            question_id: Uuid::new_v4(),
            chosen: Some(0),
            correct: correct > 0,
            timed_out: false,
            seconds_taken: 12,
        }],
    }
}

#[tokio::test]
async fn re_registration_keeps_original_date() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();

    let first = user(1, "Ali");
    store.save_user(first.clone()).await.unwrap();

    let mut again = user(1, "Alisher");
    again.registered_at = Utc::now();
    again.age_group = AgeGroup::ElevenToFourteen;
    let saved = store.save_user(again).await.unwrap();

    assert_eq!(saved.registered_at, first.registered_at);
    let stored = store.get_user(1).await.unwrap().unwrap();
    assert_eq!(stored.child_name, "Alisher");
    assert_eq!(stored.age_group, AgeGroup::ElevenToFourteen);
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn data_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = JsonStore::open(dir.path()).await.unwrap();
        store.save_user(user(7, "Madina")).await.unwrap();
        store
            .add_question(question("Kitob muallifi kim edi?", AgeGroup::SevenToTen))
            .await
            .unwrap();
    }

    let store = JsonStore::open(dir.path()).await.unwrap();
    assert_eq!(store.get_user(7).await.unwrap().unwrap().child_name, "Madina");
    let questions = store.questions_by_age(AgeGroup::SevenToTen).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].correct_text(), "Ikki");
}

#[tokio::test]
async fn questions_keep_creation_order_and_clear_by_group() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();

    for text in ["Birinchi savol matni?", "Ikkinchi savol matni?", "Uchinchi savol matni?"] {
        store
            .add_question(question(text, AgeGroup::SevenToTen))
            .await
            .unwrap();
    }
    store
        .add_question(question("Katta guruh uchun savol?", AgeGroup::ElevenToFourteen))
        .await
        .unwrap();

    let young = store.questions_by_age(AgeGroup::SevenToTen).await.unwrap();
    let texts: Vec<_> = young.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(
        texts,
        ["Birinchi savol matni?", "Ikkinchi savol matni?", "Uchinchi savol matni?"]
    );

    assert!(store.delete_question(young[1].id).await.unwrap());
    assert!(!store.delete_question(young[1].id).await.unwrap());
    assert!(store.get_question(young[1].id).await.unwrap().is_none());

    assert_eq!(store.clear_questions(AgeGroup::SevenToTen).await.unwrap(), 2);
    assert!(store
        .questions_by_age(AgeGroup::SevenToTen)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        store
            .questions_by_age(AgeGroup::ElevenToFourteen)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn results_are_newest_first_and_removed_with_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    store.save_user(user(3, "Zarina")).await.unwrap();
    store.save_user(user(4, "Bobur")).await.unwrap();

    store.save_result(result(3, 1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let latest = store.save_result(result(3, 2)).await.unwrap();
    store.save_result(result(4, 0)).await.unwrap();

    let mine = store.results_for_user(3).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, latest.id);
    assert_eq!(mine[0].answers.len(), 1);

    assert!(store.delete_user(3).await.unwrap());
    assert!(!store.delete_user(3).await.unwrap());
    assert!(store.results_for_user(3).await.unwrap().is_empty());
    assert_eq!(store.list_results().await.unwrap().len(), 1);
}

#[tokio::test]
async fn age_group_can_be_changed() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    store.save_user(user(5, "Sardor")).await.unwrap();

    assert!(store
        .set_age_group(5, AgeGroup::ElevenToFourteen)
        .await
        .unwrap());
    assert!(!store.set_age_group(99, AgeGroup::SevenToTen).await.unwrap());
    assert_eq!(
        store.get_user(5).await.unwrap().unwrap().age_group,
        AgeGroup::ElevenToFourteen
    );
}

#[tokio::test]
async fn super_admin_is_seeded_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();

    assert!(store.ensure_super_admin(100).await.unwrap());
    assert!(!store.ensure_super_admin(100).await.unwrap());

    store
        .add_admin(Admin {
            user_id: 200,
            role: AdminRole::Admin,
            added_by: Some(100),
            added_at: Utc::now(),
        })
        .await
        .unwrap();

    let admins = store.list_admins().await.unwrap();
    assert_eq!(admins.len(), 2);
    assert_eq!(
        store.get_admin(100).await.unwrap().unwrap().role,
        AdminRole::SuperAdmin
    );

    assert!(store.remove_admin(200).await.unwrap());
    assert!(!store.remove_admin(200).await.unwrap());
}

#[tokio::test]
async fn bot_users_are_tracked_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    let first_seen = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    store
        .track_bot_user(BotUser {
            user_id: 9,
            first_name: Some("Nodir".to_owned()),
            username: None,
            first_seen,
            last_seen: first_seen,
        })
        .await
        .unwrap();
    let now = Utc::now();
    store
        .track_bot_user(BotUser {
            user_id: 9,
            first_name: Some("Nodir".to_owned()),
            username: Some("nodir".to_owned()),
            first_seen: now,
            last_seen: now,
        })
        .await
        .unwrap();

    let seen = store.list_bot_users().await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].first_seen, first_seen);
    assert_eq!(seen[0].username.as_deref(), Some("nodir"));
}

#[tokio::test]
async fn feedback_and_broadcasts_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();

    let feedback = store
        .save_feedback(NewFeedback {
            user_id: 11,
            text: "Bot juda yoqdi, rahmat!".to_owned(),
            phone: Some("998901112233".to_owned()),
            telegram_username: None,
        })
        .await
        .unwrap();
    assert_eq!(feedback.user_id, 11);
    assert_eq!(store.list_feedback().await.unwrap().len(), 1);

    store
        .save_broadcast(BroadcastRecord {
            id: Uuid::new_v4(),
            admin_id: 100,
            text: "Yangi savollar qo'shildi".to_owned(),
            sent: 10,
            failed: 2,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    let broadcasts = store.list_broadcasts().await.unwrap();
    assert_eq!(broadcasts.len(), 1);
    assert_eq!((broadcasts[0].sent, broadcasts[0].failed), (10, 2));
}
