use std::{collections::BTreeSet, fmt::Display, future::Future, time::Duration};

use crate::database::models::{BotUser, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: u32,
    pub failed: u32,
}

/// Registered users plus everyone who pressed /start, without duplicates.
pub fn audience(users: &[User], bot_users: &[BotUser]) -> Vec<i64> {
    users
        .iter()
        .map(|u| u.user_id)
        .chain(bot_users.iter().map(|u| u.user_id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Calls `send` for every recipient, pausing `delay` between calls.
/// A failed send is logged and counted; the loop keeps going.
pub async fn deliver<F, Fut, E>(recipients: &[i64], delay: Duration, mut send: F) -> BroadcastReport
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut report = BroadcastReport::default();

    for (i, &chat_id) in recipients.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match send(chat_id).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                log::warn!("Broadcast to {} failed: {}", chat_id, e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "Broadcast finished: {} sent, {} failed",
        report.sent,
        report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use super::*;

    fn bot_user(id: i64) -> BotUser {
        BotUser {
            user_id: id,
            first_name: None,
            username: None,
            first_seen: Utc::now(),
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn audience_is_deduplicated() {
        let ids = audience(&[], &[bot_user(3), bot_user(1), bot_user(3)]);
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn failures_are_counted_without_stopping() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let report = deliver(&[1, 2, 3, 4], Duration::ZERO, move |id| {
            log.lock().unwrap().push(id);
            async move {
                if id % 2 == 0 {
                    Err("blocked by user")
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(report, BroadcastReport { sent: 2, failed: 2 });
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn sends_are_spaced_by_delay() {
        let start = tokio::time::Instant::now();
        let report = deliver(&[1, 2, 3], Duration::from_millis(100), |_| async {
            Ok::<_, String>(())
        })
        .await;

        assert_eq!(report.sent, 3);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
