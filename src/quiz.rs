use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};

use crate::database::models::{AgeGroup, AnswerRecord, NewTestResult, Question};

pub const HIGH_SCORE_PERCENTAGE: f64 = 70.0;

/// Picks up to `n` distinct questions from `pool` in random order.
pub fn sample_questions<R: Rng + ?Sized>(pool: &[Question], n: usize, rng: &mut R) -> Vec<Question> {
    pool.choose_multiple(rng, n.min(pool.len()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

/// Counts `chosen[i] == key[i]`. Missing answers score nothing.
pub fn score(chosen: &[Option<usize>], key: &[usize]) -> Score {
    let total = key.len() as u32;
    let correct = key
        .iter()
        .enumerate()
        .filter(|(i, correct)| chosen.get(*i).copied().flatten() == Some(**correct))
        .count() as u32;
    let percentage = if total == 0 {
        0.0
    } else {
        (f64::from(correct) * 100.0 / f64::from(total)).round()
    };

    Score {
        correct,
        total,
        percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Good,
    ReadMore,
}

impl Grade {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "🏆 Ajoyib natija! Tabriklaymiz!",
            Self::Good => "👍 Yaxshi natija! Davom eting!",
            Self::ReadMore => "📚 Qo'shimcha o'qish tavsiya etiladi.",
        }
    }
}

pub fn grade(percentage: f64) -> Grade {
    if percentage >= 80.0 {
        Grade::Excellent
    } else if percentage >= 60.0 {
        Grade::Good
    } else {
        Grade::ReadMore
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    TimedOut,
    Skipped,
    /// The callback points at a question other than the current one.
    Stale,
    InvalidOption,
}

/// A quiz attempt in progress. Lives inside the dialogue state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    user_id: i64,
    age_group: AgeGroup,
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
    shown_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn start(
        user_id: i64,
        age_group: AgeGroup,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            age_group,
            answers: Vec::with_capacity(questions.len()),
            questions,
            started_at: now,
            shown_at: now,
        }
    }

    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 0-based index of the question being asked.
    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index())
    }

    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    pub fn correct_so_far(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }

    pub fn answer(
        &mut self,
        index: usize,
        option: usize,
        now: DateTime<Utc>,
        limit: Duration,
    ) -> AnswerOutcome {
        if index != self.current_index() {
            return AnswerOutcome::Stale;
        }
        let Some(question) = self.current_question() else {
            return AnswerOutcome::Stale;
        };
        if option >= question.options.len() {
            return AnswerOutcome::InvalidOption;
        }

        let elapsed = (now - self.shown_at).to_std().unwrap_or_default();
        let timed_out = elapsed > limit;
        let correct = !timed_out && option == question.correct_option;
        let record = AnswerRecord {
            question_id: question.id,
            chosen: (!timed_out).then_some(option),
            correct,
            timed_out,
            seconds_taken: elapsed.as_secs() as i64,
        };
        self.advance(record, now);

        if timed_out {
            AnswerOutcome::TimedOut
        } else if correct {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        }
    }

    pub fn skip(&mut self, index: usize, now: DateTime<Utc>) -> AnswerOutcome {
        if index != self.current_index() {
            return AnswerOutcome::Stale;
        }
        let Some(question) = self.current_question() else {
            return AnswerOutcome::Stale;
        };

        let record = AnswerRecord {
            question_id: question.id,
            chosen: None,
            correct: false,
            timed_out: false,
            seconds_taken: (now - self.shown_at).num_seconds().max(0),
        };
        self.advance(record, now);
        AnswerOutcome::Skipped
    }

    fn advance(&mut self, record: AnswerRecord, now: DateTime<Utc>) {
        self.answers.push(record);
        self.shown_at = now;
    }

    /// Grades the attempt. Unanswered questions count as wrong.
    pub fn finish(self, now: DateTime<Utc>) -> NewTestResult {
        let chosen: Vec<Option<usize>> = self.answers.iter().map(|a| a.chosen).collect();
        let key: Vec<usize> = self.questions.iter().map(|q| q.correct_option).collect();
        let score = score(&chosen, &key);

        NewTestResult {
            user_id: self.user_id,
            age_group: self.age_group,
            total_questions: score.total,
            correct_answers: score.correct,
            percentage: score.percentage,
            duration_seconds: (now - self.started_at).num_seconds().max(0),
            answers: self.answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rand::{rngs::StdRng, SeedableRng};
    use uuid::Uuid;

    use super::*;

    const LIMIT: Duration = Duration::from_secs(20);

    fn question(correct: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "Kitob qahramoni kim?".to_owned(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: correct,
            age_group: AgeGroup::SevenToTen,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sample_is_distinct_and_bounded() {
        let pool: Vec<_> = (0..30).map(|i| question(i % 4)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let sample = sample_questions(&pool, 25, &mut rng);
        assert_eq!(sample.len(), 25);
        let mut ids: Vec<_> = sample.iter().map(|q| q.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);

        assert_eq!(sample_questions(&pool[..3], 25, &mut rng).len(), 3);
        assert!(sample_questions(&[], 25, &mut rng).is_empty());
    }

    #[test]
    fn score_rounds_percentage() {
        let s = score(&[Some(0), Some(1), None], &[0, 2, 1]);
        assert_eq!(s.correct, 1);
        assert_eq!(s.total, 3);
        assert_eq!(s.percentage, 33.0);

        assert_eq!(score(&[Some(1), Some(1), Some(0)], &[1, 1, 2]).percentage, 67.0);
        assert_eq!(score(&[], &[]).percentage, 0.0);
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(grade(100.0), Grade::Excellent);
        assert_eq!(grade(80.0), Grade::Excellent);
        assert_eq!(grade(79.0), Grade::Good);
        assert_eq!(grade(60.0), Grade::Good);
        assert_eq!(grade(59.0), Grade::ReadMore);
    }

    #[test]
    fn session_walks_through_questions() {
        let t0 = Utc::now();
        let questions = vec![question(0), question(1), question(2)];
        let mut session = QuizSession::start(1, AgeGroup::SevenToTen, questions, t0);

        assert_eq!(session.answer(0, 0, t0 + TimeDelta::seconds(3), LIMIT), AnswerOutcome::Correct);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answer(1, 3, t0 + TimeDelta::seconds(5), LIMIT), AnswerOutcome::Incorrect);
        assert_eq!(session.skip(2, t0 + TimeDelta::seconds(6)), AnswerOutcome::Skipped);
        assert!(session.is_finished());

        let result = session.finish(t0 + TimeDelta::seconds(10));
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.percentage, 33.0);
        assert_eq!(result.duration_seconds, 10);
        assert_eq!(result.answers.len(), 3);
        assert_eq!(result.answers[1].seconds_taken, 2);
    }

    #[test]
    fn late_answer_counts_as_timed_out() {
        let t0 = Utc::now();
        let mut session = QuizSession::start(1, AgeGroup::SevenToTen, vec![question(0)], t0);

        let outcome = session.answer(0, 0, t0 + TimeDelta::seconds(21), LIMIT);
        assert_eq!(outcome, AnswerOutcome::TimedOut);

        let result = session.finish(t0 + TimeDelta::seconds(21));
        assert_eq!(result.correct_answers, 0);
        assert!(result.answers[0].timed_out);
        assert_eq!(result.answers[0].chosen, None);
    }

    #[test]
    fn stale_and_invalid_callbacks_do_not_advance() {
        let t0 = Utc::now();
        let mut session =
            QuizSession::start(1, AgeGroup::SevenToTen, vec![question(0), question(1)], t0);

        assert_eq!(session.answer(1, 0, t0, LIMIT), AnswerOutcome::Stale);
        assert_eq!(session.answer(0, 9, t0, LIMIT), AnswerOutcome::InvalidOption);
        assert_eq!(session.current_index(), 0);

        session.answer(0, 0, t0, LIMIT);
        assert_eq!(session.answer(0, 0, t0, LIMIT), AnswerOutcome::Stale);
        assert_eq!(session.correct_so_far(), 1);
    }
}
