use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Utc};
use teloxide::utils::html::escape;

use crate::database::models::{AgeGroup, TestResult, User};
use crate::quiz::HIGH_SCORE_PERCENTAGE;

pub const TOP_PERFORMERS: usize = 10;
/// Districts listed under each region in the statistics message.
pub const DISTRICTS_PER_REGION: usize = 3;
/// Telegram's text limit for a single message.
pub const MESSAGE_LIMIT: usize = 4096;

const TASHKENT_OFFSET_SECS: i32 = 5 * 3600;

/// Formats a timestamp in Tashkent time (UTC+5).
pub fn format_time(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(TASHKENT_OFFSET_SECS) {
        Some(tz) => at.with_timezone(&tz).format("%d.%m.%Y %H:%M").to_string(),
        None => at.format("%d.%m.%Y %H:%M").to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionCount {
    pub name: String,
    pub users: usize,
    pub percentage: f64,
    /// Sorted like regions: count descending, then name.
    pub districts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopPerformer {
    pub user_id: i64,
    pub child_name: String,
    pub region: String,
    pub age_group: AgeGroup,
    pub percentage: f64,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total_users: usize,
    pub users_by_age: BTreeMap<AgeGroup, usize>,
    pub regions: Vec<RegionCount>,
    pub questions_by_age: BTreeMap<AgeGroup, usize>,
    pub tests_taken: usize,
    pub average_percentage: f64,
    pub average_by_age: BTreeMap<AgeGroup, f64>,
    /// Users whose best attempt reached the high-score mark.
    pub high_scorers: usize,
    pub top_performers: Vec<TopPerformer>,
}

fn sorted_counts(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_owned(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn is_better(candidate: &TestResult, current: &TestResult) -> bool {
    candidate.percentage > current.percentage
        || (candidate.percentage == current.percentage
            && candidate.duration_seconds < current.duration_seconds)
}

/// Best attempt of every user that has at least one result.
pub fn best_results(results: &[TestResult]) -> HashMap<i64, &TestResult> {
    let mut best: HashMap<i64, &TestResult> = HashMap::new();
    for result in results {
        let replace = best
            .get(&result.user_id)
            .map_or(true, |current| is_better(result, current));
        if replace {
            best.insert(result.user_id, result);
        }
    }
    best
}

impl Statistics {
    pub fn compute(
        users: &[User],
        results: &[TestResult],
        questions_by_age: BTreeMap<AgeGroup, usize>,
    ) -> Self {
        let mut users_by_age: BTreeMap<AgeGroup, usize> =
            AgeGroup::ALL.iter().map(|g| (*g, 0)).collect();
        let mut region_counts: HashMap<&str, usize> = HashMap::new();
        let mut district_counts: HashMap<&str, HashMap<&str, usize>> = HashMap::new();

        for user in users {
            *users_by_age.entry(user.age_group).or_default() += 1;
            *region_counts.entry(user.region.as_str()).or_default() += 1;
            *district_counts
                .entry(user.region.as_str())
                .or_default()
                .entry(user.district.as_str())
                .or_default() += 1;
        }

        let regions = sorted_counts(region_counts)
            .into_iter()
            .map(|(name, n)| RegionCount {
                districts: district_counts
                    .remove(name.as_str())
                    .map(sorted_counts)
                    .unwrap_or_default(),
                percentage: share(n, users.len()),
                users: n,
                name,
            })
            .collect();

        let average_percentage = if results.is_empty() {
            0.0
        } else {
            round2(results.iter().map(|r| r.percentage).sum::<f64>() / results.len() as f64)
        };

        let average_by_age = AgeGroup::ALL
            .iter()
            .filter_map(|group| {
                let scores: Vec<f64> = results
                    .iter()
                    .filter(|r| r.age_group == *group)
                    .map(|r| r.percentage)
                    .collect();
                (!scores.is_empty())
                    .then(|| (*group, round2(scores.iter().sum::<f64>() / scores.len() as f64)))
            })
            .collect();

        let best = best_results(results);
        let high_scorers = best
            .values()
            .filter(|r| r.percentage >= HIGH_SCORE_PERCENTAGE)
            .count();

        let users_by_id: HashMap<i64, &User> = users.iter().map(|u| (u.user_id, u)).collect();
        let mut top_performers: Vec<TopPerformer> = best
            .values()
            .filter_map(|result| {
                let user = users_by_id.get(&result.user_id)?;
                Some(TopPerformer {
                    user_id: user.user_id,
                    child_name: user.child_name.clone(),
                    region: user.region.clone(),
                    age_group: result.age_group,
                    percentage: result.percentage,
                    duration_seconds: result.duration_seconds,
                })
            })
            .collect();
        top_performers.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.duration_seconds.cmp(&b.duration_seconds))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        top_performers.truncate(TOP_PERFORMERS);

        Self {
            total_users: users.len(),
            users_by_age,
            regions,
            questions_by_age,
            tests_taken: results.len(),
            average_percentage,
            average_by_age,
            high_scorers,
            top_performers,
        }
    }
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut text = String::from("📊 <b>Statistika</b>\n\n");

    text.push_str(&format!("👥 Jami foydalanuvchilar: <b>{}</b>\n", stats.total_users));
    for (group, n) in &stats.users_by_age {
        text.push_str(&format!("   • {}: {}\n", group.label(), n));
    }

    text.push_str("\n❓ Savollar:\n");
    for group in AgeGroup::ALL {
        let n = stats.questions_by_age.get(&group).copied().unwrap_or_default();
        text.push_str(&format!("   • {}: {}\n", group.label(), n));
    }

    text.push_str(&format!("\n📝 Topshirilgan testlar: <b>{}</b>\n", stats.tests_taken));
    text.push_str(&format!("📈 O'rtacha natija: <b>{:.2}%</b>\n", stats.average_percentage));
    for (group, avg) in &stats.average_by_age {
        text.push_str(&format!("   • {}: {:.2}%\n", group.label(), avg));
    }
    text.push_str(&format!(
        "🏅 {}% va undan yuqori natija: <b>{}</b>\n",
        HIGH_SCORE_PERCENTAGE, stats.high_scorers
    ));

    if !stats.regions.is_empty() {
        text.push_str("\n🌍 <b>Viloyatlar bo'yicha:</b>\n");
        for region in &stats.regions {
            text.push_str(&format!(
                "• {}: {} ({:.1}%)\n",
                escape(&region.name),
                region.users,
                region.percentage
            ));
            for (district, n) in region.districts.iter().take(DISTRICTS_PER_REGION) {
                text.push_str(&format!("   ◦ {}: {}\n", escape(district), n));
            }
            if region.districts.len() > DISTRICTS_PER_REGION {
                text.push_str(&format!(
                    "   ◦ ... va yana {} ta tuman\n",
                    region.districts.len() - DISTRICTS_PER_REGION
                ));
            }
        }
    }

    if !stats.top_performers.is_empty() {
        text.push_str("\n🏆 <b>Eng yaxshi natijalar:</b>\n");
        for (i, top) in stats.top_performers.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} ({}, {}) — {:.0}%, {} s\n",
                i + 1,
                escape(&top.child_name),
                escape(&top.region),
                top.age_group,
                top.percentage,
                top.duration_seconds
            ));
        }
    }

    text
}

/// Splits `text` on line boundaries into chunks of at most `limit` characters.
/// A single line longer than `limit` is cut.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let mut line = line;
        let mut line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while line_len > limit {
            let cut = line
                .char_indices()
                .nth(limit)
                .map_or(line.len(), |(i, _)| i);
            chunks.push(line[..cut].to_owned());
            line = &line[cut..];
            line_len -= limit;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Short overview for the admin users list: totals, top regions and the newest registrations.
pub fn render_users_overview(stats: &Statistics, newest_first: &[User]) -> String {
    let mut text = format!(
        "👥 <b>Foydalanuvchilar ro'yxati</b>\n\nJami: <b>{}</b>\n",
        stats.total_users
    );
    for (group, n) in &stats.users_by_age {
        text.push_str(&format!("   • {}: {}\n", group.label(), n));
    }

    if !stats.regions.is_empty() {
        text.push_str("\n🌍 Top viloyatlar:\n");
        for region in stats.regions.iter().take(5) {
            text.push_str(&format!("• {}: {}\n", escape(&region.name), region.users));
        }
    }

    if !newest_first.is_empty() {
        text.push_str("\n🆕 Oxirgi ro'yxatdan o'tganlar:\n");
        for user in newest_first.iter().take(10) {
            text.push_str(&format!(
                "• {} ({} yosh), {} — <code>{}</code>\n",
                escape(&user.child_name),
                user.age,
                escape(&user.region),
                user.user_id
            ));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn user(id: i64, name: &str, region: &str, district: &str, group: AgeGroup) -> User {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        User {
            user_id: id,
            child_name: name.into(),
            parent_name: "Ota".into(),
            phone: "998901234567".into(),
            age: if group == AgeGroup::SevenToTen { 8 } else { 12 },
            age_group: group,
            region: region.into(),
            district: district.into(),
            mahalla: "Markaziy".into(),
            telegram_username: None,
            telegram_name: None,
            registered_at: at,
            updated_at: at,
        }
    }

    fn result(user_id: i64, group: AgeGroup, percentage: f64, duration: i64) -> TestResult {
        TestResult {
            id: Uuid::new_v4(),
            user_id,
            age_group: group,
            total_questions: 25,
            correct_answers: (percentage / 4.0) as u32,
            percentage,
            duration_seconds: duration,
            answers: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn empty_data_gives_zeroes() {
        let stats = Statistics::compute(&[], &[], BTreeMap::new());
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert!(stats.regions.is_empty());
        assert!(stats.top_performers.is_empty());
        assert_eq!(stats.users_by_age.get(&AgeGroup::SevenToTen), Some(&0));
    }

    #[test]
    fn regions_sorted_by_count_then_name() {
        let users = vec![
            user(1, "Ali", "Buxoro", "Kogon", AgeGroup::SevenToTen),
            user(2, "Vali", "Andijon", "Asaka", AgeGroup::SevenToTen),
            user(3, "Gani", "Buxoro", "Kogon", AgeGroup::ElevenToFourteen),
            user(4, "Soli", "Xorazm", "Xiva", AgeGroup::ElevenToFourteen),
        ];
        let stats = Statistics::compute(&users, &[], BTreeMap::new());

        let names: Vec<_> = stats.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Buxoro", "Andijon", "Xorazm"]);
        assert_eq!(stats.regions[0].percentage, 50.0);
        assert_eq!(stats.regions[0].districts, vec![("Kogon".to_owned(), 2)]);
        assert_eq!(stats.users_by_age[&AgeGroup::ElevenToFourteen], 2);
    }

    #[test]
    fn averages_and_top_performers_use_best_attempt() {
        let users = vec![
            user(1, "Ali", "Buxoro", "Kogon", AgeGroup::SevenToTen),
            user(2, "Vali", "Andijon", "Asaka", AgeGroup::ElevenToFourteen),
            user(3, "Gani", "Buxoro", "Kogon", AgeGroup::ElevenToFourteen),
        ];
        let results = vec![
            result(1, AgeGroup::SevenToTen, 40.0, 300),
            result(1, AgeGroup::SevenToTen, 88.0, 200),
            result(2, AgeGroup::ElevenToFourteen, 88.0, 150),
            result(3, AgeGroup::ElevenToFourteen, 65.0, 100),
        ];
        let stats = Statistics::compute(&users, &results, BTreeMap::new());

        assert_eq!(stats.tests_taken, 4);
        assert_eq!(stats.average_percentage, 70.25);
        assert_eq!(stats.average_by_age[&AgeGroup::SevenToTen], 64.0);
        assert_eq!(stats.average_by_age[&AgeGroup::ElevenToFourteen], 76.5);
        assert_eq!(stats.high_scorers, 2);

        let order: Vec<_> = stats.top_performers.iter().map(|t| t.user_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(stats.top_performers[1].percentage, 88.0);
    }

    #[test]
    fn rendering_escapes_names() {
        let users = vec![user(1, "<Ali>", "Buxoro", "Kogon", AgeGroup::SevenToTen)];
        let results = vec![result(1, AgeGroup::SevenToTen, 90.0, 60)];
        let stats = Statistics::compute(&users, &results, BTreeMap::new());

        let text = render_statistics(&stats);
        assert!(text.contains("&lt;Ali&gt;"));
        assert!(text.contains("Buxoro"));

        let overview = render_users_overview(&stats, &users);
        assert!(overview.contains("Jami: <b>1</b>"));
    }

    #[test]
    fn nationwide_statistics_fit_one_message() {
        let mut users = Vec::new();
        let mut results = Vec::new();
        for region in crate::regions::region_names() {
            for district in crate::regions::districts(region) {
                let id = users.len() as i64 + 1;
                users.push(user(id, "Bola Bolajonov", region, district, AgeGroup::SevenToTen));
                results.push(result(id, AgeGroup::SevenToTen, 90.0, 120));
            }
        }
        assert!(users.len() > 150);

        let stats = Statistics::compute(&users, &results, BTreeMap::new());
        let text = render_statistics(&stats);
        assert!(text.chars().count() <= MESSAGE_LIMIT, "{} chars", text.chars().count());
        assert!(text.contains("... va yana"));
    }

    #[test]
    fn long_text_splits_on_lines() {
        let text = "abcdef\n".repeat(10);
        let chunks = split_message(&text, 15);
        assert!(chunks.iter().all(|c| c.chars().count() <= 15));
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[0], "abcdef\nabcdef\n");

        let long = "я".repeat(25);
        let chunks = split_message(&long, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), long);
    }

    #[test]
    fn time_is_shown_in_tashkent() {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 20, 30, 0).unwrap();
        assert_eq!(format_time(at), "02.08.2025 01:30");
    }
}
