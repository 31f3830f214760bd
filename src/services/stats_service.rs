//! Derived statistics over a stored snapshot
//!
//! Everything here is a pure function of the snapshot, the day window and
//! the current time.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
    constants::RATING_BUCKET_SIZE,
    handlers::students::response::{ContestHistoryResponse, ProblemStatsResponse, RatingPoint},
    models::{CodeforcesSnapshot, SubmissionRecord},
    utils::{day_key, window_start},
};

/// Statistics service
pub struct StatsService;

impl StatsService {
    /// Contests rated within the last `days` days
    pub fn contest_history(
        snapshot: &CodeforcesSnapshot,
        days: i64,
        now: DateTime<Utc>,
    ) -> ContestHistoryResponse {
        let cutoff = window_start(now, days);

        let mut contests: Vec<_> = snapshot
            .contests
            .iter()
            .filter(|c| c.date >= cutoff)
            .cloned()
            .collect();
        contests.sort_by(|a, b| b.date.cmp(&a.date));

        let rating_points = contests
            .iter()
            .rev()
            .map(|c| RatingPoint {
                contest_id: c.contest_id,
                contest_name: c.contest_name.clone(),
                date: c.date,
                new_rating: c.new_rating,
            })
            .collect();

        ContestHistoryResponse {
            handle: snapshot.handle.clone(),
            rating: snapshot.rating,
            max_rating: snapshot.max_rating,
            rank: snapshot.rank.clone(),
            contests,
            rating_points,
        }
    }

    /// Problems solved within the last `days` days
    pub fn problem_stats(
        snapshot: &CodeforcesSnapshot,
        days: i64,
        now: DateTime<Utc>,
    ) -> ProblemStatsResponse {
        let cutoff = window_start(now, days);
        let solved = first_accepted(&snapshot.submissions, cutoff);

        let mut most_difficult: Option<&SubmissionRecord> = None;
        for sub in &solved {
            let rating = sub.problem.rating.unwrap_or(0);
            if most_difficult.is_none_or(|best| rating > best.problem.rating.unwrap_or(0)) {
                most_difficult = Some(sub);
            }
        }

        let rated: Vec<i32> = solved.iter().filter_map(|s| s.problem.rating).collect();
        let average_rating = if rated.is_empty() {
            0
        } else {
            let sum: i64 = rated.iter().map(|&r| r as i64).sum();
            (sum as f64 / rated.len() as f64).round() as i32
        };

        let mut problems_by_rating = BTreeMap::new();
        let mut submission_heatmap = BTreeMap::new();
        for sub in &solved {
            *problems_by_rating
                .entry(rating_bucket(sub.problem.rating.unwrap_or(0)))
                .or_insert(0) += 1;
            *submission_heatmap
                .entry(day_key(sub.submitted_at))
                .or_insert(0) += 1;
        }

        let per_day = solved.len() as f64 / days.max(1) as f64;

        ProblemStatsResponse {
            most_difficult_problem: most_difficult.map(|s| s.problem.clone()),
            total_problems_solved: solved.len(),
            average_rating,
            average_problems_per_day: (per_day * 100.0).round() / 100.0,
            problems_by_rating,
            submission_heatmap,
        }
    }
}

/// Earliest accepted submission per problem at or after `cutoff`, oldest first
fn first_accepted(submissions: &[SubmissionRecord], cutoff: DateTime<Utc>) -> Vec<&SubmissionRecord> {
    let mut accepted: Vec<&SubmissionRecord> = submissions
        .iter()
        .filter(|s| s.is_accepted() && s.submitted_at >= cutoff)
        .collect();
    accepted.sort_by_key(|s| (s.submitted_at, s.submission_id));

    let mut seen = HashSet::new();
    accepted
        .into_iter()
        .filter(|s| seen.insert(s.problem.key()))
        .collect()
}

/// Floor a rating to its bucket
fn rating_bucket(rating: i32) -> i32 {
    rating.div_euclid(RATING_BUCKET_SIZE) * RATING_BUCKET_SIZE
}
