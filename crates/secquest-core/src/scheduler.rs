// Copyright 2025 The secquest Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The spaced repetition scheduler.
//!
//! Each question carries an ease factor that grows with correct answers and
//! shrinks with mistakes. A correct answer schedules the next review after a
//! base interval (which lengthens as the question is seen more often) scaled by
//! the ease factor. A mistake brings the question back the next day.

use std::collections::BTreeMap;

use crate::types::mastery::MAX_EASE;
use crate::types::mastery::MIN_EASE;
use crate::types::mastery::MasteryState;
use crate::types::mastery::MasteryStatus;
use crate::types::timestamp::Timestamp;

/// Mastery state keyed by question id.
pub type MasteryMap = BTreeMap<String, MasteryState>;

const EASE_STEP_CORRECT: f64 = 0.1;
const EASE_STEP_WRONG: f64 = 0.2;

/// Correct answers needed before a question can be mastered.
const MASTERY_MIN_CORRECT: u32 = 5;

/// Accuracy needed before a question can be mastered.
const MASTERY_MIN_ACCURACY: f64 = 0.8;

/// A question seen this many times graduates from learning to review.
const REVIEW_MIN_SEEN: u32 = 3;

/// Return the stored state for `question_id`, or a fresh one.
pub fn get_or_create(question_id: &str, mastery: &MasteryMap) -> MasteryState {
    mastery
        .get(question_id)
        .cloned()
        .unwrap_or_else(|| MasteryState::new(question_id))
}

/// The base review interval in days for a question seen `seen` times.
fn base_interval(seen: u32) -> f64 {
    match seen {
        0..=2 => 1.0,
        3..=4 => 3.0,
        _ => 7.0,
    }
}

fn status_for(seen: u32, correct: u32) -> MasteryStatus {
    let accuracy = correct as f64 / seen as f64;
    if correct >= MASTERY_MIN_CORRECT && accuracy >= MASTERY_MIN_ACCURACY {
        MasteryStatus::Mastered
    } else if seen >= REVIEW_MIN_SEEN {
        MasteryStatus::Review
    } else {
        MasteryStatus::Learning
    }
}

/// Record an answer and schedule the next review.
pub fn update_mastery(state: &MasteryState, correct: bool, now: Timestamp) -> MasteryState {
    let seen = state.times_seen + 1;
    let times_correct = state.times_correct + u32::from(correct);

    let (ease, interval_days) = if correct {
        let ease = f64::min(MAX_EASE, state.ease_factor + EASE_STEP_CORRECT);
        let interval = (base_interval(seen) * ease).round() as i64;
        (ease, interval)
    } else {
        let ease = f64::max(MIN_EASE, state.ease_factor - EASE_STEP_WRONG);
        (ease, 1)
    };

    MasteryState {
        question_id: state.question_id.clone(),
        times_seen: seen,
        times_correct,
        last_seen: Some(now),
        next_due: Some(now.plus_days(interval_days)),
        ease_factor: ease,
        status: status_for(seen, times_correct),
    }
}

/// Up to `limit` ids of unmastered questions that are due at `now`, soonest first.
pub fn due_question_ids(mastery: &MasteryMap, limit: usize, now: Timestamp) -> Vec<String> {
    let mut due: Vec<&MasteryState> = mastery
        .values()
        .filter(|m| m.status != MasteryStatus::Mastered && m.is_due(now))
        .collect();
    due.sort_by_key(|m| m.next_due);
    due.into_iter()
        .take(limit)
        .map(|m| m.question_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::mastery::INITIAL_EASE;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn feq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_get_or_create_fresh() {
        let state = get_or_create("q1", &MasteryMap::new());
        assert_eq!(state.question_id, "q1");
        assert_eq!(state.status, MasteryStatus::New);
        assert_eq!(state.ease_factor, INITIAL_EASE);
        assert_eq!(state.times_seen, 0);
    }

    #[test]
    fn test_get_or_create_existing() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut map = MasteryMap::new();
        let updated = update_mastery(&MasteryState::new("q1"), true, now);
        map.insert("q1".to_string(), updated.clone());
        assert_eq!(get_or_create("q1", &map), updated);
    }

    #[test]
    fn test_first_correct_answer() {
        let now = ts("2024-01-01T12:00:00.000");
        let state = update_mastery(&MasteryState::new("q1"), true, now);
        assert_eq!(state.times_seen, 1);
        assert_eq!(state.times_correct, 1);
        assert!(feq(state.ease_factor, 2.6));
        // round(1 * 2.6) = 3 days.
        assert_eq!(state.next_due, Some(ts("2024-01-04T12:00:00.000")));
        assert_eq!(state.last_seen, Some(now));
        assert_eq!(state.status, MasteryStatus::Learning);
    }

    #[test]
    fn test_wrong_answer_resets_interval() {
        let now = ts("2024-01-01T12:00:00.000");
        let state = update_mastery(&MasteryState::new("q1"), false, now);
        assert!(feq(state.ease_factor, 2.3));
        assert_eq!(state.next_due, Some(ts("2024-01-02T12:00:00.000")));
        assert_eq!(state.status, MasteryStatus::Learning);
    }

    #[test]
    fn test_interval_grows_with_seen_count() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        let mut intervals = Vec::new();
        for _ in 0..6 {
            state = update_mastery(&state, true, now);
            let due = state.next_due.unwrap();
            intervals.push((due.into_inner() - now.into_inner()).num_days());
        }
        // Ease climbs 2.6, 2.7, 2.8, 2.9, 3.0, 3.0.
        assert_eq!(intervals, vec![3, 3, 8, 9, 21, 21]);
    }

    #[test]
    fn test_ease_ceiling() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for _ in 0..50 {
            state = update_mastery(&state, true, now);
            assert!(state.ease_factor <= MAX_EASE);
        }
        assert!(feq(state.ease_factor, MAX_EASE));
    }

    #[test]
    fn test_ease_floor() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for _ in 0..50 {
            state = update_mastery(&state, false, now);
            assert!(state.ease_factor >= MIN_EASE);
        }
        assert!(feq(state.ease_factor, MIN_EASE));
    }

    #[test]
    fn test_reaches_mastered() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for i in 0..5 {
            state = update_mastery(&state, true, now);
            if i < 4 {
                assert_ne!(state.status, MasteryStatus::Mastered);
            }
        }
        assert_eq!(state.status, MasteryStatus::Mastered);
    }

    #[test]
    fn test_low_accuracy_is_not_mastered() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for _ in 0..3 {
            state = update_mastery(&state, false, now);
        }
        for _ in 0..5 {
            state = update_mastery(&state, true, now);
        }
        // 5 of 8 correct is 62.5%.
        assert_eq!(state.status, MasteryStatus::Review);
    }

    #[test]
    fn test_never_regresses_below_learning() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for correct in [false, true, false, false, true, false] {
            state = update_mastery(&state, correct, now);
            assert_ne!(state.status, MasteryStatus::New);
        }
    }

    #[test]
    fn test_due_ids_sorted_limited_and_skip_mastered() {
        let base = ts("2024-01-01T00:00:00.000");
        let now = ts("2024-02-01T00:00:00.000");
        let mut map = MasteryMap::new();
        for (id, day) in [("c", 5), ("a", 1), ("d", 20), ("b", 3)] {
            let mut state = MasteryState::new(id);
            state.times_seen = 1;
            state.status = MasteryStatus::Learning;
            state.next_due = Some(base.plus_days(day));
            map.insert(id.to_string(), state);
        }
        let mut mastered = MasteryState::new("m");
        mastered.status = MasteryStatus::Mastered;
        mastered.next_due = Some(base);
        map.insert("m".to_string(), mastered);
        let mut future = MasteryState::new("f");
        future.status = MasteryStatus::Review;
        future.next_due = Some(now.plus_days(1));
        map.insert("f".to_string(), future);

        assert_eq!(due_question_ids(&map, 10, now), vec!["a", "b", "c", "d"]);
        assert_eq!(due_question_ids(&map, 2, now), vec!["a", "b"]);
        assert!(due_question_ids(&map, 0, now).is_empty());
    }

    #[test]
    fn test_mastered_question_leaves_due_set() {
        let now = ts("2024-01-01T00:00:00.000");
        let mut state = MasteryState::new("q1");
        for _ in 0..5 {
            state = update_mastery(&state, true, now);
        }
        let mut map = MasteryMap::new();
        map.insert("q1".to_string(), state);
        let far_future = now.plus_days(365);
        assert!(due_question_ids(&map, 10, far_future).is_empty());
    }
}
