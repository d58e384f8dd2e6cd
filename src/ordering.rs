// Presentation order for courses and assignments.

use chrono::{DateTime, Utc};

use crate::api::{Assignment, Course};

/// Named courses only, favorites first, then alphabetical.
pub fn sort_courses(courses: Vec<Course>) -> Vec<Course> {
    let mut named: Vec<Course> = courses.into_iter().filter(|c| c.name.is_some()).collect();
    named.sort_by(|a, b| {
        b.is_favorite
            .cmp(&a.is_favorite)
            .then_with(|| a.name.cmp(&b.name))
    });
    named
}

/// Where an assignment lands in the list, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    UpcomingUnsubmitted,
    UpcomingSubmitted,
    PastDueUnsubmitted,
    PastDueSubmitted,
    Locked,
}

pub fn bucket(assignment: &Assignment, now: DateTime<Utc>) -> Bucket {
    let locked = assignment.lock_at.is_some_and(|at| at < now);
    let past_due = assignment.due_at.is_some_and(|at| at < now);
    let submitted = assignment.has_submitted_submissions;
    match (locked, past_due, submitted) {
        (true, _, _) => Bucket::Locked,
        (false, false, false) => Bucket::UpcomingUnsubmitted,
        (false, false, true) => Bucket::UpcomingSubmitted,
        (false, true, false) => Bucket::PastDueUnsubmitted,
        (false, true, true) => Bucket::PastDueSubmitted,
    }
}

/// Assignments that accept file uploads, ordered by bucket and then by due
/// date (undated last). Ties keep their original order.
pub fn sort_assignments(assignments: Vec<Assignment>, now: DateTime<Utc>) -> Vec<Assignment> {
    let mut uploadable: Vec<Assignment> = assignments
        .into_iter()
        .filter(Assignment::accepts_upload)
        .collect();
    uploadable.sort_by_key(|a| (bucket(a, now), a.due_at.is_none(), a.due_at));
    uploadable
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn course(name: Option<&str>, fav: bool) -> Course {
        Course {
            name: name.map(String::from),
            is_favorite: fav,
            ..Default::default()
        }
    }

    fn assignment(id: u64, due: Option<i64>, lock: Option<i64>, submitted: bool, now: DateTime<Utc>) -> Assignment {
        Assignment {
            id,
            name: format!("a{id}"),
            due_at: due.map(|d| now + Duration::days(d)),
            lock_at: lock.map(|d| now + Duration::days(d)),
            has_submitted_submissions: submitted,
            submission_types: vec!["online_upload".into()],
            ..Default::default()
        }
    }

    #[test]
    fn favorites_first_then_by_name_and_unnamed_dropped() {
        let sorted = sort_courses(vec![
            course(Some("Zoology"), false),
            course(None, true),
            course(Some("Biology"), false),
            course(Some("Physics"), true),
        ]);
        let names: Vec<_> = sorted.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["Physics", "Biology", "Zoology"]);
    }

    #[test]
    fn buckets_come_out_in_priority_order() {
        let now = Utc::now();
        let input = vec![
            assignment(1, Some(3), None, false, now),
            assignment(2, Some(-3), None, true, now),
            assignment(3, Some(5), Some(-1), false, now),
            assignment(4, Some(-2), None, false, now),
        ];
        for rotation in 0..input.len() {
            let mut rotated = input.clone();
            rotated.rotate_left(rotation);
            let ids: Vec<u64> = sort_assignments(rotated, now).iter().map(|a| a.id).collect();
            assert_eq!(ids.first(), Some(&1));
            assert_eq!(ids.last(), Some(&3));
            assert_eq!(ids, vec![1, 4, 2, 3]);
        }
    }

    #[test]
    fn within_a_bucket_due_dates_ascend_with_undated_last() {
        let now = Utc::now();
        let sorted = sort_assignments(
            vec![
                assignment(1, None, None, false, now),
                assignment(2, Some(9), None, false, now),
                assignment(3, Some(2), None, false, now),
            ],
            now,
        );
        let ids: Vec<u64> = sorted.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn non_upload_assignments_are_dropped() {
        let now = Utc::now();
        let mut quiz = assignment(7, Some(1), None, false, now);
        quiz.submission_types = vec!["online_quiz".into()];
        let sorted = sort_assignments(vec![quiz, assignment(8, Some(1), None, false, now)], now);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].id, 8);
    }

    #[test]
    fn submitted_upcoming_beats_past_due() {
        let now = Utc::now();
        let a = assignment(1, Some(1), None, true, now);
        let b = assignment(2, Some(-1), None, false, now);
        assert_eq!(bucket(&a, now), Bucket::UpcomingSubmitted);
        assert_eq!(bucket(&b, now), Bucket::PastDueUnsubmitted);
        assert!(bucket(&a, now) < bucket(&b, now));
    }
}
