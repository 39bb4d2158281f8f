//! Lesson access gating
//!
//! A lesson is reachable unless its immediate predecessor (by order value,
//! never by position) carries a quiz the student has not passed.

use crate::course::{Course, Lesson, LessonKind};

use super::Enrollment;

/// Display state of a lesson in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    Locked,
    Available,
    Completed,
}

/// Decide whether `lesson` is locked for the student
///
/// A missing predecessor (order gap) leaves the lesson unlocked.
pub fn is_locked(lesson: &Lesson, course: &Course, enrollment: &Enrollment) -> bool {
    if lesson.order == 1 {
        return false;
    }

    let Some(predecessor) = lesson.order.checked_sub(1).and_then(|o| course.lesson_by_order(o))
    else {
        return false;
    };

    match &predecessor.kind {
        LessonKind::Plain => false,
        LessonKind::QuizGated(_) => !enrollment
            .lesson(predecessor.order)
            .is_some_and(|progress| progress.passed_quiz()),
    }
}

/// State of every lesson, sorted by order
pub fn lesson_states<'a>(
    course: &'a Course,
    enrollment: &Enrollment,
) -> Vec<(&'a Lesson, LessonState)> {
    course
        .lessons_in_order()
        .into_iter()
        .map(|lesson| {
            let state = if is_locked(lesson, course, enrollment) {
                LessonState::Locked
            } else if enrollment.lesson(lesson.order).is_some_and(|p| p.completed) {
                LessonState::Completed
            } else {
                LessonState::Available
            };
            (lesson, state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Question, Quiz};
    use crate::progress::LessonResult;
    use chrono::Utc;
    use proptest::prelude::*;

    fn quiz() -> Quiz {
        Quiz::new("Check", vec![Question::new("?", vec!["a".into(), "b".into()], 0)])
    }

    fn course(orders_with_quiz: &[(u32, bool)]) -> Course {
        let mut course = Course::new("c1", "Course");
        for &(order, gated) in orders_with_quiz {
            let lesson = if gated {
                Lesson::with_quiz(order, format!("L{order}"), "", quiz())
            } else {
                Lesson::plain(order, format!("L{order}"), "")
            };
            course.lessons.push(lesson);
        }
        course
    }

    fn record(enrollment: &mut Enrollment, order: u32, result: LessonResult, total: usize) {
        enrollment.apply(result.into_progress(order, Utc::now()), total);
    }

    #[test]
    fn first_lesson_is_always_unlocked() {
        let course = course(&[(1, true), (2, false)]);
        let enrollment = Enrollment::new("e", "s", "c1");
        assert!(!is_locked(&course.lessons[0], &course, &enrollment));
    }

    #[test]
    fn plain_predecessor_unlocks() {
        let course = course(&[(1, false), (2, false)]);
        let enrollment = Enrollment::new("e", "s", "c1");
        assert!(!is_locked(&course.lessons[1], &course, &enrollment));
    }

    #[test]
    fn quiz_predecessor_requires_pass() {
        let course = course(&[(1, true), (2, false)]);
        let mut enrollment = Enrollment::new("e", "s", "c1");
        assert!(is_locked(&course.lessons[1], &course, &enrollment));

        record(&mut enrollment, 1, LessonResult::quiz(50.0, false), 2);
        assert!(is_locked(&course.lessons[1], &course, &enrollment));

        record(&mut enrollment, 1, LessonResult::quiz(100.0, true), 2);
        assert!(!is_locked(&course.lessons[1], &course, &enrollment));
    }

    #[test]
    fn order_gap_defaults_to_unlocked() {
        let course = course(&[(1, true), (3, false)]);
        let enrollment = Enrollment::new("e", "s", "c1");
        let third = course.lesson_by_order(3).unwrap();
        assert!(!is_locked(third, &course, &enrollment));
    }

    #[test]
    fn predecessor_found_by_order_not_position() {
        // Stored out of order: lesson 2 first, gated lesson 1 second
        let course = course(&[(2, false), (1, true)]);
        let enrollment = Enrollment::new("e", "s", "c1");
        let second = course.lesson_by_order(2).unwrap();
        assert!(is_locked(second, &course, &enrollment));
    }

    #[test]
    fn lesson_states_in_order() {
        let course = course(&[(2, false), (1, true), (3, false)]);
        let mut enrollment = Enrollment::new("e", "s", "c1");
        record(&mut enrollment, 1, LessonResult::quiz(100.0, true), 3);

        let states: Vec<(u32, LessonState)> =
            lesson_states(&course, &enrollment).into_iter().map(|(l, s)| (l.order, s)).collect();
        assert_eq!(
            states,
            vec![(1, LessonState::Completed), (2, LessonState::Available), (3, LessonState::Available)]
        );
    }

    /// Lessons as `(order, gated, passed)`, with order gaps of 1 or 2 and
    /// shuffled storage order
    fn gapped_layout() -> impl Strategy<Value = Vec<(u32, bool, bool)>> {
        prop::collection::vec((1u32..=2, any::<bool>(), any::<bool>()), 1..8).prop_flat_map(
            |steps| {
                let mut order = 0;
                let layout: Vec<(u32, bool, bool)> = steps
                    .into_iter()
                    .map(|(step, gated, passed)| {
                        order += step;
                        (order, gated, passed)
                    })
                    .collect();
                Just(layout).prop_shuffle()
            },
        )
    }

    proptest! {
        #[test]
        fn unlocked_only_when_predecessor_allows(layout in gapped_layout()) {
            let course = course(&layout.iter().map(|&(o, g, _)| (o, g)).collect::<Vec<_>>());
            let mut enrollment = Enrollment::new("e", "s", "c1");
            for &(order, gated, passed) in &layout {
                if gated {
                    let result = LessonResult::quiz(if passed { 100.0 } else { 0.0 }, passed);
                    record(&mut enrollment, order, result, course.total_lessons());
                }
            }

            let mut sorted = course.clone();
            sorted.lessons.sort_by_key(|l| l.order);

            for lesson in &course.lessons {
                let predecessor = layout.iter().find(|&&(o, _, _)| o + 1 == lesson.order);
                let allowed = match predecessor {
                    None => true,
                    Some(&(_, gated, passed)) => !gated || passed,
                };
                prop_assert_eq!(!is_locked(lesson, &course, &enrollment), allowed);
                prop_assert_eq!(
                    is_locked(lesson, &course, &enrollment),
                    is_locked(lesson, &sorted, &enrollment)
                );
            }
        }
    }
}
