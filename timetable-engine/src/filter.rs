//! Narrowing lines by a selected stop.

use crate::domain::Line;

/// Lines that stop at `stop`, in their original order.
///
/// An absent or blank stop selects every line. Otherwise only a line whose
/// stop list contains `stop` (both sides trimmed) survives; origin and
/// destination alone do not count.
///
/// # Examples
///
/// ```
/// use timetable_engine::domain::Line;
/// use timetable_engine::filter::filter_by_stop;
///
/// let lines = vec![
///     Line { stops: vec!["Praça".into()], ..Line::default() },
///     Line::default(),
/// ];
///
/// assert_eq!(filter_by_stop(&lines, None).len(), 2);
/// assert_eq!(filter_by_stop(&lines, Some("Praça")).len(), 1);
/// ```
pub fn filter_by_stop<'a>(lines: &'a [Line], stop: Option<&str>) -> Vec<&'a Line> {
    match normalize_stop(stop) {
        None => lines.iter().collect(),
        Some(stop) => lines.iter().filter(|line| line.serves(stop)).collect(),
    }
}

/// Trimmed stop, or `None` when the selection is absent or blank.
pub fn normalize_stop(stop: Option<&str>) -> Option<&str> {
    stop.map(str::trim).filter(|s| !s.is_empty())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_lines() -> impl Strategy<Value = Vec<Line>> {
        proptest::collection::vec(
            proptest::collection::vec("[A-D]", 0..4).prop_map(|stops| Line {
                stops,
                ..Line::default()
            }),
            0..8,
        )
    }

    proptest! {
        /// Every surviving line serves the stop, and every serving line survives
        #[test]
        fn exact_selection(lines in arb_lines(), stop in "[A-D]") {
            let kept = filter_by_stop(&lines, Some(stop.as_str()));
            let expected: Vec<&Line> = lines.iter().filter(|l| l.stops.contains(&stop)).collect();
            prop_assert_eq!(kept, expected);
        }

        /// Blank selection returns every line
        #[test]
        fn identity_law(lines in arb_lines()) {
            let kept = filter_by_stop(&lines, Some(""));
            prop_assert_eq!(kept.len(), lines.len());
        }
    }
}
