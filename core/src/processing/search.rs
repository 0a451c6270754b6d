use num_traits::Zero;

/// Index ranges of the in-window acquisitions around a target date.
///
/// Indices refer to one sensor's `input_dates`. `None` means no candidate was found.
/// `min_lo` is the first in-window index, `max_lo` the last one before the target,
/// `min_hi`/`max_hi` the first and last at or after it. An exact date match sets
/// `max_lo`, `min_hi` and `max_hi` to the matching index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBracket {
    pub min_lo: Option<usize>,
    pub max_lo: Option<usize>,
    pub min_hi: Option<usize>,
    pub max_hi: Option<usize>,
}

/// Scans ascending `input_dates` for the acquisitions within `radius` days of `center`.
///
/// Stops at the first date past the window, so the dates must be ascending.
pub fn find_bracket(input_dates: &[i32], center: i32, radius: i32) -> DateBracket {
    let lower = i64::from(center) - i64::from(radius);
    let upper = i64::from(center) + i64::from(radius);
    let mut bracket = DateBracket::default();

    for (index, &date) in input_dates.iter().enumerate() {
        let wide = i64::from(date);
        if wide > upper {
            break;
        }
        if wide < lower {
            continue;
        }

        if bracket.min_lo.is_none() {
            bracket.min_lo = Some(index);
        }

        if date == center {
            bracket.max_lo = Some(index);
            bracket.min_hi = Some(index);
            bracket.max_hi = Some(index);
        } else if date < center {
            bracket.max_lo = Some(index);
        } else {
            if bracket.min_hi.is_none() {
                bracket.min_hi = Some(index);
            }
            bracket.max_hi = Some(index);
        }
    }

    bracket
}

/// Walks from `start` toward `end` (both inclusive) and returns the first index whose
/// mask entry `mask[index + offset]` is zero.
///
/// The walk never leaves `[start, end]`: a valid acquisition just outside the bracket
/// is not considered.
pub fn nearest_valid<M: Zero>(
    start: Option<usize>,
    end: Option<usize>,
    mask: &[M],
    offset: usize,
) -> Option<usize> {
    let (start, end) = (start?, end?);
    let is_valid = |index: usize| mask[index + offset].is_zero();

    if start <= end {
        (start..=end).find(|&index| is_valid(index))
    } else {
        (end..=start).rev().find(|&index| is_valid(index))
    }
}
