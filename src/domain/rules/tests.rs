// Unit tests for business rules

use super::*;
use crate::domain::model::TrimEnd;

fn ten_seconds() -> MediaDuration {
    MediaDuration::new(10.0).unwrap()
}

fn request(start: f64, end: f64) -> TrimRequest {
    TrimRequest::with_range("in.mp4", "out.mp4", start, end)
}

#[test]
fn test_valid_range_resolves() {
    let range = RangeValidator::resolve(&request(2.0, 7.0), ten_seconds()).unwrap();
    assert_eq!(range, ValidatedRange { start: 2.0, end: 7.0 });
    assert_eq!(range.duration(), 5.0);
}

#[test]
fn test_full_range_is_valid() {
    assert!(RangeValidator::validate(&request(0.0, 10.0), ten_seconds()).is_ok());
}

#[test]
fn test_negative_start() {
    for start in [-0.001, -1.0, -100.0] {
        let err = RangeValidator::validate(&request(start, 5.0), ten_seconds()).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeStart { .. }), "start {}", start);
    }
}

#[test]
fn test_negative_start_wins_over_other_violations() {
    // also end <= start and end > duration
    let err = RangeValidator::validate(&request(-1.0, -2.0), ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::NegativeStart { .. }));
    let err = RangeValidator::validate(&request(-1.0, 20.0), ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::NegativeStart { .. }));
}

#[test]
fn test_end_before_or_equal_start() {
    for (start, end) in [(5.0, 5.0), (5.0, 4.9), (9.0, 0.0)] {
        let err = RangeValidator::validate(&request(start, end), ten_seconds()).unwrap_err();
        assert!(
            matches!(err, ValidationError::EndBeforeStart { .. }),
            "{} -> {}",
            start,
            end
        );
    }
}

#[test]
fn test_end_before_start_wins_over_end_beyond_duration() {
    let err = RangeValidator::validate(&request(15.0, 12.0), ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::EndBeforeStart { .. }));
}

#[test]
fn test_end_beyond_duration() {
    let err = RangeValidator::validate(&request(8.0, 12.0), ten_seconds()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::EndBeyondDuration {
            end: TimeSpec::from_seconds(12.0),
            duration: ten_seconds(),
        }
    );
}

#[test]
fn test_to_end_is_clamped() {
    let request = TrimRequest::new(
        "in.mp4",
        "out.mp4",
        TimeSpec::from_seconds(8.0),
        TrimEnd::ToEnd,
    );
    let range = RangeValidator::resolve(&request, ten_seconds()).unwrap();
    assert_eq!(range.end, 10.0);
}

#[test]
fn test_to_end_with_start_past_duration() {
    let request = TrimRequest::new(
        "in.mp4",
        "out.mp4",
        TimeSpec::from_seconds(12.0),
        TrimEnd::ToEnd,
    );
    let err = RangeValidator::validate(&request, ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::EndBeforeStart { .. }));
}

#[test]
fn test_nan_values_are_rejected() {
    let err = RangeValidator::validate(&request(f64::NAN, 5.0), ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::NegativeStart { .. }));
    let err = RangeValidator::validate(&request(1.0, f64::NAN), ten_seconds()).unwrap_err();
    assert!(matches!(err, ValidationError::EndBeforeStart { .. }));
}
