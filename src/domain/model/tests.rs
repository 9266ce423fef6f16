// Unit tests for domain models

use super::*;
use crate::domain::errors::TimeParseError;

#[test]
fn test_time_spec_parse_seconds() {
    assert_eq!(TimeSpec::parse("123.456").unwrap().seconds, 123.456);
    assert_eq!(TimeSpec::parse("7").unwrap().seconds, 7.0);
    assert_eq!(TimeSpec::parse(".5").unwrap().seconds, 0.5);
    assert_eq!(TimeSpec::parse("  2.0 ").unwrap().seconds, 2.0);
}

#[test]
fn test_time_spec_parse_mm_ss() {
    assert_eq!(TimeSpec::parse("01:30.5").unwrap().seconds, 90.5);
    assert_eq!(TimeSpec::parse("90:00").unwrap().seconds, 5400.0);
}

#[test]
fn test_time_spec_parse_hh_mm_ss() {
    let time = TimeSpec::parse("01:02:03.5").unwrap();
    assert!((time.seconds - 3723.5).abs() < 1e-9);
}

#[test]
fn test_time_spec_parse_negative() {
    assert_eq!(TimeSpec::parse("-5").unwrap().seconds, -5.0);
    assert_eq!(TimeSpec::parse("-0:30").unwrap().seconds, -30.0);
}

#[test]
fn test_time_spec_parse_invalid() {
    assert_eq!(TimeSpec::parse(""), Err(TimeParseError::Empty));
    assert!(matches!(
        TimeSpec::parse("invalid"),
        Err(TimeParseError::Invalid { .. })
    ));
    assert!(TimeSpec::parse("1:2:3:4").is_err());
    assert!(TimeSpec::parse("1.2.3").is_err());
    assert!(TimeSpec::parse("inf").is_err());
    assert!(TimeSpec::parse("NaN").is_err());
    assert!(TimeSpec::parse("1e3").is_err());
    assert!(TimeSpec::parse("--5").is_err());
    assert!(TimeSpec::parse("1:").is_err());
}

#[test]
fn test_time_spec_parse_component_out_of_range() {
    assert_eq!(
        TimeSpec::parse("00:60"),
        Err(TimeParseError::ComponentOutOfRange {
            input: "00:60".to_string(),
            component: "seconds",
        })
    );
    assert!(matches!(
        TimeSpec::parse("1:60:00"),
        Err(TimeParseError::ComponentOutOfRange {
            component: "minutes",
            ..
        })
    ));
}

#[test]
fn test_time_spec_from_str() {
    let time: TimeSpec = "2:00".parse().unwrap();
    assert_eq!(time.seconds, 120.0);
}

#[test]
fn test_time_spec_display() {
    assert_eq!(TimeSpec::from_seconds(2.0).to_string(), "0:02.00");
    assert_eq!(TimeSpec::from_seconds(3723.5).to_string(), "1:02:03.50");
    assert_eq!(TimeSpec::from_seconds(-5.0).to_string(), "-0:05.00");
}

#[test]
fn test_trim_end_parse() {
    assert_eq!(TrimEnd::parse("end").unwrap(), TrimEnd::ToEnd);
    assert_eq!(TrimEnd::parse("END").unwrap(), TrimEnd::ToEnd);
    assert_eq!(
        TrimEnd::parse("7.0").unwrap(),
        TrimEnd::At(TimeSpec::from_seconds(7.0))
    );
    assert!(TrimEnd::parse("ending").is_err());
}

#[test]
fn test_trim_end_resolve() {
    let duration = MediaDuration::new(10.0).unwrap();
    assert_eq!(TrimEnd::ToEnd.resolve(duration), 10.0);
    assert_eq!(
        TrimEnd::At(TimeSpec::from_seconds(4.0)).resolve(duration),
        4.0
    );
}

#[test]
fn test_media_duration_rejects_invalid() {
    assert!(MediaDuration::new(0.0).is_some());
    assert!(MediaDuration::new(10.5).is_some());
    assert!(MediaDuration::new(-1.0).is_none());
    assert!(MediaDuration::new(f64::NAN).is_none());
    assert!(MediaDuration::new(f64::INFINITY).is_none());
}

#[test]
fn test_media_duration_serde() {
    let duration = MediaDuration::new(2.5).unwrap();
    assert_eq!(serde_json::to_string(&duration).unwrap(), "2.5");
    assert!(serde_json::from_str::<MediaDuration>("-1.0").is_err());
}

#[test]
fn test_trim_request_accessors() {
    let request = TrimRequest::with_range("in.mp4", "out.mp4", 2.0, 7.0);
    assert_eq!(request.input_path(), Path::new("in.mp4"));
    assert_eq!(request.output_path(), Path::new("out.mp4"));
    assert_eq!(request.start().seconds, 2.0);
    assert_eq!(request.end(), TrimEnd::At(TimeSpec::from_seconds(7.0)));
}
