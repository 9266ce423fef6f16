//! Clipping strategy implementation

use std::path::Path;

use tracing::debug;

use crate::domain::model::ValidatedRange;
use crate::planner::{
    CutPolicy, ExtractionPlan, ExtractionStrategy, PlannerSettings, Segment, SegmentMode,
};

/// Strategy planner for determining the extraction approach
#[derive(Debug, Clone, Default)]
pub struct CutPlanner {
    settings: PlannerSettings,
}

impl CutPlanner {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    /// Whether planning needs keyframe positions at all
    pub fn needs_keyframes(&self) -> bool {
        self.settings.policy != CutPolicy::Precise
    }

    /// Plan the extraction of `range` given the keyframe times of the input.
    ///
    /// `keyframes` may be unsorted; an empty list means positions are unknown.
    /// `can_splice` tells whether a re-encoded lead segment can be joined to
    /// stream-copied material of the same input.
    pub fn plan(
        &self,
        input: &Path,
        range: ValidatedRange,
        keyframes: &[f64],
        can_splice: bool,
    ) -> ExtractionPlan {
        let mut keyframes: Vec<f64> = keyframes.iter().copied().filter(|k| k.is_finite()).collect();
        keyframes.sort_by(f64::total_cmp);

        let plan = match self.settings.policy {
            CutPolicy::Keyframe => self.plan_keyframe(input, range, &keyframes),
            CutPolicy::Precise => single(input, range.start, range.end, SegmentMode::Reencode),
            CutPolicy::Smart => self.plan_smart(input, range, &keyframes, can_splice),
        };

        debug!(
            policy = ?self.settings.policy,
            strategy = %plan.strategy,
            segments = plan.segments.len(),
            "Planned extraction {:.3}s - {:.3}s",
            plan.actual_start,
            plan.actual_end
        );
        plan
    }

    fn plan_keyframe(&self, input: &Path, range: ValidatedRange, keyframes: &[f64]) -> ExtractionPlan {
        let tolerance = self.settings.keyframe_tolerance;
        let snapped = keyframes
            .iter()
            .copied()
            .filter(|&k| k <= range.start + tolerance)
            .last()
            .map(|k| k.min(range.start).max(0.0))
            .unwrap_or(range.start);

        single(input, snapped, range.end, SegmentMode::Copy)
    }

    fn plan_smart(
        &self,
        input: &Path,
        range: ValidatedRange,
        keyframes: &[f64],
        can_splice: bool,
    ) -> ExtractionPlan {
        let tolerance = self.settings.keyframe_tolerance;

        if keyframes.is_empty() {
            return single(input, range.start, range.end, SegmentMode::Reencode);
        }

        if keyframes.iter().any(|&k| (k - range.start).abs() <= tolerance) {
            return single(input, range.start, range.end, SegmentMode::Copy);
        }

        if !can_splice {
            return single(input, range.start, range.end, SegmentMode::Reencode);
        }

        let body_start = keyframes
            .iter()
            .copied()
            .find(|&k| k > range.start + tolerance && k < range.end - tolerance);

        match body_start {
            Some(k) if range.end - k >= self.settings.min_copy_duration => ExtractionPlan {
                input: input.to_path_buf(),
                segments: vec![
                    Segment {
                        start: range.start,
                        end: k,
                        mode: SegmentMode::Reencode,
                    },
                    Segment {
                        start: k,
                        end: range.end,
                        mode: SegmentMode::Copy,
                    },
                ],
                actual_start: range.start,
                actual_end: range.end,
                strategy: ExtractionStrategy::BoundaryReencode,
                video: None,
            },
            _ => single(input, range.start, range.end, SegmentMode::Reencode),
        }
    }
}

fn single(input: &Path, start: f64, end: f64, mode: SegmentMode) -> ExtractionPlan {
    let strategy = match mode {
        SegmentMode::Copy => ExtractionStrategy::Copy,
        SegmentMode::Reencode => ExtractionStrategy::Reencode,
    };
    ExtractionPlan {
        input: input.to_path_buf(),
        segments: vec![Segment { start, end, mode }],
        actual_start: start,
        actual_end: end,
        strategy,
        video: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYFRAMES: [f64; 5] = [0.0, 2.0, 4.0, 6.0, 8.0];

    fn planner(policy: CutPolicy) -> CutPlanner {
        CutPlanner::new(PlannerSettings {
            policy,
            ..PlannerSettings::default()
        })
    }

    fn range(start: f64, end: f64) -> ValidatedRange {
        ValidatedRange { start, end }
    }

    fn assert_contiguous(plan: &ExtractionPlan) {
        assert_eq!(plan.segments.first().unwrap().start, plan.actual_start);
        assert_eq!(plan.segments.last().unwrap().end, plan.actual_end);
        for pair in plan.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(plan.segments.iter().all(|s| s.duration() > 0.0));
    }

    #[test]
    fn test_precise_reencodes_everything() {
        let plan = planner(CutPolicy::Precise).plan(Path::new("in.mp4"), range(2.5, 7.0), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::Reencode);
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.reencoded_duration(), 4.5);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_precise_does_not_need_keyframes() {
        assert!(!planner(CutPolicy::Precise).needs_keyframes());
        assert!(planner(CutPolicy::Smart).needs_keyframes());
        assert!(planner(CutPolicy::Keyframe).needs_keyframes());
    }

    #[test]
    fn test_keyframe_snaps_start_back() {
        let plan = planner(CutPolicy::Keyframe).plan(Path::new("in.mp4"), range(3.5, 7.0), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::Copy);
        assert_eq!(plan.actual_start, 2.0);
        assert_eq!(plan.actual_end, 7.0);
        assert_eq!(plan.reencoded_duration(), 0.0);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_keyframe_on_boundary_keeps_start() {
        let plan = planner(CutPolicy::Keyframe).plan(Path::new("in.mp4"), range(4.0, 7.0), &KEYFRAMES, true);
        assert_eq!(plan.actual_start, 4.0);
    }

    #[test]
    fn test_keyframe_without_positions_copies_from_start() {
        let plan = planner(CutPolicy::Keyframe).plan(Path::new("in.mp4"), range(3.5, 7.0), &[], true);
        assert_eq!(plan.actual_start, 3.5);
        assert_eq!(plan.strategy, ExtractionStrategy::Copy);
    }

    #[test]
    fn test_smart_copies_when_start_is_aligned() {
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.0005, 7.0), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::Copy);
        assert_eq!(plan.actual_start, 2.0005);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_smart_reencodes_leading_segment() {
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.5, 9.0), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::BoundaryReencode);
        assert_eq!(
            plan.segments,
            vec![
                Segment { start: 2.5, end: 4.0, mode: SegmentMode::Reencode },
                Segment { start: 4.0, end: 9.0, mode: SegmentMode::Copy },
            ]
        );
        assert_eq!(plan.actual_start, 2.5);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_smart_short_body_falls_back_to_reencode() {
        // body would be 6.0 - 7.0, below the 2s minimum
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(4.5, 7.0), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::Reencode);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_smart_no_keyframe_inside_range() {
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.5, 3.5), &KEYFRAMES, true);
        assert_eq!(plan.strategy, ExtractionStrategy::Reencode);
    }

    #[test]
    fn test_smart_unknown_keyframes_reencodes() {
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.5, 9.0), &[], true);
        assert_eq!(plan.strategy, ExtractionStrategy::Reencode);
    }

    #[test]
    fn test_unsorted_keyframes_are_handled() {
        let keyframes = [8.0, f64::NAN, 4.0, 0.0, 6.0, 2.0];
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.5, 9.0), &keyframes, true);
        assert_eq!(plan.segments[0].end, 4.0);
    }

    #[test]
    fn test_smart_without_matching_encoder_reencodes() {
        let plan = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.5, 9.0), &KEYFRAMES, false);
        assert_eq!(plan.strategy, ExtractionStrategy::Reencode);
        assert!(!plan.is_spliced());

        // an aligned start needs no splice
        let aligned = planner(CutPolicy::Smart).plan(Path::new("in.mp4"), range(2.0, 9.0), &KEYFRAMES, false);
        assert_eq!(aligned.strategy, ExtractionStrategy::Copy);
    }

    #[test]
    fn test_keyframe_policy_ignores_splice_support() {
        let plan = planner(CutPolicy::Keyframe).plan(Path::new("in.mp4"), range(3.5, 7.0), &KEYFRAMES, false);
        assert_eq!(plan.strategy, ExtractionStrategy::Copy);
    }

    #[test]
    fn test_every_policy_preserves_requested_end() {
        for policy in [CutPolicy::Keyframe, CutPolicy::Precise, CutPolicy::Smart] {
            let plan = planner(policy).plan(Path::new("in.mp4"), range(1.3, 8.7), &KEYFRAMES, true);
            assert_eq!(plan.actual_end, 8.7, "{:?}", policy);
            assert!(plan.actual_start <= 1.3);
            assert_contiguous(&plan);
        }
    }
}
