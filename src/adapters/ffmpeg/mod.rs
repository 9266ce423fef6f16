//! FFmpeg execution adapter
//!
//! Drives the `ffprobe` and `ffmpeg` command line tools. Multi-segment plans
//! are rendered part by part into a scratch directory and joined with the
//! concat demuxer. Every part maps the same streams (first video, all audio)
//! and the re-encoded lead uses the source's codec, profile and pixel format
//! so the copied body can follow it. Subtitle and data streams are dropped
//! from spliced output.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::BackendError;
use crate::domain::model::{MediaDuration, MediaProbe, VideoStream};
use crate::planner::{ExtractionPlan, Segment, SegmentMode};
use crate::ports::MediaBackend;

mod command;

use command::ToolCommand;

const FFPROBE: &str = "ffprobe";

/// Source video codec to the encoder that produces a stream-compatible lead
fn matching_encoder(codec_name: &str) -> Option<&'static str> {
    match codec_name {
        "h264" => Some("libx264"),
        "hevc" => Some("libx265"),
        "vp8" => Some("libvpx"),
        "vp9" => Some("libvpx-vp9"),
        "av1" => Some("libaom-av1"),
        "mpeg4" => Some("mpeg4"),
        "mpeg2video" => Some("mpeg2video"),
        _ => None,
    }
}

/// ffprobe profile name to the encoder's `-profile:v` value
fn encoder_profile(encoder: &str, profile: &str) -> Option<&'static str> {
    let profile = profile.to_ascii_lowercase();
    match (encoder, profile.as_str()) {
        ("libx264", "baseline" | "constrained baseline") => Some("baseline"),
        ("libx264", "main") => Some("main"),
        ("libx264", "high") => Some("high"),
        ("libx264", "high 10") => Some("high10"),
        ("libx264", "high 4:2:2") => Some("high422"),
        ("libx264", "high 4:4:4 predictive") => Some("high444"),
        ("libx265", "main") => Some("main"),
        ("libx265", "main 10") => Some("main10"),
        _ => None,
    }
}

/// Parts of a spliced extraction and the join that assembles them
#[derive(Debug)]
struct SpliceJob {
    names: Vec<String>,
    parts: Vec<Vec<OsString>>,
    join: Vec<OsString>,
}

/// Tool locations and re-encode parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FfmpegSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
    /// Constant rate factor for re-encoded segments (0-51)
    pub crf: u8,
    pub preset: String,
    pub threads: usize,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from(FFPROBE),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 18,
            preset: "medium".to_string(),
            threads: num_cpus::get(),
        }
    }
}

/// FFmpeg-based media backend
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    settings: FfmpegSettings,
}

impl FfmpegBackend {
    pub fn new(settings: FfmpegSettings) -> Self {
        Self { settings }
    }

    fn ffprobe(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.settings.ffprobe_path);
        cmd.args(["-v", "error"]);
        cmd
    }

    fn ffmpeg(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.settings.ffmpeg_path);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);
        cmd
    }

    /// Arguments rendering one segment of `input` into `output`
    fn segment_args(&self, input: &Path, segment: &Segment, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-ss".into(),
            seconds_arg(segment.start).into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-t".into(),
            seconds_arg(segment.duration()).into(),
        ];

        match segment.mode {
            SegmentMode::Copy => {
                args.extend(
                    ["-map", "0", "-ignore_unknown", "-c", "copy", "-avoid_negative_ts", "make_zero"]
                        .map(OsString::from),
                );
            }
            SegmentMode::Reencode => {
                let s = &self.settings;
                args.extend(["-map", "0:v?", "-map", "0:a?"].map(OsString::from));
                args.extend(
                    [
                        "-c:v".to_string(),
                        s.video_codec.clone(),
                        "-crf".to_string(),
                        s.crf.to_string(),
                        "-preset".to_string(),
                        s.preset.clone(),
                        "-c:a".to_string(),
                        s.audio_codec.clone(),
                        "-threads".to_string(),
                        s.threads.to_string(),
                    ]
                    .map(OsString::from),
                );
            }
        }

        args.push(output.as_os_str().to_owned());
        args
    }

    /// Rate control for `encoder`, from the configured crf and preset
    fn quality_args(&self, encoder: &str) -> Vec<String> {
        let s = &self.settings;
        match encoder {
            "libx264" | "libx265" => vec![
                "-crf".to_string(),
                s.crf.to_string(),
                "-preset".to_string(),
                s.preset.clone(),
            ],
            "libvpx" | "libvpx-vp9" | "libaom-av1" => {
                vec!["-crf".to_string(), s.crf.to_string(), "-b:v".to_string(), "0".to_string()]
            }
            _ => vec!["-q:v".to_string(), "2".to_string()],
        }
    }

    /// Arguments for every part of a spliced plan plus the concat join.
    ///
    /// Part files are named relative to `scratch`; the join reads `list`.
    fn splice_job(
        &self,
        plan: &ExtractionPlan,
        scratch: &Path,
        list: &Path,
        staging: &Path,
    ) -> Result<SpliceJob, BackendError> {
        let video = plan.video.as_ref().ok_or_else(|| BackendError::Unsupported {
            message: "spliced plan has no source video stream".to_string(),
        })?;
        let encoder = matching_encoder(&video.codec_name).ok_or_else(|| BackendError::Unsupported {
            message: format!("no encoder matches source codec {}", video.codec_name),
        })?;
        let suffix = staging
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut names = Vec::with_capacity(plan.segments.len());
        let mut parts = Vec::with_capacity(plan.segments.len());
        for (index, segment) in plan.segments.iter().enumerate() {
            let name = format!("part-{:03}{}", index, suffix);
            parts.push(self.splice_part_args(
                &plan.input,
                segment,
                video,
                encoder,
                &scratch.join(&name),
            ));
            names.push(name);
        }

        let mut join: Vec<OsString> = ["-f", "concat", "-safe", "0", "-i"].map(OsString::from).into();
        join.push(list.as_os_str().to_owned());
        join.extend(["-map", "0", "-c", "copy"].map(OsString::from));
        join.push(staging.as_os_str().to_owned());

        Ok(SpliceJob { names, parts, join })
    }

    fn splice_part_args(
        &self,
        input: &Path,
        segment: &Segment,
        video: &VideoStream,
        encoder: &str,
        output: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-ss".into(),
            seconds_arg(segment.start).into(),
            "-i".into(),
            input.as_os_str().to_owned(),
        ];
        let mut codec: Vec<String> = vec![
            "-t".to_string(),
            seconds_arg(segment.duration()),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
        ];

        match segment.mode {
            SegmentMode::Copy => codec.extend(["-c".to_string(), "copy".to_string()]),
            SegmentMode::Reencode => {
                codec.extend(["-c:v".to_string(), encoder.to_string()]);
                if let Some(profile) = video.profile.as_deref().and_then(|p| encoder_profile(encoder, p)) {
                    codec.extend(["-profile:v".to_string(), profile.to_string()]);
                }
                if let Some(pix_fmt) = &video.pix_fmt {
                    codec.extend(["-pix_fmt".to_string(), pix_fmt.clone()]);
                }
                codec.extend(self.quality_args(encoder));
                codec.extend([
                    "-threads".to_string(),
                    self.settings.threads.to_string(),
                    "-c:a".to_string(),
                    "copy".to_string(),
                ]);
            }
        }
        codec.extend(["-avoid_negative_ts".to_string(), "make_zero".to_string()]);

        args.extend(codec.into_iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }

    fn render_segment(&self, input: &Path, segment: &Segment, output: &Path) -> Result<(), BackendError> {
        debug!(
            start = segment.start,
            end = segment.end,
            mode = ?segment.mode,
            "Rendering segment"
        );
        self.ffmpeg()
            .args(self.segment_args(input, segment, output))
            .run()?;
        Ok(())
    }

    fn render_concat(&self, plan: &ExtractionPlan, staging: &Path) -> Result<(), BackendError> {
        let scratch_parent = match staging.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let scratch = tempfile::Builder::new()
            .prefix(".vidpare-parts-")
            .tempdir_in(scratch_parent)?;
        let list_path = scratch.path().join("concat.txt");
        let job = self.splice_job(plan, scratch.path(), &list_path, staging)?;

        for (segment, args) in plan.segments.iter().zip(job.parts) {
            debug!(
                start = segment.start,
                end = segment.end,
                mode = ?segment.mode,
                "Rendering part"
            );
            self.ffmpeg().args(args).run()?;
        }

        fs::write(&list_path, concat_list(&job.names))?;
        self.ffmpeg().args(job.join).run()?;
        Ok(())
    }
}

impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn probe(&self, input: &Path) -> Result<MediaProbe, BackendError> {
        let output = self
            .ffprobe()
            .args([
                "-show_entries",
                "format=duration,format_name:stream=codec_type,codec_name,profile,pix_fmt",
                "-of",
                "json",
            ])
            .arg(input)
            .run()?;
        parse_probe_json(&output)
    }

    fn keyframes(&self, input: &Path) -> Result<Vec<f64>, BackendError> {
        let output = self
            .ffprobe()
            .args([
                "-select_streams",
                "v:0",
                "-show_entries",
                "packet=pts_time,flags",
                "-of",
                "json",
            ])
            .arg(input)
            .run()?;
        let keyframes = parse_keyframes_json(&output)?;
        debug!(count = keyframes.len(), "Read keyframe positions");
        Ok(keyframes)
    }

    fn can_splice(&self, probe: &MediaProbe) -> bool {
        probe
            .video
            .as_ref()
            .and_then(|v| matching_encoder(&v.codec_name))
            .is_some()
    }

    fn extract_range(&self, plan: &ExtractionPlan, staging: &Path) -> Result<(), BackendError> {
        info!(
            strategy = %plan.strategy,
            segments = plan.segments.len(),
            "Extracting {:.3}s-{:.3}s",
            plan.actual_start,
            plan.actual_end
        );
        match plan.segments.as_slice() {
            [] => Err(BackendError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "extraction plan has no segments",
            ))),
            [segment] => self.render_segment(&plan.input, segment, staging),
            _ => self.render_concat(plan, staging),
        }
    }
}

/// Timestamp argument with microsecond resolution
fn seconds_arg(seconds: f64) -> String {
    format!("{:.6}", seconds)
}

fn concat_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("file '{}'\n", name.replace('\'', "'\\''")))
        .collect()
}

#[derive(Deserialize)]
struct ProbeReport {
    format: Option<FormatEntry>,
    #[serde(default)]
    streams: Vec<StreamEntry>,
}

#[derive(Deserialize)]
struct StreamEntry {
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    pix_fmt: Option<String>,
}

#[derive(Deserialize)]
struct FormatEntry {
    duration: Option<String>,
    format_name: Option<String>,
}

#[derive(Deserialize)]
struct PacketReport {
    #[serde(default)]
    packets: Vec<PacketEntry>,
}

#[derive(Deserialize)]
struct PacketEntry {
    pts_time: Option<String>,
    #[serde(default)]
    flags: String,
}

fn parse_error(message: impl Into<String>) -> BackendError {
    BackendError::Parse {
        tool: FFPROBE.to_string(),
        message: message.into(),
    }
}

pub(crate) fn parse_probe_json(json: &str) -> Result<MediaProbe, BackendError> {
    let report: ProbeReport =
        serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;
    let format = report
        .format
        .ok_or_else(|| parse_error("no format section"))?;

    let raw = format
        .duration
        .ok_or_else(|| parse_error("no duration reported"))?;
    let duration = raw
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(MediaDuration::new)
        .ok_or_else(|| parse_error(format!("invalid duration '{}'", raw)))?;

    let video = report
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| {
            Some(VideoStream {
                codec_name: s.codec_name?,
                profile: s.profile,
                pix_fmt: s.pix_fmt,
            })
        });

    Ok(MediaProbe {
        duration,
        format: format.format_name,
        video,
    })
}

pub(crate) fn parse_keyframes_json(json: &str) -> Result<Vec<f64>, BackendError> {
    let report: PacketReport =
        serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;

    let mut keyframes: Vec<f64> = report
        .packets
        .into_iter()
        .filter(|p| p.flags.starts_with('K'))
        .filter_map(|p| p.pts_time?.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .collect();
    keyframes.sort_by(f64::total_cmp);
    keyframes.dedup();
    Ok(keyframes)
}
