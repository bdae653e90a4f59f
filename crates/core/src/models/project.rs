//! Project, asset, script, reading, and publication documents.
//!
//! A project owns assets (uploaded media) and scripts. Readings are voiced or
//! avatar-video renditions of a script. A publication combines assets and
//! readings into a batch of creatives rendered from a template.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DocId;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    /// Storage directory for the project's files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

super::impl_document!(Project, "projects");

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Image,
    Video,
    Audio,
    VideoReading,
    AudioReading,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

super::impl_document!(Asset, "assets");

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub name: String,
    /// Language tag of `content`, e.g. `"en"`.
    pub language: String,
    pub content: String,
}

super::impl_document!(Script, "scripts");

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingType {
    Voice,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    New,
    Generating,
    Postprocessing,
    Done,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingAvatarPlatform {
    #[default]
    Heygen,
}

/// Which avatar (and which provider) renders a video reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingAvatarInfo {
    #[serde(default)]
    pub platform: ReadingAvatarPlatform,
    pub avatar_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    /// Provider-side id of the rendered video, once submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(rename = "type")]
    pub reading_type: ReadingType,
    pub info: ReadingAvatarInfo,
    /// Duration in seconds, known once generation finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Asset>>,
}

super::impl_document!(Reading, "readings");

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationPhase {
    #[default]
    New,
    PreparingAssets,
    Generating,
    Done,
    Error,
}

/// Output aspect ratio. Width is always 720 px.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationRatio {
    #[serde(rename = "9x16")]
    Portrait9x16,
    #[serde(rename = "1x1")]
    Square1x1,
}

impl PublicationRatio {
    pub fn width(self) -> u32 {
        720
    }

    pub fn height(self) -> u32 {
        match self {
            Self::Portrait9x16 => 1280,
            Self::Square1x1 => 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationTemplate {
    FramesStepper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub script_id: String,
    pub ratio: PublicationRatio,
    pub number_of_creos: u32,
    pub template: PublicationTemplate,
    #[serde(default)]
    pub phase: PublicationPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Template-specific rendering options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub readings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_path: Option<String>,
}

super::impl_document!(Publication, "publications");

impl Publication {
    pub fn width(&self) -> u32 {
        self.ratio.width()
    }

    pub fn height(&self) -> u32 {
        self.ratio.height()
    }

    /// A publication can be queued once it is configured, has at least one
    /// asset and one reading, and has not started yet.
    pub fn is_ready_to_run(&self) -> bool {
        self.configuration.as_ref().is_some_and(|c| !c.is_empty())
            && !self.assets.is_empty()
            && !self.readings.is_empty()
            && self.phase == PublicationPhase::New
    }

    /// Copy the publication's inputs into a fresh, unsaved run.
    ///
    /// Ids, run timestamps, task bookkeeping and errors are reset; the
    /// creation time is set to now.
    pub fn clone_as_new(&self) -> Self {
        Self {
            id: None,
            user_id: self.user_id.clone(),
            project_id: self.project_id.clone(),
            script_id: self.script_id.clone(),
            ratio: self.ratio,
            number_of_creos: self.number_of_creos,
            template: self.template,
            phase: PublicationPhase::New,
            create_time: Some(chrono::Utc::now().to_rfc3339()),
            start_time: None,
            end_time: None,
            configuration: self.configuration.clone(),
            assets: self.assets.clone(),
            readings: self.readings.clone(),
            task_id: None,
            error: None,
            zip_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Creatives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationCreativeStatus {
    #[default]
    New,
    CreatingSubtitles,
    Generating,
    Error,
    Done,
}

/// One rendered video of a publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationCreative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: PublicationCreativeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Output video file, once rendered.
    #[serde(default)]
    pub file_name: Option<String>,
}

super::impl_document!(PublicationCreative, "creatives");

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Share of progress attributed to asset preparation.
const PREPARING_PROGRESS: f64 = 0.1;

/// Snapshot of a publication run, reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationStatus {
    pub publication_id: String,
    pub publication_status: PublicationPhase,
    pub creatives_ready: u32,
    pub creatives_total: u32,
    #[serde(default)]
    pub creatives_statuses: BTreeMap<String, PublicationCreativeStatus>,
}

impl PublicationStatus {
    /// Progress in `[0, 1]` for every creative, keyed by creative id.
    ///
    /// All creatives share the phase-derived value: `new` is 0, asset
    /// preparation is 0.1, `done`/`error` is 1, and generation moves linearly
    /// from 0.1 to 1 with `creatives_ready / creatives_total`.
    pub fn progress(&self) -> BTreeMap<String, f64> {
        let total = self.creatives_total.max(1) as f64;
        let ready = self.creatives_ready as f64;

        let p = match self.publication_status {
            PublicationPhase::New => 0.0,
            PublicationPhase::PreparingAssets => PREPARING_PROGRESS,
            PublicationPhase::Done | PublicationPhase::Error => 1.0,
            PublicationPhase::Generating => {
                PREPARING_PROGRESS + (ready / total) * (1.0 - PREPARING_PROGRESS)
            }
        };
        let p = p.clamp(0.0, 1.0);

        self.creatives_statuses
            .keys()
            .map(|id| (id.clone(), p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(phase: PublicationPhase, ready: u32, total: u32) -> PublicationStatus {
        PublicationStatus {
            publication_id: "pub-1".into(),
            publication_status: phase,
            creatives_ready: ready,
            creatives_total: total,
            creatives_statuses: BTreeMap::from([
                ("c1".to_string(), PublicationCreativeStatus::Done),
                ("c2".to_string(), PublicationCreativeStatus::Generating),
            ]),
        }
    }

    fn publication() -> Publication {
        serde_json::from_value(serde_json::json!({
            "id": "p1",
            "script_id": "s1",
            "ratio": "9x16",
            "number_of_creos": 4,
            "template": "frames_stepper",
            "configuration": { "font": "Inter" },
            "assets": ["a1"],
            "readings": ["r1"],
            "task_id": "t-9"
        }))
        .unwrap()
    }

    // --- progress ---

    #[test]
    fn new_phase_is_zero() {
        let p = status(PublicationPhase::New, 0, 2).progress();
        assert_eq!(p.get("c1"), Some(&0.0));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn preparing_assets_is_ten_percent() {
        let p = status(PublicationPhase::PreparingAssets, 0, 2).progress();
        assert_eq!(p.get("c2"), Some(&0.1));
    }

    #[test]
    fn generating_scales_with_ready_share() {
        let p = status(PublicationPhase::Generating, 1, 2).progress();
        let v = p["c1"];
        assert!((v - 0.55).abs() < 1e-9);
        assert_eq!(p["c1"], p["c2"]);
    }

    #[test]
    fn generating_with_zero_total_does_not_divide_by_zero() {
        let p = status(PublicationPhase::Generating, 0, 0).progress();
        assert!((p["c1"] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn generating_is_clamped_to_one() {
        let p = status(PublicationPhase::Generating, 5, 2).progress();
        assert_eq!(p["c1"], 1.0);
    }

    #[test]
    fn terminal_phases_are_complete() {
        assert_eq!(status(PublicationPhase::Done, 0, 2).progress()["c1"], 1.0);
        assert_eq!(status(PublicationPhase::Error, 0, 2).progress()["c2"], 1.0);
    }

    // --- publication ---

    #[test]
    fn ratio_dimensions() {
        assert_eq!(PublicationRatio::Portrait9x16.height(), 1280);
        assert_eq!(PublicationRatio::Square1x1.height(), 720);
        assert_eq!(publication().width(), 720);
    }

    #[test]
    fn ready_to_run_requires_inputs_and_new_phase() {
        let mut p = publication();
        assert!(p.is_ready_to_run());

        p.phase = PublicationPhase::Generating;
        assert!(!p.is_ready_to_run());

        let mut p = publication();
        p.readings.clear();
        assert!(!p.is_ready_to_run());

        let mut p = publication();
        p.configuration = None;
        assert!(!p.is_ready_to_run());
    }

    #[test]
    fn clone_as_new_resets_run_state() {
        let mut p = publication();
        p.phase = PublicationPhase::Done;
        p.zip_path = Some("out.zip".into());

        let copy = p.clone_as_new();
        assert_eq!(copy.id, None);
        assert_eq!(copy.phase, PublicationPhase::New);
        assert_eq!(copy.task_id, None);
        assert_eq!(copy.zip_path, None);
        assert!(copy.create_time.is_some());
        assert_eq!(copy.assets, p.assets);
        assert!(copy.is_ready_to_run());
    }

    #[test]
    fn asset_type_uses_type_key() {
        let asset: Asset = serde_json::from_value(serde_json::json!({
            "name": "intro",
            "path": "p/intro.mp4",
            "type": "video_reading"
        }))
        .unwrap();
        assert_eq!(asset.asset_type, AssetType::VideoReading);
    }
}
