//! Nearest-wall selection and ad plane placement math
//!
//! Distances are in meters. The ad plane is an A3-like poster
//! (0.297 m x 0.42 m) floated slightly off the wall along its normal so it
//! does not z-fight with the wall mesh.

use bevy_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;

/// Geometry parameters for choosing a wall and placing an ad on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Anchors at or beyond this distance from the viewpoint are ignored
    #[serde(default = "default_max_distance")]
    pub max_eligible_distance: f32,
    /// Preferred viewing distance; the anchor closest to it wins
    #[serde(default = "default_ideal_distance")]
    pub ideal_distance: f32,
    /// Offset of the ad plane along the wall normal
    #[serde(default = "default_wall_offset")]
    pub wall_offset: f32,
    #[serde(default = "default_plane_width")]
    pub plane_width: f32,
    #[serde(default = "default_plane_height")]
    pub plane_height: f32,
    /// Thickness of the poster board
    #[serde(default = "default_plane_depth")]
    pub plane_depth: f32,
    /// How far text sits in front of the poster face
    #[serde(default = "default_text_offset")]
    pub text_offset: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_eligible_distance: default_max_distance(),
            ideal_distance: default_ideal_distance(),
            wall_offset: default_wall_offset(),
            plane_width: default_plane_width(),
            plane_height: default_plane_height(),
            plane_depth: default_plane_depth(),
            text_offset: default_text_offset(),
        }
    }
}

fn default_max_distance() -> f32 {
    2.0
}

fn default_ideal_distance() -> f32 {
    1.0
}

fn default_wall_offset() -> f32 {
    0.01
}

fn default_plane_width() -> f32 {
    0.297
}

fn default_plane_height() -> f32 {
    0.42
}

fn default_plane_depth() -> f32 {
    0.005
}

fn default_text_offset() -> f32 {
    0.003
}

/// Pick the wall anchor best suited for a new ad
///
/// Only vertical anchors strictly closer than `max_eligible_distance` are
/// considered. Among those, the one whose distance is nearest to
/// `ideal_distance` wins; on a tie the earlier anchor is kept.
pub fn select_target<'a, I>(viewpoint: Vec3, anchors: I, config: &PlacementConfig) -> Option<&'a Anchor>
where
    I: IntoIterator<Item = &'a Anchor>,
{
    let mut best: Option<(&'a Anchor, f32)> = None;

    for anchor in anchors {
        if !anchor.is_wall() {
            continue;
        }

        let distance = anchor.pose.distance_to(viewpoint);
        if !(distance < config.max_eligible_distance) {
            continue;
        }

        let error = (distance - config.ideal_distance).abs();
        match best {
            Some((_, best_error)) if best_error <= error => {}
            _ => best = Some((anchor, error)),
        }
    }

    best.map(|(anchor, _)| anchor)
}

/// World-space transform of an ad plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl PlaneTransform {
    /// Place an ad on an anchor: offset along the outward normal and rotate
    /// the canonical forward axis (+Z) onto the negated normal
    pub fn for_anchor(anchor: &Anchor, config: &PlacementConfig) -> Self {
        let normal = anchor.normal();
        let translation = anchor.pose.position + normal * config.wall_offset;
        let rotation = if normal == Vec3::ZERO {
            anchor.pose.rotation
        } else {
            Quat::from_rotation_arc(Vec3::Z, -normal)
        };

        Self {
            translation,
            rotation,
        }
    }
}

/// One line of ad text laid out on the poster
#[derive(Debug, Clone, PartialEq)]
pub struct TextBand {
    /// Line number, 0 is the top line
    pub index: usize,
    pub text: String,
    /// Vertical center of the band relative to the poster center
    pub center_y: f32,
    pub height: f32,
}

/// Lay out multi-line text as stacked horizontal bands
///
/// With `L` lines and poster height `H`, every band is `H / (L + 1)` tall and
/// the first band is centered at `H / 2 - H / (L + 1)`. Bands are
/// symmetric about the poster center and keep the input line order from top
/// to bottom.
pub fn layout_text_bands(text: &str, height: f32) -> Vec<TextBand> {
    let lines: Vec<&str> = text.split('\n').collect();
    let band_height = height / (lines.len() as f32 + 1.0);
    let start_y = height / 2.0 - band_height;

    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| TextBand {
            index,
            text: line.to_string(),
            center_y: start_y - band_height * index as f32,
            height: band_height,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorId, PlaneAlignment, Pose};

    fn wall_at(distance: f32) -> Anchor {
        Anchor::wall(Pose::from_position(Vec3::new(0.0, 0.0, -distance)))
    }

    fn selected_distance(distances: &[f32]) -> Option<f32> {
        let anchors: Vec<Anchor> = distances.iter().map(|d| wall_at(*d)).collect();
        select_target(Vec3::ZERO, &anchors, &PlacementConfig::default())
            .map(|a| a.pose.distance_to(Vec3::ZERO))
    }

    #[test]
    fn test_exact_ideal_distance_wins() {
        assert_eq!(selected_distance(&[0.5, 1.0, 1.6, 2.5]), Some(1.0));
    }

    #[test]
    fn test_closest_to_ideal_wins() {
        // |0.6 - 1.0| = 0.4 beats |1.5 - 1.0| = 0.5
        let picked = selected_distance(&[0.6, 1.5]).unwrap();
        assert!((picked - 0.6).abs() < 1e-5);
        let picked = selected_distance(&[0.4, 1.5]).unwrap();
        assert!((picked - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_beyond_threshold_never_selected() {
        assert_eq!(selected_distance(&[2.1]), None);
        assert_eq!(selected_distance(&[2.0]), None);
        let picked = selected_distance(&[2.1, 1.95]).unwrap();
        assert!((picked - 1.95).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_planes_ignored() {
        let floor = Anchor::new(
            AnchorId::new(),
            Pose::from_position(Vec3::new(0.0, -1.0, 0.0)),
            PlaneAlignment::Horizontal,
        );
        let anchors = vec![floor];
        assert!(select_target(Vec3::ZERO, &anchors, &PlacementConfig::default()).is_none());
    }

    #[test]
    fn test_empty_anchor_set() {
        let anchors: Vec<Anchor> = Vec::new();
        assert!(select_target(Vec3::ZERO, &anchors, &PlacementConfig::default()).is_none());
    }

    #[test]
    fn test_plane_offset_along_normal() {
        // Wall facing +X
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let anchor = Anchor::wall(Pose::new(Vec3::new(1.0, 0.0, 0.0), rotation));
        let transform = PlaneTransform::for_anchor(&anchor, &PlacementConfig::default());

        assert!(transform
            .translation
            .abs_diff_eq(Vec3::new(1.01, 0.0, 0.0), 1e-5));
        // Forward axis ends up opposite the wall normal
        assert!((transform.rotation * Vec3::Z).abs_diff_eq(-Vec3::X, 1e-5));
    }

    #[test]
    fn test_text_bands_two_lines() {
        let bands = layout_text_bands("Title\nSubtitle", 0.42);

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].text, "Title");
        assert_eq!(bands[1].text, "Subtitle");
        for band in &bands {
            assert!((band.height - 0.14).abs() < 1e-6);
        }
        assert!((bands[0].center_y - 0.07).abs() < 1e-6);
        assert!((bands[1].center_y + 0.07).abs() < 1e-6);
    }

    #[test]
    fn test_text_bands_centered_and_ordered() {
        for lines in 1..6 {
            let text = (0..lines)
                .map(|i| format!("line {}", i))
                .collect::<Vec<_>>()
                .join("\n");
            let height = 1.0;
            let bands = layout_text_bands(&text, height);

            assert_eq!(bands.len(), lines);
            let expected = height / (lines as f32 + 1.0);
            let mut sum = 0.0;
            for (i, band) in bands.iter().enumerate() {
                assert_eq!(band.index, i);
                assert_eq!(band.text, format!("line {}", i));
                assert!((band.height - expected).abs() < 1e-6);
                if i > 0 {
                    assert!(band.center_y < bands[i - 1].center_y);
                }
                sum += band.center_y;
            }
            assert!(sum.abs() < 1e-5, "bands not centered for {} lines", lines);
        }
    }

    #[test]
    fn test_single_line_centered() {
        let bands = layout_text_bands("Hello", 0.42);
        assert_eq!(bands.len(), 1);
        assert!(bands[0].center_y.abs() < 1e-6);
        assert!((bands[0].height - 0.21).abs() < 1e-6);
    }
}
