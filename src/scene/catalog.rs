//! Static scene catalog
//!
//! Every shooting scene the camera knows about, with its default capture
//! parameters and guidance text. The table is immutable and lives for the whole
//! program; look entries up with [`descriptor`].

use crate::scene::params::{CaptureParameters, ExposureCompensation, FocusMode};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Identifier of a shooting scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneId {
    /// General purpose scene, also the fallback when detection is unsure
    #[default]
    Auto,
    Portrait,
    Landscape,
    Night,
    Food,
    Macro,
    Sport,
    Document,
}

impl SceneId {
    /// Every scene, in selector order
    pub const ALL: [SceneId; 8] = [
        SceneId::Auto,
        SceneId::Portrait,
        SceneId::Landscape,
        SceneId::Night,
        SceneId::Food,
        SceneId::Macro,
        SceneId::Sport,
        SceneId::Document,
    ];

    /// Scenes a classifier may return (everything except `auto`)
    pub const DETECTABLE: [SceneId; 7] = [
        SceneId::Portrait,
        SceneId::Landscape,
        SceneId::Night,
        SceneId::Food,
        SceneId::Macro,
        SceneId::Sport,
        SceneId::Document,
    ];

    /// Wire/label form of the id
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneId::Auto => "auto",
            SceneId::Portrait => "portrait",
            SceneId::Landscape => "landscape",
            SceneId::Night => "night",
            SceneId::Food => "food",
            SceneId::Macro => "macro",
            SceneId::Sport => "sport",
            SceneId::Document => "document",
        }
    }

    /// Check if this is the general `auto` scene
    pub fn is_auto(&self) -> bool {
        matches!(self, SceneId::Auto)
    }

    /// The catalog entry for this scene
    pub fn descriptor(&self) -> &'static SceneDescriptor {
        descriptor(*self)
    }
}

impl Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneId {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        SceneId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| format!("unknown scene '{}'", s.trim()))
    }
}

/// Default parameters as stored in the static table
#[derive(Debug, Clone, Copy)]
pub struct SceneDefaults {
    pub iso: u32,
    pub shutter_speed: &'static str,
    pub aperture: &'static str,
    pub ev: ExposureCompensation,
    pub focus_mode: FocusMode,
    pub hdr: Option<bool>,
}

impl SceneDefaults {
    /// Materialize as an owned parameter set
    pub fn to_params(&self) -> CaptureParameters {
        CaptureParameters {
            iso: self.iso,
            shutter_speed: self.shutter_speed.to_string(),
            aperture: self.aperture.to_string(),
            ev: self.ev,
            focus_mode: self.focus_mode,
            hdr: self.hdr,
        }
    }
}

/// Guidance text for a scene, grouped by topic
#[derive(Debug, Clone, Copy)]
pub struct SceneGuides {
    pub composition: &'static [&'static str],
    pub lighting: &'static [&'static str],
    pub operation: &'static [&'static str],
}

impl SceneGuides {
    /// All tips in composition, lighting, operation order
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        self.composition
            .iter()
            .chain(self.lighting.iter())
            .chain(self.operation.iter())
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.composition.is_empty() && self.lighting.is_empty() && self.operation.is_empty()
    }
}

/// One entry of the scene catalog
#[derive(Debug)]
pub struct SceneDescriptor {
    pub id: SceneId,
    pub name: &'static str,
    pub description: &'static str,
    pub defaults: SceneDefaults,
    pub guides: SceneGuides,
}

impl SceneDescriptor {
    /// Default capture parameters for this scene
    pub fn default_params(&self) -> CaptureParameters {
        self.defaults.to_params()
    }

    /// Pick one tip uniformly from all guide lists.
    ///
    /// Falls back to "<name> mode activated" when the scene has no tips at all.
    pub fn pick_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let tips: Vec<&'static str> = self.guides.all().collect();
        match tips.choose(rng) {
            Some(tip) => tip.to_string(),
            None => format!("{} mode activated", self.name),
        }
    }

    /// The first composition guide, shown when no transient hint is active
    pub fn primary_guide(&self) -> Option<&'static str> {
        self.guides.composition.first().copied()
    }
}

const fn defaults(
    iso: u32,
    shutter_speed: &'static str,
    aperture: &'static str,
    ev_tenths: i8,
    focus_mode: FocusMode,
    hdr: Option<bool>,
) -> SceneDefaults {
    SceneDefaults {
        iso,
        shutter_speed,
        aperture,
        ev: ExposureCompensation::from_tenths(ev_tenths),
        focus_mode,
        hdr,
    }
}

/// The scene catalog, in selector order
pub static SCENES: [SceneDescriptor; 8] = [
    SceneDescriptor {
        id: SceneId::Auto,
        name: "Smart Auto",
        description: "Detects the scene automatically with balanced settings",
        defaults: defaults(100, "1/125s", "f/1.8", 0, FocusMode::Auto, Some(true)),
        guides: SceneGuides {
            composition: &["Keep the phone level"],
            lighting: &["Lighting looks good"],
            operation: &["Tap the screen to focus"],
        },
    },
    SceneDescriptor {
        id: SceneId::Portrait,
        name: "Portrait",
        description: "Background blur with natural skin tones",
        defaults: defaults(200, "1/250s", "f/1.8", 3, FocusMode::Face, None),
        guides: SceneGuides {
            composition: &[
                "Ask your subject to look into the lens",
                "Step back a little to frame the full figure",
                "Try placing the subject on a rule-of-thirds line",
            ],
            lighting: &[
                "Look for soft light and avoid direct sun",
                "Move closer to the light to brighten the face",
            ],
            operation: &["Help your subject relax their expression"],
        },
    },
    SceneDescriptor {
        id: SceneId::Landscape,
        name: "Landscape",
        description: "Wide view with HDR enhancement",
        defaults: defaults(100, "1/1000s", "f/8.0", 0, FocusMode::Infinity, Some(true)),
        guides: SceneGuides {
            composition: &[
                "Level the horizon",
                "Aim for a 1:2 ratio of sky to ground",
                "Use the foreground to add depth",
            ],
            lighting: &[
                "Shooting into the light, HDR is on",
                "Golden hour gives the best light",
            ],
            operation: &["Hold the phone steady"],
        },
    },
    SceneDescriptor {
        id: SceneId::Night,
        name: "Night",
        description: "Long exposure with multi-frame noise reduction",
        defaults: defaults(1600, "1/15s", "f/1.8", 0, FocusMode::Auto, None),
        guides: SceneGuides {
            composition: &["Use city lights as leading lines"],
            lighting: &["Low light, sensitivity raised automatically"],
            operation: &[
                "Keep the phone absolutely still",
                "Long exposure in progress, do not move",
            ],
        },
    },
    SceneDescriptor {
        id: SceneId::Food,
        name: "Food",
        description: "Close-up detail with appetizing color",
        defaults: defaults(400, "1/125s", "f/2.0", 5, FocusMode::Macro, None),
        guides: SceneGuides {
            composition: &[
                "A 45 degree overhead angle looks most natural",
                "Get close to show the texture",
            ],
            lighting: &["Keep the phone's shadow off the food"],
            operation: &["Macro focus enabled"],
        },
    },
    SceneDescriptor {
        id: SceneId::Macro,
        name: "Macro",
        description: "Extreme close focus for fine detail",
        defaults: defaults(200, "1/125s", "f/2.8", 0, FocusMode::Macro, None),
        guides: SceneGuides {
            composition: &[
                "Stay very close (3-5 cm)",
                "Emphasize the subject's details",
            ],
            lighting: &["Add some fill light"],
            operation: &["Move slowly back and forth to find focus"],
        },
    },
    SceneDescriptor {
        id: SceneId::Sport,
        name: "Sport",
        description: "Fast shutter to freeze motion",
        defaults: defaults(800, "1/1000s", "f/2.8", 0, FocusMode::Continuous, None),
        guides: SceneGuides {
            composition: &["Leave room in the direction of motion"],
            lighting: &["Make sure there is plenty of light"],
            operation: &["Consider burst mode", "Pan with the moving subject"],
        },
    },
    SceneDescriptor {
        id: SceneId::Document,
        name: "Document",
        description: "Shadow removal with sharpened text",
        defaults: defaults(200, "1/250s", "f/4.0", 7, FocusMode::Auto, None),
        guides: SceneGuides {
            composition: &[
                "Shoot straight down and keep the edges parallel",
                "Fill the frame with the document",
            ],
            lighting: &["Avoid glare and reflections"],
            operation: &["Shadow removal enabled"],
        },
    },
];

impl Default for CaptureParameters {
    /// The `auto` scene's defaults
    fn default() -> Self {
        descriptor(SceneId::Auto).default_params()
    }
}

/// Look up a scene in the catalog
pub fn descriptor(id: SceneId) -> &'static SceneDescriptor {
    SCENES
        .iter()
        .find(|scene| scene.id == id)
        .unwrap_or(&SCENES[0])
}

/// Parse a classifier label into a detectable scene.
///
/// Returns `None` for `auto`, empty text, or anything outside the closed label set.
pub fn parse_label(raw: &str) -> Option<SceneId> {
    match raw.parse::<SceneId>() {
        Ok(id) if !id.is_auto() => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::params::{ParamKind, APERTURE_OPTIONS, ISO_OPTIONS, SHUTTER_OPTIONS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_covers_every_scene_once() {
        for id in SceneId::ALL {
            let matches = SCENES.iter().filter(|s| s.id == id).count();
            assert_eq!(matches, 1, "{} should appear exactly once", id);
            assert_eq!(descriptor(id).id, id);
        }
    }

    #[test]
    fn test_defaults_are_members_of_option_lists() {
        for scene in SCENES.iter() {
            let params = scene.default_params();
            assert!(ISO_OPTIONS.contains(&params.iso), "{} iso", scene.id);
            assert!(
                SHUTTER_OPTIONS.contains(&params.shutter_speed.as_str()),
                "{} shutter",
                scene.id
            );
            assert!(
                APERTURE_OPTIONS.contains(&params.aperture.as_str()),
                "{} aperture",
                scene.id
            );
            for kind in ParamKind::ALL {
                assert!(kind.index_in(&params).is_some(), "{} {}", scene.id, kind);
            }
        }
    }

    #[test]
    fn test_portrait_defaults() {
        let params = descriptor(SceneId::Portrait).default_params();
        assert_eq!(params.iso, 200);
        assert_eq!(params.aperture, "f/1.8");
        assert_eq!(params.ev.tenths(), 3);
        assert_eq!(params.focus_mode, FocusMode::Face);
        assert_eq!(params.hdr, None);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("PORTRAIT"), Some(SceneId::Portrait));
        assert_eq!(parse_label("  night\n"), Some(SceneId::Night));
        assert_eq!(parse_label("auto"), None);
        assert_eq!(parse_label(""), None);
        assert_eq!(parse_label("banana"), None);
        assert_eq!(parse_label("night."), None);
    }

    #[test]
    fn test_scene_id_from_str_accepts_auto() {
        assert_eq!("Auto".parse::<SceneId>(), Ok(SceneId::Auto));
        assert!("sunset".parse::<SceneId>().is_err());
    }

    #[test]
    fn test_pick_tip_comes_from_guides() {
        let mut rng = StdRng::seed_from_u64(7);
        let scene = descriptor(SceneId::Night);
        let tips: Vec<&str> = scene.guides.all().collect();
        for _ in 0..20 {
            let tip = scene.pick_tip(&mut rng);
            assert!(tips.contains(&tip.as_str()));
        }
    }

    #[test]
    fn test_pick_tip_fallback_when_empty() {
        let scene = SceneDescriptor {
            id: SceneId::Sport,
            name: "Sport",
            description: "",
            defaults: SCENES[0].defaults,
            guides: SceneGuides {
                composition: &[],
                lighting: &[],
                operation: &[],
            },
        };
        assert!(scene.guides.is_empty());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scene.pick_tip(&mut rng), "Sport mode activated");
        assert_eq!(scene.primary_guide(), None);
    }
}
