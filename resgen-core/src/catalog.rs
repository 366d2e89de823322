//! Static table of the platforms the generator knows about and the images each of them needs.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Icon,
    Splash,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::Icon, ResourceType::Splash];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Icon => "icon",
            ResourceType::Splash => "splash",
        }
    }

    /// Name of the directory below `resources/<platform>/` the images are installed to.
    pub fn dir_name(&self) -> &'static str {
        self.as_str()
    }

    /// Base name of the source image, e.g. `icon` for `icon.png`.
    pub fn source_file_stem(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted source image extensions, in order of precedence.
pub const SOURCE_EXTENSIONS: &[&str] = &["psd", "ai", "png"];

/// Attributes copied from an image to its node in the configuration document.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeAttribute {
    Src,
    Density,
    Width,
    Height,
}

impl NodeAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            NodeAttribute::Src => "src",
            NodeAttribute::Density => "density",
            NodeAttribute::Width => "width",
            NodeAttribute::Height => "height",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub density: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub node_name: &'static str,
    pub node_attributes: &'static [NodeAttribute],
    pub images: &'static [ImageSpec],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    pub name: &'static str,
    pub icon: ResourceSpec,
    pub splash: ResourceSpec,
}

impl PlatformSpec {
    pub fn resource(&self, res_type: ResourceType) -> &ResourceSpec {
        match res_type {
            ResourceType::Icon => &self.icon,
            ResourceType::Splash => &self.splash,
        }
    }
}

const fn density(name: &'static str, width: u32, height: u32, density: &'static str) -> ImageSpec {
    ImageSpec {
        name,
        width,
        height,
        density: Some(density),
    }
}

const fn sized(name: &'static str, width: u32, height: u32) -> ImageSpec {
    ImageSpec {
        name,
        width,
        height,
        density: None,
    }
}

const DENSITY_ATTRIBUTES: &[NodeAttribute] = &[NodeAttribute::Src, NodeAttribute::Density];
const SIZE_ATTRIBUTES: &[NodeAttribute] = &[
    NodeAttribute::Src,
    NodeAttribute::Width,
    NodeAttribute::Height,
];

pub static PLATFORMS: &[PlatformSpec] = &[
    PlatformSpec {
        name: "android",
        icon: ResourceSpec {
            node_name: "icon",
            node_attributes: DENSITY_ATTRIBUTES,
            images: &[
                density("drawable-ldpi-icon.png", 36, 36, "ldpi"),
                density("drawable-mdpi-icon.png", 48, 48, "mdpi"),
                density("drawable-hdpi-icon.png", 72, 72, "hdpi"),
                density("drawable-xhdpi-icon.png", 96, 96, "xhdpi"),
                density("drawable-xxhdpi-icon.png", 144, 144, "xxhdpi"),
                density("drawable-xxxhdpi-icon.png", 192, 192, "xxxhdpi"),
            ],
        },
        splash: ResourceSpec {
            node_name: "splash",
            node_attributes: DENSITY_ATTRIBUTES,
            images: &[
                density("drawable-land-ldpi-screen.png", 320, 200, "land-ldpi"),
                density("drawable-land-mdpi-screen.png", 480, 320, "land-mdpi"),
                density("drawable-land-hdpi-screen.png", 800, 480, "land-hdpi"),
                density("drawable-land-xhdpi-screen.png", 1280, 720, "land-xhdpi"),
                density("drawable-land-xxhdpi-screen.png", 1600, 960, "land-xxhdpi"),
                density("drawable-land-xxxhdpi-screen.png", 1920, 1280, "land-xxxhdpi"),
                density("drawable-port-ldpi-screen.png", 200, 320, "port-ldpi"),
                density("drawable-port-mdpi-screen.png", 320, 480, "port-mdpi"),
                density("drawable-port-hdpi-screen.png", 480, 800, "port-hdpi"),
                density("drawable-port-xhdpi-screen.png", 720, 1280, "port-xhdpi"),
                density("drawable-port-xxhdpi-screen.png", 960, 1600, "port-xxhdpi"),
                density("drawable-port-xxxhdpi-screen.png", 1280, 1920, "port-xxxhdpi"),
            ],
        },
    },
    PlatformSpec {
        name: "ios",
        icon: ResourceSpec {
            node_name: "icon",
            node_attributes: SIZE_ATTRIBUTES,
            images: &[
                sized("icon.png", 57, 57),
                sized("icon@2x.png", 114, 114),
                sized("icon-40.png", 40, 40),
                sized("icon-40@2x.png", 80, 80),
                sized("icon-50.png", 50, 50),
                sized("icon-50@2x.png", 100, 100),
                sized("icon-60.png", 60, 60),
                sized("icon-60@2x.png", 120, 120),
                sized("icon-60@3x.png", 180, 180),
                sized("icon-72.png", 72, 72),
                sized("icon-72@2x.png", 144, 144),
                sized("icon-76.png", 76, 76),
                sized("icon-76@2x.png", 152, 152),
                sized("icon-small.png", 29, 29),
                sized("icon-small@2x.png", 58, 58),
                sized("icon-small@3x.png", 87, 87),
            ],
        },
        splash: ResourceSpec {
            node_name: "splash",
            node_attributes: SIZE_ATTRIBUTES,
            images: &[
                sized("Default-568h@2x~iphone.png", 640, 1136),
                sized("Default-667h.png", 750, 1334),
                sized("Default-736h.png", 1242, 2208),
                sized("Default-Landscape-736h.png", 2208, 1242),
                sized("Default-Landscape@2x~ipad.png", 2048, 1536),
                sized("Default-Landscape~ipad.png", 1024, 768),
                sized("Default-Portrait@2x~ipad.png", 1536, 2048),
                sized("Default-Portrait~ipad.png", 768, 1024),
                sized("Default@2x~iphone.png", 640, 960),
                sized("Default~iphone.png", 320, 480),
            ],
        },
    },
];

pub fn platform(name: &str) -> Option<&'static PlatformSpec> {
    PLATFORMS.iter().find(|p| p.name == name)
}

/// Candidate source file names for a resource type, in order of precedence.
pub fn source_file_names(res_type: ResourceType) -> Vec<String> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{}", res_type.source_file_stem(), ext))
        .collect()
}
