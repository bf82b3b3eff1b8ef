use serde::{Deserialize, Serialize};

/// Stroke colors for each transformation family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgePalette {
    pub direct: String,
    pub derived: String,
    pub aggregated: String,
    pub joined: String,
    pub calculation: String,
    pub fallback: String,
}

impl Default for EdgePalette {
    fn default() -> Self {
        Theme::standard().edges
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub edges: EdgePalette,
}

impl Theme {
    pub fn standard() -> Self {
        Self {
            edges: EdgePalette {
                direct: "#10B981".to_string(),
                derived: "#3B82F6".to_string(),
                aggregated: "#A855F7".to_string(),
                joined: "#06B6D4".to_string(),
                calculation: "#8B5CF6".to_string(),
                fallback: "#6B7280".to_string(),
            },
        }
    }

    /// Lighter strokes for dark canvases.
    pub fn dark() -> Self {
        Self {
            edges: EdgePalette {
                direct: "#34D399".to_string(),
                derived: "#60A5FA".to_string(),
                aggregated: "#C084FC".to_string(),
                joined: "#22D3EE".to_string(),
                calculation: "#A78BFA".to_string(),
                fallback: "#9CA3AF".to_string(),
            },
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" | "light" => Some(Self::standard()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::standard()
    }
}
