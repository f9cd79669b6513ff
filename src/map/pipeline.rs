use crate::error::RenderError;
use crate::geo::Extent;
use crate::hash::Fingerprint;
use std::fmt;

/// Countries to color in a render: the selection and its declared relations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub selected: String,
    pub allies: Vec<String>,
    pub enemies: Vec<String>,
}

/// Color role of a country in a highlighted render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Selected,
    Ally,
    Enemy,
}

impl Highlight {
    /// Role of `code`; the selection wins over relations, allies over enemies
    pub fn role(&self, code: &str) -> Option<Role> {
        if self.selected == code {
            Some(Role::Selected)
        } else if self.allies.iter().any(|c| c == code) {
            Some(Role::Ally)
        } else if self.enemies.iter().any(|c| c == code) {
            Some(Role::Enemy)
        } else {
            None
        }
    }
}

/// Reference to a rendered map image.
///
/// The token is derived from the extent and highlight alone, so repeating a
/// request yields the same handle and a changed request a different one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderHandle {
    token: String,
}

impl RenderHandle {
    pub fn for_request(extent: &Extent, highlight: Option<&Highlight>) -> Self {
        let mut fp = Fingerprint::new();
        for bound in extent.to_array() {
            fp = fp.float(bound);
        }
        match highlight {
            None => fp = fp.word(0),
            Some(h) => {
                fp = fp.word(1).str(&h.selected).word(h.allies.len() as u64);
                for code in &h.allies {
                    fp = fp.str(code);
                }
                fp = fp.word(h.enemies.len() as u64);
                for code in &h.enemies {
                    fp = fp.str(code);
                }
            }
        }
        Self {
            token: format!("map-{:016x}", fp.finish()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Produces a map image for an extent, optionally coloring a selection
pub trait RenderPipeline {
    fn render(
        &self,
        extent: &Extent,
        highlight: Option<&Highlight>,
    ) -> Result<RenderHandle, RenderError>;
}
