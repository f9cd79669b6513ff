use crate::config::HIT_GRID_CELL_DEGREES;
use crate::map::shape::Shape;
use crate::map::spatial::FeatureGrid;

/// One country's outline as loaded from the geometry source
#[derive(Debug, Clone, PartialEq)]
pub struct CountryEntry {
    /// ISO 3166-1 alpha-3 code
    pub code: String,
    pub name: String,
    pub shape: Shape,
}

/// Country geometry loaded once at startup and shared read-only.
///
/// Entries keep the order of the source file; hit testing and rendering walk
/// them in that order.
pub struct CountryIndex {
    entries: Vec<CountryEntry>,
    grid: FeatureGrid,
}

impl CountryIndex {
    pub fn new(entries: Vec<CountryEntry>) -> Self {
        let grid = FeatureGrid::build(
            entries.iter().map(|e| e.shape.bbox()),
            HIT_GRID_CELL_DEGREES,
        );
        Self { entries, grid }
    }

    /// Index with no countries; every hit test misses
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn all(&self) -> &[CountryEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, code: &str) -> Option<&CountryEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn grid(&self) -> &FeatureGrid {
        &self.grid
    }
}

impl Default for CountryIndex {
    fn default() -> Self {
        Self::empty()
    }
}
