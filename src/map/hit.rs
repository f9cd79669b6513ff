use crate::geo::GeoPoint;
use crate::map::index::{CountryEntry, CountryIndex};

/// First country in index order whose outline contains `p`.
///
/// The spatial grid only narrows the candidates; its cell lists are ascending
/// so the result is the same as a full scan.
pub fn hit_test(index: &CountryIndex, p: GeoPoint) -> Option<&CountryEntry> {
    let entries = index.all();
    index
        .grid()
        .query_point(p)
        .iter()
        .map(|&idx| &entries[idx])
        .find(|entry| entry.shape.contains(p))
}

/// Reference scan over every country, no prefilter
pub fn hit_test_linear(index: &CountryIndex, p: GeoPoint) -> Option<&CountryEntry> {
    index.all().iter().find(|entry| entry.shape.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::shape::{Polygon, Shape};

    fn rect_country(code: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> CountryEntry {
        let ring = vec![
            GeoPoint::new(x0, y0),
            GeoPoint::new(x1, y0),
            GeoPoint::new(x1, y1),
            GeoPoint::new(x0, y1),
            GeoPoint::new(x0, y0),
        ];
        CountryEntry {
            code: code.to_string(),
            name: format!("{code} land"),
            shape: Shape::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    fn sample_index() -> CountryIndex {
        CountryIndex::new(vec![
            rect_country("AAA", -20.0, -20.0, 20.0, 20.0),
            rect_country("BBB", 10.0, 10.0, 40.0, 40.0),
            rect_country("CCC", 100.0, -50.0, 150.0, -10.0),
        ])
    }

    #[test]
    fn finds_containing_country() {
        let index = sample_index();
        let hit = hit_test(&index, GeoPoint::new(120.0, -30.0)).unwrap();
        assert_eq!(hit.code, "CCC");
    }

    #[test]
    fn overlap_resolves_to_first_in_index_order() {
        let index = sample_index();
        let hit = hit_test(&index, GeoPoint::new(15.0, 15.0)).unwrap();
        assert_eq!(hit.code, "AAA");
    }

    #[test]
    fn ocean_point_misses() {
        let index = sample_index();
        assert!(hit_test(&index, GeoPoint::new(-100.0, 60.0)).is_none());
    }

    #[test]
    fn empty_index_never_matches() {
        let index = CountryIndex::empty();
        assert!(hit_test(&index, GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn repeated_queries_agree_with_linear_scan() {
        let index = sample_index();
        for lon in (-180..=180).step_by(7) {
            for lat in (-90..=90).step_by(5) {
                let p = GeoPoint::new(lon as f64 + 0.25, lat as f64 + 0.25);
                let a = hit_test(&index, p).map(|e| e.code.clone());
                let b = hit_test(&index, p).map(|e| e.code.clone());
                let c = hit_test_linear(&index, p).map(|e| e.code.clone());
                assert_eq!(a, b);
                assert_eq!(a, c);
            }
        }
    }
}
