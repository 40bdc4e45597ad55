use crate::boundary::BoundaryStore;
use crate::types::{Region, RegionGeometry};
use geo::LineString;

/// Find the first region, in store order, whose outer ring contains
/// (`lat`, `lng`). Holes are ignored. A point on a shared border goes to the
/// region loaded first.
pub fn resolve(store: &BoundaryStore, lat: f64, lng: f64) -> Option<&Region> {
    store
        .all()
        .iter()
        .find(|region| geometry_contains(&region.geometry, lng, lat))
}

pub fn geometry_contains(geometry: &RegionGeometry, x: f64, y: f64) -> bool {
    match geometry {
        RegionGeometry::Polygon(polygon) => ring_contains(polygon.exterior(), x, y),
        RegionGeometry::MultiPolygon(multi) => multi
            .iter()
            .any(|polygon| ring_contains(polygon.exterior(), x, y)),
    }
}

/// Even-odd ray casting against a single ring, treated as cyclic.
///
/// An edge is crossed when exactly one endpoint lies strictly above `y` and
/// the edge meets the horizontal line at `y` strictly to the right of `x`.
pub fn ring_contains(ring: &LineString<f64>, x: f64, y: f64) -> bool {
    let coords = &ring.0;
    let Some(mut previous) = coords.last() else {
        return false;
    };

    let mut inside = false;
    for current in coords {
        let (xi, yi) = (current.x, current.y);
        let (xj, yj) = (previous.x, previous.y);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        previous = current;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, min: f64, max: f64) -> Region {
        Region {
            name: name.to_string(),
            geometry: RegionGeometry::Polygon(polygon![
                (x: min, y: min),
                (x: min, y: max),
                (x: max, y: max),
                (x: max, y: min),
            ]),
        }
    }

    #[test]
    fn test_single_square_scenario() {
        let store = BoundaryStore::from_regions(vec![square("TestState", 0.0, 10.0)]);

        assert_eq!(resolve(&store, 5.0, 5.0).map(|r| r.name.as_str()), Some("TestState"));
        assert!(resolve(&store, 20.0, 20.0).is_none());
    }

    #[test]
    fn test_points_strictly_inside_and_outside() {
        let store = BoundaryStore::from_regions(vec![square("TestState", 0.0, 10.0)]);

        for i in 1..10 {
            for j in 1..10 {
                let (lat, lng) = (i as f64 + 0.25, j as f64 - 0.5);
                assert!(
                    resolve(&store, lat, lng).is_some(),
                    "({lat}, {lng}) should be inside"
                );
            }
        }

        for (lat, lng) in [(-0.1, 5.0), (10.1, 5.0), (5.0, -0.1), (5.0, 10.1), (-3.0, -3.0), (15.0, 12.0)] {
            assert!(
                resolve(&store, lat, lng).is_none(),
                "({lat}, {lng}) should be outside"
            );
        }
    }

    #[test]
    fn test_edge_points_are_stable() {
        let store = BoundaryStore::from_regions(vec![square("TestState", 0.0, 10.0)]);

        for (lat, lng) in [(0.0, 5.0), (10.0, 5.0), (5.0, 0.0), (5.0, 10.0), (0.0, 0.0), (10.0, 10.0)] {
            let first = resolve(&store, lat, lng).map(|r| r.name.clone());
            for _ in 0..10 {
                assert_eq!(resolve(&store, lat, lng).map(|r| r.name.clone()), first);
            }
        }
    }

    #[test]
    fn test_multipolygon_matches_any_constituent() {
        let islands = Region {
            name: "Islands".to_string(),
            geometry: RegionGeometry::MultiPolygon(MultiPolygon::new(vec![
                polygon![(x: 0.0, y: 0.0), (x: 0.0, y: 2.0), (x: 2.0, y: 2.0), (x: 2.0, y: 0.0)],
                polygon![(x: 10.0, y: 10.0), (x: 10.0, y: 12.0), (x: 12.0, y: 12.0), (x: 12.0, y: 10.0)],
            ])),
        };
        let store = BoundaryStore::from_regions(vec![islands]);

        assert_eq!(resolve(&store, 1.0, 1.0).map(|r| r.name.as_str()), Some("Islands"));
        assert_eq!(resolve(&store, 11.0, 11.0).map(|r| r.name.as_str()), Some("Islands"));
        assert!(resolve(&store, 5.0, 5.0).is_none());
    }

    #[test]
    fn test_holes_are_ignored() {
        let donut = Region {
            name: "Donut".to_string(),
            geometry: RegionGeometry::Polygon(polygon!(
                exterior: [(x: 0.0, y: 0.0), (x: 0.0, y: 10.0), (x: 10.0, y: 10.0), (x: 10.0, y: 0.0)],
                interiors: [[(x: 4.0, y: 4.0), (x: 4.0, y: 6.0), (x: 6.0, y: 6.0), (x: 6.0, y: 4.0)]],
            )),
        };
        let store = BoundaryStore::from_regions(vec![donut]);

        assert_eq!(resolve(&store, 5.0, 5.0).map(|r| r.name.as_str()), Some("Donut"));
    }

    #[test]
    fn test_overlap_first_loaded_wins() {
        let store = BoundaryStore::from_regions(vec![
            square("Older", 0.0, 10.0),
            square("Newer", 5.0, 15.0),
        ]);

        assert_eq!(resolve(&store, 7.0, 7.0).map(|r| r.name.as_str()), Some("Older"));
        assert_eq!(resolve(&store, 12.0, 12.0).map(|r| r.name.as_str()), Some("Newer"));
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening upwards
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (0.0, 10.0),
            (3.0, 10.0),
            (3.0, 3.0),
            (7.0, 3.0),
            (7.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
        ]);

        assert!(ring_contains(&ring, 1.0, 8.0));
        assert!(ring_contains(&ring, 5.0, 1.0));
        assert!(!ring_contains(&ring, 5.0, 8.0));
    }

    #[test]
    fn test_empty_store_and_empty_ring() {
        let store = BoundaryStore::default();
        assert!(resolve(&store, 0.0, 0.0).is_none());
        assert!(!ring_contains(&LineString::new(vec![]), 0.0, 0.0));
    }
}
