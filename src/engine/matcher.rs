use crate::geo::{cardinal_direction, distance_km, eta_minutes, DEFAULT_SPEED_KMH};
use crate::models::location::Coordinate;
use crate::models::matching::{MatchFilter, MatchResult};
use crate::models::vehicle::VehicleReport;

#[derive(Debug, Clone, Copy)]
pub struct VehicleMatcher {
    speed_kmh: f64,
}

impl Default for VehicleMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

impl VehicleMatcher {
    pub fn new(speed_kmh: f64) -> Self {
        debug_assert!(speed_kmh > 0.0, "speed must be positive, got {speed_kmh}");
        Self { speed_kmh }
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn find_best(
        &self,
        origin: &Coordinate,
        reports: &[VehicleReport],
        filter: &MatchFilter,
    ) -> Option<MatchResult> {
        self.rank(origin, reports, filter).into_iter().next()
    }

    /// Every report surviving the filter, soonest arrival first. Equal ETAs
    /// are ordered by vehicle id so the result never depends on feed order.
    pub fn rank(
        &self,
        origin: &Coordinate,
        reports: &[VehicleReport],
        filter: &MatchFilter,
    ) -> Vec<MatchResult> {
        let mut candidates: Vec<MatchResult> = reports
            .iter()
            .filter_map(|report| self.evaluate(origin, report, filter))
            .collect();

        candidates.sort_by(|a, b| {
            a.eta_minutes
                .total_cmp(&b.eta_minutes)
                .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
        });

        candidates
    }

    fn evaluate(
        &self,
        origin: &Coordinate,
        report: &VehicleReport,
        filter: &MatchFilter,
    ) -> Option<MatchResult> {
        let distance = distance_km(origin, &report.coordinate);
        if filter.max_distance_km.is_some_and(|max| distance > max) {
            return None;
        }

        let direction = report.heading.map(cardinal_direction);
        if let Some(wanted) = filter.direction {
            // a report without a heading cannot satisfy a direction filter
            if direction != Some(wanted) {
                return None;
            }
        }

        Some(MatchResult {
            vehicle_id: report.id.clone(),
            eta_minutes: eta_minutes(distance, self.speed_kmh),
            distance_km: distance,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::VehicleMatcher;
    use crate::models::location::Coordinate;
    use crate::models::matching::MatchFilter;
    use crate::models::vehicle::{CardinalDirection, VehicleReport};

    const ORIGIN: Coordinate = Coordinate {
        latitude: 41.85,
        longitude: -87.62,
    };

    fn report(id: &str, latitude: f64, longitude: f64, heading: Option<f64>) -> VehicleReport {
        VehicleReport {
            id: id.to_string(),
            coordinate: Coordinate {
                latitude,
                longitude,
            },
            heading,
            route: None,
        }
    }

    #[test]
    fn picks_the_soonest_arrival() {
        let reports = vec![
            report("A", 41.90, -87.62, None),
            report("B", 41.87, -87.62, None),
        ];

        let best = VehicleMatcher::default()
            .find_best(&ORIGIN, &reports, &MatchFilter::default())
            .unwrap();

        assert_eq!(best.vehicle_id, "B");
        assert!(best.eta_minutes > 0.0);
        assert!(best.direction.is_none());
    }

    #[test]
    fn equal_etas_break_ties_by_id() {
        let reports = vec![
            report("b", 41.86, -87.62, None),
            report("a", 41.86, -87.62, None),
            report("c", 41.86, -87.62, None),
        ];

        let ranked = VehicleMatcher::default().rank(&ORIGIN, &reports, &MatchFilter::default());
        let ids: Vec<&str> = ranked.iter().map(|m| m.vehicle_id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_reports_yield_no_match() {
        let best = VehicleMatcher::default().find_best(&ORIGIN, &[], &MatchFilter::default());
        assert!(best.is_none());
    }

    #[test]
    fn max_distance_excludes_far_vehicles() {
        let reports = vec![
            report("near", 41.851637, -87.619049, None),
            report("far", 41.721882, -87.618286, None),
        ];
        let matcher = VehicleMatcher::default();

        let ranked = matcher.rank(
            &ORIGIN,
            &reports,
            &MatchFilter {
                direction: None,
                max_distance_km: Some(1.0),
            },
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].vehicle_id, "near");

        let none = matcher.find_best(
            &ORIGIN,
            &reports,
            &MatchFilter {
                direction: None,
                max_distance_km: Some(0.01),
            },
        );
        assert!(none.is_none());
    }

    #[test]
    fn direction_filter_skips_other_headings() {
        let reports = vec![
            report("north", 41.90, -87.62, Some(0.0)),
            report("south", 41.86, -87.62, Some(180.0)),
        ];

        let best = VehicleMatcher::default()
            .find_best(
                &ORIGIN,
                &reports,
                &MatchFilter {
                    direction: Some(CardinalDirection::North),
                    max_distance_km: None,
                },
            )
            .unwrap();

        assert_eq!(best.vehicle_id, "north");
        assert_eq!(best.direction, Some(CardinalDirection::North));
    }

    #[test]
    fn direction_filter_excludes_reports_without_heading() {
        let reports = vec![
            report("nearest", 41.8501, -87.62, None),
            report("further", 41.95, -87.62, Some(100.0)),
        ];

        let best = VehicleMatcher::default()
            .find_best(
                &ORIGIN,
                &reports,
                &MatchFilter {
                    direction: Some(CardinalDirection::East),
                    max_distance_km: None,
                },
            )
            .unwrap();

        assert_eq!(best.vehicle_id, "further");
    }

    #[test]
    fn no_match_when_nothing_heads_the_right_way() {
        let reports = vec![
            report("1", 41.86, -87.62, Some(90.0)),
            report("2", 41.87, -87.62, None),
        ];

        let best = VehicleMatcher::default().find_best(
            &ORIGIN,
            &reports,
            &MatchFilter {
                direction: Some(CardinalDirection::West),
                max_distance_km: None,
            },
        );

        assert!(best.is_none());
    }

    #[test]
    fn heading_is_reported_without_a_filter() {
        let reports = vec![report("1", 41.86, -87.62, Some(200.0))];

        let best = VehicleMatcher::default()
            .find_best(&ORIGIN, &reports, &MatchFilter::default())
            .unwrap();

        assert_eq!(best.direction, Some(CardinalDirection::South));
    }

    #[test]
    fn default_speed_is_city_bus_average() {
        assert_eq!(VehicleMatcher::default().speed_kmh(), 32.0);
        assert_eq!(VehicleMatcher::new(16.0).speed_kmh(), 16.0);
    }

    #[test]
    fn slower_speed_means_longer_eta() {
        let reports = vec![report("1", 41.95, -87.62, None)];
        let filter = MatchFilter::default();

        let fast = VehicleMatcher::new(64.0).find_best(&ORIGIN, &reports, &filter).unwrap();
        let slow = VehicleMatcher::new(16.0).find_best(&ORIGIN, &reports, &filter).unwrap();

        assert!((slow.eta_minutes - fast.eta_minutes * 4.0).abs() < 1e-9);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let reports = vec![
            report("z", 41.90, -87.62, Some(10.0)),
            report("y", 41.86, -87.62, Some(10.0)),
        ];
        let before = format!("{reports:?}");

        let _ = VehicleMatcher::default().rank(&ORIGIN, &reports, &MatchFilter::default());

        assert_eq!(format!("{reports:?}"), before);
    }
}
