/*!
The transport catalogue: an interned store of stops, buses and asymmetric
road distances.

# Structs
- `TransportCatalogue`: owner of the stop and bus arenas plus every index
  over them.
- `Stop`: a named geographic point.
- `Bus`: a named route over stops, with metrics derived at insertion time.

Stops and buses live in append-only arenas; everything else (bus stop
sequences, the distance table, the stop-to-buses index, the routing graph)
refers to them through the lightweight [`StopId`] / [`BusId`] handles,
which stay valid for the lifetime of the catalogue.
*/

use std::collections::BTreeMap;

use geo::Point;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;

use crate::geodesy;
use crate::Error;

/// Stable handle to a stop interned in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(u32);

/// Stable handle to a bus interned in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusId(u32);

/// A named geographic point served by one or more buses.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    /// `x` = longitude, `y` = latitude, decimal degrees.
    pub position: Point<f64>,
}

/// A named route: the stored stop sequence is the order a passenger
/// experiences (a non-circular route arrives here already mirrored).
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub name: String,
    pub stops: Vec<StopId>,
    pub is_round: bool,
    /// Sum of great-circle distances between consecutive stops, meters.
    pub length_by_coordinates: f64,
    /// Sum of looked-up road distances between consecutive stops, meters.
    /// Every consecutive pair unknown in both directions contributes −1.
    pub factual_length: f64,
    pub stops_on_route: usize,
    pub unique_stops: usize,
}

#[derive(Debug, Default)]
pub struct TransportCatalogue {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    stop_index: HashMap<String, StopId>,
    bus_index: HashMap<String, BusId>,
    stop_to_buses: HashMap<StopId, HashSet<BusId>>,
    distances: HashMap<(StopId, StopId), i32>,
}

impl TransportCatalogue {
    #[must_use]
    pub fn new() -> Self {
        TransportCatalogue::default()
    }

    /// Interns a stop and returns its handle.
    ///
    /// Duplicate names are an ingester contract violation; the name index
    /// keeps the last writer, matching the map semantics of the ingestion
    /// schema.
    pub fn add_stop(&mut self, name: &str, position: Point<f64>) -> StopId {
        let id = StopId(self.stops.len() as u32);
        self.stops.push(Stop {
            name: name.to_string(),
            position,
        });
        self.stop_index.insert(name.to_string(), id);
        self.stop_to_buses.entry(id).or_default();
        id
    }

    /// Interns a bus with an already-resolved stop sequence, computing its
    /// derived metrics and updating the stop-to-buses index.
    pub fn add_route(&mut self, name: &str, stops: Vec<StopId>, is_round: bool) -> BusId {
        let id = BusId(self.buses.len() as u32);

        let mut length_by_coordinates = 0.0;
        let mut factual_length = 0.0;
        for (&from, &to) in stops.iter().tuple_windows() {
            length_by_coordinates +=
                geodesy::distance(self.stop(from).position, self.stop(to).position);
            match self.distance(from, to).or_else(|| self.distance(to, from)) {
                Some(meters) => factual_length += f64::from(meters),
                // Marker for a pair unknown in both directions.
                None => factual_length += -1.0,
            }
        }

        let unique_stops = stops.iter().collect::<HashSet<_>>().len();
        for &stop in &stops {
            self.stop_to_buses.entry(stop).or_default().insert(id);
        }

        self.buses.push(Bus {
            name: name.to_string(),
            stops_on_route: stops.len(),
            unique_stops,
            stops,
            is_round,
            length_by_coordinates,
            factual_length,
        });
        self.bus_index.insert(name.to_string(), id);
        id
    }

    #[must_use]
    pub fn find_stop(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    #[must_use]
    pub fn find_route(&self, name: &str) -> Option<BusId> {
        self.bus_index.get(name).copied()
    }

    #[must_use]
    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.0 as usize]
    }

    #[must_use]
    pub fn bus(&self, id: BusId) -> &Bus {
        &self.buses[id.0 as usize]
    }

    /// Stops in insertion order. The routing graph derives its vertex
    /// numbering from this order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.iter()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    #[must_use]
    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Populates the asymmetric distance table. Stop names are resolved
    /// at call time, so every referenced stop must already be interned.
    pub fn set_distances(
        &mut self,
        distances: impl IntoIterator<Item = ((String, String), i32)>,
    ) -> Result<(), Error> {
        for ((from, to), meters) in distances {
            let from = self
                .find_stop(&from)
                .ok_or_else(|| Error::UnknownStop(from.clone()))?;
            let to = self
                .find_stop(&to)
                .ok_or_else(|| Error::UnknownStop(to.clone()))?;
            self.distances.insert((from, to), meters);
        }
        Ok(())
    }

    /// Road distance stored for exactly this direction. Consumers that
    /// want the reverse-direction fallback perform the second lookup
    /// themselves.
    #[must_use]
    pub fn distance(&self, from: StopId, to: StopId) -> Option<i32> {
        self.distances.get(&(from, to)).copied()
    }

    /// All stored distance entries, for snapshot writing.
    pub fn distances(&self) -> impl Iterator<Item = (StopId, StopId, i32)> + '_ {
        self.distances
            .iter()
            .map(|(&(from, to), &meters)| (from, to, meters))
    }

    /// Buses whose stored sequence contains the named stop. An unknown
    /// stop yields an empty iterator.
    pub fn buses_on_stop<'a>(&'a self, name: &str) -> impl Iterator<Item = BusId> + 'a {
        self.find_stop(name)
            .and_then(|id| self.stop_to_buses.get(&id))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Buses ordered lexicographically by name, as the renderer draws
    /// them.
    #[must_use]
    pub fn sorted_buses(&self) -> BTreeMap<&str, BusId> {
        self.bus_index
            .iter()
            .map(|(name, &id)| (name.as_str(), id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn catalogue_with_stops(names: &[(&str, f64, f64)]) -> (TransportCatalogue, Vec<StopId>) {
        let mut catalogue = TransportCatalogue::new();
        let ids = names
            .iter()
            .map(|&(name, lat, lng)| catalogue.add_stop(name, Point::new(lng, lat)))
            .collect();
        (catalogue, ids)
    }

    #[test]
    fn route_metrics() {
        let (mut catalogue, ids) = catalogue_with_stops(&[
            ("A", 55.611087, 37.20829),
            ("B", 55.595884, 37.209755),
            ("C", 55.632761, 37.333324),
        ]);
        catalogue
            .set_distances([
                (("A".to_string(), "B".to_string()), 3900),
                (("B".to_string(), "C".to_string()), 2400),
                (("C".to_string(), "A".to_string()), 4500),
            ])
            .unwrap();

        let bus = catalogue.add_route("750", vec![ids[0], ids[1], ids[2], ids[0]], true);
        let bus = catalogue.bus(bus);
        assert_eq!(bus.stops_on_route, 4);
        assert_eq!(bus.unique_stops, 3);
        assert_relative_eq!(bus.factual_length, 10800.0);
        assert!(bus.length_by_coordinates > 0.0);
    }

    #[test]
    fn asymmetric_distance_lookup() {
        let (mut catalogue, ids) = catalogue_with_stops(&[("A", 55.0, 37.0), ("B", 55.1, 37.1)]);
        catalogue
            .set_distances([(("A".to_string(), "B".to_string()), 1000)])
            .unwrap();

        assert_eq!(catalogue.distance(ids[0], ids[1]), Some(1000));
        assert_eq!(catalogue.distance(ids[1], ids[0]), None);

        // The accumulator walks the reverse leg through the fallback.
        let bus = catalogue.add_route("1", vec![ids[0], ids[1], ids[0]], false);
        assert_relative_eq!(catalogue.bus(bus).factual_length, 2000.0);
    }

    #[test]
    fn unknown_pair_marks_factual_length() {
        let (mut catalogue, ids) = catalogue_with_stops(&[("A", 55.0, 37.0), ("B", 55.1, 37.1)]);
        let bus = catalogue.add_route("n", vec![ids[0], ids[1]], true);
        assert_relative_eq!(catalogue.bus(bus).factual_length, -1.0);
    }

    #[test]
    fn distances_to_missing_stop_are_rejected() {
        let (mut catalogue, _) = catalogue_with_stops(&[("A", 55.0, 37.0)]);
        let result = catalogue.set_distances([(("A".to_string(), "ZZZ".to_string()), 100)]);
        assert!(matches!(result, Err(Error::UnknownStop(name)) if name == "ZZZ"));
    }

    #[test]
    fn stop_to_buses_index() {
        let (mut catalogue, ids) = catalogue_with_stops(&[("A", 55.0, 37.0), ("B", 55.1, 37.1)]);
        let bus = catalogue.add_route("10", vec![ids[0], ids[1], ids[0]], false);

        assert_eq!(catalogue.buses_on_stop("A").collect::<Vec<_>>(), vec![bus]);
        assert_eq!(catalogue.buses_on_stop("B").collect::<Vec<_>>(), vec![bus]);
        assert_eq!(catalogue.buses_on_stop("ZZZ").count(), 0);
    }

    #[test]
    fn empty_route_is_stored() {
        let (mut catalogue, _) = catalogue_with_stops(&[]);
        let bus = catalogue.add_route("void", Vec::new(), false);
        let bus = catalogue.bus(bus);
        assert_eq!(bus.stops_on_route, 0);
        assert_eq!(bus.unique_stops, 0);
        assert_eq!(bus.length_by_coordinates, 0.0);
    }

    #[test]
    fn sorted_buses_are_lexicographic() {
        let (mut catalogue, ids) = catalogue_with_stops(&[("A", 55.0, 37.0)]);
        catalogue.add_route("828", vec![ids[0]], true);
        catalogue.add_route("256", vec![ids[0]], true);
        let names: Vec<&str> = catalogue.sorted_buses().into_keys().collect();
        assert_eq!(names, vec!["256", "828"]);
    }
}
