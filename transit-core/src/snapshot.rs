/*!
The binary snapshot codec.

A snapshot is one CBOR record carrying the catalogue (stops, buses,
distances by name), the renderer settings, and the routing state
(settings, graph dimensions, edge metadata, vertex allocations). The
writer and reader share the serde schema below, so they agree
byte-for-byte.

On load the catalogue is rebuilt through its normal insertion path
(stops first, then distances, then buses) and the routing graph is
reconstructed from the catalogue before queries are served, which is
equivalent to restoring the stored graph as long as the catalogue
round-trips faithfully.
*/

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::catalogue::TransportCatalogue;
use crate::render::RenderSettings;
use crate::router::{RouteItem, RoutingSettings, TransportRouter};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub catalogue: CatalogueRecord,
    pub render_settings: RenderSettings,
    pub router: RouterRecord,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogueRecord {
    pub stops: Vec<StopRecord>,
    pub buses: Vec<BusRecord>,
    pub distances: Vec<DistanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRecord {
    pub name: String,
    pub stops: Vec<String>,
    pub is_round: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub from: String,
    pub to: String,
    pub meters: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouterRecord {
    pub settings: RoutingSettings,
    pub vertex_count: usize,
    pub edges: Vec<EdgeRecord>,
    pub vertices: Vec<VertexRecord>,
}

/// One routing-graph edge with its descriptive metadata. `span_count` is
/// `-1` on wait edges, the spanned stop count on ride edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub name: String,
    pub span_count: i64,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub stop_name: String,
    pub start_wait: usize,
    pub end_wait: usize,
}

impl Snapshot {
    /// Captures the full engine state.
    #[must_use]
    pub fn build(
        catalogue: &TransportCatalogue,
        render_settings: &RenderSettings,
        router: &TransportRouter,
    ) -> Snapshot {
        let stops = catalogue
            .stops()
            .map(|stop| StopRecord {
                name: stop.name.clone(),
                latitude: stop.position.y(),
                longitude: stop.position.x(),
            })
            .collect();
        let buses = catalogue
            .buses()
            .map(|bus| BusRecord {
                name: bus.name.clone(),
                stops: bus
                    .stops
                    .iter()
                    .map(|&id| catalogue.stop(id).name.clone())
                    .collect(),
                is_round: bus.is_round,
            })
            .collect();
        let distances = catalogue
            .distances()
            .map(|(from, to, meters)| DistanceRecord {
                from: catalogue.stop(from).name.clone(),
                to: catalogue.stop(to).name.clone(),
                meters,
            })
            .collect();

        let edges = router
            .edges()
            .map(|(from, to, item)| EdgeRecord {
                from,
                to,
                weight: item.minutes(),
                name: match item {
                    RouteItem::Wait { stop_name, .. } => stop_name.clone(),
                    RouteItem::Ride { bus_name, .. } => bus_name.clone(),
                },
                span_count: match item {
                    RouteItem::Wait { .. } => -1,
                    RouteItem::Ride { span_count, .. } => *span_count as i64,
                },
                time: item.minutes(),
            })
            .collect();
        let vertices = router
            .stop_vertices()
            .iter()
            .map(|(stop_name, vertices)| VertexRecord {
                stop_name: stop_name.clone(),
                start_wait: vertices.start_wait.index(),
                end_wait: vertices.end_wait.index(),
            })
            .collect();

        Snapshot {
            catalogue: CatalogueRecord {
                stops,
                buses,
                distances,
            },
            render_settings: render_settings.clone(),
            router: RouterRecord {
                settings: router.settings(),
                vertex_count: router.vertex_count(),
                edges,
                vertices,
            },
        }
    }

    /// Writes the snapshot to `path`. A file that cannot be created is
    /// logged and skipped, leaving no snapshot behind.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("cannot create snapshot file {}: {err}", path.display());
                return Ok(());
            }
        };
        ciborium::ser::into_writer(self, BufWriter::new(file))?;
        Ok(())
    }

    /// Reads a snapshot back. A missing or unopenable file yields the
    /// empty snapshot, so every subsequent query answers "not found".
    pub fn load(path: &Path) -> Result<Snapshot, Error> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!(
                    "cannot open snapshot file {}, serving an empty catalogue: {err}",
                    path.display()
                );
                return Ok(Snapshot::default());
            }
        };
        Ok(ciborium::de::from_reader(BufReader::new(file))?)
    }

    /// Rebuilds the catalogue: stops, then distances, then buses, so the
    /// derived route metrics are recomputed through the same insertion
    /// path that produced them.
    pub fn restore_catalogue(&self) -> Result<TransportCatalogue, Error> {
        let mut catalogue = TransportCatalogue::new();
        for stop in &self.catalogue.stops {
            catalogue.add_stop(&stop.name, Point::new(stop.longitude, stop.latitude));
        }
        catalogue.set_distances(
            self.catalogue
                .distances
                .iter()
                .map(|record| ((record.from.clone(), record.to.clone()), record.meters)),
        )?;
        for bus in &self.catalogue.buses {
            let stops = bus
                .stops
                .iter()
                .filter_map(|name| catalogue.find_stop(name))
                .collect();
            catalogue.add_route(&bus.name, stops, bus.is_round);
        }
        Ok(catalogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> (TransportCatalogue, RenderSettings, TransportRouter) {
        let mut catalogue = TransportCatalogue::new();
        let a = catalogue.add_stop("A", Point::new(37.20829, 55.611087));
        let b = catalogue.add_stop("B", Point::new(37.209755, 55.595884));
        let c = catalogue.add_stop("C", Point::new(37.333324, 55.632761));
        catalogue
            .set_distances([
                (("A".to_string(), "B".to_string()), 3900),
                (("B".to_string(), "C".to_string()), 2400),
                (("C".to_string(), "A".to_string()), 4500),
            ])
            .unwrap();
        catalogue.add_route("750", vec![a, b, c, a], true);

        let render_settings = RenderSettings {
            width: 600.0,
            height: 400.0,
            ..RenderSettings::default()
        };
        let mut router = TransportRouter::new(RoutingSettings::default());
        router.fill(&catalogue);
        (catalogue, render_settings, router)
    }

    fn sorted_edges(snapshot: &Snapshot) -> Vec<EdgeRecord> {
        let mut edges = snapshot.router.edges.clone();
        edges.sort_by(|a, b| {
            (a.from, a.to, &a.name, a.span_count)
                .partial_cmp(&(b.from, b.to, &b.name, b.span_count))
                .unwrap()
        });
        edges
    }

    #[test]
    fn cbor_round_trip_is_exact() {
        let (catalogue, render_settings, router) = engine();
        let snapshot = Snapshot::build(&catalogue, &render_settings, &router);

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&snapshot, &mut bytes).unwrap();
        let decoded: Snapshot = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let (catalogue, render_settings, router) = engine();
        let snapshot = Snapshot::build(&catalogue, &render_settings, &router);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transport.db");
        snapshot.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&dir.path().join("absent.db")).unwrap();
        assert!(snapshot.catalogue.stops.is_empty());
        assert!(snapshot.catalogue.buses.is_empty());
    }

    #[test]
    fn unwritable_path_is_skipped() {
        let (catalogue, render_settings, router) = engine();
        let snapshot = Snapshot::build(&catalogue, &render_settings, &router);
        snapshot
            .save(Path::new("/nonexistent-dir/transport.db"))
            .unwrap();
    }

    #[test]
    fn catalogue_round_trips_with_equivalent_graph() {
        let (catalogue, render_settings, router) = engine();
        let snapshot = Snapshot::build(&catalogue, &render_settings, &router);

        let restored = snapshot.restore_catalogue().unwrap();
        assert_eq!(restored.stop_count(), catalogue.stop_count());
        assert_eq!(restored.bus_count(), catalogue.bus_count());

        let original = catalogue.find_route("750").map(|id| catalogue.bus(id)).unwrap();
        let rebuilt = restored.find_route("750").map(|id| restored.bus(id)).unwrap();
        assert_eq!(rebuilt.stops_on_route, original.stops_on_route);
        assert_eq!(rebuilt.unique_stops, original.unique_stops);
        assert_relative_eq!(rebuilt.factual_length, original.factual_length);
        assert_relative_eq!(
            rebuilt.length_by_coordinates,
            original.length_by_coordinates
        );

        // Rebuilding the router from the restored catalogue reproduces
        // the same edge set up to edge-id ordering.
        let mut rebuilt_router = TransportRouter::new(snapshot.router.settings);
        rebuilt_router.fill(&restored);
        let rebuilt_snapshot = Snapshot::build(&restored, &render_settings, &rebuilt_router);

        assert_eq!(rebuilt_snapshot.router.vertex_count, snapshot.router.vertex_count);
        assert_eq!(sorted_edges(&rebuilt_snapshot), sorted_edges(&snapshot));
    }
}
