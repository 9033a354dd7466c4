/*!
The routing engine: a time-weighted directed multigraph over the catalogue
answering fastest-itinerary queries.

Wait-then-ride semantics are encoded by vertex splitting. Every stop owns
two vertices: `start_wait`, where a passenger arrives, and `end_wait`,
where they have finished waiting and may board. A single wait edge of
`bus_wait_time` minutes connects the pair, and for every ordered pair of
positions `(i, j)` with `j > i` along a bus a ride edge connects
`end_wait(stop_i)` to `start_wait(stop_j)`, weighted by the road distance
between the two positions at `bus_velocity`. A transfer therefore costs
exactly one extra pass through a wait edge.
*/

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::catalogue::TransportCatalogue;

mod dijkstra;

/// Converts meters over km/h into minutes.
const TO_MINUTES: f64 = 0.06;

/// Routing parameters from the `routing_settings` document key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Fixed boarding penalty at every stop, minutes.
    pub bus_wait_time: i32,
    /// Uniform bus speed, km/h.
    pub bus_velocity: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        RoutingSettings {
            bus_wait_time: 6,
            bus_velocity: 40.0,
        }
    }
}

/// One leg of an itinerary. Also the edge payload of the routing graph:
/// reconstructing an itinerary from a shortest path is a plain copy of
/// the traversed edges.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteItem {
    Wait { stop_name: String, minutes: f64 },
    Ride {
        bus_name: String,
        span_count: usize,
        minutes: f64,
    },
}

impl RouteItem {
    /// The edge weight.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        match self {
            RouteItem::Wait { minutes, .. } | RouteItem::Ride { minutes, .. } => *minutes,
        }
    }
}

/// A found itinerary: the minimum total travel time and its legs.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub total_time: f64,
    pub items: Vec<RouteItem>,
}

/// The vertex pair allocated to one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopVertices {
    pub start_wait: NodeIndex,
    pub end_wait: NodeIndex,
}

#[derive(Debug)]
pub struct TransportRouter {
    settings: RoutingSettings,
    graph: DiGraph<(), RouteItem>,
    stop_vertices: HashMap<String, StopVertices>,
}

impl TransportRouter {
    #[must_use]
    pub fn new(settings: RoutingSettings) -> Self {
        TransportRouter {
            settings,
            graph: DiGraph::new(),
            stop_vertices: HashMap::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> RoutingSettings {
        self.settings
    }

    /// Builds the routing graph from the catalogue: a vertex pair and a
    /// wait edge per stop in catalogue order, then ride edges for every
    /// ordered position pair along every bus, accumulating road distance
    /// as the inner position advances.
    pub fn fill(&mut self, catalogue: &TransportCatalogue) {
        for stop in catalogue.stops() {
            self.add_stop(&stop.name);
            self.add_wait_edge(&stop.name);
        }

        for bus in catalogue.buses() {
            for i in 0..bus.stops.len().saturating_sub(1) {
                let from = bus.stops[i];
                let mut previous = from;
                let mut accumulated = 0;

                for (j, &to) in bus.stops.iter().enumerate().skip(i + 1) {
                    let leg = catalogue
                        .distance(previous, to)
                        .or_else(|| catalogue.distance(to, previous))
                        .unwrap_or(0);
                    self.add_ride_edge(
                        &catalogue.stop(from).name,
                        &catalogue.stop(to).name,
                        &bus.name,
                        j - i,
                        accumulated + leg,
                    );
                    previous = to;
                    accumulated += leg;
                }
            }
        }

        log::info!(
            "routing graph: {} vertices, {} edges for {} stops",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.stop_vertices.len()
        );
    }

    /// Allocates the vertex pair of a stop. Vertices are numbered in
    /// allocation order, so the k-th stop receives `2k` and `2k + 1`.
    fn add_stop(&mut self, stop_name: &str) {
        if !self.stop_vertices.contains_key(stop_name) {
            let start_wait = self.graph.add_node(());
            let end_wait = self.graph.add_node(());
            self.stop_vertices
                .insert(stop_name.to_string(), StopVertices { start_wait, end_wait });
        }
    }

    fn add_wait_edge(&mut self, stop_name: &str) {
        let vertices = self.stop_vertices[stop_name];
        self.graph.add_edge(
            vertices.start_wait,
            vertices.end_wait,
            RouteItem::Wait {
                stop_name: stop_name.to_string(),
                minutes: f64::from(self.settings.bus_wait_time),
            },
        );
    }

    fn add_ride_edge(
        &mut self,
        from: &str,
        to: &str,
        bus_name: &str,
        span_count: usize,
        meters: i32,
    ) {
        self.graph.add_edge(
            self.stop_vertices[from].end_wait,
            self.stop_vertices[to].start_wait,
            RouteItem::Ride {
                bus_name: bus_name.to_string(),
                span_count,
                minutes: f64::from(meters) / self.settings.bus_velocity * TO_MINUTES,
            },
        );
    }

    /// Fastest itinerary between two named stops, or `None` when either
    /// name is unknown to the routing graph or no path exists.
    #[must_use]
    pub fn route(&self, from: &str, to: &str) -> Option<RouteInfo> {
        let from = self.stop_vertices.get(from)?;
        let to = self.stop_vertices.get(to)?;

        let (total_time, edges) = dijkstra::shortest_path(&self.graph, from.start_wait, to.start_wait)?;
        let items = edges.into_iter().map(|edge| self.graph[edge].clone()).collect();

        Some(RouteInfo { total_time, items })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Edges in id order as `(from, to, payload)`, for snapshot writing.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &RouteItem)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index(), edge.weight()))
    }

    /// Vertex allocations per stop name, for snapshot writing.
    #[must_use]
    pub fn stop_vertices(&self) -> &HashMap<String, StopVertices> {
        &self.stop_vertices
    }
}
