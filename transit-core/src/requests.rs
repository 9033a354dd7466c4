/*!
The request pipeline: ingestion schema and the two processing modes.

`make_base` consumes a JSON description (`base_requests`,
`render_settings`, `routing_settings`, `serialization_settings`) and
persists the filled engine as a binary snapshot. `process_requests`
consumes `serialization_settings` plus `stat_requests`, loads the
snapshot, rebuilds the routing graph from the restored catalogue and
answers the query batch on the output stream.
*/

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;

use geo::Point;
use serde::Deserialize;

use crate::catalogue::TransportCatalogue;
use crate::render::{MapRenderer, RenderSettings};
use crate::responses;
use crate::router::{RoutingSettings, TransportRouter};
use crate::snapshot::Snapshot;
use crate::Error;

#[derive(Debug, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub base_requests: Vec<BaseRequest>,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
    #[serde(default)]
    pub render_settings: RenderSettings,
    #[serde(default)]
    pub routing_settings: RoutingSettings,
    pub serialization_settings: SerializationSettings,
}

#[derive(Debug, Deserialize)]
pub struct SerializationSettings {
    pub file: PathBuf,
}

/// One `base_requests` entry.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        road_distances: BTreeMap<String, i32>,
    },
    Bus {
        name: String,
        is_roundtrip: bool,
        stops: Vec<String>,
    },
}

/// One `stat_requests` entry.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    Stop { id: i32, name: String },
    Bus { id: i32, name: String },
    Map { id: i32 },
    Route { id: i32, from: String, to: String },
}

/// The stored stop sequence of a described route: a round trip is kept
/// as given, anything else is mirrored into the full there-and-back
/// traversal (`A B C` becomes `A B C B A`).
fn traversal_order(stops: &[String], is_roundtrip: bool) -> Vec<&str> {
    let mut sequence: Vec<&str> = stops.iter().map(String::as_str).collect();
    if !is_roundtrip {
        sequence.extend(stops.iter().rev().skip(1).map(String::as_str));
    }
    sequence
}

/// Applies a `base_requests` batch: every stop first, then the distance
/// table, then the buses, so stop references and distances resolve no
/// matter how the description interleaves its entries.
pub fn fill_catalogue(
    catalogue: &mut TransportCatalogue,
    requests: &[BaseRequest],
) -> Result<(), Error> {
    let mut distances = Vec::new();
    for request in requests {
        if let BaseRequest::Stop {
            name,
            latitude,
            longitude,
            road_distances,
        } = request
        {
            catalogue.add_stop(name, Point::new(*longitude, *latitude));
            for (to, &meters) in road_distances {
                distances.push(((name.clone(), to.clone()), meters));
            }
        }
    }
    catalogue.set_distances(distances)?;

    for request in requests {
        if let BaseRequest::Bus {
            name,
            is_roundtrip,
            stops,
        } = request
        {
            let stop_ids = traversal_order(stops, *is_roundtrip)
                .into_iter()
                .filter_map(|stop| catalogue.find_stop(stop))
                .collect();
            catalogue.add_route(name, stop_ids, *is_roundtrip);
        }
    }
    Ok(())
}

/// The `make_base` mode: description in, snapshot file out.
pub fn make_base(input: impl Read) -> Result<(), Error> {
    let document: InputDocument = serde_json::from_reader(input)?;

    let mut catalogue = TransportCatalogue::new();
    fill_catalogue(&mut catalogue, &document.base_requests)?;
    log::info!(
        "catalogue filled: {} stops, {} buses",
        catalogue.stop_count(),
        catalogue.bus_count()
    );

    let mut router = TransportRouter::new(document.routing_settings);
    router.fill(&catalogue);

    Snapshot::build(&catalogue, &document.render_settings, &router)
        .save(&document.serialization_settings.file)
}

/// The `process_requests` mode: snapshot in, answer batch out.
pub fn process_requests(input: impl Read, output: impl Write) -> Result<(), Error> {
    let document: InputDocument = serde_json::from_reader(input)?;

    let snapshot = Snapshot::load(&document.serialization_settings.file)?;
    let catalogue = snapshot.restore_catalogue()?;
    let renderer = MapRenderer::new(snapshot.render_settings.clone());
    let mut router = TransportRouter::new(snapshot.router.settings);
    router.fill(&catalogue);

    let answers = responses::process(&catalogue, &renderer, &router, &document.stat_requests);
    serde_json::to_writer(output, &answers)?;
    Ok(())
}
