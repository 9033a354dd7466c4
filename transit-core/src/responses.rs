/*!
The query responder: one JSON object per `stat_requests` entry, carrying
`request_id` and either the requested payload or
`{"error_message": "not found"}`.
*/

use serde_json::{json, Value};

use crate::catalogue::TransportCatalogue;
use crate::render::MapRenderer;
use crate::requests::StatRequest;
use crate::router::{RouteItem, TransportRouter};

/// Answers a query batch in order, producing the output array.
#[must_use]
pub fn process(
    catalogue: &TransportCatalogue,
    renderer: &MapRenderer,
    router: &TransportRouter,
    requests: &[StatRequest],
) -> Value {
    let answers = requests
        .iter()
        .map(|request| match request {
            StatRequest::Stop { id, name } => stop_info(catalogue, *id, name),
            StatRequest::Bus { id, name } => bus_info(catalogue, *id, name),
            StatRequest::Map { id } => map_info(catalogue, renderer, *id),
            StatRequest::Route { id, from, to } => route_info(router, *id, from, to),
        })
        .collect();
    Value::Array(answers)
}

fn not_found(id: i32) -> Value {
    json!({
        "request_id": id,
        "error_message": "not found",
    })
}

fn stop_info(catalogue: &TransportCatalogue, id: i32, name: &str) -> Value {
    if catalogue.find_stop(name).is_none() {
        return not_found(id);
    }

    let mut buses: Vec<&str> = catalogue
        .buses_on_stop(name)
        .map(|bus| catalogue.bus(bus).name.as_str())
        .collect();
    buses.sort_unstable();

    json!({
        "request_id": id,
        "buses": buses,
    })
}

fn bus_info(catalogue: &TransportCatalogue, id: i32, name: &str) -> Value {
    let Some(bus) = catalogue.find_route(name).map(|bus| catalogue.bus(bus)) else {
        return not_found(id);
    };

    json!({
        "request_id": id,
        "curvature": bus.factual_length / bus.length_by_coordinates,
        "stop_count": bus.stops_on_route,
        "unique_stop_count": bus.unique_stops,
        "route_length": bus.factual_length,
    })
}

fn map_info(catalogue: &TransportCatalogue, renderer: &MapRenderer, id: i32) -> Value {
    json!({
        "request_id": id,
        "map": renderer.render(catalogue).render(),
    })
}

fn route_info(router: &TransportRouter, id: i32, from: &str, to: &str) -> Value {
    let Some(info) = router.route(from, to) else {
        return not_found(id);
    };

    let items: Vec<Value> = info
        .items
        .iter()
        .map(|item| match item {
            RouteItem::Wait { stop_name, minutes } => json!({
                "type": "Wait",
                "stop_name": stop_name,
                "time": minutes,
            }),
            RouteItem::Ride {
                bus_name,
                span_count,
                minutes,
            } => json!({
                "type": "Bus",
                "bus": bus_name,
                "span_count": span_count,
                "time": minutes,
            }),
        })
        .collect();

    json!({
        "request_id": id,
        "total_time": info.total_time,
        "items": items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderSettings;
    use crate::router::RoutingSettings;
    use geo::Point;

    fn engine() -> (TransportCatalogue, MapRenderer, TransportRouter) {
        let mut catalogue = TransportCatalogue::new();
        let a = catalogue.add_stop("A", Point::new(37.20829, 55.611087));
        let b = catalogue.add_stop("B", Point::new(37.209755, 55.595884));
        catalogue
            .set_distances([(("A".to_string(), "B".to_string()), 2000)])
            .unwrap();
        catalogue.add_route("47", vec![a, b, a], false);

        let renderer = MapRenderer::new(RenderSettings::default());
        let mut router = TransportRouter::new(RoutingSettings::default());
        router.fill(&catalogue);
        (catalogue, renderer, router)
    }

    #[test]
    fn stop_payload_lists_sorted_buses() {
        let (catalogue, renderer, router) = engine();
        let request = StatRequest::Stop {
            id: 1,
            name: "A".to_string(),
        };
        let answer = &process(&catalogue, &renderer, &router, &[request])[0];

        assert_eq!(answer["request_id"], 1);
        assert_eq!(answer["buses"], json!(["47"]));
    }

    #[test]
    fn unknown_names_answer_not_found() {
        let (catalogue, renderer, router) = engine();
        let requests = [
            StatRequest::Stop {
                id: 7,
                name: "ZZZ".to_string(),
            },
            StatRequest::Bus {
                id: 8,
                name: "0".to_string(),
            },
            StatRequest::Route {
                id: 9,
                from: "A".to_string(),
                to: "ZZZ".to_string(),
            },
        ];
        let answers = process(&catalogue, &renderer, &router, &requests);

        for (i, id) in [7, 8, 9].into_iter().enumerate() {
            assert_eq!(answers[i]["request_id"], id);
            assert_eq!(answers[i]["error_message"], "not found");
        }
    }

    #[test]
    fn bus_payload_reports_metrics() {
        let (catalogue, renderer, router) = engine();
        let request = StatRequest::Bus {
            id: 2,
            name: "47".to_string(),
        };
        let answer = &process(&catalogue, &renderer, &router, &[request])[0];

        assert_eq!(answer["stop_count"], 3);
        assert_eq!(answer["unique_stop_count"], 2);
        assert_eq!(answer["route_length"], 4000.0);
        assert!(answer["curvature"].as_f64().unwrap() > 1.0);
    }

    #[test]
    fn wait_items_carry_the_stop_name_and_the_time() {
        let (catalogue, renderer, router) = engine();
        let request = StatRequest::Route {
            id: 3,
            from: "A".to_string(),
            to: "B".to_string(),
        };
        let answer = &process(&catalogue, &renderer, &router, &[request])[0];

        let wait = &answer["items"][0];
        assert_eq!(wait["type"], "Wait");
        assert_eq!(wait["stop_name"], "A");
        assert_eq!(wait["time"], 6.0);

        let ride = &answer["items"][1];
        assert_eq!(ride["type"], "Bus");
        assert_eq!(ride["bus"], "47");
        assert_eq!(ride["span_count"], 1);
        assert_eq!(ride["time"], 3.0);

        assert_eq!(answer["total_time"], 9.0);
    }

    #[test]
    fn zero_stop_bus_reports_counts_and_no_finite_curvature() {
        let (mut catalogue, renderer, _) = engine();
        catalogue.add_route("void", Vec::new(), false);
        let mut router = TransportRouter::new(RoutingSettings::default());
        router.fill(&catalogue);

        let request = StatRequest::Bus {
            id: 5,
            name: "void".to_string(),
        };
        let answer = &process(&catalogue, &renderer, &router, &[request])[0];

        assert_eq!(answer["stop_count"], 0);
        assert_eq!(answer["unique_stop_count"], 0);
        // 0.0 / 0.0 is not a JSON number; the responder still answers.
        assert!(answer["curvature"].is_null());
    }

    #[test]
    fn map_payload_embeds_the_document() {
        let (catalogue, renderer, router) = engine();
        let answer = &process(&catalogue, &renderer, &router, &[StatRequest::Map { id: 4 }])[0];
        let map = answer["map"].as_str().unwrap();
        assert!(map.starts_with("<?xml"));
        assert!(map.ends_with("</svg>"));
    }
}
