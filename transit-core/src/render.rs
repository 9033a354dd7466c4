/*!
The map renderer: projects stop coordinates onto a bounded canvas and
emits the network as layered vector graphics.

The projection is equirectangular with an isotropic fit: one zoom factor,
the smaller of the horizontal and vertical fits, is applied to both axes
so the map keeps its aspect ratio. Layers are emitted in a fixed order
(route polylines, bus labels, stop circles, stop labels), each iterating
buses or stops lexicographically by name.
*/

use std::collections::BTreeMap;

use geo::Point;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::catalogue::{BusId, StopId, TransportCatalogue};
use crate::svg;
use crate::svg::PathStyle;

const EPSILON: f64 = 1e-6;

fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Canvas and typography options from the `render_settings` document key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub stop_radius: f64,
    pub line_width: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: [f64; 2],
    pub stop_label_font_size: u32,
    pub stop_label_offset: [f64; 2],
    pub underlayer_color: svg::Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<svg::Color>,
}

/// Maps geographic coordinates onto the canvas.
struct SphereProjector {
    padding: f64,
    min_lng: f64,
    max_lat: f64,
    zoom: f64,
}

impl SphereProjector {
    fn new(points: &[Point<f64>], width: f64, height: f64, padding: f64) -> Self {
        let mut projector = SphereProjector {
            padding,
            min_lng: 0.0,
            max_lat: 0.0,
            zoom: 0.0,
        };

        let (min_lng, max_lng) = match points.iter().map(|p| p.x()).minmax() {
            MinMaxResult::NoElements => return projector,
            MinMaxResult::OneElement(lng) => (lng, lng),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let (min_lat, max_lat) = match points.iter().map(|p| p.y()).minmax() {
            MinMaxResult::NoElements => return projector,
            MinMaxResult::OneElement(lat) => (lat, lat),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        projector.min_lng = min_lng;
        projector.max_lat = max_lat;

        let width_zoom = (!is_zero(max_lng - min_lng))
            .then(|| (width - 2.0 * padding) / (max_lng - min_lng));
        let height_zoom = (!is_zero(max_lat - min_lat))
            .then(|| (height - 2.0 * padding) / (max_lat - min_lat));

        projector.zoom = match (width_zoom, height_zoom) {
            (Some(w), Some(h)) => w.min(h),
            (Some(w), None) => w,
            (None, Some(h)) => h,
            (None, None) => 0.0,
        };
        projector
    }

    fn project(&self, point: Point<f64>) -> svg::Point {
        svg::Point {
            x: (point.x() - self.min_lng) * self.zoom + self.padding,
            y: (self.max_lat - point.y()) * self.zoom + self.padding,
        }
    }
}

pub struct MapRenderer {
    settings: RenderSettings,
}

impl MapRenderer {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        MapRenderer { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Renders every bus of the catalogue into an SVG document.
    #[must_use]
    pub fn render(&self, catalogue: &TransportCatalogue) -> svg::Document {
        let buses = catalogue.sorted_buses();

        let mut all_stops: BTreeMap<&str, StopId> = BTreeMap::new();
        let mut coordinates = Vec::new();
        for &bus_id in buses.values() {
            for &stop_id in &catalogue.bus(bus_id).stops {
                let stop = catalogue.stop(stop_id);
                all_stops.insert(&stop.name, stop_id);
                coordinates.push(stop.position);
            }
        }

        let projector = SphereProjector::new(
            &coordinates,
            self.settings.width,
            self.settings.height,
            self.settings.padding,
        );

        let mut document = svg::Document::new();
        self.draw_route_lines(catalogue, &buses, &projector, &mut document);
        self.draw_bus_labels(catalogue, &buses, &projector, &mut document);
        self.draw_stop_circles(catalogue, &all_stops, &projector, &mut document);
        self.draw_stop_labels(catalogue, &all_stops, &projector, &mut document);
        document
    }

    fn draw_route_lines(
        &self,
        catalogue: &TransportCatalogue,
        buses: &BTreeMap<&str, BusId>,
        projector: &SphereProjector,
        document: &mut svg::Document,
    ) {
        let mut palette = self.settings.color_palette.iter().cycle();
        for &bus_id in buses.values() {
            let bus = catalogue.bus(bus_id);
            if bus.stops.is_empty() {
                continue;
            }

            let mut line = svg::Polyline::new()
                .fill(svg::Color::Named("none".to_string()))
                .stroke_width(self.settings.line_width)
                .line_cap(svg::StrokeLineCap::Round)
                .line_join(svg::StrokeLineJoin::Round);
            for &stop_id in &bus.stops {
                line = line.point(projector.project(catalogue.stop(stop_id).position));
            }
            if let Some(color) = palette.next() {
                line = line.stroke(color.clone());
            }
            document.add(line);
        }
    }

    fn draw_bus_labels(
        &self,
        catalogue: &TransportCatalogue,
        buses: &BTreeMap<&str, BusId>,
        projector: &SphereProjector,
        document: &mut svg::Document,
    ) {
        // The palette restarts here: label colors repeat the polyline
        // colors bus for bus.
        let mut palette = self.settings.color_palette.iter().cycle();
        for (&name, &bus_id) in buses {
            let bus = catalogue.bus(bus_id);
            if bus.stops.is_empty() {
                continue;
            }
            let color = palette.next();

            let mut positions = vec![bus.stops[0]];
            let middle = bus.stops.len() / 2;
            let last = bus.stops[bus.stops.len() - 1];
            if !bus.is_round && bus.stops.len() > 1 && bus.stops[0] != bus.stops[middle] {
                positions.push(bus.stops[middle]);
            }
            if bus.is_round && catalogue.stop(bus.stops[0]).name != catalogue.stop(last).name {
                positions.push(last);
            }

            for stop_id in positions {
                let at = projector.project(catalogue.stop(stop_id).position);
                document.add(self.bus_label_underlayer(name, at));
                let mut label = self.bus_label(name, at);
                if let Some(color) = color {
                    label = label.fill(color.clone());
                }
                document.add(label);
            }
        }
    }

    fn bus_label(&self, name: &str, at: svg::Point) -> svg::Text {
        svg::Text::new()
            .position(at)
            .offset(svg::Point::new(
                self.settings.bus_label_offset[0],
                self.settings.bus_label_offset[1],
            ))
            .font_size(self.settings.bus_label_font_size)
            .font_family("Verdana")
            .font_weight("bold")
            .data(name)
    }

    fn bus_label_underlayer(&self, name: &str, at: svg::Point) -> svg::Text {
        self.bus_label(name, at)
            .fill(self.settings.underlayer_color.clone())
            .stroke(self.settings.underlayer_color.clone())
            .stroke_width(self.settings.underlayer_width)
            .line_cap(svg::StrokeLineCap::Round)
            .line_join(svg::StrokeLineJoin::Round)
    }

    fn draw_stop_circles(
        &self,
        catalogue: &TransportCatalogue,
        all_stops: &BTreeMap<&str, StopId>,
        projector: &SphereProjector,
        document: &mut svg::Document,
    ) {
        for &stop_id in all_stops.values() {
            document.add(
                svg::Circle::new()
                    .center(projector.project(catalogue.stop(stop_id).position))
                    .radius(self.settings.stop_radius)
                    .fill(svg::Color::Named("white".to_string())),
            );
        }
    }

    fn draw_stop_labels(
        &self,
        catalogue: &TransportCatalogue,
        all_stops: &BTreeMap<&str, StopId>,
        projector: &SphereProjector,
        document: &mut svg::Document,
    ) {
        for (&name, &stop_id) in all_stops {
            let at = projector.project(catalogue.stop(stop_id).position);
            let label = svg::Text::new()
                .position(at)
                .offset(svg::Point::new(
                    self.settings.stop_label_offset[0],
                    self.settings.stop_label_offset[1],
                ))
                .font_size(self.settings.stop_label_font_size)
                .font_family("Verdana")
                .data(name);
            document.add(
                label
                    .clone()
                    .fill(self.settings.underlayer_color.clone())
                    .stroke(self.settings.underlayer_color.clone())
                    .stroke_width(self.settings.underlayer_width)
                    .line_cap(svg::StrokeLineCap::Round)
                    .line_join(svg::StrokeLineJoin::Round),
            );
            document.add(label.fill(svg::Color::Named("black".to_string())));
        }
    }
}
