//! Minimal SVG 1.1 document writer.
//!
//! Supports exactly what the map renderer emits: circles, polylines and
//! text with fill/stroke styling. Objects are assembled by value with
//! chained setters and collected into a [`Document`], which renders the
//! final XML string. Text data is HTML-escaped when it is set.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A drawable color: a named SVG color, an RGB triple or an RGB triple
/// with opacity.
///
/// The untagged serde representation makes the JSON render settings
/// (`"red"`, `[255, 160, 0]`, `[255, 160, 0, 0.3]`) and the binary
/// snapshot share this one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl Default for Color {
    fn default() -> Self {
        Color::Named("none".to_string())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name) => f.write_str(name),
            Color::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
            Color::Rgba(r, g, b, opacity) => write!(f, "rgba({r},{g},{b},{opacity})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineCap {
    Butt,
    Round,
    Square,
}

impl Display for StrokeLineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineCap::Butt => "butt",
            StrokeLineCap::Round => "round",
            StrokeLineCap::Square => "square",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineJoin {
    Arcs,
    Bevel,
    Miter,
    MiterClip,
    Round,
}

impl Display for StrokeLineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineJoin::Arcs => "arcs",
            StrokeLineJoin::Bevel => "bevel",
            StrokeLineJoin::Miter => "miter",
            StrokeLineJoin::MiterClip => "miter-clip",
            StrokeLineJoin::Round => "round",
        })
    }
}

/// A point in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Fill and stroke attributes shared by every object kind.
#[derive(Debug, Clone, Default)]
pub struct PathProps {
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: Option<f64>,
    line_cap: Option<StrokeLineCap>,
    line_join: Option<StrokeLineJoin>,
}

impl Display for PathProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fill) = &self.fill {
            write!(f, " fill=\"{fill}\"")?;
        }
        if let Some(stroke) = &self.stroke {
            write!(f, " stroke=\"{stroke}\"")?;
        }
        if let Some(width) = self.stroke_width {
            write!(f, " stroke-width=\"{width}\"")?;
        }
        if let Some(cap) = self.line_cap {
            write!(f, " stroke-linecap=\"{cap}\"")?;
        }
        if let Some(join) = self.line_join {
            write!(f, " stroke-linejoin=\"{join}\"")?;
        }
        Ok(())
    }
}

/// Chained fill/stroke setters, shared by [`Circle`], [`Polyline`] and
/// [`Text`].
pub trait PathStyle: Sized {
    #[doc(hidden)]
    fn props_mut(&mut self) -> &mut PathProps;

    #[must_use]
    fn fill(mut self, color: Color) -> Self {
        self.props_mut().fill = Some(color);
        self
    }

    #[must_use]
    fn stroke(mut self, color: Color) -> Self {
        self.props_mut().stroke = Some(color);
        self
    }

    #[must_use]
    fn stroke_width(mut self, width: f64) -> Self {
        self.props_mut().stroke_width = Some(width);
        self
    }

    #[must_use]
    fn line_cap(mut self, cap: StrokeLineCap) -> Self {
        self.props_mut().line_cap = Some(cap);
        self
    }

    #[must_use]
    fn line_join(mut self, join: StrokeLineJoin) -> Self {
        self.props_mut().line_join = Some(join);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Circle {
    center: Point,
    radius: f64,
    props: PathProps,
}

impl Circle {
    #[must_use]
    pub fn new() -> Self {
        Circle {
            radius: 1.0,
            ..Circle::default()
        }
    }

    #[must_use]
    pub fn center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    #[must_use]
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

impl PathStyle for Circle {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

impl Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}/>",
            self.center.x, self.center.y, self.radius, self.props
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Polyline {
    points: Vec<Point>,
    props: PathProps,
}

impl Polyline {
    #[must_use]
    pub fn new() -> Self {
        Polyline::default()
    }

    #[must_use]
    pub fn point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }
}

impl PathStyle for Polyline {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

impl Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<polyline points=\"")?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{},{}", point.x, point.y)?;
        }
        write!(f, "\"{}/>", self.props)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Text {
    position: Point,
    offset: Point,
    font_size: u32,
    font_family: Option<String>,
    font_weight: Option<String>,
    data: String,
    props: PathProps,
}

impl Text {
    #[must_use]
    pub fn new() -> Self {
        Text {
            font_size: 1,
            ..Text::default()
        }
    }

    #[must_use]
    pub fn position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    #[must_use]
    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    #[must_use]
    pub fn font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_string());
        self
    }

    /// Sets the text content, escaping `"` `'` `<` `>` `&`.
    #[must_use]
    pub fn data(mut self, data: &str) -> Self {
        self.data = escape(data);
        self
    }
}

impl PathStyle for Text {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<text{} x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}\"",
            self.props, self.position.x, self.position.y, self.offset.x, self.offset.y,
            self.font_size
        )?;
        if let Some(family) = &self.font_family {
            write!(f, " font-family=\"{family}\"")?;
        }
        if let Some(weight) = &self.font_weight {
            write!(f, " font-weight=\"{weight}\"")?;
        }
        write!(f, ">{}</text>", self.data)
    }
}

fn escape(data: &str) -> String {
    let mut escaped = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone)]
enum Shape {
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle(circle) => circle.fmt(f),
            Shape::Polyline(polyline) => polyline.fmt(f),
            Shape::Text(text) => text.fmt(f),
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Polyline> for Shape {
    fn from(polyline: Polyline) -> Self {
        Shape::Polyline(polyline)
    }
}

impl From<Text> for Shape {
    fn from(text: Text) -> Self {
        Shape::Text(text)
    }
}

/// An ordered collection of shapes rendered as one SVG 1.1 document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    shapes: Vec<Shape>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Document::default()
    }

    pub fn add(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    /// Renders the document, shapes in insertion order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n");
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n");
        for shape in &self.shapes {
            out.push_str(&format!("  {shape}\n"));
        }
        out.push_str("</svg>");
        out
    }
}
