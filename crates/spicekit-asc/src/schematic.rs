//! In-memory model of an LTspice schematic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point, Rotation, Text};

/// The only `.asc` format version this crate reads and writes.
pub const SUPPORTED_VERSION: u32 = 4;

/// Sheet record used when a model is created from scratch.
pub const DEFAULT_SHEET: &str = "1 880 680";

/// Attribute name that holds a component's value.
pub const ATTR_VALUE: &str = "Value";

/// Attribute name that holds a component's reference designator.
pub const ATTR_INST_NAME: &str = "InstName";

/// A component attribute: either a plain `SYMATTR` string or a `WINDOW`
/// record placing an attribute on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Attribute {
    Value(String),
    Window(Text),
}

impl Attribute {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Attribute::Value(s) => Some(s),
            Attribute::Window(_) => None,
        }
    }

    pub fn as_window(&self) -> Option<&Text> {
        match self {
            Attribute::Window(t) => Some(t),
            Attribute::Value(_) => None,
        }
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        Attribute::Value(s)
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Attribute::Value(s.to_string())
    }
}

/// Key under which a `WINDOW n` record is stored in [`Component::attributes`].
pub fn window_key(number: &str) -> String {
    format!("WINDOW {number}")
}

/// A placed symbol instance.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub symbol: String,
    pub reference: String,
    pub position: Point,
    pub rotation: Rotation,
    pub attributes: IndexMap<String, Attribute>,
}

impl Component {
    pub fn new(
        symbol: impl Into<String>,
        reference: impl Into<String>,
        position: impl Into<Point>,
        rotation: Rotation,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            reference: reference.into(),
            position: position.into(),
            rotation,
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach a `WINDOW n` record. The window number is kept in `text.text`.
    pub fn set_window(&mut self, window: Text) {
        self.attributes
            .insert(window_key(&window.text), Attribute::Window(window));
    }

    /// The plain string value of an attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Attribute::as_value)
    }

    pub fn value(&self) -> Option<&str> {
        self.attribute(ATTR_VALUE)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Text> {
        self.attributes.values().filter_map(Attribute::as_window)
    }

    /// Plain string attributes in insertion order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| v.as_value().map(|v| (k.as_str(), v)))
    }
}

/// The whole schematic.
///
/// `wires`, `labels` and `directives` keep their file order. Components are
/// keyed by reference designator and keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schematic {
    pub version: u32,
    pub sheet: String,
    pub wires: Vec<Line>,
    pub labels: Vec<Text>,
    pub directives: Vec<Text>,
    pub components: IndexMap<String, Component>,
}

impl Default for Schematic {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            sheet: DEFAULT_SHEET.to_string(),
            wires: Vec::new(),
            labels: Vec::new(),
            directives: Vec::new(),
            components: IndexMap::new(),
        }
    }
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet origin read from the 2nd and 3rd fields of the `SHEET` record.
    pub fn sheet_origin(&self) -> Option<Point> {
        let mut fields = self.sheet.split_whitespace().skip(1);
        let x = fields.next()?.parse().ok()?;
        let y = fields.next()?.parse().ok()?;
        Some(Point::new(x, y))
    }

    /// Active simulation instructions, skipping comments.
    pub fn instructions(&self) -> impl Iterator<Item = &Text> {
        self.directives.iter().filter(|d| d.is_instruction())
    }

    pub fn comments(&self) -> impl Iterator<Item = &Text> {
        self.directives.iter().filter(|d| d.is_comment())
    }

    pub fn clear(&mut self) {
        self.wires.clear();
        self.labels.clear();
        self.directives.clear();
        self.components.clear();
    }
}
