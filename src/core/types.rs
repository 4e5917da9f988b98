use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::coerce::{
    deserialize_identity, deserialize_number, deserialize_optional_tag, identity_from_value,
    number_from_value,
};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Identity of one marker element.
///
/// Scatter points and pack leaves share the `Item` key space, so the same
/// entity animates between scatter and pack layouts. Pack containers use a
/// separate `Group` key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKey {
    Item(String),
    Group(String),
}

impl ElementKey {
    #[must_use]
    pub fn item(id: impl Into<String>) -> Self {
        Self::Item(id.into())
    }

    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => f.write_str(id),
            Self::Group(name) => write!(f, "group:{name}"),
        }
    }
}

/// Space reserved around the plot area for axes and titles, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub bottom: f64,
    pub top: f64,
    pub right: f64,
}

impl Margin {
    #[must_use]
    pub const fn new(left: f64, bottom: f64, top: f64, right: f64) -> Self {
        Self {
            left,
            bottom,
            top,
            right,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::new(70.0, 50.0, 0.0, 50.0)
    }
}

/// One scatter sample. `id` is unique within a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(deserialize_with = "deserialize_identity")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_number")]
    pub x: f64,
    #[serde(deserialize_with = "deserialize_number")]
    pub y: f64,
    #[serde(default, deserialize_with = "deserialize_optional_tag")]
    pub color: Option<String>,
}

impl DataPoint {
    #[must_use]
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    #[serde(deserialize_with = "deserialize_number")]
    pub x: f64,
    #[serde(deserialize_with = "deserialize_number")]
    pub y: f64,
}

impl CurvePoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One connecting curve; drawn as a polyline through `values` in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    #[serde(deserialize_with = "deserialize_identity")]
    pub key: String,
    #[serde(default)]
    pub values: Vec<CurvePoint>,
}

impl CurveSeries {
    #[must_use]
    pub fn new(key: impl Into<String>, values: Vec<CurvePoint>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

/// Loosely typed pack-mode input record.
///
/// Group and weight are read from configurable field names, so pack input
/// keeps its original shape instead of a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackRecord(pub Map<String, Value>);

impl PackRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Typed pack-mode leaf: one item inside one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyLeaf {
    pub id: String,
    pub group: String,
    pub value: f64,
    pub color: Option<String>,
}

impl HierarchyLeaf {
    #[must_use]
    pub fn new(id: impl Into<String>, group: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            value,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Extracts a leaf from a loosely typed record.
    ///
    /// Weights are coerced (numbers, numeric strings, booleans). Missing,
    /// non-numeric and negative weights are rejected with
    /// [`ChartError::InvalidWeight`]; zero is accepted.
    pub fn from_record(
        record: &PackRecord,
        group_field: &str,
        value_field: &str,
    ) -> ChartResult<Self> {
        let id = record
            .get("id")
            .and_then(identity_from_value)
            .ok_or_else(|| ChartError::InvalidData("pack record is missing `id`".to_owned()))?;
        let group = record
            .get(group_field)
            .and_then(identity_from_value)
            .ok_or_else(|| {
                ChartError::InvalidData(format!(
                    "pack record `{id}` is missing group field `{group_field}`"
                ))
            })?;

        let raw_value = record.get(value_field);
        let value = raw_value
            .and_then(number_from_value)
            .filter(|value| *value >= 0.0)
            .ok_or_else(|| ChartError::InvalidWeight {
                id: id.clone(),
                value: raw_value.map_or_else(|| "missing".to_owned(), ToString::to_string),
            })?;

        let color = record.get("color").and_then(identity_from_value);

        Ok(Self {
            id,
            group,
            value,
            color,
        })
    }
}

/// Full input of one render call. The active subset depends on pack mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub scatter: Vec<DataPoint>,
    #[serde(default)]
    pub line: Vec<CurveSeries>,
    #[serde(default)]
    pub pack: Vec<PackRecord>,
}

impl ChartData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scatter(mut self, scatter: Vec<DataPoint>) -> Self {
        self.scatter = scatter;
        self
    }

    #[must_use]
    pub fn with_lines(mut self, line: Vec<CurveSeries>) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_pack(mut self, pack: Vec<PackRecord>) -> Self {
        self.pack = pack;
        self
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart data json: {e}")))
    }
}
