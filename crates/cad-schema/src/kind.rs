use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::param::ParamKind;
use crate::registry::{self, KindSpec, SchemaError};

/// Toolbar grouping for command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    BasicShape,
    Shape2D,
    Operation,
    Boolean,
    Transform,
    Feature,
}

impl Category {
    /// All categories in toolbar order.
    pub const ALL: [Category; 6] = [
        Category::BasicShape,
        Category::Shape2D,
        Category::Operation,
        Category::Boolean,
        Category::Transform,
        Category::Feature,
    ];

    /// User-visible group name.
    pub fn label(self) -> &'static str {
        match self {
            Category::BasicShape => "Basic Shapes",
            Category::Shape2D => "2D Shapes",
            Category::Operation => "Operations",
            Category::Boolean => "Boolean",
            Category::Transform => "Transform",
            Category::Feature => "Features",
        }
    }
}

/// Every modeling operation a command can perform.
///
/// Serialized as its registry id (`"box"`, `"translate"`, ...), which is the
/// `command` field of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    // Basic shapes
    Box,
    Cylinder,
    Sphere,
    Cone,
    Torus,
    // 2D shapes
    Rect,
    Circle,
    Polygon,
    // Operations
    Extrude,
    Revolve,
    // Boolean
    Union,
    Cut,
    Intersect,
    // Transform
    Translate,
    Rotate,
    Scale,
    Mirror,
    // Features
    Fillet,
    Chamfer,
    Shell,
}

impl CommandKind {
    /// All kinds in registry order.
    pub const ALL: [CommandKind; 20] = [
        CommandKind::Box,
        CommandKind::Cylinder,
        CommandKind::Sphere,
        CommandKind::Cone,
        CommandKind::Torus,
        CommandKind::Rect,
        CommandKind::Circle,
        CommandKind::Polygon,
        CommandKind::Extrude,
        CommandKind::Revolve,
        CommandKind::Union,
        CommandKind::Cut,
        CommandKind::Intersect,
        CommandKind::Translate,
        CommandKind::Rotate,
        CommandKind::Scale,
        CommandKind::Mirror,
        CommandKind::Fillet,
        CommandKind::Chamfer,
        CommandKind::Shell,
    ];

    /// The static registry entry for this kind.
    pub fn spec(self) -> &'static KindSpec {
        registry::spec(self)
    }

    /// Registry id, e.g. `"cylinder"`.
    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn category(self) -> Category {
        self.spec().category
    }

    pub fn is_2d(self) -> bool {
        self.spec().is_2d
    }

    /// Name of the parameter holding object references (`objects` for
    /// booleans, `target` for transforms), if this kind takes any.
    pub fn reference_param(self) -> Option<&'static str> {
        self.spec()
            .params
            .iter()
            .find(|p| p.kind == ParamKind::ObjectReferenceList)
            .map(|p| p.name)
    }

    pub fn takes_references(self) -> bool {
        self.reference_param().is_some()
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CommandKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "box" => CommandKind::Box,
            "cylinder" => CommandKind::Cylinder,
            "sphere" => CommandKind::Sphere,
            "cone" => CommandKind::Cone,
            "torus" => CommandKind::Torus,
            "rect" => CommandKind::Rect,
            "circle" => CommandKind::Circle,
            "polygon" => CommandKind::Polygon,
            "extrude" => CommandKind::Extrude,
            "revolve" => CommandKind::Revolve,
            "union" => CommandKind::Union,
            "cut" => CommandKind::Cut,
            "intersect" => CommandKind::Intersect,
            "translate" => CommandKind::Translate,
            "rotate" => CommandKind::Rotate,
            "scale" => CommandKind::Scale,
            "mirror" => CommandKind::Mirror,
            "fillet" => CommandKind::Fillet,
            "chamfer" => CommandKind::Chamfer,
            "shell" => CommandKind::Shell,
            other => {
                return Err(SchemaError::UnknownKind {
                    kind: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

impl Serialize for CommandKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for CommandKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}
