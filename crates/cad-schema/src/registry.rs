//! Static catalog of command kinds and their parameter schemas.
//!
//! The catalog is fixed at compile time; `CommandKind::spec` dispatches with
//! an exhaustive match, so adding a kind without a schema does not compile.

use std::collections::BTreeMap;

use crate::kind::{Category, CommandKind};
use crate::param::{DefaultValue, ParamKind, ParamSpec, ParamValue};

/// Registry entry describing one command kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub category: Category,
    /// 2D sketch shapes are rendered flat by the viewer.
    pub is_2d: bool,
    /// Parameters in display order.
    pub params: &'static [ParamSpec],
}

impl KindSpec {
    /// Find a parameter schema by name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Errors from registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown command kind: {kind}")]
    UnknownKind { kind: String },
}

/// Look up a command kind by its registry id.
pub fn lookup(id: &str) -> Result<CommandKind, SchemaError> {
    id.parse()
}

/// Every parameter of `kind` set to its schema default.
pub fn default_params(kind: CommandKind) -> BTreeMap<String, ParamValue> {
    kind.spec()
        .params
        .iter()
        .map(|p| (p.name.to_string(), p.default_value()))
        .collect()
}

/// Kinds grouped by category, both in toolbar order.
pub fn list_by_category() -> Vec<(Category, Vec<CommandKind>)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let kinds = CommandKind::ALL
                .iter()
                .copied()
                .filter(|k| k.category() == category)
                .collect();
            (category, kinds)
        })
        .collect()
}

/// Clamp every parameter of `kind` into its schema bounds.
///
/// Parameters missing from `params` are filled with defaults; names the
/// schema does not know are dropped.
pub fn clamp_params(
    kind: CommandKind,
    params: &BTreeMap<String, ParamValue>,
) -> BTreeMap<String, ParamValue> {
    kind.spec()
        .params
        .iter()
        .map(|spec| {
            let value = match params.get(spec.name) {
                Some(v) => spec.clamp(v),
                None => spec.default_value(),
            };
            (spec.name.to_string(), value)
        })
        .collect()
}

pub(crate) fn spec(kind: CommandKind) -> &'static KindSpec {
    match kind {
        CommandKind::Box => &BOX,
        CommandKind::Cylinder => &CYLINDER,
        CommandKind::Sphere => &SPHERE,
        CommandKind::Cone => &CONE,
        CommandKind::Torus => &TORUS,
        CommandKind::Rect => &RECT,
        CommandKind::Circle => &CIRCLE,
        CommandKind::Polygon => &POLYGON,
        CommandKind::Extrude => &EXTRUDE,
        CommandKind::Revolve => &REVOLVE,
        CommandKind::Union => &UNION,
        CommandKind::Cut => &CUT,
        CommandKind::Intersect => &INTERSECT,
        CommandKind::Translate => &TRANSLATE,
        CommandKind::Rotate => &ROTATE,
        CommandKind::Scale => &SCALE,
        CommandKind::Mirror => &MIRROR,
        CommandKind::Fillet => &FILLET,
        CommandKind::Chamfer => &CHAMFER,
        CommandKind::Shell => &SHELL,
    }
}

// ── Schema builders ─────────────────────────────────────────────────────────

const MIN_SIZE: Option<f64> = Some(0.001);

const fn number(
    name: &'static str,
    default: f64,
    min: Option<f64>,
    max: Option<f64>,
    label: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Number,
        default: DefaultValue::Number(default),
        min,
        max,
        options: &[],
        label,
        description: None,
    }
}

const fn boolean(name: &'static str, default: bool, label: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Boolean,
        default: DefaultValue::Boolean(default),
        min: None,
        max: None,
        options: &[],
        label,
        description: None,
    }
}

const fn vector3(name: &'static str, default: [f64; 3], label: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Vector3,
        default: DefaultValue::Vector3(default),
        min: None,
        max: None,
        options: &[],
        label,
        description: None,
    }
}

const fn select(
    name: &'static str,
    default: &'static str,
    options: &'static [&'static str],
    label: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Select,
        default: DefaultValue::Text(default),
        min: None,
        max: None,
        options,
        label,
        description: None,
    }
}

const fn references(
    name: &'static str,
    label: &'static str,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::ObjectReferenceList,
        default: DefaultValue::EmptyReferences,
        min: None,
        max: None,
        options: &[],
        label,
        description: Some(description),
    }
}

const TARGET: ParamSpec = references(
    "target",
    "Target Objects",
    "Select previous commands to transform",
);

// ── Basic shapes ────────────────────────────────────────────────────────────

static BOX: KindSpec = KindSpec {
    id: "box",
    label: "Box",
    category: Category::BasicShape,
    is_2d: false,
    params: &[
        number("length", 1.0, MIN_SIZE, None, "Length"),
        number("width", 1.0, MIN_SIZE, None, "Width"),
        number("height", 1.0, MIN_SIZE, None, "Height"),
        boolean("centered", true, "Centered"),
    ],
};

static CYLINDER: KindSpec = KindSpec {
    id: "cylinder",
    label: "Cylinder",
    category: Category::BasicShape,
    is_2d: false,
    params: &[
        number("radius", 0.5, MIN_SIZE, None, "Radius"),
        number("height", 1.0, MIN_SIZE, None, "Height"),
        boolean("centered", true, "Centered"),
    ],
};

static SPHERE: KindSpec = KindSpec {
    id: "sphere",
    label: "Sphere",
    category: Category::BasicShape,
    is_2d: false,
    params: &[number("radius", 0.5, MIN_SIZE, None, "Radius")],
};

static CONE: KindSpec = KindSpec {
    id: "cone",
    label: "Cone",
    category: Category::BasicShape,
    is_2d: false,
    params: &[
        number("radius1", 0.5, MIN_SIZE, None, "Bottom Radius"),
        number("radius2", 0.1, Some(0.0), None, "Top Radius"),
        number("height", 1.0, MIN_SIZE, None, "Height"),
        boolean("centered", true, "Centered"),
    ],
};

static TORUS: KindSpec = KindSpec {
    id: "torus",
    label: "Torus",
    category: Category::BasicShape,
    is_2d: false,
    params: &[
        number("major_radius", 1.0, MIN_SIZE, None, "Major Radius"),
        number("minor_radius", 0.2, MIN_SIZE, None, "Minor Radius"),
    ],
};

// ── 2D shapes ───────────────────────────────────────────────────────────────

static RECT: KindSpec = KindSpec {
    id: "rect",
    label: "Rectangle",
    category: Category::Shape2D,
    is_2d: true,
    params: &[
        number("width", 1.0, MIN_SIZE, None, "Width"),
        number("height", 1.0, MIN_SIZE, None, "Height"),
        boolean("centered", true, "Centered"),
    ],
};

static CIRCLE: KindSpec = KindSpec {
    id: "circle",
    label: "Circle",
    category: Category::Shape2D,
    is_2d: true,
    params: &[number("radius", 0.5, MIN_SIZE, None, "Radius")],
};

static POLYGON: KindSpec = KindSpec {
    id: "polygon",
    label: "Polygon",
    category: Category::Shape2D,
    is_2d: true,
    params: &[
        number("sides", 6.0, Some(3.0), Some(20.0), "Sides"),
        number("radius", 0.5, MIN_SIZE, None, "Radius"),
    ],
};

// ── Operations ──────────────────────────────────────────────────────────────

static EXTRUDE: KindSpec = KindSpec {
    id: "extrude",
    label: "Extrude",
    category: Category::Operation,
    is_2d: false,
    params: &[number("distance", 1.0, MIN_SIZE, None, "Distance")],
};

static REVOLVE: KindSpec = KindSpec {
    id: "revolve",
    label: "Revolve",
    category: Category::Operation,
    is_2d: false,
    params: &[number("angle", 360.0, Some(0.1), Some(360.0), "Angle (degrees)")],
};

// ── Boolean ─────────────────────────────────────────────────────────────────

static UNION: KindSpec = KindSpec {
    id: "union",
    label: "Union",
    category: Category::Boolean,
    is_2d: false,
    params: &[references(
        "objects",
        "Objects to Union",
        "Select previous commands to union with current object",
    )],
};

static CUT: KindSpec = KindSpec {
    id: "cut",
    label: "Cut/Subtract",
    category: Category::Boolean,
    is_2d: false,
    params: &[references(
        "objects",
        "Objects to Cut",
        "Select previous commands to subtract from current object",
    )],
};

static INTERSECT: KindSpec = KindSpec {
    id: "intersect",
    label: "Intersect",
    category: Category::Boolean,
    is_2d: false,
    params: &[references(
        "objects",
        "Objects to Intersect",
        "Select previous commands to intersect with current object",
    )],
};

// ── Transform ───────────────────────────────────────────────────────────────

static TRANSLATE: KindSpec = KindSpec {
    id: "translate",
    label: "Translate",
    category: Category::Transform,
    is_2d: false,
    params: &[
        TARGET,
        number("x", 0.0, None, None, "X"),
        number("y", 0.0, None, None, "Y"),
        number("z", 0.0, None, None, "Z"),
    ],
};

static ROTATE: KindSpec = KindSpec {
    id: "rotate",
    label: "Rotate",
    category: Category::Transform,
    is_2d: false,
    params: &[
        TARGET,
        number("angle", 0.0, None, None, "Angle (degrees)"),
        vector3("axis_start", [0.0, 0.0, 0.0], "Axis Start"),
        vector3("axis_end", [0.0, 0.0, 1.0], "Axis End"),
    ],
};

static SCALE: KindSpec = KindSpec {
    id: "scale",
    label: "Scale",
    category: Category::Transform,
    is_2d: false,
    params: &[TARGET, number("factor", 1.0, MIN_SIZE, None, "Scale Factor")],
};

static MIRROR: KindSpec = KindSpec {
    id: "mirror",
    label: "Mirror",
    category: Category::Transform,
    is_2d: false,
    params: &[
        TARGET,
        select("plane", "XY", &["XY", "XZ", "YZ"], "Mirror Plane"),
    ],
};

// ── Features ────────────────────────────────────────────────────────────────

static FILLET: KindSpec = KindSpec {
    id: "fillet",
    label: "Fillet",
    category: Category::Feature,
    is_2d: false,
    params: &[number("radius", 0.1, MIN_SIZE, None, "Radius")],
};

static CHAMFER: KindSpec = KindSpec {
    id: "chamfer",
    label: "Chamfer",
    category: Category::Feature,
    is_2d: false,
    params: &[number("distance", 0.1, MIN_SIZE, None, "Distance")],
};

static SHELL: KindSpec = KindSpec {
    id: "shell",
    label: "Shell",
    category: Category::Feature,
    is_2d: false,
    params: &[number("thickness", 0.1, MIN_SIZE, None, "Thickness")],
};
