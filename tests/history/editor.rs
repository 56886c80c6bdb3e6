use saveable_graph::{
    FromValue, ObjectId, Properties, PropertyError, Saveable, Transition, Value, ValueKind,
};

/// Immutable document snapshot: a polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch(pub Vec<f64>);

impl From<Sketch> for Value {
    fn from(sketch: Sketch) -> Self {
        Value::Vector(sketch.0)
    }
}

impl FromValue for Sketch {
    const KIND: ValueKind = ValueKind::Vector;

    fn from_value(value: Value) -> Option<Self> {
        Vec::<f64>::from_value(value).map(Sketch)
    }
}

/// Applies sketches to the visible canvas.
#[derive(Debug, Default)]
pub struct Canvas {
    pub shown: Option<Sketch>,
    pub applied: usize,
}

impl Transition for Canvas {
    type State = Sketch;
    const CLASS_NAME: &'static str = "SketchHistory";

    fn apply(&mut self, _prev: Option<&Sketch>, curr: &Sketch) {
        self.shown = Some(curr.clone());
        self.applied += 1;
    }
}

/// Tracks which marker is selected; states are graph handles.
#[derive(Debug, Default)]
pub struct Selection {
    pub selected: Option<ObjectId>,
}

impl Transition for Selection {
    type State = ObjectId;
    const CLASS_NAME: &'static str = "SelectionHistory";

    fn apply(&mut self, _prev: Option<&ObjectId>, curr: &ObjectId) {
        self.selected = Some(*curr);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Marker {
    pub label: String,
}

impl Marker {
    pub fn new(label: &str) -> Self {
        Marker {
            label: label.into(),
        }
    }
}

impl Saveable for Marker {
    fn class_name(&self) -> &str {
        "Marker"
    }

    fn save(&self, out: &mut Properties) {
        out.put("label", self.label.as_str());
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "label" => self.label = value.decode(name)?,
            _ => return Err(PropertyError::unknown("Marker", name)),
        }
        Ok(())
    }
}
