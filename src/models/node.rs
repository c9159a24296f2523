use serde::{Deserialize, Serialize};

/// Read-only view over one node of an accessibility snapshot.
///
/// Platform bindings implement this over their native node type; the
/// extraction heuristics only ever see this interface.
pub trait UiNode {
    /// Class or role hint, e.g. `android.widget.EditText`.
    fn role(&self) -> &str;

    /// View resource id when the platform exposes one.
    fn resource_id(&self) -> Option<&str> {
        None
    }

    fn text(&self) -> Option<&str>;

    /// Accessible label (content description).
    fn label(&self) -> Option<&str>;

    fn is_focused(&self) -> bool;

    fn is_editable(&self) -> bool {
        self.role().to_ascii_lowercase().contains("edittext")
    }

    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

/// Materialized snapshot node. Deserializes from the JSON a host bridge emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSnapshotNode {
    pub role: String,
    pub resource_id: Option<String>,
    pub text: Option<String>,
    pub label: Option<String>,
    pub focused: bool,
    pub editable: bool,
    pub children: Vec<UiSnapshotNode>,
}

impl UiSnapshotNode {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_child(mut self, child: UiSnapshotNode) -> Self {
        self.children.push(child);
        self
    }
}

impl UiNode for UiSnapshotNode {
    fn role(&self) -> &str {
        &self.role
    }

    fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn is_editable(&self) -> bool {
        self.editable || self.role.to_ascii_lowercase().contains("edittext")
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
