//! Descendant scanning: find scrollable and text-input nodes under the sheet.
//!
//! The controller does not own a UI tree. Hosts describe what is mounted
//! through [`DescendantScanner`], which walks their tree and reports every
//! scrollable or input with a stable id and its structural path.
//! [`SheetNode`] is a plain tree that implements the scanner for hosts
//! without one of their own, and for tests.

/// What a scanned descendant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescendantKind {
    /// Vertical scrollable: registered as a scroll anchor.
    Scrollable,
    /// Text input: blurred when a modal closes.
    TextInput,
}

/// One scanned descendant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descendant<'a> {
    /// Identity, stable across rescans while the node stays mounted.
    pub id: u64,
    pub kind: DescendantKind,
    /// Child indices from the scan root to this node.
    pub path: &'a [usize],
    pub anchor_tag: Option<&'a str>,
}

/// Walks a host tree and reports scrollable and input descendants.
pub trait DescendantScanner {
    fn scan(&self, visit: &mut dyn FnMut(Descendant<'_>));
}

/// Role of a node in a [`SheetNode`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    #[default]
    View,
    Scrollable {
        horizontal: bool,
    },
    TextInput,
}

/// Minimal host tree.
#[derive(Debug, Clone, Default)]
pub struct SheetNode {
    pub key: u64,
    pub role: NodeRole,
    /// Marks the node as a scroll anchor, even if it is not a known scrollable.
    pub anchor_tag: Option<String>,
    /// Skip this node and its subtree.
    pub scan_off: bool,
    pub children: Vec<SheetNode>,
}

impl SheetNode {
    pub fn view(key: u64) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    pub fn scroll_view(key: u64) -> Self {
        Self {
            key,
            role: NodeRole::Scrollable { horizontal: false },
            ..Default::default()
        }
    }

    pub fn horizontal_scroll_view(key: u64) -> Self {
        Self {
            key,
            role: NodeRole::Scrollable { horizontal: true },
            ..Default::default()
        }
    }

    pub fn text_input(key: u64) -> Self {
        Self {
            key,
            role: NodeRole::TextInput,
            ..Default::default()
        }
    }

    pub fn anchor_tag(mut self, tag: impl Into<String>) -> Self {
        self.anchor_tag = Some(tag.into());
        self
    }

    pub fn scan_off(mut self) -> Self {
        self.scan_off = true;
        self
    }

    pub fn child(mut self, child: SheetNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = SheetNode>) -> Self {
        self.children.extend(children);
        self
    }

    fn kind(&self) -> Option<DescendantKind> {
        if self.anchor_tag.is_some() {
            return Some(DescendantKind::Scrollable);
        }
        match self.role {
            NodeRole::Scrollable { horizontal: false } => Some(DescendantKind::Scrollable),
            NodeRole::TextInput => Some(DescendantKind::TextInput),
            NodeRole::Scrollable { horizontal: true } | NodeRole::View => None,
        }
    }

    fn walk(&self, path: &mut Vec<usize>, visit: &mut dyn FnMut(Descendant<'_>)) {
        if self.scan_off {
            return;
        }
        if let Some(kind) = self.kind() {
            visit(Descendant {
                id: self.key,
                kind,
                path: path.as_slice(),
                anchor_tag: self.anchor_tag.as_deref(),
            });
        }
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            child.walk(path, visit);
            path.pop();
        }
    }
}

impl DescendantScanner for SheetNode {
    fn scan(&self, visit: &mut dyn FnMut(Descendant<'_>)) {
        let mut path = Vec::new();
        self.walk(&mut path, visit);
    }
}
