//! Arena of UI elements standing in for the host's visual tree.
//!
//! Keys are generational: once an element is removed its [`ElementId`] never
//! resolves again, even if the slot is reused.

use std::collections::VecDeque;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct ElementId;
}

#[derive(Debug, Clone)]
pub struct Element {
    label: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    focusable: bool,
    loaded: bool,
}

impl Element {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

#[derive(Debug, Clone)]
pub struct VisualTree {
    elements: SlotMap<ElementId, Element>,
    window: ElementId,
}

impl Default for VisualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualTree {
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let window = elements.insert(Element {
            label: "window".to_string(),
            parent: None,
            children: Vec::new(),
            focusable: true,
            loaded: true,
        });
        Self { elements, window }
    }

    /// The top-level element. It is never removed.
    pub fn window(&self) -> ElementId {
        self.window
    }

    /// Append a loaded element under `parent`. Returns `None` when the parent
    /// is gone.
    pub fn insert(
        &mut self,
        parent: ElementId,
        label: impl Into<String>,
        focusable: bool,
    ) -> Option<ElementId> {
        if !self.elements.contains_key(parent) {
            return None;
        }
        let id = self.elements.insert(Element {
            label: label.into(),
            parent: Some(parent),
            children: Vec::new(),
            focusable,
            loaded: true,
        });
        if let Some(parent) = self.elements.get_mut(parent) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Remove `id` and its whole subtree. Returns how many elements went away.
    pub fn remove(&mut self, id: ElementId) -> usize {
        if id == self.window || !self.elements.contains_key(id) {
            return 0;
        }
        if let Some(parent) = self.elements.get(id).and_then(|e| e.parent)
            && let Some(parent) = self.elements.get_mut(parent)
        {
            parent.children.retain(|child| *child != id);
        }
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.remove(next) {
                stack.extend(element.children);
                removed += 1;
            }
        }
        removed
    }

    /// Detach `id` from its parent without destroying it.
    pub fn detach(&mut self, id: ElementId) {
        if id == self.window {
            return;
        }
        let Some(parent) = self.elements.get_mut(id).and_then(|e| e.parent.take()) else {
            return;
        };
        if let Some(parent) = self.elements.get_mut(parent) {
            parent.children.retain(|child| *child != id);
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn set_loaded(&mut self, id: ElementId, loaded: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.loaded = loaded;
        }
    }

    pub fn set_focusable(&mut self, id: ElementId, focusable: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.focusable = focusable;
        }
    }

    /// Live, loaded, and connected to the window through loaded ancestors.
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(element) = self.elements.get(current) else {
                return false;
            };
            if !element.loaded {
                return false;
            }
            if current == self.window {
                return true;
            }
            cursor = element.parent;
        }
        false
    }

    pub fn is_focusable(&self, id: ElementId) -> bool {
        self.elements.get(id).is_some_and(|e| e.focusable)
    }

    /// True when `ancestor` is `id` itself or one of its ancestors.
    pub fn is_descendant_of(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.elements.get(current).and_then(|e| e.parent);
        }
        false
    }

    /// Breadth-first search below `root` (excluding `root`) for the first
    /// attached, focusable element.
    ///
    /// Attachment is checked once for `root`. Below it only the loaded flags
    /// matter, so each descendant is visited at most once.
    pub fn first_focusable_descendant(&self, root: ElementId) -> Option<ElementId> {
        if !self.is_attached(root) {
            return None;
        }
        let mut queue: VecDeque<ElementId> = self
            .elements
            .get(root)?
            .children
            .iter()
            .copied()
            .collect();
        while let Some(id) = queue.pop_front() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            // an unloaded element hides its whole subtree
            if !element.loaded {
                continue;
            }
            if element.focusable {
                return Some(id);
            }
            queue.extend(element.children.iter().copied());
        }
        None
    }

    pub fn label(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id).map(|e| e.label.as_str())
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|e| e.parent)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
