use std::collections::{BTreeMap, BTreeSet};

use crate::element::UiElement;

/// Package that owns runtime permission dialogs on older platform builds.
pub const INSTALLER_PACKAGE: &str = "com.google.android.packageinstaller";

/// Permission-dialog buttons live outside the target package but must stay
/// actionable or the app never gets past its first permission prompt.
const PERMISSION_BUTTON_IDS: &[&str] = &[
    "com.android.packageinstaller:id/permission_allow_button",
    "com.android.packageinstaller:id/permission_deny_button",
];

/// One node of the dumped UI hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiNode {
    pub element: UiElement,
    pub children: Vec<UiNode>,
}

impl UiNode {
    pub fn leaf(element: UiElement) -> UiNode {
        UiNode {
            element,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An interactable element together with the text surfaces recovered around
/// it (own text, sibling labels, child text). The texts are captured at
/// extraction time so downstream code never needs the tree again.
#[derive(Debug, Clone, PartialEq)]
pub struct UiTarget {
    pub element: UiElement,
    pub texts: Vec<String>,
}

/// A full screen dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiTree {
    pub roots: Vec<UiNode>,
}

impl UiTree {
    pub fn new(roots: Vec<UiNode>) -> UiTree {
        UiTree { roots }
    }

    /// Degraded snapshot: produced when the hierarchy dump fails after
    /// retries, or when the app has left the foreground.
    pub fn empty() -> UiTree {
        UiTree { roots: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Canonical textual signature of the screen: the sorted canonical
    /// attribute strings of every leaf element owned by the target package
    /// (or the permission installer), joined. Two dumps showing the same
    /// element set produce the same signature regardless of enumeration
    /// order; volatile fields are already blanked per element.
    pub fn canonical_signature(&self, pkg: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        visit(&self.roots, &mut |node, _| {
            if node.is_leaf()
                && (node.element.package == pkg || node.element.package == INSTALLER_PACKAGE)
            {
                lines.push(node.element.canonical_attrs());
            }
        });
        lines.sort();
        lines.join(" ")
    }

    /// Extract the interactable elements of the screen.
    ///
    /// Union of clickable, long-clickable, scrollable, swipe-pager and known
    /// permission-dialog buttons, filtered to enabled + visible + owned by
    /// the target package (permission buttons excepted). When the union is
    /// non-empty a synthetic BACK target is appended; when it is empty the
    /// app is not in the foreground and the caller gets no actions at all.
    pub fn interactable_targets(&self, pkg: &str, text_from_siblings: bool) -> Vec<UiTarget> {
        let mut found: BTreeMap<String, UiTarget> = BTreeMap::new();
        visit(&self.roots, &mut |node, siblings| {
            let el = &node.element;
            let common = el.enabled && el.visible && el.package == pkg;
            let wanted = (common && el.clickable && !el.is_container())
                || (common && el.long_clickable && !el.is_container())
                || (common && el.is_scrollable_view())
                || (common && el.is_swipeable())
                || PERMISSION_BUTTON_IDS.contains(&el.resource_id.as_str());
            if wanted {
                found.entry(el.canonical_attrs()).or_insert_with(|| UiTarget {
                    element: el.clone(),
                    texts: surface_texts(node, siblings, text_from_siblings),
                });
            }
        });

        let mut targets: Vec<UiTarget> = found.into_values().collect();
        if !targets.is_empty() {
            let back = UiElement::back();
            let texts = vec![back.text.clone()];
            targets.push(UiTarget {
                element: back,
                texts,
            });
        }
        targets
    }
}

/// Depth-first walk handing each node its sibling slice (itself included).
fn visit<'a>(nodes: &'a [UiNode], f: &mut impl FnMut(&'a UiNode, &'a [UiNode])) {
    for node in nodes {
        f(node, nodes);
        visit(&node.children, f);
    }
}

/// Recover the text surfaces for one element.
///
/// Starts from the element's own text. Editable fields also pick up the text
/// of non-interactable siblings (the label next to an input box). Other
/// elements get the lone-TextView-sibling heuristic that labels FAB-style
/// buttons. If everything is still empty, descend into non-interactable
/// children (compound widgets keep their caption one level down).
fn surface_texts(node: &UiNode, siblings: &[UiNode], from_siblings: bool) -> Vec<String> {
    let el = &node.element;
    let mut texts: BTreeSet<String> = BTreeSet::new();
    if !el.text.is_empty() {
        texts.insert(el.text.trim().to_string());
    }

    if from_siblings {
        if el.is_editable() {
            for sib in siblings.iter().filter(|s| !std::ptr::eq(*s, node)) {
                let s = &sib.element;
                if !s.text.is_empty() && !s.is_clickable_view() && !s.is_editable() {
                    texts.insert(s.text.trim().to_string());
                }
            }
        } else {
            let others: Vec<&UiNode> =
                siblings.iter().filter(|s| !std::ptr::eq(*s, node)).collect();
            if others.len() == 1 {
                let s = &others[0].element;
                if s.class == "android.widget.TextView"
                    && !s.clickable
                    && el.text.is_empty()
                    && el.content_desc.is_empty()
                    && !s.text.is_empty()
                {
                    texts.insert(s.text.trim().to_string());
                }
            }
        }
    }

    if texts.is_empty() {
        collect_child_texts(node, &mut texts);
    }
    texts.into_iter().collect()
}

fn collect_child_texts(node: &UiNode, texts: &mut BTreeSet<String>) {
    if !node.element.text.is_empty() {
        texts.insert(node.element.text.trim().to_string());
    }
    for child in &node.children {
        if !child.element.is_clickable_view() && !child.element.is_editable() {
            collect_child_texts(child, texts);
        }
    }
}
