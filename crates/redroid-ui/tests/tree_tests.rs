use redroid_ui::element::UiElement;
use redroid_ui::tree::{UiNode, UiTree};
use redroid_ui::{Bounds, BACK_RESOURCE_ID};

const PKG: &str = "com.example.app";

fn base(class: &str) -> UiElement {
    UiElement {
        class: class.to_string(),
        package: PKG.to_string(),
        enabled: true,
        visible: true,
        ..UiElement::default()
    }
}

fn button(text: &str) -> UiElement {
    UiElement {
        text: text.to_string(),
        clickable: true,
        ..base("android.widget.Button")
    }
}

#[test]
fn empty_screen_yields_no_targets_at_all() {
    let tree = UiTree::empty();
    assert!(tree.interactable_targets(PKG, true).is_empty());
    assert_eq!(tree.canonical_signature(PKG), "");
}

#[test]
fn back_is_injected_only_alongside_real_targets() {
    let tree = UiTree::new(vec![UiNode::leaf(button("Save"))]);
    let targets = tree.interactable_targets(PKG, true);
    assert_eq!(targets.len(), 2);
    assert!(targets
        .iter()
        .any(|t| t.element.resource_id == BACK_RESOURCE_ID));

    // A screen with only inert elements gets nothing, not even BACK.
    let inert = UiTree::new(vec![UiNode::leaf(base("android.widget.TextView"))]);
    assert!(inert.interactable_targets(PKG, true).is_empty());
}

#[test]
fn foreign_disabled_and_invisible_elements_are_skipped() {
    let foreign = UiElement {
        package: "com.other.app".to_string(),
        ..button("Save")
    };
    let disabled = UiElement {
        enabled: false,
        ..button("Save")
    };
    let hidden = UiElement {
        visible: false,
        ..button("Save")
    };
    let tree = UiTree::new(vec![
        UiNode::leaf(foreign),
        UiNode::leaf(disabled),
        UiNode::leaf(hidden),
    ]);
    assert!(tree.interactable_targets(PKG, true).is_empty());
}

#[test]
fn permission_buttons_bypass_the_package_filter() {
    let allow = UiElement {
        resource_id: "com.android.packageinstaller:id/permission_allow_button".to_string(),
        package: "com.android.packageinstaller".to_string(),
        text: "Allow".to_string(),
        clickable: true,
        enabled: true,
        visible: true,
        ..UiElement::default()
    };
    let tree = UiTree::new(vec![UiNode::leaf(allow)]);
    let targets = tree.interactable_targets(PKG, true);
    assert_eq!(targets.len(), 2); // allow + injected BACK
    assert_eq!(targets[0].texts, vec!["Allow".to_string()]);
}

#[test]
fn list_containers_are_not_targets_but_scrollables_are() {
    let list = UiElement {
        clickable: true,
        ..base("android.widget.ListView")
    };
    let scroll = UiElement {
        scrollable: true,
        ..base("android.widget.ScrollView")
    };
    let pager = UiElement {
        scrollable: true,
        ..base("androidx.viewpager.widget.ViewPager")
    };
    let tree = UiTree::new(vec![
        UiNode::leaf(list),
        UiNode::leaf(scroll.clone()),
        UiNode::leaf(pager.clone()),
    ]);
    let targets = tree.interactable_targets(PKG, true);
    let classes: Vec<&str> = targets.iter().map(|t| t.element.class.as_str()).collect();
    assert!(!classes.contains(&"android.widget.ListView"));
    assert!(classes.contains(&"android.widget.ScrollView"));
    assert!(classes.contains(&"androidx.viewpager.widget.ViewPager"));
}

#[test]
fn duplicate_elements_collapse_to_one_target() {
    let tree = UiTree::new(vec![
        UiNode::leaf(button("Save")),
        UiNode::leaf(button("Save")),
    ]);
    let targets = tree.interactable_targets(PKG, true);
    assert_eq!(targets.len(), 2); // one Save + BACK
}

#[test]
fn editable_fields_borrow_sibling_labels() {
    let edit = UiElement {
        clickable: true,
        ..base("android.widget.EditText")
    };
    let label = UiElement {
        text: "Title".to_string(),
        ..base("android.widget.TextView")
    };
    let row = UiNode {
        element: base("android.widget.LinearLayout"),
        children: vec![UiNode::leaf(label), UiNode::leaf(edit)],
    };
    let tree = UiTree::new(vec![row]);
    let targets = tree.interactable_targets(PKG, true);
    let field = targets
        .iter()
        .find(|t| t.element.is_editable())
        .expect("edit field extracted");
    assert_eq!(field.texts, vec!["Title".to_string()]);

    // With sibling recovery off the field has no surface at all.
    let tree2 = tree.clone();
    let targets = tree2.interactable_targets(PKG, false);
    let field = targets.iter().find(|t| t.element.is_editable()).unwrap();
    assert!(field.texts.is_empty());
}

#[test]
fn lone_textview_sibling_labels_an_unlabeled_button() {
    let fab = UiElement {
        clickable: true,
        resource_id: format!("{PKG}:id/fab"),
        ..base("android.widget.ImageButton")
    };
    let caption = UiElement {
        text: "Compose".to_string(),
        ..base("android.widget.TextView")
    };
    let row = UiNode {
        element: base("android.widget.FrameLayout"),
        children: vec![UiNode::leaf(fab), UiNode::leaf(caption)],
    };
    let targets = UiTree::new(vec![row]).interactable_targets(PKG, true);
    let fab = targets
        .iter()
        .find(|t| t.element.class == "android.widget.ImageButton")
        .unwrap();
    assert_eq!(fab.texts, vec!["Compose".to_string()]);
}

#[test]
fn text_falls_back_to_non_interactable_children() {
    let caption = UiElement {
        text: "  Delete all  ".to_string(),
        ..base("android.widget.TextView")
    };
    let row = UiNode {
        element: UiElement {
            clickable: true,
            ..base("android.widget.RelativeLayout")
        },
        children: vec![UiNode::leaf(caption)],
    };
    let targets = UiTree::new(vec![row]).interactable_targets(PKG, true);
    let item = targets
        .iter()
        .find(|t| t.element.class == "android.widget.RelativeLayout")
        .unwrap();
    assert_eq!(item.texts, vec!["Delete all".to_string()]);
}

#[test]
fn signature_covers_leaves_and_ignores_enumeration_order() {
    let a = UiNode::leaf(button("Save"));
    let b = UiNode::leaf(UiElement {
        text: "Notes".to_string(),
        bounds: Bounds {
            x1: 0,
            y1: 0,
            x2: 100,
            y2: 40,
        },
        ..base("android.widget.TextView")
    });
    let fwd = UiTree::new(vec![a.clone(), b.clone()]).canonical_signature(PKG);
    let rev = UiTree::new(vec![b, a]).canonical_signature(PKG);
    assert_eq!(fwd, rev);
    assert!(fwd.contains("text=Save"));

    // Inner nodes do not contribute, only leaves do.
    let wrapped = UiTree::new(vec![UiNode {
        element: base("android.widget.FrameLayout"),
        children: vec![UiNode::leaf(button("Save"))],
    }]);
    assert!(!wrapped.canonical_signature(PKG).contains("FrameLayout"));
}

#[test]
fn signature_excludes_foreign_packages() {
    let status_bar = UiNode::leaf(UiElement {
        package: "com.android.systemui".to_string(),
        text: "3:47 PM".to_string(),
        ..UiElement::default()
    });
    let tree = UiTree::new(vec![status_bar, UiNode::leaf(button("Save"))]);
    let sig = tree.canonical_signature(PKG);
    assert!(!sig.contains("systemui"));
}
