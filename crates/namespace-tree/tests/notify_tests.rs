//! Structural change notification tests.

use namespace_tree::{
    ChangeEvent, ChangeRecorder, NamespaceTree, NodeId, StructuralChange, StructureObserver,
};

fn setup() -> (NamespaceTree, ChangeRecorder, [NodeId; 4]) {
    let mut tree = NamespaceTree::new();
    let root = tree.create("root", true).unwrap();
    let child0 = tree.create("child0", true).unwrap();
    let grandchild0 = tree.create("grandchild0", true).unwrap();
    let child1 = tree.create("child1", true).unwrap();
    tree.add_child(root, child0).unwrap();
    tree.add_child(child0, grandchild0).unwrap();
    tree.add_child(root, child1).unwrap();

    let recorder = ChangeRecorder::new();
    tree.add_observer(Box::new(recorder.clone()));
    (tree, recorder, [root, child0, grandchild0, child1])
}

/// Asserts that `events` is a single begin/end pair and returns its change.
fn single_change(events: Vec<ChangeEvent>) -> StructuralChange {
    match events.as_slice() {
        [ChangeEvent::Begin(begin), ChangeEvent::End(end)] => {
            assert_eq!(begin, end);
            begin.clone()
        }
        other => panic!("expected one begin/end pair, got {other:?}"),
    }
}

/// Observer that fails on nested or mismatched begin/end calls.
#[derive(Default)]
struct BalanceChecker {
    pending: Option<StructuralChange>,
}

impl StructureObserver for BalanceChecker {
    fn begin_change(&mut self, change: &StructuralChange) {
        assert!(self.pending.is_none(), "nested begin_change");
        self.pending = Some(change.clone());
    }

    fn end_change(&mut self, change: &StructuralChange) {
        assert_eq!(self.pending.take().as_ref(), Some(change));
    }
}

#[test]
fn test_add_reports_predicted_index() {
    let (mut tree, recorder, [root, ..]) = setup();
    let node = tree.create("child05", false).unwrap();
    tree.add_child(root, node).unwrap();

    let change = single_change(recorder.take());
    assert_eq!(
        change,
        StructuralChange::Add {
            node,
            parent: root,
            index: 1
        }
    );
    assert_eq!(tree.idx_in_parent(node).unwrap(), Some(1));
}

#[test]
fn test_reparent_reports_source_and_destination() {
    let (mut tree, recorder, [root, child0, _, child1]) = setup();
    tree.reparent(child1, Some(child0)).unwrap();

    let change = single_change(recorder.take());
    assert_eq!(
        change,
        StructuralChange::Reparent {
            node: child1,
            from_parent: root,
            from_index: 1,
            to_parent: child0,
            to_index: 0,
        }
    );
    assert_eq!(tree.idx_in_parent(child1).unwrap(), Some(0));
}

#[test]
fn test_rename_is_single_event() {
    let (mut tree, recorder, [root, child0, ..]) = setup();
    tree.set_name(child0, "child2").unwrap();

    let change = single_change(recorder.take());
    let StructuralChange::Rename {
        parent,
        from_index,
        to_index,
        ..
    } = change
    else {
        panic!("expected a rename, got {change:?}");
    };
    assert_eq!(parent, Some(root));
    assert_eq!(from_index, Some(0));
    assert_eq!(to_index, tree.idx_in_parent(child0).unwrap());
    assert_eq!(to_index, Some(1));
}

#[test]
fn test_noops_and_failures_are_silent() {
    let (mut tree, recorder, [root, child0, grandchild0, child1]) = setup();

    tree.set_name(child1, "child1").unwrap();
    tree.reparent(child0, Some(root)).unwrap();
    tree.add_child(root, child1).unwrap();
    assert_eq!(tree.remove_child(root, "nope").unwrap(), None);

    assert!(tree.set_name(child1, "child0").is_err());
    assert!(tree.reparent(child0, Some(grandchild0)).is_err());
    assert!(tree.reparent(root, Some(child1)).is_err());
    assert!(tree.delete_node(root).is_err());

    assert!(recorder.is_empty(), "unexpected events: {:?}", recorder.events());
}

#[test]
fn test_every_begin_has_matching_end() {
    let (mut tree, recorder, [root, child0, grandchild0, child1]) = setup();
    tree.add_observer(Box::new(BalanceChecker::default()));

    tree.reparent(grandchild0, Some(child1)).unwrap();
    tree.set_name(child1, "aaa").unwrap();
    tree.remove_child(root, "child0").unwrap();
    tree.add_child(root, child0).unwrap();
    tree.set_can_have_children(root, false).unwrap();

    let events = recorder.take();
    assert_eq!(events.len() % 2, 0);
    for pair in events.chunks(2) {
        match pair {
            [ChangeEvent::Begin(begin), ChangeEvent::End(end)] => assert_eq!(begin, end),
            other => panic!("unbalanced events: {other:?}"),
        }
    }
    // reparent, rename, remove, add, then two evictions.
    assert_eq!(events.len(), 12);
}

#[test]
fn test_destroy_attached_node_notifies_remove() {
    let (mut tree, recorder, [root, child0, grandchild0, _]) = setup();
    tree.destroy(child0).unwrap();

    assert_eq!(
        single_change(recorder.take()),
        StructuralChange::Remove {
            node: child0,
            parent: root,
            index: 0
        }
    );
    assert!(!tree.contains(grandchild0));

    // Destroying a detached root has nobody to notify.
    let loose = tree.create("loose", true).unwrap();
    tree.destroy(loose).unwrap();
    assert!(recorder.is_empty());
}
