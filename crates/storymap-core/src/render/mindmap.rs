//! Radial mindmap layout of a merge request

use std::collections::HashSet;
use std::f64::consts::PI;

use serde::Serialize;

use crate::errors::Result;
use crate::model::Story;
use crate::ops::Store;

pub const RADIUS_STEP: f64 = 220.0;

/// Gap left open on the left side of the circle
const ANGLE_MARGIN: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MindmapNodeKind {
    MergeRequest,
    Story,
    Acceptance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    MergeRequestStory,
    StoryStory,
    StoryAcceptance,
}

/// Stories whose children or tests are folded away
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    pub story_children: HashSet<String>,
    pub acceptance_tests: HashSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HiddenCounts {
    pub story_children: usize,
    pub acceptance_tests: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MindmapNode {
    pub id: String,
    pub kind: MindmapNodeKind,
    pub label: String,
    pub status: String,
    pub reference_id: String,
    pub depth: u32,
    pub angle: f64,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<HiddenCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindmapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mindmap {
    pub nodes: Vec<MindmapNode>,
    pub edges: Vec<MindmapEdge>,
}

impl Mindmap {
    pub fn node(&self, id: &str) -> Option<&MindmapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

struct TreeNode {
    id: String,
    kind: MindmapNodeKind,
    label: String,
    status: String,
    reference_id: String,
    hidden: Option<HiddenCounts>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }
}

/// Lay out a merge request as concentric rings
///
/// The merge request sits at the origin; each level is `RADIUS_STEP`
/// further out. Every node gets an angular slice proportional to the
/// number of leaves beneath it, over `[-π + 0.35, π - 0.35]`, and is
/// placed at the middle of its slice.
///
/// # Errors
/// * `MergeRequestNotFound` / `StoryNotFound` / `TestNotFound` - dangling ids
pub fn build_mindmap(store: &Store, mr_id: &str, collapse: &CollapseState) -> Result<Mindmap> {
    let mr = store.get_merge_request(mr_id)?;
    let children = store
        .roots_of(mr_id)?
        .into_iter()
        .map(|story| story_node(store, story, collapse))
        .collect::<Result<Vec<_>>>()?;

    let root = TreeNode {
        id: format!("mr-{}", mr.id),
        kind: MindmapNodeKind::MergeRequest,
        label: mr.title.clone(),
        status: mr.status.to_string(),
        reference_id: mr.id.clone(),
        hidden: None,
        children,
    };

    let mut mindmap = Mindmap::default();
    place(&root, 0, -PI + ANGLE_MARGIN, PI - ANGLE_MARGIN, &mut mindmap.nodes);
    collect_edges(&root, &mut mindmap.edges);
    Ok(mindmap)
}

fn story_node(store: &Store, story: &Story, collapse: &CollapseState) -> Result<TreeNode> {
    let children_hidden = collapse.story_children.contains(&story.id);
    let tests_hidden = collapse.acceptance_tests.contains(&story.id);

    let mut children = Vec::new();
    if !children_hidden {
        for child in store.children_of(&story.id)? {
            children.push(story_node(store, child, collapse)?);
        }
    }
    if !tests_hidden {
        for test in store.tests_of(&story.id)? {
            let label = if test.title.is_empty() {
                format!("{} → {}", test.given, test.then)
            } else {
                test.title.clone()
            };
            children.push(TreeNode {
                id: format!("acceptance-{}", test.id),
                kind: MindmapNodeKind::Acceptance,
                label,
                status: test.status.to_string(),
                reference_id: test.id.clone(),
                hidden: None,
                children: Vec::new(),
            });
        }
    }

    Ok(TreeNode {
        id: format!("story-{}", story.id),
        kind: MindmapNodeKind::Story,
        label: format!("{} / {}", story.as_a, story.i_want),
        status: story.status.to_string(),
        reference_id: story.id.clone(),
        hidden: Some(HiddenCounts {
            story_children: if children_hidden { story.child_ids.len() } else { 0 },
            acceptance_tests: if tests_hidden { story.test_ids.len() } else { 0 },
        }),
        children,
    })
}

fn place(node: &TreeNode, depth: u32, start: f64, end: f64, out: &mut Vec<MindmapNode>) {
    let angle = (start + end) / 2.0;
    let radius = f64::from(depth) * RADIUS_STEP;
    out.push(MindmapNode {
        id: node.id.clone(),
        kind: node.kind,
        label: node.label.clone(),
        status: node.status.clone(),
        reference_id: node.reference_id.clone(),
        depth,
        angle,
        x: radius * angle.cos(),
        y: radius * angle.sin(),
        hidden: node.hidden,
    });

    let total_leaves = node.leaf_count() as f64;
    let mut current = start;
    for child in &node.children {
        let share = child.leaf_count() as f64 / total_leaves;
        let child_end = current + (end - start) * share;
        place(child, depth + 1, current, child_end, out);
        current = child_end;
    }
}

fn collect_edges(node: &TreeNode, out: &mut Vec<MindmapEdge>) {
    for child in &node.children {
        let kind = match (node.kind, child.kind) {
            (_, MindmapNodeKind::Acceptance) => EdgeKind::StoryAcceptance,
            (MindmapNodeKind::Story, _) => EdgeKind::StoryStory,
            _ => EdgeKind::MergeRequestStory,
        };
        out.push(MindmapEdge {
            id: format!("{}-{}", node.id, child.id),
            source: node.id.clone(),
            target: child.id.clone(),
            kind,
            animated: child.kind == MindmapNodeKind::Acceptance,
        });
        collect_edges(child, out);
    }
}
