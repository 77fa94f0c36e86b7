use crate::errors::Result;
use crate::ops::Store;
use crate::rollup::{rollup_story, RollupResult};

/// Render a merge request as a nested Markdown outline
///
/// - Merge request title as H1, with status and drift marker
/// - One bullet per story, indented by depth, carrying status and
///   `done/total` rollup counts
/// - Acceptance tests as checkbox bullets under their story
///
/// # Errors
/// * `MergeRequestNotFound` - unknown merge request
/// * `StoryNotFound` / `TestNotFound` - dangling links
pub fn render_outline(store: &Store, mr_id: &str) -> Result<String> {
    let mr = store.get_merge_request(mr_id)?;

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", mr.title));
    output.push_str(&format!("**Status**: {}", mr.status));
    if !mr.branch.is_empty() {
        output.push_str(&format!(" | **Branch**: {}", mr.branch));
    }
    if mr.drift {
        output.push_str(" | **Drift detected**");
    }
    output.push_str("\n\n");

    if !mr.description.is_empty() {
        output.push_str(&format!("{}\n\n", mr.description));
    }

    for root_id in &mr.story_ids {
        let rollup = rollup_story(store, root_id)?;
        render_node(store, &rollup, 0, &mut output)?;
    }

    Ok(output)
}

fn render_node(store: &Store, node: &RollupResult, indent: usize, out: &mut String) -> Result<()> {
    let pad = "  ".repeat(indent);
    out.push_str(&format!(
        "{}- **{}** [{}] ({}/{} done",
        pad, node.title, node.status, node.counts.done, node.counts.total
    ));
    if node.counts.blocked > 0 {
        out.push_str(&format!(", {} blocked", node.counts.blocked));
    }
    out.push_str(")\n");

    let story = store.get_story(&node.story_id)?;
    if !story.i_want.is_empty() {
        out.push_str(&format!(
            "{}  _As {}, I want {}, so that {}_\n",
            pad, story.as_a, story.i_want, story.so_that
        ));
    }

    for test in &node.tests {
        let mark = if test.status == crate::model::TestStatus::Passed {
            "x"
        } else {
            " "
        };
        out.push_str(&format!("{}  - [{}] {}\n", pad, mark, test.title));
    }

    for child in &node.children {
        render_node(store, child, indent + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestStatus, WorkflowStatus};
    use crate::ops::{
        create_story, create_test, register_merge_request, MergeRequestInput, StoryInput,
        TestInput,
    };

    #[test]
    fn test_render_outline_nests_stories_and_tests() {
        let mut store = Store::new();
        register_merge_request(
            &mut store,
            MergeRequestInput {
                id: Some("m".to_string()),
                title: "Checkout revamp".to_string(),
                branch: "feature/checkout".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        create_story(
            &mut store,
            StoryInput {
                id: Some("p".to_string()),
                mr_id: "m".to_string(),
                title: "Payments".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        create_story(
            &mut store,
            StoryInput {
                id: Some("c".to_string()),
                mr_id: "m".to_string(),
                parent_id: Some("p".to_string()),
                title: "Card form".to_string(),
                status: WorkflowStatus::Done,
                ..Default::default()
            },
        )
        .unwrap();
        create_test(
            &mut store,
            TestInput {
                story_id: "c".to_string(),
                title: "Rejects expired card".to_string(),
                status: TestStatus::Passed,
                ..Default::default()
            },
        )
        .unwrap();

        let md = render_outline(&store, "m").unwrap();

        assert!(md.starts_with("# Checkout revamp\n"));
        assert!(md.contains("**Branch**: feature/checkout"));
        assert!(md.contains("- **Payments** [draft] (1/2 done)\n"));
        assert!(md.contains("  - **Card form** [done] (1/1 done)\n"));
        assert!(md.contains("    - [x] Rejects expired card\n"));
    }

    #[test]
    fn test_render_outline_missing_mr() {
        assert!(render_outline(&Store::new(), "nope").is_err());
    }
}
