//! Sample library shown on first launch

use std::collections::HashMap;

use chrono::{Local, TimeDelta};

use super::chat::{ChatMode, Composer, Conversation, Model};
use super::tree::TreeNode;

/// Initial library tree
pub fn library() -> Vec<TreeNode> {
    vec![
        TreeNode::folder("01", "01 Daily Notes").with_children(vec![
            TreeNode::file("20250917", "20250917"),
            TreeNode::file("20250918", "20250918"),
            TreeNode::file("20250919", "20250919"),
        ]),
        TreeNode::folder("02", "02 Core Concepts")
            .with_children(vec![TreeNode::file("concept-a", "Concepts")]),
        TreeNode::folder("03", "03 Projects").with_children(vec![TreeNode::folder(
            "product-insights",
            "Product Insights",
        )
        .with_children(vec![
            TreeNode::file("mulerun", "MuleRun Hands-on Review"),
            TreeNode::file("model-practice", "Model Practice"),
        ])]),
        TreeNode::folder("04", "04 Resources"),
        TreeNode::folder("05", "05 Weekly Review").with_children(vec![TreeNode::folder(
            "2025-10-30",
            "2025-10-30",
        )
        .with_children(vec![
            TreeNode::file("untitled-1", "Untitled"),
            TreeNode::file("untitled-2", "Untitled"),
            TreeNode::file("handbook", "Handbook"),
            TreeNode::file("hi", "hi"),
        ])]),
    ]
}

/// Markdown content of the seeded files, keyed by file id
pub fn documents() -> HashMap<String, String> {
    let daily = |day: &str| {
        format!(
            "# {day}\n\n## Morning\n\n- [x] Review yesterday's notes\n- [ ] Read one paper\n\n## Reading\n\n\
             Notes on what was read today.\n\n### Highlights\n\n> Keep it short.\n\n## Reflection\n\nWhat went well, what to change.\n"
        )
    };

    let mut docs = HashMap::new();
    for day in ["20250917", "20250918", "20250919"] {
        docs.insert(day.to_string(), daily(day));
    }
    docs.insert(
        "concept-a".to_string(),
        "# Concepts\n\n## Embeddings\n\nVectors that place similar things close together.\n\n\
         ## Attention\n\n### Self-attention\n\nEvery token looks at every other token.\n\n\
         ### Cross-attention\n\nQueries from one sequence, keys from another.\n\n\
         | Term | Meaning |\n| --- | --- |\n| Token | A unit of text |\n| Context | Tokens the model sees |\n"
            .to_string(),
    );
    docs.insert(
        "mulerun".to_string(),
        "# MuleRun Hands-on Review\n\n## Setup\n\nSign up and pick a template.\n\n## First impressions\n\n\
         The agent marketplace is ~~small~~ growing quickly.\n\n## Verdict\n\nSee [the site](https://mulerun.com) for more.\n"
            .to_string(),
    );
    docs.insert(
        "model-practice".to_string(),
        "# Model Practice\n\n## Prompting\n\n```text\nYou are a helpful assistant.\n```\n\n## Evaluation\n\n1. Collect cases\n2. Score answers\n"
            .to_string(),
    );
    docs.insert(
        "handbook".to_string(),
        "# Handbook\n\n## Weekly review\n\n### Wins\n\n### Misses\n\n## Next week\n\n---\n\nKeep the list short.\n"
            .to_string(),
    );
    docs.insert("hi".to_string(), "hi\n".to_string());
    docs
}

/// Ids of the folders expanded on launch
pub fn expanded_folders(roots: &[TreeNode]) -> Vec<String> {
    roots.iter().filter(|n| n.is_folder).map(|n| n.id.clone()).collect()
}

/// An older conversation for the history list
pub fn past_conversation() -> Conversation {
    Conversation::new(
        "conv-1",
        "Set up a react project with a home route",
        ChatMode::Agent,
        Composer::Composer1,
        Model::Gpt4,
        Local::now() - TimeDelta::hours(17),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_seeded_file_has_unique_id() {
        let tree = crate::core::tree::FileTree::new(library());
        let ids = tree.collect_all_ids();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());

        for id in documents().keys() {
            let node = tree.find_by_id(id).unwrap();
            assert!(!node.is_folder);
        }
    }

    #[test]
    fn test_expanded_folders_are_top_level() {
        assert_eq!(expanded_folders(&library()), vec!["01", "02", "03", "04", "05"]);
    }
}
