//! Path segmentation and root policy
//!
//! Records are always inserted by their full segment sequence. The root
//! policy decides afterwards which nodes become top-level roots, so the
//! result does not depend on the order records arrived in.

use crate::tree::node::TreeNode;
use serde::{Deserialize, Serialize};

/// Split a listed path into its non-empty segments.
///
/// Leading, trailing and repeated separators are dropped, as are `.`
/// segments. borg lists the archive root as `.`, which yields no segments.
pub fn segment(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Join segments back into an absolute, `/`-separated display path
pub fn display_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for s in segments {
        out.push('/');
        out.push_str(s.as_ref());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// How top-level roots are chosen for export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Every archived top-level path becomes its own root
    #[default]
    PerDataset,
    /// All datasets stay nested under their shared filesystem prefix
    Merged,
}

impl RootPolicy {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge {
            RootPolicy::Merged
        } else {
            RootPolicy::PerDataset
        }
    }

    /// Select the top-level roots below the synthetic `root`.
    ///
    /// Roots are returned sorted by name, then by full path, so datasets that
    /// share a name under different parents keep a stable order.
    pub fn select_roots<'a>(&self, root: &'a TreeNode) -> Vec<&'a TreeNode> {
        match self {
            RootPolicy::Merged => root.children.values().collect(),
            RootPolicy::PerDataset => {
                let mut found = Vec::new();
                let mut prefix = Vec::new();
                collect_datasets(root, &mut prefix, &mut found);
                found.sort_by(|(a_path, a), (b_path, b)| {
                    a.name.cmp(&b.name).then_with(|| a_path.cmp(b_path))
                });
                found.into_iter().map(|(_, node)| node).collect()
            }
        }
    }
}

/// Descend through directories that only exist as shared ancestors; the
/// first anchor or leaf on each branch is a dataset root.
fn collect_datasets<'a>(
    dir: &'a TreeNode,
    prefix: &mut Vec<&'a str>,
    found: &mut Vec<(Vec<&'a str>, &'a TreeNode)>,
) {
    for (name, child) in &dir.children {
        prefix.push(name.as_str());
        if !child.is_dir() || child.is_anchor() {
            found.push((prefix.clone(), child));
        } else {
            collect_datasets(child, prefix, found);
        }
        prefix.pop();
    }
}
