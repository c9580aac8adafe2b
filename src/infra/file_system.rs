use crate::domain::models::{Node, NodeId};
use anyhow::Context;
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

fn is_excluded(name: &OsStr, excluded_names: &[String]) -> bool {
    let name = name.to_string_lossy();
    excluded_names.iter().any(|ex| *ex == name)
}

/// Pops the deepest open directory off `stack` and attaches it to its parent.
fn close_directory(stack: &mut Vec<Node>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(finished) = stack.pop() {
        debug!(
            "Finished directory {} with {} entries",
            finished.path.display(),
            finished.children().len()
        );
        if let Some(parent) = stack.last_mut() {
            parent.push_child(finished);
        }
    }
}

/// Builds the in-memory tree rooted at `root`.
///
/// Entries whose base name is in `excluded_names` are pruned together with
/// their subtree. Returns `None` when the root itself is excluded or cannot
/// be read. Symlinks are never followed and show up as plain files.
pub fn scan_tree(root: &Path, excluded_names: &[String]) -> Option<Node> {
    info!("Scanning folder structure at path: {}", root.display());
    debug!("Excluded names: {:?}", excluded_names);

    if root.file_name().is_some_and(|n| is_excluded(n, excluded_names)) {
        info!("Skipping excluded directory: {}", root.display());
        return None;
    }

    let mut stack: Vec<Node> = Vec::new();
    let mut next_id = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let keep = e.depth() == 0 || !is_excluded(e.file_name(), excluded_names);
            if !keep {
                info!("Skipping excluded entry: {}", e.path().display());
            }
            keep
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                // A directory that cannot be listed is reported right after
                // it was opened, so it is still the innermost one on the stack.
                if let Some(path) = err.path() {
                    if stack.last().is_some_and(|dir| dir.path == path) {
                        stack.pop();
                    }
                }
                continue;
            }
        };

        let depth = entry.depth();
        while stack.len() > depth {
            if stack.len() == 1 {
                break;
            }
            close_directory(&mut stack);
        }

        let id = NodeId(next_id);
        next_id += 1;

        if entry.file_type().is_dir() {
            info!("Processing directory: {}", entry.path().display());
            stack.push(Node::new_directory(id, entry.path()));
            continue;
        }

        info!("Processing file: {}", entry.path().display());
        let file = Node::new_file(id, entry.path());
        match stack.last_mut() {
            Some(parent) => parent.push_child(file),
            None if depth == 0 => {
                info!("Root is a single file: {}", root.display());
                return Some(file);
            }
            // Parent directory was dropped as unreadable.
            None => continue,
        }
    }

    while stack.len() > 1 {
        close_directory(&mut stack);
    }

    let tree = stack.pop();
    match &tree {
        Some(node) => info!(
            "Scan complete: {} files under {}",
            node.file_count(),
            root.display()
        ),
        None => warn!("Nothing could be scanned at {}", root.display()),
    }
    tree
}

/// Reads a whole file as UTF-8 text. The handle is closed before returning.
pub fn read_file_contents(path: &Path) -> anyhow::Result<String> {
    debug!("Reading file contents: {}", path.display());
    let mut file =
        fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("cannot read {} as text", path.display()))?;
    debug!("Read {} bytes from file", contents.len());
    Ok(contents)
}
