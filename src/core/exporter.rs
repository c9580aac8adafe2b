use crate::domain::models::{Node, NodeKind, Selection};
use crate::infra::file_system::read_file_contents;
use log::{debug, error, info};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Embeds the contents of every selected file into `tree`.
///
/// Read failures are stored as an error message in place of the contents,
/// so one unreadable file never stops the export. Returns the number of
/// files that received a `contents` field.
pub fn attach_contents(tree: &mut Node, selection: &Selection) -> usize {
    match &mut tree.kind {
        NodeKind::File { contents } => {
            if !selection.contains(tree.id) {
                return 0;
            }
            info!("Reading content for file: {}", tree.path.display());
            let text = match read_file_contents(&tree.path) {
                Ok(text) => text,
                Err(e) => {
                    error!("Error reading file {}: {:#}", tree.name, e);
                    format!("Error reading file: {:#}", e)
                }
            };
            *contents = Some(text);
            debug!(
                "Attached {} bytes to {}",
                tree.contents().map_or(0, str::len),
                tree.name
            );
            1
        }
        NodeKind::Directory { items } => items
            .iter_mut()
            .map(|item| attach_contents(item, selection))
            .sum(),
    }
}

/// Renders the tree as a four-space indented JSON document.
pub fn to_json(tree: &Node) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)?;
    buf.push(b'\n');
    debug!("Serialized tree to {} bytes of JSON", buf.len());
    Ok(String::from_utf8(buf)?)
}
