use crate::types::LinkNode;

/// Check this is not a web link or an anchor link.
/// Matching is case-insensitive and by substring anywhere in the destination.
pub fn is_internal_link(destination: &str) -> bool {
    let lowered = destination.to_lowercase();
    let is_external = lowered.contains("http") || lowered.contains("www");
    let is_anchor = lowered.contains('#');
    return !(is_external || is_anchor);
}

/// Collect internal link destinations in pre-order.
fn collect_links<N: LinkNode>(node: &N, links: &mut Vec<String>) {
    if let Some(destination) = node.destination()
        && is_internal_link(destination)
    {
        links.push(destination.to_string());
    }
    for child in node.children() {
        collect_links(child, links);
    }
}

/// Walk a parsed document and return every internal link destination,
/// in the order the links appear. Duplicates are kept.
pub fn find_links<N: LinkNode>(root: &N) -> Vec<String> {
    let mut links = Vec::new();
    collect_links(root, &mut links);
    return links;
}
