/// Relative prefix that PIP bodies use for their figures and attachments.
pub const RESOURCE_PREFIX: &str = "resources/PIP-";

/// Point relative resource links at the public asset location.
///
/// This is a plain substring replacement over the rendered HTML: every
/// occurrence of [`RESOURCE_PREFIX`] becomes `<asset_base>PIP-`, including
/// occurrences in prose or code blocks. The replacement is a single pass, so
/// an asset base that itself contains the prefix is not rewritten again.
pub fn rewrite_resource_links(html: &str, asset_base: &str) -> String {
    html.replace(RESOURCE_PREFIX, &format!("{asset_base}PIP-"))
}
