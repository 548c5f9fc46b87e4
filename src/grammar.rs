/// Tree-sitter grammars for the two passes of markdown parsing.
use tree_sitter::Language;

/// Block structure: sections, paragraphs, lists, quotes, code blocks, link definitions.
pub fn block_language() -> Language {
    return tree_sitter_md::LANGUAGE.into();
}

/// Inline content of one block: emphasis, code spans, links, images.
pub fn inline_language() -> Language {
    return tree_sitter_md::INLINE_LANGUAGE.into();
}
