//! Opening cite key access

/// The cite key declared on the entry's opening line, if there is one.
pub fn cite_key(bibtex: &str) -> Option<&str> {
    let (open, close) = key_span(bibtex)?;
    Some(bibtex[open..close].trim())
}

/// Replace the opening cite key, leaving every other byte untouched.
///
/// Text without a recognizable `@type{key,` opening is returned unchanged.
pub fn replace_cite_key(bibtex: &str, new_key: &str) -> String {
    match key_span(bibtex) {
        Some((open, close)) => format!("{}{}{}", &bibtex[..open], new_key, &bibtex[close..]),
        None => bibtex.to_string(),
    }
}

// Byte range between the opening `{` and the `,` ending the key, both on
// the `@` line. A `}` or line end before the comma means there is no key.
fn key_span(bibtex: &str) -> Option<(usize, usize)> {
    let at = bibtex.find('@')?;
    let header_end = bibtex[at..].find('\n').map_or(bibtex.len(), |n| at + n);
    let header = &bibtex[at..header_end];
    let brace = at + header.find('{')?;
    let end = brace + bibtex[brace..header_end].find([',', '}'])?;
    (bibtex.as_bytes()[end] == b',').then_some((brace + 1, end))
}
