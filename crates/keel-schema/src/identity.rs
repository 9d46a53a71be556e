//! Identity resolution for `$id`, `$anchor` and `$ref`.
//!
//! Every subschema is addressable by one or more absolute identities:
//! its `$id` (resolved against the enclosing base), its `$anchor`
//! (a fragment on the enclosing base) and its JSON-pointer position.
//! References resolve to the same absolute form, so reference patching
//! is a plain string lookup.

use std::sync::LazyLock;

use keel_value::Pointer;
use url::Url;

/// Base identity used when the caller supplies none.
pub const DEFAULT_BASE_URI: &str = "mem://input";

pub(crate) static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_BASE_URI).expect("default base URI must parse"));

/// Render a URL as an identity key, dropping an empty fragment so that
/// `http://x#` and `http://x` name the same schema.
pub(crate) fn normalize(mut url: Url) -> String {
    if url.fragment() == Some("") {
        url.set_fragment(None);
    }
    url.to_string()
}

/// Resolve a reference against the current base and normalize it.
pub(crate) fn resolve(base: &Url, reference: &str) -> Result<String, url::ParseError> {
    base.join(reference).map(normalize)
}

/// The identity of the subschema at `pointer` inside the resource
/// rooted at `base`.
pub(crate) fn pointer_identity(base: &Url, pointer: &Pointer) -> String {
    if pointer.is_root() {
        return normalize(base.clone());
    }
    let mut url = base.clone();
    let fragment = pointer.to_string();
    url.set_fragment(Some(&fragment[1..]));
    normalize(url)
}

/// The identity declared by an `$anchor` name under `base`.
pub(crate) fn anchor_identity(base: &Url, anchor: &str) -> String {
    let mut url = base.clone();
    url.set_fragment(Some(anchor));
    normalize(url)
}

/// Split an identity into its document part and its raw fragment.
pub(crate) fn split_fragment(identity: &str) -> (&str, Option<&str>) {
    match identity.find('#') {
        Some(position) => (&identity[..position], Some(&identity[position + 1..])),
        None => (identity, None),
    }
}

/// Percent-decode a fragment before evaluating it as a JSON pointer.
pub(crate) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(high) = (bytes.get(i + 1)).and_then(|b| (*b as char).to_digit(16))
            && let Some(low) = (bytes.get(i + 2)).and_then(|b| (*b as char).to_digit(16))
        {
            out.push((high * 16 + low) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}
