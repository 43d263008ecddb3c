//! Boundary-token protocol for styled units.
//!
//! A styled unit's text fragments are joined into one string with
//! [`PADDED_BOUNDARY`] so they can be translated as a single sentence, then
//! split back apart afterwards. The translation step does not reliably keep
//! the tokens, so the way back is tolerant: [`split_fragments`] accepts
//! tokens with or without padding, [`reconcile`] repairs the piece count, and
//! [`strip_boundary_tokens`] removes anything that survived.

/// Literal marker joining fragments. Never altered by configuration.
pub const BOUNDARY_TOKEN: &str = "__SEG__";

/// The form used when merging: the token surrounded by single spaces.
pub const PADDED_BOUNDARY: &str = " __SEG__ ";

const WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

/// Outcome of comparing token counts between sent and received text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Preserved,
    /// The translation carries this many more tokens than were sent.
    Extra(usize),
    /// The translation dropped this many tokens.
    Lost(usize),
}

/// Normalizes a fragment's text for translation.
///
/// Interior whitespace runs collapse to a single space and the ends are
/// trimmed, unless `preserve` is set, in which case the text is kept verbatim.
pub fn normalize_fragment(raw: &str, preserve: bool) -> String {
    if preserve {
        raw.to_string()
    } else {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

pub fn merge_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PADDED_BOUNDARY)
}

pub fn count_boundary_tokens(text: &str) -> usize {
    text.matches(BOUNDARY_TOKEN).count()
}

/// Splits translated text on boundary tokens.
///
/// The padded form is tried first; if it does not split at all the bare
/// token is used, since translations often drop the surrounding spaces.
/// Tokens left inside a piece are removed. Whitespace is not trimmed here.
pub fn split_fragments(text: &str) -> Vec<String> {
    let mut pieces: Vec<&str> = text.split(PADDED_BOUNDARY).collect();
    if pieces.len() == 1 {
        pieces = text.split(BOUNDARY_TOKEN).collect();
    }

    pieces
        .into_iter()
        .map(|piece| piece.replace(BOUNDARY_TOKEN, ""))
        .collect()
}

/// Fits `pieces` to exactly `expected` fragments.
///
/// Missing pieces become empty fragments at the end. Excess pieces are
/// joined with a single space into the last fragment, so no translated
/// content is dropped.
pub fn reconcile(mut pieces: Vec<String>, expected: usize) -> Vec<String> {
    if expected == 0 {
        return Vec::new();
    }

    if pieces.len() > expected {
        let tail = pieces.split_off(expected - 1).join(" ");
        pieces.push(tail);
    }
    pieces.resize(expected, String::new());

    pieces
}

fn leading_whitespace(text: &str) -> &str {
    let end = text.len() - text.trim_start_matches(WHITESPACE).len();
    &text[..end]
}

fn trailing_whitespace(text: &str) -> &str {
    let start = text.trim_end_matches(WHITESPACE).len();
    &text[start..]
}

/// Reapplies the source fragment's leading and trailing whitespace to a
/// translated fragment.
///
/// Adjacent inline spans are rendered without any spacing between them, so
/// a translation that loses a boundary space runs two words together.
pub fn restore_whitespace(source: &str, translated: &str) -> String {
    if source.is_empty() {
        return translated.to_string();
    }

    let core = translated.trim();
    let leading = leading_whitespace(source);

    // A whitespace-only source is one run; apply it once.
    if leading.len() == source.len() {
        return format!("{leading}{core}");
    }

    let trailing = trailing_whitespace(source);
    format!("{leading}{core}{trailing}")
}

/// Removes every boundary token from `text`, returning the cleaned text and
/// how many tokens were removed.
///
/// A padded token collapses to a single space so neighbouring words stay
/// apart. The ends of the text are left alone. Removal repeats until no
/// token is left, since taking one out can join its neighbours into a new
/// one (`__SE__SEG__G__`).
pub fn strip_boundary_tokens(text: &str) -> (String, usize) {
    let mut cleaned = text.to_string();
    let mut removed = 0;

    loop {
        let found = count_boundary_tokens(&cleaned);
        if found == 0 {
            return (cleaned, removed);
        }
        removed += found;
        cleaned = cleaned.replace(PADDED_BOUNDARY, " ").replace(BOUNDARY_TOKEN, "");
    }
}

/// Compares the token count of the text sent for translation with the text
/// that came back.
pub fn check_boundary_tokens(sent: &str, received: &str) -> TokenCheck {
    let sent = count_boundary_tokens(sent);
    let received = count_boundary_tokens(received);

    match received.cmp(&sent) {
        std::cmp::Ordering::Equal => TokenCheck::Preserved,
        std::cmp::Ordering::Greater => TokenCheck::Extra(received - sent),
        std::cmp::Ordering::Less => TokenCheck::Lost(sent - received),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_normalize_fragment_collapses_whitespace() {
        assert_eq!(normalize_fragment("  Hello \n\t world  ", false), "Hello world");
        assert_eq!(normalize_fragment("  Hello \n world  ", true), "  Hello \n world  ");
        assert_eq!(normalize_fragment("   ", false), "");
    }

    #[test]
    fn test_merge_uses_padded_token() {
        assert_eq!(
            merge_fragments(&["The Pixelves", "have almost", "finished"]),
            "The Pixelves __SEG__ have almost __SEG__ finished"
        );
        assert_eq!(merge_fragments(&["only"]), "only");
    }

    #[test]
    fn test_split_inverts_merge() {
        let fragments = strings(&["one", "two words", "three"]);
        let merged = merge_fragments(&fragments);

        assert_eq!(count_boundary_tokens(&merged), fragments.len() - 1);
        assert_eq!(split_fragments(&merged), fragments);
    }

    #[test]
    fn test_split_round_trip_count_holds_for_varied_inputs() {
        let cases: Vec<Vec<String>> = vec![
            strings(&["a"]),
            strings(&["a", "b"]),
            strings(&["", "b", ""]),
            strings(&["x y", "z", "w", "v v v"]),
        ];

        for fragments in cases {
            let pieces = split_fragments(&merge_fragments(&fragments));
            assert_eq!(pieces.len(), fragments.len(), "fragments: {fragments:?}");
        }
    }

    #[test]
    fn test_split_falls_back_to_bare_token() {
        assert_eq!(split_fragments("uno__SEG__dos"), strings(&["uno", "dos"]));
        assert_eq!(split_fragments("uno __SEG__dos"), strings(&["uno ", "dos"]));
    }

    #[test]
    fn test_split_removes_stray_tokens_inside_pieces() {
        let pieces = split_fragments("text1 __SEG__ text2 with__SEG__in middle __SEG__ text3");
        assert_eq!(pieces, strings(&["text1", "text2 within middle", "text3"]));
    }

    #[test]
    fn test_split_token_at_edges() {
        // An unpadded leading token is not a split point, only stray content.
        let pieces = split_fragments("__SEG__ text1 __SEG__ text2");
        assert_eq!(pieces, strings(&[" text1", "text2"]));
    }

    #[test]
    fn test_reconcile_exact_count_is_unchanged() {
        let pieces = strings(&["a", "b"]);
        assert_eq!(reconcile(pieces.clone(), 2), pieces);
    }

    #[test]
    fn test_reconcile_pads_missing_fragments() {
        assert_eq!(reconcile(strings(&["piece"]), 2), strings(&["piece", ""]));
        assert_eq!(reconcile(Vec::new(), 3), strings(&["", "", ""]));
    }

    #[test]
    fn test_reconcile_merges_excess_into_last() {
        assert_eq!(
            reconcile(strings(&["p0", "p1", "p2", "p3"]), 2),
            strings(&["p0", "p1 p2 p3"])
        );
        assert_eq!(reconcile(strings(&["a", "b", "c"]), 1), strings(&["a b c"]));
    }

    #[test]
    fn test_reconcile_zero_expected() {
        assert!(reconcile(strings(&["a"]), 0).is_empty());
    }

    #[test]
    fn test_restore_whitespace_trailing_space() {
        assert_eq!(restore_whitespace("into ", "en"), "en ");
    }

    #[test]
    fn test_restore_whitespace_both_ends() {
        assert_eq!(restore_whitespace(" \tword\r\n", "  palabra "), " \tpalabra\r\n");
        assert_eq!(restore_whitespace("word", " palabra "), "palabra");
    }

    #[test]
    fn test_restore_whitespace_empty_source_keeps_translation() {
        assert_eq!(restore_whitespace("", " as is "), " as is ");
    }

    #[test]
    fn test_restore_whitespace_whitespace_only_source() {
        assert_eq!(restore_whitespace(" ", ""), " ");
        assert_eq!(restore_whitespace("\r", "x"), "\rx");
    }

    #[test]
    fn test_strip_boundary_tokens() {
        assert_eq!(strip_boundary_tokens("clean"), ("clean".to_string(), 0));
        assert_eq!(strip_boundary_tokens("a __SEG__ b"), ("a b".to_string(), 1));
        assert_eq!(strip_boundary_tokens("a__SEG__b __SEG__ "), ("ab ".to_string(), 2));
    }

    #[test]
    fn test_strip_is_idempotent() {
        for text in ["x __SEG__ y__SEG__z ", "ok __SE__SEG__G__ done", "__S__SE__SEG__G__EG__"] {
            let (once, _) = strip_boundary_tokens(text);
            let (twice, removed) = strip_boundary_tokens(&once);
            assert_eq!(once, twice, "text: {text}");
            assert_eq!(removed, 0, "text: {text}");
        }
    }

    #[test]
    fn test_strip_removes_tokens_formed_by_removal() {
        assert_eq!(
            strip_boundary_tokens("ok __SE__SEG__G__ done"),
            ("ok done".to_string(), 2)
        );
        assert_eq!(strip_boundary_tokens("__S__SE__SEG__G__EG__"), (String::new(), 3));
    }

    #[test]
    fn test_check_boundary_tokens() {
        let sent = "a __SEG__ b __SEG__ c";
        assert_eq!(check_boundary_tokens(sent, "x __SEG__ y __SEG__ z"), TokenCheck::Preserved);
        assert_eq!(check_boundary_tokens(sent, "x __SEG__ y"), TokenCheck::Lost(1));
        assert_eq!(
            check_boundary_tokens(sent, "x __SEG__ y __SEG__ __SEG__ z"),
            TokenCheck::Extra(1)
        );
        assert_eq!(check_boundary_tokens("plain", "llano"), TokenCheck::Preserved);
    }
}
