use super::*;

// =============================================================================
// escape
// =============================================================================

#[test]
fn escape_passes_plain_text_through() {
    assert_eq!(escape("hello world"), "hello world");
}

#[test]
fn escape_neutralizes_markup() {
    assert_eq!(escape("<script>"), "&lt;script&gt;");
    assert_eq!(escape("a & b"), "a &amp; b");
    assert_eq!(escape("\"quoted\""), "&quot;quoted&quot;");
    assert_eq!(escape("it's"), "it&#39;s");
}

#[test]
fn escape_keeps_unicode() {
    assert_eq!(escape("héllo…"), "héllo…");
}

// =============================================================================
// page
// =============================================================================

#[test]
fn page_interpolates_title_and_body() {
    let Html(rendered) = page("Home", "<p>hi</p>");
    assert!(rendered.contains("<title>Home</title>"));
    assert!(rendered.contains("<p>hi</p>"));
}

#[test]
fn page_escapes_the_title() {
    let Html(rendered) = page("<evil>", "body");
    assert!(rendered.contains("&lt;evil&gt;"));
    assert!(!rendered.contains("<title><evil>"));
}

#[test]
fn page_with_head_injects_extra_markup() {
    let Html(rendered) = page_with_head("Loading", "<meta http-equiv=\"refresh\" content=\"1\">", "<p>…</p>");
    assert!(rendered.contains("http-equiv=\"refresh\""));
}
