//! Inline content rendering tests: text, marks, links, media, footnotes,
//! plugins.

use prosetree::{
    Alignment, AttrValue, LinkLabel, MarkType, MarkupEvent, Media, Node, NodeType, assemble,
};
use serde_json::json;

fn text(s: &str) -> MarkupEvent {
    MarkupEvent::Text { text: s.to_string() }
}

/// Render `events` inside a paragraph and return the paragraph.
fn in_paragraph(events: Vec<MarkupEvent>) -> Node {
    let mut all = vec![MarkupEvent::ParagraphOpen];
    all.extend(events);
    all.push(MarkupEvent::ParagraphClose);
    let doc = assemble(&all);
    doc.content()[0].clone()
}

fn attr_str<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.attr(key).and_then(AttrValue::as_str)
}

// === Text ===

/// Newlines in paragraph text become spaces.
#[test]
fn paragraph_newlines_collapse() {
    let para = in_paragraph(vec![text("line one\nline two")]);
    assert_eq!(para.text_content(), "line one line two");
}

/// Newlines in list items are kept (the implicit paragraph is opened after
/// the parent is inspected).
#[test]
fn list_item_newlines_are_kept() {
    let doc = assemble(&[
        MarkupEvent::ListItemOpen { level: 1 },
        text("a\nb"),
        MarkupEvent::ListItemClose,
    ]);
    assert_eq!(doc.text_content(), "a\nb");
}

/// Typographic events are plain text runs.
#[test]
fn adjacent_text_runs() {
    let para = in_paragraph(vec![text("it"), text("'"), text("s")]);
    assert_eq!(para.content().len(), 3);
    assert_eq!(para.text_content(), "it's");
}

// === Marks ===

/// Nested formatting.
#[test]
fn nested_marks() {
    let para = in_paragraph(vec![
        MarkupEvent::MarkOpen { mark: MarkType::Strong },
        text("bold "),
        MarkupEvent::MarkOpen { mark: MarkType::Em },
        text("both"),
        MarkupEvent::MarkClose { mark: MarkType::Strong },
        text(" em"),
        MarkupEvent::MarkClose { mark: MarkType::Em },
        text(" plain"),
    ]);
    assert_eq!(
        serde_json::to_value(&para).unwrap(),
        json!({
            "type": "paragraph",
            "content": [
                {"type": "text", "marks": [{"type": "strong"}], "text": "bold "},
                {"type": "text", "marks": [{"type": "strong"}, {"type": "em"}], "text": "both"},
                {"type": "text", "marks": [{"type": "em"}], "text": " em"},
                {"type": "text", "text": " plain"}
            ]
        })
    );
}

/// Unformatted text gets its own mark on top of the active ones.
#[test]
fn unformatted_adds_mark_temporarily() {
    let para = in_paragraph(vec![
        MarkupEvent::MarkOpen { mark: MarkType::Underline },
        MarkupEvent::Unformatted {
            text: "**raw**".into(),
        },
        text("after"),
    ]);
    let raw = &para.content()[0];
    assert!(raw.has_mark(MarkType::Unformatted));
    assert!(raw.has_mark(MarkType::Underline));
    let after = &para.content()[1];
    assert!(!after.has_mark(MarkType::Unformatted));
    assert!(after.has_mark(MarkType::Underline));
}

/// Mark events parsed from JSON.
#[test]
fn marks_from_json_events() {
    let events: Vec<MarkupEvent> = serde_json::from_str(
        r#"[
            {"event": "paragraph_open"},
            {"event": "mark_open", "mark": "superscript"},
            {"event": "text", "text": "2"},
            {"event": "mark_close", "mark": "superscript"},
            {"event": "paragraph_close"}
        ]"#,
    )
    .unwrap();
    let doc = assemble(&events);
    assert!(doc.content()[0].content()[0].has_mark(MarkType::Superscript));
}

/// Unknown mark names are rejected at the input boundary.
#[test]
fn unknown_mark_in_json_fails() {
    let result: Result<Vec<MarkupEvent>, _> =
        serde_json::from_str(r#"[{"event": "mark_open", "mark": "blink"}]"#);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("unknown mark type `blink`"), "{err}");
}

// === Links ===

/// Internal link to an existing page.
#[test]
fn internal_link_attributes() {
    let para = in_paragraph(vec![MarkupEvent::InternalLink {
        href: "/doku.php?id=wiki:syntax#lists".into(),
        page: "wiki:syntax".into(),
        id: "wiki:syntax".into(),
        query: None,
        hash: Some("lists".into()),
        exists: true,
        label: None,
    }]);
    assert_eq!(
        serde_json::to_value(&para).unwrap(),
        json!({
            "type": "paragraph",
            "content": [{
                "type": "internallink",
                "attrs": {
                    "href": "/doku.php?id=wiki:syntax#lists",
                    "title": "wiki:syntax",
                    "data-id": "wiki:syntax",
                    "data-query": null,
                    "data-hash": "lists",
                    "class": "wikilink1"
                },
                "content": [{"type": "text", "text": "syntax"}]
            }]
        })
    );
}

/// Links to missing pages use the `wikilink2` class.
#[test]
fn internal_link_to_missing_page() {
    let para = in_paragraph(vec![MarkupEvent::InternalLink {
        href: "/doku.php?id=new".into(),
        page: "new".into(),
        id: "new".into(),
        query: None,
        hash: None,
        exists: false,
        label: Some(LinkLabel::Text("Create me".into())),
    }]);
    let link = &para.content()[0];
    assert_eq!(attr_str(link, "class"), Some("wikilink2"));
    assert_eq!(link.text_content(), "Create me");
}

/// Image labels replace link text and switch the class.
#[test]
fn external_link_with_image() {
    let para = in_paragraph(vec![MarkupEvent::ExternalLink {
        url: "https://example.com".into(),
        label: Some(LinkLabel::Media(Media {
            id: "logo.png".into(),
            src: "/lib/exe/fetch.php?media=logo.png".into(),
            align: Some(Alignment::Right),
            ..Media::default()
        })),
    }]);
    let link = &para.content()[0];
    assert_eq!(link.kind(), NodeType::ExternalLink);
    assert_eq!(attr_str(link, "class"), Some("media"));
    let image = &link.content()[0];
    assert_eq!(image.kind(), NodeType::Image);
    assert_eq!(attr_str(image, "class"), Some("mediaright"));
    assert_eq!(attr_str(image, "id"), Some("logo.png"));
}

/// External links default to showing the URL.
#[test]
fn external_link_defaults_to_url() {
    let para = in_paragraph(vec![MarkupEvent::ExternalLink {
        url: "https://example.com".into(),
        label: None,
    }]);
    let link = &para.content()[0];
    assert_eq!(attr_str(link, "class"), Some("urlextern"));
    assert_eq!(link.text_content(), "https://example.com");
}

/// Local links point at an anchor on the current page.
#[test]
fn local_link() {
    let para = in_paragraph(vec![MarkupEvent::LocalLink {
        hash: "intro".into(),
        name: None,
        page: "start".into(),
    }]);
    let link = &para.content()[0];
    assert_eq!(link.kind(), NodeType::LocalLink);
    assert_eq!(attr_str(link, "href"), Some("#intro"));
    assert_eq!(attr_str(link, "title"), Some("start \u{21b5}"));
    assert_eq!(link.text_content(), "intro");
}

/// Interwiki data attributes are HTML-escaped.
#[test]
fn interwiki_link_escapes_data() {
    let para = in_paragraph(vec![MarkupEvent::InterwikiLink {
        url: "https://en.wikipedia.org/wiki/Rust_(programming_language)".into(),
        shortcut: "wp".into(),
        reference: "Rust \"lang\"".into(),
        label: None,
    }]);
    let link = &para.content()[0];
    assert_eq!(attr_str(link, "class"), Some("interwikilink interwiki iw_wp"));
    assert_eq!(attr_str(link, "data-shortcut"), Some("wp"));
    assert_eq!(attr_str(link, "data-reference"), Some("Rust &quot;lang&quot;"));
    assert_eq!(link.text_content(), "Rust \"lang\"");
}

/// Email links.
#[test]
fn email_link() {
    let para = in_paragraph(vec![MarkupEvent::EmailLink {
        address: "me@example.com".into(),
        label: None,
    }]);
    let link = &para.content()[0];
    assert_eq!(attr_str(link, "href"), Some("mailto:me@example.com"));
    assert_eq!(attr_str(link, "class"), Some("mail"));
    assert_eq!(link.text_content(), "me@example.com");
}

/// Links keep active marks on their text.
#[test]
fn link_text_carries_marks() {
    let para = in_paragraph(vec![
        MarkupEvent::MarkOpen { mark: MarkType::Em },
        MarkupEvent::ExternalLink {
            url: "https://example.com".into(),
            label: Some(LinkLabel::Text("site".into())),
        },
    ]);
    let text = &para.content()[0].content()[0];
    assert!(text.has_mark(MarkType::Em));
}

// === Media, breaks, footnotes, plugins ===

/// Images carry their geometry.
#[test]
fn media_attributes() {
    let para = in_paragraph(vec![MarkupEvent::Media(Media {
        id: "wiki:dokuwiki.png".into(),
        src: "/_media/wiki:dokuwiki.png".into(),
        title: Some("Logo".into()),
        align: Some(Alignment::Center),
        width: Some(200),
        height: None,
        cache: Some("cache".into()),
        linking: None,
    })]);
    assert_eq!(
        serde_json::to_value(&para.content()[0]).unwrap(),
        json!({
            "type": "image",
            "attrs": {
                "src": "/_media/wiki:dokuwiki.png",
                "title": "Logo",
                "class": "mediacenter",
                "align": "center",
                "width": 200,
                "height": null,
                "id": "wiki:dokuwiki.png",
                "cache": "cache",
                "linking": null
            }
        })
    );
}

/// A line break in a list item gets a paragraph too.
#[test]
fn line_break_in_list_item() {
    let doc = assemble(&[
        MarkupEvent::ListItemOpen { level: 1 },
        text("a"),
        MarkupEvent::LineBreak,
        text("b"),
        MarkupEvent::ListItemClose,
    ]);
    let para = &doc.content()[0].content()[0];
    let kinds: Vec<_> = para.content().iter().map(Node::kind).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::HardBreak, NodeType::Text]);
}

/// Footnotes sit inline and hold paragraphs.
#[test]
fn footnote_inside_paragraph() {
    let para = in_paragraph(vec![
        text("claim"),
        MarkupEvent::FootnoteOpen,
        text("source\nline"),
        MarkupEvent::FootnoteClose,
        text(" continues"),
    ]);
    let kinds: Vec<_> = para.content().iter().map(Node::kind).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::Footnote, NodeType::Text]);
    let note = &para.content()[1];
    assert_eq!(note.content()[0].kind(), NodeType::Paragraph);
    assert_eq!(note.text_content(), "source line");
}

/// Plugin syntax is kept verbatim and unmarked.
#[test]
fn plugin_keeps_raw_match() {
    let para = in_paragraph(vec![
        MarkupEvent::MarkOpen { mark: MarkType::Strong },
        MarkupEvent::Plugin {
            name: "wrap".into(),
            matched: "<wrap hi>".into(),
        },
    ]);
    let plugin = &para.content()[0];
    assert_eq!(plugin.kind(), NodeType::Plugin);
    assert_eq!(
        serde_json::to_value(plugin).unwrap(),
        json!({"type": "dwplugin", "content": [{"type": "text", "text": "<wrap hi>"}]})
    );
}
