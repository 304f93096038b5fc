use wiki2html::links::{LinkEvent, LinkResolver, ResolverError};
use wiki2html::{to_html, to_html_with, DialectKind};

#[test]
fn untokenized_text_renders_as_escaped_literal_in_every_dialect() {
    let src = "plain text with <angle> & ampersand";
    for kind in [
        DialectKind::Creole,
        DialectKind::Markdown,
        DialectKind::MediaWiki,
    ] {
        let html = to_html(src, kind);
        assert_eq!(
            html, "<p>plain text with &lt;angle&gt; &amp; ampersand</p>",
            "dialect {kind}"
        );
    }
}

#[test]
fn bracket_symmetry() {
    let html = to_html("**bold text**", DialectKind::Creole);
    assert_eq!(html.matches("<strong>").count(), 1);
    assert_eq!(html.matches("</strong>").count(), 1);
    assert!(html.contains("<strong>bold text</strong>"));

    let html = to_html("**bold text", DialectKind::Creole);
    assert!(html.contains("**bold text"));
    assert!(!html.contains("<strong>"));
}

#[test]
fn escape_span_inviolability() {
    let html = to_html("{{{**not bold**}}}", DialectKind::Creole);
    assert!(!html.contains("<strong>"), "{html}");
}

#[test]
fn link_event_round_trip() {
    struct Suffixer;
    impl LinkResolver for Suffixer {
        fn resolve_link(&mut self, event: &mut LinkEvent) -> Result<(), ResolverError> {
            event.href = format!("{}-resolved", event.raw_target);
            Ok(())
        }
    }

    let html = to_html_with("[[page]]", DialectKind::Creole, &mut Suffixer).unwrap();
    assert!(html.contains("<a href=\"page-resolved\">page</a>"), "{html}");
}

#[test]
fn list_depth_transitions() {
    let html = to_html("* a\n** b\n* c", DialectKind::Creole);
    assert!(
        html.contains("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"),
        "{html}"
    );
    assert_eq!(html.matches("<ul>").count(), 2);
    assert_eq!(html.matches("</ul>").count(), 2);
}

#[test]
fn script_injection_is_impossible() {
    let html = to_html("<script>alert(1)</script>\n\n**<img onerror=x>**", DialectKind::Creole);
    assert!(!html.contains("<script>"), "{html}");
    assert!(!html.contains("<img"), "{html}");
    assert!(html.contains("&lt;script&gt;"), "{html}");
}

#[test]
fn block_elements_balance_for_assorted_inputs() {
    let inputs = [
        "",
        "para one\n\npara two",
        "* a\n** b\n*** c\n# switch",
        "= H =\n* item\ntrailing text",
        "{{{\nraw\n}}}\n* tail",
        "** stray deep marker",
        "[[unterminated\n\n**also unterminated",
    ];
    for input in inputs {
        for kind in [
            DialectKind::Creole,
            DialectKind::Markdown,
            DialectKind::MediaWiki,
        ] {
            let html = to_html(input, kind);
            for (open, close) in [
                ("<ul>", "</ul>"),
                ("<ol>", "</ol>"),
                ("<p>", "</p>"),
                ("<pre>", "</pre>"),
            ] {
                assert_eq!(
                    html.matches(open).count(),
                    html.matches(close).count(),
                    "unbalanced {open} for input {input:?} in dialect {kind}: {html}"
                );
            }
        }
    }
}

#[test]
fn mediawiki_pipeline_end_to_end() {
    let src = "= Heading =\n'''bold''' and ''italic'' text.\n\n\
               [[File:Board.png|thumb|Start]]\n\n\
               <nowiki>'''verbatim'''</nowiki>\n";
    let html = to_html(src, DialectKind::MediaWiki);
    assert!(html.contains("<h1>Heading</h1>"), "{html}");
    assert!(html.contains("<strong>bold</strong>"), "{html}");
    assert!(html.contains("<em>italic</em>"), "{html}");
    assert!(html.contains("<img src=\"Board.png\" alt=\"Start\" />"), "{html}");
    assert!(html.contains("'''verbatim'''"), "{html}");
    assert_eq!(html.matches("<strong>").count(), 1, "{html}");
}

#[test]
fn resolver_failure_propagates_to_the_caller() {
    struct Failing;
    impl LinkResolver for Failing {
        fn resolve_link(&mut self, _event: &mut LinkEvent) -> Result<(), ResolverError> {
            Err("host lookup broke".into())
        }
    }

    let err = to_html_with("[[page]]", DialectKind::Creole, &mut Failing).unwrap_err();
    assert!(err.to_string().contains("page"), "{err}");
}
