use wiki2html::{to_html, DialectKind};

#[test]
fn huge_unterminated_delimiter_runs_stay_literal() {
    // These inputs are intentionally pathological: long runs of opening
    // delimiters with no closers, which would punish any renderer that
    // rescans from the start per marker.
    let cases = [
        ("brackets", "[[".repeat(10_000)),
        ("braces", "{{".repeat(10_000)),
    ];

    for (name, src) in cases {
        let html = to_html(&src, DialectKind::Creole);
        assert!(
            !html.contains("<a ") && !html.contains("<img"),
            "pathological input '{name}' produced markup: {}",
            &html[..html.len().min(200)]
        );
    }
}

#[test]
fn long_marker_runs_produce_balanced_pairs() {
    // a bare run of asterisks is ten thousand legitimate (empty) bold pairs.
    let html = to_html(&"*".repeat(20_000), DialectKind::Creole);
    assert_eq!(
        html.matches("<strong>").count(),
        html.matches("</strong>").count()
    );
}

#[test]
fn alternating_markers_terminate_with_balanced_output() {
    let src = "**//__".repeat(5_000);
    let html = to_html(&src, DialectKind::Creole);
    for (open, close) in [
        ("<strong>", "</strong>"),
        ("<em>", "</em>"),
        ("<u>", "</u>"),
    ] {
        assert_eq!(
            html.matches(open).count(),
            html.matches(close).count(),
            "unbalanced {open}"
        );
    }
}

#[test]
fn deep_list_marker_runs_do_not_blow_up() {
    let src = format!("* top\n{} deep\n", "*".repeat(500));
    let html = to_html(&src, DialectKind::Creole);
    assert_eq!(html.matches("<ul>").count(), html.matches("</ul>").count());
    assert!(html.contains("deep"), "{html}");
}
