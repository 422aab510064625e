// tests/parser_fixtures.rs
use rss_reader::{parse_feed, parse_items, ParseError};
use time::macros::datetime;

const SAMPLE_XML: &str = include_str!("fixtures/sample_rss.xml");

#[test]
fn sample_yields_every_item_in_document_order() {
    let items = parse_items(SAMPLE_XML).expect("sample parses");
    let titles: Vec<_> = items.iter().map(|i| i.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("A"), Some("B"), Some("C")]);
}

#[test]
fn missing_description_only_affects_that_item() {
    let items = parse_items(SAMPLE_XML).unwrap();
    assert_eq!(items[1].description, None);
    assert_eq!(items[1].link.as_deref(), Some("https://news.example.com/b"));
    assert_eq!(
        items[1].published_at,
        Some(datetime!(2024-03-03 17:45:00 UTC))
    );
    assert_eq!(
        items[0].description.as_deref(),
        Some("<p>First story &amp; more.</p>")
    );
    assert_eq!(items[2].description.as_deref(), Some("Third story."));
}

#[test]
fn unparsable_pub_date_is_absent_not_fatal() {
    let items = parse_items(SAMPLE_XML).unwrap();
    assert_eq!(items[2].published_at, None);
    assert_eq!(items[2].title.as_deref(), Some("C"));
}

#[test]
fn extra_item_fields_and_channel_metadata() {
    let feed = parse_feed(SAMPLE_XML).unwrap();
    assert_eq!(
        feed.items[0].author.as_deref(),
        Some("alice@news.example.com")
    );
    assert_eq!(feed.items[0].categories, vec!["World".to_string()]);

    let ch = &feed.channel;
    assert_eq!(ch.title.as_deref(), Some("Example News"));
    assert_eq!(ch.link.as_deref(), Some("https://news.example.com/"));
    assert_eq!(ch.language.as_deref(), Some("en-us"));
    assert_eq!(
        ch.managing_editor.as_deref(),
        Some("editor@news.example.com (Ed Itor)")
    );
    assert_eq!(
        ch.last_build_date.as_deref(),
        Some("Mon, 04 Mar 2024 09:00:00 +0000")
    );
    assert_eq!(ch.pub_date, None);
    assert_eq!(ch.categories, vec!["World".to_string(), "Tech".to_string()]);
}

#[test]
fn item_with_only_title() {
    let xml = "<rss><channel><item><title>Hello</title></item></channel></rss>";
    let items = parse_items(xml).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("Hello"));
    assert_eq!(items[0].link, None);
    assert_eq!(items[0].description, None);
    assert_eq!(items[0].published_at, None);
}

#[test]
fn missing_channel_or_foreign_root_means_zero_items() {
    assert!(parse_items("<rss version=\"2.0\"></rss>").unwrap().is_empty());
    assert!(parse_items("<rss/>").unwrap().is_empty());
    let atom = include_str!("fixtures/atom_feed.xml");
    let feed = parse_feed(atom).unwrap();
    assert!(feed.items.is_empty());
    assert!(feed.channel.is_empty());
}

#[test]
fn items_outside_channel_are_not_read() {
    let xml = "<rss><item><title>stray</title></item><channel></channel></rss>";
    assert!(parse_items(xml).unwrap().is_empty());
}

#[test]
fn k_items_in_yield_k_records() {
    for k in [0usize, 1, 7, 50] {
        let mut xml = String::from("<rss><channel>");
        for i in 0..k {
            xml.push_str(&format!("<item><title>t{i}</title></item>"));
        }
        xml.push_str("</channel></rss>");
        let items = parse_items(&xml).unwrap();
        assert_eq!(items.len(), k);
        if k > 0 {
            assert_eq!(items[k - 1].title.as_deref(), Some(format!("t{}", k - 1).as_str()));
        }
    }
}

#[test]
fn malformed_documents_are_parse_errors() {
    let broken = include_str!("fixtures/broken.xml");
    assert!(matches!(parse_feed(broken), Err(ParseError::Xml { .. })));
    assert!(parse_feed("<html><body>502 Bad Gateway").is_err());
    assert!(matches!(
        parse_feed("Service Unavailable"),
        Err(ParseError::TextOutsideRoot)
    ));
}

#[test]
fn repeated_attribute_on_root_is_a_parse_error() {
    let xml = "<rss version=\"2.0\" version=\"2.0\"><channel><item><title>x</title></item></channel></rss>";
    assert!(matches!(parse_feed(xml), Err(ParseError::Xml { .. })));
}

#[test]
fn byte_order_mark_is_tolerated() {
    let xml = "\u{feff}<rss><channel><item><title>x</title></item></channel></rss>";
    assert_eq!(parse_items(xml).unwrap().len(), 1);
}
