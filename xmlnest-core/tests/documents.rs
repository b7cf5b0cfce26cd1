//! End-to-end tests from XML text to trees, using response bodies shaped
//! like the unlocking-service API's.

mod common;

use common::{attrs, document, leaf, object, root};
use pretty_assertions::assert_eq;
use xmlnest_core::{
    events_from_str, parse_response, parse_str, parse_str_with, to_xml, BuildOptions,
    ResponseError, StreamErrorReason, TreeValue, XmlError,
};

const MOBILES: &str = r#"<Mobiles><Brand ID="1" Name="Apple"><Mobile ID="10" Name="iPhone"/><Mobile ID="11" Name="iPad"/></Brand></Mobiles>"#;

const SERVICES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<result>
  <imeiservices>
    <service>
      <id>1</id>
      <title>Unlock &amp; Check</title>
      <price>2.50</price>
    </service>
    <service>
      <id>2</id>
      <title>Blacklist Status</title>
      <price>0.75</price>
    </service>
  </imeiservices>
</result>
"#;

const IMEIS: &str = r#"<?phpxml version="1.0" encoding="utf-8"?>
<result>
  <imeis>
    <imei id="100" status="Completed">356938035643809</imei>
  </imeis>
</result>
"#;

#[test]
fn mobiles_document() {
    let tree = parse_str(MOBILES).unwrap();
    let expected = document(
        "Mobiles",
        object(vec![(
            "Brand",
            object(vec![
                ("ID", leaf("1")),
                ("Name", leaf("Apple")),
                ("Mobile", attrs(&[("ID", "10"), ("Name", "iPhone")])),
                ("Mobile", attrs(&[("ID", "11"), ("Name", "iPad")])),
            ]),
        )]),
    );
    assert_eq!(tree, expected);
}

#[test]
fn service_list_rows() {
    let tree = parse_response(SERVICES).unwrap();
    let services = tree.pointer("/result/imeiservices").unwrap().get("service").unwrap();

    assert_eq!(services.len(), 2);
    let titles: Vec<_> = services.items().iter().filter_map(|s| s.attr("title")).collect();
    assert_eq!(titles, ["Unlock & Check", "Blacklist Status"]);
    assert_eq!(
        tree.pointer("/result/imeiservices/service/1/price"),
        Some(&leaf("0.75"))
    );
}

#[test]
fn single_row_is_not_a_sequence() {
    // One row comes back bare, so callers must go through items().
    let tree = parse_response(IMEIS).unwrap();
    let imeis = tree.pointer("/result/imeis").unwrap();
    let rows = imeis.get("imei").unwrap();
    assert!(!rows.is_sequence());
    assert_eq!(rows.items().len(), 1);

    // Attributes win over the element's text.
    assert_eq!(rows.items()[0], attrs(&[("id", "100"), ("status", "Completed")]));
}

#[test]
fn vendor_error_surfaces() {
    let body = "<result><error>Invalid API key</error></result>";
    assert_eq!(
        parse_response(body).unwrap_err(),
        ResponseError::Api("Invalid API key".to_string())
    );

    // The tree itself is still available without the check.
    let tree = parse_str(body).unwrap();
    assert_eq!(tree.pointer("/result/error"), Some(&leaf("Invalid API key")));
}

#[test]
fn whitespace_kept_when_not_trimming() {
    let options = BuildOptions::default().trim_text(false);
    let tree = parse_str_with("<a> x <b/> y </a>", options).unwrap();
    let a = root(&tree).as_object().unwrap();
    assert_eq!(a.text(), [" x ", " y "]);
    assert_eq!(a.get("b").unwrap().items(), [leaf("")]);

    let tree = parse_str("<a> x <b/> y </a>").unwrap();
    assert_eq!(root(&tree).as_object().unwrap().text(), ["x", "y"]);
}

#[test]
fn limits_apply_through_parse() {
    let options = BuildOptions::default().max_depth(2);
    match parse_str_with("<a><b><c/></b></a>", options) {
        Err(XmlError::Malformed(err)) => assert_eq!(err.reason, StreamErrorReason::DepthLimit),
        other => panic!("expected malformed stream, got {other:?}"),
    }
}

#[test]
fn default_depth_ceiling_stops_deep_documents() {
    let depth = 100_000;
    let body = format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth));
    match parse_str(&body) {
        Err(XmlError::Malformed(err)) => {
            assert_eq!(err.reason, StreamErrorReason::DepthLimit);
            assert_eq!(err.tag.as_deref(), Some("a"));
        }
        other => panic!("expected depth limit, got {other:?}"),
    }
}

#[test]
fn mixed_text_kept_on_element_with_attributes() {
    let tree = parse_str(r#"<p id="1">lead<b/>tail</p>"#).unwrap();
    let p = root(&tree).as_object().unwrap();
    assert_eq!(p.text(), ["lead", "tail"]);
    assert_eq!(p.attribute_names().collect::<Vec<_>>(), ["id"]);
    assert_eq!(tree.pointer("/p/b"), Some(&leaf("")));

    // Without children the attributes still win.
    let tree = parse_str(r#"<p id="1">lead</p>"#).unwrap();
    assert_eq!(root(&tree), &attrs(&[("id", "1")]));
}

#[test]
fn xml_round_trip_keeps_structure() {
    let tree = parse_str(SERVICES).unwrap();
    let written = to_xml(&tree).unwrap();
    assert_eq!(parse_str(&written).unwrap(), tree);

    let tree = parse_str(MOBILES).unwrap();
    let reparsed = parse_str(&to_xml(&tree).unwrap()).unwrap();
    // Brand's attributes come back as child elements; the values match.
    assert_eq!(reparsed, tree);
}

#[test]
fn event_levels_follow_nesting() {
    let events = events_from_str(MOBILES).unwrap();
    let levels: Vec<_> = events.iter().map(|e| (e.tag.as_str(), e.level)).collect();
    assert_eq!(
        levels,
        [("Mobiles", 1), ("Brand", 2), ("Mobile", 3), ("Mobile", 3), ("Brand", 2), ("Mobiles", 1)]
    );
}

#[test]
fn all_text_of_document() {
    let tree = parse_str("<r><a>1</a><b><c>2</c></b><d k=\"v\"/></r>").unwrap();
    assert_eq!(tree.all_text(), "12");
    assert!(matches!(tree, TreeValue::Object(_)));
}
