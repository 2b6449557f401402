use std::collections::BTreeMap;
use std::fs;

use resxcodec::converter::{Conversion, convert_auto, document_to_json, json_to_document};
use resxcodec::{Error, Parser, ResourceDocument};
use tempfile::TempDir;

const RESX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root>
  <xsd:schema id="root" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">
    <xsd:import namespace="http://www.w3.org/XML/1998/namespace" />
    <xsd:element name="root" msdata:IsDataSet="true">
      <xsd:complexType>
        <xsd:choice maxOccurs="unbounded">
          <xsd:element name="metadata">
            <xsd:complexType>
              <xsd:sequence>
                <xsd:element name="value" type="xsd:string" minOccurs="0" />
              </xsd:sequence>
              <xsd:attribute name="name" use="required" type="xsd:string" />
              <xsd:attribute name="type" type="xsd:string" />
              <xsd:attribute name="mimetype" type="xsd:string" />
              <xsd:attribute ref="xml:space" />
            </xsd:complexType>
          </xsd:element>
          <xsd:element name="assembly">
            <xsd:complexType>
              <xsd:attribute name="alias" type="xsd:string" />
              <xsd:attribute name="name" type="xsd:string" />
            </xsd:complexType>
          </xsd:element>
          <xsd:element name="data">
            <xsd:complexType>
              <xsd:sequence>
                <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />
                <xsd:element name="comment" type="xsd:string" minOccurs="0" msdata:Ordinal="2" />
              </xsd:sequence>
              <xsd:attribute name="name" type="xsd:string" use="required" msdata:Ordinal="1" />
              <xsd:attribute name="type" type="xsd:string" msdata:Ordinal="3" />
              <xsd:attribute name="mimetype" type="xsd:string" msdata:Ordinal="4" />
              <xsd:attribute ref="xml:space" />
            </xsd:complexType>
          </xsd:element>
          <xsd:element name="resheader">
            <xsd:complexType>
              <xsd:sequence>
                <xsd:element name="value" type="xsd:string" minOccurs="0" msdata:Ordinal="1" />
              </xsd:sequence>
              <xsd:attribute name="name" type="xsd:string" use="required" />
            </xsd:complexType>
          </xsd:element>
        </xsd:choice>
      </xsd:complexType>
    </xsd:element>
  </xsd:schema>
  <resheader name="resmimetype">
    <value>text/microsoft-resx</value>
  </resheader>
  <resheader name="version">
    <value>2.0</value>
  </resheader>
  <resheader name="reader">
    <value>System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>
  </resheader>
  <resheader name="writer">
    <value>System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089</value>
  </resheader>
  <data name="app_greeting" xml:space="preserve">
    <value>Hello ${name}</value>
  </data>
  <data name="app_subtitle" xml:space="preserve">
    <value>Welcome to my application</value>
  </data>
  <data name="app_title" xml:space="preserve">
    <value>My Application</value>
  </data>
</root>"#;

const JSON: &str = r#"{
  "app.greeting": "Hello {{name}}",
  "app.subtitle": "Welcome to my application",
  "app.title": "My Application"
}"#;

/// Whitespace-insensitive comparison for markup; both sides are stripped of
/// all whitespace before comparing.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect()
}

fn json_map(text: &str) -> BTreeMap<String, Option<String>> {
    serde_json::from_str(text).unwrap()
}

#[test]
fn resx_to_json_matches_fixture() {
    let document = ResourceDocument::from_str(RESX).unwrap();
    let json = document_to_json(&document).unwrap();
    assert_eq!(json_map(&json), json_map(JSON));
}

#[test]
fn json_to_resx_matches_fixture() {
    let document = json_to_document(JSON).unwrap();
    let mut out = Vec::new();
    document.to_writer(&mut out).unwrap();
    let output = String::from_utf8(out).unwrap();
    assert_eq!(normalize(&output), normalize(RESX));
}

#[test]
fn fixture_round_trips_through_document() {
    let document = json_to_document(JSON).unwrap();
    let json = document_to_json(&document).unwrap();
    assert_eq!(json_map(&json), json_map(JSON));
}

#[test]
fn fixture_round_trips_through_json() {
    let document = ResourceDocument::from_str(RESX).unwrap();
    let json = document_to_json(&document).unwrap();

    let rebuilt = json_to_document(&json).unwrap();
    assert_eq!(rebuilt.entries(), document.entries());
}

#[test]
fn convert_auto_json_to_resx() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("strings.json");
    let output = temp_dir.path().join("Strings.resx");
    fs::write(&input, JSON).unwrap();

    let conversion = convert_auto(&input, &output).unwrap();
    assert_eq!(conversion, Conversion::JsonToResx);

    let document = ResourceDocument::read_from(&output).unwrap();
    assert_eq!(document.get("app_title"), Some("My Application"));
    assert_eq!(document.get("app_greeting"), Some("Hello ${name}"));
}

#[test]
fn convert_auto_resx_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("Strings.resx");
    let output = temp_dir.path().join("strings.json");
    fs::write(&input, RESX).unwrap();

    let conversion = convert_auto(&input, &output).unwrap();
    assert_eq!(conversion, Conversion::ResxToJson);

    let json = fs::read_to_string(&output).unwrap();
    assert_eq!(json_map(&json), json_map(JSON));
}

#[test]
fn convert_auto_is_case_insensitive_on_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("strings.JSON");
    let output = temp_dir.path().join("Strings.Resx");
    fs::write(&input, JSON).unwrap();

    assert_eq!(
        convert_auto(&input, &output).unwrap(),
        Conversion::JsonToResx
    );
}

#[test]
fn convert_auto_missing_input_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("missing.json");
    let output = temp_dir.path().join("Strings.resx");

    let result = convert_auto(&input, &output);
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!output.exists());
}

#[test]
fn convert_auto_unsupported_pair_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notes.txt");
    let output = temp_dir.path().join("Strings.resx");
    fs::write(&input, "not a resource file").unwrap();

    let result = convert_auto(&input, &output);
    assert!(matches!(result, Err(Error::UnsupportedConversion { .. })));
    assert!(!output.exists());
}

#[test]
fn convert_auto_malformed_document_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.resx");
    let output = temp_dir.path().join("strings.json");
    fs::write(
        &input,
        r#"<root><data name="a"><value>1</value></data><data name="a"><value>2</value></data></root>"#,
    )
    .unwrap();

    let result = convert_auto(&input, &output);
    match result {
        Err(Error::DuplicateKeys(keys)) => assert_eq!(keys, vec!["a"]),
        other => panic!("expected DuplicateKeys, got {:?}", other),
    }
    assert!(!output.exists());
}
