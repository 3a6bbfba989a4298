//! Common test fixtures shared across the test suite.

#![allow(dead_code)]

use mxtool::schema::MARCXML_NS;
use mxtool::{read_collection_str, Element, Schema};

/// A three-record collection in the prefixed form mxtool itself writes.
pub const SAMPLE_COLLECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- sample -->
<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.loc.gov/MARC21/slim http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd">
  <marc:record>
    <marc:leader>00000nam a2200000 a 4500</marc:leader>
    <marc:controlfield tag="001">100</marc:controlfield>
    <marc:datafield tag="050" ind1=" " ind2="0">
      <marc:subfield code="a">QA76.64</marc:subfield>
      <marc:subfield code="b">.D47</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="100" ind1="1" ind2=" ">
      <marc:subfield code="a">Gamma, Erich.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="245" ind1="1" ind2="0">
      <marc:subfield code="a">Design Patterns</marc:subfield>
      <marc:subfield code="b">: elements of reusable object-oriented software</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="260" ind1=" " ind2=" ">
      <marc:subfield code="a">Reading, Mass. :</marc:subfield>
      <marc:subfield code="b">Addison-Wesley,</marc:subfield>
      <marc:subfield code="c">c1995.</marc:subfield>
    </marc:datafield>
  </marc:record>
  <marc:record>
    <marc:leader>00000nam a2200000 a 4500</marc:leader>
    <marc:controlfield tag="001">200</marc:controlfield>
    <marc:datafield tag="090" ind1=" " ind2=" ">
      <marc:subfield code="a">AB12.3</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="100" ind1="1" ind2=" ">
      <marc:subfield code="a">Austen, Jane.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="245" ind1="1" ind2="0">
      <marc:subfield code="a">Pride and prejudice</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="650" ind1=" " ind2="0">
      <marc:subfield code="a">Courtship</marc:subfield>
      <marc:subfield code="x">Fiction.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="650" ind1=" " ind2="0">
      <marc:subfield code="a">Sisters</marc:subfield>
    </marc:datafield>
  </marc:record>
  <marc:record>
    <marc:leader>00000nam a2200000 a 4500</marc:leader>
    <marc:controlfield tag="001">300</marc:controlfield>
    <marc:datafield tag="130" ind1="0" ind2=" ">
      <marc:subfield code="a">Beowulf.</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="245" ind1="1" ind2="0">
      <marc:subfield code="a">Beowulf</marc:subfield>
      <marc:subfield code="p">Part one</marc:subfield>
    </marc:datafield>
    <marc:datafield tag="250" ind1=" " ind2=" ">
      <marc:subfield code="a">2nd ed.</marc:subfield>
    </marc:datafield>
  </marc:record>
</marc:collection>
"#;

/// A one-record collection using the default namespace.
pub const SECOND_COLLECTION: &str = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
  <record>
    <leader>00000nam a2200000 a 4500</leader>
    <controlfield tag="001">400</controlfield>
    <datafield tag="100" ind1="1" ind2=" ">
      <subfield code="a">Knuth, Donald.</subfield>
    </datafield>
    <datafield tag="245" ind1="1" ind2="4">
      <subfield code="a">The art of computer programming</subfield>
    </datafield>
  </record>
</collection>
"#;

/// Parse and validate a collection with the built-in MARC21 slim schema.
pub fn load(xml: &str) -> Element {
    let schema = Schema::marc21_slim().expect("bundled schema should compile");
    read_collection_str(xml, &schema).expect("fixture should load")
}

/// Build a datafield with the given subfields.
pub fn datafield(tag: &str, subfields: &[(&str, &str)]) -> Element {
    Element::branch(
        "datafield",
        subfields
            .iter()
            .map(|(code, text)| Element::leaf("subfield", *text).with_attribute("code", *code))
            .collect(),
    )
    .with_attribute("tag", tag)
    .with_attribute("ind1", " ")
    .with_attribute("ind2", " ")
}

/// Build a record with a leader, one 001 control field, and the given data
/// fields.
pub fn record(id: &str, fields: Vec<Element>) -> Element {
    let mut children = vec![
        Element::leaf("leader", "00000nam a2200000 a 4500"),
        Element::leaf("controlfield", id).with_attribute("tag", "001"),
    ];
    children.extend(fields);
    Element::branch("record", children)
}

/// Wrap records in a collection.
pub fn collection(records: Vec<Element>) -> Element {
    Element::branch("collection", records)
}

/// A cut-down MARC21 slim schema: the same content model without the
/// simple-type patterns.
pub fn marc_xsd() -> String {
    format!(
        r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns="{MARCXML_NS}"
            targetNamespace="{MARCXML_NS}" elementFormDefault="qualified">
  <xsd:element name="collection" type="collectionType"/>
  <xsd:element name="record" type="recordType"/>
  <xsd:complexType name="collectionType">
    <xsd:sequence minOccurs="0" maxOccurs="unbounded">
      <xsd:element ref="record"/>
    </xsd:sequence>
    <xsd:attribute name="id" type="xsd:ID"/>
  </xsd:complexType>
  <xsd:complexType name="recordType">
    <xsd:sequence minOccurs="0">
      <xsd:element name="leader" type="xsd:string"/>
      <xsd:element name="controlfield" minOccurs="0" maxOccurs="unbounded">
        <xsd:complexType>
          <xsd:simpleContent>
            <xsd:extension base="xsd:string">
              <xsd:attribute name="tag" type="xsd:string" use="required"/>
            </xsd:extension>
          </xsd:simpleContent>
        </xsd:complexType>
      </xsd:element>
      <xsd:element name="datafield" minOccurs="0" maxOccurs="unbounded">
        <xsd:complexType>
          <xsd:sequence maxOccurs="unbounded">
            <xsd:element name="subfield">
              <xsd:complexType>
                <xsd:simpleContent>
                  <xsd:extension base="xsd:string">
                    <xsd:attribute name="code" type="xsd:string" use="required"/>
                  </xsd:extension>
                </xsd:simpleContent>
              </xsd:complexType>
            </xsd:element>
          </xsd:sequence>
          <xsd:attribute name="tag" type="xsd:string" use="required"/>
          <xsd:attribute name="ind1" type="xsd:string"/>
          <xsd:attribute name="ind2" type="xsd:string"/>
        </xsd:complexType>
      </xsd:element>
    </xsd:sequence>
    <xsd:attribute name="type" type="xsd:string"/>
  </xsd:complexType>
</xsd:schema>
"#
    )
}
