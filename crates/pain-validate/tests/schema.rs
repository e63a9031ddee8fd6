use pain_model::SchemaVersion;
use pain_standards::embedded_registry;
use pain_validate::{CompiledSchema, SchemaResource, SchemaResourceError, validate};

const V03_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.03">
  <CstmrCdtTrfInitn>
    <GrpHdr>
      <MsgId>MSG-0001</MsgId>
      <CreDtTm>2023-03-10T15:30:47</CreDtTm>
      <NbOfTxs>2</NbOfTxs>
      <CtrlSum>450.25</CtrlSum>
      <InitgPty>
        <Nm>John Doe</Nm>
      </InitgPty>
    </GrpHdr>
    <PmtInf>
      <PmtInfId>Payment-Info-12345</PmtInfId>
      <PmtMtd>TRF</PmtMtd>
      <BtchBookg>true</BtchBookg>
      <NbOfTxs>2</NbOfTxs>
      <CtrlSum>450.25</CtrlSum>
      <ReqdExctnDt>2023-03-12</ReqdExctnDt>
      <Dbtr>
        <Nm>Acme Corp</Nm>
      </Dbtr>
      <DbtrAcct>
        <Id>
          <IBAN>DE75512108001245126162</IBAN>
        </Id>
      </DbtrAcct>
      <DbtrAgt>
        <FinInstnId>
          <BIC>BANKDEFFXXX</BIC>
        </FinInstnId>
      </DbtrAgt>
      <ChrgBr>SLEV</ChrgBr>
      <CdtTrfTxInf>
        <PmtId>
          <EndToEndId>PaymentID6789</EndToEndId>
        </PmtId>
        <Amt>
          <InstdAmt Ccy="EUR">150</InstdAmt>
        </Amt>
        <Cdtr>
          <Nm>Global Tech</Nm>
        </Cdtr>
        <CdtrAcct>
          <Id>
            <IBAN>DE68210501700024690959</IBAN>
          </Id>
        </CdtrAcct>
      </CdtTrfTxInf>
      <CdtTrfTxInf>
        <PmtId>
          <EndToEndId>PaymentID4321</EndToEndId>
        </PmtId>
        <Amt>
          <InstdAmt Ccy="EUR">300.25</InstdAmt>
        </Amt>
        <Cdtr>
          <Nm>Global Tech</Nm>
        </Cdtr>
        <CdtrAcct>
          <Id>
            <IBAN>DE68210501700024690959</IBAN>
          </Id>
        </CdtrAcct>
      </CdtTrfTxInf>
    </PmtInf>
  </CstmrCdtTrfInitn>
</Document>
"#;

fn embedded_schema(version: SchemaVersion) -> CompiledSchema {
    let registry = embedded_registry().expect("registry");
    let descriptor = registry.descriptor(version).expect("descriptor");
    SchemaResource::embedded(descriptor)
        .compile()
        .expect("embedded schema compiles")
}

fn messages(document: &str, schema: &CompiledSchema) -> String {
    validate(document.as_bytes(), schema)
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn every_embedded_schema_compiles() {
    for version in SchemaVersion::ALL {
        let schema = embedded_schema(version);
        assert_eq!(schema.origin(), format!("{}.xsd", version.message_type()));
        assert_eq!(
            schema.target_namespace(),
            Some(format!("urn:iso:std:iso:20022:tech:xsd:{}", version.message_type()).as_str())
        );
        assert_eq!(schema.document_elements().collect::<Vec<_>>(), vec!["Document"]);
    }
}

#[test]
fn conforming_document_passes() {
    let schema = embedded_schema(SchemaVersion::V03);
    let report = schema.validate(V03_DOCUMENT.as_bytes());
    assert!(report.passed(), "{report:?}");
}

#[test]
fn blank_and_missing_values_are_located() {
    let schema = embedded_schema(SchemaVersion::V03);
    let document = V03_DOCUMENT
        .replace("<MsgId>MSG-0001</MsgId>", "<MsgId></MsgId>")
        .replace(r#"<InstdAmt Ccy="EUR">300.25</InstdAmt>"#, "<InstdAmt>-5</InstdAmt>");

    insta::assert_snapshot!(messages(&document, &schema), @r"
    /Document/CstmrCdtTrfInitn/GrpHdr/MsgId: '' is shorter than the minimum length 1
    /Document/CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf[2]/Amt/InstdAmt/@Ccy: required attribute 'Ccy' is missing
    /Document/CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf[2]/Amt/InstdAmt: '-5' is less than the minimum 0
    ");
}

#[test]
fn order_and_cardinality_are_enforced() {
    let schema = embedded_schema(SchemaVersion::V03);

    let missing = V03_DOCUMENT.replace("<PmtMtd>TRF</PmtMtd>", "");
    assert_eq!(
        messages(&missing, &schema),
        "/Document/CstmrCdtTrfInitn/PmtInf: missing required element 'PmtMtd'"
    );

    let stray = V03_DOCUMENT.replace(
        "<MsgId>MSG-0001</MsgId>",
        "<MsgId>MSG-0001</MsgId><Note>hello</Note>",
    );
    assert_eq!(
        messages(&stray, &schema),
        "/Document/CstmrCdtTrfInitn/GrpHdr/Note: unexpected element 'Note'"
    );

    let swapped = V03_DOCUMENT.replace(
        "<NbOfTxs>2</NbOfTxs>\n      <CtrlSum>450.25</CtrlSum>\n      <InitgPty>",
        "<CtrlSum>450.25</CtrlSum>\n      <NbOfTxs>2</NbOfTxs>\n      <InitgPty>",
    );
    assert_ne!(swapped, V03_DOCUMENT);
    assert!(!validate(swapped.as_bytes(), &schema).passed());
}

#[test]
fn facets_and_enumerations() {
    let schema = embedded_schema(SchemaVersion::V03);
    let document = V03_DOCUMENT
        .replace("<PmtMtd>TRF</PmtMtd>", "<PmtMtd>WIRE</PmtMtd>")
        .replace("<BIC>BANKDEFFXXX</BIC>", "<BIC>bankdeff</BIC>")
        .replace("<ReqdExctnDt>2023-03-12</ReqdExctnDt>", "<ReqdExctnDt>12.03.2023</ReqdExctnDt>");

    insta::assert_snapshot!(messages(&document, &schema), @r"
    /Document/CstmrCdtTrfInitn/PmtInf/PmtMtd: 'WIRE' is not one of CHK, TRF, TRA
    /Document/CstmrCdtTrfInitn/PmtInf/ReqdExctnDt: '12.03.2023' is not a valid date
    /Document/CstmrCdtTrfInitn/PmtInf/DbtrAgt/FinInstnId/BIC: 'bankdeff' does not match pattern '[A-Z]{6,6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3,3}){0,1}'
    ");
}

#[test]
fn wrong_namespace_or_revision_is_reported() {
    let v09 = embedded_schema(SchemaVersion::V09);
    let report = validate(V03_DOCUMENT.as_bytes(), &v09);
    assert!(!report.passed());
    assert_eq!(report.violations[0].location, "/Document");
    assert!(report.violations[0].message.contains("pain.001.001.03"));
}

#[test]
fn unreadable_documents_yield_one_violation() {
    let schema = embedded_schema(SchemaVersion::V04);
    let report = validate(b"<Document><CstmrCdtTrfInitn></Document>", &schema);
    assert_eq!(report.len(), 1);
    assert_eq!(report.violations[0].location, "/");

    let report = validate(&[0xff, 0xfe, 0x00], &schema);
    assert_eq!(report.len(), 1);
    assert!(report.violations[0].message.contains("UTF-8"));
}

#[test]
fn unsupported_constructs_fail_to_compile() {
    let import = SchemaResource::from_text(
        "custom.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:x">
  <xs:import namespace="urn:y" schemaLocation="y.xsd"/>
  <xs:element name="Document" type="xs:string"/>
</xs:schema>"#,
    );
    assert!(matches!(
        import.compile(),
        Err(SchemaResourceError::Unsupported { .. })
    ));

    let undefined = SchemaResource::from_text(
        "custom.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:x" targetNamespace="urn:x">
  <xs:element name="Document" type="Missing"/>
</xs:schema>"#,
    );
    assert!(matches!(
        undefined.compile(),
        Err(SchemaResourceError::UnresolvedType { .. })
    ));

    let not_a_schema = SchemaResource::from_text("custom.xsd", "<Document/>");
    assert!(matches!(
        not_a_schema.compile(),
        Err(SchemaResourceError::Malformed { .. })
    ));
}

#[test]
fn custom_schema_from_text() {
    let schema = SchemaResource::from_text(
        "tiny.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:t" targetNamespace="urn:t" elementFormDefault="qualified">
  <xs:element name="Root">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Code" type="Code" maxOccurs="2"/>
      </xs:sequence>
      <xs:attribute name="v" type="xs:string"/>
    </xs:complexType>
  </xs:element>
  <xs:simpleType name="Code">
    <xs:restriction base="xs:string">
      <xs:length value="2"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"#,
    )
    .compile()
    .expect("compiles");

    assert!(validate(br#"<Root xmlns="urn:t" v="1"><Code>AB</Code></Root>"#, &schema).passed());
    assert_eq!(
        messages(
            r#"<Root xmlns="urn:t" w="1"><Code>ABC</Code><Code>AB</Code><Code>CD</Code></Root>"#,
            &schema
        ),
        "/Root/@w: attribute 'w' is not allowed\n\
         /Root/Code[1]: 'ABC' has length 3, expected 2\n\
         /Root/Code[3]: unexpected element 'Code'"
    );
}

const SUPPLEMENTARY_DATA: &str = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:t" targetNamespace="urn:t" elementFormDefault="qualified">
  <xs:element name="Document" type="Document"/>
  <xs:element name="Note" type="Code"/>
  <xs:complexType name="Document">
    <xs:sequence>
      <xs:element name="Id" type="Code"/>
      <xs:element name="SplmtryData" type="SupplementaryData1" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="SupplementaryData1">
    <xs:sequence>
      <xs:element name="PlcAndNm" type="Max350Text" minOccurs="0"/>
      <xs:element name="Envlp" type="SupplementaryDataEnvelope1"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="SupplementaryDataEnvelope1">
    <xs:sequence>
      <xs:any namespace="##any" processContents="lax"/>
    </xs:sequence>
  </xs:complexType>
  <xs:simpleType name="Max350Text">
    <xs:restriction base="xs:string">
      <xs:minLength value="1"/>
      <xs:maxLength value="350"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="Code">
    <xs:restriction base="xs:string">
      <xs:length value="2"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"###;

#[test]
fn supplementary_data_envelope_accepts_any_content() {
    let schema = SchemaResource::from_text("splmtry.xsd", SUPPLEMENTARY_DATA)
        .compile()
        .expect("xs:any compiles");

    let foreign = r#"<Document xmlns="urn:t"><Id>AB</Id><SplmtryData><PlcAndNm>/Document/Id</PlcAndNm><Envlp><ext:Info xmlns:ext="urn:ext" ref="9"><ext:Any>free text</ext:Any><Unrelated/></ext:Info></Envlp></SplmtryData></Document>"#;
    assert!(validate(foreign.as_bytes(), &schema).passed());

    // A declared element is still checked under lax processing.
    assert_eq!(
        messages(
            r#"<Document xmlns="urn:t"><Id>AB</Id><SplmtryData><Envlp><Note>ABC</Note></Envlp></SplmtryData></Document>"#,
            &schema
        ),
        "/Document/SplmtryData/Envlp/Note: 'ABC' has length 3, expected 2"
    );
    assert_eq!(
        messages(
            r#"<Document xmlns="urn:t"><Id>AB</Id><SplmtryData><Envlp/></SplmtryData></Document>"#,
            &schema
        ),
        "/Document/SplmtryData/Envlp: expected at least 1 wildcard element(s), found 0"
    );
}

#[test]
fn wildcard_namespace_and_processing_are_honoured() {
    let strict_other = SchemaResource::from_text(
        "other.xsd",
        r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:t" targetNamespace="urn:t" elementFormDefault="qualified">
  <xs:element name="Root">
    <xs:complexType>
      <xs:sequence>
        <xs:any namespace="##other"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"###,
    )
    .compile()
    .expect("compiles");
    assert_eq!(
        messages(
            r#"<Root xmlns="urn:t"><x:Foo xmlns:x="urn:x"/></Root>"#,
            &strict_other
        ),
        "/Root/Foo: no declaration for element 'Foo'"
    );
    assert_eq!(
        messages(r#"<Root xmlns="urn:t"><Bar/></Root>"#, &strict_other),
        "/Root: expected at least 1 wildcard element(s), found 0\n\
         /Root/Bar: unexpected element 'Bar'"
    );

    let skip = SchemaResource::from_text(
        "skip.xsd",
        r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:t" targetNamespace="urn:t">
  <xs:element name="Root">
    <xs:complexType>
      <xs:sequence>
        <xs:any namespace="##local urn:x" processContents="skip" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"###,
    )
    .compile()
    .expect("compiles");
    assert!(
        validate(
            br#"<t:Root xmlns:t="urn:t"><Loose a="1"><Deep/></Loose><x:Foo xmlns:x="urn:x"/></t:Root>"#,
            &skip
        )
        .passed()
    );

    let invalid = SchemaResource::from_text(
        "bad.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:element name="Root">
    <xs:complexType>
      <xs:sequence>
        <xs:any processContents="eager"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#,
    );
    assert!(matches!(
        invalid.compile(),
        Err(SchemaResourceError::Malformed { .. })
    ));
}
