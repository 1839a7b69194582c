//! End-to-end checks of the derive macros against the statement builders.

use myorm::{
    BlobCodec, CreateTable, InsertInto, Model, OrmError, OrmResult, ParamValue, Select, SqlCommand,
    SqlEnum, Update,
};
use myorm_derive::{Model, SqlEnum};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SomeOtherClass {
    content: i32,
}

/// Codec matching the payload's on-disk form: little-endian content bytes.
#[derive(Debug, Default)]
struct SomeOtherClassCodec;

impl BlobCodec<SomeOtherClass> for SomeOtherClassCodec {
    fn encode(&self, value: &SomeOtherClass) -> OrmResult<Vec<u8>> {
        Ok(value.content.to_le_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> OrmResult<SomeOtherClass> {
        let content = bytes
            .try_into()
            .map(i32::from_le_bytes)
            .map_err(|_| OrmError::decode("Payload", "expected four payload bytes"))?;
        Ok(SomeOtherClass { content })
    }
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "Extended")]
struct ExtendedTable {
    #[orm(primary_key, column = "Identifier")]
    identifier: Uuid,
    #[orm(not_null, max_size = 128, column = "Name")]
    name: String,
    #[orm(column = "Age")]
    age: i32,
    #[orm(not_null, max_size = 8192, blob, codec = SomeOtherClassCodec, column = "Payload")]
    payload: SomeOtherClass,
}

#[derive(Debug, Clone, Copy, PartialEq, SqlEnum)]
enum Something {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "enumtable")]
struct EnumTable {
    #[orm(primary_key, not_null, max_size = 128, column = "Name")]
    name: String,
    #[orm(enumeration, column = "Something")]
    something: Something,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "with_autoincrement")]
struct TableWithIncrement {
    #[orm(primary_key, auto_increment, column = "Identifier")]
    identifier: u64,
    #[orm(not_null, max_size = 32, column = "Value")]
    value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Payload {
    value_a: i32,
    value_b: i32,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "IdentifiedBlobs")]
struct IdentifiedBlob {
    #[orm(primary_key, column = "Identifier")]
    identifier: Uuid,
    #[orm(not_null, blob, column = "Value")]
    value: Payload,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "simple_nullable")]
struct SimpleTableWithNullables {
    #[orm(primary_key, column = "Identifier")]
    identifier: Uuid,
    #[orm(column = "Flag")]
    flag: Option<bool>,
    #[orm(column = "Amount")]
    amount: Option<Decimal>,
    #[orm(column = "Alternate")]
    alternate: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "simple_timespan")]
struct SimpleTableWithTimeSpan {
    #[orm(column = "Value")]
    value: chrono::TimeDelta,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[orm(table = "simple_timeonly")]
struct SimpleTableWithTimeOnly {
    #[orm(time_fraction = 3, column = "Value")]
    value: chrono::NaiveTime,
}

fn extended_record() -> ExtendedTable {
    ExtendedTable {
        identifier: Uuid::parse_str("eac14a93-32a9-480a-bcf6-5190c3a2a0d3").unwrap(),
        name: "Foo".to_string(),
        age: 10,
        payload: SomeOtherClass { content: 255 },
    }
}

#[test]
fn derived_create_table_matches_expected_layout() {
    let text = CreateTable::for_model::<ExtendedTable>()
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(
        text.command,
        "CREATE TABLE `Extended`(\n\
         `Identifier` CHAR(32) NOT NULL, `Name` VARCHAR(128) NOT NULL, `Age` INT SIGNED, `Payload` BLOB NOT NULL,\n\
         PRIMARY KEY (`Identifier`)\n\
         )"
    );
}

#[test]
fn derived_model_matches_a_hand_written_impl() {
    #[derive(Debug, Clone, PartialEq)]
    struct Manual {
        identifier: Uuid,
        name: String,
        age: i32,
        payload: SomeOtherClass,
    }

    impl Model for Manual {
        const TABLE: &'static str = "Extended";

        fn fields() -> &'static [myorm::FieldSpec] {
            static FIELDS: &[myorm::FieldSpec] = &[
                myorm::FieldSpec::new("Identifier", myorm::FieldType::Uuid).primary_key(),
                myorm::FieldSpec::new("Name", myorm::FieldType::Text)
                    .not_null()
                    .max_size(128),
                myorm::FieldSpec::new("Age", myorm::FieldType::Int),
                myorm::FieldSpec::new("Payload", myorm::FieldType::Blob)
                    .not_null()
                    .max_size(8192),
            ];
            FIELDS
        }

        fn values(&self) -> OrmResult<Vec<myorm::ScalarValue>> {
            Ok(vec![
                self.identifier.into(),
                self.name.clone().into(),
                self.age.into(),
                myorm::model::encode_blob::<SomeOtherClassCodec, _>(&self.payload)?,
            ])
        }

        fn from_values(values: Vec<myorm::ScalarValue>) -> OrmResult<Self> {
            let mut values = values.into_iter();
            let mut next = |column: &str| {
                values
                    .next()
                    .ok_or_else(|| OrmError::decode(column, "missing field value"))
            };
            Ok(Self {
                identifier: myorm::FromScalarValue::from_scalar(next("Identifier")?, "Identifier")?,
                name: myorm::FromScalarValue::from_scalar(next("Name")?, "Name")?,
                age: myorm::FromScalarValue::from_scalar(next("Age")?, "Age")?,
                payload: myorm::model::decode_blob::<SomeOtherClassCodec, _>(
                    next("Payload")?,
                    "Payload",
                )?,
            })
        }
    }

    assert_eq!(ExtendedTable::fields(), Manual::fields());

    let derived_sql = CreateTable::for_model::<ExtendedTable>()
        .unwrap()
        .format()
        .unwrap();
    let manual_sql = CreateTable::for_model::<Manual>().unwrap().format().unwrap();
    assert_eq!(derived_sql, manual_sql);
}

#[test]
fn derived_insert_renders_payload_hex_literal() {
    let text = InsertInto::row(&extended_record())
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(
        text.command,
        "INSERT INTO `Extended` (`Identifier`, `Name`, `Age`, `Payload`) \
         VALUES ('eac14a9332a9480abcf65190c3a2a0d3', 'Foo', 10, x'FF000000')"
    );
}

#[test]
fn derived_values_round_trip() {
    let record = extended_record();
    let back = ExtendedTable::from_values(record.values().unwrap()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn derived_select_where_binds_parameters_in_order() {
    let text = Select::<ExtendedTable>::all()
        .unwrap()
        .where_equal("Name", "Peter")
        .unwrap()
        .where_equal("Age", 42)
        .unwrap()
        .format()
        .unwrap();
    assert!(text.command.ends_with("WHERE `Name` = @p0\nAND `Age` = @p1"));
    assert_eq!(
        text.parameters[0].value,
        ParamValue::Text("Peter".to_string())
    );
    assert_eq!(text.parameters[1].value, ParamValue::Text("42".to_string()));
}

#[test]
fn sql_enum_assigns_declaration_order_ordinals() {
    assert_eq!(Something::First.to_index(), 0);
    assert_eq!(Something::Third.to_index(), 2);
    assert_eq!(Something::from_index(1).unwrap(), Something::Second);
    assert!(Something::from_index(9).is_err());
}

#[test]
fn sql_enum_honors_explicit_discriminants() {
    #[derive(Debug, PartialEq, SqlEnum)]
    enum Spaced {
        Low = 10,
        Next,
        High = 40,
    }

    assert_eq!(Spaced::Low.to_index(), 10);
    assert_eq!(Spaced::Next.to_index(), 11);
    assert_eq!(Spaced::High.to_index(), 40);
    assert_eq!(Spaced::from_index(11).unwrap(), Spaced::Next);
}

#[test]
fn derived_enum_column_renders_ordinal() {
    let record = EnumTable {
        name: "row".to_string(),
        something: Something::Second,
    };
    let text = InsertInto::row(&record).unwrap().format().unwrap();
    assert_eq!(
        text.command,
        "INSERT INTO `enumtable` (`Name`, `Something`) VALUES ('row', 1)"
    );

    let back = EnumTable::from_values(record.values().unwrap()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn derived_identity_flow_excludes_and_reselects_the_key() {
    let record = TableWithIncrement {
        identifier: 0,
        value: "row".to_string(),
    };
    let text = InsertInto::row(&record)
        .unwrap()
        .get_last_insert_identity::<u64>()
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(
        text.command,
        "INSERT INTO `with_autoincrement` (`Value`) VALUES ('row');\nSELECT LAST_INSERT_ID()"
    );
}

#[test]
fn derived_json_blob_round_trips() {
    let record = IdentifiedBlob {
        identifier: Uuid::parse_str("eac14a93-32a9-480a-bcf6-5190c3a2a0d3").unwrap(),
        value: Payload {
            value_a: 42,
            value_b: -44,
        },
    };

    let json = serde_json::to_vec(&record.value).unwrap();
    let hex: String = json.iter().map(|b| format!("{b:02X}")).collect();

    let text = InsertInto::row(&record).unwrap().format().unwrap();
    assert_eq!(
        text.command,
        format!(
            "INSERT INTO `IdentifiedBlobs` (`Identifier`, `Value`) \
             VALUES ('eac14a9332a9480abcf65190c3a2a0d3', x'{hex}')"
        )
    );

    let back = IdentifiedBlob::from_values(record.values().unwrap()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn derived_nullable_fields_render_null_literals() {
    let record = SimpleTableWithNullables {
        identifier: Uuid::parse_str("eac14a93-32a9-480a-bcf6-5190c3a2a0d3").unwrap(),
        flag: None,
        amount: None,
        alternate: None,
    };
    let text = InsertInto::row(&record).unwrap().format().unwrap();
    assert_eq!(
        text.command,
        "INSERT INTO `simple_nullable` (`Identifier`, `Flag`, `Amount`, `Alternate`) \
         VALUES ('eac14a9332a9480abcf65190c3a2a0d3', NULL, NULL, NULL)"
    );

    let back = SimpleTableWithNullables::from_values(record.values().unwrap()).unwrap();
    assert_eq!(back, record);
}

#[test]
fn derived_temporal_columns_declare_fractions() {
    let spans = CreateTable::for_model::<SimpleTableWithTimeSpan>()
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(
        spans.command,
        "CREATE TABLE `simple_timespan`(\n`Value` TIME(6)\n)"
    );

    let times = CreateTable::for_model::<SimpleTableWithTimeOnly>()
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(
        times.command,
        "CREATE TABLE `simple_timeonly`(\n`Value` TIME(3)\n)"
    );
}

#[test]
fn derived_update_keeps_last_assignment() {
    let text = Update::<ExtendedTable>::create()
        .unwrap()
        .set("Name", "First")
        .unwrap()
        .set("Name", "Second")
        .unwrap()
        .format()
        .unwrap();
    assert_eq!(text.command, "UPDATE `Extended` SET `Name` = 'Second'");
}
