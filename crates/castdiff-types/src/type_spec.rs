//! Type identities and their per-dialect spellings.

use std::fmt;

use crate::interface::System;

/// Every type the catalog knows how to generate values for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Varchar,
    Char,
    Binary,
    Boolean,
    Timestamp,
    Date,
    /// `MAP<STRING, DOUBLE>`
    StringDoubleMap,
    /// `MAP<INT, MAP<STRING, DOUBLE>>`
    NestedMap,
    /// `ARRAY<ARRAY<DOUBLE>>`
    NestedArray,
    /// Two-level named struct.
    Struct,
    /// Hive tagged union.
    Union,
}

impl TypeTag {
    /// Catalog order of the default scope. Row ids follow this order.
    pub const STANDARD: [Self; 17] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::String,
        Self::Varchar,
        Self::Char,
        Self::Binary,
        Self::Boolean,
        Self::Timestamp,
        Self::Date,
        Self::StringDoubleMap,
        Self::NestedMap,
        Self::NestedArray,
    ];

    /// Types only generated in the extended scope, appended after
    /// [`Self::STANDARD`].
    pub const EXTENDED_ONLY: [Self; 2] = [Self::Struct, Self::Union];

    /// Spark SQL spelling without parameters.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Long => "LONG",
            _ => self.shared_name(),
        }
    }

    /// Hive spelling without parameters.
    #[must_use]
    pub const fn hql_name(self) -> &'static str {
        match self {
            Self::Byte => "TINYINT",
            Self::Short => "SMALLINT",
            Self::Long => "BIGINT",
            _ => self.shared_name(),
        }
    }

    const fn shared_name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::String => "STRING",
            Self::Varchar => "VARCHAR",
            Self::Char => "CHAR",
            Self::Binary => "BINARY",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::StringDoubleMap => "MAP<STRING, DOUBLE>",
            Self::NestedMap => "MAP<INT, MAP<STRING, DOUBLE>>",
            Self::NestedArray => "ARRAY<ARRAY<DOUBLE>>",
            Self::Struct => "STRUCT<f1: STRUCT<f11: STRING, f12: DOUBLE>, f2: BOOLEAN>",
            Self::Union => "UNIONTYPE<INT, MAP<STRING, DOUBLE>, ARRAY<ARRAY<DOUBLE>>, TIMESTAMP>",
        }
    }

    /// Parameters of the one representative instantiation the catalog uses.
    #[must_use]
    pub const fn representative_params(self) -> &'static [u32] {
        match self {
            Self::Decimal => &[20, 10],
            Self::Varchar => &[10],
            Self::Char => &[5],
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Timestamp | Self::Date)
    }

    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            Self::StringDoubleMap | Self::NestedMap | Self::NestedArray | Self::Struct | Self::Union
        )
    }
}

/// A type name plus its ordered parameter list.
///
/// Identity is (tag, params): `DECIMAL(20,10)` and `DECIMAL(10,2)` are
/// different specs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TypeSpec {
    pub tag: TypeTag,
    pub params: Vec<u32>,
}

impl TypeSpec {
    #[must_use]
    pub fn new(tag: TypeTag, params: &[u32]) -> Self {
        Self {
            tag,
            params: params.to_vec(),
        }
    }

    /// The instantiation the catalog generates for `tag`.
    #[must_use]
    pub fn representative(tag: TypeTag) -> Self {
        Self::new(tag, tag.representative_params())
    }

    /// Parameter at `idx`, if present.
    #[must_use]
    pub fn param(&self, idx: usize) -> Option<u32> {
        self.params.get(idx).copied()
    }

    /// Column type as written in DDL for `system`.
    #[must_use]
    pub fn render(&self, system: System) -> String {
        let name = match system {
            System::Spark => self.tag.sql_name(),
            System::Hive => self.tag.hql_name(),
        };
        format!("{name}{}", self.param_suffix())
    }

    /// Spark `DataType` expression used in a `StructField`, if Spark has one.
    #[must_use]
    pub fn spark_type(&self) -> Option<String> {
        let base = match self.tag {
            TypeTag::Byte => "ByteType",
            TypeTag::Short => "ShortType",
            TypeTag::Int => "IntegerType",
            TypeTag::Long => "LongType",
            TypeTag::Float => "FloatType",
            TypeTag::Double => "DoubleType",
            TypeTag::Decimal => "DecimalType",
            TypeTag::String => "StringType",
            TypeTag::Varchar => "VarcharType",
            TypeTag::Char => "CharType",
            TypeTag::Binary => "BinaryType",
            TypeTag::Boolean => "BooleanType",
            TypeTag::Timestamp => "TimestampType",
            TypeTag::Date => "DateType",
            TypeTag::StringDoubleMap => "MapType(StringType, DoubleType)",
            TypeTag::NestedMap => "MapType(IntegerType, MapType(StringType, DoubleType))",
            TypeTag::NestedArray => "ArrayType(ArrayType(DoubleType))",
            TypeTag::Struct => {
                "StructType(Seq(StructField(\"f1\", StructType(Seq(\
                 StructField(\"f11\", StringType), StructField(\"f12\", DoubleType)))), \
                 StructField(\"f2\", BooleanType)))"
            }
            TypeTag::Union => return None,
        };
        Some(format!("{base}{}", self.param_suffix()))
    }

    fn param_suffix(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = self.params.iter().map(u32::to_string).collect();
        format!("({})", joined.join(","))
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(System::Spark))
    }
}
