use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire string for `$not` (argument is a single sub-selector).
pub const NOT: &str = "$not";
/// Wire string for `$all` (argument is an array of values).
pub const ALL: &str = "$all";
/// Wire string for `$elemMatch` (argument is a sub-selector).
pub const ELEM_MATCH: &str = "$elemMatch";
/// Wire string for `$allMatch` (argument is a sub-selector).
pub const ALL_MATCH: &str = "$allMatch";

/// Error for a string that is not part of the Mango operator vocabulary.
#[derive(Debug, thiserror::Error)]
#[error("unknown Mango operator: {0:?}")]
pub struct UnknownOperator(pub String);

/// Combination operators. Each takes an array of sub-selectors and matches
/// according to boolean semantics over the array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CombinationOperator {
    /// Matches if all selectors in the array match.
    #[serde(rename = "$and")]
    And,
    /// Matches if any selector in the array matches.
    #[serde(rename = "$or")]
    Or,
    /// Matches if none of the selectors in the array match.
    #[serde(rename = "$nor")]
    Nor,
}

impl CombinationOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationOperator::And => "$and",
            CombinationOperator::Or => "$or",
            CombinationOperator::Nor => "$nor",
        }
    }
}

impl fmt::Display for CombinationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinationOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$and" => Ok(CombinationOperator::And),
            "$or" => Ok(CombinationOperator::Or),
            "$nor" => Ok(CombinationOperator::Nor),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Condition operators applied to a single document field. The argument type
/// varies per operator (any JSON for `$eq`/`$lt`/..., an array for `$in`,
/// `[divisor, remainder]` for `$mod`, and so on); arguments are not validated
/// client-side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne")]
    Ne,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$gt")]
    Gt,
    /// Whether the field exists, regardless of value.
    #[serde(rename = "$exists")]
    Exists,
    /// JSON type check: "null", "boolean", "number", "string", "array", "object".
    #[serde(rename = "$type")]
    Type,
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$nin")]
    Nin,
    /// Array length match; non-array fields never match.
    #[serde(rename = "$size")]
    Size,
    /// `field % divisor == remainder`, integer fields only.
    #[serde(rename = "$mod")]
    Mod,
    /// PCRE pattern over string fields.
    #[serde(rename = "$regex")]
    Regex,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Lt => "$lt",
            ComparisonOperator::Lte => "$lte",
            ComparisonOperator::Eq => "$eq",
            ComparisonOperator::Ne => "$ne",
            ComparisonOperator::Gte => "$gte",
            ComparisonOperator::Gt => "$gt",
            ComparisonOperator::Exists => "$exists",
            ComparisonOperator::Type => "$type",
            ComparisonOperator::In => "$in",
            ComparisonOperator::Nin => "$nin",
            ComparisonOperator::Size => "$size",
            ComparisonOperator::Mod => "$mod",
            ComparisonOperator::Regex => "$regex",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$lt" => Ok(ComparisonOperator::Lt),
            "$lte" => Ok(ComparisonOperator::Lte),
            "$eq" => Ok(ComparisonOperator::Eq),
            "$ne" => Ok(ComparisonOperator::Ne),
            "$gte" => Ok(ComparisonOperator::Gte),
            "$gt" => Ok(ComparisonOperator::Gt),
            "$exists" => Ok(ComparisonOperator::Exists),
            "$type" => Ok(ComparisonOperator::Type),
            "$in" => Ok(ComparisonOperator::In),
            "$nin" => Ok(ComparisonOperator::Nin),
            "$size" => Ok(ComparisonOperator::Size),
            "$mod" => Ok(ComparisonOperator::Mod),
            "$regex" => Ok(ComparisonOperator::Regex),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Sort direction tokens used in the `sort` array of a find request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}
