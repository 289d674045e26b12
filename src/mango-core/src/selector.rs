use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::operators::{self, CombinationOperator, ComparisonOperator};

/// A Mango selector: a boolean/comparison expression tree over document
/// fields. Keys starting with `$` are operators; all other keys are document
/// field paths.
///
/// Serializes to exactly the untyped JSON shape CouchDB expects, so a typed
/// tree and a hand-written `serde_json::json!` selector are interchangeable
/// on the wire. No validation happens client-side; a semantically invalid
/// selector is only rejected by the server.
///
/// # Example
///
/// ```rust,ignore
/// use mango_core::Selector;
///
/// let selector = Selector::and([
///     Selector::eq("status", "active"),
///     Selector::gte("age", 18),
/// ]);
/// // Produces: {"$and": [{"status": "active"}, {"age": {"$gte": 18}}]}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Implicit equality: `{"field": value}`.
    Equals { field: String, value: Value },
    /// Single comparison condition: `{"field": {"$op": value}}`.
    Compare {
        field: String,
        op: ComparisonOperator,
        value: Value,
    },
    /// `$and` / `$or` / `$nor` over an array of sub-selectors.
    Combination {
        op: CombinationOperator,
        selectors: Vec<Selector>,
    },
    /// `{"$not": {...}}` — matches when the inner selector does not.
    Not(Box<Selector>),
    /// `{"field": {"$all": [...]}}` — array field contains every value.
    AllOf { field: String, values: Vec<Value> },
    /// `{"field": {"$elemMatch": {...}}}` — some array element matches.
    ElemMatch {
        field: String,
        selector: Box<Selector>,
    },
    /// `{"field": {"$allMatch": {...}}}` — every array element matches.
    AllMatch {
        field: String,
        selector: Box<Selector>,
    },
    /// Conditions on a subfield: `{"field": {...inner selector...}}`.
    Nested {
        field: String,
        selector: Box<Selector>,
    },
    /// Sibling entries merged into one JSON object, e.g. conditions on
    /// several fields at the same level. Every member must serialize to an
    /// object; the empty merge is the match-all selector `{}`.
    Merge(Vec<Selector>),
    /// Arbitrary JSON passed through verbatim.
    Raw(Value),
}

impl Default for Selector {
    /// The match-all selector `{}`.
    fn default() -> Self {
        Selector::Merge(Vec::new())
    }
}

impl Selector {
    /// Implicit equality condition (`{"field": value}`).
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Selector::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Condition with an explicit comparison operator.
    pub fn compare(
        field: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        Selector::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Not-equal condition.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Ne, value)
    }

    /// Greater-than condition.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Gt, value)
    }

    /// Greater-than-or-equal condition.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Gte, value)
    }

    /// Less-than condition.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Lt, value)
    }

    /// Less-than-or-equal condition.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOperator::Lte, value)
    }

    /// Membership condition (`$in`).
    pub fn in_(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self::compare(
            field,
            ComparisonOperator::In,
            Value::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Non-membership condition (`$nin`).
    pub fn nin(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self::compare(
            field,
            ComparisonOperator::Nin,
            Value::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Field-existence condition.
    pub fn exists(field: impl Into<String>, exists: bool) -> Self {
        Self::compare(field, ComparisonOperator::Exists, exists)
    }

    /// JSON type check condition.
    pub fn type_is(field: impl Into<String>, json_type: &str) -> Self {
        Self::compare(field, ComparisonOperator::Type, json_type)
    }

    /// Array length condition.
    pub fn size(field: impl Into<String>, size: u64) -> Self {
        Self::compare(field, ComparisonOperator::Size, size)
    }

    /// Modulo condition (`field % divisor == remainder`).
    pub fn modulo(field: impl Into<String>, divisor: i64, remainder: i64) -> Self {
        Self::compare(
            field,
            ComparisonOperator::Mod,
            Value::Array(vec![divisor.into(), remainder.into()]),
        )
    }

    /// PCRE regex condition over a string field.
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(field, ComparisonOperator::Regex, pattern.into())
    }

    /// Conjunction (`$and`) over sub-selectors.
    pub fn and(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Combination {
            op: CombinationOperator::And,
            selectors: selectors.into_iter().collect(),
        }
    }

    /// Disjunction (`$or`) over sub-selectors.
    pub fn or(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Combination {
            op: CombinationOperator::Or,
            selectors: selectors.into_iter().collect(),
        }
    }

    /// Joint negation (`$nor`) over sub-selectors.
    pub fn nor(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Combination {
            op: CombinationOperator::Nor,
            selectors: selectors.into_iter().collect(),
        }
    }

    /// Negation (`$not`) of a sub-selector.
    pub fn not(selector: Selector) -> Self {
        Selector::Not(Box::new(selector))
    }

    /// Array-contains-all condition (`$all`).
    pub fn all(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Selector::AllOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `$elemMatch` condition over an array field.
    pub fn elem_match(field: impl Into<String>, selector: Selector) -> Self {
        Selector::ElemMatch {
            field: field.into(),
            selector: Box::new(selector),
        }
    }

    /// `$allMatch` condition over an array field.
    pub fn all_match(field: impl Into<String>, selector: Selector) -> Self {
        Selector::AllMatch {
            field: field.into(),
            selector: Box::new(selector),
        }
    }

    /// Conditions on a subfield object.
    pub fn nested(field: impl Into<String>, selector: Selector) -> Self {
        Selector::Nested {
            field: field.into(),
            selector: Box::new(selector),
        }
    }

    /// Sibling conditions merged into one object.
    pub fn merge(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Merge(selectors.into_iter().collect())
    }

    /// Arbitrary JSON selector, passed through verbatim.
    pub fn raw(value: Value) -> Self {
        Selector::Raw(value)
    }

    /// The wire representation: the exact untyped JSON object CouchDB sees.
    pub fn to_value(&self) -> Value {
        match self {
            Selector::Equals { field, value } => object(field, value.clone()),
            Selector::Compare { field, op, value } => {
                object(field, object(op.as_str(), value.clone()))
            }
            Selector::Combination { op, selectors } => object(
                op.as_str(),
                Value::Array(selectors.iter().map(Selector::to_value).collect()),
            ),
            Selector::Not(selector) => object(operators::NOT, selector.to_value()),
            Selector::AllOf { field, values } => {
                object(field, object(operators::ALL, Value::Array(values.clone())))
            }
            Selector::ElemMatch { field, selector } => {
                object(field, object(operators::ELEM_MATCH, selector.to_value()))
            }
            Selector::AllMatch { field, selector } => {
                object(field, object(operators::ALL_MATCH, selector.to_value()))
            }
            Selector::Nested { field, selector } => object(field, selector.to_value()),
            Selector::Merge(selectors) => {
                let mut merged = Map::new();
                for selector in selectors {
                    if let Value::Object(entries) = selector.to_value() {
                        merged.extend(entries);
                    }
                }
                Value::Object(merged)
            }
            Selector::Raw(value) => value.clone(),
        }
    }

    /// Parse the untyped wire shape back into a typed tree. Total: anything
    /// that is not a recognized operator shape lands in `Raw` (or `Equals`
    /// for a plain field/value pair), preserving the bytes either way.
    pub fn from_value(value: &Value) -> Self {
        let entries = match value {
            Value::Object(entries) if !entries.is_empty() => entries,
            Value::Object(_) => return Selector::Merge(Vec::new()),
            other => return Selector::Raw(other.clone()),
        };

        if entries.len() > 1 {
            let members = entries
                .iter()
                .map(|(key, val)| {
                    let mut single = Map::new();
                    single.insert(key.clone(), val.clone());
                    Selector::from_value(&Value::Object(single))
                })
                .collect();
            return Selector::Merge(members);
        }

        let (key, val) = entries.iter().next().unwrap();
        if let Ok(op) = key.parse::<CombinationOperator>() {
            if let Value::Array(items) = val {
                return Selector::Combination {
                    op,
                    selectors: items.iter().map(Selector::from_value).collect(),
                };
            }
            return Selector::Raw(value.clone());
        }
        if key == operators::NOT {
            return Selector::Not(Box::new(Selector::from_value(val)));
        }
        if key.starts_with('$') {
            // An operator we have no structural reading for at this level.
            return Selector::Raw(value.clone());
        }
        Self::parse_condition(key, val)
    }

    /// Parse the value side of a `{"field": ...}` entry.
    fn parse_condition(field: &str, val: &Value) -> Self {
        let inner = match val {
            Value::Object(inner) if !inner.is_empty() => inner,
            _ => {
                return Selector::Equals {
                    field: field.to_string(),
                    value: val.clone(),
                }
            }
        };

        if inner.len() == 1 {
            let (key, arg) = inner.iter().next().unwrap();
            if let Ok(op) = key.parse::<ComparisonOperator>() {
                return Selector::Compare {
                    field: field.to_string(),
                    op,
                    value: arg.clone(),
                };
            }
            if key == operators::ALL {
                if let Value::Array(values) = arg {
                    return Selector::AllOf {
                        field: field.to_string(),
                        values: values.clone(),
                    };
                }
            }
            if key == operators::ELEM_MATCH {
                return Selector::ElemMatch {
                    field: field.to_string(),
                    selector: Box::new(Selector::from_value(arg)),
                };
            }
            if key == operators::ALL_MATCH {
                return Selector::AllMatch {
                    field: field.to_string(),
                    selector: Box::new(Selector::from_value(arg)),
                };
            }
        }

        Selector::Nested {
            field: field.to_string(),
            selector: Box::new(Selector::from_value(val)),
        }
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Selector::from_value(&value))
    }
}

fn object(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_is_implicit_equality() {
        let selector = Selector::eq("status", "active");
        assert_eq!(selector.to_value(), json!({"status": "active"}));
    }

    #[test]
    fn test_comparison_shapes() {
        assert_eq!(
            Selector::gte("age", 18).to_value(),
            json!({"age": {"$gte": 18}})
        );
        assert_eq!(
            Selector::in_("status", ["active", "pending"]).to_value(),
            json!({"status": {"$in": ["active", "pending"]}})
        );
        assert_eq!(
            Selector::regex("email", r"@example\.com$").to_value(),
            json!({"email": {"$regex": r"@example\.com$"}})
        );
        assert_eq!(
            Selector::modulo("count", 3, 1).to_value(),
            json!({"count": {"$mod": [3, 1]}})
        );
        assert_eq!(
            Selector::exists("deleted", false).to_value(),
            json!({"deleted": {"$exists": false}})
        );
    }

    #[test]
    fn test_combination_and_not() {
        let selector = Selector::or([
            Selector::eq("status", "active"),
            Selector::eq("priority", "high"),
        ]);
        assert_eq!(
            selector.to_value(),
            json!({"$or": [{"status": "active"}, {"priority": "high"}]})
        );

        let negated = Selector::not(Selector::eq("archived", true));
        assert_eq!(negated.to_value(), json!({"$not": {"archived": true}}));
    }

    #[test]
    fn test_array_matchers() {
        assert_eq!(
            Selector::all("genres", ["noir", "thriller"]).to_value(),
            json!({"genres": {"$all": ["noir", "thriller"]}})
        );
        let elem = Selector::elem_match("cast", Selector::eq("name", "Ruth"));
        assert_eq!(
            elem.to_value(),
            json!({"cast": {"$elemMatch": {"name": "Ruth"}}})
        );
    }

    #[test]
    fn test_nested_and_merge_match_original_fixture() {
        // Nested-attribute fixture from the original client's test suite,
        // including non-ASCII values.
        let selector = Selector::merge([
            Selector::and([Selector::nested(
                "Attribute",
                Selector::compare("Name", ComparisonOperator::Eq, "董华凌（受体）"),
            )]),
            Selector::nested(
                "Attribute",
                Selector::merge([
                    Selector::eq("UserKey", "003a09f3"),
                    Selector::eq("Age", "51"),
                    Selector::compare("InvitationCode", ComparisonOperator::Eq, "8M2F84K"),
                ]),
            ),
            Selector::eq("_id", "003a09f3"),
        ]);
        let value = selector.to_value();
        assert_eq!(
            value,
            json!({
                "$and": [{"Attribute": {"Name": {"$eq": "董华凌（受体）"}}}],
                "Attribute": {
                    "UserKey": "003a09f3",
                    "Age": "51",
                    "InvitationCode": {"$eq": "8M2F84K"}
                },
                "_id": "003a09f3"
            })
        );
    }

    #[test]
    fn test_default_is_match_all() {
        assert_eq!(Selector::default().to_value(), json!({}));
    }

    #[test]
    fn test_from_value_recovers_typed_tree() {
        let wire = json!({
            "$and": [
                {"year": {"$gte": 1900}},
                {"director": "Lars von Trier"},
                {"genres": {"$all": ["noir"]}},
                {"cast": {"$elemMatch": {"name": {"$eq": "Ruth"}}}}
            ]
        });
        let parsed = Selector::from_value(&wire);
        let expected = Selector::and([
            Selector::gte("year", 1900),
            Selector::eq("director", "Lars von Trier"),
            Selector::all("genres", ["noir"]),
            Selector::elem_match("cast", Selector::compare("name", ComparisonOperator::Eq, "Ruth")),
        ]);
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_value(), wire);
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let selectors = [
            Selector::eq("name", "Alice"),
            Selector::gte("age", 18),
            Selector::not(Selector::eq("archived", true)),
            Selector::nor([Selector::eq("a", 1), Selector::eq("b", 2)]),
            Selector::nested("Attribute", Selector::eq("UserKey", "k")),
            Selector::all_match("tags", Selector::type_is("genre", "string")),
            Selector::default(),
        ];
        for selector in selectors {
            let wire = serde_json::to_value(&selector).unwrap();
            let back: Selector = serde_json::from_value(wire.clone()).unwrap();
            assert_eq!(back.to_value(), wire);
        }
    }

    #[test]
    fn test_unrecognized_shapes_fall_back_to_raw() {
        // Multiple conditions on one field: preserved byte-for-byte even
        // though the tree has no dedicated variant for it.
        let wire = json!({"age": {"$gte": 18, "$lt": 65}});
        let parsed = Selector::from_value(&wire);
        assert_eq!(parsed.to_value(), wire);

        let bare_op = json!({"$text": "unsupported"});
        assert_eq!(Selector::from_value(&bare_op).to_value(), bare_op);
    }
}
