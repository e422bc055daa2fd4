use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a company. The data files use either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyId {
    Number(u64),
    Text(String),
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanyId::Number(n) => write!(f, "{n}"),
            CompanyId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: String,
    pub location: String,
    pub employees: u64,
    pub website: String,
}

/// Addressable fields of a company, used as column keys and sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Name,
    Industry,
    Location,
    Employees,
    Website,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Id(&'a CompanyId),
    Text(&'a str),
    Count(u64),
}

impl FieldValue<'_> {
    /// Text is compared case-insensitively, everything else by its natural order.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (FieldValue::Count(a), FieldValue::Count(b)) => a.cmp(b),
            (FieldValue::Id(a), FieldValue::Id(b)) => a.cmp(b),
            // Values of one field always share a variant
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(id) => write!(f, "{id}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Count(n) => write!(f, "{n}"),
        }
    }
}

impl Company {
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Id => FieldValue::Id(&self.id),
            Field::Name => FieldValue::Text(&self.name),
            Field::Industry => FieldValue::Text(&self.industry),
            Field::Location => FieldValue::Text(&self.location),
            Field::Employees => FieldValue::Count(self.employees),
            Field::Website => FieldValue::Text(&self.website),
        }
    }

    /// Lowercased text the search box is matched against.
    pub fn search_haystack(&self) -> String {
        [
            self.name.as_str(),
            self.industry.as_str(),
            self.location.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}
