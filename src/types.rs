use serde::{Deserialize, Serialize};
use std::fmt;

/// Response from the zipcloud search API
#[derive(Debug, Clone, Deserialize)]
pub struct ZipcloudResponse {
    pub status: i32,
    #[serde(default)]
    pub message: Option<String>,
    /// Null (not an empty array) when nothing matched
    #[serde(default)]
    pub results: Option<Vec<ZipcloudEntry>>,
}

/// Individual address entry in the response
#[derive(Debug, Clone, Deserialize)]
pub struct ZipcloudEntry {
    pub zipcode: String,
    #[serde(default)]
    pub prefcode: Option<String>,
    /// Prefecture (都道府県)
    pub address1: String,
    /// City (市区町村)
    pub address2: String,
    /// Town (町域)
    pub address3: String,
    #[serde(default)]
    pub kana1: Option<String>,
    #[serde(default)]
    pub kana2: Option<String>,
    #[serde(default)]
    pub kana3: Option<String>,
}

/// Structured address resolved from a postal code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub prefecture: String,
    pub city: String,
    pub town: String,
}

impl Address {
    pub fn from_entry(entry: &ZipcloudEntry) -> Self {
        Self {
            prefecture: entry.address1.clone(),
            city: entry.address2.clone(),
            town: entry.address3.clone(),
        }
    }

    /// Concatenated prefecture + city + town
    pub fn full_address(&self) -> String {
        format!("{}{}{}", self.prefecture, self.city, self.town)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefecture, self.city, self.town)
    }
}
