use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search hit. The shape belongs to the backend; it is passed through untouched.
pub type SearchRecord = Value;
pub type SearchResultSet = Vec<SearchRecord>;

/// Field holding the list when `/suggestions` answers with a wrapper object.
pub const SUGGESTIONS_FIELD: &str = "suggestions";
/// Field holding the list when `/search` answers with a wrapper object.
pub const SEARCH_FIELD: &str = "spots";
pub const TAGS_FIELD: &str = "tags";

/// Accepts either a bare JSON array or an object carrying the array under
/// `field`. Anything else (null, missing field, scalar) is an empty list.
pub fn normalize_list<T: DeserializeOwned>(
    value: Value,
    field: &str,
) -> Result<Vec<T>, serde_json::Error> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items.into_iter().map(serde_json::from_value).collect()
}

/// Like [`normalize_list`] but only a bare array counts; anything else is empty.
pub fn bare_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub posts: u64,
    #[serde(default)]
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTag {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    #[serde(rename = "chatInput")]
    pub chat_input: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
}
