mod score;
mod select;

use serde::{Deserialize, Serialize};

pub use score::{
    EXACT_MATCH, LABEL_CONTAINS, LABEL_TOKEN_CONTAINS, LABEL_TOKEN_EXACT, NO_MATCH, TYPE_CONTAINS,
    score,
};
pub use select::{Selection, group_by_type, select};

/// One entry of the results panel, shown next to the graph canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
