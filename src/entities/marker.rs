use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

pub const CURRENT_LOCATION_TITLE: &str = "You are here";
pub const SEARCH_RESULT_TITLE: &str = "Search result";
pub const ADDRESS_NOT_FOUND: &str = "address not found";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Coordinates,
    pub title: String,
}

impl Marker {
    pub fn new(position: Coordinates, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
        }
    }
}
