use serde::{Deserialize, Serialize};

use crate::data_models::{InputRecord, OutputRecord};

/// Inbound skill payload. Both the array and its elements may be `null`.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct WebApiRequest {
    pub values: Option<Vec<Option<InputRecord>>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WebApiResponse {
    pub values: Vec<OutputRecord>,
}
