use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters shared by the newest-first list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Maximum number of records to return (1..=100, default 50)
    pub(crate) limit: Option<u64>,
}
