//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page selection (`?pagina=N`).
///
/// Kept as a raw string so malformed values surface as "Página inválida."
/// rather than a generic query rejection. Combine with a resource filter
/// struct as a second `Query` extractor.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub pagina: Option<String>,
}

/// Account kind selector for `POST /cadastre-se/?usuario=`.
#[derive(Debug, Deserialize)]
pub struct AccountKindParams {
    pub usuario: Option<String>,
}
