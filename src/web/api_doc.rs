use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::error::ErrorResponse;
use super::api::reentries::{ReentriesQuery, ReentriesResponse, RefreshResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::reentries::list_reentries,
        super::api::reentries::summary,
        super::api::reentries::sources,
        super::api::reentries::refresh,
    ),
    components(
        schemas(
            ReentriesResponse,
            ReentriesQuery,
            RefreshResponse,
            ErrorResponse,
            crate::fusion::Candidate,
            crate::fusion::OfficialPrediction,
            crate::fusion::Summary,
            crate::fusion::AltitudeStats,
            crate::fusion::SourcePriority,
            crate::decay::DecayEstimate,
            crate::decay::RegionProximity,
            crate::decay::ObjectType,
            crate::decay::RiskLevel,
            crate::decay::DataOrigin,
            crate::collector::AdapterStatus,
            crate::collector::AdapterState,
            crate::collector::RecordCounts,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Reentry Watch API",
        description = "Predicted atmospheric reentries of tracked space objects",
        version = "0.1.0"
    ),
    tags(
        (name = "reentries", description = "Reentry candidates and source status")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
