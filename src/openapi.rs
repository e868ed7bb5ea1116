use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{PlanningExportRequest, ValidateSlotRequest};
use crate::models::{
    AvailabilityWindow, Conflict, ConflictResult, GroupLesson, Instructor, Room, Severity,
    TimeSlot,
};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::validate_slot,
        crate::handlers::export_planning
    ),
    components(schemas(
        TimeSlot,
        GroupLesson,
        Room,
        Instructor,
        AvailabilityWindow,
        Severity,
        Conflict,
        ConflictResult,
        ValidateSlotRequest,
        PlanningExportRequest
    )),
    tags(
        (name = "scheduling", description = "Lesson slot validation and planning export")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
