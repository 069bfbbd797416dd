use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PVZ Operations API",
        version = "0.1.0",
        description = "Pickup-point operations: moderators register pickup points; \
employees open receptions, record products (with strict last-in-first-out removal) \
and close receptions. A paginated report lists in-progress receptions within a \
date window. All endpoints require a bearer token."
    ),
    paths(
        crate::handlers::auth::dummy_login,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::pvz::create_pvz,
        crate::handlers::pvz::list_pvz,
        crate::handlers::pvz::close_last_reception,
        crate::handlers::pvz::delete_last_product,
        crate::handlers::receptions::create_reception,
        crate::handlers::products::create_product,
    ),
    components(schemas(
        crate::auth::TokenResponse,
        crate::handlers::auth::RegisterRequest,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::DummyLoginRequest,
        crate::handlers::pvz::CreatePvzRequest,
        crate::handlers::pvz::RemoveLastProductResponse,
        crate::handlers::receptions::CreateReceptionRequest,
        crate::handlers::products::CreateProductRequest,
        crate::entities::pickup_point::Model,
        crate::entities::reception::Model,
        crate::entities::product::Model,
        crate::entities::City,
        crate::entities::ProductType,
        crate::entities::ReceptionStatus,
        crate::entities::Role,
        crate::services::listing::PickupPointGroup,
        crate::services::listing::ReceptionProductPair,
        crate::errors::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "pvz", description = "Pickup point registration and reporting"),
        (name = "receptions", description = "Reception lifecycle"),
        (name = "products", description = "Product intake")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("PVZ Operations API"));
        assert!(json.contains("/pvz"));
        assert!(json.contains("bearer_auth"));
    }
}
