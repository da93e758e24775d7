//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "accesso",
        description = "Credential authentication service",
    ),
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::user_register::UserRegister,
        handlers::user_register::RegisteredUser,
        handlers::user_login::UserLogin,
        handlers::user_login::Identity,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "register", description = "User registration"),
        (name = "login", description = "Credential verification"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/user/register"));
        assert!(doc.paths.paths.contains_key("/user/login"));
    }
}
