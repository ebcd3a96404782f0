use actix_web::{
    web::{self, ServiceConfig},
    HttpRequest, HttpResponse, Scope,
};

macro_rules! unwrap_or_log_and_internal_server_error_response {
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::error!("{}", e);
                // Message is public to the whole crate, so prepending it with "crate::models::"
                // should not be required
                return HttpResponse::InternalServerError().json(Message($message));
            }
        }
    };
}

pub mod ballot;
pub mod poll;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiIndexResponseData {
    polls: String,
    my_ballots: String,
}

pub async fn get_api_index(request: HttpRequest) -> HttpResponse {
    let connection_info = request.connection_info();
    let base_url = format!("{}://{}", connection_info.scheme(), connection_info.host());
    HttpResponse::Ok().json(ApiIndexResponseData {
        polls: format!("{}/polls", base_url),
        my_ballots: format!("{}/participants/me/ballots", base_url),
    })
}

/// Registers every route of the API. Middleware is left to the caller.
pub fn configure_api(config: &mut ServiceConfig) {
    config.route("/", web::get().to(get_api_index));
    config.service(
        Scope::new("/polls")
            .configure(poll::configure_routes)
            .configure(ballot::configure_poll_routes),
    );
    config.service(Scope::new("/participants").configure(ballot::configure_participant_routes));
}
