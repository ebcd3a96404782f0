use std::future::{ready, Ready};

use actix_web::{dev::Payload, error::InternalError, web, FromRequest, HttpRequest, HttpResponse};

use crate::{config::DEFAULT_PARTICIPANT_HEADER, models::Message, AppData};

/// Identifier of the participant making the request.
///
/// Authentication happens upstream; whatever sits in the participant header is
/// taken as an opaque, already verified id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant(pub String);

impl Participant {
    pub fn id(&self) -> &str {
        &self.0
    }
}

fn participant_from_request(req: &HttpRequest) -> Option<Participant> {
    let header = req
        .app_data::<web::Data<AppData>>()
        .map(|data| data.config.participant_header.as_str())
        .unwrap_or(DEFAULT_PARTICIPANT_HEADER);
    req.headers()
        .get(header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Participant(id.to_string()))
}

impl FromRequest for Participant {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(participant_from_request(req).ok_or_else(|| {
            InternalError::from_response(
                "missing participant identifier",
                HttpResponse::Unauthorized().json(Message("missing participant identifier")),
            )
            .into()
        }))
    }
}
