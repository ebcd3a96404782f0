use actix_web::{
    web::{self, ServiceConfig},
    HttpResponse,
};
use uuid::Uuid;

use crate::{error::PollError, identity::Participant, models::SelectionMode, AppData};

// Ballot routes always act on the requesting participant's own ballot, except
// for the read-only listing of a poll's ballots.

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BallotPutRequestData {
    selections: Vec<String>,
    mode: Option<SelectionMode>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TogglePostRequestData {
    candidate: String,
    mode: Option<SelectionMode>,
}

async fn get_ballots(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let ballots = app_data
        .engine
        .ballots_for_poll(path_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ballots))
}

async fn get_own_ballot(
    app_data: web::Data<AppData>,
    participant: Participant,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let ballot = app_data
        .engine
        .get_ballot(path_id.into_inner(), participant.id())
        .await?;
    Ok(HttpResponse::Ok().json(ballot))
}

async fn put_own_ballot(
    app_data: web::Data<AppData>,
    participant: Participant,
    path_id: web::Path<Uuid>,
    ballot: web::Json<BallotPutRequestData>,
) -> Result<HttpResponse, PollError> {
    let request_data = ballot.into_inner();
    let mode = request_data
        .mode
        .unwrap_or(app_data.config.default_selection_mode);
    let ballot = app_data
        .engine
        .cast_ballot(
            path_id.into_inner(),
            participant.id(),
            &request_data.selections,
            mode,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ballot))
}

async fn delete_own_ballot(
    app_data: web::Data<AppData>,
    participant: Participant,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let ballot = app_data
        .engine
        .withdraw_ballot(path_id.into_inner(), participant.id())
        .await?;
    Ok(HttpResponse::Ok().json(ballot))
}

async fn post_toggle(
    app_data: web::Data<AppData>,
    participant: Participant,
    path_id: web::Path<Uuid>,
    toggle: web::Json<TogglePostRequestData>,
) -> Result<HttpResponse, PollError> {
    let request_data = toggle.into_inner();
    let mode = request_data
        .mode
        .unwrap_or(app_data.config.default_selection_mode);
    let ballot = app_data
        .engine
        .toggle_selection(
            path_id.into_inner(),
            participant.id(),
            &request_data.candidate,
            mode,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ballot))
}

async fn get_my_ballots(
    app_data: web::Data<AppData>,
    participant: Participant,
) -> Result<HttpResponse, PollError> {
    let ballots = app_data
        .engine
        .ballots_for_participant(participant.id())
        .await?;
    Ok(HttpResponse::Ok().json(ballots))
}

pub fn configure_poll_routes(config: &mut ServiceConfig) {
    config.route("/{id}/ballots", web::get().to(get_ballots));
    config.route("/{id}/ballot", web::get().to(get_own_ballot));
    config.route("/{id}/ballot", web::put().to(put_own_ballot));
    config.route("/{id}/ballot", web::delete().to(delete_own_ballot));
    config.route("/{id}/ballot/toggle", web::post().to(post_toggle));
}

pub fn configure_participant_routes(config: &mut ServiceConfig) {
    config.route("/me/ballots", web::get().to(get_my_ballots));
}
