use actix_web::{
    web::{self, ServiceConfig},
    HttpResponse,
};
use anyhow::Result;
use plotters::prelude::*;
use uuid::Uuid;

use crate::{
    error::PollError,
    identity::Participant,
    models::{Message, Tally},
    AppData,
};

async fn get_polls(app_data: web::Data<AppData>) -> Result<HttpResponse, PollError> {
    let polls = app_data.engine.list_polls().await?;
    Ok(HttpResponse::Ok().json(polls))
}

async fn get_poll(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let poll = app_data.engine.get_poll(path_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(poll))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollPostRequestData {
    title: String,
    description: Option<String>,
    candidates: Vec<String>,
}

async fn post_poll(
    app_data: web::Data<AppData>,
    participant: Participant,
    poll: web::Json<PollPostRequestData>,
) -> Result<HttpResponse, PollError> {
    let request_data = poll.into_inner();
    let poll = app_data
        .engine
        .create_poll(
            &request_data.title,
            request_data.description.as_deref(),
            &request_data.candidates,
            participant.id(),
        )
        .await?;
    Ok(HttpResponse::Created().json(poll))
}

async fn delete_poll(
    app_data: web::Data<AppData>,
    participant: Participant,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    app_data
        .engine
        .delete_poll(path_id.into_inner(), participant.id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn get_poll_tally(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let tally = app_data.engine.compute_tally(path_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tally))
}

async fn get_poll_winners(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let winners = app_data.engine.winners(path_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(winners))
}

async fn get_poll_standings(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let standings = app_data.engine.standings(path_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(standings))
}

const COLORS: &[&RGBColor] = &[&BLUE, &CYAN, &MAGENTA, &YELLOW, &RED];
const WINNER_COLOR: &RGBColor = &GREEN;

const fn get_color(index: usize) -> &'static RGBColor {
    COLORS[index % COLORS.len()]
}

/// Horizontal bar chart of the tally as an SVG document, leaders in green.
fn draw_bar_graph(caption: &str, tally: &Tally, winners: &[String]) -> Result<String> {
    let mut buffer = String::new();

    let data = &tally.counts;
    let data_len = data.len();

    let svg_backend = SVGBackend::with_string(&mut buffer, (600, 400));
    let root_area = svg_backend.into_drawing_area();
    root_area.fill(&WHITE)?;

    // an empty range would leave nothing to draw the axis on
    let max_count = tally.max_count().max(1);

    let mut context = ChartBuilder::on(&root_area)
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Right, 5)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .caption(caption, ("sans-serif", 40))
        // -1 because the upper bound is included, even though the range is exclusive
        .build_cartesian_2d(0..max_count, (0..data_len - 1).into_segmented())?;

    context
        .configure_mesh()
        .y_label_formatter(&|y| match y {
            SegmentValue::CenterOf(y) => data[data_len - *y - 1].candidate.clone(),
            _ => "".to_string(),
        })
        .draw()?;

    context.draw_series(data.iter().enumerate().map(|(y, count)| {
        let reversed_y = data_len - y - 1;
        let color = if winners.contains(&count.candidate) {
            WINNER_COLOR
        } else {
            get_color(y)
        };
        let mut bar = Rectangle::new(
            [
                (0, SegmentValue::Exact(reversed_y)),
                (count.count, SegmentValue::Exact(reversed_y + 1)),
            ],
            color.filled(),
        );
        bar.set_margin(5, 5, 0, 0);
        bar
    }))?;

    // as along as these are alive, they are still borrowing buffer
    drop(context);
    drop(root_area);

    Ok(buffer)
}

async fn get_poll_graph(
    app_data: web::Data<AppData>,
    path_id: web::Path<Uuid>,
) -> Result<HttpResponse, PollError> {
    let standings = app_data.engine.standings(path_id.into_inner()).await?;
    Ok(render_graph(
        &standings.poll.title,
        &standings.tally,
        &standings.winners,
    ))
}

fn render_graph(caption: &str, tally: &Tally, winners: &[String]) -> HttpResponse {
    let svg_content = unwrap_or_log_and_internal_server_error_response!(
        draw_bar_graph(caption, tally, winners),
        "could not render graph"
    );
    HttpResponse::Ok()
        .content_type("image/svg+xml")
        .body(svg_content)
}

pub fn configure_routes(config: &mut ServiceConfig) {
    config.route("", web::get().to(get_polls));
    config.route("", web::post().to(post_poll));
    config.route("/{id}", web::get().to(get_poll));
    config.route("/{id}", web::delete().to(delete_poll));
    config.route("/{id}/tally", web::get().to(get_poll_tally));
    config.route("/{id}/winners", web::get().to(get_poll_winners));
    config.route("/{id}/standings", web::get().to(get_poll_standings));
    config.route("/{id}/graph", web::get().to(get_poll_graph));
}
