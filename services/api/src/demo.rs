use crate::infra::{
    availability_source, booking_service, InMemorySessionRepository, RecordingGateway,
};
use clap::Args;
use holiday_booking::config::{AppConfig, BookingConfig};
use holiday_booking::error::AppError;
use holiday_booking::telemetry;
use holiday_booking::workflows::availability::AvailabilityRepository;
use holiday_booking::workflows::booking::{
    BookingService, BookingServiceError, Calendar, FieldValue, SessionId, SessionRepository,
    SessionResponse, SubmissionGateway, WebhookGateway, WAITLIST_MARKER,
};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

#[derive(Args, Debug, Default)]
pub(crate) struct AvailabilityArgs {
    /// Read availability from a local CSV export instead of the configured URL
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Read availability from a local CSV export instead of the configured URL
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Post the booking to this webhook; bookings are only recorded locally otherwise
    #[arg(long)]
    pub(crate) webhook_url: Option<Url>,
}

pub(crate) async fn run_availability(args: AvailabilityArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let booking = &config.booking;

    let client = booking.http_client()?;
    let repository =
        AvailabilityRepository::new(availability_source(booking, &client, args.csv));
    let snapshot = repository.try_load().await?;
    let calendar = Calendar::build(booking.season, &snapshot);

    println!("{}", render_calendar(&calendar));
    Ok(())
}

pub(crate) fn render_calendar(calendar: &Calendar) -> String {
    let window = calendar.window();
    let mut lines = vec![format!(
        "Installation season {} to {}",
        window.start().format("%B %-d, %Y"),
        window.end().format("%B %-d, %Y")
    )];
    for day in calendar.days() {
        let status = if day.is_booked { "booked" } else { "open" };
        lines.push(format!("  {}  {status}", day.date.format("%a %b %d")));
    }
    let available = calendar.available_count();
    lines.push(if available == 0 {
        "No slots available; new requests join the waitlist.".to_string()
    } else {
        format!("{available} of {} slots available", calendar.days().len())
    });
    lines.join("\n")
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let booking = &config.booking;

    let client = booking.http_client()?;
    let recorder = RecordingGateway::default();
    let gateway: Arc<dyn SubmissionGateway> = match args.webhook_url {
        Some(url) => Arc::new(WebhookGateway::new(client.clone(), url)),
        None => Arc::new(recorder.clone()),
    };
    let service = booking_service(
        booking,
        Arc::new(InMemorySessionRepository::default()),
        availability_source(booking, &client, args.csv),
        gateway,
    );

    let transcript = walk_booking(&service, booking).await?;
    println!("{transcript}");

    for payload in recorder.payloads() {
        println!(
            "\nRecorded webhook payload (not sent):\n{}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|err| err.to_string())
        );
    }
    Ok(())
}

/// Drives one session through every step with scripted answers and returns
/// what a customer would have seen.
pub(crate) async fn walk_booking<R>(
    service: &BookingService<R>,
    config: &BookingConfig,
) -> Result<String, BookingServiceError>
where
    R: SessionRepository + 'static,
{
    let mut transcript = vec!["Holiday light booking demo".to_string()];

    let started = service.start_session().await?;
    let id = started.session_id;
    transcript.push(format!(
        "Professional installation from {} per foot; {} deposit secures the date.",
        config.price_per_foot, config.deposit_amount
    ));
    record_step(&mut transcript, &started);

    let next = service.advance(&id).await?;
    record_step(&mut transcript, &next);
    transcript.push(format!("  {}", next.view.availability.slots_label));

    let date = match next.view.availability.date_options.first() {
        Some(option) => {
            transcript.push(format!("  Choosing {}", option.label));
            option.value.format("%Y-%m-%d").to_string()
        }
        None => {
            if let Some(notice) = &next.view.availability.waitlist_notice {
                transcript.push(format!("  {notice}"));
            }
            WAITLIST_MARKER.to_string()
        }
    };
    set(service, &id, "date", date.into())?;
    record_step(&mut transcript, &service.advance(&id).await?);

    service.select_light_option(&id, "alternating")?;
    set(service, &id, "tipColor", "white".into())?;
    record_step(&mut transcript, &service.advance(&id).await?);

    for (field, value) in [
        ("name", "Jordan Avery"),
        ("address", "27 Evergreen Terrace"),
        ("phone", "555-0117"),
        ("email", "jordan.avery@example.com"),
    ] {
        set(service, &id, field, value.into())?;
    }
    let review = service.advance(&id).await?;
    record_step(&mut transcript, &review);
    for line in &review.view.review {
        transcript.push(format!("  {}: {}", line.label, line.value));
    }

    set(service, &id, "agreeTerms", true.into())?;
    let finished = service.advance(&id).await?;
    match (&finished.view.completion, &finished.view.error) {
        (Some(summary), _) => transcript.push(format!("\n{}", summary.render_text())),
        (None, Some(error)) => transcript.push(format!("\nSubmission failed: {error}")),
        (None, None) => transcript.push("\nSubmission did not complete.".to_string()),
    }

    Ok(transcript.join("\n"))
}

fn set<R>(
    service: &BookingService<R>,
    id: &SessionId,
    field: &str,
    value: FieldValue,
) -> Result<(), BookingServiceError>
where
    R: SessionRepository + 'static,
{
    service.set_field(id, field, value).map(|_| ())
}

fn record_step(transcript: &mut Vec<String>, response: &SessionResponse) {
    let step = &response.view.step;
    transcript.push(format!(
        "\nStep {} of 5: {} ({}%)",
        step.number, step.label, step.progress_percent
    ));
    if let Some(error) = &response.view.error {
        transcript.push(format!("  ! {error}"));
    }
}
