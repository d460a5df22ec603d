//! CampusLink command line client
//!
//! Main application entry point

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use CampusLink::{
    config::Settings,
    forms::{decode_value, total_steps, FormStepController, FIELDS_PER_STEP},
    models::{FieldType, FormDefinition, RegistrationStatus},
    services::ServiceFactory,
    state::{EventStatus, RegistrationPhase, RegistrationStore},
    utils::{helpers, logging},
    CampusLinkError,
};

#[derive(Parser, Debug)]
#[command(name = "campuslink", version, about = "Register for campus events from the terminal")]
struct Cli {
    /// Config file name, extension optional
    #[arg(long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show registration status and capacity for an event
    Status { event_id: i64 },
    /// Register for an event, answering its form when it has one
    Register {
        event_id: i64,
        /// Form answer as field_id=value; checkbox values are comma separated
        #[arg(short, long = "answer")]
        answers: Vec<String>,
    },
    /// Change the answers of an existing form registration
    Edit {
        event_id: i64,
        #[arg(short, long = "answer")]
        answers: Vec<String>,
    },
    /// Cancel your registration
    Unregister { event_id: i64 },
    /// Show the event's active registration form
    Form { event_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_file(&cli.config)?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", CampusLink::info());

    let services = ServiceFactory::new(&settings)?;
    let mut store = RegistrationStore::new();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending request");
            ctrl_c.cancel();
        }
    });

    let result = run(cli.command, &services, &mut store, &cancel).await;
    if let Err(e) = &result {
        eprintln!("[{}] {}", e.severity(), e.user_message());
    }
    result.map_err(Into::into)
}

async fn run(
    command: Commands,
    services: &ServiceFactory,
    store: &mut RegistrationStore,
    cancel: &CancellationToken,
) -> CampusLink::Result<()> {
    let machine = &services.registrations;

    match command {
        Commands::Status { event_id } => {
            machine.load_once(store, event_id, cancel).await?;
            print_status(store, event_id);
        }
        Commands::Form { event_id } => {
            machine.load_once(store, event_id, cancel).await?;
            match store.entry(event_id).and_then(|e| e.active_form.as_ref()) {
                Some(form) => print_form(form),
                None => println!("Event {} has no active registration form", event_id),
            }
        }
        Commands::Register { event_id, answers } => {
            machine.load_once(store, event_id, cancel).await?;
            match store.phase(event_id) {
                RegistrationPhase::Registered(handle) => {
                    println!("Already registered ({})", RegistrationStatus::from(handle));
                    return Ok(());
                }
                RegistrationPhase::FormPending { form_id: Some(form_id) } => {
                    let responses = collect_answers(store, event_id, &answers, Default::default())?;
                    machine.register_with_form(store, event_id, form_id, &responses, cancel).await?;
                }
                RegistrationPhase::FormPending { form_id: None } => {
                    return Err(CampusLinkError::InvalidInput("The active form has not been saved yet".to_string()));
                }
                RegistrationPhase::None => {
                    if !answers.is_empty() {
                        warn!(event_id = event_id, "Event has no form, ignoring answers");
                    }
                    machine.register_simple(store, event_id, cancel).await?;
                }
            }
            println!("Registered.");
            print_status(store, event_id);
        }
        Commands::Edit { event_id, answers } => {
            machine.load_once(store, event_id, cancel).await?;
            let RegistrationStatus::FormBacked(form_id) = store.status(event_id) else {
                return Err(CampusLinkError::InvalidInput("No form registration to edit".to_string()));
            };
            let previous = machine.load_submission_for_edit(store, event_id, cancel).await?;
            let responses = collect_answers(store, event_id, &answers, previous)?;
            machine.update_form_registration(store, event_id, form_id, &responses, cancel).await?;
            println!("Answers updated.");
        }
        Commands::Unregister { event_id } => {
            machine.load_once(store, event_id, cancel).await?;
            let Some(handle) = store.status(event_id).handle() else {
                println!("Not registered for event {}", event_id);
                return Ok(());
            };
            machine.unregister(store, event_id, handle, cancel).await?;
            println!("Registration cancelled.");
            print_status(store, event_id);
        }
    }

    Ok(())
}

/// Fill the active form from `field_id=value` arguments and validate it
fn collect_answers(
    store: &RegistrationStore,
    event_id: i64,
    answers: &[String],
    previous: CampusLink::models::ResponseMap,
) -> CampusLink::Result<CampusLink::models::ResponseMap> {
    let form = store
        .entry(event_id)
        .and_then(|e| e.active_form.as_ref())
        .ok_or_else(|| CampusLinkError::InvalidInput("Event has no active form".to_string()))?;

    let mut controller = FormStepController::new(form).with_responses(previous);
    for (field_id, raw) in helpers::parse_answers(answers)? {
        match form.field(field_id).map(|f| f.field_type) {
            Some(FieldType::Checkbox) => controller.set_value(field_id, decode_value(FieldType::Checkbox, &raw)),
            Some(_) => controller.set_text(field_id, &raw),
            None => warn!(field_id = field_id, "Answer for unknown field ignored"),
        }
    }

    controller.submit().map_err(CampusLinkError::Validation)
}

fn print_status(store: &RegistrationStore, event_id: i64) {
    let Some(entry) = store.entry(event_id) else {
        println!("Event {}: nothing loaded", event_id);
        return;
    };

    if let Some(event) = &entry.event {
        let now = chrono::Local::now().naive_local();
        println!("{}", helpers::truncate_text(&event.title, 72));
        println!("  When:   {} ({})", helpers::format_event_window(event.start_time, event.end_time), EventStatus::of(event, now).label());
        if let Some(location) = &event.location {
            println!("  Where:  {}", location);
        }
        if let Some(description) = &event.description {
            println!("  About:  {}", helpers::truncate_text(&helpers::normalize_whitespace(description), 120));
        }
    } else {
        println!("Event {}", event_id);
    }

    println!("  Spots:  {}", entry.spots());
    let phase = match entry.phase() {
        RegistrationPhase::None => "Not registered".to_string(),
        RegistrationPhase::FormPending { .. } => "Not registered, form required".to_string(),
        RegistrationPhase::Registered(handle) => format!("Registered ({})", RegistrationStatus::from(handle)),
    };
    println!("  Status: {}", phase);
}

fn print_form(form: &FormDefinition) {
    println!("{}", form.title);
    if let Some(deadline) = form.deadline {
        println!("  Deadline: {}", helpers::format_timestamp(deadline));
    }

    let fields = form.ordered_fields();
    let steps = total_steps(fields.len());
    for (step, chunk) in fields.chunks(FIELDS_PER_STEP).enumerate() {
        println!("  Step {}/{}", step + 1, steps);
        for field in chunk {
            let required = if field.required { " *" } else { "" };
            let id = field.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
            print!("    [{}] {}{} ({})", id, field.label, required, field.field_type);
            if field.field_type.has_options() {
                print!(": {}", field.options.join(" | "));
            }
            println!();
        }
    }
}
