//! visit-report - terminal client for the visit report PDF service
//!
//! Collects the visit report form, a drawn signature and an optional
//! uploaded PDF, sends them to the fill service and saves the generated
//! document as `visit_report_YYYYMMDD_HHMMSS.pdf`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use visit_report::application::{App, AppMode, Command, JobResult};
use visit_report::domain::{default_controls, FormControl};
use visit_report::infrastructure::{init_logging, ArtifactSink, Config, DownloadDirectory, FormService, HttpFormService};
use visit_report::presentation::{pad_area, render_ui, InputHandler};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Entry point for the visit-report terminal client.
///
/// The first argument, when given, is the path of the configuration file.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, if logging cannot
/// be set up, or if terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    init_logging(&config.log_file)?;
    info!("Using form service at {}", config.base_url);

    let service: Arc<dyn FormService> =
        Arc::new(HttpFormService::new(&config.base_url, config.request_timeout())?);
    let controls = load_controls(service.as_ref());
    let sink = DownloadDirectory::new(&config.download_dir);

    let mut app = App::new(controls, config.device_pixel_ratio, config.error_display());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, service, &sink);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Terminal error: {}", err);
        println!("{err:?}");
    }

    Ok(())
}

/// Asks the service for its layout, falling back to the built-in one.
fn load_controls(service: &dyn FormService) -> Vec<FormControl> {
    match service.health() {
        Ok(health) if !health.template_exists => {
            warn!("Service reports {} but has no template", health.status)
        }
        Ok(health) => info!("Service status: {}", health.status),
        Err(e) => warn!("Health check failed: {}", e),
    }

    match service.fetch_fields() {
        Ok(schema) if !schema.fields.is_empty() => schema.controls(),
        Ok(_) => default_controls(),
        Err(e) => {
            warn!("Could not load form fields, using built-in layout: {}", e);
            default_controls()
        }
    }
}

/// Runs a command on a worker thread; the result comes back over `jobs`.
fn spawn_command(command: Command, service: Arc<dyn FormService>, jobs: Sender<JobResult>) {
    thread::spawn(move || {
        let result = match command {
            Command::Validate(ticket) => JobResult::Validated {
                token: ticket.token,
                result: service.validate_pdf(&ticket.file),
            },
            Command::Submit(request) => JobResult::Submitted(service.fill(&request)),
        };
        // The receiver only goes away when the app is quitting.
        let _ = jobs.send(result);
    });
}

/// Main application event loop.
///
/// Draws, polls input with a short timeout so finished jobs and expiring
/// messages are picked up, and exits on 'q' in normal mode.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    service: Arc<dyn FormService>,
    sink: &dyn ArtifactSink,
) -> io::Result<()> {
    let (jobs, results): (Sender<JobResult>, Receiver<JobResult>) = mpsc::channel();

    loop {
        terminal.draw(|f| {
            app.set_pad_area(pad_area(f.area()));
            render_ui(f, app);
        })?;

        if event::poll(POLL_INTERVAL)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if app.mode == AppMode::Normal && key.modifiers.is_empty() => {
                        return Ok(())
                    }
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                },
                Event::Mouse(mouse) => {
                    InputHandler::handle_mouse_event(app, mouse);
                    None
                }
                _ => None,
            };
            if let Some(command) = command {
                spawn_command(command, Arc::clone(&service), jobs.clone());
            }
        }

        while let Ok(job) = results.try_recv() {
            app.apply_job(job, sink);
        }
        app.tick(Instant::now());
    }
}
