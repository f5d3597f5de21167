use agent_sim_core::{
    EntityId, Position,
    environment::Environment,
    vacuum::{
        LOC_A, LOC_B, LOC_C, LOC_D, Status, VacuumEnvironment, load_statuses_from_string,
        table_driven_vacuum_agent,
    },
};
use anyhow::{Context, Result};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Status map file to load (two rows of `C`/`D` tokens)
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Seed for the world's random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of single-step runs to perform
    #[arg(short, long, default_value_t = 15)]
    iterations: usize,

    /// Delay between steps in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    delay_ms: u64,

    /// Print each step instead of drawing the terminal UI
    #[arg(long)]
    headless: bool,
}

struct App {
    /// The vacuum world being simulated.
    environment: VacuumEnvironment,
    /// Handle of the single table-driven agent.
    agent: EntityId,
    /// Steps taken so far.
    ticks: usize,
    /// Total steps to take.
    iterations: usize,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut environment = match &args.map {
            Some(map_file) => {
                let file_string = std::fs::read_to_string(map_file)
                    .with_context(|| format!("Failed to read map file {}", map_file.display()))?;
                let statuses = load_statuses_from_string(&file_string)?;
                VacuumEnvironment::with_statuses(statuses, rng)?
            }
            None => VacuumEnvironment::new(rng),
        };

        let id = environment.reserve_entity_id();
        let agent = environment
            .add(table_driven_vacuum_agent(id), None)
            .context("Adding agent")?;

        Ok(App {
            environment,
            agent,
            ticks: 0,
            iterations: args.iterations,
            should_quit: false,
        })
    }

    fn finished(&self) -> bool {
        self.ticks >= self.iterations
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) -> Result<()> {
        if self.finished() {
            return Ok(());
        }
        self.environment.run(1)?;
        self.ticks += 1;
        Ok(())
    }

    fn agent_location(&self) -> Option<Position> {
        self.environment
            .registry()
            .get(self.agent)
            .and_then(|agent| agent.location().copied())
    }

    fn agent_performance(&self) -> i64 {
        self.environment
            .registry()
            .get(self.agent)
            .and_then(|agent| agent.performance())
            .unwrap_or_default()
    }

    /// One line per square, `A: Dirty` style.
    fn status_line(&self) -> String {
        [LOC_A, LOC_B, LOC_C, LOC_D]
            .into_iter()
            .map(|location| match self.environment.status(location) {
                Some(status) => format!("{}: {:?}", location_name(location), status),
                None => format!("{}: ?", location_name(location)),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn location_name(location: Position) -> &'static str {
    match location {
        LOC_A => "A",
        LOC_B => "B",
        LOC_C => "C",
        LOC_D => "D",
        _ => "?",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(map_file) = &args.map {
        if !map_file.exists() {
            return Err(anyhow::anyhow!(
                "Map file does not exist: {}",
                map_file.display()
            ));
        }
    }

    // Headless only: the TUI owns the terminal. Installed before the agent is
    // added so registration events are kept.
    if args.headless {
        init_tracing();
    }

    let mut app = App::new(&args)?;
    let delay = Duration::from_millis(args.delay_ms);

    if args.headless {
        return run_headless(&mut app, delay);
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, delay);
    restore_terminal(&mut terminal)?;
    result
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Prints the world after every step, pausing `delay` in between.
fn run_headless(app: &mut App, delay: Duration) -> Result<()> {
    info!(
        iterations = app.iterations,
        classes = ?app.environment.thing_classes(),
        "Starting vacuum world"
    );
    print_state(app);
    while !app.finished() {
        std::thread::sleep(delay);
        app.tick()?;
        print_state(app);
    }
    info!(performance = app.agent_performance(), "Simulation finished");
    Ok(())
}

fn print_state(app: &App) {
    println!("{}", app.status_line());
    println!(
        "Agent Location: {}",
        app.agent_location()
            .map(|location| format!("{} {}", location_name(location), location))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("Agent Performance: {}", app.agent_performance());
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick()?;
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60), // Area for the squares
            Constraint::Percentage(30), // Area for the agent
            Constraint::Percentage(10), // Area for status/help
        ])
        .split(frame.area());

    render_world(frame, main_layout[0], app);
    render_agent(frame, main_layout[1], app);

    let help = if app.finished() {
        format!("Finished {} steps. Press 'q' or 'Esc' to quit.", app.ticks)
    } else {
        format!(
            "Step {}/{}. Press 'q' or 'Esc' to quit.",
            app.ticks, app.iterations
        )
    };
    let help_text = Paragraph::new(help)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the four squares, D C on top and A B below, so moves read as
/// their names.
fn render_world(frame: &mut Frame, area: Rect, app: &App) {
    let agent_location = app.agent_location();
    let statuses = app.environment.statuses();

    let mut lines: Vec<Line> = Vec::with_capacity(statuses.height());
    for y in (0..statuses.height()).rev() {
        let mut spans: Vec<Span> = Vec::with_capacity(statuses.width());
        for x in 0..statuses.width() {
            let location = Position { x, y };
            let (label, style) = match statuses.get(location) {
                Some(Status::Dirty) => ("Dirty", Style::default().fg(Color::Yellow)),
                Some(Status::Clean) => ("Clean", Style::default().fg(Color::Green)),
                None => ("?", Style::default()),
            };
            let marker = if agent_location == Some(location) {
                Span::styled(" @ ", Style::default().fg(Color::Red).bold())
            } else {
                Span::raw("   ")
            };
            spans.push(Span::raw(format!(" {} ", location_name(location))));
            spans.push(Span::styled(format!("{:<5}", label), style));
            spans.push(marker);
        }
        lines.push(Line::from(spans));
    }

    let world_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Vacuum World").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(world_paragraph, area);
}

/// Renders the agent's location and performance.
fn render_agent(frame: &mut Frame, area: Rect, app: &App) {
    let location = app
        .agent_location()
        .map(|location| format!("{} {}", location_name(location), location))
        .unwrap_or_else(|| "none".to_string());
    let items = vec![
        ListItem::from(Line::from(format!("Agent: {}", app.agent))),
        ListItem::from(Line::from(format!("Location: {}", location))),
        ListItem::from(Line::from(format!(
            "Performance: {}",
            app.agent_performance()
        ))),
    ];
    let agent_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Agent"));
    frame.render_widget(agent_widget, area);
}
