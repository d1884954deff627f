use anyhow::{Context, Result, bail};
use clap::Parser;
use medscribe::audio::wav::WavFrameSource;
use medscribe::cli::{Cli, Commands};
use medscribe::config::Config;
use medscribe::enrich::{Enricher, HttpCompletionClient, SentimentOutcome, TaskOutcome};
use medscribe::keyterms::{Specialty, active_keyterms};
use medscribe::session::EncounterSession;
use medscribe::stream::session::SessionEvent;
use medscribe::transcript::TranscriptSnapshot;
use std::fs::File;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Specialties) => {
            for specialty in Specialty::ALL {
                println!("{:<18} {} keyterms", specialty, specialty.keyterms().len());
            }
            Ok(())
        }
        Some(Commands::Keyterms { specialty }) => {
            for term in specialty.keyterms() {
                println!("{term}");
            }
            Ok(())
        }
        None => run_encounter(cli).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

async fn run_encounter(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let mut source = match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            WavFrameSource::from_reader(Box::new(file))?
        }
        None => {
            use std::io::IsTerminal;
            if std::io::stdin().is_terminal() {
                bail!("no input: pass --input <wav> or pipe WAV data on stdin");
            }
            WavFrameSource::from_stdin()?
        }
    };

    if !cli.quiet {
        println!(
            "Streaming {:.1}s of audio ({} Hz, {} channel{})",
            source.duration_ms() as f64 / 1000.0,
            source.sample_rate(),
            source.channels(),
            if source.channels() == 1 { "" } else { "s" },
        );
        let keyterms = active_keyterms(cli.specialty, &cli.keyterms);
        println!("Specialty: {} ({} keyterms)\n", cli.specialty, keyterms.len());
    }

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut session = EncounterSession::new(config.clone()).with_event_sender(event_tx);

    session.start(cli.specialty, &cli.keyterms).await?;

    // Feed frames at real-time pace while the foreground polls the
    // transcript for display.
    let mut printed_turns = 0;
    let mut faulted = false;

    while let Some(frame) = source.read_frame() {
        let pace = Duration::from_millis(frame.duration_ms() as u64);
        session.push_frame(&frame);

        print_new_turns(&session.snapshot(), &mut printed_turns, cli.quiet);
        if drain_events(&event_rx) {
            faulted = true;
            break;
        }

        tokio::time::sleep(pace).await;
    }

    // Let trailing turn events arrive before closing.
    if !faulted {
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            print_new_turns(&session.snapshot(), &mut printed_turns, cli.quiet);
            if drain_events(&event_rx) {
                faulted = true;
                break;
            }
        }
    }

    let transcript = session.finish().await;
    print_new_turns(&transcript, &mut printed_turns, cli.quiet);

    let dropped = session.queue().evicted_count();
    if dropped > 0 {
        eprintln!("medscribe: {dropped} audio chunk(s) dropped under backpressure");
    }

    if transcript.turns.is_empty() {
        println!("\nNo speech detected");
        return Ok(());
    }

    if !cli.quiet {
        println!(
            "\nEncounter complete: {} turns, {} words",
            transcript.turns.len(),
            transcript.word_count()
        );
    }

    if cli.no_enrich || faulted {
        return Ok(());
    }

    let client = HttpCompletionClient::new(&config.enrichment)?;
    let enricher = Enricher::new(client);
    let result = enricher
        .enrich(&transcript.render(), cli.specialty, &cli.context)
        .await;

    print_result_section("SOAP NOTE", &result.soap_note);
    print_result_section("REDACTED TRANSCRIPT", &result.redacted_transcript);
    print_sentiment(&result.sentiment);

    Ok(())
}

/// Prints finalized turns that haven't been shown yet.
fn print_new_turns(snapshot: &TranscriptSnapshot, printed: &mut usize, quiet: bool) {
    if quiet {
        *printed = snapshot.turns.len();
        return;
    }
    for turn in &snapshot.turns[*printed..] {
        println!("{}: {}", turn.speaker.as_str(), turn.text);
    }
    *printed = snapshot.turns.len();
}

/// Drains lifecycle events; returns true when the session faulted.
fn drain_events(event_rx: &crossbeam_channel::Receiver<SessionEvent>) -> bool {
    let mut faulted = false;
    while let Ok(event) = event_rx.try_recv() {
        if let SessionEvent::Faulted { message } = event {
            eprintln!("medscribe: session fault: {message}");
            faulted = true;
        }
    }
    faulted
}

fn print_result_section(title: &str, outcome: &TaskOutcome<String>) {
    println!("\n=== {title} ===");
    match outcome {
        TaskOutcome::Ready(text) => println!("{text}"),
        TaskOutcome::Failed { message } => println!("{message}"),
    }
}

fn print_sentiment(outcome: &TaskOutcome<SentimentOutcome>) {
    println!("\n=== SENTIMENT ===");
    match outcome {
        TaskOutcome::Failed { message } => println!("{message}"),
        TaskOutcome::Ready(SentimentOutcome::Unparsed { raw, error }) => {
            println!("(could not parse structured sentiment: {error})\n{raw}");
        }
        TaskOutcome::Ready(SentimentOutcome::Parsed(report)) => {
            println!(
                "Patient: {:?}   Doctor: {:?}",
                report.overall_patient_sentiment, report.overall_doctor_sentiment
            );
            if !report.patient_summary.is_empty() {
                println!("{}", report.patient_summary);
            }
            for turn in &report.turns {
                println!(
                    "  [{:?}/{:?}] {}: \"{}\" ({})",
                    turn.sentiment, turn.confidence, turn.speaker, turn.excerpt, turn.reason
                );
            }
        }
    }
}
