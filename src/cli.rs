//! Command-line interface for medscribe
//!
//! Provides argument parsing using clap derive macros.

use crate::keyterms::Specialty;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Real-time medical encounter transcription
#[derive(Parser, Debug)]
#[command(
    name = "medscribe",
    version,
    about = "Real-time medical encounter transcription"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// WAV file to stream (reads WAV data from stdin when omitted)
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Medical specialty for keyterms and the SOAP note (e.g. cardiology)
    #[arg(long, value_name = "SPECIALTY", default_value = "general-practice")]
    pub specialty: Specialty,

    /// Additional comma-separated keyterms for recognition biasing
    #[arg(long, value_name = "TERMS", default_value = "")]
    pub keyterms: String,

    /// Optional patient context included in SOAP note generation
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub context: String,

    /// Skip post-session enrichment (transcript only)
    #[arg(long)]
    pub no_enrich: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported specialties and their keyterm counts
    Specialties,

    /// Print the active keyterms for a specialty
    Keyterms {
        /// Specialty to show
        #[arg(value_name = "SPECIALTY", default_value = "general-practice")]
        specialty: Specialty,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["medscribe"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.input.is_none());
        assert_eq!(cli.specialty, Specialty::GeneralPractice);
        assert!(cli.keyterms.is_empty());
        assert!(!cli.no_enrich);
    }

    #[test]
    fn test_cli_parses_specialty() {
        let cli = Cli::try_parse_from(["medscribe", "--specialty", "cardiology"]).unwrap();
        assert_eq!(cli.specialty, Specialty::Cardiology);
    }

    #[test]
    fn test_cli_rejects_unknown_specialty() {
        assert!(Cli::try_parse_from(["medscribe", "--specialty", "dermatology"]).is_err());
    }

    #[test]
    fn test_cli_parses_run_options() {
        let cli = Cli::try_parse_from([
            "medscribe",
            "--input",
            "encounter.wav",
            "--keyterms",
            "ozempic,GFR",
            "--context",
            "65yo male",
            "--no-enrich",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("encounter.wav")));
        assert_eq!(cli.keyterms, "ozempic,GFR");
        assert_eq!(cli.context, "65yo male");
        assert!(cli.no_enrich);
    }

    #[test]
    fn test_cli_parses_keyterms_subcommand() {
        let cli = Cli::try_parse_from(["medscribe", "keyterms", "psychiatry"]).unwrap();
        match cli.command {
            Some(Commands::Keyterms { specialty }) => {
                assert_eq!(specialty, Specialty::Psychiatry);
            }
            _ => panic!("expected keyterms subcommand"),
        }
    }

    #[test]
    fn test_cli_verbosity_count() {
        let cli = Cli::try_parse_from(["medscribe", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
