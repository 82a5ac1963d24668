//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Verdant climate impact toolkit.
#[derive(Parser, Debug)]
#[command(
    name = "verdant",
    version = env!("CARGO_PKG_VERSION"),
    about = "Estimate emissions, aggregate impact and plan carbon offsets",
    long_about = "Estimate CO2e for transport, energy and diet activities, replay \
                  session logs into impact reports, and size carbon offset purchases. \
                  Output is pretty-printed JSON on stdout; logs go to stderr."
)]
pub struct Cli {
    /// Configuration file (defaults to ./verdant-config.yaml when present)
    #[arg(short, long, global = true, env = "VERDANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate the emissions of one activity
    #[command(alias = "e")]
    Estimate {
        /// Category, e.g. train, car_diesel, electricity, vegan
        category: String,

        /// Quantity in the category's unit (km, kWh or kcal)
        quantity: String,

        /// Region for grid electricity, e.g. france
        #[arg(short, long)]
        region: Option<String>,

        /// People sharing the vehicle
        #[arg(short, long)]
        passengers: Option<u32>,

        /// Activity kind hint for unknown categories (transport, energy, diet)
        #[arg(short, long)]
        kind: Option<String>,

        /// Unit the quantity is stated in
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// Daily and yearly footprint of a diet
    Diet {
        /// Diet name, e.g. meat_heavy, average, vegetarian, vegan
        diet: String,

        /// Calories per day
        #[arg(long, default_value_t = Decimal::from(2000))]
        calories: Decimal,
    },

    /// List the emission factor table
    Factors,

    /// List offset projects
    Projects {
        /// Project type (reforestation, renewable_energy, carbon_capture)
        #[arg(short = 't', long = "type")]
        project_type: Option<String>,

        /// Location substring, or "global"
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Offsets needed to neutralize remaining emissions
    #[command(name = "offset-needs")]
    OffsetNeeds {
        /// Current emissions in kg CO2e
        emissions_kg: Decimal,

        /// Planned reduction in percent
        #[arg(short, long, default_value_t = Decimal::from(10))]
        goal: Decimal,
    },

    /// Create a community challenge and optionally report its progress
    Challenge {
        /// Challenge type (plastic_reduction, energy_savings, sustainable_transport)
        challenge_type: String,

        /// Duration in days
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        /// Target participant count
        #[arg(short, long, default_value_t = 100)]
        target: u32,

        /// Current participants, to include a progress report
        #[arg(long)]
        participants: Option<u32>,
    },

    /// Draft a policy letter, counting it for a user when one is given
    Letter {
        /// Issue (renewable_energy, carbon_pricing, transportation, building_efficiency)
        issue: String,

        /// Who the letter is addressed to
        recipient: String,

        /// Personal story to include
        #[arg(long, default_value = "")]
        story: String,

        /// Urgency (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        urgency: String,

        /// Record the letter as sent by this user
        #[arg(long)]
        user: Option<String>,
    },

    /// Replay a JSON sessions file and print the collective report
    Replay {
        /// JSON array of {"user_id", "session", optional "recorded_at"}
        sessions: PathBuf,

        /// Also print the profile of this user
        #[arg(long)]
        user: Option<String>,
    },
}
