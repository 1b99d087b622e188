//! Clap derive structures for the `cumulo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cumulo -- kubectl-style CLI for Cumulocity IoT tenants
#[derive(Debug, Parser)]
#[command(
    name = "cumulo",
    version,
    about = "Manage Cumulocity IoT tenants from the command line",
    long_about = "A CLI for administering Cumulocity IoT tenants: inventory,\n\
        alarms, events, operations, measurements, device provisioning,\n\
        and a realtime watch over the long-polling notification channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Tenant profile to use
    #[arg(long, short = 'p', env = "C8Y_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Tenant base URL (overrides profile)
    #[arg(long, short = 'u', env = "C8Y_URL", global = true)]
    pub url: Option<String>,

    /// Tenant ID (prefixed to the username for Basic auth)
    #[arg(long, env = "C8Y_TENANT", global = true)]
    pub tenant: Option<String>,

    /// Username (overrides profile)
    #[arg(long, env = "C8Y_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "C8Y_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "C8Y_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "C8Y_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage devices in the inventory
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage device groups and the asset tree
    #[command(alias = "grp", alias = "g")]
    Groups(GroupsArgs),

    /// Manage alarms
    #[command(alias = "al")]
    Alarms(AlarmsArgs),

    /// View and create events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Manage device-control operations
    #[command(alias = "op")]
    Operations(OperationsArgs),

    /// Query and create measurements
    #[command(alias = "meas", alias = "m")]
    Measurements(MeasurementsArgs),

    /// Device registration workflow
    Provision(ProvisionArgs),

    /// Stream realtime notifications to stdout
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Shared paging arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Max results (page size)
    #[arg(long, short = 'l', default_value = "50")]
    pub limit: i32,

    /// Fetch all pages automatically
    #[arg(long, short = 'a')]
    pub all: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get device details
    Get {
        /// Device ID or serial number
        device: String,
    },

    /// Create a device managed object
    Create {
        /// Device name
        name: String,

        /// Device type (e.g. c8y_Linux)
        #[arg(long, short = 't')]
        device_type: Option<String>,
    },

    /// Rename a device
    Rename {
        /// Device ID or serial number
        device: String,

        /// New name
        name: String,
    },

    /// Queue a restart operation
    Restart {
        /// Device ID or serial number
        device: String,
    },

    /// Delete a device and its data
    Delete {
        /// Device ID or serial number
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print the asset tree
    Tree,

    /// Create a group
    Create {
        /// Group name
        name: String,

        /// Parent group ID (creates a subgroup)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Assign a device (or subgroup) to a group
    Assign {
        /// Group ID
        group: String,

        /// Child managed object ID
        child: String,
    },

    /// Unassign a child from a group
    Unassign {
        /// Group ID
        group: String,

        /// Child managed object ID
        child: String,
    },

    /// Delete a group (children survive)
    Delete {
        /// Group ID
        group: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALARMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlarmsArgs {
    #[command(subcommand)]
    pub command: AlarmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlarmsCommand {
    /// List alarms (unresolved by default)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Filter by severity (CRITICAL, MAJOR, MINOR, WARNING)
        #[arg(long, short = 's')]
        severity: Option<String>,

        /// Filter by source device ID
        #[arg(long)]
        source: Option<String>,

        /// Include resolved (CLEARED) alarms
        #[arg(long)]
        resolved: bool,
    },

    /// Get alarm details
    Get {
        /// Alarm ID
        alarm: String,
    },

    /// Raise an alarm against a device
    Raise {
        /// Source device ID or serial number
        device: String,

        /// Alarm type (e.g. c8y_HighTemperature)
        #[arg(long, short = 't')]
        alarm_type: String,

        /// Alarm text
        #[arg(long)]
        text: String,

        /// Severity
        #[arg(long, short = 's', default_value = "MAJOR")]
        severity: String,
    },

    /// Acknowledge an alarm
    Ack {
        /// Alarm ID
        alarm: String,
    },

    /// Clear an alarm
    Clear {
        /// Alarm ID
        alarm: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List recent events
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Filter by source device ID
        #[arg(long)]
        source: Option<String>,

        /// Filter by event type
        #[arg(long, short = 't')]
        event_type: Option<String>,
    },

    /// Get event details
    Get {
        /// Event ID
        event: String,
    },

    /// Record an event against a device
    Create {
        /// Source device ID or serial number
        device: String,

        /// Event type (e.g. c8y_LocationUpdate)
        #[arg(long, short = 't')]
        event_type: String,

        /// Event text
        #[arg(long)]
        text: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OPERATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OperationsArgs {
    #[command(subcommand)]
    pub command: OperationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OperationsCommand {
    /// List operations
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Filter by target device ID
        #[arg(long)]
        device: Option<String>,

        /// Filter by status (PENDING, EXECUTING, SUCCESSFUL, FAILED)
        #[arg(long, short = 's')]
        status: Option<String>,
    },

    /// Get operation details
    Get {
        /// Operation ID
        operation: String,
    },

    /// Queue an operation with a JSON instruction fragment
    Create {
        /// Target device ID or serial number
        device: String,

        /// Instruction fragment key (e.g. c8y_Command)
        #[arg(long, short = 'f')]
        fragment: String,

        /// Instruction payload as JSON (default: {})
        #[arg(long, default_value = "{}")]
        payload: String,
    },

    /// Cancel a pending operation (marks it FAILED)
    Cancel {
        /// Operation ID
        operation: String,

        /// Failure reason recorded on the operation
        #[arg(long, default_value = "cancelled by operator")]
        reason: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MEASUREMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MeasurementsArgs {
    #[command(subcommand)]
    pub command: MeasurementsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MeasurementsCommand {
    /// List measurements for a device
    #[command(alias = "ls")]
    List {
        /// Source device ID or serial number
        device: String,

        #[command(flatten)]
        list: ListArgs,

        /// Filter by value fragment (e.g. c8y_TemperatureMeasurement)
        #[arg(long, short = 'f')]
        fragment: Option<String>,
    },

    /// Send a measurement value
    Create {
        /// Source device ID or serial number
        device: String,

        /// Measurement type
        #[arg(long, short = 't')]
        measurement_type: String,

        /// Fragment key (e.g. c8y_TemperatureMeasurement)
        #[arg(long, short = 'f')]
        fragment: String,

        /// Series key (e.g. T)
        #[arg(long, short = 's')]
        series: String,

        /// Numeric value
        value: f64,

        /// Unit (e.g. C)
        #[arg(long)]
        unit: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROVISIONING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    #[command(subcommand)]
    pub command: ProvisionCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvisionCommand {
    /// Register a device ID for provisioning
    Register {
        /// Device ID (usually the serial number)
        id: String,
    },

    /// List pending new-device requests
    #[command(alias = "ls")]
    List,

    /// Accept a pending request
    Accept {
        /// Device ID
        id: String,
    },

    /// Cancel a request
    Cancel {
        /// Device ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only print alarms
    #[arg(long, conflicts_with_all = ["events", "measurements"])]
    pub alarms: bool,

    /// Only print events
    #[arg(long, conflicts_with_all = ["alarms", "measurements"])]
    pub events: bool,

    /// Only print measurements
    #[arg(long, conflicts_with_all = ["alarms", "events"])]
    pub measurements: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactively create a profile
    Init,

    /// Show the active configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
